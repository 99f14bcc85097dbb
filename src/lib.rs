//! Incremental project task graph scheduling engine.
//!
//! Tasks form a directed dependency graph with lag/anchor edge semantics;
//! derived start and end dates are computed by propagation and recomputed
//! incrementally when relations, duration modifiers, or delay definitions
//! change. Delay markers carry a margin, the smallest slack between their
//! target date and the tasks reporting into them. Cyclic dependencies are
//! detected both statically at bulk import and live during propagation.
//!
//! Storage is an external collaborator behind the async
//! [`dao::ProjectStore`] trait; the graph never touches it while computing
//! dates.

pub mod dao;
pub mod date;
pub mod error;
pub mod io;
pub mod model;

pub use error::{Error, GraphError, NotFoundError, Result, StoreError};
pub use model::{
    find_cyclic_dependency, Anchor, DelayNode, GraphRegistry, Modifier, ProjectGraph, TaskNode,
    TaskRelation,
};
