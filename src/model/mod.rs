pub mod cycles;
pub mod delay;
pub mod project;
pub mod registry;
pub mod task;

pub type ProjectId = String;
pub type TaskId = String;
pub type DelayId = String;

pub use cycles::find_cyclic_dependency;
pub use delay::{DelayEdge, DelayNode};
pub use project::ProjectGraph;
pub use registry::GraphRegistry;
pub use task::{Anchor, Modifier, ParentEdge, TaskNode, TaskRelation};
