use thiserror::Error;

use crate::model::TaskId;

/// A structural failure inside the task graph: a cyclic dependency, or a
/// broken internal invariant. Fatal to the operation that triggered it.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("cyclic dependency through tasks: {}", path.join(" -> "))]
    CyclicDependency { path: Vec<TaskId> },

    #[error("no valid start date candidate for task '{0}'")]
    NoStartCandidate(TaskId),

    #[error("task '{0}' is not part of the graph")]
    UnknownTask(TaskId),
}

/// A referenced entity does not exist. Maps to a 404 at the API boundary.
#[derive(Debug, Error)]
#[error("{kind} '{id}' not found")]
pub struct NotFoundError {
    pub kind: &'static str,
    pub id: String,
}

impl NotFoundError {
    pub fn project(id: impl Into<String>) -> Self {
        Self { kind: "project", id: id.into() }
    }

    pub fn task(id: impl Into<String>) -> Self {
        Self { kind: "task", id: id.into() }
    }

    pub fn delay(id: impl Into<String>) -> Self {
        Self { kind: "delay", id: id.into() }
    }

    pub fn modifier(id: impl Into<String>) -> Self {
        Self { kind: "modifier", id: id.into() }
    }
}

/// Failure reported by a [`ProjectStore`](crate::dao::ProjectStore)
/// implementation. Passed through unchanged by the graph layer.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("internal storage error: {0}")]
    Internal(String),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    #[error("import failed: {0}")]
    Import(String),
}

pub type Result<T> = std::result::Result<T, Error>;
