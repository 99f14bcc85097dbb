//! Storage collaborator interface.
//!
//! The graph never reads or writes storage while computing dates; the only
//! mutation that goes through here mid-operation is modifier persistence.
//! Everything else is bulk-loaded once at startup.

pub mod memory;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StoreError;
use crate::model::{Anchor, DelayId, Modifier, ProjectId, TaskId};

pub use memory::MemoryStore;

/// Persisted baseline of a task, including any modifiers already applied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRecord {
    pub project_id: ProjectId,
    pub id: TaskId,
    pub estimated_start: NaiveDate,
    pub estimated_duration: i64,
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
}

/// Persisted parent → child dependency edge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRelationRecord {
    pub project_id: ProjectId,
    pub parent: TaskId,
    pub child: TaskId,
    pub lag: i64,
    pub anchor: Anchor,
}

/// Persisted delay marker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DelayRecord {
    pub project_id: ProjectId,
    pub id: DelayId,
    pub date: NaiveDate,
}

/// Persisted task → delay contribution edge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DelayRelationRecord {
    pub project_id: ProjectId,
    pub task: TaskId,
    pub delay: DelayId,
    pub lag: i64,
}

/// Persisted duration modifier, prior to being linked to its task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModifierRecord {
    pub project_id: ProjectId,
    pub task: TaskId,
    pub id: Uuid,
    pub delta: i64,
    pub anchor: Anchor,
}

/// Asynchronous DAO boundary consumed by the graph.
///
/// Implementations may fail with [`StoreError::NotFound`] for unknown
/// identifiers or [`StoreError::Internal`] for backend failures; the graph
/// passes both through unchanged.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn project_ids(&self) -> Result<Vec<ProjectId>, StoreError>;

    async fn project_tasks(&self, project: &str) -> Result<Vec<TaskRecord>, StoreError>;

    async fn task(&self, project: &str, task: &str) -> Result<TaskRecord, StoreError>;

    async fn add_task(&self, record: TaskRecord) -> Result<(), StoreError>;

    async fn delay(&self, project: &str, delay: &str) -> Result<DelayRecord, StoreError>;

    async fn project_delays(&self, project: &str) -> Result<Vec<DelayRecord>, StoreError>;

    async fn task_relations(&self, project: &str) -> Result<Vec<TaskRelationRecord>, StoreError>;

    async fn delay_relations(&self, project: &str) -> Result<Vec<DelayRelationRecord>, StoreError>;

    /// Persist a modifier record.
    async fn add_modifier(&self, record: ModifierRecord) -> Result<ModifierRecord, StoreError>;

    /// Link an already persisted modifier to its task.
    async fn add_modifier_for_task(
        &self,
        project: &str,
        task: &str,
        modifier: Uuid,
    ) -> Result<(), StoreError>;
}
