use chrono::NaiveDate;

use super::{DelayId, ProjectId, TaskId};

/// An edge from a delay to a contributing task, with the slack tolerance in
/// days.
#[derive(Debug, Clone)]
pub struct DelayEdge {
    pub task: TaskId,
    pub lag: i64,
}

/// A milestone-like marker date with a margin computed relative to the tasks
/// that report into it.
///
/// `margin` is the smallest slack, in days, between the target `date` and the
/// end dates of the contributing tasks (minus each edge's lag). The engine
/// reassigns `initial_margin` alongside `margin` on every pass; downstream
/// consumers treat it as the pre-propagation reference value.
#[derive(Debug, Clone)]
pub struct DelayNode {
    pub project_id: ProjectId,
    pub id: DelayId,
    pub date: NaiveDate,
    pub initial_margin: i64,
    pub margin: i64,
    pub relations: Vec<DelayEdge>,
}

impl DelayNode {
    pub fn new(project_id: impl Into<ProjectId>, id: impl Into<DelayId>, date: NaiveDate) -> Self {
        Self {
            project_id: project_id.into(),
            id: id.into(),
            date,
            initial_margin: 0,
            margin: 0,
            relations: Vec::new(),
        }
    }

    /// Store a freshly computed margin. Both fields are assigned
    /// unconditionally on every pass.
    pub fn apply_margin(&mut self, margin: i64) {
        self.margin = margin;
        self.initial_margin = margin;
    }
}
