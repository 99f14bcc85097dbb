use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{DelayId, ProjectId, TaskId};
use crate::date;

/// Whether an offset (relation lag or modifier) is measured from a node's
/// start or its end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    Beginning,
    End,
}

/// Offset semantics of a parent → child dependency edge: the child's start is
/// derived from the parent's anchor date plus `lag` days.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TaskRelation {
    pub lag: i64,
    pub anchor: Anchor,
}

/// An edge to a parent task. The lag/anchor record is held against the parent
/// side of the edge.
#[derive(Debug, Clone)]
pub struct ParentEdge {
    pub parent: TaskId,
    pub relation: TaskRelation,
}

/// A duration adjustment applied to a task. End-anchored deltas stretch the
/// duration; Beginning-anchored deltas push the start date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Modifier {
    pub id: Uuid,
    pub delta: i64,
    pub anchor: Anchor,
}

impl Modifier {
    pub fn new(delta: i64, anchor: Anchor) -> Self {
        Self {
            id: Uuid::new_v4(),
            delta,
            anchor,
        }
    }
}

/// A single task in the dependency graph.
///
/// `estimated_start` and `estimated_duration` are the immutable baseline;
/// `start` and `duration` are computed state, mutated only by the graph's
/// recomputation pass. A zero `estimated_duration` marks a milestone.
#[derive(Debug, Clone)]
pub struct TaskNode {
    pub project_id: ProjectId,
    pub id: TaskId,
    pub estimated_start: NaiveDate,
    pub estimated_duration: i64,
    pub start: NaiveDate,
    pub duration: i64,
    pub parents: Vec<ParentEdge>,
    pub children: Vec<TaskId>,
    pub modifiers: Vec<Modifier>,
    pub delays: Vec<DelayId>,
}

impl TaskNode {
    pub fn new(
        project_id: impl Into<ProjectId>,
        id: impl Into<TaskId>,
        estimated_start: NaiveDate,
        estimated_duration: i64,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            id: id.into(),
            estimated_start,
            estimated_duration,
            start: estimated_start,
            duration: estimated_duration,
            parents: Vec::new(),
            children: Vec::new(),
            modifiers: Vec::new(),
            delays: Vec::new(),
        }
    }

    /// Computed end date (`start + duration`).
    pub fn end(&self) -> NaiveDate {
        date::add_days(self.start, self.duration)
    }

    /// True for zero-duration milestone tasks.
    pub fn is_milestone(&self) -> bool {
        self.estimated_duration == 0
    }

    /// Sum of modifier deltas with the given anchor.
    pub fn modifier_sum(&self, anchor: Anchor) -> i64 {
        self.modifiers
            .iter()
            .filter(|m| m.anchor == anchor)
            .map(|m| m.delta)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn new_task_starts_at_its_estimate() {
        let task = TaskNode::new("p1", "task1", date(2016, 8, 15), 31);
        assert_eq!(task.start, task.estimated_start);
        assert_eq!(task.duration, 31);
        assert_eq!(task.end(), date(2016, 9, 15));
        assert!(!task.is_milestone());
    }

    #[test]
    fn modifier_sums_split_by_anchor() {
        let mut task = TaskNode::new("p1", "task1", date(2016, 8, 15), 10);
        task.modifiers.push(Modifier::new(5, Anchor::End));
        task.modifiers.push(Modifier::new(-2, Anchor::End));
        task.modifiers.push(Modifier::new(3, Anchor::Beginning));
        assert_eq!(task.modifier_sum(Anchor::End), 3);
        assert_eq!(task.modifier_sum(Anchor::Beginning), 3);
    }
}
