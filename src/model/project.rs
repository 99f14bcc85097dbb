use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::debug;

use crate::dao::{ModifierRecord, ProjectStore};
use crate::date;
use crate::error::{GraphError, NotFoundError, Result};

use super::delay::{DelayEdge, DelayNode};
use super::task::{Anchor, Modifier, ParentEdge, TaskNode, TaskRelation};
use super::{DelayId, ProjectId, TaskId};

/// The task graph of a single project: id-keyed task and delay nodes plus the
/// recomputation driver that keeps their derived dates consistent.
#[derive(Debug)]
pub struct ProjectGraph {
    id: ProjectId,
    tasks: HashMap<TaskId, TaskNode>,
    delays: HashMap<DelayId, DelayNode>,
}

impl ProjectGraph {
    pub fn new(id: impl Into<ProjectId>) -> Self {
        Self {
            id: id.into(),
            tasks: HashMap::new(),
            delays: HashMap::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn task(&self, id: &str) -> Option<&TaskNode> {
        self.tasks.get(id)
    }

    pub fn delay(&self, id: &str) -> Option<&DelayNode> {
        self.delays.get(id)
    }

    pub fn tasks(&self) -> impl Iterator<Item = &TaskNode> {
        self.tasks.values()
    }

    pub fn delays(&self) -> impl Iterator<Item = &DelayNode> {
        self.delays.values()
    }

    /// Tasks without parents; entry points for a full recomputation.
    pub fn roots(&self) -> impl Iterator<Item = &TaskNode> {
        self.tasks.values().filter(|t| t.parents.is_empty())
    }

    /// Add a task with its baseline dates. The computed state starts at the
    /// estimate; with no edges yet there is nothing to propagate.
    pub fn add_task(
        &mut self,
        id: impl Into<TaskId>,
        estimated_start: NaiveDate,
        estimated_duration: i64,
    ) -> &TaskNode {
        let id = id.into();
        let node = TaskNode::new(self.id.clone(), id.clone(), estimated_start, estimated_duration);
        self.tasks.entry(id).or_insert(node)
    }

    /// Add a delay marker with its target date.
    pub fn add_delay(&mut self, id: impl Into<DelayId>, date: NaiveDate) -> &DelayNode {
        let id = id.into();
        let node = DelayNode::new(self.id.clone(), id.clone(), date);
        self.delays.entry(id).or_insert(node)
    }

    /// Wire a parent → child dependency edge and recompute the parent's
    /// children. The parent's own dates are unaffected, but it stays marked
    /// on the path so a back edge is reported as a cycle rather than looping.
    pub fn add_task_relation(
        &mut self,
        parent_id: &str,
        child_id: &str,
        relation: TaskRelation,
    ) -> Result<()> {
        if !self.tasks.contains_key(parent_id) {
            return Err(NotFoundError::task(parent_id).into());
        }
        let child = self
            .tasks
            .get_mut(child_id)
            .ok_or_else(|| NotFoundError::task(child_id))?;
        child.parents.push(ParentEdge {
            parent: parent_id.to_string(),
            relation,
        });

        let children = {
            let parent = self
                .tasks
                .get_mut(parent_id)
                .ok_or_else(|| NotFoundError::task(parent_id))?;
            parent.children.push(child_id.to_string());
            parent.children.clone()
        };

        let mut path = vec![parent_id.to_string()];
        for child in children {
            self.mark_and_compute(&child, &mut path)?;
        }
        Ok(())
    }

    /// Wire a task → delay contribution edge and recompute every delay the
    /// task now feeds. Delays have no children, so no cycle protection is
    /// needed here.
    pub fn add_delay_relation(&mut self, task_id: &str, delay_id: &str, lag: i64) -> Result<()> {
        if !self.delays.contains_key(delay_id) {
            return Err(NotFoundError::delay(delay_id).into());
        }
        let task = self
            .tasks
            .get_mut(task_id)
            .ok_or_else(|| NotFoundError::task(task_id))?;
        task.delays.push(delay_id.to_string());
        let delay_ids = task.delays.clone();

        if let Some(delay) = self.delays.get_mut(delay_id) {
            delay.relations.push(DelayEdge {
                task: task_id.to_string(),
                lag,
            });
        }

        for id in delay_ids {
            self.compute_delay(&id)?;
        }
        Ok(())
    }

    /// Apply a duration modifier to a task: persist it through the store,
    /// then append it in memory and recompute. A persistence failure aborts
    /// before any in-memory mutation, so no unpersisted modifier can exist.
    pub async fn add_modifier(
        &mut self,
        store: &dyn ProjectStore,
        task_id: &str,
        delta: i64,
        anchor: Anchor,
    ) -> Result<Modifier> {
        if !self.tasks.contains_key(task_id) {
            return Err(NotFoundError::task(task_id).into());
        }

        let modifier = Modifier::new(delta, anchor);
        let record = ModifierRecord {
            project_id: self.id.clone(),
            task: task_id.to_string(),
            id: modifier.id,
            delta,
            anchor,
        };
        let stored = store.add_modifier(record).await?;
        store
            .add_modifier_for_task(&self.id, task_id, stored.id)
            .await?;

        if let Some(task) = self.tasks.get_mut(task_id) {
            task.modifiers.push(modifier.clone());
        }
        self.compute_task(task_id)?;
        Ok(modifier)
    }

    /// Attach modifiers that are already persisted (bulk load path) and
    /// settle the task locally.
    pub fn apply_stored_modifiers(&mut self, task_id: &str, modifiers: Vec<Modifier>) -> Result<()> {
        let task = self
            .tasks
            .get_mut(task_id)
            .ok_or_else(|| NotFoundError::task(task_id))?;
        task.modifiers.extend(modifiers);
        self.compute_task(task_id)
    }

    /// Recompute a task's dates and propagate to its descendants until a
    /// fixed point is reached.
    pub fn compute_task(&mut self, id: &str) -> Result<()> {
        let mut path: Vec<TaskId> = Vec::new();
        self.mark_and_compute(id, &mut path)
    }

    /// Recompute every delay's margin from current task state.
    pub fn compute_delays(&mut self) -> Result<()> {
        let ids: Vec<DelayId> = self.delays.keys().cloned().collect();
        for id in ids {
            self.compute_delay(&id)?;
        }
        Ok(())
    }

    /// The recomputation pass for one node.
    ///
    /// `path` holds the tasks currently being recomputed above this call;
    /// meeting one of them again means a live cycle was introduced. Children
    /// are visited one at a time, so the push/pop discipline gives each
    /// branch exactly the marker set it would receive as a per-branch copy.
    fn mark_and_compute(&mut self, id: &str, path: &mut Vec<TaskId>) -> Result<()> {
        if path.iter().any(|marked| marked == id) {
            let mut cycle = path.clone();
            cycle.push(id.to_string());
            return Err(GraphError::CyclicDependency { path: cycle }.into());
        }
        path.push(id.to_string());

        let node = self
            .tasks
            .get(id)
            .ok_or_else(|| GraphError::UnknownTask(id.to_string()))?;
        let current_end = node.end();

        // Duration: end-anchored modifiers stretch the span, never below the
        // baseline estimate.
        let end_sum = node.modifier_sum(Anchor::End);
        let mut duration = node.estimated_duration + end_sum.max(0);

        // Start: the latest of all parent-derived candidates, floored by the
        // task's own estimate. Parents are read as currently stored, not
        // freshly recomputed.
        let mut candidates: Vec<NaiveDate> = Vec::with_capacity(node.parents.len() + 1);
        for edge in &node.parents {
            let parent = self
                .tasks
                .get(edge.parent.as_str())
                .ok_or_else(|| GraphError::UnknownTask(edge.parent.clone()))?;
            let anchor_date = match edge.relation.anchor {
                Anchor::Beginning => parent.start,
                Anchor::End => parent.end(),
            };
            candidates.push(date::add_days(anchor_date, edge.relation.lag));
        }
        candidates.push(node.estimated_start);
        let latest = candidates
            .into_iter()
            .max()
            .ok_or_else(|| GraphError::NoStartCandidate(id.to_string()))?;

        let begin_sum = node.modifier_sum(Anchor::Beginning);
        let mut start = date::add_days(latest, begin_sum.max(0));

        // Milestones absorb any computed duration into the start date.
        if node.is_milestone() {
            start = date::add_days(start, duration);
            duration = 0;
        }

        let new_end = date::add_days(start, duration);
        let changed = new_end != current_end;

        let (children, delay_ids) = {
            let node = self
                .tasks
                .get_mut(id)
                .ok_or_else(|| GraphError::UnknownTask(id.to_string()))?;
            node.start = start;
            node.duration = duration;
            (node.children.clone(), node.delays.clone())
        };

        // Fixed point: an unchanged end date cannot move any child's
        // parent-derived candidate, so propagation stops here.
        if changed {
            debug!(task = id, %start, duration, "schedule moved, propagating");
            for child in children {
                self.mark_and_compute(&child, path)?;
            }
            for delay in delay_ids {
                self.compute_delay(&delay)?;
            }
        }

        path.pop();
        Ok(())
    }

    /// Margin = min over contributing tasks of
    /// `diff_days(task.end, delay.date) - lag`.
    fn compute_delay(&mut self, id: &str) -> Result<()> {
        let delay = self
            .delays
            .get(id)
            .ok_or_else(|| NotFoundError::delay(id))?;

        let mut margin: Option<i64> = None;
        for edge in &delay.relations {
            let task = self
                .tasks
                .get(edge.task.as_str())
                .ok_or_else(|| GraphError::UnknownTask(edge.task.clone()))?;
            let candidate = date::diff_days(task.end(), delay.date) - edge.lag;
            margin = Some(match margin {
                Some(current) => current.min(candidate),
                None => candidate,
            });
        }

        if let Some(margin) = margin {
            if let Some(delay) = self.delays.get_mut(id) {
                delay.apply_margin(margin);
            }
        }
        Ok(())
    }
}
