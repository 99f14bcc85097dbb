use std::collections::HashMap;

use tracing::{info, warn};

use crate::dao::ProjectStore;
use crate::error::Result;

use super::cycles::find_cyclic_dependency;
use super::project::ProjectGraph;
use super::task::TaskRelation;
use super::{ProjectId, TaskId};

/// Process-wide owner of every project graph.
///
/// The registry is plain mutable data; callers are expected to serialize
/// writes that touch the same project (one in-flight mutation per task), the
/// graph itself takes `&mut` and enforces nothing.
#[derive(Debug, Default)]
pub struct GraphRegistry {
    projects: HashMap<ProjectId, ProjectGraph>,
}

impl GraphRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_project(&mut self, id: impl Into<ProjectId>) -> &mut ProjectGraph {
        let id = id.into();
        self.projects
            .entry(id.clone())
            .or_insert_with(|| ProjectGraph::new(id))
    }

    pub fn project(&self, id: &str) -> Option<&ProjectGraph> {
        self.projects.get(id)
    }

    pub fn project_mut(&mut self, id: &str) -> Option<&mut ProjectGraph> {
        self.projects.get_mut(id)
    }

    pub fn projects(&self) -> impl Iterator<Item = &ProjectGraph> {
        self.projects.values()
    }

    /// Bulk-load every persisted project and bring its graph to a computed
    /// state.
    ///
    /// Relations are pre-validated with the batch cycle check, then wired
    /// through the same incremental operations a live request would use, so
    /// each child's dates are derived as its edges appear. Relations whose
    /// endpoints were not loaded are skipped, matching the cycle check's
    /// tolerance for edges pointing outside the batch. Every root task is
    /// computed once at the end as a final settling pass.
    pub async fn load(store: &dyn ProjectStore) -> Result<Self> {
        let mut registry = Self::new();

        for project_id in store.project_ids().await? {
            let tasks = store.project_tasks(&project_id).await?;
            let relations = store.task_relations(&project_id).await?;
            let delays = store.project_delays(&project_id).await?;
            let delay_relations = store.delay_relations(&project_id).await?;

            let task_ids: Vec<TaskId> = tasks.iter().map(|t| t.id.clone()).collect();
            let pairs: Vec<(TaskId, TaskId)> = relations
                .iter()
                .map(|r| (r.parent.clone(), r.child.clone()))
                .collect();
            find_cyclic_dependency(&task_ids, &pairs)?;

            let graph = registry.add_project(project_id.clone());

            for record in &tasks {
                graph.add_task(
                    record.id.clone(),
                    record.estimated_start,
                    record.estimated_duration,
                );
            }
            // Persisted modifiers are applied before any edge exists, so the
            // local recompute settles duration and start in isolation.
            for record in &tasks {
                if record.modifiers.is_empty() {
                    continue;
                }
                graph.apply_stored_modifiers(&record.id, record.modifiers.clone())?;
            }

            for relation in &relations {
                if graph.task(&relation.parent).is_none() || graph.task(&relation.child).is_none()
                {
                    warn!(
                        project = %project_id,
                        parent = %relation.parent,
                        child = %relation.child,
                        "skipping task relation with unknown endpoint"
                    );
                    continue;
                }
                graph.add_task_relation(
                    &relation.parent,
                    &relation.child,
                    TaskRelation {
                        lag: relation.lag,
                        anchor: relation.anchor,
                    },
                )?;
            }

            for record in &delays {
                graph.add_delay(record.id.clone(), record.date);
            }
            for relation in &delay_relations {
                if graph.task(&relation.task).is_none() || graph.delay(&relation.delay).is_none() {
                    warn!(
                        project = %project_id,
                        task = %relation.task,
                        delay = %relation.delay,
                        "skipping delay relation with unknown endpoint"
                    );
                    continue;
                }
                graph.add_delay_relation(&relation.task, &relation.delay, relation.lag)?;
            }

            let roots: Vec<TaskId> = graph.roots().map(|t| t.id.clone()).collect();
            for root in roots {
                graph.compute_task(&root)?;
            }

            info!(
                project = %project_id,
                tasks = tasks.len(),
                relations = relations.len(),
                delays = delays.len(),
                "project graph loaded"
            );
        }

        Ok(registry)
    }
}
