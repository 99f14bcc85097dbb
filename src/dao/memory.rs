//! In-memory [`ProjectStore`] with an optional JSON snapshot on disk.

use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{NotFoundError, StoreError};
use crate::model::{Modifier, ProjectId};

use super::{
    DelayRecord, DelayRelationRecord, ModifierRecord, ProjectStore, TaskRecord,
    TaskRelationRecord,
};

/// Flat record lists, the shape persisted to JSON.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    tasks: Vec<TaskRecord>,
    task_relations: Vec<TaskRelationRecord>,
    delays: Vec<DelayRecord>,
    delay_relations: Vec<DelayRelationRecord>,
    modifiers: Vec<ModifierRecord>,
}

/// Record store backed by plain vectors behind a mutex. Used by the CLI and
/// by tests; doubles as the reference implementation of the DAO contract.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Snapshot>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a snapshot previously written with [`MemoryStore::save_json`].
    pub fn load_json(path: &Path) -> Result<Self, StoreError> {
        let json = std::fs::read_to_string(path)?;
        let snapshot: Snapshot = serde_json::from_str(&json)?;
        Ok(Self {
            inner: Mutex::new(snapshot),
        })
    }

    /// Write the current records to a pretty-printed JSON file.
    pub fn save_json(&self, path: &Path) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(&*self.lock())?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Seed a task record without going through the async interface.
    pub fn insert_task(&self, record: TaskRecord) {
        self.lock().tasks.push(record);
    }

    pub fn insert_task_relation(&self, record: TaskRelationRecord) {
        self.lock().task_relations.push(record);
    }

    pub fn insert_delay(&self, record: DelayRecord) {
        self.lock().delays.push(record);
    }

    pub fn insert_delay_relation(&self, record: DelayRelationRecord) {
        self.lock().delay_relations.push(record);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Snapshot> {
        // No await ever happens while the lock is held.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl ProjectStore for MemoryStore {
    async fn project_ids(&self) -> Result<Vec<ProjectId>, StoreError> {
        let snapshot = self.lock();
        let mut ids: Vec<ProjectId> = Vec::new();
        for task in &snapshot.tasks {
            if !ids.contains(&task.project_id) {
                ids.push(task.project_id.clone());
            }
        }
        for delay in &snapshot.delays {
            if !ids.contains(&delay.project_id) {
                ids.push(delay.project_id.clone());
            }
        }
        Ok(ids)
    }

    async fn project_tasks(&self, project: &str) -> Result<Vec<TaskRecord>, StoreError> {
        Ok(self
            .lock()
            .tasks
            .iter()
            .filter(|t| t.project_id == project)
            .cloned()
            .collect())
    }

    async fn task(&self, project: &str, task: &str) -> Result<TaskRecord, StoreError> {
        self.lock()
            .tasks
            .iter()
            .find(|t| t.project_id == project && t.id == task)
            .cloned()
            .ok_or_else(|| NotFoundError::task(task).into())
    }

    async fn add_task(&self, record: TaskRecord) -> Result<(), StoreError> {
        self.lock().tasks.push(record);
        Ok(())
    }

    async fn delay(&self, project: &str, delay: &str) -> Result<DelayRecord, StoreError> {
        self.lock()
            .delays
            .iter()
            .find(|d| d.project_id == project && d.id == delay)
            .cloned()
            .ok_or_else(|| NotFoundError::delay(delay).into())
    }

    async fn project_delays(&self, project: &str) -> Result<Vec<DelayRecord>, StoreError> {
        Ok(self
            .lock()
            .delays
            .iter()
            .filter(|d| d.project_id == project)
            .cloned()
            .collect())
    }

    async fn task_relations(&self, project: &str) -> Result<Vec<TaskRelationRecord>, StoreError> {
        Ok(self
            .lock()
            .task_relations
            .iter()
            .filter(|r| r.project_id == project)
            .cloned()
            .collect())
    }

    async fn delay_relations(&self, project: &str) -> Result<Vec<DelayRelationRecord>, StoreError> {
        Ok(self
            .lock()
            .delay_relations
            .iter()
            .filter(|r| r.project_id == project)
            .cloned()
            .collect())
    }

    async fn add_modifier(&self, record: ModifierRecord) -> Result<ModifierRecord, StoreError> {
        self.lock().modifiers.push(record.clone());
        Ok(record)
    }

    async fn add_modifier_for_task(
        &self,
        project: &str,
        task: &str,
        modifier: Uuid,
    ) -> Result<(), StoreError> {
        let mut snapshot = self.lock();
        let record = snapshot
            .modifiers
            .iter()
            .find(|m| m.id == modifier)
            .cloned()
            .ok_or_else(|| NotFoundError::modifier(modifier.to_string()))?;
        let task_record = snapshot
            .tasks
            .iter_mut()
            .find(|t| t.project_id == project && t.id == task)
            .ok_or_else(|| NotFoundError::task(task))?;
        task_record.modifiers.push(Modifier {
            id: record.id,
            delta: record.delta,
            anchor: record.anchor,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::model::Anchor;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn task_record(project: &str, id: &str) -> TaskRecord {
        TaskRecord {
            project_id: project.to_string(),
            id: id.to_string(),
            estimated_start: date(2016, 8, 15),
            estimated_duration: 31,
            modifiers: Vec::new(),
        }
    }

    #[tokio::test]
    async fn unknown_task_is_not_found() {
        let store = MemoryStore::new();
        let err = store.task("p1", "task1").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn modifier_link_updates_the_task_record() {
        let store = MemoryStore::new();
        store.insert_task(task_record("p1", "task1"));

        let record = ModifierRecord {
            project_id: "p1".to_string(),
            task: "task1".to_string(),
            id: Uuid::new_v4(),
            delta: 5,
            anchor: Anchor::End,
        };
        let stored = store.add_modifier(record).await.unwrap();
        store
            .add_modifier_for_task("p1", "task1", stored.id)
            .await
            .unwrap();

        let task = store.task("p1", "task1").await.unwrap();
        assert_eq!(task.modifiers.len(), 1);
        assert_eq!(task.modifiers[0].delta, 5);
    }

    #[tokio::test]
    async fn json_snapshot_round_trips() {
        let store = MemoryStore::new();
        store.insert_task(task_record("p1", "task1"));
        store.insert_task(task_record("p2", "task1"));
        store.insert_delay(DelayRecord {
            project_id: "p1".to_string(),
            id: "delay1".to_string(),
            date: date(2016, 12, 25),
        });

        let path = std::env::temp_dir().join(format!("taskgraph-{}.json", Uuid::new_v4()));
        store.save_json(&path).unwrap();
        let restored = MemoryStore::load_json(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(
            restored.project_ids().await.unwrap(),
            vec!["p1".to_string(), "p2".to_string()]
        );
        assert_eq!(restored.project_tasks("p1").await.unwrap().len(), 1);
        assert_eq!(restored.project_delays("p1").await.unwrap().len(), 1);
    }
}
