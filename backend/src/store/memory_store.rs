use async_trait::async_trait;
use orbit_shared::{MoodEntry, Task};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Store, StoreResult};

/// Process-local store. Contents are lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    tasks: RwLock<HashMap<Uuid, Task>>,
    moods: RwLock<HashMap<Uuid, MoodEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn list_tasks(&self) -> StoreResult<Vec<Task>> {
        Ok(self.tasks.read().await.values().cloned().collect())
    }

    async fn get_task(&self, id: Uuid) -> StoreResult<Option<Task>> {
        Ok(self.tasks.read().await.get(&id).cloned())
    }

    async fn put_task(&self, task: &Task) -> StoreResult<()> {
        self.tasks.write().await.insert(task.id, task.clone());
        Ok(())
    }

    async fn delete_task(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.tasks.write().await.remove(&id).is_some())
    }

    async fn list_moods(&self) -> StoreResult<Vec<MoodEntry>> {
        Ok(self.moods.read().await.values().cloned().collect())
    }

    async fn put_mood(&self, mood: &MoodEntry) -> StoreResult<()> {
        self.moods.write().await.insert(mood.id, mood.clone());
        Ok(())
    }

    async fn clear_moods(&self) -> StoreResult<usize> {
        let mut moods = self.moods.write().await;
        let count = moods.len();
        moods.clear();
        Ok(count)
    }
}
