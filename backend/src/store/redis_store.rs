use async_trait::async_trait;
use orbit_shared::{MoodEntry, Task};
use redis::{aio::Connection, AsyncCommands, Client};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

use super::{Store, StoreResult};

const TASK_PREFIX: &str = "task";
const MOOD_PREFIX: &str = "mood";

fn key(prefix: &str, id: Uuid) -> String {
    format!("{prefix}:{id}")
}

/// One JSON document per record under `task:{id}` / `mood:{id}`.
#[derive(Clone)]
pub struct RedisStore {
    client: Arc<Client>,
}

impl RedisStore {
    pub fn open(url: &str) -> StoreResult<Self> {
        let client = Client::open(url)?;
        Ok(Self {
            client: Arc::new(client),
        })
    }

    async fn conn(&self) -> StoreResult<Connection> {
        Ok(self.client.get_async_connection().await?)
    }

    async fn load_all<T: DeserializeOwned>(&self, prefix: &str) -> StoreResult<Vec<T>> {
        let mut conn = self.conn().await?;
        let keys: Vec<String> = conn.keys(format!("{prefix}:*")).await?;
        let mut records = Vec::with_capacity(keys.len());

        for key in keys {
            // The key may vanish between KEYS and GET.
            let json: Option<String> = conn.get(&key).await?;
            let Some(json) = json else { continue };
            match serde_json::from_str::<T>(&json) {
                Ok(record) => records.push(record),
                Err(e) => warn!(%key, error = %e, "skipping undecodable record"),
            }
        }

        Ok(records)
    }

    async fn save<T: serde::Serialize>(&self, key: String, record: &T) -> StoreResult<()> {
        let json = serde_json::to_string(record)?;
        let mut conn = self.conn().await?;
        conn.set::<_, _, ()>(key, json).await?;
        Ok(())
    }
}

#[async_trait]
impl Store for RedisStore {
    async fn list_tasks(&self) -> StoreResult<Vec<Task>> {
        self.load_all(TASK_PREFIX).await
    }

    async fn get_task(&self, id: Uuid) -> StoreResult<Option<Task>> {
        let mut conn = self.conn().await?;
        let json: Option<String> = conn.get(key(TASK_PREFIX, id)).await?;
        match json {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn put_task(&self, task: &Task) -> StoreResult<()> {
        self.save(key(TASK_PREFIX, task.id), task).await
    }

    async fn delete_task(&self, id: Uuid) -> StoreResult<bool> {
        let mut conn = self.conn().await?;
        let deleted: usize = conn.del(key(TASK_PREFIX, id)).await?;
        Ok(deleted > 0)
    }

    async fn list_moods(&self) -> StoreResult<Vec<MoodEntry>> {
        self.load_all(MOOD_PREFIX).await
    }

    async fn put_mood(&self, mood: &MoodEntry) -> StoreResult<()> {
        self.save(key(MOOD_PREFIX, mood.id), mood).await
    }

    async fn clear_moods(&self) -> StoreResult<usize> {
        let mut conn = self.conn().await?;
        let keys: Vec<String> = conn.keys(format!("{MOOD_PREFIX}:*")).await?;
        if keys.is_empty() {
            return Ok(0);
        }
        let deleted: usize = conn.del(keys).await?;
        Ok(deleted)
    }
}
