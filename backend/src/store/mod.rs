//! Persistence for tasks and moods.
//!
//! Records are stored as independent JSON documents keyed by id. Ordering,
//! limits and validation belong to the handlers; a store only reads and
//! writes whole records. Last write wins.

mod memory_store;
mod redis_store;

pub use self::memory_store::MemoryStore;
pub use self::redis_store::RedisStore;

use async_trait::async_trait;
use orbit_shared::{MoodEntry, Task};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait Store: Send + Sync {
    async fn list_tasks(&self) -> StoreResult<Vec<Task>>;
    async fn get_task(&self, id: Uuid) -> StoreResult<Option<Task>>;
    async fn put_task(&self, task: &Task) -> StoreResult<()>;
    /// Returns `false` when no task had this id.
    async fn delete_task(&self, id: Uuid) -> StoreResult<bool>;

    async fn list_moods(&self) -> StoreResult<Vec<MoodEntry>>;
    async fn put_mood(&self, mood: &MoodEntry) -> StoreResult<()>;
    /// Removes every mood entry and returns how many there were.
    async fn clear_moods(&self) -> StoreResult<usize>;
}
