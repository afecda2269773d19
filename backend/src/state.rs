use std::sync::Arc;

use crate::ai::AiDispatcher;
use crate::config::{Config, StorageBackend};
use crate::store::{MemoryStore, RedisStore, Store, StoreResult};

/// Shared by every request. Nothing in here is mutated after start-up.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub ai: Arc<AiDispatcher>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, ai: AiDispatcher) -> Self {
        Self {
            store,
            ai: Arc::new(ai),
        }
    }

    pub fn from_config(config: &Config) -> StoreResult<Self> {
        let store: Arc<dyn Store> = match config.storage {
            StorageBackend::Redis => Arc::new(RedisStore::open(&config.redis_url)?),
            StorageBackend::Memory => Arc::new(MemoryStore::new()),
        };
        Ok(Self::new(store, AiDispatcher::from_config(&config.ai)))
    }
}
