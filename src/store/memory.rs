//! In-Memory Store
//!
//! [`CacheStore`] over a shared [`Keyspace`].

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::store::{CacheStore, Keyspace, StoreResult, StoreStats};

/// Cheaply cloneable handle to a shared keyspace.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    keyspace: Arc<RwLock<Keyspace>>,
}

impl MemoryStore {
    /// Creates a store holding at most `max_entries` keys.
    pub fn new(max_entries: usize) -> Self {
        Self::from_keyspace(Keyspace::new(max_entries))
    }

    pub fn from_keyspace(keyspace: Keyspace) -> Self {
        Self {
            keyspace: Arc::new(RwLock::new(keyspace)),
        }
    }

    /// Shared keyspace, for the expiry sweeper.
    pub fn keyspace(&self) -> Arc<RwLock<Keyspace>> {
        Arc::clone(&self.keyspace)
    }

    pub async fn stats(&self) -> StoreStats {
        self.keyspace.read().await.stats()
    }

    pub async fn len(&self) -> usize {
        self.keyspace.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.keyspace.read().await.is_empty()
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn set_with_expiry(
        &self,
        key: &str,
        value: String,
        ttl_seconds: u64,
    ) -> StoreResult<()> {
        self.keyspace
            .write()
            .await
            .set(key.to_string(), value, ttl_seconds)
    }

    // Write lock: a read updates LRU order and statistics.
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.keyspace.write().await.get(key))
    }

    async fn delete(&self, keys: &[String]) -> StoreResult<usize> {
        Ok(self.keyspace.write().await.delete(keys))
    }

    async fn keys_matching(&self, pattern: &str) -> StoreResult<Vec<String>> {
        self.keyspace.read().await.keys_matching(pattern)
    }
}
