//! Expiry Sweep Task

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::store::Keyspace;

/// Spawns a task that removes expired entries every `interval_secs` seconds.
///
/// Reads already skip expired entries; the sweep only reclaims memory. Abort
/// the returned handle on shutdown.
///
/// ```ignore
/// let store = MemoryStore::new(10_000);
/// let sweeper = spawn_cleanup_task(store.keyspace(), 1);
/// // during shutdown
/// sweeper.abort();
/// ```
pub fn spawn_cleanup_task(keyspace: Arc<RwLock<Keyspace>>, interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(interval_secs.max(1));

    tokio::spawn(async move {
        info!(interval_secs = interval.as_secs(), "Starting expiry sweep task");

        loop {
            tokio::time::sleep(interval).await;

            let removed = keyspace.write().await.cleanup_expired();

            if removed > 0 {
                info!(removed, "Expiry sweep removed entries");
            } else {
                debug!("Expiry sweep found nothing to remove");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{CacheStore, MemoryStore};

    #[tokio::test]
    async fn test_sweep_removes_expired_entries() {
        let store = MemoryStore::new(100);
        store
            .set_with_expiry("cacher:User:count:a", "1".to_string(), 1)
            .await
            .unwrap();

        let handle = spawn_cleanup_task(store.keyspace(), 1);
        tokio::time::sleep(Duration::from_millis(2500)).await;

        assert!(store.is_empty().await, "expired entry should be swept");
        assert_eq!(store.stats().await.expirations, 1);

        handle.abort();
    }

    #[tokio::test]
    async fn test_sweep_preserves_live_entries() {
        let store = MemoryStore::new(100);
        store
            .set_with_expiry("cacher:User:count:a", "1".to_string(), 3600)
            .await
            .unwrap();
        store
            .set_with_expiry("cacher:User:count:b", "2".to_string(), 0)
            .await
            .unwrap();

        let handle = spawn_cleanup_task(store.keyspace(), 1);
        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert_eq!(store.len().await, 2);
        assert_eq!(
            store.get("cacher:User:count:a").await.unwrap(),
            Some("1".to_string())
        );

        handle.abort();
    }

    #[tokio::test]
    async fn test_sweep_can_be_aborted() {
        let store = MemoryStore::new(100);
        let handle = spawn_cleanup_task(store.keyspace(), 1);

        handle.abort();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "task should stop after abort");
    }
}
