//! Cache Store Module
//!
//! The key-value store the cacher writes to. [`CacheStore`] is the boundary
//! every backend implements; [`MemoryStore`] is the in-process backend with
//! TTL expiry, LRU eviction and glob key listing.
//!
//! # Zero TTL
//! `set_with_expiry(key, value, 0)` stores the value without expiry: it stays
//! until deleted or evicted. Backends must document their own behavior for a
//! zero TTL (Redis, for one, rejects `SETEX key 0`).

mod entry;
mod keyspace;
mod lru;
mod memory;
mod stats;


use async_trait::async_trait;

use crate::error::StoreError;

pub use entry::StoredEntry;
pub use keyspace::Keyspace;
pub use lru::LruTracker;
pub use memory::MemoryStore;
pub use stats::StoreStats;

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Maximum allowed value size in bytes
pub const MAX_VALUE_SIZE: usize = 1024 * 1024; // 1 MB

/// Result type for store primitives.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

// == Cache Store ==
/// Primitives a cache store must offer.
///
/// Single-key `get`, `set_with_expiry` and `delete` are expected to be atomic;
/// the cacher adds no locking of its own.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Stores `value` under `key` for `ttl_seconds` (see the module docs for zero).
    async fn set_with_expiry(&self, key: &str, value: String, ttl_seconds: u64)
        -> StoreResult<()>;

    /// Returns the stored text, or None when absent or expired.
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Deletes every listed key, returning how many existed. Absent keys are not an error.
    async fn delete(&self, keys: &[String]) -> StoreResult<usize>;

    /// Lists keys matching a glob pattern where `*` matches any run of characters.
    async fn keys_matching(&self, pattern: &str) -> StoreResult<Vec<String>>;
}
