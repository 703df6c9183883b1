//! Query Cacher - cache-aside caching for data source queries
//!
//! Derives deterministic keys from `(entity, operation, arguments)`, serves
//! repeated queries from a key-value store and invalidates single entries or
//! whole entities.

pub mod api;
pub mod cacher;
pub mod config;
pub mod error;
pub mod key;
pub mod models;
pub mod source;
pub mod store;
pub mod tasks;

pub use api::AppState;
pub use cacher::{Cacher, CacherConfig, Fetched, Operation};
pub use config::Config;
pub use error::{CacherError, Result, SourceError, StoreError};
pub use key::{derive_key, Arg, CacheKey, SharedArg};
pub use source::{DataSource, MemorySource, QueryOutput};
pub use store::{CacheStore, MemoryStore};
pub use tasks::spawn_cleanup_task;
