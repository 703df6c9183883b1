//! Cacher Module
//!
//! Read-through, write-invalidate caching for one entity of a data source.
//!
//! A [`Cacher`] derives a key for every `(operation, arguments)` call, serves
//! the stored result on a hit, and on a miss runs the operation on the source,
//! stores the normalized result with the configured TTL and returns it.
//! Invalidation removes one derived key or every key under the entity.
//!
//! Concurrent misses for the same key are not coalesced: each runs the
//! operation and writes the entry, and the last write wins.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use query_cacher::{Arg, Cacher, MemorySource, MemoryStore};
//! use serde_json::json;
//!
//! # async fn example() -> query_cacher::Result<()> {
//! let store = Arc::new(MemoryStore::new(10_000));
//! let source = Arc::new(MemorySource::from_json(json!({"User": [{"id": 7}]}))?);
//!
//! let users = Cacher::new("User", store, source)?
//!     .with_prefix("app")?
//!     .with_ttl(300);
//!
//! let user = users.find_one(&[Arg::from(json!({"where": {"id": 7}}))]).await?;
//! users.invalidate_all().await?;
//! # Ok(())
//! # }
//! ```

mod execute;
mod invalidate;
mod operation;

use std::sync::Arc;

use crate::error::Result;
use crate::key::{derive_key, validate_segment, Arg, CacheKey};
use crate::source::DataSource;
use crate::store::CacheStore;

pub use execute::Fetched;
pub use operation::{Operation, UnknownOperationName};

/// Namespace prefix used when none is configured.
pub const DEFAULT_PREFIX: &str = "cacher";

// == Cacher Config ==
/// Per-instance cache settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacherConfig {
    /// First key segment
    pub prefix: String,
    /// Expiry passed to the store on every write; zero means the store's
    /// no-expiry behavior (see [`crate::store`])
    pub ttl_seconds: u64,
}

impl Default for CacherConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            ttl_seconds: 0,
        }
    }
}

impl CacherConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_ttl(mut self, seconds: u64) -> Self {
        self.ttl_seconds = seconds;
        self
    }
}

// == Cacher ==
/// Cache-aside executor and invalidator bound to one entity.
///
/// Configuration setters consume the cacher, so settings are fixed once it
/// is shared.
pub struct Cacher<S: ?Sized, D: ?Sized> {
    entity: String,
    config: CacherConfig,
    store: Arc<S>,
    source: Arc<D>,
}

impl<S: ?Sized, D: ?Sized> Clone for Cacher<S, D> {
    fn clone(&self) -> Self {
        Self {
            entity: self.entity.clone(),
            config: self.config.clone(),
            store: Arc::clone(&self.store),
            source: Arc::clone(&self.source),
        }
    }
}

impl<S, D> Cacher<S, D>
where
    S: CacheStore + ?Sized,
    D: DataSource + ?Sized,
{
    /// Binds a cacher to `entity` with the default configuration.
    pub fn new(entity: impl Into<String>, store: Arc<S>, source: Arc<D>) -> Result<Self> {
        let entity = entity.into();
        validate_segment("entity", &entity)?;

        Ok(Self {
            entity,
            config: CacherConfig::default(),
            store,
            source,
        })
    }

    /// Replaces the whole configuration.
    pub fn with_config(mut self, config: CacherConfig) -> Result<Self> {
        validate_segment("prefix", &config.prefix)?;
        self.config = config;
        Ok(self)
    }

    /// Sets the key prefix.
    pub fn with_prefix(self, prefix: impl Into<String>) -> Result<Self> {
        let config = self.config.clone().with_prefix(prefix);
        self.with_config(config)
    }

    /// Sets the TTL in seconds for every entry written from now on.
    pub fn with_ttl(mut self, seconds: u64) -> Self {
        self.config.ttl_seconds = seconds;
        self
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn config(&self) -> &CacherConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn source(&self) -> &D {
        &self.source
    }

    /// Key under which `operation` with `args` is cached.
    pub fn key(&self, operation: Operation, args: &[Arg]) -> CacheKey {
        derive_key(&self.entity, operation.as_str(), args, &self.config.prefix)
    }
}

// == Pass-Through Operations ==
macro_rules! pass_through {
    ($($method:ident => $operation:ident),* $(,)?) => {
        impl<S, D> Cacher<S, D>
        where
            S: CacheStore + ?Sized,
            D: DataSource + ?Sized,
        {
            $(
                #[doc = concat!("Cached [`Operation::", stringify!($operation), "`].")]
                pub async fn $method(&self, args: &[Arg]) -> Result<serde_json::Value> {
                    Ok(self.fetch_operation(Operation::$operation, args).await?.value)
                }
            )*
        }
    };
}

pass_through! {
    find => Find,
    find_one => FindOne,
    find_all => FindAll,
    find_and_count_all => FindAndCountAll,
    all => All,
    min => Min,
    max => Max,
    sum => Sum,
    count => Count,
}
