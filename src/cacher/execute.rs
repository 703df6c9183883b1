//! Cache-aside execution.

use serde_json::Value;
use tracing::{debug, warn};

use crate::cacher::{Cacher, Operation};
use crate::error::{CacherError, Result};
use crate::key::{Arg, CacheKey};
use crate::source::DataSource;
use crate::store::CacheStore;

/// A result together with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched {
    /// Normalized result, identical whether it was cached or computed
    pub value: Value,
    /// Whether the value was served from the store
    pub hit: bool,
    /// Key the value is stored under
    pub key: CacheKey,
}

impl<S, D> Cacher<S, D>
where
    S: CacheStore + ?Sized,
    D: DataSource + ?Sized,
{
    /// Runs the named operation through the cache and returns its result.
    pub async fn execute(&self, operation: &str, args: &[Arg]) -> Result<Value> {
        Ok(self.fetch(operation, args).await?.value)
    }

    /// Like [`Cacher::execute`], but also reports the key and whether the
    /// store answered.
    pub async fn fetch(&self, operation: &str, args: &[Arg]) -> Result<Fetched> {
        let operation = self.resolve(operation)?;
        self.fetch_operation(operation, args).await
    }

    /// Cache-aside lookup for an already resolved operation.
    ///
    /// Fails with [`CacherError::UnknownOperation`] before touching the store
    /// when the source does not register `operation` for this entity. A
    /// result is written only after the source call, normalization and
    /// encoding all succeeded.
    pub async fn fetch_operation(&self, operation: Operation, args: &[Arg]) -> Result<Fetched> {
        self.ensure_supported(operation)?;
        let key = self.key(operation, args);

        if let Some(text) = self.store.get(key.as_str()).await? {
            let value = serde_json::from_str(&text).map_err(|source| {
                warn!(key = %key, "Cached entry is not valid JSON");
                CacherError::Decode {
                    key: key.to_string(),
                    source,
                }
            })?;
            debug!(key = %key, "Cache hit");
            return Ok(Fetched {
                value,
                hit: true,
                key,
            });
        }

        debug!(key = %key, "Cache miss");
        let output = self.source.call(&self.entity, operation, args).await?;
        let value = output.into_plain().map_err(CacherError::Encode)?;
        let text = serde_json::to_string(&value).map_err(CacherError::Encode)?;

        self.store
            .set_with_expiry(key.as_str(), text, self.config.ttl_seconds)
            .await?;
        debug!(key = %key, ttl = self.config.ttl_seconds, "Cached query result");

        Ok(Fetched {
            value,
            hit: false,
            key,
        })
    }

    /// Parses an operation name and checks that the source registers it for
    /// this entity.
    pub fn resolve(&self, name: &str) -> Result<Operation> {
        let operation = name
            .parse::<Operation>()
            .map_err(|_| self.unknown_operation(name))?;
        self.ensure_supported(operation)?;
        Ok(operation)
    }

    fn ensure_supported(&self, operation: Operation) -> Result<()> {
        if self.source.supports(&self.entity, operation) {
            Ok(())
        } else {
            Err(self.unknown_operation(operation.as_str()))
        }
    }

    fn unknown_operation(&self, name: &str) -> CacherError {
        CacherError::UnknownOperation {
            entity: self.entity.clone(),
            operation: name.to_string(),
        }
    }
}
