//! Cache invalidation.

use tracing::{debug, info};

use crate::cacher::{Cacher, Operation};
use crate::error::Result;
use crate::key::{entity_pattern, Arg};
use crate::source::DataSource;
use crate::store::CacheStore;

impl<S, D> Cacher<S, D>
where
    S: CacheStore + ?Sized,
    D: DataSource + ?Sized,
{
    /// Removes the entry `execute(operation, args)` would read.
    ///
    /// Succeeds whether or not the entry existed.
    pub async fn invalidate(&self, operation: &str, args: &[Arg]) -> Result<()> {
        let operation = self.resolve(operation)?;
        self.invalidate_operation(operation, args).await?;
        Ok(())
    }

    /// Removes one entry, returning whether it existed.
    pub async fn invalidate_operation(&self, operation: Operation, args: &[Arg]) -> Result<bool> {
        let key = self.key(operation, args);
        let removed = self.store.delete(&[key.to_string()]).await?;
        debug!(key = %key, removed, "Invalidated cache entry");
        Ok(removed > 0)
    }

    /// Removes every entry under this cacher's prefix and entity.
    ///
    /// Returns the number of keys removed. Nothing is deleted when no key
    /// matches, and the matching keys go out in a single delete. A store
    /// failure midway may leave some keys removed and others not.
    pub async fn invalidate_all(&self) -> Result<usize> {
        let pattern = entity_pattern(&self.config.prefix, &self.entity);
        let keys = self.store.keys_matching(&pattern).await?;

        if keys.is_empty() {
            debug!(pattern = %pattern, "No cache entries to invalidate");
            return Ok(0);
        }

        let removed = self.store.delete(&keys).await?;
        info!(entity = %self.entity, pattern = %pattern, removed, "Invalidated entity cache");
        Ok(removed)
    }

    /// Invalidates one entry when given `(operation, args)`, otherwise
    /// everything under the entity. Returns the number of keys removed.
    pub async fn clear(&self, target: Option<(&str, &[Arg])>) -> Result<usize> {
        match target {
            Some((operation, args)) => {
                let operation = self.resolve(operation)?;
                Ok(usize::from(self.invalidate_operation(operation, args).await?))
            }
            None => self.invalidate_all().await,
        }
    }
}
