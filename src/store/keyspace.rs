//! Keyspace Module
//!
//! The in-memory store engine: HashMap storage with LRU tracking, lazy TTL
//! expiry and glob-pattern key listing.

use std::collections::HashMap;

use glob::Pattern;

use crate::error::StoreError;
use crate::store::entry::current_timestamp_ms;
use crate::store::{LruTracker, StoreStats, StoredEntry, MAX_KEY_LENGTH, MAX_VALUE_SIZE};

// == Keyspace ==
/// Bounded key-value map with expiry and LRU eviction.
#[derive(Debug)]
pub struct Keyspace {
    entries: HashMap<String, StoredEntry>,
    lru: LruTracker,
    stats: StoreStats,
    max_entries: usize,
}

impl Keyspace {
    // == Constructor ==
    /// Creates an empty keyspace holding at most `max_entries` keys.
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            stats: StoreStats::new(),
            max_entries,
        }
    }

    // == Set ==
    /// Stores `value` under `key`, replacing any previous entry and its TTL.
    ///
    /// `ttl_seconds == 0` stores without expiry. When a new key would exceed
    /// capacity, expired entries are swept first, then the least recently
    /// used key is evicted.
    pub fn set(&mut self, key: String, value: String, ttl_seconds: u64) -> Result<(), StoreError> {
        if key.is_empty() || key.len() > MAX_KEY_LENGTH {
            return Err(StoreError::InvalidRequest(format!(
                "Key must be between 1 and {} bytes",
                MAX_KEY_LENGTH
            )));
        }

        if value.len() > MAX_VALUE_SIZE {
            return Err(StoreError::InvalidRequest(format!(
                "Value exceeds maximum size of {} bytes",
                MAX_VALUE_SIZE
            )));
        }

        if !self.entries.contains_key(&key) && self.entries.len() >= self.max_entries {
            self.cleanup_expired();
        }

        if !self.entries.contains_key(&key) && self.entries.len() >= self.max_entries {
            let evicted = self
                .lru
                .evict_oldest()
                .ok_or_else(|| StoreError::Full("capacity is zero".to_string()))?;
            self.entries.remove(&evicted);
            self.stats.record_eviction();
        }

        self.entries.insert(key.clone(), StoredEntry::new(value, ttl_seconds));
        self.lru.touch(&key);
        Ok(())
    }

    // == Get ==
    /// Returns the live value for `key`, dropping it first if expired.
    pub fn get(&mut self, key: &str) -> Option<String> {
        let now = current_timestamp_ms();
        let expired = self.entries.get(key).map(|entry| entry.is_expired_at(now));
        let value = match expired {
            Some(true) => {
                self.remove_entry(key);
                self.stats.record_expirations(1);
                None
            }
            Some(false) => self.entries.get(key).map(|entry| entry.value.clone()),
            None => None,
        };

        self.stats.record_lookup(value.is_some());
        if value.is_some() {
            self.lru.touch(key);
        }
        value
    }

    // == Delete ==
    /// Removes every listed key, returning how many existed.
    pub fn delete(&mut self, keys: &[String]) -> usize {
        keys.iter().filter(|key| self.remove_entry(key)).count()
    }

    // == Keys Matching ==
    /// Lists live keys matching a glob pattern (`*`, `?`, `[...]`), sorted.
    pub fn keys_matching(&self, pattern: &str) -> Result<Vec<String>, StoreError> {
        let pattern = Pattern::new(pattern).map_err(|e| StoreError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.msg.to_string(),
        })?;

        let now = current_timestamp_ms();
        let mut keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(key, entry)| !entry.is_expired_at(now) && pattern.matches(key))
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();
        Ok(keys)
    }

    /// Remaining TTL in seconds for a live key; `Some(None)` means no expiry.
    pub fn ttl(&self, key: &str) -> Option<Option<u64>> {
        self.entries
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(StoredEntry::ttl_remaining)
    }

    // == Stats ==
    pub fn stats(&self) -> StoreStats {
        let mut stats = self.stats.clone();
        stats.total_entries = self.entries.len();
        stats
    }

    // == Cleanup Expired ==
    /// Removes all expired entries, returning how many were removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let now = current_timestamp_ms();
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            self.remove_entry(key);
        }
        self.stats.record_expirations(expired.len());
        expired.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn remove_entry(&mut self, key: &str) -> bool {
        self.lru.remove(key);
        self.entries.remove(key).is_some()
    }
}
