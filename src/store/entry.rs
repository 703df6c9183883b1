//! Store Entry Module
//!
//! A stored value with its creation and expiry timestamps.

use std::time::{SystemTime, UNIX_EPOCH};

// == Stored Entry ==
/// A single stored value with expiry metadata.
#[derive(Debug, Clone)]
pub struct StoredEntry {
    /// The stored text
    pub value: String,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Expiration timestamp (Unix milliseconds), None = persists until deleted
    pub expires_at: Option<u64>,
}

impl StoredEntry {
    // == Constructor ==
    /// Creates an entry expiring `ttl_seconds` from now.
    ///
    /// A TTL of zero stores the entry without expiry.
    pub fn new(value: String, ttl_seconds: u64) -> Self {
        let now = current_timestamp_ms();
        let expires_at = (ttl_seconds > 0).then(|| now.saturating_add(ttl_seconds.saturating_mul(1000)));

        Self {
            value,
            created_at: now,
            expires_at,
        }
    }

    // == Is Expired ==
    /// An entry is expired once the current time reaches its expiry time.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(current_timestamp_ms())
    }

    /// Expiry check against a caller-supplied clock reading.
    pub fn is_expired_at(&self, now_ms: u64) -> bool {
        self.expires_at.is_some_and(|expires| now_ms >= expires)
    }

    // == Time To Live ==
    /// Remaining lifetime in whole seconds; None when the entry never expires.
    pub fn ttl_remaining(&self) -> Option<u64> {
        let now = current_timestamp_ms();
        self.expires_at
            .map(|expires| expires.saturating_sub(now) / 1000)
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
