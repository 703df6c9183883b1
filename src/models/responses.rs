//! Response DTOs for the query cacher API

use serde::Serialize;
use serde_json::Value;

use crate::cacher::{Fetched, Operation};
use crate::store::StoreStats;

/// Response body for `POST /query/:entity/:operation`
#[derive(Debug, Clone, Serialize)]
pub struct QueryResponse {
    pub entity: String,
    pub operation: Operation,
    /// Key the result is cached under
    pub key: String,
    /// Whether the result came from the cache
    pub cache_hit: bool,
    pub result: Value,
}

impl QueryResponse {
    pub fn new(entity: impl Into<String>, operation: Operation, fetched: Fetched) -> Self {
        Self {
            entity: entity.into(),
            operation,
            key: fetched.key.into_string(),
            cache_hit: fetched.hit,
            result: fetched.value,
        }
    }
}

/// Response body for both invalidation endpoints
#[derive(Debug, Clone, Serialize)]
pub struct InvalidateResponse {
    pub entity: String,
    /// Present for point invalidation only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Number of entries removed
    pub removed: usize,
}

impl InvalidateResponse {
    pub fn entry(
        entity: impl Into<String>,
        operation: Operation,
        key: impl Into<String>,
        removed: bool,
    ) -> Self {
        Self {
            entity: entity.into(),
            operation: Some(operation),
            key: Some(key.into()),
            removed: usize::from(removed),
        }
    }

    pub fn entity(entity: impl Into<String>, removed: usize) -> Self {
        Self {
            entity: entity.into(),
            operation: None,
            key: None,
            removed,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expirations: u64,
    /// Current number of entries in the store
    pub total_entries: usize,
    /// hits / (hits + misses)
    pub hit_rate: f64,
    /// Operations the data source has executed
    pub source_calls: u64,
}

impl StatsResponse {
    pub fn new(stats: &StoreStats, source_calls: u64) -> Self {
        Self {
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            expirations: stats.expirations,
            total_entries: stats.total_entries,
            hit_rate: stats.hit_rate(),
            source_calls,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
