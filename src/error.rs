//! Error types for the query cacher
//!
//! Provides unified error handling using thiserror. Every stage of a cached
//! call (naming, source, encode, decode, store) has its own variant so callers
//! can tell which stage failed.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Store Error ==
/// Failure reported by a cache store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Store could not be reached or refused the command
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Key or value rejected by the store
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Key pattern could not be parsed
    #[error("Invalid key pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Store is full and eviction failed
    #[error("Store full: {0}")]
    Full(String),
}

// == Source Error ==
/// Failure reported by the underlying data source.
#[derive(Error, Debug)]
pub enum SourceError {
    /// Query execution failed
    #[error("Query failed: {0}")]
    Query(String),

    /// Arguments did not fit the operation
    #[error("Invalid arguments for {operation}: {reason}")]
    InvalidArguments { operation: String, reason: String },
}

// == Cacher Error ==
/// Unified error type for cached query execution and invalidation.
#[derive(Error, Debug)]
pub enum CacherError {
    /// Entity name or prefix is not a usable key segment
    #[error("Invalid {kind} '{name}': expected 1 to 96 letters, digits, '_', '-' or '.'")]
    InvalidName { kind: &'static str, name: String },

    /// Operation is not registered for the bound entity
    #[error("Unknown operation '{operation}' for entity '{entity}'")]
    UnknownOperation { entity: String, operation: String },

    /// Underlying data source failed
    #[error("Data source error: {0}")]
    Source(#[from] SourceError),

    /// Result could not be converted to storable text
    #[error("Failed to encode result: {0}")]
    Encode(#[source] serde_json::Error),

    /// Cached text could not be parsed back
    #[error("Failed to decode cache entry '{key}': {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Cache store failed
    #[error("Cache store error: {0}")]
    Store(#[from] StoreError),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacherError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacherError::InvalidName { .. } | CacherError::UnknownOperation { .. } => {
                StatusCode::BAD_REQUEST
            }
            CacherError::Source(SourceError::InvalidArguments { .. }) => StatusCode::BAD_REQUEST,
            CacherError::Source(_) => StatusCode::BAD_GATEWAY,
            CacherError::Store(StoreError::Full(_)) => StatusCode::SERVICE_UNAVAILABLE,
            CacherError::Encode(_) | CacherError::Decode { .. } | CacherError::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the query cacher.
pub type Result<T> = std::result::Result<T, CacherError>;
