//! API Handlers
//!
//! HTTP request handlers for each query cacher endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::cacher::{Cacher, CacherConfig};
use crate::config::Config;
use crate::error::Result;
use crate::models::{ArgsRequest, HealthResponse, InvalidateResponse, QueryResponse, StatsResponse};
use crate::source::MemorySource;
use crate::store::MemoryStore;

/// Application state shared across all handlers.
///
/// Cachers are built per request from these parts; all cached state lives
/// in the store.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<MemoryStore>,
    pub source: Arc<MemorySource>,
    pub cacher_config: CacherConfig,
}

impl AppState {
    pub fn new(store: MemoryStore, source: MemorySource, cacher_config: CacherConfig) -> Self {
        Self {
            store: Arc::new(store),
            source: Arc::new(source),
            cacher_config,
        }
    }

    /// Creates an AppState with an empty store sized from the Config.
    pub fn from_config(config: &Config, source: MemorySource) -> Self {
        Self::new(
            MemoryStore::new(config.max_entries),
            source,
            config.cacher_config(),
        )
    }

    /// Cacher bound to `entity` with the server-wide settings.
    pub fn cacher(&self, entity: &str) -> Result<Cacher<MemoryStore, MemorySource>> {
        Cacher::new(entity, Arc::clone(&self.store), Arc::clone(&self.source))?
            .with_config(self.cacher_config.clone())
    }
}

/// Handler for POST /query/:entity/:operation
pub async fn query_handler(
    State(state): State<AppState>,
    Path((entity, operation)): Path<(String, String)>,
    Json(req): Json<ArgsRequest>,
) -> Result<Json<QueryResponse>> {
    let cacher = state.cacher(&entity)?;
    let operation = cacher.resolve(&operation)?;
    let fetched = cacher.fetch_operation(operation, &req.into_args()).await?;

    Ok(Json(QueryResponse::new(entity, operation, fetched)))
}

/// Handler for POST /invalidate/:entity/:operation
pub async fn invalidate_handler(
    State(state): State<AppState>,
    Path((entity, operation)): Path<(String, String)>,
    Json(req): Json<ArgsRequest>,
) -> Result<Json<InvalidateResponse>> {
    let cacher = state.cacher(&entity)?;
    let operation = cacher.resolve(&operation)?;
    let args = req.into_args();
    let removed = cacher.invalidate_operation(operation, &args).await?;
    let key = cacher.key(operation, &args);

    Ok(Json(InvalidateResponse::entry(
        entity,
        operation,
        key.into_string(),
        removed,
    )))
}

/// Handler for DELETE /invalidate/:entity
pub async fn invalidate_all_handler(
    State(state): State<AppState>,
    Path(entity): Path<String>,
) -> Result<Json<InvalidateResponse>> {
    let removed = state.cacher(&entity)?.invalidate_all().await?;
    Ok(Json(InvalidateResponse::entity(entity, removed)))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.store.stats().await;
    Json(StatsResponse::new(&stats, state.source.call_count()))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CacherError;
    use serde_json::json;

    fn test_state() -> AppState {
        let source = MemorySource::from_json(json!({
            "User": [{"id": 7, "name": "alice"}, {"id": 8, "name": "bob"}]
        }))
        .unwrap();
        AppState::new(MemoryStore::new(100), source, CacherConfig::default())
    }

    fn by_id(id: i64) -> Json<ArgsRequest> {
        Json(ArgsRequest {
            args: vec![json!({"where": {"id": id}})],
        })
    }

    fn path(entity: &str, operation: &str) -> Path<(String, String)> {
        Path((entity.to_string(), operation.to_string()))
    }

    #[tokio::test]
    async fn test_query_miss_then_hit() {
        let state = test_state();

        let first = query_handler(State(state.clone()), path("User", "findOne"), by_id(7))
            .await
            .unwrap();
        assert!(!first.cache_hit);
        assert_eq!(first.result["name"], "alice");

        let second = query_handler(State(state.clone()), path("User", "findOne"), by_id(7))
            .await
            .unwrap();
        assert!(second.cache_hit);
        assert_eq!(second.key, first.key);
        assert_eq!(state.source.call_count(), 1);
    }

    #[tokio::test]
    async fn test_query_unknown_operation() {
        let state = test_state();
        let result = query_handler(State(state), path("User", "bogus"), by_id(7)).await;
        assert!(matches!(result, Err(CacherError::UnknownOperation { .. })));
    }

    #[tokio::test]
    async fn test_query_invalid_entity() {
        let state = test_state();
        let result = query_handler(State(state), path("Us*er", "findOne"), by_id(7)).await;
        assert!(matches!(result, Err(CacherError::InvalidName { .. })));
    }

    #[tokio::test]
    async fn test_invalidate_handlers() {
        let state = test_state();
        query_handler(State(state.clone()), path("User", "findOne"), by_id(7))
            .await
            .unwrap();
        query_handler(State(state.clone()), path("User", "findOne"), by_id(8))
            .await
            .unwrap();

        let point = invalidate_handler(State(state.clone()), path("User", "findOne"), by_id(7))
            .await
            .unwrap();
        assert_eq!(point.removed, 1);

        let bulk = invalidate_all_handler(State(state.clone()), Path("User".to_string()))
            .await
            .unwrap();
        assert_eq!(bulk.removed, 1);
        assert!(state.store.is_empty().await);
    }

    #[tokio::test]
    async fn test_stats_handler() {
        let state = test_state();
        let response = stats_handler(State(state)).await;
        assert_eq!(response.hits, 0);
        assert_eq!(response.source_calls, 0);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }
}
