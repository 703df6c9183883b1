//! API Module
//!
//! HTTP handlers and routing for the query cacher REST API.
//!
//! # Endpoints
//! - `POST /query/:entity/:operation` - Cached query, body is a JSON array of arguments
//! - `POST /invalidate/:entity/:operation` - Point invalidation, same body
//! - `DELETE /invalidate/:entity` - Invalidate every cached query of an entity
//! - `GET /stats` - Store statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
