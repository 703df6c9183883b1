//! Request and Response models for the query cacher API

pub mod requests;
pub mod responses;

pub use requests::ArgsRequest;
pub use responses::{HealthResponse, InvalidateResponse, QueryResponse, StatsResponse};
