//! Axum HTTP API server.
//!
//! This crate provides:
//! - Synchronous and callback-based analysis endpoints
//! - Health and status surfaces
//! - Prometheus metrics

pub mod callback;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
