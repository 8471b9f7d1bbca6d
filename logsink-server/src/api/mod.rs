//! API Module
//!
//! HTTP API layer for the sink.
//! Each submodule handles endpoints for a specific concern.

pub mod error;
pub mod health;
pub mod log;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::state::SinkState;

/// Create the sink router with all endpoints
pub fn create_router(state: SinkState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Log endpoints
        .route("/log/write", post(log::write_log))
        .route("/log/current", get(log::current_log))
        // Add state and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
