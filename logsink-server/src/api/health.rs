//! Health Check API Handler
//!
//! Lets scenarios and peers check that the sink is accepting connections.

use axum::{http::StatusCode, response::IntoResponse};

/// GET /health
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
