//! Health check endpoint
//!
//! Provides a simple liveness check for monitoring and load balancers. The
//! exporter holds no cross-request state, so liveness is the only thing to
//! report; node reachability shows up per-scrape instead.

use axum::{Json, http::StatusCode};
use serde::Serialize;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: &'static str,
}

/// Health check handler
pub async fn handler() -> (StatusCode, Json<HealthResponse>) {
    (StatusCode::OK, Json(HealthResponse { status: "OK" }))
}
