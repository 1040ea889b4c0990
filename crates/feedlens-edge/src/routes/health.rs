//! Health check endpoint.

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::state::AppState;

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
    cache_ttl_secs: u64,
}

/// Public health check endpoint.
///
/// Returns basic service health for load balancer probes. Never touches
/// the upstream.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "feedlens-edge",
        version: env!("CARGO_PKG_VERSION"),
        cache_ttl_secs: state.cache.max_age_secs(),
    })
}
