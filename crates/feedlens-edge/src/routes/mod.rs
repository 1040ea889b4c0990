//! Route definitions for the edge service.
//!
//! ## Routes
//!
//! - `GET /health` - Health check (JSON)
//! - `GET /api/profile?username=...` - Normalized profile (JSON)
//! - `OPTIONS /api/profile` - CORS pre-flight, answered with 204
//!
//! Every response, errors included, carries allow-all CORS headers.

mod health;
pub mod profile;

use std::any::Any;

use axum::Router;
use axum::http::{HeaderValue, StatusCode, header};
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tower_http::catch_panic::CatchPanicLayer;

use crate::error::EdgeError;
use crate::state::AppState;

/// Build the complete edge service router.
pub fn router(state: AppState) -> Router {
    let routes = Router::new()
        .route("/health", get(health::health_check))
        .route(
            "/api/profile",
            get(profile::profile_handler).options(preflight),
        );

    with_edge_layers(routes).with_state(state)
}

/// Panic recovery and CORS, applied to every route.
fn with_edge_layers<S>(routes: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    routes
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(middleware::map_response(add_cors_headers))
}

/// Answer a CORS pre-flight.
async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// Add allow-all CORS headers to every response.
async fn add_cors_headers(response: Response) -> Response {
    let (mut parts, body) = response.into_parts();
    let headers = &mut parts.headers;

    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type, Authorization"),
    );
    headers.insert(
        header::ACCESS_CONTROL_MAX_AGE,
        HeaderValue::from_static("86400"),
    );

    Response::from_parts(parts, body)
}

/// Render a handler panic as the generic 500 body.
fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");

    feedlens_core::metrics::record_outcome("panic");
    EdgeError::Internal(anyhow::anyhow!("handler panicked: {detail}")).into_response()
}
