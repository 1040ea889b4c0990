//! Prometheus metrics helpers for feedlens.
//!
//! Recording is always safe: without an installed recorder every `counter!`
//! and `histogram!` call is a no-op, so handlers record unconditionally and
//! only the binary decides whether metrics are exported.
//!
//! # Usage
//!
//! ```rust,ignore
//! use feedlens_core::metrics::{init_metrics, start_metrics_server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let handle = init_metrics().unwrap();
//!     start_metrics_server(9091, handle).await.unwrap();
//! }
//! ```
//!
//! # Metric Naming Conventions
//!
//! - Prefix: pipeline stage (`profile_`, `upstream_`)
//! - Suffix: unit or type (`_total`, `_seconds`)
//! - Labels: low-cardinality only (outcome, status code), never usernames

use axum::{Router, routing::get};
use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;

/// Requests handled by the profile endpoint (label: `outcome`).
pub const PROFILE_REQUESTS_TOTAL: &str = "profile_requests_total";

/// Profile requests answered from the TTL cache.
pub const PROFILE_CACHE_HITS_TOTAL: &str = "profile_cache_hits_total";

/// Profile requests that had to go upstream.
pub const PROFILE_CACHE_MISSES_TOTAL: &str = "profile_cache_misses_total";

/// Upstream calls (label: `status`, the HTTP code or `error`).
pub const UPSTREAM_REQUESTS_TOTAL: &str = "upstream_requests_total";

/// Upstream round-trip latency.
pub const UPSTREAM_REQUEST_DURATION_SECONDS: &str = "upstream_request_duration_seconds";

/// Install the Prometheus recorder and register metric descriptions.
///
/// Fails if a recorder is already installed for this process.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    register_profile_metrics();
    Ok(handle)
}

/// Like [`init_metrics`] but returns `None` if the recorder is already installed.
pub fn try_init_metrics() -> Option<PrometheusHandle> {
    init_metrics().ok()
}

/// Start the Prometheus metrics HTTP server on `port`.
///
/// Binds before returning so a port conflict surfaces at startup, then serves
/// `/metrics` from a background task.
pub async fn start_metrics_server(
    port: u16,
    handle: PrometheusHandle,
) -> Result<(), std::io::Error> {
    let app = Router::new().route(
        "/metrics",
        get(move || {
            let handle = handle.clone();
            async move { handle.render() }
        }),
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Metrics server listening on http://{}/metrics", addr);

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "metrics server stopped");
        }
    });

    Ok(())
}

/// Register descriptions for the profile pipeline metrics.
fn register_profile_metrics() {
    describe_counter!(
        PROFILE_REQUESTS_TOTAL,
        "Profile requests handled (label: outcome)"
    );
    describe_counter!(
        PROFILE_CACHE_HITS_TOTAL,
        "Profile requests served from the in-memory cache"
    );
    describe_counter!(
        PROFILE_CACHE_MISSES_TOTAL,
        "Profile requests that required an upstream fetch"
    );
    describe_counter!(
        UPSTREAM_REQUESTS_TOTAL,
        "Upstream profile requests (label: status)"
    );
    describe_histogram!(
        UPSTREAM_REQUEST_DURATION_SECONDS,
        "Upstream profile request latency"
    );
}

/// Count one profile request with its final outcome.
#[inline]
pub fn record_outcome(outcome: &'static str) {
    metrics::counter!(PROFILE_REQUESTS_TOTAL, "outcome" => outcome).increment(1);
}

/// Count one upstream call and observe its latency.
pub fn record_upstream(status: String, elapsed: std::time::Duration) {
    metrics::counter!(UPSTREAM_REQUESTS_TOTAL, "status" => status).increment(1);
    metrics::histogram!(UPSTREAM_REQUEST_DURATION_SECONDS).record(elapsed.as_secs_f64());
}

/// Increment a counter by `count`.
#[inline]
pub fn increment(name: &'static str, count: u64) {
    metrics::counter!(name).increment(count);
}
