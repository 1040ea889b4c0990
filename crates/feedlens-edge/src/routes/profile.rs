//! Profile route handler.
//!
//! Handles `GET /api/profile?username=...`. The pipeline is:
//! 1. Normalize the username (400 if nothing is left)
//! 2. Check the in-process cache
//! 3. On miss, fetch the upstream payload (502 on non-2xx)
//! 4. Normalize it (404 if it carries no user)
//! 5. Cache the result and return it with Cache-Control and ETag headers

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use feedlens_core::metrics::{
    PROFILE_CACHE_HITS_TOTAL, PROFILE_CACHE_MISSES_TOTAL, increment, record_outcome,
};
use feedlens_core::{Username, normalize_payload};
use serde::Deserialize;

use crate::cache::CachedProfile;
use crate::error::EdgeError;
use crate::state::AppState;

/// Query parameters for the profile endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct ProfileQuery {
    /// Raw username; an `@` prefix, surrounding whitespace and case are ignored.
    #[serde(default)]
    pub username: Option<String>,
}

/// Where a served profile came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    Cache,
    Upstream,
}

/// Handle a profile request.
pub async fn profile_handler(
    State(state): State<AppState>,
    query: Result<Query<ProfileQuery>, QueryRejection>,
) -> Result<Response, EdgeError> {
    let params = match query {
        Ok(Query(params)) => params,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "unparseable profile query");
            ProfileQuery::default()
        }
    };

    let result = load_profile(&state, params.username.as_deref().unwrap_or_default()).await;

    let (entry, source) = match result {
        Ok(found) => found,
        Err(err) => {
            record_outcome(err.outcome());
            return Err(err);
        }
    };

    let json = entry.profile.to_json()?;
    record_outcome(match source {
        Source::Cache => "cache_hit",
        Source::Upstream => "ok",
    });

    Ok(build_response(json, state.cache.max_age_secs()))
}

/// Resolve a raw username to a cached or freshly fetched profile.
async fn load_profile(
    state: &AppState,
    raw_username: &str,
) -> Result<(CachedProfile, Source), EdgeError> {
    let username = Username::parse(raw_username).map_err(|_| EdgeError::MissingUsername)?;

    if let Some(cached) = state.cache.get(&username).await {
        tracing::debug!(username = %username, cached_at = %cached.cached_at, "cache hit");
        increment(PROFILE_CACHE_HITS_TOTAL, 1);
        return Ok((cached, Source::Cache));
    }

    tracing::debug!(username = %username, "cache miss, fetching upstream");
    increment(PROFILE_CACHE_MISSES_TOTAL, 1);

    let body = state.upstream.fetch_profile(&username).await?;

    let profile = normalize_payload(&username, &body, &state.config.normalize)
        .ok_or(EdgeError::UserNotFound)?;

    tracing::debug!(
        username = %username,
        posts = profile.posts.len(),
        "profile normalized"
    );

    let entry = state.cache.set(&username, profile).await;
    Ok((entry, Source::Upstream))
}

/// Build a 200 JSON response with cache and ETag headers.
fn build_response(json: String, max_age_secs: u64) -> Response {
    let mut headers = HeaderMap::new();

    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json; charset=utf-8"),
    );

    if let Ok(val) = HeaderValue::from_str(&format!("public, max-age={max_age_secs}")) {
        headers.insert(header::CACHE_CONTROL, val);
    }

    // ETag (xxHash of content)
    let hash = xxhash_rust::xxh3::xxh3_64(json.as_bytes());
    let etag = format!("\"{}\"", hex_fmt::HexFmt(&hash.to_be_bytes()));
    if let Ok(val) = HeaderValue::from_str(&etag) {
        headers.insert(header::ETAG, val);
    }

    (StatusCode::OK, headers, json).into_response()
}
