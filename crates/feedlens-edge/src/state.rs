//! Application state shared across all request handlers.

use std::sync::Arc;

use crate::cache::ProfileCache;
use crate::config::Config;
use crate::upstream::UpstreamClient;

/// Shared application state available to all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<Config>,

    /// Normalized profiles keyed by username.
    pub cache: ProfileCache,

    /// Client for the upstream profile API.
    pub upstream: UpstreamClient,
}

impl AppState {
    /// Create a new application state from configuration.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let cache = ProfileCache::new(config.cache_ttl, config.cache_capacity);
        let upstream = UpstreamClient::new(&config.upstream_base_url)?;
        Ok(Self::with_parts(config, cache, upstream))
    }

    /// Assemble state from explicit parts, e.g. a cache shared with a test.
    pub fn with_parts(config: Config, cache: ProfileCache, upstream: UpstreamClient) -> Self {
        tracing::info!(
            cache_capacity = config.cache_capacity,
            cache_ttl_secs = cache.max_age_secs(),
            upstream = %config.upstream_base_url,
            "application state initialized"
        );

        Self {
            config: Arc::new(config),
            cache,
            upstream,
        }
    }
}
