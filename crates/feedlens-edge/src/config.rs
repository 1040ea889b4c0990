//! Application configuration loaded from environment variables.

use std::time::Duration;

use anyhow::Context;
use feedlens_core::{DEFAULT_POST_LIMIT, NormalizeOptions, PostFieldSet};

use crate::cache::MAX_CACHE_TTL;

/// Default cache TTL in milliseconds (5 minutes).
const DEFAULT_CACHE_TTL_MS: u64 = 300_000;

/// Default cache capacity (number of profiles).
/// A normalized profile with 24 posts is roughly 15-25KB of JSON.
const DEFAULT_CACHE_CAPACITY: u64 = 10_000;

/// Public web API host the profile endpoint lives on.
const DEFAULT_UPSTREAM_BASE_URL: &str = "https://i.instagram.com";

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (e.g., "0.0.0.0:8080").
    pub bind_addr: String,

    /// How long a normalized profile stays servable from memory.
    pub cache_ttl: Duration,

    /// Maximum number of cached profiles.
    pub cache_capacity: u64,

    /// Scheme and host of the upstream API, without trailing slash.
    pub upstream_base_url: String,

    /// Post cap and field set applied by the normalizer.
    pub normalize: NormalizeOptions,

    /// Port for the Prometheus `/metrics` server; disabled when `None`.
    pub metrics_port: Option<u16>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            cache_ttl: Duration::from_millis(DEFAULT_CACHE_TTL_MS),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            upstream_base_url: DEFAULT_UPSTREAM_BASE_URL.to_string(),
            normalize: NormalizeOptions::default(),
            metrics_port: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - None (all have defaults)
    ///
    /// Optional:
    /// - `FEEDLENS_BIND_ADDR`: Server bind address (default: "0.0.0.0:8080")
    /// - `CACHE_TTL_MS`: Profile cache TTL in milliseconds (default: 300000)
    /// - `CACHE_MAX_CAPACITY`: Maximum cached profiles (default: 10000)
    /// - `UPSTREAM_BASE_URL`: Upstream API base (default: "https://i.instagram.com")
    /// - `PROFILE_POST_LIMIT`: Posts kept per profile; `0` or `none` for no cap (default: 24)
    /// - `PROFILE_POST_FIELDS`: `extended` or `basic` (default: extended)
    /// - `METRICS_PORT`: Serve Prometheus metrics on this port
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();

        let bind_addr = env_opt("FEEDLENS_BIND_ADDR").unwrap_or(defaults.bind_addr);

        let cache_ttl = match env_opt("CACHE_TTL_MS") {
            Some(raw) => Duration::from_millis(
                raw.parse()
                    .with_context(|| format!("CACHE_TTL_MS must be milliseconds, got '{raw}'"))?,
            ),
            None => defaults.cache_ttl,
        };
        anyhow::ensure!(
            cache_ttl <= MAX_CACHE_TTL,
            "CACHE_TTL_MS must not exceed {} ms, got {} ms",
            MAX_CACHE_TTL.as_millis(),
            cache_ttl.as_millis()
        );

        let cache_capacity = match env_opt("CACHE_MAX_CAPACITY") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("CACHE_MAX_CAPACITY must be a count, got '{raw}'"))?,
            None => defaults.cache_capacity,
        };

        let upstream_base_url = env_opt("UPSTREAM_BASE_URL")
            .unwrap_or(defaults.upstream_base_url)
            .trim_end_matches('/')
            .to_string();

        let post_limit = match env_opt("PROFILE_POST_LIMIT") {
            Some(raw) => parse_post_limit(&raw)?,
            None => Some(DEFAULT_POST_LIMIT),
        };

        let fields = match env_opt("PROFILE_POST_FIELDS") {
            Some(raw) => raw.parse::<PostFieldSet>()?,
            None => PostFieldSet::default(),
        };

        let metrics_port = env_opt("METRICS_PORT")
            .map(|raw| {
                raw.parse::<u16>()
                    .with_context(|| format!("METRICS_PORT must be a port number, got '{raw}'"))
            })
            .transpose()?;

        tracing::info!(
            bind_addr = %bind_addr,
            cache_ttl_ms = cache_ttl.as_millis() as u64,
            cache_capacity,
            upstream = %upstream_base_url,
            post_limit = ?post_limit,
            post_fields = %fields,
            metrics_port = ?metrics_port,
            "feedlens configuration loaded"
        );

        Ok(Self {
            bind_addr,
            cache_ttl,
            cache_capacity,
            upstream_base_url,
            normalize: NormalizeOptions { post_limit, fields },
            metrics_port,
        })
    }
}

/// Read an env var, treating blank values as unset.
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_post_limit(raw: &str) -> anyhow::Result<Option<usize>> {
    if raw.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    let limit: usize = raw
        .parse()
        .with_context(|| format!("PROFILE_POST_LIMIT must be a count or 'none', got '{raw}'"))?;
    Ok(Some(limit).filter(|l| *l > 0))
}
