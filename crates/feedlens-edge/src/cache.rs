//! In-memory TTL cache of normalized profiles, backed by moka.
//!
//! Entries expire a fixed TTL after insertion and are masked on read from
//! then on. The cache is bounded by entry count, so a burst of distinct
//! usernames cannot grow it without limit. moka is internally synchronized;
//! one `ProfileCache` can be cloned into every handler on a multi-threaded
//! runtime.

use std::sync::Arc;
use std::time::Duration;

use feedlens_core::{ProfileResult, Username};
use moka::future::Cache;

/// Longest TTL the cache backend accepts (1000 years).
pub const MAX_CACHE_TTL: Duration = Duration::from_secs(1000 * 365 * 24 * 3600);

/// A cached profile with metadata.
#[derive(Clone, Debug)]
pub struct CachedProfile {
    pub profile: Arc<ProfileResult>,
    /// When this entry was cached.
    pub cached_at: chrono::DateTime<chrono::Utc>,
}

/// TTL cache keyed by [`Username::cache_key`].
#[derive(Clone)]
pub struct ProfileCache {
    inner: Cache<String, CachedProfile>,
    ttl: Duration,
}

impl ProfileCache {
    /// Create a cache whose entries live for `ttl`, holding at most
    /// `capacity` profiles. TTLs beyond [`MAX_CACHE_TTL`] are clamped to it.
    pub fn new(ttl: Duration, capacity: u64) -> Self {
        let ttl = ttl.min(MAX_CACHE_TTL);
        let inner = Cache::builder()
            .max_capacity(capacity)
            .time_to_live(ttl)
            .build();

        Self { inner, ttl }
    }

    /// Look up a live entry. Expired entries are never returned.
    pub async fn get(&self, username: &Username) -> Option<CachedProfile> {
        self.inner.get(&username.cache_key()).await
    }

    /// Store a profile, replacing any existing entry and restarting its TTL.
    pub async fn set(&self, username: &Username, profile: ProfileResult) -> CachedProfile {
        let entry = CachedProfile {
            profile: Arc::new(profile),
            cached_at: chrono::Utc::now(),
        };
        self.inner
            .insert(username.cache_key(), entry.clone())
            .await;
        entry
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.inner.invalidate_all();
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// TTL in whole seconds, as advertised in `Cache-Control: max-age`.
    pub fn max_age_secs(&self) -> u64 {
        self.ttl.as_secs()
    }
}
