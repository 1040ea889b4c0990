//! Feedlens Edge - HTTP edge service for normalized public profiles.
//!
//! Fetches a user's public profile and recent posts from the upstream web
//! API, reshapes the loosely-typed payload into a stable JSON schema, and
//! keeps the result in memory for a short TTL so repeated lookups of the same
//! username do not hit the upstream again.
//!
//! # Architecture
//!
//! - **Upstream**: a single reqwest GET per cache miss with browser-like headers
//! - **Normalize**: pure projection in `feedlens-core`, never fails on bad data
//! - **Cache**: in-process moka cache keyed by `p:<username>`, plus
//!   `Cache-Control` headers for downstream caches
//!
//! # URL Pattern
//!
//! ```text
//! GET /api/profile?username=<name>
//! ```
//!
//! The username is trimmed, stripped of a leading `@`, and lower-cased.
//!
//! # Status codes
//!
//! | Condition | Status |
//! |---|---|
//! | pre-flight `OPTIONS` | 204 |
//! | empty username | 400 |
//! | upstream non-2xx | 502 |
//! | upstream has no user | 404 |
//! | network failure, bad JSON, panic | 500 |

pub mod cache;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod upstream;

pub use cache::ProfileCache;
pub use config::Config;
pub use error::EdgeError;
pub use routes::router;
pub use state::AppState;
pub use upstream::UpstreamClient;
