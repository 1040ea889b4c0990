//! Core types and pure transformations for feedlens.
//!
//! This crate provides:
//! - Username normalization and cache keys
//! - A lenient schema for the upstream profile payload
//! - Projection of that payload into the stable [`ProfileResult`] schema
//! - Prometheus metrics helpers
//! - Shared error types
//!
//! Nothing here performs I/O; the HTTP side lives in `feedlens-edge`.

pub mod coerce;
mod error;
pub mod metrics;
mod normalize;
mod profile;
pub mod upstream;
mod username;

pub use error::{Error, Result};
pub use normalize::{
    DEFAULT_POST_LIMIT, NormalizeOptions, PostFieldSet, infer_post_kind, normalize,
    normalize_payload, normalize_post,
};
pub use profile::{ExtendedPostFields, PostKind, PostSummary, ProfileResult, ProfileSummary};
pub use upstream::{UpstreamUser, extract_user};
pub use username::Username;
