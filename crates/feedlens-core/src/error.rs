//! Error types for the feedlens core.

use thiserror::Error;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by core operations.
///
/// Normalization itself is infallible; only input validation and
/// serialization can fail here.
#[derive(Error, Debug)]
pub enum Error {
    /// The username was empty after trimming and stripping the `@` prefix.
    #[error("username is empty after normalization")]
    EmptyUsername,

    /// Unknown post field set name.
    #[error("unknown post field set '{0}' (expected 'extended' or 'basic')")]
    InvalidFieldSet(String),

    /// JSON parsing or serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
