//! Error types for the edge service.
//!
//! Every failure is rendered as `{"error": "<message>"}`. Messages are fixed
//! strings; underlying causes are logged and never returned to the client.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Edge service error type.
#[derive(Debug, thiserror::Error)]
pub enum EdgeError {
    /// No usable username after normalization.
    #[error("missing username")]
    MissingUsername,

    /// Upstream answered with a non-success status.
    #[error("upstream returned status {0}")]
    UpstreamStatus(u16),

    /// Upstream answered successfully but the payload carries no user.
    #[error("user not found")]
    UserNotFound,

    /// Network failure or undecodable upstream body.
    #[error("upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    /// Failed to serialize the normalized profile.
    #[error("serialization error: {0}")]
    Serialization(#[from] feedlens_core::Error),

    /// Anything else (including caught panics).
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl EdgeError {
    /// Status code for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingUsername => StatusCode::BAD_REQUEST,
            Self::UpstreamStatus(_) => StatusCode::BAD_GATEWAY,
            Self::UserNotFound => StatusCode::NOT_FOUND,
            Self::Upstream(_) | Self::Serialization(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Client-facing message.
    pub fn public_message(&self) -> String {
        match self {
            Self::MissingUsername => "Missing username".to_string(),
            Self::UpstreamStatus(code) => format!("Upstream status {code}"),
            Self::UserNotFound => "User not found".to_string(),
            Self::Upstream(_) | Self::Serialization(_) | Self::Internal(_) => {
                SERVER_ERROR_MESSAGE.to_string()
            }
        }
    }

    /// Short label used for the `outcome` metric.
    pub fn outcome(&self) -> &'static str {
        match self {
            Self::MissingUsername => "missing_username",
            Self::UpstreamStatus(_) => "upstream_rejected",
            Self::UserNotFound => "not_found",
            Self::Upstream(_) => "upstream_error",
            Self::Serialization(_) | Self::Internal(_) => "internal_error",
        }
    }
}

/// Body of every 500 response.
pub const SERVER_ERROR_MESSAGE: &str = "Server error";

/// JSON error response body.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl IntoResponse for EdgeError {
    fn into_response(self) -> Response {
        match &self {
            Self::UpstreamStatus(code) => {
                tracing::warn!(status = code, "upstream rejected profile request");
            }
            Self::Upstream(err) => {
                tracing::error!(error = %err, "upstream request failed");
            }
            Self::Serialization(err) => {
                tracing::error!(error = %err, "serialization error");
            }
            Self::Internal(err) => {
                tracing::error!(error = %err, "internal server error");
            }
            Self::MissingUsername | Self::UserNotFound => {}
        }

        let body = ErrorBody {
            error: self.public_message(),
        };

        (self.status(), Json(body)).into_response()
    }
}
