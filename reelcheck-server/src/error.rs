//! API error type for reelcheck-server
//!
//! Every error crossing the HTTP boundary renders as a stable
//! `{ "error": { "code", "message" } }` body. Internal failure details are
//! logged, never echoed back to the caller.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Missing or invalid bearer token (401)
    #[error("Unauthorized")]
    Unauthorized,

    /// Optimistic status swap lost the race (409)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Scene comparator aborted the job (502)
    #[error("Comparator failure: {0}")]
    UpstreamFailed(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// Generic error
    #[error(transparent)]
    Other(#[from] anyhow::Error),

    /// reelcheck-common error
    #[error("Common error: {0}")]
    Common(#[from] reelcheck_common::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        use reelcheck_common::Error as Common;

        let (status, error_code, message) = match self {
            ApiError::NotFound(msg) | ApiError::Common(Common::NotFound(msg)) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", msg)
            }
            ApiError::BadRequest(msg) | ApiError::Common(Common::InvalidInput(msg)) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg)
            }
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Missing or invalid bearer token".to_string(),
            ),
            ApiError::Conflict(msg) | ApiError::Common(Common::Conflict(msg)) => {
                (StatusCode::CONFLICT, "CONFLICT", msg)
            }
            ApiError::UpstreamFailed(msg) => {
                tracing::error!(error = %msg, "Scene comparator failure surfaced to caller");
                (
                    StatusCode::BAD_GATEWAY,
                    "COMPARATOR_FAILED",
                    "Scene comparator failed; the job was recorded as failed".to_string(),
                )
            }
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal server error".to_string(),
                )
            }
            ApiError::Other(ref err) => {
                tracing::error!(error = %err, "Unhandled error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal server error".to_string(),
                )
            }
            ApiError::Common(ref err) => {
                tracing::error!(error = %err, "Storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
