//! Portal error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use serde_json::json;
use thiserror::Error;

use dealroom_core::Error as CoreError;

#[derive(Debug, Error)]
pub enum PortalError {
    #[error("Not authenticated")]
    Unauthorized,

    #[error("Insufficient role")]
    Forbidden,

    #[error("NDA already signed")]
    AlreadySigned,

    #[error("Signature already exists")]
    AlreadyExists,

    #[error("Document hash mismatch")]
    DocumentHashMismatch,

    #[error("Too many signing attempts")]
    RateLimited { reset_at: DateTime<Utc> },

    #[error("Not found")]
    NotFound,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl PortalError {
    /// Only transient persistence failures are worth retrying
    pub fn is_retryable(&self) -> bool {
        matches!(self, PortalError::StorageUnavailable(_))
    }
}

impl IntoResponse for PortalError {
    fn into_response(self) -> Response {
        // RateLimited carries the window reset time so clients can show
        // a retry-after message
        if let PortalError::RateLimited { reset_at } = &self {
            let body = json!({
                "success": false,
                "reason": "Too many signing attempts",
                "resetAt": reset_at,
            });
            return (StatusCode::TOO_MANY_REQUESTS, axum::Json(body)).into_response();
        }

        let (status, message) = match &self {
            PortalError::Unauthorized => (StatusCode::UNAUTHORIZED, "Not authenticated".to_string()),
            PortalError::Forbidden => (StatusCode::FORBIDDEN, "Insufficient role".to_string()),
            PortalError::AlreadySigned => (StatusCode::CONFLICT, "NDA already signed".to_string()),
            PortalError::AlreadyExists => {
                (StatusCode::CONFLICT, "Signature already exists".to_string())
            }
            PortalError::DocumentHashMismatch => (
                StatusCode::CONFLICT,
                "The agreement has changed, please reload and review it again".to_string(),
            ),
            PortalError::RateLimited { .. } => unreachable!("handled above"),
            PortalError::NotFound => (StatusCode::NOT_FOUND, "Not found".to_string()),
            PortalError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            PortalError::StorageUnavailable(detail) => {
                // Storage internals stay in the server log
                tracing::error!(%detail, "Storage unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Service temporarily unavailable".to_string(),
                )
            }
            PortalError::Core(err) => match err {
                CoreError::InvalidSignatureData(msg) => (
                    StatusCode::BAD_REQUEST,
                    format!("Invalid signature data: {msg}"),
                ),
                CoreError::UnknownRole(role) => {
                    tracing::warn!(role = %role, "Rejecting request with unrecognized role");
                    (StatusCode::FORBIDDEN, "Insufficient role".to_string())
                }
                CoreError::UnknownPhase(_)
                | CoreError::VersionMismatch { .. }
                | CoreError::IntegrityFailure
                | CoreError::Expired { .. } => (StatusCode::CONFLICT, err.to_string()),
            },
        };

        let body = json!({ "success": false, "reason": message });
        (status, axum::Json(body)).into_response()
    }
}
