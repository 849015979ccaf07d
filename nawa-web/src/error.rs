//! Error types for nawa-web
//!
//! Storage and driver failures become a generic 500; the detail is logged
//! server-side and never sent to the client.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use nawa_common::validation::ValidationErrors;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Payload failed validation (400)
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// Malformed request outside of payload validation (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Resource not found (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Anything else (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<nawa_common::Error> for ApiError {
    fn from(err: nawa_common::Error) -> Self {
        use nawa_common::Error;

        match err {
            Error::Validation(errors) => ApiError::Validation(errors),
            Error::Duplicate { field, .. } => {
                ApiError::Validation(ValidationErrors::single(field, "is already registered"))
            }
            Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            Error::NotFound(msg) => ApiError::NotFound(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                json!({
                    "success": false,
                    "error": "Validation failed",
                    "details": errors,
                }),
            ),
            ApiError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                json!({ "success": false, "error": msg }),
            ),
            ApiError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                json!({ "success": false, "error": msg }),
            ),
            ApiError::Internal(detail) => {
                error!("Request failed: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "success": false, "error": "Internal server error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
