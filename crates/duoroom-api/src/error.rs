//! Maps domain `AppError` to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use validator::ValidationErrors;

use duoroom_core::error::{AppError, ErrorKind};

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
    /// Optional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Error returned by handlers.
#[derive(Debug)]
pub struct ApiError {
    /// The underlying error.
    pub error: AppError,
    /// Field-level details, for validation failures.
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// HTTP status for an error kind.
    pub fn status(kind: ErrorKind) -> StatusCode {
        match kind {
            ErrorKind::RoomNotFound | ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::RoomFull | ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::NotAMember | ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorKind::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::Database
            | ErrorKind::Storage
            | ErrorKind::Configuration
            | ErrorKind::Serialization
            | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<AppError> for ApiError {
    fn from(error: AppError) -> Self {
        Self {
            error,
            details: None,
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        Self {
            error: AppError::invalid_input("Request validation failed"),
            details: serde_json::to_value(&errors).ok(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.error.kind;
        let status = Self::status(kind);

        let message = if kind.is_domain() {
            self.error.message.clone()
        } else {
            tracing::error!(error = %self.error, "Request failed");
            "The request could not be completed".to_string()
        };

        let body = ApiErrorResponse {
            error: kind.to_string(),
            message,
            details: self.details,
        };

        (status, Json(body)).into_response()
    }
}
