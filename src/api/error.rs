//! API Error Types
//!
//! Every handler error ends up here and is rendered as
//! `{"error": {"code", "message"}, "request_id"}` with a matching status.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::auth::{AuthError, ResetError};
use crate::entity::FormError;
use crate::notify::NotifyError;
use crate::store::StoreError;

/// API error types
#[derive(Error, Debug)]
pub enum ApiError {
    /// Request validation failed
    #[error("Validation error: {0}")]
    Validation(String),

    /// Record or resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad login credentials
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Duplicate doctor email
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Store backend error
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// WhatsApp hand-off or outbox error
    #[error("Notification error: {0}")]
    Notify(#[from] NotifyError),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    /// Message shown to the client, without the variant prefix
    fn detail(&self) -> String {
        match self {
            ApiError::Validation(m)
            | ApiError::NotFound(m)
            | ApiError::Unauthorized(m)
            | ApiError::Conflict(m)
            | ApiError::Internal(m) => m.clone(),
            ApiError::Store(e) => e.to_string(),
            ApiError::Notify(e) => e.to_string(),
            ApiError::Io(e) => e.to_string(),
        }
    }
}

impl From<FormError> for ApiError {
    fn from(e: FormError) -> Self {
        ApiError::Validation(e.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::DuplicateEmail => ApiError::Conflict(e.to_string()),
            AuthError::InvalidCredentials => ApiError::Unauthorized(e.to_string()),
            AuthError::MissingField(_) => ApiError::Validation(e.to_string()),
            AuthError::Store(e) => ApiError::Store(e),
        }
    }
}

impl From<ResetError> for ApiError {
    fn from(e: ResetError) -> Self {
        match e {
            ResetError::Store(e) => ApiError::Store(e),
            other => ApiError::Validation(other.to_string()),
        }
    }
}

/// Error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
    pub request_id: String,
}

/// Error details
#[derive(Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            ApiError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR"),
            ApiError::Notify(_) => (StatusCode::INTERNAL_SERVER_ERROR, "NOTIFY_ERROR"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            ApiError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
        };

        let request_id = uuid::Uuid::new_v4().to_string();

        if status.is_server_error() {
            tracing::error!(
                request_id = %request_id,
                error_code = %code,
                error_message = %self,
                "API error occurred"
            );
        } else {
            tracing::warn!(
                request_id = %request_id,
                error_code = %code,
                error_message = %self,
                "Request rejected"
            );
        }

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message: self.detail(),
            },
            request_id,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;
