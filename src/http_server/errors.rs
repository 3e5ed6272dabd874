//! # API Errors
//!
//! Error types for the HTTP layer and their mapping to status codes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::observability::{log_event_with_fields, Event, Logger};
use crate::store::StoreError;

/// Result type for handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// HTTP API errors
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    // ==================
    // Client Errors (4xx)
    // ==================
    /// Body is not valid JSON or lacks a required field
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    /// No user with the requested id
    #[error("User not found")]
    UserNotFound,

    /// Unique constraint violated
    #[error("{0}")]
    Conflict(String),

    /// Column constraint violated (length, NOT NULL)
    #[error("Validation failed: {0}")]
    Validation(String),

    // ==================
    // Server Errors (5xx)
    // ==================
    /// Store failure unrelated to the request's content
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ApiError::UserNotFound => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ApiError::UserNotFound,
            StoreError::Conflict(msg) => ApiError::Conflict(msg),
            StoreError::Validation(msg) => ApiError::Validation(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl From<ApiError> for ErrorResponse {
    fn from(err: ApiError) -> Self {
        Self {
            code: err.status_code().as_u16(),
            error: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let reason = self.to_string();
        if status.is_server_error() {
            log_event_with_fields(Event::HttpServerError, &[("reason", reason.as_str())]);
        } else {
            Logger::trace("HTTP_CLIENT_ERROR", &[("reason", reason.as_str())]);
        }
        let body = Json(ErrorResponse::from(self));
        (status, body).into_response()
    }
}
