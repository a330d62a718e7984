//! API error types.
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps domain and store errors to HTTP status codes and JSON error
//! bodies with a machine-readable code. Internal error messages are
//! never returned to clients.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use circurent_storage::StoreError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "VALIDATION_FAILED").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Request input failed validation (400).
    #[error("{0}")]
    Validation(String),

    /// Verification code did not match, or no live code exists (400).
    #[error("Invalid or expired verification code")]
    InvalidOrExpiredCode,

    /// Email address already has an account (409).
    #[error("Email already registered")]
    DuplicateEmail,

    /// Username already taken (409).
    #[error("Username already taken")]
    DuplicateUsername,

    /// Verification email could not be dispatched (502).
    #[error("delivery error: {0}")]
    Delivery(String),

    /// Internal server error (500). Message is logged but not returned to client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_FAILED"),
            Self::InvalidOrExpiredCode => (StatusCode::BAD_REQUEST, "INVALID_OR_EXPIRED_CODE"),
            Self::DuplicateEmail => (StatusCode::CONFLICT, "DUPLICATE_EMAIL"),
            Self::DuplicateUsername => (StatusCode::CONFLICT, "DUPLICATE_USERNAME"),
            Self::Delivery(_) => (StatusCode::BAD_GATEWAY, "DELIVERY_ERROR"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // Never expose internal or provider error messages to clients.
        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            Self::Delivery(_) => "Failed to send verification email".to_string(),
            other => other.to_string(),
        };

        match &self {
            Self::Internal(_) => tracing::error!(error = %self, "internal server error"),
            Self::Delivery(_) => tracing::error!(error = %self, "email delivery error"),
            _ => {}
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail => Self::DuplicateEmail,
            StoreError::DuplicateUsername => Self::DuplicateUsername,
            other => Self::Internal(other.to_string()),
        }
    }
}
