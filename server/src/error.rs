//! Error types for folio-server

use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use folio_common::{ValidationErrors, Violation};
use serde::Serialize;
use thiserror::Error;

/// Storage collaborator failures. Surfaced to clients only as a generic 500.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt contact data: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Notification failures. Logged, never returned to a client.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("relay transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("relay rejected notification with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("notifier timed out after {0:?}")]
    Timeout(Duration),

    #[error("notifier panicked: {0}")]
    Panicked(String),
}

/// HTTP-facing errors for the contact API.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error("failed to store contact: {0}")]
    Storage(StoreError),

    #[error("failed to list contacts: {0}")]
    Listing(StoreError),

    #[error("missing or invalid admin token")]
    Unauthorized,

    /// Body rejected before it could be read as JSON (wrong content type, too large).
    #[error("request body rejected: {message}")]
    Body { status: StatusCode, message: String },
}

/// Failure body shared by every error outcome.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<Violation>>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Storage(_) | ApiError::Listing(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Body { status, .. } => *status,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::Validation(errors) => ErrorResponse {
                success: false,
                message: "Invalid form data".to_string(),
                errors: Some(errors.violations),
            },
            ApiError::Storage(_) => ErrorResponse {
                success: false,
                message: "Failed to send message".to_string(),
                errors: None,
            },
            ApiError::Listing(_) => ErrorResponse {
                success: false,
                message: "Failed to fetch contacts".to_string(),
                errors: None,
            },
            ApiError::Unauthorized => ErrorResponse {
                success: false,
                message: "Unauthorized".to_string(),
                errors: None,
            },
            ApiError::Body { message, .. } => ErrorResponse {
                success: false,
                message,
                errors: None,
            },
        };

        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
