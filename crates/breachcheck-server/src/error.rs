//! Server error types

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use breachcheck_core::Error as CoreError;
use serde::Serialize;
use thiserror::Error;

use crate::store::StoreError;

/// Structured error response for API clients
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
}

#[derive(Error, Debug)]
pub enum ServerError {
    /// Caller input failed validation (bad digest, bad prefix, bad record).
    #[error(transparent)]
    Validation(#[from] CoreError),

    /// Request body could not be decoded at all.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage fault: {0}")]
    Storage(StoreError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for ServerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation(e) => ServerError::Validation(e),
            other => ServerError::Storage(other),
        }
    }
}

impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        ServerError::InvalidRequest(rejection.body_text())
    }
}

impl ServerError {
    /// Get the error code for structured responses
    pub fn code(&self) -> &'static str {
        match self {
            ServerError::Validation(CoreError::InvalidDigest { .. }) => "INVALID_HASH",
            ServerError::Validation(CoreError::InvalidPrefix(_)) => "INVALID_PREFIX",
            ServerError::Validation(_) => "VALIDATION_ERROR",
            ServerError::InvalidRequest(_) => "INVALID_REQUEST",
            ServerError::NotFound(_) => "NOT_FOUND",
            ServerError::Storage(_) => "STORAGE_FAULT",
            ServerError::Config(_) => "CONFIG_ERROR",
            ServerError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get the HTTP status code for this error
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::Validation(_) => StatusCode::BAD_REQUEST,
            ServerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, code = self.code(), "Request failed");
        }

        // Storage details stay in the log.
        let error = match &self {
            ServerError::Storage(_) => "Storage fault".to_string(),
            other => other.to_string(),
        };
        let body = ErrorResponse {
            error,
            code: self.code(),
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;
