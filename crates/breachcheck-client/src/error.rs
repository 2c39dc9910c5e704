//! Client error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Non-success response. `code` is the server's stable error code when
    /// the body carried one.
    #[error("Server error: {status} - {message}")]
    Server {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("Core error: {0}")]
    Core(#[from] breachcheck_core::Error),
}

impl ClientError {
    pub fn code(&self) -> Option<&str> {
        match self {
            ClientError::Server { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
