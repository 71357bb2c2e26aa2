use reqwest::StatusCode;
use thiserror::Error;

use crate::domain::value_objects::api::PayloadError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request timeout - please check your connection and try again")]
    Timeout,

    #[error("{message}")]
    Status { status: StatusCode, message: String },

    #[error("Network error: {0}")]
    Transport(String),

    #[error(transparent)]
    Payload(#[from] PayloadError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Builds the message for a non-success response, preferring what the server said.
    pub(crate) fn from_status(status: StatusCode, server_message: Option<String>) -> Self {
        let reason = status.canonical_reason().unwrap_or("Unknown Status");
        let message = match server_message.filter(|m| !m.trim().is_empty()) {
            Some(server_message) => format!("{} (HTTP {})", server_message.trim(), status.as_u16()),
            None => format!("HTTP {}: {}", status.as_u16(), reason),
        };
        ApiError::Status { status, message }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            return ApiError::Timeout;
        }
        if error.is_connect() {
            return ApiError::Transport("connection failed".to_string());
        }
        if error.is_decode() {
            return ApiError::Transport("failed to read response body".to_string());
        }
        ApiError::Transport(error.without_url().to_string())
    }
}
