//! API Error Types
//!
//! Failures talking to the booking backend, split the way the views
//! react to them: transport trouble versus a non-success reply.

use thiserror::Error;

/// Errors that can occur when communicating with the backend
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Backend unavailable")]
    Unavailable,

    #[error("Request timeout")]
    Timeout,

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Invalid response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Map a transport error the same way for every request
    pub(crate) fn from_transport(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ApiError::Timeout
        } else if e.is_connect() {
            ApiError::Unavailable
        } else {
            ApiError::Request(e)
        }
    }

    /// Text shown to the user when a write fails
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Status { message, .. } if !message.is_empty() => message.clone(),
            ApiError::Unavailable | ApiError::Timeout | ApiError::Request(_) => {
                format!("Network error: {}", self)
            }
            other => other.to_string(),
        }
    }
}

/// Result type for backend operations
pub type ApiResult<T> = Result<T, ApiError>;
