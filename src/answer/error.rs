//! Typed errors for answer-service calls
//!
//! Every variant is something the page shows to the user as a message; none
//! of them touch the widgets' selections.

use thiserror::Error;

/// Failures talking to the answer service
#[derive(Debug, Error)]
pub enum AnswerError {
    /// Non-2xx response
    #[error("HTTP error! Status: {status}")]
    Http { status: u16, body: String },

    /// Connection refused, timeout, DNS failure
    #[error("Network error: {0}")]
    Network(String),

    /// The body could not be decoded as an answer payload
    #[error("Invalid response: {0}")]
    Decode(String),

    /// The service answered with an `error` field
    #[error("{0}")]
    Service(String),
}

impl AnswerError {
    /// Whether trying again later could succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            AnswerError::Http { status, .. } => *status == 429 || (500..=599).contains(status),
            AnswerError::Network(_) => true,
            AnswerError::Decode(_) | AnswerError::Service(_) => false,
        }
    }

    /// Build from a non-success status and whatever body came with it
    pub fn from_http_status(status: reqwest::StatusCode, body: String) -> Self {
        AnswerError::Http {
            status: status.as_u16(),
            body,
        }
    }

    /// Classify a reqwest failure
    pub fn from_network_error(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            AnswerError::Network(format!("Request timeout: {}", e))
        } else if e.is_connect() {
            AnswerError::Network(format!("Connection failed: {}", e))
        } else if e.is_decode() {
            AnswerError::Decode(e.to_string())
        } else if let Some(status) = e.status() {
            Self::from_http_status(status, e.to_string())
        } else {
            AnswerError::Network(e.to_string())
        }
    }
}
