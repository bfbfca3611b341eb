//! Error types for the Hearth SDK.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HearthError {
    /// The HTTP response had a non-2xx status code.
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// An error from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Input rejected before any request was sent.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The cached status does not allow the action.
    #[error("Cannot {action} {resource} in status '{status}'")]
    InvalidTransition {
        resource: &'static str,
        status: String,
        action: &'static str,
    },

    /// A generic error string.
    #[error("{0}")]
    Other(String),
}

impl HearthError {
    /// HTTP status of an API error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, HearthError>;
