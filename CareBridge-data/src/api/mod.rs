use std::sync::PoisonError;
use thiserror::Error;

// REST client modules
pub mod client;

// Re-export client types
pub use client::*;

/// Errors raised while talking to the API or to local storage
#[derive(Debug, Error)]
pub enum DataError {
    /// Transport or decoding failure inside reqwest
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server rejected the bearer token
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Any other non-success status
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Server-provided message, or the canonical reason
        message: String,
    },

    /// Client configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Request payload failed validation before sending
    #[error("Validation error: {0}")]
    Validation(String),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Lock error
    #[error("Lock error: {0}")]
    Lock(String),
}

impl<T> From<PoisonError<T>> for DataError {
    fn from(error: PoisonError<T>) -> Self {
        DataError::Lock(error.to_string())
    }
}
