use std::sync::PoisonError;
use thiserror::Error;
use crate::api::DataError;

/// Error type for repository operations
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Credentials missing or rejected by the API
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// API or transport error
    #[error("API client error: {0}")]
    Client(#[source] DataError),

    /// Offline readings file could not be read
    #[error("Readings file error: {0}")]
    Source(String),

    /// Lock error
    #[error("Lock error: {0}")]
    Lock(String),
}

impl<T> From<PoisonError<T>> for RepositoryError {
    fn from(error: PoisonError<T>) -> Self {
        RepositoryError::Lock(error.to_string())
    }
}

impl From<DataError> for RepositoryError {
    fn from(error: DataError) -> Self {
        match error {
            DataError::Unauthorized(msg) => RepositoryError::Unauthorized(msg),
            DataError::Validation(msg) => RepositoryError::Validation(msg),
            DataError::Lock(msg) => RepositoryError::Lock(msg),
            other => RepositoryError::Client(other),
        }
    }
}
