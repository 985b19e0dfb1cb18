//! Storage error types

use assessor_resilience::Retryable;
use thiserror::Error;

/// Result type for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Storage-related errors
///
/// Operation errors keep the backend's message unchanged so it can be handed
/// back to HTTP callers verbatim.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Error raised by the MongoDB driver
    #[cfg(feature = "mongo")]
    #[error(transparent)]
    Driver(#[from] mongodb::error::Error),

    /// Error raised by any other backend
    #[error("{0}")]
    Backend(String),

    /// The startup connection routine gave up
    #[error("Database connection failed: {0}")]
    ConnectionFailed(String),

    /// No connection has been established yet
    #[error("DB not connected")]
    NotConnected,

    /// The connection routine was already started for this handle
    #[error("Connection routine already started")]
    AlreadyStarted,
}

impl StorageError {
    /// Create a backend error carrying `message` verbatim
    pub fn backend(message: impl Into<String>) -> Self {
        StorageError::Backend(message.into())
    }
}

impl Retryable for StorageError {
    fn is_retryable(&self) -> bool {
        !matches!(self, StorageError::AlreadyStarted)
    }
}
