//! Error types for wayfare.

use thiserror::Error;

/// Result type alias using wayfare's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for wayfare operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Unique constraint violated; the message is safe to show to clients.
    #[error("{0}")]
    Duplicate(String),

    /// No database connection is available (degraded mode).
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// Search operation failed
    #[error("Search error: {0}")]
    Search(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Returns true when the error means the backing store is not reachable.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Error::Unavailable(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
