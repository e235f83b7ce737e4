//! Store error types
//!
//! Defines all errors that can occur in the key-value store layer.

use thiserror::Error;

/// Errors that can occur in a store backend
#[derive(Error, Debug)]
pub enum StoreError {
    /// I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// SQLite backend error
    #[error("Database error: {0}")]
    Database(String),

    /// Key cannot be stored by this backend
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Lock acquisition failed
    #[error("Lock error: {0}")]
    Lock(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Database(err.to_string())
    }
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;
