//! Error types for relaymesh-cache

use thiserror::Error;

/// Error type for semantic cache operations
#[derive(Error, Debug)]
pub enum Error {
    /// Backing store failed or is unreachable
    #[error("store error: {0}")]
    Store(String),

    /// Embedding the query failed
    #[error("embedding error: {0}")]
    Embedding(#[from] relaymesh_llm::Error),

    /// Vector length does not match the store
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimensions
        expected: usize,
        /// Actual dimensions
        actual: usize,
    },

    /// Caller supplied unusable input
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A persisted row could not be decoded
    #[error("serialization error: {0}")]
    Serialization(String),

    /// SQLite error
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for semantic cache operations
pub type Result<T> = std::result::Result<T, Error>;
