//! # Index Error Types Module
//!
//! Error types for the vector index: embedding failures, persistence
//! failures and misuse such as querying before an index exists.

use crate::error::Error as CrateError;
use thiserror::Error;

/// Error type for vector index operations
#[derive(Debug, Error)]
pub enum IndexError {
    /// Attempted to build an index from zero documents
    #[error("Cannot build index with empty documents list")]
    EmptyInput,

    /// Attempted to query before building or loading an index
    #[error("Vector index not initialized")]
    NotInitialized,

    /// The embedding model failed or returned unusable output
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// A vector does not have the index's dimensionality
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimensionality of the index
        expected: usize,
        /// Dimensionality of the offending vector
        actual: usize,
    },

    /// Persisted artifacts are unreadable or do not belong together
    #[error("Corrupted index artifacts: {0}")]
    Corrupted(String),

    /// The cache key could not be derived from a URL
    #[error("Invalid cache key source: {0}")]
    InvalidKey(String),

    /// Filesystem error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Document list serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<IndexError> for CrateError {
    fn from(err: IndexError) -> Self {
        match err {
            IndexError::EmptyInput => CrateError::EmptyInput(err.to_string()),
            IndexError::NotInitialized => CrateError::NotInitialized,
            IndexError::InvalidKey(url) => CrateError::InvalidUrl(url),
            IndexError::Io(e) => CrateError::Io(e),
            IndexError::Json(e) => CrateError::Json(e),
            _ => CrateError::Index(err.to_string()),
        }
    }
}
