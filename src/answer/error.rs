//! # Answer Error Types Module
//!
//! Failures that can occur while retrieving context and calling the
//! text-generation service.

use crate::error::Error as CrateError;
use crate::index::IndexError;
use thiserror::Error;

/// Error type for question answering
#[derive(Debug, Error)]
pub enum AnswerError {
    /// Missing or unusable settings, detected before any request
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The generation request exceeded its time bound
    #[error("Request timed out")]
    Timeout,

    /// Transport failure or non-success HTTP status
    #[error("{0}")]
    Network(reqwest::Error),

    /// The response body could not be decoded
    #[error("{0}")]
    MalformedResponse(String),

    /// Retrieval failed
    #[error("{0}")]
    Index(#[from] IndexError),
}

impl From<reqwest::Error> for AnswerError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AnswerError::Timeout
        } else {
            AnswerError::Network(err)
        }
    }
}

impl From<AnswerError> for CrateError {
    fn from(err: AnswerError) -> Self {
        match err {
            AnswerError::Configuration(msg) => CrateError::Configuration(msg),
            AnswerError::Timeout => CrateError::Timeout(err.to_string()),
            AnswerError::Network(e) => CrateError::Network(e),
            AnswerError::MalformedResponse(msg) => CrateError::MalformedResponse(msg),
            AnswerError::Index(e) => e.into(),
        }
    }
}
