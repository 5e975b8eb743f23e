//! Error types for the helpdesk crate

use thiserror::Error;

/// Result type for helpdesk operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for helpdesk operations
#[derive(Debug, Error)]
pub enum Error {
    /// The base URL could not be parsed or has no scheme/host
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The crawl produced no documents to index
    #[error("No documentation found: {0}")]
    EmptyInput(String),

    /// A required setting (such as the API token) is missing or unusable
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A query was attempted before an index was built or loaded
    #[error("Vector index not initialized")]
    NotInitialized,

    /// HTTP client error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A network call exceeded its time bound
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// The generation service answered with an unexpected shape
    #[error("Unexpected response format: {0}")]
    MalformedResponse(String),

    /// Filesystem error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Web crawling error
    #[error("Crawl error: {0}")]
    Crawl(String),

    /// Vector index error
    #[error("Index error: {0}")]
    Index(String),
}
