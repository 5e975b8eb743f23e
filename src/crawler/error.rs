//! Error types for the crawler module

use crate::error::Error as CrateError;
use thiserror::Error;

/// Error type for crawler operations
#[derive(Debug, Error)]
pub enum CrawlError {
    /// The base URL is malformed or lacks a scheme or host
    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),

    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("HTTP status {status} for {url}")]
    Status {
        /// Requested URL
        url: String,
        /// HTTP status code
        status: u16,
    },
}

impl From<CrawlError> for CrateError {
    fn from(err: CrawlError) -> Self {
        match err {
            CrawlError::InvalidUrl(url) => CrateError::InvalidUrl(url),
            CrawlError::Http(e) if e.is_timeout() => CrateError::Timeout(e.to_string()),
            CrawlError::Http(e) => CrateError::Network(e),
            CrawlError::Status { .. } => CrateError::Crawl(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_crate_error() {
        let invalid: CrateError = CrawlError::InvalidUrl("nope".to_string()).into();
        assert!(matches!(invalid, CrateError::InvalidUrl(url) if url == "nope"));

        let status: CrateError = CrawlError::Status {
            url: "https://help.example.com/".to_string(),
            status: 404,
        }
        .into();
        assert!(matches!(status, CrateError::Crawl(ref msg) if msg.contains("404")));
    }
}
