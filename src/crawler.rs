//! # Help Site Crawler Module
//!
//! This module crawls a documentation website and turns its pages into
//! [`Document`]s ready for indexing. It is the first stage of the question
//! answering pipeline.
//!
//! ## Key Components
//!
//! - `CrawlerConfig`: page ceiling, timeouts, politeness and extraction rules
//! - `Frontier`: FIFO queue of pending URLs plus the set of visited URLs
//! - `ContentExtractor`: strips boilerplate markup and normalizes visible text
//! - `crawl`: breadth-first traversal returning a `CrawlReport`
//! - `crawl_help_site`: convenience wrapper that only returns documents
//!
//! ## Features
//!
//! - Breadth-first traversal bounded by a page ceiling
//! - Links followed only when they share the base URL's host and port
//! - Non-HTML responses skipped without following their links
//! - Per-page failures logged and skipped, never aborting the crawl
//! - Optional request rate limiting

mod config;
pub mod content_extraction;
mod error;
mod frontier;
mod site_crawler;

pub use config::{CrawlerConfig, CrawlerConfigBuilder, ExtractorConfig};
pub use content_extraction::{ContentExtractor, extract_main_content};
pub use error::CrawlError;
pub use frontier::Frontier;
pub use site_crawler::{CrawlReport, crawl, crawl_help_site, same_domain};

use serde::{Deserialize, Serialize};

/// A crawled page reduced to its URL and extracted text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// URL of the page
    pub url: String,

    /// Normalized visible text of the page
    pub text: String,
}

impl Document {
    /// Create a new document
    pub fn new(url: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            text: text.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_json_shape() {
        let doc = Document::new("https://example.com/help", "Some help text");
        let json = serde_json::to_value(&doc).unwrap();

        assert_eq!(json["url"], "https://example.com/help");
        assert_eq!(json["text"], "Some help text");
    }
}
