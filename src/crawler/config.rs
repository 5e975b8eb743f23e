//! # Crawler Configuration Module
//!
//! Configuration for the help site crawler and its content extractor. Both
//! structs have defaults matching a polite documentation crawl and a builder
//! for the crawler settings.
//!
//! ## Key Components
//!
//! - `CrawlerConfig`: page ceiling, request timeout, user agent, rate limit
//! - `ExtractorConfig`: which elements are stripped and how short a page may be
//! - `CrawlerConfigBuilder`: builder pattern implementation for easier configuration

use std::num::NonZeroU32;
use std::time::Duration;

/// Default maximum number of pages visited per crawl
pub const DEFAULT_MAX_PAGES: usize = 200;

/// Default per-request timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Pages whose extracted text is at or below this many characters are noise
pub const DEFAULT_MIN_CONTENT_CHARS: usize = 100;

/// Configuration for the content extractor
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Element names whose whole subtree is removed before extraction
    pub exclude_tags: Vec<String>,

    /// CSS selectors restricting extraction to matching elements (all text when empty)
    pub content_selectors: Vec<String>,

    /// Extracted text must be longer than this many characters
    pub min_content_chars: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            exclude_tags: vec![
                "script".to_string(),
                "style".to_string(),
                "header".to_string(),
                "footer".to_string(),
                "nav".to_string(),
            ],
            content_selectors: Vec::new(),
            min_content_chars: DEFAULT_MIN_CONTENT_CHARS,
        }
    }
}

/// Configuration for the crawler
#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    /// Maximum number of pages to visit
    pub max_pages: usize,

    /// Timeout for each page request
    pub request_timeout: Duration,

    /// User agent to use for requests
    pub user_agent: String,

    /// Maximum requests per second, unlimited when `None`
    pub requests_per_second: Option<NonZeroU32>,

    /// Content extraction rules
    pub extractor: ExtractorConfig,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_pages: DEFAULT_MAX_PAGES,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            user_agent: format!("helpdesk-crawler/{}", env!("CARGO_PKG_VERSION")),
            requests_per_second: None,
            extractor: ExtractorConfig::default(),
        }
    }
}

/// Builder for CrawlerConfig
#[derive(Debug, Default)]
pub struct CrawlerConfigBuilder {
    config: CrawlerConfig,
}

impl CrawlerConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: CrawlerConfig::default(),
        }
    }

    /// Set the maximum number of pages to visit
    pub fn max_pages(mut self, max_pages: usize) -> Self {
        self.config.max_pages = max_pages;
        self
    }

    /// Set the timeout for each page request
    pub fn request_timeout(mut self, request_timeout: Duration) -> Self {
        self.config.request_timeout = request_timeout;
        self
    }

    /// Set the user agent to use for requests
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Limit the crawl to `rps` requests per second (0 disables the limit)
    pub fn requests_per_second(mut self, rps: u32) -> Self {
        self.config.requests_per_second = NonZeroU32::new(rps);
        self
    }

    /// Set the element names stripped before extraction
    pub fn exclude_tags(mut self, exclude_tags: Vec<String>) -> Self {
        self.config.extractor.exclude_tags = exclude_tags;
        self
    }

    /// Set the CSS selectors for content to include
    pub fn content_selectors(mut self, content_selectors: Vec<String>) -> Self {
        self.config.extractor.content_selectors = content_selectors;
        self
    }

    /// Set the minimum extracted text length
    pub fn min_content_chars(mut self, min_content_chars: usize) -> Self {
        self.config.extractor.min_content_chars = min_content_chars;
        self
    }

    /// Build the configuration
    pub fn build(self) -> CrawlerConfig {
        self.config
    }
}

impl CrawlerConfig {
    /// Create a new builder
    pub fn builder() -> CrawlerConfigBuilder {
        CrawlerConfigBuilder::new()
    }
}
