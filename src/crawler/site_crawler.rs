//! Breadth-first help site crawler

use governor::{Quota, RateLimiter};
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use scraper::Html;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

use crate::crawler::content_extraction::{ContentExtractor, extract_links};
use crate::crawler::error::CrawlError;
use crate::crawler::frontier::Frontier;
use crate::crawler::{CrawlerConfig, Document};

/// Outcome of a crawl
#[derive(Debug, Clone, Default)]
pub struct CrawlReport {
    /// Pages with extractable content, in crawl order
    pub documents: Vec<Document>,

    /// Every URL the crawler visited, in visit order
    pub visited: Vec<String>,
}

/// Crawl a help site and return its documents
///
/// Invalid base URLs are logged and produce an empty result, so callers see
/// "nothing found" rather than an error.
///
/// # Arguments
///
/// * `base_url` - The URL to start from
/// * `max_pages` - Maximum number of pages to visit
pub async fn crawl_help_site(base_url: &str, max_pages: usize) -> Vec<Document> {
    let config = CrawlerConfig::builder().max_pages(max_pages).build();
    match crawl(base_url, &config).await {
        Ok(report) => report.documents,
        Err(e) => {
            error!("Crawl of {} failed: {}", base_url, e);
            Vec::new()
        }
    }
}

/// Crawl a website breadth-first and extract its content
///
/// Only links sharing the base URL's host and port are followed. A page
/// that fails to download or parse is logged and skipped.
///
/// # Arguments
///
/// * `base_url` - The URL to start from
/// * `config` - The crawler configuration
///
/// # Returns
///
/// The extracted documents and the visited URLs, or `InvalidUrl` if the
/// base URL has no scheme or host
#[instrument(skip(config), fields(max_pages = config.max_pages))]
pub async fn crawl(base_url: &str, config: &CrawlerConfig) -> Result<CrawlReport, CrawlError> {
    let base = parse_base_url(base_url)?;
    info!("Starting crawl for {}", base);
    debug!("Crawler config: {:?}", config);

    let client = Client::builder()
        .timeout(config.request_timeout)
        .user_agent(config.user_agent.as_str())
        .build()?;
    let limiter = config
        .requests_per_second
        .map(|rps| RateLimiter::direct(Quota::per_second(rps)));
    let extractor = ContentExtractor::new(&config.extractor);

    let mut frontier = Frontier::new(base.clone(), config.max_pages);
    let mut documents = Vec::new();

    while let Some(url) = frontier.pop() {
        if let Some(limiter) = &limiter {
            limiter.until_ready().await;
        }

        let html = match fetch_html(&client, &url).await {
            Ok(Some(html)) => html,
            Ok(None) => {
                debug!("Skipping non-HTML page: {}", url);
                continue;
            }
            Err(e) => {
                warn!("Failed to process {}: {}", url, e);
                continue;
            }
        };

        let (content, links) = parse_page(&extractor, &html, &url);
        match content {
            Some(text) => {
                debug!("Extracted {} characters from {}", text.len(), url);
                documents.push(Document {
                    url: url.to_string(),
                    text,
                });
            }
            None => debug!("Skipping page without content: {}", url),
        }

        for link in links {
            if same_domain(&base, &link) {
                frontier.push(link);
            }
        }
    }

    let visited: Vec<String> = frontier
        .into_visited()
        .into_iter()
        .map(String::from)
        .collect();
    info!(
        "Crawl finished: {} documents from {} pages",
        documents.len(),
        visited.len()
    );

    Ok(CrawlReport { documents, visited })
}

/// Whether `candidate` has the same network location (host and port) as `base`
pub fn same_domain(base: &Url, candidate: &Url) -> bool {
    candidate.has_host()
        && base.host_str() == candidate.host_str()
        && base.port() == candidate.port()
}

fn parse_base_url(base_url: &str) -> Result<Url, CrawlError> {
    let mut url = Url::parse(base_url.trim())
        .map_err(|e| CrawlError::InvalidUrl(format!("{}: {}", base_url, e)))?;
    if !url.has_host() {
        return Err(CrawlError::InvalidUrl(format!(
            "{}: missing network location",
            base_url
        )));
    }
    url.set_fragment(None);
    Ok(url)
}

/// Download a page, returning `None` for non-HTML responses
async fn fetch_html(client: &Client, url: &Url) -> Result<Option<String>, CrawlError> {
    let response = client.get(url.clone()).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(CrawlError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let is_html = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|content_type| content_type.contains("text/html"));
    if !is_html {
        return Ok(None);
    }

    Ok(Some(response.text().await?))
}

/// Parse a page once for both its content and its outgoing links
fn parse_page(extractor: &ContentExtractor, html: &str, url: &Url) -> (Option<String>, Vec<Url>) {
    let document = Html::parse_document(html);
    let content = extractor.extract_document(&document);
    let links = extract_links(&document, url);
    (content, links)
}
