//! Content extraction functionality for the crawler module

use std::collections::HashSet;

use scraper::{ElementRef, Html, Selector};
use tracing::warn;
use url::Url;

use crate::crawler::config::ExtractorConfig;

/// Extracts normalized visible text from HTML pages
#[derive(Debug, Clone)]
pub struct ContentExtractor {
    exclude_tags: HashSet<String>,
    content_selector: Option<Selector>,
    min_content_chars: usize,
}

impl Default for ContentExtractor {
    fn default() -> Self {
        Self::new(&ExtractorConfig::default())
    }
}

impl ContentExtractor {
    /// Create an extractor from configuration
    ///
    /// Content selectors that fail to parse are logged and ignored.
    pub fn new(config: &ExtractorConfig) -> Self {
        let valid: Vec<&str> = config
            .content_selectors
            .iter()
            .map(String::as_str)
            .filter(|selector_str| match Selector::parse(selector_str) {
                Ok(_) => true,
                Err(e) => {
                    warn!("Failed to parse selector '{}': {}", selector_str, e);
                    false
                }
            })
            .collect();

        // Joined into one selector list so matches come back in document order
        let content_selector = if valid.is_empty() {
            None
        } else {
            Selector::parse(&valid.join(", ")).ok()
        };

        Self {
            exclude_tags: config
                .exclude_tags
                .iter()
                .map(|tag| tag.to_ascii_lowercase())
                .collect(),
            content_selector,
            min_content_chars: config.min_content_chars,
        }
    }

    /// Extract the main text content of a page
    ///
    /// # Arguments
    ///
    /// * `html` - The raw page markup
    ///
    /// # Returns
    ///
    /// The joined text, or `None` when it is too short to be useful
    pub fn extract(&self, html: &str) -> Option<String> {
        let document = Html::parse_document(html);
        self.extract_document(&document)
    }

    /// Extract the main text content from an already parsed document
    pub fn extract_document(&self, document: &Html) -> Option<String> {
        let mut parts = Vec::new();

        match &self.content_selector {
            Some(selector) => {
                let mut taken = HashSet::new();
                for element in document.select(selector) {
                    if element.ancestors().any(|a| taken.contains(&a.id())) {
                        continue;
                    }
                    taken.insert(element.id());
                    self.collect_text(element, &mut parts);
                }
            }
            None => self.collect_text(document.root_element(), &mut parts),
        }

        let text = parts.join(" ");
        if text.chars().count() > self.min_content_chars {
            Some(text)
        } else {
            None
        }
    }

    fn collect_text<'a>(&self, element: ElementRef<'a>, parts: &mut Vec<&'a str>) {
        if self.exclude_tags.contains(element.value().name()) {
            return;
        }

        for child in element.children() {
            if let Some(text) = child.value().as_text() {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    parts.push(trimmed);
                }
            } else if let Some(child_element) = ElementRef::wrap(child) {
                self.collect_text(child_element, parts);
            }
        }
    }
}

/// Extract the main text content of a page with the default rules
///
/// Strips `script`, `style`, `header`, `footer` and `nav` elements and
/// returns `None` for pages of 100 characters or fewer.
pub fn extract_main_content(html: &str) -> Option<String> {
    ContentExtractor::default().extract(html)
}

/// Resolve every `<a href>` of a document against the page URL
///
/// Fragments are dropped so that in-page anchors resolve to the page itself.
/// Hrefs that cannot be resolved are skipped.
pub fn extract_links(document: &Html, page_url: &Url) -> Vec<Url> {
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| page_url.join(href.trim()).ok())
        .map(|mut url| {
            url.set_fragment(None);
            url
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FILLER: &str = "Our help center explains how to reset your password, update billing \
        details, and contact the support team whenever something goes wrong.";

    #[test]
    fn test_strips_boilerplate_elements() {
        let html = format!(
            "<html><head><style>body {{ color: red; }}</style><script>var x = 1;</script></head>\
             <body><header>Site Header</header><nav>Home | Docs</nav>\
             <main><h1>Reset</h1><p>{}</p></main><footer>Copyright</footer></body></html>",
            FILLER
        );

        let text = extract_main_content(&html).unwrap();
        assert_eq!(text, format!("Reset {}", FILLER));
        assert!(!text.contains("Site Header"));
        assert!(!text.contains("Home | Docs"));
        assert!(!text.contains("Copyright"));
        assert!(!text.contains("var x"));
        assert!(!text.contains("color: red"));
    }

    #[test]
    fn test_joins_stripped_text_nodes_with_single_spaces() {
        let html = format!(
            "<body><p>   First   </p>\n\n<div>\n  <span>Second</span>\n</div><p>{}</p></body>",
            FILLER
        );

        let text = extract_main_content(&html).unwrap();
        assert!(text.starts_with("First Second "));
    }

    #[test]
    fn test_length_threshold() {
        let exactly_100 = "a".repeat(100);
        let html = format!("<html><body><p>{}</p></body></html>", exactly_100);
        assert_eq!(extract_main_content(&html), None);

        let just_over = "a".repeat(101);
        let html = format!("<html><body><p>{}</p></body></html>", just_over);
        assert_eq!(extract_main_content(&html), Some(just_over));
    }

    #[test]
    fn test_threshold_counts_characters_not_bytes() {
        let text = "é".repeat(60);
        let html = format!("<p>{}</p>", text);
        assert_eq!(extract_main_content(&html), None);
    }

    #[test]
    fn test_content_selectors_restrict_extraction() {
        let config = ExtractorConfig {
            content_selectors: vec!["article".to_string(), "not a [valid".to_string()],
            ..ExtractorConfig::default()
        };
        let extractor = ContentExtractor::new(&config);
        let html = format!(
            "<body><aside>Sidebar links</aside><article><p>{}</p><article>Nested</article></article></body>",
            FILLER
        );

        let text = extractor.extract(&html).unwrap();
        assert_eq!(text, format!("{} Nested", FILLER));
    }

    #[test]
    fn test_extract_links_resolves_against_page_url() {
        let document = Html::parse_document(
            r##"<a href="/docs/start">Start</a>
                <a href="faq#billing">FAQ</a>
                <a href="https://other.example.org/x">Other</a>
                <a href="mailto:help@example.com">Mail</a>
                <a>No href</a>"##,
        );
        let page = Url::parse("https://example.com/help/index.html").unwrap();

        let links: Vec<String> = extract_links(&document, &page)
            .into_iter()
            .map(String::from)
            .collect();

        assert_eq!(
            links,
            vec![
                "https://example.com/docs/start",
                "https://example.com/help/faq",
                "https://other.example.org/x",
                "mailto:help@example.com",
            ]
        );
    }
}
