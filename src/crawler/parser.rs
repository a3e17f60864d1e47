//! Link extraction from fetched content
//!
//! The crawler only depends on the [`LinkExtractor`] trait; the default
//! [`HtmlLinkExtractor`] parses HTML with `scraper`.

use scraper::{Html, Selector};
use url::Url;

/// Turns fetched content into candidate links
pub trait LinkExtractor: Send + Sync {
    /// Returns absolute URLs found in `body`
    ///
    /// Content whose media type is not `text/html` yields no links.
    fn extract(&self, body: &[u8], content_type: &str, base_url: &Url) -> Vec<Url>;
}

/// Extracts links from HTML documents
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` tags
/// - `<link rel="canonical" href="...">`
///
/// **Exclude:**
/// - `<a href="..." download>`
/// - `javascript:`, `mailto:`, `tel:` links
/// - Data URIs
/// - Fragment-only links
/// - Anything that is not HTTP(S) after resolution
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlLinkExtractor;

impl LinkExtractor for HtmlLinkExtractor {
    fn extract(&self, body: &[u8], content_type: &str, base_url: &Url) -> Vec<Url> {
        if content_type != "text/html" {
            return Vec::new();
        }

        let html = String::from_utf8_lossy(body);
        extract_links(&html, base_url)
    }
}

/// Parses an HTML document and returns its followable links
///
/// # Example
///
/// ```
/// use sumi_mirror::crawler::extract_links;
/// use url::Url;
///
/// let html = r#"<html><body><a href="/page">Link</a></body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let links = extract_links(html, &base_url);
/// assert_eq!(links[0].as_str(), "https://example.com/page");
/// ```
pub fn extract_links(html: &str, base_url: &Url) -> Vec<Url> {
    let document = Html::parse_document(html);
    let mut links = Vec::new();

    // Extract links from <a> tags
    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            // Skip if it has the download attribute
            if element.value().attr("download").is_some() {
                continue;
            }

            if let Some(href) = element.value().attr("href") {
                links.extend(resolve_link(href, base_url));
            }
        }
    }

    // Extract canonical link
    if let Ok(canonical_selector) = Selector::parse("link[rel='canonical'][href]") {
        for element in document.select(&canonical_selector) {
            if let Some(href) = element.value().attr("href") {
                links.extend(resolve_link(href, base_url));
            }
        }
    }

    links
}

/// Resolves a link href to an absolute URL and validates it
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    // Skip special schemes
    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    let mut absolute_url = base_url.join(href).ok()?;
    if absolute_url.scheme() != "http" && absolute_url.scheme() != "https" {
        return None;
    }

    absolute_url.set_fragment(None);
    Some(absolute_url)
}
