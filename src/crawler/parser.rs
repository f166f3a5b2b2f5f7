//! HTML link extraction
//!
//! Collects the `href` of every `<a>` and `<link>` element, resolves it
//! against the page's final URL, and normalizes the result. Output order is
//! document order with duplicates removed.

use crate::url::normalize_url;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Parses a response body as an HTML document
///
/// Invalid UTF-8 is replaced rather than rejected, and the HTML parser itself
/// recovers from malformed markup; a broken page yields fewer links, never
/// an error.
pub fn parse_html(body: &[u8]) -> Html {
    Html::parse_document(&String::from_utf8_lossy(body))
}

/// Extracts normalized, de-duplicated links from a parsed document
///
/// # Arguments
///
/// * `base_url` - URL used to resolve relative links; pass the final URL
///   after redirects
/// * `document` - The parsed page
///
/// # Returns
///
/// Absolute normalized URLs in first-occurrence order. Values that cannot be
/// resolved or normalized are skipped.
///
/// # Example
///
/// ```
/// use site_harvest::crawler::{extract_links, parse_html};
///
/// let doc = parse_html(br#"<a href="/a">A</a><a href="/a#top">A again</a>"#);
/// let links = extract_links("https://example.com/docs/", &doc);
/// assert_eq!(links, vec!["https://example.com/a".to_string()]);
/// ```
pub fn extract_links(base_url: &str, document: &Html) -> Vec<String> {
    let Ok(base) = Url::parse(base_url) else {
        return Vec::new();
    };
    let Ok(selector) = Selector::parse("a[href], link[href]") else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };

        if let Some(link) = resolve_link(&base, href) {
            if seen.insert(link.clone()) {
                links.push(link);
            }
        }
    }

    links
}

/// Parses `body` and extracts its links in one step
///
/// The parsed document is dropped before returning, so callers in async code
/// never hold it across an await point.
pub fn discover_links(base_url: &str, body: &[u8]) -> Vec<String> {
    let document = parse_html(body);
    extract_links(base_url, &document)
}

/// Resolves an href against the base URL and normalizes it
fn resolve_link(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    let absolute = base.join(href).ok()?;
    normalize_url(absolute.as_str())
}
