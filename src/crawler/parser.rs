//! HTML link extraction
//!
//! This module parses fetched HTML to find the links worth following, from
//! `<a>` tags and the canonical link.

use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// File extensions that never lead to documentation HTML
const NON_DOCUMENT_EXTENSIONS: &[&str] = &[
    "pdf", "png", "jpg", "jpeg", "gif", "svg", "webp", "ico", "zip", "gz", "tgz", "tar", "mp4",
    "mp3", "css", "js", "json", "xml", "txt", "exe", "dmg",
];

/// Parses HTML content and returns its followable links
///
/// Links are absolute, deduplicated and in document order.
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` tags anywhere in the document (navigation menus are
///   the main way documentation sites link their pages together)
/// - `<link rel="canonical" href="...">`
///
/// **Exclude:**
/// - `<a href="..." download>`
/// - `javascript:`, `mailto:`, `tel:`, `data:` links
/// - Fragment-only links (same-page anchors)
/// - Links to images, archives, PDFs and other non-HTML resources
///
/// # Example
///
/// ```
/// use doc_taxonomy::crawler::extract_links;
/// use url::Url;
///
/// let html = r#"<html><head><title>Guide</title></head><body><a href="/setup">Setup</a></body></html>"#;
/// let base_url = Url::parse("https://docs.example.com/").unwrap();
/// let links = extract_links(html, &base_url);
/// assert_eq!(links, vec!["https://docs.example.com/setup".to_string()]);
/// ```
pub fn extract_links(html: &str, base_url: &Url) -> Vec<String> {
    let document = Html::parse_document(html);
    collect_links(&document, base_url)
}

/// Extracts all followable links from the HTML document
fn collect_links(document: &Html, base_url: &Url) -> Vec<String> {
    let mut links = Vec::new();
    let mut seen = HashSet::new();

    let mut push = |href: &str| {
        if let Some(absolute_url) = resolve_link(href, base_url) {
            if seen.insert(absolute_url.clone()) {
                links.push(absolute_url);
            }
        }
    };

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            if element.value().attr("download").is_some() {
                continue;
            }

            if let Some(href) = element.value().attr("href") {
                push(href);
            }
        }
    }

    if let Ok(canonical_selector) = Selector::parse("link[rel='canonical'][href]") {
        for element in document.select(&canonical_selector) {
            if let Some(href) = element.value().attr("href") {
                push(href);
            }
        }
    }

    links
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded.
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if ["javascript:", "mailto:", "tel:", "data:"]
        .iter()
        .any(|scheme| lowered.starts_with(scheme))
    {
        return None;
    }

    let absolute_url = base_url.join(href).ok()?;
    if absolute_url.scheme() != "http" && absolute_url.scheme() != "https" {
        return None;
    }

    if is_non_document(&absolute_url) {
        return None;
    }

    Some(absolute_url.to_string())
}

/// Checks whether the URL path ends in a non-HTML resource extension
fn is_non_document(url: &Url) -> bool {
    let last_segment = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or("");

    match last_segment.rsplit_once('.') {
        Some((_, extension)) => {
            NON_DOCUMENT_EXTENSIONS.contains(&extension.to_ascii_lowercase().as_str())
        }
        None => false,
    }
}
