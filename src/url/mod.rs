//! URL handling module for Doc-Taxonomy
//!
//! This module provides URL normalization (the crawl's visited-set key),
//! host extraction, wildcard matching, and the host scope check that keeps a
//! crawl on its documentation site.

mod domain;
mod matcher;
mod normalize;

// Re-export main functions
pub use domain::{extract_domain, site_host};
pub use matcher::matches_wildcard;
pub use normalize::normalize_url;

use ::url::Url;

/// Decides whether a link's host belongs to the site being crawled
///
/// A host is in scope when it is the seed's host (ignoring a leading `www.`)
/// or matches one of the allow-list patterns.
///
/// # Examples
///
/// ```
/// use doc_taxonomy::url::is_in_scope;
///
/// let allowed = vec!["*.readthedocs.io".to_string()];
/// assert!(is_in_scope("www.example.com", "example.com", &allowed));
/// assert!(is_in_scope("project.readthedocs.io", "example.com", &allowed));
/// assert!(!is_in_scope("tracker.example.net", "example.com", &allowed));
/// ```
pub fn is_in_scope(host: &str, seed_host: &str, allowed_domains: &[String]) -> bool {
    let host = host.to_ascii_lowercase();
    let seed_host = seed_host.to_ascii_lowercase();

    if site_host(&host) == site_host(&seed_host) {
        return true;
    }

    allowed_domains
        .iter()
        .any(|pattern| matches_wildcard(pattern, &host))
}

/// Visited-set key for a normalized URL
///
/// A leading `www.` is folded into the host, matching the scope check, so
/// both spellings of a page share one key. The URL that gets fetched keeps
/// its host.
///
/// # Examples
///
/// ```
/// use doc_taxonomy::url::{normalize_url, visit_key};
///
/// let www = normalize_url("https://www.example.com/guide").unwrap();
/// let bare = normalize_url("https://example.com/guide").unwrap();
/// assert_eq!(visit_key(&www), visit_key(&bare));
/// ```
pub fn visit_key(url: &Url) -> String {
    if let Some(host) = url.host_str().and_then(|h| h.strip_prefix("www.")) {
        let mut key = url.clone();
        if key.set_host(Some(host)).is_ok() {
            return key.to_string();
        }
    }
    url.to_string()
}
