use crate::{UrlError, UrlResult};
use url::Url;

/// Query keys that select different documentation content and are kept
///
/// Every other query parameter (tracking, sorting, UI state) is dropped so
/// that the same page reached through different links shares one key.
const CONTENT_PARAMS: &[&str] = &[
    "page", "p", "id", "version", "v", "lang", "locale", "topic", "section", "article", "doc",
];

/// Normalizes a URL into the form used as the crawl's visited-set key
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Reject anything but HTTP and HTTPS
/// 3. Lowercase the host (the port is kept)
/// 4. Normalize path:
///    - Remove dot segments (. and ..) and empty segments
///    - Remove trailing slash (except for root /)
///    - Empty path becomes /
/// 5. Remove fragment (everything after #)
/// 6. Keep only content-selecting query parameters, sorted by key
/// 7. Remove empty query string (trailing ?)
///
/// # Arguments
///
/// * `url_str` - The URL string to normalize
///
/// # Returns
///
/// * `Ok(Url)` - Normalized URL
/// * `Err(UrlError)` - Failed to parse or normalize the URL
///
/// # Examples
///
/// ```
/// use doc_taxonomy::url::normalize_url;
///
/// let url = normalize_url("https://DOCS.EXAMPLE.COM/guide/?utm_source=x#intro").unwrap();
/// assert_eq!(url.as_str(), "https://docs.example.com/guide");
///
/// let url = normalize_url("https://docs.example.com/api?version=2&sort=asc").unwrap();
/// assert_eq!(url.as_str(), "https://docs.example.com/api?version=2");
/// ```
pub fn normalize_url(url_str: &str) -> UrlResult<Url> {
    let mut url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => {
            let normalized_host = host.to_lowercase();
            url.set_host(Some(&normalized_host))
                .map_err(|e| UrlError::Malformed(format!("Failed to set host: {}", e)))?;
        }
        _ => return Err(UrlError::MissingDomain),
    }

    let normalized_path = normalize_path(url.path());
    url.set_path(&normalized_path);

    url.set_fragment(None);

    if url.query().is_some() {
        let kept_params = filter_and_sort_query_params(&url);

        if kept_params.is_empty() {
            url.set_query(None);
        } else {
            let query_string = kept_params
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join("&");
            url.set_query(Some(&query_string));
        }
    }

    Ok(url)
}

/// Normalizes a URL path by removing dot segments and trailing slashes
fn normalize_path(path: &str) -> String {
    let mut normalized_segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                normalized_segments.pop();
            }
            _ => normalized_segments.push(segment),
        }
    }

    if normalized_segments.is_empty() {
        return "/".to_string();
    }

    format!("/{}", normalized_segments.join("/"))
}

/// Keeps content-selecting query parameters and sorts them by key
fn filter_and_sort_query_params(url: &Url) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| is_content_param(key))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    params.sort();
    params
}

/// Checks whether a query parameter changes which content is served
fn is_content_param(key: &str) -> bool {
    CONTENT_PARAMS.contains(&key.to_ascii_lowercase().as_str())
}
