use url::Url;

/// Extracts the domain from a URL
///
/// This function retrieves the host portion of a URL and converts it to lowercase.
/// If the URL has no host (which shouldn't happen for valid HTTP(S) URLs), it returns None.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use doc_taxonomy::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
///
/// let url = Url::parse("https://docs.example.com:8443/guide").unwrap();
/// assert_eq!(extract_domain(&url), Some("docs.example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns the host with a leading `www.` removed
///
/// `www.example.com` and `example.com` serve the same documentation often
/// enough that the crawl treats them as one site.
pub fn site_host(domain: &str) -> &str {
    domain.strip_prefix("www.").unwrap_or(domain)
}
