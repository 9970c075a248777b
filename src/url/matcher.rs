/// Checks if a host matches an allow-list pattern
///
/// Two kinds of pattern are supported:
/// 1. Exact: "docs.example.com" matches only that host
/// 2. Wildcard: "*.example.com" matches "example.com" and any subdomain of it
///
/// Comparison ignores ASCII case, so patterns taken verbatim from a config
/// file match the lowercased hosts produced by URL normalization.
///
/// # Examples
///
/// ```
/// use doc_taxonomy::url::matches_wildcard;
///
/// assert!(matches_wildcard("docs.example.com", "docs.example.com"));
/// assert!(!matches_wildcard("docs.example.com", "api.example.com"));
///
/// assert!(matches_wildcard("*.example.com", "example.com"));
/// assert!(matches_wildcard("*.example.com", "api.v2.example.com"));
/// assert!(!matches_wildcard("*.example.com", "example.org"));
/// ```
pub fn matches_wildcard(pattern: &str, candidate: &str) -> bool {
    let pattern = pattern.to_ascii_lowercase();
    let candidate = candidate.to_ascii_lowercase();

    match pattern.strip_prefix("*.") {
        Some(base) => {
            candidate == base
                || candidate
                    .strip_suffix(base)
                    .is_some_and(|prefix| prefix.ends_with('.'))
        }
        None => candidate == pattern,
    }
}
