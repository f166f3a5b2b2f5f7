use url::Url;

/// Checks whether `target` falls inside the crawl scope rooted at `base`
///
/// Scope is the base's host plus its path treated as a directory prefix.
/// A base of `/docs` admits `/docs`, `/docs/` and `/docs/intro`, but not
/// `/docsx`. Hosts compare case-insensitively and explicit ports must match;
/// scheme and query are not part of the scope.
///
/// Unparseable input on either side is out of scope.
///
/// # Examples
///
/// ```
/// use site_harvest::url::in_scope;
///
/// assert!(in_scope("https://example.com/docs", "https://example.com/docs/page"));
/// assert!(!in_scope("https://example.com/docs", "https://example.com/blog"));
/// ```
pub fn in_scope(base: &str, target: &str) -> bool {
    let (Ok(base), Ok(target)) = (Url::parse(base), Url::parse(target)) else {
        return false;
    };

    let same_host = match (base.host_str(), target.host_str()) {
        (Some(b), Some(t)) => b.eq_ignore_ascii_case(t),
        _ => false,
    };
    if !same_host || base.port() != target.port() {
        return false;
    }

    let prefix = base.path().trim_end_matches('/');
    let path = target.path();

    path == prefix || (path.starts_with(prefix) && path[prefix.len()..].starts_with('/'))
}

/// Returns true for `http` and `https` URLs
pub fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}
