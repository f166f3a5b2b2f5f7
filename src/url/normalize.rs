use url::Url;

/// Normalizes a URL into the canonical string used as page identity
///
/// # Normalization Steps
///
/// 1. Trim surrounding whitespace and parse; reject relative or malformed input
/// 2. Reject URLs without a host (`mailto:`, `data:`, `file:///...`)
/// 3. Lowercase the scheme and host
/// 4. Remove fragment (everything after #)
/// 5. Remove trailing slashes from non-root paths; an empty path becomes /
///
/// The query string is kept as-is. Two URLs name the same page iff their
/// normalized forms are byte-equal, and normalizing twice is a no-op.
///
/// # Arguments
///
/// * `raw` - The URL string to normalize
///
/// # Returns
///
/// * `Some(String)` - Normalized URL
/// * `None` - The input is not an absolute URL with a host
///
/// # Examples
///
/// ```
/// use site_harvest::url::normalize_url;
///
/// let url = normalize_url("HTTPS://EXAMPLE.COM/docs/#intro").unwrap();
/// assert_eq!(url, "https://example.com/docs");
/// assert_eq!(normalize_url("/relative"), None);
/// ```
pub fn normalize_url(raw: &str) -> Option<String> {
    let mut url = Url::parse(raw.trim()).ok()?;

    let host = url.host_str().filter(|h| !h.is_empty())?;

    // The parser lowercases hosts of special schemes only
    let lowered = host.to_ascii_lowercase();
    if lowered != host {
        url.set_host(Some(&lowered)).ok()?;
    }

    url.set_fragment(None);

    let path = url.path();
    if path != "/" {
        let trimmed = path.trim_end_matches('/');
        let normalized_path = if trimmed.is_empty() {
            "/".to_string()
        } else {
            trimmed.to_string()
        };
        url.set_path(&normalized_path);
    }

    Some(url.into())
}
