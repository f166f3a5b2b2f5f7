use std::path::PathBuf;
use url::Url;

/// Derives the relative output path for a saved page
///
/// The host becomes the top-level directory (with `_<port>` appended when the
/// URL carries an explicit port) and the path segments follow. Root and empty
/// paths map to `index.html`, `..` is replaced with `__`, and every file ends
/// in `.html`. The query string does not take part.
///
/// # Examples
///
/// ```
/// use site_harvest::url::url_to_filename;
/// use std::path::PathBuf;
///
/// assert_eq!(
///     url_to_filename("https://example.com/docs/intro"),
///     Some(PathBuf::from("example.com/docs/intro.html"))
/// );
/// ```
pub fn url_to_filename(url: &str) -> Option<PathBuf> {
    let url = Url::parse(url).ok()?;
    let host = url.host_str().filter(|h| !h.is_empty())?;

    let dir = match url.port() {
        Some(port) => format!("{}_{}", host, port),
        None => host.to_string(),
    };

    let mut relative = url.path().trim_matches('/').replace("..", "__");
    if relative.is_empty() {
        relative = "index".to_string();
    }
    if !relative.ends_with(".html") {
        relative.push_str(".html");
    }

    let mut path = PathBuf::from(dir);
    for segment in relative.split('/').filter(|s| !s.is_empty()) {
        path.push(segment);
    }

    Some(path)
}
