use crate::{UrlError, UrlResult};
use url::Url;

/// Normalizes a URL into the form used as the crawl's seen-set key
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Reject anything but http:// and https://
/// 3. Lowercase scheme and host, drop the scheme's default port
/// 4. Normalize path:
///    - Remove dot segments (. and ..) and empty segments
///    - Remove trailing slash (except for root /)
///    - Empty path becomes /
/// 5. Remove fragment (everything after #)
///
/// The query string is kept as-is: two URLs differing only in query are distinct pages.
///
/// # Examples
///
/// ```
/// use seo_lens::url::normalize_url;
///
/// let url = normalize_url("HTTP://EXAMPLE.COM:80/page/#top").unwrap();
/// assert_eq!(url.as_str(), "http://example.com/page");
/// ```
pub fn normalize_url(url_str: &str) -> UrlResult<Url> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;
    normalize_parsed(&url)
}

/// Normalizes an already parsed URL (see [`normalize_url`])
pub fn normalize_parsed(url: &Url) -> UrlResult<Url> {
    // Scheme and host are lowercased, and default ports dropped, by the parser itself
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingDomain);
    }

    let mut normalized = url.clone();
    let path = normalize_path(url.path());
    normalized.set_path(&path);
    normalized.set_fragment(None);

    if normalized.query() == Some("") {
        normalized.set_query(None);
    }

    Ok(normalized)
}

/// Returns the seen-set key for a URL, or None if it cannot be crawled
pub fn url_key(url: &Url) -> Option<String> {
    normalize_parsed(url).ok().map(String::from)
}

/// Normalizes a URL path by removing dot segments and trailing slashes
fn normalize_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                segments.pop();
            }
            _ => segments.push(segment),
        }
    }

    if segments.is_empty() {
        return "/".to_string();
    }

    format!("/{}", segments.join("/"))
}
