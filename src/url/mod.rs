//! URL handling module for Seo-Lens
//!
//! This module provides URL normalization (the crawl's seen-set key), domain extraction,
//! and link scope classification against the crawl's registered root.

mod domain;
mod normalize;

use serde::Serialize;
use url::Url;

// Re-export main functions
pub use domain::{extract_domain, same_site};
pub use normalize::{normalize_parsed, normalize_url, url_key};

/// Where a link points relative to the audited site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkScope {
    /// Same host as the crawl root
    Internal,
    /// Any other host
    External,
    /// A fragment on the current page
    Anchor,
}

impl LinkScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Internal => "internal",
            Self::External => "external",
            Self::Anchor => "anchor",
        }
    }
}

/// Schemes that never describe a navigable page
const IGNORED_SCHEMES: &[&str] = &["mailto:", "tel:", "javascript:", "data:"];

/// Resolves an href against the page it appears on and classifies its scope
///
/// Returns None for hrefs that are not page links at all (empty, `mailto:`, `tel:`,
/// `javascript:`, `data:`, unparseable, or non-HTTP after resolution).
///
/// # Arguments
///
/// * `href` - The raw attribute value
/// * `page_url` - The final URL of the page containing the link
/// * `root` - The crawl's registered root URL
///
/// # Examples
///
/// ```
/// use seo_lens::url::{classify_href, LinkScope};
/// use url::Url;
///
/// let page = Url::parse("https://example.com/blog").unwrap();
/// let (url, scope) = classify_href("/about", &page, &page).unwrap();
/// assert_eq!(url.as_str(), "https://example.com/about");
/// assert_eq!(scope, LinkScope::Internal);
/// ```
pub fn classify_href(href: &str, page_url: &Url, root: &Url) -> Option<(Url, LinkScope)> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if IGNORED_SCHEMES.iter().any(|scheme| lowered.starts_with(scheme)) {
        return None;
    }

    let resolved = page_url.join(href).ok()?;
    if resolved.scheme() != "http" && resolved.scheme() != "https" {
        return None;
    }

    if href.starts_with('#') || href.starts_with("/#") {
        return Some((resolved, LinkScope::Anchor));
    }

    if resolved.fragment().is_some() && url_key(&resolved) == url_key(page_url) {
        return Some((resolved, LinkScope::Anchor));
    }

    let scope = if same_site(&resolved, root) {
        LinkScope::Internal
    } else {
        LinkScope::External
    };

    Some((resolved, scope))
}
