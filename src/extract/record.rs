use super::jsonld::StructuredData;
use crate::url::LinkScope;
use serde::Serialize;
use std::collections::BTreeMap;

/// Normalized SEO facts of one rendered page
///
/// Created once per visited URL by [`extract`](super::extract) and read-only afterwards. The
/// final URL is fixed at construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageRecord {
    url: String,

    /// Requested URL, when the page was reached through a redirect
    pub redirected_from: Option<String>,

    pub status_code: u16,
    pub content_type: Option<String>,

    pub title: Option<String>,
    pub meta_description: Option<String>,

    /// First canonical URL, resolved to absolute
    pub canonical_url: Option<String>,
    pub canonical_tag_count: usize,
    pub robots_meta: Option<String>,

    /// `<html lang>` value
    pub lang: Option<String>,
    pub has_viewport: bool,

    /// Headings in document order
    pub headings: Vec<Heading>,

    /// Number of words of visible text
    pub word_count: usize,

    /// SHA-256 of the whitespace-collapsed visible text
    pub content_hash: String,

    pub links: Vec<Link>,
    pub images: Vec<Image>,

    /// OpenGraph and Twitter metadata, first occurrence of each property
    pub social: BTreeMap<String, String>,

    pub structured_data: Vec<StructuredData>,

    /// Wall time from navigation start to the end of the settle wait
    pub render_timing_ms: u64,
    pub dom_content_loaded_ms: Option<u64>,
}

impl PageRecord {
    /// Creates an empty record for a final URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            redirected_from: None,
            status_code: 200,
            content_type: None,
            title: None,
            meta_description: None,
            canonical_url: None,
            canonical_tag_count: 0,
            robots_meta: None,
            lang: None,
            has_viewport: false,
            headings: Vec::new(),
            word_count: 0,
            content_hash: String::new(),
            links: Vec::new(),
            images: Vec::new(),
            social: BTreeMap::new(),
            structured_data: Vec::new(),
            render_timing_ms: 0,
            dom_content_loaded_ms: None,
        }
    }

    /// Final (post-redirect) URL of the page
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn h1_count(&self) -> usize {
        self.headings.iter().filter(|h| h.level == 1).count()
    }

    pub fn internal_links(&self) -> impl Iterator<Item = &Link> {
        self.links
            .iter()
            .filter(|link| link.scope == LinkScope::Internal)
    }

    /// Lowercase `og:type` value, if declared
    pub fn og_type(&self) -> Option<String> {
        self.social.get("og:type").map(|t| t.trim().to_ascii_lowercase())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Heading {
    /// 1 to 6
    pub level: u8,
    pub text: String,
}

/// An `<a href>` on the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    /// Absolute URL the link resolves to
    pub href: String,
    pub text: String,
    pub nofollow: bool,
    pub scope: LinkScope,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Image {
    pub src: String,
    /// Whether the image has non-blank ALT text
    pub has_alt: bool,
    pub alt_text: Option<String>,
}
