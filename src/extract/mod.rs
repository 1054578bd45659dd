//! Extraction of SEO signals from a rendered page
//!
//! This module turns one rendered DOM snapshot plus its request metadata into a [`PageRecord`]:
//! - Visible text, word count, content hash and headings (one walk, see [`text`])
//! - Head metadata: title, description, canonical, robots, viewport, language
//! - Links with their scope relative to the crawl root
//! - Images and their ALT text
//! - OpenGraph/Twitter metadata
//! - JSON-LD structured data blocks
//!
//! Extraction is deterministic: the same snapshot and metadata always produce an equal record.

mod dom;
mod jsonld;
mod record;
mod text;

pub use dom::{collapse_whitespace, NodeHandle, RenderedDom};
pub use jsonld::StructuredData;
pub use record::{Heading, Image, Link, PageRecord};
pub use text::{walk_visible_text, VisibleText};

use crate::url::{classify_href, url_key};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;
use url::Url;

/// Errors that prevent a record from being built
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("rendered document for {url} has no root element")]
    EmptyDocument { url: String },
}

/// What the crawl knows about a page besides its DOM
#[derive(Debug, Clone)]
pub struct RequestMeta {
    /// URL the crawler asked for
    pub requested_url: Url,
    /// URL the browser ended on
    pub final_url: Url,
    /// Registered root of the crawl, used to scope links
    pub root_url: Url,
    pub status_code: u16,
    pub content_type: Option<String>,
    pub render_timing_ms: u64,
    pub dom_content_loaded_ms: Option<u64>,
}

/// Builds a [`PageRecord`] from a rendered DOM
///
/// Fails only for a blank snapshot; missing fields are recorded as absent.
///
/// # Example
///
/// ```
/// use seo_lens::extract::{extract, RenderedDom, RequestMeta};
/// use url::Url;
///
/// let url = Url::parse("https://example.com/").unwrap();
/// let meta = RequestMeta {
///     requested_url: url.clone(),
///     final_url: url.clone(),
///     root_url: url,
///     status_code: 200,
///     content_type: Some("text/html".to_string()),
///     render_timing_ms: 850,
///     dom_content_loaded_ms: Some(400),
/// };
/// let dom = RenderedDom::parse("<html><head><title>Home</title></head><body><h1>Hi</h1></body></html>");
/// let record = extract(&dom, &meta).unwrap();
/// assert_eq!(record.title.as_deref(), Some("Home"));
/// assert_eq!(record.h1_count(), 1);
/// ```
pub fn extract(dom: &RenderedDom, meta: &RequestMeta) -> Result<PageRecord, ExtractionError> {
    let final_key = url_key(&meta.final_url).unwrap_or_else(|| meta.final_url.to_string());

    let root = dom.root().ok_or_else(|| ExtractionError::EmptyDocument {
        url: final_key.clone(),
    })?;

    let visible = walk_visible_text(root);

    let mut record = PageRecord::new(final_key.clone());
    if url_key(&meta.requested_url).as_deref() != Some(final_key.as_str()) {
        record.redirected_from = Some(meta.requested_url.to_string());
    }
    record.status_code = meta.status_code;
    record.content_type = meta.content_type.clone();
    record.render_timing_ms = meta.render_timing_ms;
    record.dom_content_loaded_ms = meta.dom_content_loaded_ms;

    record.title = dom
        .first("head title")
        .or_else(|| dom.first("title"))
        .map(|node| collapse_whitespace(&node.text()));
    record.meta_description = named_meta(dom, "description");
    record.robots_meta = named_meta(dom, "robots");
    record.has_viewport = named_meta(dom, "viewport").is_some();
    record.lang = root.attr_trimmed("lang").map(String::from);

    let canonicals: Vec<NodeHandle<'_>> = dom
        .select("link[rel]")
        .into_iter()
        .filter(|node| node.has_token("rel", "canonical"))
        .collect();
    record.canonical_tag_count = canonicals.len();
    record.canonical_url = canonicals.iter().find_map(|node| {
        let href = node.attr_trimmed("href")?;
        Some(
            meta.final_url
                .join(href)
                .map(String::from)
                .unwrap_or_else(|_| href.to_string()),
        )
    });

    record.word_count = visible.word_count();
    record.content_hash = hash_text(&visible.text);
    record.headings = visible.headings;

    record.links = extract_links(dom, meta);
    record.images = extract_images(dom, &meta.final_url);
    record.social = extract_social(dom);
    record.structured_data = dom
        .select("script[type]")
        .iter()
        .filter(|node| {
            node.attr("type")
                .map_or(false, |t| t.trim().eq_ignore_ascii_case("application/ld+json"))
        })
        .map(|node| StructuredData::parse(&node.text()))
        .collect();

    Ok(record)
}

/// Parses a snapshot and extracts it in one step
pub fn extract_html(snapshot: &str, meta: &RequestMeta) -> Result<PageRecord, ExtractionError> {
    extract(&RenderedDom::parse(snapshot), meta)
}

/// `content` of the first `<meta name=...>` with the given name (case-insensitive)
fn named_meta(dom: &RenderedDom, name: &str) -> Option<String> {
    dom.select("meta[name]")
        .into_iter()
        .find(|node| node.attr("name").map_or(false, |n| n.trim().eq_ignore_ascii_case(name)))
        .map(|node| node.attr("content").unwrap_or_default().trim().to_string())
}

fn extract_links(dom: &RenderedDom, meta: &RequestMeta) -> Vec<Link> {
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for node in dom.select("a[href]") {
        let Some(href) = node.attr("href") else {
            continue;
        };
        let Some((resolved, scope)) = classify_href(href, &meta.final_url, &meta.root_url) else {
            continue;
        };

        let mut text = collapse_whitespace(&node.text());
        if text.is_empty() {
            if let Some(label) = node
                .attr_trimmed("aria-label")
                .or_else(|| node.attr_trimmed("title"))
            {
                text = label.to_string();
            }
        }

        let href = String::from(resolved);
        if !seen.insert((href.clone(), text.clone())) {
            continue;
        }

        links.push(Link {
            href,
            text,
            nofollow: node.has_token("rel", "nofollow"),
            scope,
        });
    }

    links
}

fn extract_images(dom: &RenderedDom, base: &Url) -> Vec<Image> {
    dom.select("img")
        .into_iter()
        .map(|node| {
            let src = node
                .attr_trimmed("src")
                .or_else(|| node.attr_trimmed("data-src"))
                .map(|src| {
                    base.join(src)
                        .map(String::from)
                        .unwrap_or_else(|_| src.to_string())
                })
                .unwrap_or_default();
            let alt_text = node.attr("alt").map(|alt| alt.trim().to_string());
            Image {
                src,
                has_alt: alt_text.as_deref().map_or(false, |alt| !alt.is_empty()),
                alt_text,
            }
        })
        .collect()
}

/// OpenGraph (`og:*`) and Twitter (`twitter:*`) properties; the first occurrence wins
fn extract_social(dom: &RenderedDom) -> BTreeMap<String, String> {
    let mut social = BTreeMap::new();

    for node in dom.select("meta") {
        let Some(key) = node.attr("property").or_else(|| node.attr("name")) else {
            continue;
        };
        let key = key.trim().to_ascii_lowercase();
        if !(key.starts_with("og:") || key.starts_with("twitter:")) {
            continue;
        }
        let Some(content) = node.attr_trimmed("content") else {
            continue;
        };
        social.entry(key).or_insert_with(|| content.to_string());
    }

    social
}

fn hash_text(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}
