//! Static site resources
//!
//! This module fetches and interprets the files an audit looks for next to the pages:
//! `robots.txt`, `sitemap.xml` and `llms.txt`. Fetching sits behind the
//! [`StaticResourceFetcher`] trait so the audit can run against any source.

mod fetcher;
mod robots;
mod sitemap;

pub use fetcher::{build_http_client, HttpResourceFetcher};
pub use robots::{ParsedRobots, ANY_AGENT};
pub use sitemap::{ParsedSitemap, SitemapKind};

use async_trait::async_trait;
use serde::Serialize;
use url::Url;

/// Raw content of the static resources of a site; non-2xx responses are `None`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticResources {
    pub robots_txt: Option<String>,
    pub sitemap_xml: Option<String>,
    pub llms_txt: Option<String>,
}

/// Source of static resources
///
/// Failures are not errors here: anything that cannot be fetched is reported absent.
#[async_trait]
pub trait StaticResourceFetcher: Send + Sync {
    async fn fetch(&self, root: &Url) -> StaticResources;
}

/// Sitemap state, as reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SitemapStatus {
    #[default]
    Missing,
    Invalid,
    UrlSet,
    Index,
}

/// What the audit learned from the static resources
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResourceSummary {
    pub robots_txt: bool,
    pub robots_blocks_root: bool,
    pub sitemap: SitemapStatus,
    pub sitemap_url_count: usize,
    pub llms_txt: bool,
}

impl StaticResources {
    /// Interprets the fetched files for a site root
    pub fn summarize(&self, root: &Url) -> ResourceSummary {
        let robots = self.robots_txt.as_deref().map(ParsedRobots::from_content);
        let sitemap = self.sitemap_xml.as_deref().map(ParsedSitemap::parse);

        ResourceSummary {
            robots_txt: robots.is_some(),
            robots_blocks_root: robots
                .as_ref()
                .map_or(false, |r| r.blocks_root(root.as_str())),
            sitemap: match sitemap.as_ref().map(|s| s.kind) {
                None => SitemapStatus::Missing,
                Some(SitemapKind::Invalid) => SitemapStatus::Invalid,
                Some(SitemapKind::UrlSet) => SitemapStatus::UrlSet,
                Some(SitemapKind::Index) => SitemapStatus::Index,
            },
            sitemap_url_count: sitemap.as_ref().map_or(0, |s| s.locations.len()),
            llms_txt: self
                .llms_txt
                .as_deref()
                .map_or(false, |text| !text.trim().is_empty()),
        }
    }

    /// Page URLs listed in a `<urlset>` sitemap, resolved against the root
    pub fn sitemap_page_urls(&self, root: &Url) -> Vec<Url> {
        self.sitemap_xml
            .as_deref()
            .map(ParsedSitemap::parse)
            .map(|sitemap| {
                sitemap
                    .page_urls()
                    .iter()
                    .filter_map(|loc| root.join(loc).ok())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Fetcher that reports every resource absent
#[derive(Debug, Clone, Copy, Default)]
pub struct NoResources;

#[async_trait]
impl StaticResourceFetcher for NoResources {
    async fn fetch(&self, _root: &Url) -> StaticResources {
        StaticResources::default()
    }
}
