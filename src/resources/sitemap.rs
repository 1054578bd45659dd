//! sitemap.xml interpretation
//!
//! Only the shape of the document matters to the audit: whether it is a `<urlset>` or a
//! `<sitemapindex>`, and which `<loc>` URLs it lists.

use serde::Serialize;

/// Kind of sitemap document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SitemapKind {
    UrlSet,
    Index,
    Invalid,
}

/// A parsed sitemap document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSitemap {
    pub kind: SitemapKind,
    /// `<loc>` values in document order
    pub locations: Vec<String>,
}

impl ParsedSitemap {
    pub fn parse(xml: &str) -> Self {
        let lowered = xml.to_ascii_lowercase();
        let kind = if has_element(&lowered, "urlset") {
            SitemapKind::UrlSet
        } else if has_element(&lowered, "sitemapindex") {
            SitemapKind::Index
        } else {
            SitemapKind::Invalid
        };

        let locations = if kind == SitemapKind::Invalid {
            Vec::new()
        } else {
            locations(xml)
        };

        Self { kind, locations }
    }

    /// Page URLs listed by a `<urlset>`; an index lists other sitemaps, not pages
    pub fn page_urls(&self) -> &[String] {
        match self.kind {
            SitemapKind::UrlSet => &self.locations,
            SitemapKind::Index | SitemapKind::Invalid => &[],
        }
    }
}

/// Whether an opening tag with the given (possibly prefixed) name appears
fn has_element(lowered: &str, name: &str) -> bool {
    lowered.match_indices('<').any(|(start, _)| {
        let rest = &lowered[start + 1..];
        let tag: String = rest
            .chars()
            .take_while(|c| !c.is_whitespace() && *c != '>' && *c != '/')
            .collect();
        tag == name || (tag.contains(':') && tag.rsplit(':').next() == Some(name))
    })
}

/// Text content of every `<loc>` element
fn locations(xml: &str) -> Vec<String> {
    let mut found = Vec::new();
    let mut rest = xml;

    while let Some(open) = find_ignore_case(rest, "<loc>") {
        let after = &rest[open + "<loc>".len()..];
        let Some(close) = find_ignore_case(after, "</loc>") else {
            break;
        };
        let value = decode_entities(after[..close].trim());
        let value = value
            .trim_start_matches("<![CDATA[")
            .trim_end_matches("]]>")
            .trim()
            .to_string();
        if !value.is_empty() {
            found.push(value);
        }
        rest = &after[close + "</loc>".len()..];
    }

    found
}

fn find_ignore_case(haystack: &str, needle: &str) -> Option<usize> {
    haystack
        .as_bytes()
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle.as_bytes()))
}

fn decode_entities(value: &str) -> String {
    value
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urlset() {
        let sitemap = ParsedSitemap::parse(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url><loc>https://example.com/</loc></url>
  <url><loc> https://example.com/about?a=1&amp;b=2 </loc><lastmod>2024-01-01</lastmod></url>
</urlset>"#,
        );
        assert_eq!(sitemap.kind, SitemapKind::UrlSet);
        assert_eq!(
            sitemap.page_urls(),
            ["https://example.com/", "https://example.com/about?a=1&b=2"].map(String::from)
        );
    }

    #[test]
    fn test_sitemap_index_has_no_page_urls() {
        let sitemap = ParsedSitemap::parse(
            r#"<sitemapindex><sitemap><loc>https://example.com/posts.xml</loc></sitemap></sitemapindex>"#,
        );
        assert_eq!(sitemap.kind, SitemapKind::Index);
        assert_eq!(sitemap.locations.len(), 1);
        assert!(sitemap.page_urls().is_empty());
    }

    #[test]
    fn test_prefixed_urlset() {
        let sitemap = ParsedSitemap::parse(
            r#"<sm:urlset xmlns:sm="http://www.sitemaps.org/schemas/sitemap/0.9"><sm:url><loc>https://example.com/x</loc></sm:url></sm:urlset>"#,
        );
        assert_eq!(sitemap.kind, SitemapKind::UrlSet);
    }

    #[test]
    fn test_html_page_is_invalid() {
        let sitemap = ParsedSitemap::parse("<html><body>Not found</body></html>");
        assert_eq!(sitemap.kind, SitemapKind::Invalid);
        assert!(sitemap.locations.is_empty());
    }
}
