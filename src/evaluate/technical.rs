//! Technical SEO rules: head metadata, indexability, site resources

use super::{
    duplicate_groups, group_finding, EvaluationContext, Finding, RuleId, SiteContext,
};
use crate::extract::PageRecord;
use crate::resources::SitemapStatus;
use crate::url::url_key;

pub fn evaluate_page(page: &PageRecord, _ctx: &EvaluationContext<'_>) -> Vec<Finding> {
    let mut findings = Vec::new();
    let url = page.url();

    if is_blank(&page.title) {
        findings.push(Finding::new(
            RuleId::MissingTitle,
            url,
            "Page has no <title>",
        ));
    }

    if is_blank(&page.meta_description) {
        findings.push(Finding::new(
            RuleId::MissingMetaDescription,
            url,
            "Page has no meta description",
        ));
    }

    if page.canonical_url.is_none() {
        findings.push(Finding::new(
            RuleId::MissingCanonical,
            url,
            "Page declares no canonical URL",
        ));
    }

    if page.canonical_tag_count > 1 {
        findings.push(Finding::new(
            RuleId::MultipleCanonical,
            url,
            format!(
                "Page declares {} canonical tags; search engines may ignore all of them",
                page.canonical_tag_count
            ),
        ));
    }

    if let Some(robots) = &page.robots_meta {
        let directives = RobotsDirectives::parse(robots);

        if directives.noindex {
            findings.push(Finding::new(
                RuleId::Noindex,
                url,
                format!("Robots meta excludes the page from indexing: \"{}\"", robots),
            ));
        }

        if directives.is_conflicting() {
            findings.push(Finding::new(
                RuleId::ConflictingRobotsDirectives,
                url,
                format!("Robots meta has contradictory directives: \"{}\"", robots),
            ));
        }
    }

    if !page.has_viewport {
        findings.push(Finding::new(
            RuleId::MissingViewport,
            url,
            "Page has no viewport meta tag",
        ));
    }

    findings
}

pub fn evaluate_site(site: &SiteContext<'_>) -> Vec<Finding> {
    let mut findings = Vec::new();

    for (title, members) in duplicate_groups(site.pages, |p| p.title.clone()) {
        findings.push(group_finding(
            RuleId::DuplicateTitle,
            &members,
            format!("{} pages share the title \"{}\"", members.len(), title),
        ));
    }

    for (_, members) in duplicate_groups(site.pages, |p| p.meta_description.clone()) {
        findings.push(group_finding(
            RuleId::DuplicateMetaDescription,
            &members,
            format!("{} pages share the same meta description", members.len()),
        ));
    }

    findings.extend(evaluate_resources(site));
    findings
}

/// Site-wide resource rules, reported against the crawl root
fn evaluate_resources(site: &SiteContext<'_>) -> Vec<Finding> {
    let mut findings = Vec::new();
    let root = url_key(site.root_url).unwrap_or_else(|| site.root_url.to_string());
    let resources = site.resources;

    if !resources.robots_txt {
        findings.push(Finding::new(
            RuleId::MissingRobotsTxt,
            root.as_str(),
            "No robots.txt found at the site root",
        ));
    } else if resources.robots_blocks_root {
        findings.push(Finding::new(
            RuleId::RobotsTxtBlocksSite,
            root.as_str(),
            "robots.txt disallows the site root for all crawlers",
        ));
    }

    match resources.sitemap {
        SitemapStatus::Missing => findings.push(Finding::new(
            RuleId::MissingSitemap,
            root.as_str(),
            "No sitemap.xml found at the site root",
        )),
        SitemapStatus::Invalid => findings.push(Finding::new(
            RuleId::InvalidSitemap,
            root.as_str(),
            "sitemap.xml contains neither <urlset> nor <sitemapindex>",
        )),
        SitemapStatus::UrlSet | SitemapStatus::Index => {}
    }

    if !resources.llms_txt {
        findings.push(Finding::new(
            RuleId::MissingLlmsTxt,
            root.as_str(),
            "No llms.txt found at the site root",
        ));
    }

    findings
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

/// Directives of a robots meta tag
#[derive(Debug, Default, PartialEq)]
struct RobotsDirectives {
    index: bool,
    noindex: bool,
    follow: bool,
    nofollow: bool,
}

impl RobotsDirectives {
    fn parse(content: &str) -> Self {
        let mut directives = Self::default();
        for token in content
            .split(|c: char| c == ',' || c.is_whitespace())
            .map(str::trim)
            .filter(|t| !t.is_empty())
        {
            match token.to_ascii_lowercase().as_str() {
                "index" => directives.index = true,
                "noindex" => directives.noindex = true,
                "follow" => directives.follow = true,
                "nofollow" => directives.nofollow = true,
                "none" => {
                    directives.noindex = true;
                    directives.nofollow = true;
                }
                "all" => {
                    directives.index = true;
                    directives.follow = true;
                }
                _ => {}
            }
        }
        directives
    }

    fn is_conflicting(&self) -> bool {
        (self.index && self.noindex) || (self.follow && self.nofollow)
    }
}
