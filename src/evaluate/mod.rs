//! Signal evaluators
//!
//! Each family turns page records into [`Finding`]s. Per-page rules look at one record at a
//! time ([`evaluate_page`]); site rules look at the whole crawl ([`evaluate_site`]). All
//! evaluators are pure: the same input always yields the same findings in the same order.
//!
//! The category and severity of every rule come from one static table ([`RuleId::category`],
//! [`RuleId::severity`]), never from the evaluator that raises it.

mod content;
mod images;
mod links;
mod performance;
mod schema;
mod technical;

use crate::config::Thresholds;
use crate::crawler::FailedPage;
use crate::extract::PageRecord;
use crate::resources::ResourceSummary;
use serde::Serialize;
use std::fmt;
use url::Url;

/// Score category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Technical,
    Content,
    Schema,
    Links,
    Performance,
}

impl Category {
    /// All categories, in report order
    pub const ALL: [Category; 5] = [
        Category::Technical,
        Category::Content,
        Category::Schema,
        Category::Links,
        Category::Performance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Technical => "technical",
            Self::Content => "content",
            Self::Schema => "schema",
            Self::Links => "links",
            Self::Performance => "performance",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Technical => "Technical SEO",
            Self::Content => "Content",
            Self::Schema => "Structured Data",
            Self::Links => "Links & Media",
            Self::Performance => "Performance",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Finding severity, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identifier of an audit rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleId {
    // technical
    MissingTitle,
    DuplicateTitle,
    MissingMetaDescription,
    DuplicateMetaDescription,
    MissingCanonical,
    MultipleCanonical,
    Noindex,
    ConflictingRobotsDirectives,
    MissingViewport,
    MissingRobotsTxt,
    RobotsTxtBlocksSite,
    MissingSitemap,
    InvalidSitemap,
    MissingLlmsTxt,
    // content
    ThinContent,
    MissingH1,
    MultipleH1,
    HeadingLevelSkip,
    TitleLength,
    MetaDescriptionLength,
    MissingLang,
    MissingSocialMetadata,
    DuplicateContent,
    // schema
    MissingStructuredData,
    InvalidJsonLd,
    MissingExpectedSchemaType,
    // links and media
    BrokenInternalLink,
    OrphanPage,
    ExcessiveNofollow,
    FewInternalLinks,
    ImagesMissingAlt,
    // performance
    SlowRender,
    VerySlowRender,
    CriticalRenderTime,
}

impl RuleId {
    /// Rule table: category and severity of each rule
    const fn classify(self) -> (Category, Severity) {
        use Category::*;
        use Severity::*;

        match self {
            Self::MissingTitle => (Technical, Critical),
            Self::DuplicateTitle => (Technical, Warning),
            Self::MissingMetaDescription => (Technical, Warning),
            Self::DuplicateMetaDescription => (Technical, Warning),
            Self::MissingCanonical => (Technical, Warning),
            Self::MultipleCanonical => (Technical, Warning),
            Self::Noindex => (Technical, Critical),
            Self::ConflictingRobotsDirectives => (Technical, Warning),
            Self::MissingViewport => (Technical, Warning),
            Self::MissingRobotsTxt => (Technical, Warning),
            Self::RobotsTxtBlocksSite => (Technical, Critical),
            Self::MissingSitemap => (Technical, Warning),
            Self::InvalidSitemap => (Technical, Warning),
            Self::MissingLlmsTxt => (Technical, Info),

            Self::ThinContent => (Content, Warning),
            Self::MissingH1 => (Content, Critical),
            Self::MultipleH1 => (Content, Warning),
            Self::HeadingLevelSkip => (Content, Info),
            Self::TitleLength => (Content, Info),
            Self::MetaDescriptionLength => (Content, Info),
            Self::MissingLang => (Content, Info),
            Self::MissingSocialMetadata => (Content, Info),
            Self::DuplicateContent => (Content, Warning),

            Self::MissingStructuredData => (Schema, Warning),
            Self::InvalidJsonLd => (Schema, Warning),
            Self::MissingExpectedSchemaType => (Schema, Info),

            Self::BrokenInternalLink => (Links, Critical),
            Self::OrphanPage => (Links, Warning),
            Self::ExcessiveNofollow => (Links, Warning),
            Self::FewInternalLinks => (Links, Info),
            Self::ImagesMissingAlt => (Links, Warning),

            Self::SlowRender => (Performance, Info),
            Self::VerySlowRender => (Performance, Warning),
            Self::CriticalRenderTime => (Performance, Critical),
        }
    }

    pub const fn category(self) -> Category {
        self.classify().0
    }

    pub const fn severity(self) -> Severity {
        self.classify().1
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingTitle => "missing-title",
            Self::DuplicateTitle => "duplicate-title",
            Self::MissingMetaDescription => "missing-meta-description",
            Self::DuplicateMetaDescription => "duplicate-meta-description",
            Self::MissingCanonical => "missing-canonical",
            Self::MultipleCanonical => "multiple-canonical",
            Self::Noindex => "noindex",
            Self::ConflictingRobotsDirectives => "conflicting-robots-directives",
            Self::MissingViewport => "missing-viewport",
            Self::MissingRobotsTxt => "missing-robots-txt",
            Self::RobotsTxtBlocksSite => "robots-txt-blocks-site",
            Self::MissingSitemap => "missing-sitemap",
            Self::InvalidSitemap => "invalid-sitemap",
            Self::MissingLlmsTxt => "missing-llms-txt",
            Self::ThinContent => "thin-content",
            Self::MissingH1 => "missing-h1",
            Self::MultipleH1 => "multiple-h1",
            Self::HeadingLevelSkip => "heading-level-skip",
            Self::TitleLength => "title-length",
            Self::MetaDescriptionLength => "meta-description-length",
            Self::MissingLang => "missing-lang",
            Self::MissingSocialMetadata => "missing-social-metadata",
            Self::DuplicateContent => "duplicate-content",
            Self::MissingStructuredData => "missing-structured-data",
            Self::InvalidJsonLd => "invalid-json-ld",
            Self::MissingExpectedSchemaType => "missing-expected-schema-type",
            Self::BrokenInternalLink => "broken-internal-link",
            Self::OrphanPage => "orphan-page",
            Self::ExcessiveNofollow => "excessive-nofollow",
            Self::FewInternalLinks => "few-internal-links",
            Self::ImagesMissingAlt => "images-missing-alt",
            Self::SlowRender => "slow-render",
            Self::VerySlowRender => "very-slow-render",
            Self::CriticalRenderTime => "critical-render-time",
        }
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One rule-level observation about a page or the site
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub category: Category,
    pub rule_id: RuleId,
    pub severity: Severity,
    pub message: String,
    pub affected_url: String,
    /// Every page a cross-page finding refers to
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub related_urls: Vec<String>,
}

impl Finding {
    /// Creates a finding; category and severity come from the rule table
    pub fn new(rule_id: RuleId, affected_url: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            category: rule_id.category(),
            rule_id,
            severity: rule_id.severity(),
            message: message.into(),
            affected_url: affected_url.into(),
            related_urls: Vec::new(),
        }
    }

    pub fn with_related(mut self, urls: Vec<String>) -> Self {
        self.related_urls = urls;
        self
    }
}

/// Inputs shared by the per-page evaluators
#[derive(Debug, Clone, Copy)]
pub struct EvaluationContext<'a> {
    pub root_url: &'a Url,
    pub thresholds: &'a Thresholds,
}

/// Everything the site-wide evaluators look at
#[derive(Debug, Clone, Copy)]
pub struct SiteContext<'a> {
    /// Visited pages, in crawl order
    pub pages: &'a [PageRecord],
    pub failures: &'a [FailedPage],
    pub resources: &'a ResourceSummary,
    pub root_url: &'a Url,
    pub thresholds: &'a Thresholds,
}

/// Runs every per-page rule family on one record
pub fn evaluate_page(page: &PageRecord, ctx: &EvaluationContext<'_>) -> Vec<Finding> {
    let mut findings = Vec::new();
    findings.extend(technical::evaluate_page(page, ctx));
    findings.extend(content::evaluate_page(page, ctx));
    findings.extend(schema::evaluate_page(page, ctx));
    findings.extend(links::evaluate_page(page, ctx));
    findings.extend(images::evaluate_page(page, ctx));
    findings.extend(performance::evaluate_page(page, ctx));
    findings
}

/// Runs the cross-page and site-wide rules
pub fn evaluate_site(site: &SiteContext<'_>) -> Vec<Finding> {
    let mut findings = Vec::new();
    findings.extend(technical::evaluate_site(site));
    findings.extend(content::evaluate_site(site));
    findings.extend(links::evaluate_site(site));
    findings
}

/// Groups pages sharing a non-blank key, in crawl order of first appearance
///
/// Only groups of two or more pages are returned.
pub(crate) fn duplicate_groups<'a, F>(
    pages: &'a [PageRecord],
    key: F,
) -> Vec<(String, Vec<&'a PageRecord>)>
where
    F: Fn(&PageRecord) -> Option<String>,
{
    let mut groups: Vec<(String, Vec<&'a PageRecord>)> = Vec::new();

    for page in pages {
        let Some(value) = key(page).filter(|v| !v.trim().is_empty()) else {
            continue;
        };
        match groups.iter_mut().find(|(existing, _)| *existing == value) {
            Some((_, members)) => members.push(page),
            None => groups.push((value, vec![page])),
        }
    }

    groups.retain(|(_, members)| members.len() > 1);
    groups
}

/// Builds the single finding reported for a group of pages
pub(crate) fn group_finding(rule_id: RuleId, members: &[&PageRecord], message: String) -> Finding {
    let related: Vec<String> = members.iter().map(|p| p.url().to_string()).collect();
    let affected = related.first().cloned().unwrap_or_default();
    Finding::new(rule_id, affected, message).with_related(related)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_table_matches_categories() {
        assert_eq!(RuleId::MissingTitle.category(), Category::Technical);
        assert_eq!(RuleId::MissingTitle.severity(), Severity::Critical);
        assert_eq!(RuleId::ImagesMissingAlt.category(), Category::Links);
        assert_eq!(RuleId::TitleLength.category(), Category::Content);
        assert_eq!(RuleId::MissingLlmsTxt.severity(), Severity::Info);
        assert_eq!(RuleId::CriticalRenderTime.severity(), Severity::Critical);
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Critical > Severity::Warning);
        assert!(Severity::Warning > Severity::Info);
    }

    #[test]
    fn test_rule_id_serializes_kebab_case() {
        assert_eq!(
            serde_json::to_string(&RuleId::InvalidJsonLd).unwrap(),
            "\"invalid-json-ld\""
        );
        assert_eq!(
            serde_json::to_string(&RuleId::MultipleH1).unwrap(),
            "\"multiple-h1\""
        );
        assert_eq!(RuleId::InvalidJsonLd.as_str(), "invalid-json-ld");
    }

    #[test]
    fn test_finding_takes_severity_from_table() {
        let finding = Finding::new(RuleId::Noindex, "https://example.com/", "noindex set");
        assert_eq!(finding.category, Category::Technical);
        assert_eq!(finding.severity, Severity::Critical);
        assert!(finding.related_urls.is_empty());
    }

    #[test]
    fn test_duplicate_groups_keep_crawl_order() {
        let mut a = PageRecord::new("https://example.com/a");
        a.title = Some("Same".to_string());
        let mut b = PageRecord::new("https://example.com/b");
        b.title = Some("Other".to_string());
        let mut c = PageRecord::new("https://example.com/c");
        c.title = Some("Same".to_string());
        let d = PageRecord::new("https://example.com/d");
        let pages = vec![a, b, c, d];

        let groups = duplicate_groups(&pages, |p| p.title.clone());
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].0, "Same");
        let urls: Vec<&str> = groups[0].1.iter().map(|p| p.url()).collect();
        assert_eq!(urls, vec!["https://example.com/a", "https://example.com/c"]);
    }
}
