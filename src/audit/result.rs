use crate::crawler::{CrawlStats, FailedPage};
use crate::evaluate::{Category, Finding, Severity};
use crate::extract::PageRecord;
use crate::resources::ResourceSummary;
use crate::score::Grade;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Outcome of one audit run
///
/// Built once at the end of [`Auditor::run`](super::Auditor::run) and never modified.
#[derive(Debug, Clone, Serialize)]
pub struct AuditResult {
    /// URL the audit was started with
    pub seed_url: String,

    /// Root the crawl was scoped to, after the seed's redirects
    pub root_url: String,

    pub site_score: u8,
    pub grade: Grade,
    pub category_scores: BTreeMap<Category, u8>,

    /// Findings by decreasing severity, then decreasing category weight
    pub prioritized_findings: Vec<Finding>,

    /// Visited pages in crawl order
    pub pages: Vec<PageRecord>,

    /// Score of each page from the findings reported against it
    pub page_scores: BTreeMap<String, u8>,

    pub crawl_stats: CrawlStats,
    pub failures: Vec<FailedPage>,
    pub resources: ResourceSummary,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// SHA-256 of the configuration file, when one was used
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_hash: Option<String>,
}

impl AuditResult {
    /// Findings whose affected URL is the given page, in priority order
    pub fn findings_for<'a>(&'a self, url: &'a str) -> impl Iterator<Item = &'a Finding> + 'a {
        self.prioritized_findings
            .iter()
            .filter(move |finding| finding.affected_url == url)
    }

    pub fn count_by_severity(&self, severity: Severity) -> usize {
        self.prioritized_findings
            .iter()
            .filter(|finding| finding.severity == severity)
            .count()
    }

    /// Whether some pages could not be audited
    pub fn is_partial(&self) -> bool {
        self.crawl_stats.is_partial()
    }

    pub fn duration_seconds(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds()
    }

    /// Host of the audited site
    pub fn host(&self) -> String {
        url::Url::parse(&self.root_url)
            .ok()
            .and_then(|url| url.host_str().map(String::from))
            .unwrap_or_else(|| self.root_url.clone())
    }
}
