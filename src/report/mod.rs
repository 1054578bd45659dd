//! Report generation
//!
//! This module turns an [`AuditResult`] into a document:
//! - Markdown for people ([`MarkdownReportWriter`])
//! - JSON for tools ([`JsonReportWriter`])

mod json;
mod markdown;

pub use json::JsonReportWriter;
pub use markdown::MarkdownReportWriter;

use crate::audit::AuditResult;
use crate::config::{OutputConfig, ReportFormat};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while producing a report
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for report operations
pub type ReportResult<T> = Result<T, ReportError>;

/// What goes into a report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportOptions {
    pub format: ReportFormat,

    /// Include the per-page overview and details
    pub include_per_page_detail: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            format: ReportFormat::Markdown,
            include_per_page_detail: true,
        }
    }
}

impl From<&OutputConfig> for ReportOptions {
    fn from(output: &OutputConfig) -> Self {
        Self {
            format: output.format,
            include_per_page_detail: output.include_per_page_detail,
        }
    }
}

/// Renders an audit result into a document
pub trait ReportWriter {
    fn write(&self, result: &AuditResult, options: &ReportOptions) -> ReportResult<String>;
}

/// The writer for a report format
pub fn writer_for(format: ReportFormat) -> Box<dyn ReportWriter> {
    match format {
        ReportFormat::Markdown => Box::new(MarkdownReportWriter),
        ReportFormat::Json => Box::new(JsonReportWriter),
    }
}

/// Renders a report and writes it to `path`
///
/// # Arguments
///
/// * `result` - The audit result
/// * `options` - Format and level of detail
/// * `path` - Destination file, created or truncated
pub fn write_report(
    result: &AuditResult,
    options: &ReportOptions,
    path: &Path,
) -> ReportResult<()> {
    let document = writer_for(options.format).write(result, options)?;

    let mut file = File::create(path)?;
    file.write_all(document.as_bytes())?;

    tracing::info!("Report written to {}", path.display());
    Ok(())
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::crawler::{CrawlStats, FailedPage};
    use crate::evaluate::{Category, Finding, RuleId};
    use crate::extract::{Heading, PageRecord};
    use crate::resources::{ResourceSummary, SitemapStatus};
    use crate::score::Grade;
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeMap;

    /// A small two-page audit
    pub fn audit_result() -> AuditResult {
        let mut home = PageRecord::new("https://acme.test/");
        home.title = Some("Acme | Home".to_string());
        home.headings = vec![Heading {
            level: 1,
            text: "Welcome".to_string(),
        }];
        home.word_count = 420;
        home.render_timing_ms = 1250;

        let mut about = PageRecord::new("https://acme.test/about");
        about.title = Some("Acme | Home".to_string());
        about.meta_description = Some("About the Acme company".to_string());
        about.word_count = 90;
        about.render_timing_ms = 800;

        let findings = vec![
            Finding::new(
                RuleId::DuplicateTitle,
                "https://acme.test/",
                "2 pages share the title \"Acme | Home\"",
            )
            .with_related(vec![
                "https://acme.test/".to_string(),
                "https://acme.test/about".to_string(),
            ]),
            Finding::new(
                RuleId::MissingCanonical,
                "https://acme.test/",
                "No canonical URL declared",
            ),
            Finding::new(
                RuleId::ThinContent,
                "https://acme.test/about",
                "Only 90 words of visible text",
            ),
        ];

        let category_scores: BTreeMap<Category, u8> = Category::ALL
            .iter()
            .map(|c| (*c, if *c == Category::Technical { 90 } else { 95 }))
            .collect();

        AuditResult {
            seed_url: "https://acme.test/".to_string(),
            root_url: "https://acme.test/".to_string(),
            site_score: 94,
            grade: Grade::A,
            category_scores,
            prioritized_findings: findings,
            pages: vec![home, about],
            page_scores: [
                ("https://acme.test/".to_string(), 98),
                ("https://acme.test/about".to_string(), 99),
            ]
            .into_iter()
            .collect(),
            crawl_stats: CrawlStats {
                pages_visited: 2,
                pages_skipped: 0,
                pages_failed: 1,
                max_pages_reached: false,
                timed_out: false,
            },
            failures: vec![FailedPage {
                url: "https://acme.test/old|page".to_string(),
                reason: "HTTP 404".to_string(),
                status_code: Some(404),
            }],
            resources: ResourceSummary {
                robots_txt: true,
                robots_blocks_root: false,
                sitemap: SitemapStatus::UrlSet,
                sitemap_url_count: 2,
                llms_txt: false,
            },
            started_at: Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap(),
            finished_at: Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 42).unwrap(),
            config_hash: Some("abc123".to_string()),
        }
    }
}
