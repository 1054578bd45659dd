//! Markdown report generation
//!
//! The report is meant for site owners: scores first, then what to fix, then the evidence.

use super::{ReportOptions, ReportResult, ReportWriter};
use crate::audit::AuditResult;
use crate::evaluate::{Category, RuleId, Severity};
use crate::extract::PageRecord;
use crate::resources::SitemapStatus;
use crate::score::Grade;
use crate::url::LinkScope;
use std::collections::HashSet;

/// Human-readable Markdown report
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownReportWriter;

impl ReportWriter for MarkdownReportWriter {
    fn write(&self, result: &AuditResult, options: &ReportOptions) -> ReportResult<String> {
        Ok(format_markdown_report(result, options))
    }
}

/// Formats an audit result as markdown
pub fn format_markdown_report(result: &AuditResult, options: &ReportOptions) -> String {
    let mut md = String::new();

    md.push_str(&format!("# SEO Report: {}\n\n", result.host()));

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Seed URL**: {}\n", result.seed_url));
    if result.root_url != result.seed_url {
        md.push_str(&format!("- **Audited Root**: {}\n", result.root_url));
    }
    md.push_str(&format!(
        "- **Started**: {}\n",
        result.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    md.push_str(&format!(
        "- **Finished**: {}\n",
        result.finished_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    md.push_str(&format!(
        "- **Duration**: {} seconds\n",
        result.duration_seconds()
    ));
    md.push_str(&format!("- **Pages Audited**: {}\n", result.pages.len()));
    md.push_str("- **Rendering**: headless browser, JavaScript executed\n");
    if let Some(hash) = &result.config_hash {
        md.push_str(&format!("- **Config Hash**: {}\n", hash));
    }
    md.push('\n');

    // Scores
    md.push_str("## Overall Score\n\n");
    md.push_str(&format!(
        "**{}/100 ({}, {})**\n\n",
        result.site_score,
        result.grade,
        result.grade.label()
    ));

    md.push_str("## Category Scores\n\n");
    md.push_str("| Category | Score | Grade |\n");
    md.push_str("|----------|-------|-------|\n");
    for category in Category::ALL {
        let score = result.category_scores.get(&category).copied().unwrap_or(100);
        md.push_str(&format!(
            "| {} | {} | {} |\n",
            category.label(),
            score,
            Grade::from_score(score)
        ));
    }
    md.push('\n');

    format_coverage(&mut md, result);
    format_resources(&mut md, result);
    format_actions(&mut md, result);
    format_findings(&mut md, result);

    if !result.failures.is_empty() {
        md.push_str("## Failed Pages\n\n");
        md.push_str("| Page | Reason |\n");
        md.push_str("|------|--------|\n");
        for failure in &result.failures {
            md.push_str(&format!(
                "| {} | {} |\n",
                escape_cell(&failure.url),
                escape_cell(&failure.reason)
            ));
        }
        md.push('\n');
    }

    if options.include_per_page_detail {
        format_page_overview(&mut md, result);
        format_page_details(&mut md, result);
    }

    md.push_str("## Notes\n\n");
    md.push_str(
        "- Pages were rendered in a browser, the way modern search engines read JavaScript sites.\n",
    );
    md.push_str("- Scores are heuristics to prioritize work. They do not guarantee rankings.\n");

    md
}

fn format_coverage(md: &mut String, result: &AuditResult) {
    let stats = &result.crawl_stats;

    md.push_str("## Crawl Coverage\n\n");
    md.push_str(&format!("- **Visited**: {}\n", stats.pages_visited));
    md.push_str(&format!("- **Skipped**: {}\n", stats.pages_skipped));
    md.push_str(&format!("- **Failed**: {}\n", stats.pages_failed));
    md.push_str(&format!(
        "- **Page Cap Reached**: {}\n",
        yes_no(stats.max_pages_reached)
    ));
    md.push_str(&format!("- **Timed Out**: {}\n\n", yes_no(stats.timed_out)));

    if result.is_partial() {
        md.push_str(
            "> This report covers part of the site: skipped and failed pages were not scored.\n\n",
        );
    }
}

fn format_resources(md: &mut String, result: &AuditResult) {
    let resources = &result.resources;

    md.push_str("## Site Resources\n\n");

    let robots = if !resources.robots_txt {
        "missing"
    } else if resources.robots_blocks_root {
        "present, but blocks the home page"
    } else {
        "present"
    };
    md.push_str(&format!(
        "- {} **robots.txt**: {}\n",
        icon(resources.robots_txt && !resources.robots_blocks_root),
        robots
    ));

    let sitemap = match resources.sitemap {
        SitemapStatus::Missing => "missing".to_string(),
        SitemapStatus::Invalid => "present, but not a valid sitemap".to_string(),
        SitemapStatus::UrlSet => format!("{} URLs listed", resources.sitemap_url_count),
        SitemapStatus::Index => format!("index of {} sitemaps", resources.sitemap_url_count),
    };
    md.push_str(&format!(
        "- {} **sitemap.xml**: {}\n",
        icon(matches!(
            resources.sitemap,
            SitemapStatus::UrlSet | SitemapStatus::Index
        )),
        sitemap
    ));

    md.push_str(&format!(
        "- {} **llms.txt**: {}\n\n",
        icon(resources.llms_txt),
        if resources.llms_txt { "present" } else { "missing" }
    ));
}

fn format_actions(md: &mut String, result: &AuditResult) {
    md.push_str("## Recommended Actions\n\n");

    let mut seen = HashSet::new();
    let actions: Vec<&str> = result
        .prioritized_findings
        .iter()
        .filter(|finding| seen.insert(finding.rule_id))
        .map(|finding| advice(finding.rule_id))
        .collect();

    if actions.is_empty() {
        md.push_str("No issues were detected by the automated checks.\n\n");
        return;
    }

    for (i, action) in actions.iter().enumerate() {
        md.push_str(&format!("{}. {}\n", i + 1, action));
    }
    md.push('\n');
}

fn format_findings(md: &mut String, result: &AuditResult) {
    md.push_str("## Findings\n\n");

    if result.prioritized_findings.is_empty() {
        md.push_str("No findings.\n\n");
        return;
    }

    md.push_str(&format!(
        "**{} findings**: {} critical, {} warning, {} info\n\n",
        result.prioritized_findings.len(),
        result.count_by_severity(Severity::Critical),
        result.count_by_severity(Severity::Warning),
        result.count_by_severity(Severity::Info)
    ));

    md.push_str("| # | Severity | Category | Rule | Page | Details |\n");
    md.push_str("|---|----------|----------|------|------|---------|\n");
    for (i, finding) in result.prioritized_findings.iter().enumerate() {
        let mut details = escape_cell(&finding.message);
        let others: Vec<&str> = finding
            .related_urls
            .iter()
            .map(String::as_str)
            .filter(|url| *url != finding.affected_url)
            .collect();
        if !others.is_empty() {
            details.push_str(&format!(" (also: {})", escape_cell(&others.join(", "))));
        }

        md.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} |\n",
            i + 1,
            finding.severity,
            finding.category,
            finding.rule_id,
            escape_cell(&finding.affected_url),
            details
        ));
    }
    md.push('\n');
}

fn format_page_overview(md: &mut String, result: &AuditResult) {
    md.push_str("## Page Overview\n\n");
    md.push_str(
        "| Page | Status | Render | Score | Title | Description | Canonical | H1 | Schema | Internal Links | Words |\n",
    );
    md.push_str("|---|---:|---:|---:|---|---|---|---:|---|---:|---:|\n");

    for page in &result.pages {
        md.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} | {} | {} | {} | {} | {} |\n",
            escape_cell(page.url()),
            page.status_code,
            seconds(page.render_timing_ms),
            page_score(result, page),
            icon(is_present(&page.title)),
            icon(is_present(&page.meta_description)),
            icon(page.canonical_url.is_some()),
            page.h1_count(),
            icon(page.structured_data.iter().any(|block| block.is_valid())),
            page.internal_links().count(),
            page.word_count
        ));
    }
    md.push('\n');
}

fn format_page_details(md: &mut String, result: &AuditResult) {
    md.push_str("## Page Details\n\n");

    for page in &result.pages {
        let score = result.page_scores.get(page.url()).copied().unwrap_or(100);
        let grade = Grade::from_score(score);

        md.push_str(&format!("### {}\n\n", page.url()));
        md.push_str(&format!(
            "- **Score**: {}/100 ({}, {})\n",
            score,
            grade,
            grade.label()
        ));
        if let Some(from) = &page.redirected_from {
            md.push_str(&format!("- **Redirected From**: {}\n", from));
        }
        md.push_str(&format!("- **Status**: {}\n", page.status_code));
        md.push_str(&format!(
            "- **Render Time**: {}\n",
            seconds(page.render_timing_ms)
        ));
        md.push_str(&format!("- **Title**: {}\n", or_dash(&page.title)));
        md.push_str(&format!(
            "- **Description**: {}\n",
            or_dash(&page.meta_description)
        ));
        md.push_str(&format!(
            "- **Canonical**: {}\n",
            or_dash(&page.canonical_url)
        ));
        md.push_str(&format!(
            "- **Lang**: {} | **Viewport**: {}\n",
            or_dash(&page.lang),
            icon(page.has_viewport)
        ));
        md.push_str(&format!(
            "- **Headings (H1/H2/H3)**: {}/{}/{}\n",
            heading_count(page, 1),
            heading_count(page, 2),
            heading_count(page, 3)
        ));
        md.push_str(&format!("- **Words**: {}\n", page.word_count));
        md.push_str(&format!(
            "- **Links**: internal={}, anchors={}, external={}, nofollow={}\n",
            link_count(page, LinkScope::Internal),
            link_count(page, LinkScope::Anchor),
            link_count(page, LinkScope::External),
            page.links.iter().filter(|link| link.nofollow).count()
        ));
        md.push_str(&format!(
            "- **Images**: {}, without ALT={}\n",
            page.images.len(),
            page.images.iter().filter(|image| !image.has_alt).count()
        ));

        let types: Vec<&str> = page
            .structured_data
            .iter()
            .flat_map(|block| block.types())
            .map(String::as_str)
            .collect();
        md.push_str(&format!(
            "- **Structured Data**: {}\n\n",
            if types.is_empty() {
                "-".to_string()
            } else {
                types.join(", ")
            }
        ));

        md.push_str("**To improve:**\n\n");
        let mut any = false;
        for finding in result.findings_for(page.url()) {
            md.push_str(&format!("- [{}] {}\n", finding.severity, finding.message));
            any = true;
        }
        if !any {
            md.push_str("- No issues found.\n");
        }
        md.push('\n');
    }
}

/// What to do about a rule, in plain words
fn advice(rule_id: RuleId) -> &'static str {
    match rule_id {
        RuleId::MissingTitle => "Give every page a unique, descriptive title.",
        RuleId::DuplicateTitle => "Make page titles unique so each page can rank for its own topic.",
        RuleId::MissingMetaDescription => {
            "Write a meta description that summarizes each page for search results."
        }
        RuleId::DuplicateMetaDescription => "Write a distinct meta description for each page.",
        RuleId::MissingCanonical => "Declare a canonical URL on every page.",
        RuleId::MultipleCanonical => "Keep a single canonical tag per page.",
        RuleId::Noindex => "Remove noindex from pages that should appear in search results.",
        RuleId::ConflictingRobotsDirectives => {
            "Remove contradictory robots directives (index with noindex, follow with nofollow)."
        }
        RuleId::MissingViewport => "Add a viewport meta tag so pages display well on mobile.",
        RuleId::MissingRobotsTxt => "Publish a robots.txt file to guide search engine crawlers.",
        RuleId::RobotsTxtBlocksSite => "Allow crawlers to reach the home page in robots.txt.",
        RuleId::MissingSitemap => "Publish a sitemap.xml listing the pages to index.",
        RuleId::InvalidSitemap => "Fix sitemap.xml so it is a valid urlset or sitemap index.",
        RuleId::MissingLlmsTxt => "Add an llms.txt file to describe the site to AI assistants.",
        RuleId::ThinContent => "Expand pages with little text into useful, complete content.",
        RuleId::MissingH1 => "Give every page one H1 heading stating its main topic.",
        RuleId::MultipleH1 => "Keep a single H1 per page and use H2/H3 for sections.",
        RuleId::HeadingLevelSkip => "Use heading levels in order without skipping levels.",
        RuleId::TitleLength => "Keep titles between 15 and 65 characters.",
        RuleId::MetaDescriptionLength => "Keep meta descriptions between 70 and 160 characters.",
        RuleId::MissingLang => "Declare the page language on the html element.",
        RuleId::MissingSocialMetadata => {
            "Add OpenGraph and Twitter tags so shared links show a proper preview."
        }
        RuleId::DuplicateContent => "Merge or rewrite pages whose text is identical.",
        RuleId::MissingStructuredData => {
            "Add Schema.org structured data (JSON-LD) describing the business and its pages."
        }
        RuleId::InvalidJsonLd => "Fix the JSON-LD blocks that cannot be parsed.",
        RuleId::MissingExpectedSchemaType => {
            "Use the Schema.org types that match each page (Organization, Article, Product)."
        }
        RuleId::BrokenInternalLink => "Fix or remove internal links to pages that return errors.",
        RuleId::OrphanPage => "Link to every important page from at least one other page.",
        RuleId::ExcessiveNofollow => "Reserve nofollow for links you do not endorse.",
        RuleId::FewInternalLinks => "Add internal links (menus, calls to action) to key pages.",
        RuleId::ImagesMissingAlt => "Give every meaningful image an ALT text.",
        RuleId::SlowRender | RuleId::VerySlowRender | RuleId::CriticalRenderTime => {
            "Reduce page load time (image sizes, scripts, server response)."
        }
    }
}

fn page_score(result: &AuditResult, page: &PageRecord) -> String {
    result
        .page_scores
        .get(page.url())
        .map_or_else(|| "-".to_string(), |score| score.to_string())
}

fn heading_count(page: &PageRecord, level: u8) -> usize {
    page.headings.iter().filter(|h| h.level == level).count()
}

fn link_count(page: &PageRecord, scope: LinkScope) -> usize {
    page.links.iter().filter(|link| link.scope == scope).count()
}

fn is_present(value: &Option<String>) -> bool {
    value.as_deref().map_or(false, |v| !v.trim().is_empty())
}

fn or_dash(value: &Option<String>) -> String {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => escape_inline(v),
        _ => "-".to_string(),
    }
}

fn seconds(ms: u64) -> String {
    format!("{:.2}s", ms as f64 / 1000.0)
}

fn icon(ok: bool) -> &'static str {
    if ok {
        "✅"
    } else {
        "❌"
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

/// Makes text safe inside a table cell
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace(&['\r', '\n'][..], " ")
}

/// Makes page text safe inside a list item
fn escape_inline(text: &str) -> String {
    text.replace(&['\r', '\n'][..], " ")
        .replace('*', "\\*")
        .replace('_', "\\_")
}
