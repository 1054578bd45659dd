//! Audit orchestration
//!
//! An [`Auditor`] runs one audit end to end:
//! 1. Validate the category weights
//! 2. Fetch robots.txt, sitemap.xml and llms.txt once for the seed's site
//! 3. Crawl, evaluating every page as soon as it is extracted
//! 4. Run the site-wide rules over all pages
//! 5. Aggregate findings into scores and build the [`AuditResult`]

mod result;

pub use crate::crawler::CrawlStats;
pub use result::AuditResult;

use crate::config::Config;
use crate::crawler::{CrawlSettings, Crawler};
use crate::evaluate::{evaluate_page, evaluate_site, EvaluationContext, Finding, SiteContext};
use crate::render::PageRenderer;
use crate::resources::StaticResourceFetcher;
use crate::score::{aggregate, validate_weights};
use crate::url::normalize_url;
use crate::AuditError;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Runs audits with one configuration
pub struct Auditor {
    config: Config,
    renderer: Arc<dyn PageRenderer>,
    fetcher: Arc<dyn StaticResourceFetcher>,
    config_hash: Option<String>,
}

impl Auditor {
    pub fn new(
        config: Config,
        renderer: Arc<dyn PageRenderer>,
        fetcher: Arc<dyn StaticResourceFetcher>,
    ) -> Self {
        Self {
            config,
            renderer,
            fetcher,
            config_hash: None,
        }
    }

    /// Records the hash of the configuration file in the result
    pub fn with_config_hash(mut self, hash: impl Into<String>) -> Self {
        self.config_hash = Some(hash.into());
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Audits the site reachable from `seed_url`
    ///
    /// # Returns
    ///
    /// * `Ok(AuditResult)` - At least one page was audited; failures are listed in the result
    /// * `Err(AuditError::Weights)` - The category weights do not sum to 1
    /// * `Err(AuditError::CrawlAborted)` - No page could be audited
    pub async fn run(&self, seed_url: &str) -> crate::Result<AuditResult> {
        validate_weights(&self.config.weights)?;

        let seed = normalize_url(seed_url)?;
        let started_at = Utc::now();
        tracing::info!("Starting audit of {}", seed);

        let resources = self.fetcher.fetch(&seed).await;
        let sitemap_urls = resources.sitemap_page_urls(&seed);

        let mut settings = CrawlSettings::from_config(&self.config.crawler);
        settings.render_options.interaction_script = self
            .config
            .crawler
            .cookie_accept_text
            .as_deref()
            .map(cookie_accept_script);

        let thresholds = &self.config.thresholds;
        let mut page_findings: HashMap<String, Vec<Finding>> = HashMap::new();
        let crawler = Crawler::new(Arc::clone(&self.renderer), settings);
        let crawl = crawler
            .run(&seed, sitemap_urls, |record, root| {
                let ctx = EvaluationContext {
                    root_url: root,
                    thresholds,
                };
                page_findings.insert(record.url().to_string(), evaluate_page(record, &ctx));
            })
            .await;
        self.renderer.shutdown().await;
        let outcome = crawl?;

        if outcome.pages.is_empty() {
            let reason = outcome
                .failures
                .first()
                .map(|failure| failure.reason.clone())
                .unwrap_or_else(|| "no page could be rendered".to_string());
            return Err(AuditError::CrawlAborted {
                url: seed.to_string(),
                reason,
            });
        }

        // Per-page findings in crawl order, whatever order renders completed in
        let per_page: Vec<(&str, Vec<Finding>)> = outcome
            .pages
            .iter()
            .map(|page| (page.url(), page_findings.remove(page.url()).unwrap_or_default()))
            .collect();
        let mut findings: Vec<Finding> = per_page
            .iter()
            .flat_map(|(_, own)| own.iter().cloned())
            .collect();

        let resource_summary = resources.summarize(&outcome.root_url);
        findings.extend(evaluate_site(&SiteContext {
            pages: &outcome.pages,
            failures: &outcome.failures,
            resources: &resource_summary,
            root_url: &outcome.root_url,
            thresholds,
        }));

        let weights = &self.config.weights;
        let penalties = &self.config.severity_penalties;
        let card = aggregate(&findings, weights, penalties)?;

        // Site-wide findings land on the root URL but belong to no single page
        let mut page_scores = BTreeMap::new();
        for (url, own) in &per_page {
            let page_card = aggregate(own, weights, penalties)?;
            page_scores.insert(url.to_string(), page_card.site_score);
        }

        let grade = card.grade();
        tracing::info!(
            "Audit of {} finished: {}/100 ({}), {} findings over {} pages",
            outcome.root_url,
            card.site_score,
            grade,
            card.prioritized_findings.len(),
            outcome.pages.len()
        );

        Ok(AuditResult {
            seed_url: seed.to_string(),
            root_url: outcome.root_url.to_string(),
            site_score: card.site_score,
            grade,
            category_scores: card.category_scores,
            prioritized_findings: card.prioritized_findings,
            pages: outcome.pages,
            page_scores,
            crawl_stats: outcome.stats,
            failures: outcome.failures,
            resources: resource_summary,
            started_at,
            finished_at: Utc::now(),
            config_hash: self.config_hash.clone(),
        })
    }
}

/// Script clicking the first button or link whose text contains `text`, ignoring case
///
/// Returns true to the WebDriver caller when something was clicked.
pub fn cookie_accept_script(text: &str) -> String {
    let needle = serde_json::Value::String(text.trim().to_lowercase()).to_string();
    format!(
        r#"const needle = {needle};
const candidates = document.querySelectorAll(
    'button, a, [role="button"], input[type="button"], input[type="submit"]'
);
for (const el of candidates) {{
    const label = (el.innerText || el.value || el.getAttribute('aria-label') || '').toLowerCase();
    if (label.includes(needle)) {{
        el.click();
        return true;
    }}
}}
return false;"#
    )
}
