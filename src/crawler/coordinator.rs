//! Crawler coordinator - main crawl loop
//!
//! The coordinator owns the [`Frontier`] and is the only place crawl state changes. Renders run
//! as tasks in a [`JoinSet`]; their results come back to the loop, which extracts the page,
//! decides its state and discovers its internal links.

use super::frontier::{Alias, Frontier, FrontierEntry};
use super::{CrawlStats, FailedPage};
use crate::config::CrawlerConfig;
use crate::extract::{extract_html, PageRecord, RequestMeta};
use crate::render::{PageRenderer, RenderError, RenderOptions, RenderedPage};
use crate::state::PageState;
use crate::url::{same_site, url_key};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use url::Url;

/// Reason recorded for renders cut off by the global timeout
pub const TIMEOUT_REASON: &str = "aborted by global timeout";

/// How a crawl is run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlSettings {
    /// Number of URLs that may be admitted, the seed included
    pub max_pages: usize,

    /// Renders in flight at the same time
    pub max_concurrent: usize,

    pub render_options: RenderOptions,

    /// Wait before the single retry of a transient render failure
    pub retry_backoff: Duration,

    /// Hard limit for the whole crawl
    pub global_timeout: Option<Duration>,

    /// Discover sitemap URLs after the seed's own links
    pub follow_sitemap: bool,
}

impl CrawlSettings {
    /// Settings from the `[crawler]` section; no interaction script is set
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            max_pages: config.max_pages,
            max_concurrent: config.max_concurrent_renders.max(1),
            render_options: RenderOptions {
                timeout_ms: config.timeout_ms_per_page,
                settle_ms: config.settle_ms,
                interaction_script: None,
            },
            retry_backoff: Duration::from_millis(config.retry_backoff_ms),
            global_timeout: config.global_timeout_ms.map(Duration::from_millis),
            follow_sitemap: config.follow_sitemap,
        }
    }
}

/// Everything a finished crawl produced
#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    /// Root the crawl ended up scoped to (the seed's final URL)
    pub root_url: Url,

    /// Visited pages in discovery order
    pub pages: Vec<PageRecord>,

    /// Failed pages in discovery order
    pub failures: Vec<FailedPage>,

    pub stats: CrawlStats,
}

/// Runs bounded same-site crawls with a [`PageRenderer`]
pub struct Crawler {
    renderer: Arc<dyn PageRenderer>,
    settings: CrawlSettings,
}

impl Crawler {
    pub fn new(renderer: Arc<dyn PageRenderer>, settings: CrawlSettings) -> Self {
        Self { renderer, settings }
    }

    pub fn settings(&self) -> &CrawlSettings {
        &self.settings
    }

    /// Crawls from `seed` until the frontier is exhausted or the global timeout fires
    ///
    /// The seed is rendered alone; once it is done its internal links, then `sitemap_urls`,
    /// are discovered and up to `max_concurrent` renders run at a time. `on_page` is called
    /// for every visited page, in completion order, with the crawl root.
    ///
    /// Per-page failures never end the crawl. Only an uncrawlable seed URL is an error.
    pub async fn run<F>(
        &self,
        seed: &Url,
        sitemap_urls: Vec<Url>,
        mut on_page: F,
    ) -> crate::Result<CrawlOutcome>
    where
        F: FnMut(&PageRecord, &Url),
    {
        let started = Instant::now();
        let deadline = self
            .settings
            .global_timeout
            .map(|timeout| tokio::time::Instant::now() + timeout);

        let mut run = CrawlRun {
            frontier: Frontier::new(seed, self.settings.max_pages)?,
            pages: BTreeMap::new(),
            failures: BTreeMap::new(),
            sitemap_urls: if self.settings.follow_sitemap {
                sitemap_urls
            } else {
                Vec::new()
            },
            seed_done: false,
        };

        tracing::info!(
            "Starting crawl of {} (max {} pages, {} concurrent renders)",
            seed,
            self.settings.max_pages,
            self.settings.max_concurrent
        );

        let mut tasks = JoinSet::new();
        let mut in_flight: BTreeMap<u64, FrontierEntry> = BTreeMap::new();
        let mut timed_out = false;

        loop {
            // The seed decides the crawl root, so nothing else renders before it is done
            let limit = if run.seed_done {
                self.settings.max_concurrent
            } else {
                1
            };

            while tasks.len() < limit {
                let Some(entry) = run.frontier.next() else {
                    break;
                };
                tracing::debug!("Rendering {} (#{})", entry.url, entry.seq);

                let renderer = Arc::clone(&self.renderer);
                let options = self.settings.render_options.clone();
                let backoff = self.settings.retry_backoff;
                let seq = entry.seq;
                let url = entry.url.clone();
                tasks.spawn(async move {
                    let result =
                        render_with_retry(renderer.as_ref(), &url, &options, backoff).await;
                    (seq, result)
                });
                in_flight.insert(seq, entry);
            }

            if tasks.is_empty() {
                break;
            }

            let joined = match deadline {
                Some(deadline) => {
                    tokio::select! {
                        joined = tasks.join_next() => joined,
                        _ = tokio::time::sleep_until(deadline) => {
                            timed_out = true;
                            break;
                        }
                    }
                }
                None => tasks.join_next().await,
            };

            match joined {
                Some(Ok((seq, result))) => {
                    if let Some(entry) = in_flight.remove(&seq) {
                        run.handle(entry, result, &mut on_page);
                    }
                }
                Some(Err(e)) => tracing::warn!("Render task ended abnormally: {}", e),
                None => break,
            }

            let stats = run.frontier.stats();
            let done = stats.pages_visited + stats.pages_failed;
            if done > 0 && done % 10 == 0 {
                tracing::info!(
                    "Progress: {} pages done, {} queued, {} rendering",
                    done,
                    run.frontier.queued_len(),
                    tasks.len()
                );
            }
        }

        let leftover_reason = if timed_out {
            tracing::warn!(
                "Global timeout reached after {:?}, aborting {} renders",
                started.elapsed(),
                tasks.len()
            );
            tasks.abort_all();
            run.frontier.expire();
            TIMEOUT_REASON
        } else {
            "render task did not complete"
        };
        for (_, entry) in std::mem::take(&mut in_flight) {
            run.fail(&entry, leftover_reason.to_string(), None);
        }

        let stats = run.frontier.stats();
        tracing::info!(
            "Crawl completed in {:?}: {} visited, {} skipped, {} failed",
            started.elapsed(),
            stats.pages_visited,
            stats.pages_skipped,
            stats.pages_failed
        );

        Ok(CrawlOutcome {
            root_url: run.frontier.root().clone(),
            pages: run.pages.into_values().collect(),
            failures: run.failures.into_values().collect(),
            stats,
        })
    }
}

/// Renders a URL, retrying once after `backoff` when the failure is transient
async fn render_with_retry(
    renderer: &dyn PageRenderer,
    url: &Url,
    options: &RenderOptions,
    backoff: Duration,
) -> Result<RenderedPage, RenderError> {
    match renderer.render(url, options).await {
        Err(e) if e.is_transient() => {
            tracing::warn!("{}; retrying in {:?}", e, backoff);
            tokio::time::sleep(backoff).await;
            renderer.render(url, options).await
        }
        result => result,
    }
}

/// Mutable state of one crawl
struct CrawlRun {
    frontier: Frontier,
    pages: BTreeMap<u64, PageRecord>,
    failures: BTreeMap<u64, FailedPage>,
    sitemap_urls: Vec<Url>,
    seed_done: bool,
}

impl CrawlRun {
    /// Applies one render result to the crawl
    fn handle<F>(
        &mut self,
        entry: FrontierEntry,
        result: Result<RenderedPage, RenderError>,
        on_page: &mut F,
    ) where
        F: FnMut(&PageRecord, &Url),
    {
        if entry.is_seed() {
            self.seed_done = true;
        }

        let page = match result {
            Ok(page) => page,
            Err(e) => {
                self.fail(&entry, e.to_string(), None);
                return;
            }
        };

        if page.status_code >= 400 {
            self.fail(
                &entry,
                format!("HTTP {}", page.status_code),
                Some(page.status_code),
            );
            return;
        }

        if entry.is_seed() {
            self.frontier.reroot(&page.final_url);
        }

        let final_key = url_key(&page.final_url).unwrap_or_else(|| page.final_url.to_string());
        if final_key != entry.key {
            if !same_site(&page.final_url, self.frontier.root()) {
                tracing::debug!("{} redirected off-site to {}", entry.url, page.final_url);
                self.frontier.complete(&entry.key, PageState::Skipped);
                return;
            }
            if self.frontier.check_alias(&final_key) == Alias::Duplicate {
                tracing::debug!("{} redirected to already seen {}", entry.url, final_key);
                self.frontier.complete(&entry.key, PageState::Skipped);
                return;
            }
        }

        let root = self.frontier.root().clone();
        let meta = RequestMeta {
            requested_url: entry.url.clone(),
            final_url: page.final_url,
            root_url: root.clone(),
            status_code: page.status_code,
            content_type: page.content_type,
            render_timing_ms: page.timings.total_ms,
            dom_content_loaded_ms: page.timings.dom_content_loaded_ms,
        };

        let record = match extract_html(&page.dom_snapshot, &meta) {
            Ok(record) => record,
            Err(e) => {
                self.fail(&entry, e.to_string(), None);
                return;
            }
        };

        if final_key != entry.key {
            self.frontier.claim_alias(&final_key);
        }
        self.frontier.complete(&entry.key, PageState::Visited);
        tracing::debug!(
            "Visited {} in {}ms ({} words, {} links)",
            record.url(),
            record.render_timing_ms,
            record.word_count,
            record.links.len()
        );

        for link in record.internal_links() {
            if let Ok(url) = Url::parse(&link.href) {
                self.frontier.discover(&url);
            }
        }
        if entry.is_seed() {
            for url in std::mem::take(&mut self.sitemap_urls) {
                self.frontier.discover(&url);
            }
        }

        on_page(&record, &root);
        self.pages.insert(entry.seq, record);
    }

    fn fail(&mut self, entry: &FrontierEntry, reason: String, status_code: Option<u16>) {
        tracing::warn!("Failed {}: {}", entry.url, reason);
        self.frontier.complete(&entry.key, PageState::Failed);
        self.failures.insert(
            entry.seq,
            FailedPage {
                url: entry.key.clone(),
                reason,
                status_code,
            },
        );
    }
}
