//! Crawler module for bounded same-site crawls
//!
//! This module contains the crawl logic, including:
//! - The frontier: seen-set, FIFO queue, page cap and redirect handling
//! - The coordinator: render tasks, retries, the global timeout and link following

mod coordinator;
mod frontier;

pub use coordinator::{CrawlOutcome, CrawlSettings, Crawler};
pub use frontier::{Admission, Alias, Frontier, FrontierEntry};

use serde::Serialize;

/// A page that could not be audited
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedPage {
    /// Normalized URL that was requested
    pub url: String,

    /// Human readable failure reason
    pub reason: String,

    /// HTTP status when the server answered with an error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
}

/// Counters describing how complete a crawl was
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CrawlStats {
    pub pages_visited: usize,
    pub pages_skipped: usize,
    pub pages_failed: usize,

    /// True once a discovered URL was refused because of the page cap
    pub max_pages_reached: bool,

    /// True when the global timeout cut the crawl short
    pub timed_out: bool,
}

impl CrawlStats {
    /// Whether the report covers less than the site offered
    pub fn is_partial(&self) -> bool {
        self.pages_skipped > 0 || self.pages_failed > 0 || self.timed_out
    }
}
