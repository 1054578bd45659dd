//! Crawl frontier
//!
//! This module owns every per-URL decision of a crawl:
//! - The seen-set, keyed by normalized URL, with the [`PageState`] of each URL
//! - The FIFO queue of admitted URLs, ordered by discovery
//! - The page cap (every admitted URL consumes a slot, the seed included)
//! - The registered root the crawl is scoped to
//!
//! Only the coordinator touches the frontier, so check-and-insert is never raced.

use super::CrawlStats;
use crate::state::PageState;
use crate::url::{normalize_parsed, same_site};
use crate::UrlError;
use std::collections::{HashMap, VecDeque};
use url::Url;

/// A URL admitted to the crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    /// Discovery sequence; the seed is 0
    pub seq: u64,

    /// The URL to render (normalized)
    pub url: Url,

    /// Seen-set key of the URL
    pub key: String,
}

impl FrontierEntry {
    pub fn is_seed(&self) -> bool {
        self.seq == 0
    }
}

/// Outcome of offering a discovered URL to the frontier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Admitted with the given discovery sequence
    Queued(u64),
    /// Already seen
    Duplicate,
    /// Refused because the page cap is reached
    Skipped,
    /// Not on the crawl's host
    OffHost,
    /// Not a crawlable URL
    Rejected,
}

/// Whether a redirect target may be recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alias {
    Proceed,
    Duplicate,
}

/// Breadth-first frontier with a page cap
pub struct Frontier {
    root: Url,
    max_pages: usize,
    admitted: usize,
    next_seq: u64,
    queue: VecDeque<FrontierEntry>,
    states: HashMap<String, PageState>,
    visited: usize,
    skipped: usize,
    failed: usize,
    max_pages_reached: bool,
    timed_out: bool,
}

impl Frontier {
    /// Creates a frontier holding only the seed, already `Queued`
    ///
    /// # Arguments
    ///
    /// * `seed` - The first URL of the crawl; its host is the initial root
    /// * `max_pages` - Number of URLs that may be admitted, the seed included
    pub fn new(seed: &Url, max_pages: usize) -> Result<Self, UrlError> {
        let url = normalize_parsed(seed)?;
        let key = String::from(url.clone());

        let mut frontier = Self {
            root: url.clone(),
            max_pages: max_pages.max(1),
            admitted: 1,
            next_seq: 1,
            queue: VecDeque::new(),
            states: HashMap::new(),
            visited: 0,
            skipped: 0,
            failed: 0,
            max_pages_reached: false,
            timed_out: false,
        };
        frontier.states.insert(key.clone(), PageState::Discovered);
        frontier.complete(&key, PageState::Queued);
        frontier.queue.push_back(FrontierEntry { seq: 0, url, key });

        Ok(frontier)
    }

    /// The registered root of the crawl
    pub fn root(&self) -> &Url {
        &self.root
    }

    /// Registers the seed's final URL as the crawl root
    ///
    /// A seed that redirects to another host (`example.com` to `www.example.com`) moves the
    /// whole crawl to that host.
    pub fn reroot(&mut self, final_url: &Url) {
        match normalize_parsed(final_url) {
            Ok(root) => {
                if root != self.root {
                    tracing::debug!("Crawl root moved from {} to {}", self.root, root);
                }
                self.root = root;
            }
            Err(e) => tracing::warn!("Cannot use {} as crawl root: {}", final_url, e),
        }
    }

    /// Offers a discovered URL to the frontier
    pub fn discover(&mut self, url: &Url) -> Admission {
        let Ok(url) = normalize_parsed(url) else {
            tracing::trace!("Rejected {}", url);
            return Admission::Rejected;
        };

        if !same_site(&url, &self.root) {
            tracing::trace!("Ignoring off-host {}", url);
            return Admission::OffHost;
        }

        let key = String::from(url.clone());
        if self.states.contains_key(&key) {
            return Admission::Duplicate;
        }

        self.states.insert(key.clone(), PageState::Discovered);

        if self.admitted >= self.max_pages {
            tracing::trace!("Page cap reached, skipping {}", key);
            self.complete(&key, PageState::Skipped);
            self.max_pages_reached = true;
            return Admission::Skipped;
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.admitted += 1;
        self.complete(&key, PageState::Queued);
        tracing::trace!("Queued {} (#{})", key, seq);
        self.queue.push_back(FrontierEntry { seq, url, key });

        Admission::Queued(seq)
    }

    /// Pops the oldest URL still waiting and marks it `Rendering`
    ///
    /// Entries resolved in the meantime (a redirect of another page landed on them, or the
    /// crawl was cut short) are dropped.
    pub fn next(&mut self) -> Option<FrontierEntry> {
        while let Some(entry) = self.queue.pop_front() {
            if self.states.get(&entry.key) == Some(&PageState::Queued) {
                self.states.insert(entry.key.clone(), PageState::Rendering);
                return Some(entry);
            }
            tracing::trace!("Dropping resolved entry {}", entry.key);
        }
        None
    }

    /// Whether the final URL of a redirected request may be recorded, without claiming it
    ///
    /// A target already visited or being rendered is a duplicate.
    pub fn check_alias(&self, final_key: &str) -> Alias {
        match self.states.get(final_key) {
            Some(PageState::Visited) | Some(PageState::Rendering) => Alias::Duplicate,
            _ => Alias::Proceed,
        }
    }

    /// Claims the final URL of a redirected request once its record exists
    ///
    /// An unknown target, or one still waiting in the queue, is marked visited so it is not
    /// rendered a second time.
    pub fn claim_alias(&mut self, final_key: &str) -> Alias {
        let alias = self.check_alias(final_key);
        if alias == Alias::Proceed {
            match self.states.get(final_key) {
                None | Some(PageState::Queued) => {
                    self.states.insert(final_key.to_string(), PageState::Visited);
                }
                Some(_) => {}
            }
        }
        alias
    }

    /// Moves a URL to its next state, counting terminal outcomes
    pub fn complete(&mut self, key: &str, state: PageState) {
        let Some(current) = self.states.get(key).copied() else {
            tracing::warn!("Completing unknown URL {}", key);
            return;
        };

        if !current.can_transition_to(state) {
            tracing::warn!("Ignoring transition {} -> {} for {}", current, state, key);
            return;
        }

        match state {
            PageState::Visited => self.visited += 1,
            PageState::Skipped => self.skipped += 1,
            PageState::Failed => self.failed += 1,
            _ => {}
        }
        self.states.insert(key.to_string(), state);
    }

    /// Skips every URL still waiting after the global timeout
    pub fn expire(&mut self) {
        self.timed_out = true;
        for entry in std::mem::take(&mut self.queue) {
            if self.states.get(&entry.key) == Some(&PageState::Queued) {
                self.complete(&entry.key, PageState::Skipped);
            }
        }
    }

    pub fn state(&self, key: &str) -> Option<PageState> {
        self.states.get(key).copied()
    }

    /// Number of URLs waiting for a render slot
    pub fn queued_len(&self) -> usize {
        self.queue
            .iter()
            .filter(|entry| self.states.get(&entry.key) == Some(&PageState::Queued))
            .count()
    }

    pub fn stats(&self) -> CrawlStats {
        CrawlStats {
            pages_visited: self.visited,
            pages_skipped: self.skipped,
            pages_failed: self.failed,
            max_pages_reached: self.max_pages_reached,
            timed_out: self.timed_out,
        }
    }
}
