/// Page state definitions for tracking crawl progress
///
/// This module defines all possible states a URL can be in during a crawl run.
use serde::Serialize;
use std::fmt;

/// Represents the current state of a URL in the crawl process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageState {
    // ===== Active States =====
    /// URL has been seen on a page but not yet admitted to the queue
    Discovered,

    /// URL is admitted and waiting for a render slot
    Queued,

    /// URL is currently being rendered
    Rendering,

    // ===== Terminal States =====
    /// Page was rendered and extracted into a record
    Visited,

    /// URL was never rendered (page cap, duplicate redirect target, off-host redirect, timeout)
    Skipped,

    /// Render or extraction failed terminally
    Failed,
}

impl PageState {
    /// Returns true if this is a terminal state (no further processing needed)
    pub fn is_terminal(&self) -> bool {
        !self.is_active()
    }

    /// Returns true if this is an active state (page may still be processed)
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Discovered | Self::Queued | Self::Rendering)
    }

    /// Returns true if this represents a successful visit
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Visited)
    }

    /// Returns true if a transition from `self` to `to` is allowed
    pub fn can_transition_to(&self, to: PageState) -> bool {
        matches!(
            (self, to),
            (Self::Discovered, Self::Queued)
                | (Self::Discovered, Self::Skipped)
                | (Self::Queued, Self::Rendering)
                | (Self::Queued, Self::Skipped)
                | (Self::Queued, Self::Visited)
                | (Self::Rendering, Self::Visited)
                | (Self::Rendering, Self::Failed)
                | (Self::Rendering, Self::Skipped)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Discovered => "discovered",
            Self::Queued => "queued",
            Self::Rendering => "rendering",
            Self::Visited => "visited",
            Self::Skipped => "skipped",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
