//! Page rendering
//!
//! The crawler never talks to a browser directly: it asks a [`PageRenderer`] for the live DOM
//! of a URL. [`WebDriverRenderer`] is the production implementation.

mod webdriver;

pub use webdriver::WebDriverRenderer;

use async_trait::async_trait;
use thiserror::Error;
use url::Url;

/// Per-render settings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Upper bound for navigation plus settle wait
    pub timeout_ms: u64,
    /// Wait after load for deferred content
    pub settle_ms: u64,
    /// Script run once after load, before the settle wait (cookie banners and the like)
    pub interaction_script: Option<String>,
}

/// Browser-side timings of one render
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderTimings {
    /// Navigation start to snapshot, settle wait included
    pub total_ms: u64,
    pub dom_content_loaded_ms: Option<u64>,
    pub load_event_ms: Option<u64>,
}

/// A rendered page as the browser saw it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    /// URL after redirects
    pub final_url: Url,
    pub status_code: u16,
    pub content_type: Option<String>,
    /// Serialized live DOM
    pub dom_snapshot: String,
    pub timings: RenderTimings,
}

/// Render failures
#[derive(Debug, Clone, Error)]
pub enum RenderError {
    #[error("render of {url} timed out after {timeout_ms}ms")]
    Timeout { url: String, timeout_ms: u64 },

    #[error("network error rendering {url}: {message}")]
    Network { url: String, message: String },

    #[error("{url} is not an HTML document ({content_type})")]
    NonHtml { url: String, content_type: String },
}

impl RenderError {
    /// Whether a retry may succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Network { .. })
    }

    pub fn url(&self) -> &str {
        match self {
            Self::Timeout { url, .. } | Self::Network { url, .. } | Self::NonHtml { url, .. } => {
                url
            }
        }
    }
}

/// Something that can render a URL into a live DOM snapshot
#[async_trait]
pub trait PageRenderer: Send + Sync {
    async fn render(&self, url: &Url, options: &RenderOptions) -> Result<RenderedPage, RenderError>;

    /// Releases browser resources; called once at the end of a run
    async fn shutdown(&self) {}
}

/// Whether a content type describes an HTML document (absent means HTML)
pub fn is_html_content_type(content_type: Option<&str>) -> bool {
    match content_type {
        None => true,
        Some(ct) => {
            let mime = ct.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
            mime.is_empty() || mime == "text/html" || mime == "application/xhtml+xml"
        }
    }
}
