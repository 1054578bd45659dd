//! Seo-Lens: a rendering SEO auditor
//!
//! This crate renders pages through a real browser, extracts on-page SEO signals from the live
//! DOM, crawls a bounded set of internal pages, and scores the site per category.

pub mod audit;
pub mod config;
pub mod crawler;
pub mod evaluate;
pub mod extract;
pub mod render;
pub mod report;
pub mod resources;
pub mod score;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Seo-Lens operations
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid weight configuration: {0}")]
    Weights(#[from] score::InvalidWeightConfiguration),

    #[error("Crawl aborted, seed page {url} could not be audited: {reason}")]
    CrawlAborted { url: String, reason: String },

    #[error("Render error: {0}")]
    Render(#[from] render::RenderError),

    #[error("Extraction error: {0}")]
    Extraction(#[from] extract::ExtractionError),

    #[error("Report error: {0}")]
    Report(#[from] report::ReportError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error(transparent)]
    Weights(#[from] score::InvalidWeightConfiguration),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Result type alias for Seo-Lens operations
pub type Result<T> = std::result::Result<T, AuditError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use audit::{AuditResult, Auditor, CrawlStats};
pub use config::Config;
pub use evaluate::{Category, Finding, RuleId, Severity};
pub use extract::{extract, PageRecord};
pub use render::{PageRenderer, RenderedPage, WebDriverRenderer};
pub use state::PageState;
pub use url::{extract_domain, normalize_url, LinkScope};
