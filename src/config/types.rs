use serde::{Deserialize, Serialize};

/// Main configuration structure for Seo-Lens
///
/// Every section is optional; an absent section takes its defaults.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub weights: CategoryWeights,
    #[serde(default, rename = "severity-penalties")]
    pub severity_penalties: SeverityPenalties,
    #[serde(default)]
    pub thresholds: Thresholds,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Maximum number of pages admitted to the crawl (the seed included)
    pub max_pages: usize,

    /// Per-page render timeout (milliseconds)
    pub timeout_ms_per_page: u64,

    /// Wait after load for script-driven content to settle (milliseconds)
    pub settle_ms: u64,

    /// Number of pages rendered at the same time
    pub max_concurrent_renders: usize,

    /// Delay before retrying a transient render failure (milliseconds)
    pub retry_backoff_ms: u64,

    /// Queue URLs listed in sitemap.xml after the seed page
    pub follow_sitemap: bool,

    /// Text of the cookie banner button to click before extraction
    pub cookie_accept_text: Option<String>,

    /// WebDriver endpoint (chromedriver, geckodriver, selenium)
    pub webdriver_url: String,

    /// Hard limit for the whole crawl (milliseconds)
    pub global_timeout_ms: Option<u64>,

    /// User agent sent by the browser and the resource fetcher
    pub user_agent: String,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_pages: 10,
            timeout_ms_per_page: 25_000,
            settle_ms: 750,
            max_concurrent_renders: 2,
            retry_backoff_ms: 500,
            follow_sitemap: true,
            cookie_accept_text: None,
            webdriver_url: "http://localhost:4444".to_string(),
            global_timeout_ms: None,
            user_agent: "Mozilla/5.0 (compatible; SeoLens/1.0)".to_string(),
        }
    }
}

/// Per-category weights of the composite score
///
/// An absent `[weights]` section uses the defaults; inside a present section, an absent
/// category weighs 0.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct CategoryWeights {
    #[serde(default)]
    pub technical: f64,
    #[serde(default)]
    pub content: f64,
    #[serde(default)]
    pub schema: f64,
    #[serde(default)]
    pub links: f64,
    #[serde(default)]
    pub performance: f64,
}

impl Default for CategoryWeights {
    fn default() -> Self {
        Self {
            technical: 0.25,
            content: 0.30,
            schema: 0.20,
            links: 0.15,
            performance: 0.10,
        }
    }
}

/// Points subtracted from a category score per finding, by severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct SeverityPenalties {
    #[serde(default = "default_info_penalty")]
    pub info: u32,
    #[serde(default = "default_warning_penalty")]
    pub warning: u32,
    #[serde(default = "default_critical_penalty")]
    pub critical: u32,
}

fn default_info_penalty() -> u32 {
    2
}

fn default_warning_penalty() -> u32 {
    5
}

fn default_critical_penalty() -> u32 {
    10
}

impl Default for SeverityPenalties {
    fn default() -> Self {
        Self {
            info: default_info_penalty(),
            warning: default_warning_penalty(),
            critical: default_critical_penalty(),
        }
    }
}

/// Limits used by the signal evaluators
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Thresholds {
    /// Pages with fewer visible words are thin content
    pub min_words: usize,

    /// Highest tolerated share of images without ALT text (0.0 - 1.0)
    pub max_missing_alt_ratio: f64,

    /// Highest tolerated share of nofollow links (0.0 - 1.0)
    pub max_nofollow_ratio: f64,

    /// Pages with fewer internal links are flagged
    pub min_internal_links: usize,

    pub title_min_chars: usize,
    pub title_max_chars: usize,
    pub description_min_chars: usize,
    pub description_max_chars: usize,

    /// Render time bands (milliseconds)
    pub slow_render_ms: u64,
    pub very_slow_render_ms: u64,
    pub critical_render_ms: u64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_words: 250,
            max_missing_alt_ratio: 0.0,
            max_nofollow_ratio: 0.5,
            min_internal_links: 3,
            title_min_chars: 15,
            title_max_chars: 65,
            description_min_chars: 70,
            description_max_chars: 160,
            slow_render_ms: 2_000,
            very_slow_render_ms: 4_000,
            critical_render_ms: 6_000,
        }
    }
}

/// Report output format
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Markdown,
    Json,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Path to the report file
    pub report_path: String,

    /// Report format
    pub format: ReportFormat,

    /// Include the per-page breakdown in the report
    pub include_per_page_detail: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            report_path: "seo-report.md".to_string(),
            format: ReportFormat::Markdown,
            include_per_page_detail: true,
        }
    }
}
