//! Seo-Lens main entry point
//!
//! This is the command-line interface for the Seo-Lens site auditor.

use anyhow::Context;
use clap::Parser;
use seo_lens::audit::Auditor;
use seo_lens::config::{load_config_with_hash, validate, Config, ReportFormat};
use seo_lens::report::{write_report, ReportOptions};
use seo_lens::resources::{build_http_client, HttpResourceFetcher};
use seo_lens::url::normalize_url;
use seo_lens::WebDriverRenderer;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Report path used when neither the config nor the command line names one
const DEFAULT_REPORT_PATH: &str = "seo-report.md";

/// Seo-Lens: a rendering SEO auditor
///
/// Seo-Lens renders pages in a real browser through a WebDriver endpoint, crawls a bounded
/// number of internal pages, and writes a scored report of what to fix.
#[derive(Parser, Debug)]
#[command(name = "seo-lens")]
#[command(version = "1.0.0")]
#[command(about = "A rendering SEO auditor", long_about = None)]
struct Cli {
    /// URL of the site to audit
    #[arg(value_name = "URL")]
    url: String,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Maximum number of pages to audit
    #[arg(long, value_name = "N")]
    max_pages: Option<usize>,

    /// Per-page render timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Report output path
    #[arg(short, long, value_name = "FILE")]
    out: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum)]
    format: Option<ReportFormat>,

    /// Text of the cookie banner button to click (e.g. "Accept")
    #[arg(long, value_name = "TEXT")]
    cookie_accept_text: Option<String>,

    /// WebDriver endpoint (chromedriver, geckodriver, selenium)
    #[arg(long, value_name = "URL")]
    webdriver_url: Option<String>,

    /// Leave the per-page breakdown out of the report
    #[arg(long)]
    no_page_detail: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate the configuration and print it without auditing
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let (mut config, config_hash) = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("cannot load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (config, Some(hash))
        }
        None => (Config::default(), None),
    };

    apply_overrides(&mut config, &cli);
    validate(&config).context("invalid configuration")?;

    let seed = normalize_url(&cli.url).with_context(|| format!("invalid URL {}", cli.url))?;

    if cli.dry_run {
        return handle_dry_run(&config, seed.as_str(), config_hash.as_deref());
    }

    handle_audit(config, seed.as_str(), config_hash).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("seo_lens=info,warn"),
            1 => EnvFilter::new("seo_lens=debug,info"),
            2 => EnvFilter::new("seo_lens=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Command-line flags take precedence over the configuration file
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(max_pages) = cli.max_pages {
        config.crawler.max_pages = max_pages;
    }
    if let Some(timeout) = cli.timeout {
        config.crawler.timeout_ms_per_page = timeout.saturating_mul(1000);
    }
    if let Some(text) = &cli.cookie_accept_text {
        config.crawler.cookie_accept_text = Some(text.clone());
    }
    if let Some(url) = &cli.webdriver_url {
        config.crawler.webdriver_url = url.clone();
    }
    if let Some(format) = cli.format {
        config.output.format = format;
        // Keep the extension in line with the format when the path was never chosen
        if format == ReportFormat::Json && config.output.report_path == DEFAULT_REPORT_PATH {
            config.output.report_path = "seo-report.json".to_string();
        }
    }
    if let Some(out) = &cli.out {
        config.output.report_path = out.display().to_string();
    }
    if cli.no_page_detail {
        config.output.include_per_page_detail = false;
    }
}

/// Handles the --dry-run mode: prints the effective configuration
fn handle_dry_run(config: &Config, seed: &str, config_hash: Option<&str>) -> anyhow::Result<()> {
    println!("=== Seo-Lens Dry Run ===\n");
    println!("Seed URL: {}", seed);
    if let Some(hash) = config_hash {
        println!("Config hash: {}", hash);
    }
    println!("\nEffective configuration:\n");
    println!(
        "{}",
        toml::to_string_pretty(config).context("cannot print configuration")?
    );

    println!("✓ Configuration is valid");
    println!(
        "✓ Would audit up to {} pages with {} concurrent renders via {}",
        config.crawler.max_pages,
        config.crawler.max_concurrent_renders,
        config.crawler.webdriver_url
    );

    Ok(())
}

/// Handles the main audit operation
async fn handle_audit(
    config: Config,
    seed: &str,
    config_hash: Option<String>,
) -> anyhow::Result<()> {
    let renderer = WebDriverRenderer::new(
        config.crawler.webdriver_url.clone(),
        config.crawler.user_agent.clone(),
        config.crawler.max_concurrent_renders,
    );
    let client = build_http_client(
        &config.crawler.user_agent,
        Duration::from_millis(config.crawler.timeout_ms_per_page),
    )
    .context("cannot build HTTP client")?;

    let options = ReportOptions::from(&config.output);
    let report_path = PathBuf::from(&config.output.report_path);

    let mut auditor = Auditor::new(
        config,
        Arc::new(renderer),
        Arc::new(HttpResourceFetcher::new(client)),
    );
    if let Some(hash) = config_hash {
        auditor = auditor.with_config_hash(hash);
    }

    let result = auditor
        .run(seed)
        .await
        .with_context(|| format!("audit of {} failed", seed))?;

    write_report(&result, &options, &report_path)
        .with_context(|| format!("cannot write report {}", report_path.display()))?;

    println!(
        "✓ {}: {}/100 ({}), report written to {}",
        result.host(),
        result.site_score,
        result.grade,
        report_path.display()
    );
    if result.is_partial() {
        println!(
            "  {} pages skipped, {} failed",
            result.crawl_stats.pages_skipped, result.crawl_stats.pages_failed
        );
    }

    Ok(())
}
