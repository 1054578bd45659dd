use crate::config::types::{Config, CrawlerConfig, OutputConfig, SeverityPenalties, Thresholds};
use crate::score::validate_weights;
use crate::{ConfigError, ConfigResult};
use url::Url;

/// Upper bound on concurrent browser sessions
pub const MAX_CONCURRENT_RENDERS: usize = 5;

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_crawler_config(&config.crawler)?;
    validate_weights(&config.weights)?;
    validate_penalties(&config.severity_penalties)?;
    validate_thresholds(&config.thresholds)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> ConfigResult<()> {
    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max-pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.max_concurrent_renders < 1 || config.max_concurrent_renders > MAX_CONCURRENT_RENDERS
    {
        return Err(ConfigError::Validation(format!(
            "max-concurrent-renders must be between 1 and {}, got {}",
            MAX_CONCURRENT_RENDERS, config.max_concurrent_renders
        )));
    }

    if config.timeout_ms_per_page < 1000 {
        return Err(ConfigError::Validation(format!(
            "timeout-ms-per-page must be >= 1000ms, got {}ms",
            config.timeout_ms_per_page
        )));
    }

    if config.settle_ms >= config.timeout_ms_per_page {
        return Err(ConfigError::Validation(format!(
            "settle-ms ({}ms) must be lower than timeout-ms-per-page ({}ms)",
            config.settle_ms, config.timeout_ms_per_page
        )));
    }

    if let Some(global) = config.global_timeout_ms {
        if global < config.timeout_ms_per_page {
            return Err(ConfigError::Validation(format!(
                "global-timeout-ms ({}ms) must be >= timeout-ms-per-page ({}ms)",
                global, config.timeout_ms_per_page
            )));
        }
    }

    if let Some(text) = &config.cookie_accept_text {
        if text.trim().is_empty() {
            return Err(ConfigError::Validation(
                "cookie-accept-text cannot be blank".to_string(),
            ));
        }
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    let webdriver = Url::parse(&config.webdriver_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid webdriver-url: {}", e)))?;
    if webdriver.scheme() != "http" && webdriver.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "webdriver-url must use http or https, got '{}'",
            config.webdriver_url
        )));
    }

    Ok(())
}

/// Severity penalties must grow with severity
fn validate_penalties(penalties: &SeverityPenalties) -> ConfigResult<()> {
    if penalties.info > penalties.warning || penalties.warning > penalties.critical {
        return Err(ConfigError::Validation(format!(
            "severity-penalties must satisfy info <= warning <= critical, got {}/{}/{}",
            penalties.info, penalties.warning, penalties.critical
        )));
    }

    if penalties.critical > 100 {
        return Err(ConfigError::Validation(format!(
            "severity-penalties.critical must be <= 100, got {}",
            penalties.critical
        )));
    }

    Ok(())
}

fn validate_thresholds(thresholds: &Thresholds) -> ConfigResult<()> {
    for (name, ratio) in [
        ("max-missing-alt-ratio", thresholds.max_missing_alt_ratio),
        ("max-nofollow-ratio", thresholds.max_nofollow_ratio),
    ] {
        if !(0.0..=1.0).contains(&ratio) {
            return Err(ConfigError::Validation(format!(
                "{} must be between 0.0 and 1.0, got {}",
                name, ratio
            )));
        }
    }

    if thresholds.title_min_chars > thresholds.title_max_chars {
        return Err(ConfigError::Validation(format!(
            "title-min-chars ({}) exceeds title-max-chars ({})",
            thresholds.title_min_chars, thresholds.title_max_chars
        )));
    }

    if thresholds.description_min_chars > thresholds.description_max_chars {
        return Err(ConfigError::Validation(format!(
            "description-min-chars ({}) exceeds description-max-chars ({})",
            thresholds.description_min_chars, thresholds.description_max_chars
        )));
    }

    if !(thresholds.slow_render_ms < thresholds.very_slow_render_ms
        && thresholds.very_slow_render_ms < thresholds.critical_render_ms)
    {
        return Err(ConfigError::Validation(format!(
            "render bands must be ascending, got {}/{}/{}ms",
            thresholds.slow_render_ms,
            thresholds.very_slow_render_ms,
            thresholds.critical_render_ms
        )));
    }

    Ok(())
}

fn validate_output_config(config: &OutputConfig) -> ConfigResult<()> {
    if config.report_path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "report-path cannot be empty".to_string(),
        ));
    }

    Ok(())
}
