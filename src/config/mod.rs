//! Configuration module for Seo-Lens
//!
//! This module handles loading, parsing, and validating TOML configuration files. Every section
//! has defaults, so an audit can run without any file at all.
//!
//! # Example
//!
//! ```no_run
//! use seo_lens::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("seo-lens.toml")).unwrap();
//! println!("Auditing at most {} pages", config.crawler.max_pages);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    CategoryWeights, Config, CrawlerConfig, OutputConfig, ReportFormat, SeverityPenalties,
    Thresholds,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::{validate, MAX_CONCURRENT_RENDERS};
