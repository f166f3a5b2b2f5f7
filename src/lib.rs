//! Site-Harvest: a breadth-first website harvester
//!
//! This crate walks a site's link graph from a seed URL, fetching pages under
//! a shared rate limit and a bounded worker pool, caching responses on disk,
//! and saving every page as an HTML file for later conversion.

pub mod config;
pub mod crawler;
pub mod report;
pub mod url;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Site-Harvest operations
///
/// Only precondition failures surface here. Failures of individual URLs are
/// recorded in [`crawler::CrawlOutcome::errors`] and never abort a crawl.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Invalid start URL: {url}")]
    InvalidSeed { url: String },

    #[error("Failed to create output directory {}: {source}", path.display())]
    OutputDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
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
}

/// Errors for a single fetch
///
/// Every variant fails only the URL it was produced for.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid request for {url}: {reason}")]
    InvalidRequest { url: String, reason: String },

    #[error("rate limiter: wait cancelled")]
    RateLimiterCancelled,

    #[error("http get {url}: {message}")]
    Transport { url: String, message: String },

    #[error("http {code}: {url}")]
    HttpStatus { code: u16, url: String },
}

/// Run report errors
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("report: {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("report: json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for Site-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::CrawlConfig;
pub use crawler::{CrawlOutcome, Crawler};
pub use crate::url::{in_scope, normalize_url};
