//! Configuration module for Site-Harvest
//!
//! This module defines the crawl input value object and handles loading,
//! parsing, and validating it from TOML files.
//!
//! # Example
//!
//! ```no_run
//! use site_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Crawler will use {} workers", config.concurrency());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    CrawlConfig, DEFAULT_CONCURRENCY, DEFAULT_DELAY_MS, DEFAULT_USER_AGENT, MAX_CONCURRENCY,
};
pub use validation::validate;

// Re-export parser functions
pub use parser::{load_config, parse_config};
