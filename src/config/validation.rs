use crate::config::types::{CrawlConfig, MAX_CONCURRENCY};
use crate::url::{is_http_url, normalize_url};
use crate::ConfigError;

/// Validates the entire configuration
///
/// Applies to every source of a [`CrawlConfig`]: TOML files run it on load,
/// and the CLI runs it after applying its flags.
pub fn validate(config: &CrawlConfig) -> Result<(), ConfigError> {
    validate_start_url(&config.start_url)?;
    validate_output(config)?;
    validate_limits(config)?;
    validate_retry_urls(&config.retry_urls)?;

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates the seed URL
fn validate_start_url(start_url: &str) -> Result<(), ConfigError> {
    let normalized = normalize_url(start_url).ok_or_else(|| {
        ConfigError::InvalidUrl(format!("Invalid start-url '{}'", start_url))
    })?;

    if !is_http_url(&normalized) {
        return Err(ConfigError::Validation(format!(
            "start-url '{}' must use the http or https scheme",
            start_url
        )));
    }

    Ok(())
}

/// Validates output and cache locations
fn validate_output(config: &CrawlConfig) -> Result<(), ConfigError> {
    if config.output_dir.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "output-dir cannot be empty".to_string(),
        ));
    }

    if let Some(cache_dir) = &config.cache_dir {
        if cache_dir.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "cache-dir cannot be empty when set".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates concurrency bounds
fn validate_limits(config: &CrawlConfig) -> Result<(), ConfigError> {
    if config.max_concurrency > MAX_CONCURRENCY {
        return Err(ConfigError::Validation(format!(
            "max-concurrency must be at most {}, got {}",
            MAX_CONCURRENCY, config.max_concurrency
        )));
    }

    Ok(())
}

/// Validates retry URLs; each must be absolute
fn validate_retry_urls(urls: &[String]) -> Result<(), ConfigError> {
    for url in urls {
        if normalize_url(url).is_none() {
            return Err(ConfigError::InvalidUrl(format!(
                "Invalid retry URL '{}'",
                url
            )));
        }
    }
    Ok(())
}
