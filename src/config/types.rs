use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Number of workers used when the configuration leaves concurrency unset
pub const DEFAULT_CONCURRENCY: usize = 5;

/// Upper bound on the worker count
pub const MAX_CONCURRENCY: usize = 100;

/// Delay between requests used by the CLI and config files (milliseconds)
pub const DEFAULT_DELAY_MS: u64 = 1000;

/// User agent sent with every request unless overridden
pub const DEFAULT_USER_AGENT: &str = concat!("site-harvest/", env!("CARGO_PKG_VERSION"));

/// Input of a single crawl run
///
/// The value is read-only once a crawl starts. It can be built in code with
/// [`CrawlConfig::new`] or loaded from TOML:
///
/// ```toml
/// start-url = "https://example.com/docs"
/// output-dir = "html_output"
/// max-pages = 200
/// delay-ms = 500
/// max-concurrency = 4
/// cache-dir = ".harvest-cache"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CrawlConfig {
    /// Seed URL; the crawl scope is its host plus path prefix
    pub start_url: String,

    /// Directory receiving the saved HTML files
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Maximum number of pages to crawl (0 = unbounded)
    #[serde(default)]
    pub max_pages: usize,

    /// Minimum time between requests across all workers (milliseconds, 0 = unlimited)
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Number of concurrent fetch workers (0 = default)
    #[serde(default = "default_concurrency")]
    pub max_concurrency: usize,

    /// Optional disk cache for response bodies
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,

    /// URLs to refetch instead of discovering links (retry mode when non-empty)
    #[serde(default)]
    pub retry_urls: Vec<String>,

    /// User-Agent header value
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl CrawlConfig {
    /// Creates a configuration with default limits
    pub fn new(start_url: impl Into<String>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            start_url: start_url.into(),
            output_dir: output_dir.into(),
            max_pages: 0,
            delay_ms: DEFAULT_DELAY_MS,
            max_concurrency: DEFAULT_CONCURRENCY,
            cache_dir: None,
            retry_urls: Vec::new(),
            user_agent: default_user_agent(),
        }
    }

    /// Inter-request delay as a duration
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    /// Effective worker count, always within `1..=MAX_CONCURRENCY`
    pub fn concurrency(&self) -> usize {
        if self.max_concurrency == 0 {
            DEFAULT_CONCURRENCY
        } else {
            self.max_concurrency.min(MAX_CONCURRENCY)
        }
    }

    /// Whether this run refetches a fixed URL list without link discovery
    pub fn is_retry(&self) -> bool {
        !self.retry_urls.is_empty()
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("html_output")
}

fn default_delay_ms() -> u64 {
    DEFAULT_DELAY_MS
}

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}
