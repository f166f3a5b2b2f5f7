//! HTTP fetcher implementation
//!
//! This module handles all network retrieval for the crawler, including:
//! - Building the HTTP client with the configured user agent
//! - Serving bodies from the disk cache before touching the network
//! - A token bucket shared by every worker (one permit per delay interval)
//! - Cancellation of limiter waits and in-flight requests
//! - Error classification

use crate::config::CrawlConfig;
use crate::crawler::cache::DiskCache;
use crate::FetchError;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::{Client, StatusCode};
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Timeout applied to every request
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A successfully retrieved page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects (the request URL for cache hits)
    pub resolved_url: String,

    /// Raw response body
    pub body: Vec<u8>,

    /// Whether the body came from the disk cache
    pub from_cache: bool,
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - Value of the User-Agent header
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(user_agent: &str) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(REQUEST_TIMEOUT)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Rate-limited, optionally cached page fetcher
///
/// A single instance is shared by all workers. The limiter has a capacity of
/// one permit that refills once per `delay`, so the request rate is bounded
/// by the delay regardless of how many workers are running. A zero delay
/// disables the limiter entirely.
pub struct Fetcher {
    client: Client,
    limiter: Option<DefaultDirectRateLimiter>,
    cache: Option<DiskCache>,
}

impl Fetcher {
    /// Creates a fetcher from an existing client
    pub fn new(client: Client, delay: Duration, cache_dir: Option<PathBuf>) -> Self {
        Self {
            client,
            limiter: Quota::with_period(delay).map(RateLimiter::direct),
            cache: cache_dir.map(DiskCache::new),
        }
    }

    /// Creates a fetcher for a crawl configuration
    pub fn from_config(config: &CrawlConfig) -> Result<Self, reqwest::Error> {
        let client = build_http_client(&config.user_agent)?;
        Ok(Self::new(client, config.delay(), config.cache_dir.clone()))
    }

    /// Fetches a URL
    ///
    /// # Request Flow
    ///
    /// 1. Cache hit → return the blob (no limiter permit, no request)
    /// 2. Wait for a limiter permit, aborting if `cancel` fires
    /// 3. GET with timeout and user agent, aborting if `cancel` fires
    /// 4. Anything but 200 OK → `HttpStatus`
    /// 5. Store the body in the cache; a failed write is only logged
    ///
    /// # Arguments
    ///
    /// * `cancel` - Token aborting the limiter wait and the request
    /// * `url` - The URL to fetch
    pub async fn fetch(
        &self,
        cancel: &CancellationToken,
        url: &str,
    ) -> Result<FetchedPage, FetchError> {
        if let Some(cache) = &self.cache {
            if let Some(body) = cache.read(url).await {
                tracing::debug!(url = %url, "cache hit");
                return Ok(FetchedPage {
                    resolved_url: url.to_string(),
                    body,
                    from_cache: true,
                });
            }
        }

        let request_url = Url::parse(url).map_err(|e| FetchError::InvalidRequest {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        self.wait_for_permit(cancel).await?;

        tracing::debug!(url = %url, "fetching");
        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(transport_error(url, "request cancelled")),
            result = self.client.get(request_url).send() => {
                result.map_err(|e| transport_error(url, e))?
            }
        };

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::HttpStatus {
                code: status.as_u16(),
                url: url.to_string(),
            });
        }

        let resolved_url = response.url().to_string();
        let body = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(transport_error(url, "request cancelled")),
            result = response.bytes() => {
                result.map_err(|e| transport_error(url, format!("read body: {}", e)))?
            }
        };
        let body = body.to_vec();

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.write(url, &body).await {
                tracing::warn!(url = %url, error = %e, "cache write failed");
            }
        }

        Ok(FetchedPage {
            resolved_url,
            body,
            from_cache: false,
        })
    }

    /// Blocks until the shared limiter grants a permit
    async fn wait_for_permit(&self, cancel: &CancellationToken) -> Result<(), FetchError> {
        if cancel.is_cancelled() {
            return Err(FetchError::RateLimiterCancelled);
        }

        let Some(limiter) = &self.limiter else {
            return Ok(());
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(FetchError::RateLimiterCancelled),
            _ = limiter.until_ready() => Ok(()),
        }
    }
}

fn transport_error(url: &str, message: impl ToString) -> FetchError {
    FetchError::Transport {
        url: url.to_string(),
        message: message.to_string(),
    }
}
