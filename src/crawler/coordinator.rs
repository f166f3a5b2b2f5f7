//! Crawler coordinator - breadth-first dispatch loop
//!
//! This module contains the main crawl loop that ties together:
//! - Seeding the frontier (from the start URL or a retry list)
//! - Feeding the worker pool while bounding in-flight jobs
//! - Saving fetched pages to the output directory
//! - Extracting links and growing the frontier within scope
//! - Assembling the final outcome
//!
//! All frontier and outcome state lives in the dispatcher; workers only see
//! jobs and return outcomes, so none of it needs locking.

use crate::config::CrawlConfig;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::frontier::Frontier;
use crate::crawler::outcome::CrawlOutcome;
use crate::crawler::parser::discover_links;
use crate::crawler::worker::{FetchJob, FetchOutcome, WorkerPool};
use crate::url::{in_scope, is_http_url, normalize_url, url_to_filename};
use crate::HarvestError;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::instrument::WithSubscriber;
use tracing::Dispatch;

/// Breadth-first site crawler
///
/// A crawler carries its own logging handle: every event it and its workers
/// emit goes to the `Dispatch` given at construction, independent of any
/// process-wide subscriber. Several crawlers can run side by side.
pub struct Crawler {
    config: CrawlConfig,
    fetcher: Arc<Fetcher>,
    logger: Dispatch,
}

impl Crawler {
    /// Creates a new crawler
    ///
    /// # Arguments
    ///
    /// * `config` - The crawl configuration
    /// * `logger` - Destination of all tracing events of this crawler
    ///
    /// # Returns
    ///
    /// * `Ok(Crawler)` - Ready to run
    /// * `Err(HarvestError)` - The HTTP client could not be built
    pub fn new(config: CrawlConfig, logger: Dispatch) -> Result<Self, HarvestError> {
        let fetcher = Fetcher::from_config(&config)?;
        Ok(Self {
            config,
            fetcher: Arc::new(fetcher),
            logger,
        })
    }

    /// Runs the crawl to completion
    ///
    /// Per-URL failures, including those caused by `cancel`, are recorded in
    /// the outcome. Cancellation makes every remaining fetch fail fast, after
    /// which the loop drains and returns normally.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlOutcome)` - Saved pages and per-URL errors
    /// * `Err(HarvestError)` - Invalid start URL or unusable output directory
    pub async fn run(&self, cancel: CancellationToken) -> Result<CrawlOutcome, HarvestError> {
        self.crawl(cancel)
            .with_subscriber(self.logger.clone())
            .await
    }

    async fn crawl(&self, cancel: CancellationToken) -> Result<CrawlOutcome, HarvestError> {
        let seed =
            normalize_url(&self.config.start_url).ok_or_else(|| HarvestError::InvalidSeed {
                url: self.config.start_url.clone(),
            })?;

        tokio::fs::create_dir_all(&self.config.output_dir)
            .await
            .map_err(|source| HarvestError::OutputDir {
                path: self.config.output_dir.clone(),
                source,
            })?;

        let retry = self.config.is_retry();
        let mut frontier = self.seed_frontier(&seed);
        let concurrency = self.config.concurrency();

        tracing::info!(
            seed = %seed,
            queued = frontier.len(),
            retry,
            concurrency,
            max_pages = self.config.max_pages,
            "starting crawl"
        );

        let mut pool = WorkerPool::spawn(concurrency, Arc::clone(&self.fetcher), cancel);
        let mut outcome = CrawlOutcome::default();
        let mut pending = 0usize;

        loop {
            self.dispatch(&mut frontier, &mut pending, &mut outcome, &pool)
                .await;

            if pending == 0 {
                break;
            }

            let Some(fetched) = pool.next_outcome().await else {
                tracing::error!(pending, "all fetch workers stopped early");
                break;
            };
            pending -= 1;

            self.handle_outcome(fetched, &seed, retry, &mut frontier, &mut outcome)
                .await;
        }

        pool.shutdown().await;

        if !frontier.is_empty() {
            tracing::info!(
                remaining = frontier.len(),
                "page budget reached, leaving URLs unvisited"
            );
        }
        tracing::info!(
            saved = outcome.saved_count(),
            errors = outcome.error_count(),
            "crawl complete"
        );

        Ok(outcome)
    }

    /// Builds the initial frontier: the seed, or the retry list in retry mode
    fn seed_frontier(&self, seed: &str) -> Frontier {
        let mut frontier = Frontier::new();

        if !self.config.is_retry() {
            frontier.push(seed.to_string());
            return frontier;
        }

        for raw in &self.config.retry_urls {
            match normalize_url(raw) {
                Some(url) => {
                    frontier.push(url);
                }
                None => tracing::warn!(url = %raw, "skipping invalid retry URL"),
            }
        }

        frontier
    }

    /// Submits queued URLs while in-flight and budget limits allow
    async fn dispatch(
        &self,
        frontier: &mut Frontier,
        pending: &mut usize,
        outcome: &mut CrawlOutcome,
        pool: &WorkerPool,
    ) {
        while *pending < pool.capacity() && !self.budget_reached(outcome, *pending) {
            let Some(url) = frontier.pop() else {
                break;
            };

            tracing::debug!(url = %url, "dispatching");
            match pool.submit(FetchJob { url }).await {
                Ok(()) => *pending += 1,
                Err(job) => {
                    outcome.record_error(job.url, "fetch workers unavailable".to_string());
                }
            }
        }
    }

    /// Whether finished plus in-flight work has met the page budget
    fn budget_reached(&self, outcome: &CrawlOutcome, pending: usize) -> bool {
        let max_pages = self.config.max_pages;
        max_pages > 0 && outcome.processed() + pending >= max_pages
    }

    /// Records one finished job and grows the frontier from it
    async fn handle_outcome(
        &self,
        fetched: FetchOutcome,
        seed: &str,
        retry: bool,
        frontier: &mut Frontier,
        outcome: &mut CrawlOutcome,
    ) {
        let FetchOutcome { url, result } = fetched;

        let page = match result {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "fetch error");
                outcome.record_error(url, e.to_string());
                return;
            }
        };

        match save_page(&self.config.output_dir, &url, &page.body).await {
            Ok(path) => {
                tracing::info!(
                    url = %url,
                    path = %path.display(),
                    cached = page.from_cache,
                    "saved"
                );
                outcome.record_saved(url.clone(), path);
            }
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "save error");
                outcome.record_error(url.clone(), e.to_string());
            }
        }

        if retry {
            return;
        }

        let base = if page.resolved_url.is_empty() {
            url.as_str()
        } else {
            page.resolved_url.as_str()
        };

        let mut queued = 0usize;
        for link in discover_links(base, &page.body) {
            if is_http_url(&link) && in_scope(seed, &link) && frontier.push(link) {
                queued += 1;
            }
        }

        tracing::debug!(url = %url, queued, frontier = frontier.len(), "links extracted");
    }
}

/// Writes a page body under the output directory
///
/// # Returns
///
/// The full path of the written file
pub async fn save_page(output_dir: &Path, url: &str, body: &[u8]) -> std::io::Result<PathBuf> {
    let relative = url_to_filename(url).ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("cannot derive filename from URL: {}", url),
        )
    })?;

    let path = output_dir.join(relative);
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| with_path("mkdir", parent, e))?;
    }
    tokio::fs::write(&path, body)
        .await
        .map_err(|e| with_path("write", &path, e))?;

    Ok(path)
}

fn with_path(op: &str, path: &Path, e: std::io::Error) -> std::io::Error {
    std::io::Error::new(e.kind(), format!("{} {}: {}", op, path.display(), e))
}
