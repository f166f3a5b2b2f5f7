//! Crawler module for web page fetching and processing
//!
//! This module contains the crawl engine, including:
//! - Rate-limited HTTP fetching backed by a disk cache
//! - HTML parsing and link extraction
//! - The breadth-first frontier and the worker pool it feeds
//! - Overall crawl coordination

mod cache;
mod coordinator;
mod fetcher;
mod frontier;
mod outcome;
mod parser;
mod worker;

pub use cache::DiskCache;
pub use coordinator::{save_page, Crawler};
pub use fetcher::{build_http_client, FetchedPage, Fetcher, REQUEST_TIMEOUT};
pub use frontier::Frontier;
pub use outcome::{CrawlOutcome, SavedPage};
pub use parser::{discover_links, extract_links, parse_html};
pub use worker::{FetchJob, FetchOutcome, WorkerPool};
