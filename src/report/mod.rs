//! Run reports
//!
//! A report is a JSON document holding one record per processed URL for each
//! pipeline step. Crawl outcomes are written into a `crawl` step, and the
//! failed URLs of a previous report seed a retry run.
//!
//! # Example
//!
//! ```no_run
//! use site_harvest::report::Report;
//! use std::path::Path;
//!
//! let previous = Report::load(Path::new("report.json")).unwrap();
//! let retry_urls = previous.failed_urls("crawl");
//! println!("{} URLs to retry", retry_urls.len());
//! ```

mod types;

pub use types::{Report, Status, StepResult, UrlStatus, REPORT_VERSION};

use crate::crawler::CrawlOutcome;
use crate::ReportError;
use chrono::Utc;
use std::path::Path;

/// Name of the step recording crawl outcomes
pub const CRAWL_STEP: &str = "crawl";

impl Report {
    /// Creates an empty report stamped with the current time
    pub fn new() -> Self {
        Self {
            version: REPORT_VERSION.to_string(),
            created_at: Utc::now(),
            steps: Vec::new(),
        }
    }

    /// Appends a new step and returns it for in-place updates
    pub fn add_step(&mut self, name: &str) -> &mut StepResult {
        self.steps.push(StepResult {
            step: name.to_string(),
            start_time: Utc::now(),
            end_time: None,
            urls: Vec::new(),
        });
        let last = self.steps.len() - 1;
        &mut self.steps[last]
    }

    /// URLs with status `error` across all steps named `step`
    pub fn failed_urls(&self, step: &str) -> Vec<String> {
        self.steps
            .iter()
            .filter(|s| s.step == step)
            .flat_map(|s| s.urls.iter())
            .filter(|u| u.status == Status::Error)
            .map(|u| u.url.clone())
            .collect()
    }

    /// Reads a previously written report
    pub fn load(path: &Path) -> Result<Self, ReportError> {
        let data = std::fs::read(path).map_err(|source| ReportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_slice(&data)?)
    }

    /// Writes the report as pretty-printed JSON
    pub fn write(&self, path: &Path) -> Result<(), ReportError> {
        let mut data = serde_json::to_vec_pretty(self)?;
        data.push(b'\n');
        std::fs::write(path, data).map_err(|source| ReportError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl Default for Report {
    fn default() -> Self {
        Self::new()
    }
}

impl StepResult {
    /// Records the step end time
    pub fn finish(&mut self) {
        self.end_time = Some(Utc::now());
    }

    /// Adds one record per saved page and per failed URL
    ///
    /// Failures are sorted by URL so reports of the same run compare equal.
    pub fn record_crawl(&mut self, outcome: &CrawlOutcome) {
        let now = Utc::now();

        for page in &outcome.saved {
            self.urls.push(UrlStatus {
                url: page.url.clone(),
                status: Status::Ok,
                error: None,
                path: Some(page.path.display().to_string()),
                time: now,
            });
        }

        let mut errors: Vec<_> = outcome.errors.iter().collect();
        errors.sort();
        for (url, message) in errors {
            self.urls.push(UrlStatus {
                url: url.clone(),
                status: Status::Error,
                error: Some(message.clone()),
                path: None,
                time: now,
            });
        }
    }
}
