use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Report format version written by this crate
pub const REPORT_VERSION: &str = "1";

/// Outcome of processing a single URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Ok,
    Skipped,
    Error,
}

/// Record of one URL within a step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlStatus {
    pub url: String,
    pub status: Status,

    /// Error message, present for failed URLs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Output file, present for saved pages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    pub time: DateTime<Utc>,
}

/// Aggregate result of one pipeline step (e.g. "crawl")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
    pub step: String,
    pub start_time: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,

    #[serde(default)]
    pub urls: Vec<UrlStatus>,
}

/// Top-level report document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub version: String,
    pub created_at: DateTime<Utc>,

    #[serde(default)]
    pub steps: Vec<StepResult>,
}
