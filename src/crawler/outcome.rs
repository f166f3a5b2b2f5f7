use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// A page written to the output directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedPage {
    /// Normalized URL the page was requested under
    pub url: String,

    /// Location of the saved HTML file
    pub path: PathBuf,
}

/// Result of a crawl run
///
/// Pages complete in network arrival order, so neither `saved` nor `errors`
/// has a meaningful order; compare them as sets.
#[derive(Debug, Clone, Default)]
pub struct CrawlOutcome {
    /// Pages written to disk, in completion order
    pub saved: Vec<SavedPage>,

    /// Failed URL → error message
    pub errors: HashMap<String, String>,
}

impl CrawlOutcome {
    /// Output file paths, in completion order
    pub fn saved_paths(&self) -> impl Iterator<Item = &Path> {
        self.saved.iter().map(|page| page.path.as_path())
    }

    /// Number of pages saved
    pub fn saved_count(&self) -> usize {
        self.saved.len()
    }

    /// Number of URLs that failed
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Number of URLs whose processing has finished either way
    pub fn processed(&self) -> usize {
        self.saved.len() + self.errors.len()
    }

    /// One-line summary for logs and terminals
    pub fn summary(&self) -> String {
        format!("{} saved, {} errors", self.saved_count(), self.error_count())
    }

    pub(crate) fn record_saved(&mut self, url: String, path: PathBuf) {
        self.saved.push(SavedPage { url, path });
    }

    pub(crate) fn record_error(&mut self, url: String, message: String) {
        self.errors.insert(url, message);
    }
}
