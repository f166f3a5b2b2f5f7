//! Content-addressable disk cache for response bodies
//!
//! Blobs live directly under the cache directory, named by the hex SHA-256
//! digest of the exact request URL, with no extension. A blob is never
//! modified after it is written; since equal keys imply equal content,
//! concurrent writers of the same key are harmless.

use sha2::{Digest, Sha256};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

/// Distinguishes temporary files of concurrent writers within this process
static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Disk cache keyed by request URL digest
#[derive(Debug, Clone)]
pub struct DiskCache {
    dir: PathBuf,
}

impl DiskCache {
    /// Creates a cache rooted at `dir`; the directory is created on first write
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the cache key for a request URL
    ///
    /// # Example
    ///
    /// ```
    /// use site_harvest::crawler::DiskCache;
    ///
    /// let key = DiskCache::key("https://example.com/");
    /// assert_eq!(key.len(), 64);
    /// ```
    pub fn key(url: &str) -> String {
        hex::encode(Sha256::digest(url.as_bytes()))
    }

    /// Location of the blob for `url`
    pub fn path_for(&self, url: &str) -> PathBuf {
        self.dir.join(Self::key(url))
    }

    /// Reads a cached body; any read failure counts as a miss
    pub async fn read(&self, url: &str) -> Option<Vec<u8>> {
        tokio::fs::read(self.path_for(url)).await.ok()
    }

    /// Stores a body under the key of `url`
    ///
    /// The bytes go to a private temporary file first and are then renamed
    /// into place, so readers never see a partially written blob.
    pub async fn write(&self, url: &str, body: &[u8]) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let tmp = self.dir.join(format!(
            "{}.{}-{}.tmp",
            Self::key(url),
            std::process::id(),
            TMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));

        let stored = match tokio::fs::write(&tmp, body).await {
            Ok(()) => tokio::fs::rename(&tmp, self.path_for(url)).await,
            Err(e) => Err(e),
        };
        if stored.is_err() {
            let _ = tokio::fs::remove_file(&tmp).await;
        }

        stored
    }
}
