//! Transport interfaces the extraction workflow depends on
//!
//! Fetching is the only source of I/O failure during a crawl or batch run.
//! Callers treat any error as "skip this URL"; retries and timeouts are the
//! implementation's concern.

use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Final markup of `url`, after any consent or age-gate handling
    async fn fetch_page(&self, url: &str) -> Result<String>;
}

#[async_trait]
pub trait MediaDownloader: Send + Sync {
    /// Write the body of `url` to `destination`, returning the byte count
    async fn download(&self, url: &str, destination: &Path) -> Result<u64>;
}
