//! In-memory transport and persistence fakes shared by the integration tests
#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use wine_catalog_extractor::domain::{MediaDownloader, PageFetcher, ProductRecord, ProductSink};
use wine_catalog_extractor::infrastructure::ScraperError;

pub const BASE: &str = "https://www.tdpwines.com.br";

pub fn url(path: &str) -> String {
    format!("{BASE}{path}")
}

/// Serves canned pages; any other URL fails like an unreachable host
#[derive(Default)]
pub struct FakeFetcher {
    pages: HashMap<String, String>,
    requests: Mutex<Vec<String>>,
    cancel_on_fetch: Option<CancellationToken>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.pages.insert(url.into(), body.into());
        self
    }

    /// Request cancellation as soon as the first page is fetched
    pub fn cancel_on_fetch(mut self, token: CancellationToken) -> Self {
        self.cancel_on_fetch = Some(token);
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for FakeFetcher {
    async fn fetch_page(&self, url: &str) -> Result<String> {
        self.requests.lock().unwrap().push(url.to_string());
        if let Some(token) = &self.cancel_on_fetch {
            token.cancel();
        }
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| ScraperError::http_status(url, 503).into())
    }
}

/// Keeps saved records in memory
#[derive(Default)]
pub struct MemorySink {
    records: Mutex<Vec<ProductRecord>>,
}

impl MemorySink {
    pub fn records(&self) -> Vec<ProductRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProductSink for MemorySink {
    async fn save(&self, record: &ProductRecord) -> Result<PathBuf> {
        self.records.lock().unwrap().push(record.clone());
        Ok(PathBuf::from(&record.product_code))
    }
}

/// Writes a small placeholder body for every download except the failing URLs
#[derive(Default)]
pub struct RecordingDownloader {
    requests: Mutex<Vec<(String, PathBuf)>>,
    failing: Vec<String>,
}

impl RecordingDownloader {
    pub fn failing(urls: &[&str]) -> Self {
        Self {
            failing: urls.iter().map(|u| u.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn requests(&self) -> Vec<(String, PathBuf)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaDownloader for RecordingDownloader {
    async fn download(&self, url: &str, destination: &Path) -> Result<u64> {
        self.requests
            .lock()
            .unwrap()
            .push((url.to_string(), destination.to_path_buf()));
        if self.failing.iter().any(|f| f == url) {
            return Err(anyhow!("Transport error for {url}: HTTP error 404"));
        }
        tokio::fs::write(destination, b"media").await?;
        Ok(5)
    }
}
