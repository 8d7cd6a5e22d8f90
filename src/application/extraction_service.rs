//! Product extraction workflows
//!
//! Single-URL mode assembles and saves one product. Batch mode does the same
//! for a list of URLs, logging and skipping failures, pausing a random time
//! after each saved product. Catalog mode runs the crawl first and then the
//! batch over everything it found.

#![allow(clippy::uninlined_format_args)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use scraper::Html;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::catalog_crawler::{CatalogCrawler, CrawlOutcome};
use crate::domain::{PageFetcher, ProductRecord, ProductSink};
use crate::infrastructure::config::BatchConfig;
use crate::infrastructure::error::ScraperError;
use crate::infrastructure::parsing::{ContextualParser, DetailParseContext, ProductAssembler};

/// Stage at which a product was lost
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Page could not be fetched; `status` is set when the server answered
    Transport { status: Option<u16> },
    /// Page was fetched but no record could be built from it
    Extraction,
    /// Record was built but could not be written
    Persistence,
}

impl FailureKind {
    pub fn of(error: &anyhow::Error) -> Self {
        match error.downcast_ref::<ScraperError>() {
            Some(e) if e.is_transport() => Self::Transport { status: e.status() },
            Some(ScraperError::Persistence { .. } | ScraperError::Serialization(_)) => Self::Persistence,
            _ => Self::Extraction,
        }
    }
}

/// A product URL that could not be extracted or saved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedProduct {
    pub url: String,
    pub kind: FailureKind,
    pub reason: String,
}

/// Result of a batch run; partial when interrupted
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    pub saved: Vec<PathBuf>,
    pub failed: Vec<FailedProduct>,
    pub interrupted: bool,
}

#[derive(Debug, Clone, Default)]
pub struct CatalogSummary {
    pub crawl: CrawlOutcome,
    pub batch: BatchSummary,
}

pub struct ExtractionService {
    fetcher: Arc<dyn PageFetcher>,
    assembler: Arc<ProductAssembler>,
    sink: Arc<dyn ProductSink>,
    batch: BatchConfig,
}

impl ExtractionService {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        assembler: Arc<ProductAssembler>,
        sink: Arc<dyn ProductSink>,
        batch: BatchConfig,
    ) -> Self {
        Self {
            fetcher,
            assembler,
            sink,
            batch,
        }
    }

    /// Fetch and assemble one product page
    pub async fn extract(&self, url: &str) -> Result<ProductRecord> {
        let markup = self
            .fetcher
            .fetch_page(url)
            .await
            .with_context(|| format!("Failed to fetch {}", url))?;

        // Parse in a separate scope to ensure Html is dropped before any await
        let record = {
            let context = DetailParseContext::new(url)?;
            let html = Html::parse_document(&markup);
            self.assembler.parse_with_context(&html, &context)?
        };
        debug!("Assembled {} as {}", url, record.product_code);
        Ok(record)
    }

    /// Extract and persist a single product
    pub async fn run_single(&self, url: &str) -> Result<PathBuf> {
        info!("Processing single URL: {}", url);
        let location = self.process(url).await?;
        info!("Saved to: {:?}", location);
        Ok(location)
    }

    /// Extract and persist every URL in order; failures are recorded and skipped
    pub async fn run_batch(&self, urls: &[String], cancel: &CancellationToken) -> BatchSummary {
        let mut summary = BatchSummary::default();
        let total = urls.len();

        for (index, url) in urls.iter().enumerate() {
            if cancel.is_cancelled() {
                warn!("Batch interrupted after {} of {} products", index, total);
                summary.interrupted = true;
                break;
            }

            info!("[{}/{}] Processing: {}", index + 1, total, url);
            match self.process(url).await {
                Ok(location) => {
                    info!("[{}/{}] Saved to {:?}", index + 1, total, location);
                    summary.saved.push(location);
                }
                Err(e) => {
                    let kind = FailureKind::of(&e);
                    error!("[{}/{}] Failed to process {} ({:?}): {:#}", index + 1, total, url, kind, e);
                    summary.failed.push(FailedProduct {
                        url: url.clone(),
                        kind,
                        reason: format!("{:#}", e),
                    });
                    continue;
                }
            }

            tokio::select! {
                _ = tokio::time::sleep(self.next_delay()) => {},
                _ = cancel.cancelled() => {
                    debug!("Batch delay cut short by cancellation");
                }
            }
        }

        info!(
            "Batch finished: {} saved, {} failed{}",
            summary.saved.len(),
            summary.failed.len(),
            if summary.interrupted { " (interrupted)" } else { "" }
        );
        summary
    }

    /// Crawl the catalog, then extract every product page found
    pub async fn run_catalog(&self, crawler: &CatalogCrawler, cancel: &CancellationToken) -> CatalogSummary {
        let crawl = crawler.crawl(cancel).await;
        info!("Found {} products to extract", crawl.product_urls.len());

        let batch = self.run_batch(&crawl.product_urls, cancel).await;
        CatalogSummary { crawl, batch }
    }

    async fn process(&self, url: &str) -> Result<PathBuf> {
        let record = self.extract(url).await?;
        self.sink
            .save(&record)
            .await
            .with_context(|| format!("Failed to save {}", record.product_code))
    }

    fn next_delay(&self) -> Duration {
        let (min, max) = (self.batch.min_delay_ms, self.batch.max_delay_ms);
        Duration::from_millis(if min >= max { min } else { fastrand::u64(min..=max) })
    }
}
