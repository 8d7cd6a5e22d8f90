//! Catalog walk: from listing seeds to a sorted list of product page URLs
//!
//! The walk is a small state machine over three sets. Each step takes one
//! listing page off the frontier, marks it visited, and folds the product and
//! pagination links found on it back into the state. It stops when the
//! frontier is empty, the page budget is spent, or cancellation is requested.

#![allow(clippy::uninlined_format_args)]

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use std::time::Duration;

use regex::Regex;
use scraper::Html;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::domain::PageFetcher;
use crate::infrastructure::config::{CrawlConfig, SiteConfig};
use crate::infrastructure::parsing::{
    ContextualParser, ListingLinks, ParseContext, ParsingResult, ProductListParser,
};

/// Working set of one crawl run
#[derive(Debug, Clone, Default)]
pub struct FrontierState {
    frontier: BTreeSet<String>,
    visited: HashSet<String>,
    found: BTreeSet<String>,
}

impl FrontierState {
    pub fn new(seeds: impl IntoIterator<Item = String>) -> Self {
        Self {
            frontier: seeds.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Take the next listing page and mark it visited.
    ///
    /// Pages are taken in lexical order so a run is reproducible.
    pub fn next_url(&mut self) -> Option<String> {
        let url = self.frontier.pop_first()?;
        self.visited.insert(url.clone());
        Some(url)
    }

    /// Fold the links of a visited page into the state; returns how many pages were newly queued
    pub fn record_listing(&mut self, links: ListingLinks) -> usize {
        self.found.extend(links.product_links);

        let before = self.frontier.len();
        for page in links.pagination_links {
            if !self.visited.contains(&page) {
                self.frontier.insert(page);
            }
        }
        self.frontier.len() - before
    }

    pub fn has_pending(&self) -> bool {
        !self.frontier.is_empty()
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    pub fn pending(&self) -> impl Iterator<Item = &String> {
        self.frontier.iter()
    }

    /// Discovered product URLs matching `filter`, sorted
    pub fn product_urls(&self, filter: &Regex) -> Vec<String> {
        self.found.iter().filter(|url| filter.is_match(url)).cloned().collect()
    }
}

/// Result of a crawl run; partial when interrupted
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlOutcome {
    pub product_urls: Vec<String>,
    pub pages_visited: usize,
    pub pages_failed: usize,
    pub interrupted: bool,
}

/// Walks listing pages to discover product pages
pub struct CatalogCrawler {
    fetcher: Arc<dyn PageFetcher>,
    parser: ProductListParser,
    seeds: Vec<String>,
    product_filter: Regex,
    max_pages: usize,
    delay: Duration,
}

impl CatalogCrawler {
    pub fn new(site: &SiteConfig, crawl: &CrawlConfig, fetcher: Arc<dyn PageFetcher>) -> ParsingResult<Self> {
        Ok(Self {
            fetcher,
            parser: ProductListParser::new(site)?,
            seeds: site.seed_urls()?,
            product_filter: site.product_url_regex()?,
            max_pages: crawl.max_pages as usize,
            delay: Duration::from_millis(crawl.request_delay_ms),
        })
    }

    /// Walk the catalog.
    ///
    /// A page that fails to load or parse stays visited and the walk moves on.
    /// Every successful visit is followed by the configured pause.
    pub async fn crawl(&self, cancel: &CancellationToken) -> CrawlOutcome {
        let mut state = FrontierState::new(self.seeds.iter().cloned());
        let mut outcome = CrawlOutcome::default();

        info!("Starting catalog crawl from {} seeds (budget {} pages)", self.seeds.len(), self.max_pages);

        while state.has_pending() && state.visited_count() < self.max_pages {
            if cancel.is_cancelled() {
                warn!("Crawl interrupted; keeping products found so far");
                outcome.interrupted = true;
                break;
            }

            let Some(url) = state.next_url() else {
                break;
            };
            info!("Visiting listing page: {}", url);

            let links = match self.visit(&url).await {
                Ok(links) => links,
                Err(e) => {
                    warn!("Skipping {}: {:#}", url, e);
                    outcome.pages_failed += 1;
                    continue;
                }
            };

            let found = links.product_links.len();
            let queued = state.record_listing(links);
            debug!("{}: {} product links, {} new listing pages", url, found, queued);

            tokio::select! {
                _ = tokio::time::sleep(self.delay) => {},
                _ = cancel.cancelled() => {
                    debug!("Crawl delay cut short by cancellation");
                }
            }
        }

        outcome.pages_visited = state.visited_count();
        outcome.product_urls = state.product_urls(&self.product_filter);
        info!(
            "Crawl finished: {} pages visited, {} failed, {} product pages",
            outcome.pages_visited,
            outcome.pages_failed,
            outcome.product_urls.len()
        );
        outcome
    }

    async fn visit(&self, url: &str) -> anyhow::Result<ListingLinks> {
        let markup = self.fetcher.fetch_page(url).await?;

        // Parse in a separate scope to ensure Html is dropped before any await
        let links = {
            let context = ParseContext::new(url)?;
            let html = Html::parse_document(&markup);
            self.parser.parse_with_context(&html, &context)?
        };
        Ok(links)
    }
}
