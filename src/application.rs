//! Application layer - catalog crawl and product extraction workflows
//!
//! Orchestrates the parsing components over the transport and persistence
//! ports. Both workflows are strictly sequential and cooperatively cancelled.

pub mod catalog_crawler;
pub mod extraction_service;

pub use catalog_crawler::{CatalogCrawler, CrawlOutcome, FrontierState};
pub use extraction_service::{BatchSummary, CatalogSummary, ExtractionService, FailedProduct, FailureKind};
