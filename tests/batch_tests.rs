//! Batch and catalog extraction over in-memory transport
mod support;

use std::sync::Arc;
use std::time::Duration;

use support::{url, FakeFetcher, MemorySink};
use tokio_util::sync::CancellationToken;
use wine_catalog_extractor::application::{CatalogCrawler, ExtractionService, FailureKind};
use wine_catalog_extractor::infrastructure::config::{BatchConfig, CrawlConfig, SiteConfig};
use wine_catalog_extractor::infrastructure::ProductAssembler;

const STRUCTURED: &str = include_str!("fixtures/product_structured.html");
const HTML_ONLY: &str = include_str!("fixtures/product_html_only.html");
const LISTING_PAIS: &str = include_str!("fixtures/listing_pais.html");
const LISTING_PAIS_PG2: &str = include_str!("fixtures/listing_pais_pg2.html");
const LISTING_CHILE: &str = include_str!("fixtures/listing_chile.html");

fn no_delay() -> BatchConfig {
    BatchConfig {
        min_delay_ms: 0,
        max_delay_ms: 0,
    }
}

fn service(fetcher: Arc<FakeFetcher>, sink: Arc<MemorySink>) -> ExtractionService {
    ExtractionService::new(fetcher, Arc::new(ProductAssembler::new().unwrap()), sink, no_delay())
}

#[tokio::test]
async fn failed_product_is_skipped_and_batch_continues() {
    let fetcher = Arc::new(
        FakeFetcher::new()
            .page(url("/go-up-cabernet-sauvignon-reserva"), STRUCTURED)
            .page(url("/vinho-branco-sauvignon-blanc"), HTML_ONLY),
    );
    let sink = Arc::new(MemorySink::default());
    let urls = vec![
        url("/go-up-cabernet-sauvignon-reserva"),
        url("/vinho-esgotado"),
        url("/vinho-branco-sauvignon-blanc"),
    ];

    let summary = service(fetcher.clone(), sink.clone())
        .run_batch(&urls, &CancellationToken::new())
        .await;

    let codes: Vec<_> = sink.records().into_iter().map(|r| r.product_code).collect();
    assert_eq!(codes, ["GOUP-CS-RES-750", "vinho-branco-sauvignon-blanc"]);
    assert_eq!(summary.saved.len(), 2);
    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.failed[0].url, url("/vinho-esgotado"));
    assert_eq!(summary.failed[0].kind, FailureKind::Transport { status: Some(503) });
    assert!(!summary.interrupted);
    assert_eq!(fetcher.requests(), urls);
}

#[tokio::test]
async fn cancelled_batch_saves_nothing() {
    let fetcher = Arc::new(FakeFetcher::new().page(url("/vinho-branco-sauvignon-blanc"), HTML_ONLY));
    let sink = Arc::new(MemorySink::default());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let summary = service(fetcher.clone(), sink.clone())
        .run_batch(&[url("/vinho-branco-sauvignon-blanc")], &cancel)
        .await;

    assert!(summary.interrupted);
    assert!(summary.saved.is_empty());
    assert!(sink.records().is_empty());
    assert!(fetcher.requests().is_empty());
}

#[tokio::test]
async fn single_url_mode_saves_one_record() {
    let fetcher = Arc::new(FakeFetcher::new().page(url("/vinho-branco-sauvignon-blanc"), HTML_ONLY));
    let sink = Arc::new(MemorySink::default());

    let location = service(fetcher, sink.clone())
        .run_single(&url("/vinho-branco-sauvignon-blanc"))
        .await
        .unwrap();

    assert_eq!(location.to_str(), Some("vinho-branco-sauvignon-blanc"));
    assert_eq!(sink.records().len(), 1);
}

#[tokio::test]
async fn single_url_mode_reports_unreachable_page() {
    let sink = Arc::new(MemorySink::default());
    let result = service(Arc::new(FakeFetcher::new()), sink.clone())
        .run_single(&url("/vinho-esgotado"))
        .await;

    assert!(result.is_err());
    assert!(sink.records().is_empty());
}

#[tokio::test]
async fn catalog_run_extracts_every_discovered_product() {
    let fetcher = Arc::new(
        FakeFetcher::new()
            .page(url("/pais"), LISTING_PAIS)
            .page(url("/pais?pg=2"), LISTING_PAIS_PG2)
            .page(url("/pais/chile"), LISTING_CHILE)
            .page(url("/go-up-cabernet-sauvignon-reserva"), STRUCTURED)
            .page(url("/vinho-branco-sauvignon-blanc"), HTML_ONLY),
    );
    let sink = Arc::new(MemorySink::default());
    let crawler = CatalogCrawler::new(
        &SiteConfig::default(),
        &CrawlConfig {
            max_pages: 200,
            request_delay_ms: 0,
        },
        fetcher.clone(),
    )
    .unwrap();

    let summary = service(fetcher, sink.clone())
        .run_catalog(&crawler, &CancellationToken::new())
        .await;

    assert_eq!(summary.crawl.product_urls.len(), 4);
    assert_eq!(summary.batch.saved.len(), 2);
    assert_eq!(summary.batch.failed.len(), 2);
    let codes: Vec<_> = sink.records().into_iter().map(|r| r.product_code).collect();
    assert_eq!(codes, ["GOUP-CS-RES-750", "vinho-branco-sauvignon-blanc"]);
}

#[tokio::test(start_paused = true)]
async fn pause_follows_saved_products_only() {
    let fetcher = Arc::new(
        FakeFetcher::new()
            .page(url("/go-up-cabernet-sauvignon-reserva"), STRUCTURED)
            .page(url("/vinho-branco-sauvignon-blanc"), HTML_ONLY),
    );
    let service = ExtractionService::new(
        fetcher,
        Arc::new(ProductAssembler::new().unwrap()),
        Arc::new(MemorySink::default()),
        BatchConfig {
            min_delay_ms: 250,
            max_delay_ms: 250,
        },
    );
    let urls = vec![
        url("/go-up-cabernet-sauvignon-reserva"),
        url("/vinho-esgotado"),
        url("/vinho-branco-sauvignon-blanc"),
    ];

    let started = tokio::time::Instant::now();
    let summary = service.run_batch(&urls, &CancellationToken::new()).await;
    let elapsed = started.elapsed();

    let delay = Duration::from_millis(250);
    assert_eq!(summary.saved.len(), 2);
    assert!(elapsed >= delay * 2, "elapsed {elapsed:?}");
    assert!(elapsed < delay * 3, "elapsed {elapsed:?}");
}
