//! Wine catalog extractor
//!
//! Discovers product pages on a wine retailer's catalog and turns each one
//! into a normalized `ProductRecord`, saved as a JSON bundle with its image
//! and technical sheet.

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::instrument::WithSubscriber;
use tracing::{error, info, warn, Dispatch};

use crate::application::{CatalogCrawler, ExtractionService};
use crate::cli::Cli;
use crate::infrastructure::{
    bootstrap_dispatch, init_logging_with_config, AppConfig, BundleStore, ConfigManager, HttpClient, ProductAssembler,
};

/// Load the configuration for `cli`, with command-line overrides applied.
///
/// Runs before logging is configured, so its messages go to stderr.
pub async fn load_config(cli: &Cli) -> Result<AppConfig> {
    load_config_with_dispatch(cli, bootstrap_dispatch(std::io::stderr)).await
}

/// Load the configuration while `dispatch` receives its log messages
pub async fn load_config_with_dispatch(cli: &Cli, dispatch: Dispatch) -> Result<AppConfig> {
    async {
        let manager = match &cli.config {
            Some(path) => ConfigManager::with_path(path),
            None => ConfigManager::new()?,
        };
        let mut config = manager.load_config().await?;
        cli.apply_overrides(&mut config);
        config.validate().context("Invalid configuration")?;
        Ok::<_, anyhow::Error>(config)
    }
    .with_subscriber(dispatch)
    .await
}

/// Run the extractor: single product when a URL is given, otherwise the full catalog
pub async fn run(cli: Cli) -> Result<ExitCode> {
    let config = load_config(&cli).await?;
    init_logging_with_config(config.logging.clone())?;

    let http = Arc::new(HttpClient::with_config(config.http.clone())?);
    let assembler = Arc::new(ProductAssembler::with_config(config.parsing.clone())?);
    let store = Arc::new(BundleStore::new(config.output.directory.clone(), http.clone()));
    let service = ExtractionService::new(http.clone(), assembler, store, config.batch.clone());

    if let Some(url) = &cli.url {
        return Ok(match service.run_single(url).await {
            Ok(_) => ExitCode::SUCCESS,
            Err(e) => {
                error!("Failed to process {}: {:#}", url, e);
                ExitCode::FAILURE
            }
        });
    }

    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, finishing current page and stopping");
            signal_token.cancel();
        }
    });

    let crawler = CatalogCrawler::new(&config.site, &config.crawl, http)?;
    let summary = service.run_catalog(&crawler, &cancel).await;

    info!(
        "Catalog run complete: {} listing pages, {} products saved, {} failed",
        summary.crawl.pages_visited,
        summary.batch.saved.len(),
        summary.batch.failed.len()
    );
    for failure in &summary.batch.failed {
        warn!("Not saved: {} ({:?}: {})", failure.url, failure.kind, failure.reason);
    }

    Ok(ExitCode::SUCCESS)
}
