//! Command-line interface

use std::path::PathBuf;

use clap::Parser;

use crate::infrastructure::config::AppConfig;

/// Extract wine product records from the catalog.
///
/// Without a URL the whole catalog is crawled and every product found is
/// saved. With a URL only that product page is extracted.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "wine-catalog-extractor", version, about)]
pub struct Cli {
    /// Product page to extract instead of crawling the catalog
    pub url: Option<String>,

    /// Configuration file (defaults to the per-user config directory)
    #[arg(long, env = "WINE_EXTRACTOR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory that receives the product bundles
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Maximum listing pages visited by the crawl
    #[arg(long)]
    pub max_pages: Option<u32>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long)]
    pub log_level: Option<String>,
}

impl Cli {
    /// Apply command-line overrides on top of the loaded configuration
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(dir) = &self.output_dir {
            config.output.directory = dir.clone();
        }
        if let Some(max_pages) = self.max_pages {
            config.crawl.max_pages = max_pages;
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
    }
}
