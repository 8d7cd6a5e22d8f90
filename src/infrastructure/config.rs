//! Configuration infrastructure
//!
//! Every value the extractor used to read from module-wide constants (base URL,
//! headers, delays, page budget) lives in `AppConfig` and is passed explicitly
//! to the component that needs it. The file on disk is JSON; any missing
//! section or field takes its default.

#![allow(clippy::uninlined_format_args)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{info, warn};
use url::Url;

use crate::infrastructure::parsing::{ParsingConfig, ParsingError, ParsingResult, ProductAssembler};

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub site: SiteConfig,
    pub http: HttpClientConfig,
    pub crawl: CrawlConfig,
    pub batch: BatchConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
    pub parsing: ParsingConfig,
}

/// Target catalog: where to start and which links matter
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Catalog root; product links on other hosts are ignored
    pub base_url: String,

    /// Listing pages the crawl starts from, relative to `base_url`
    pub listing_seeds: Vec<String>,

    /// Substrings of an `href` that mark a product page candidate
    pub product_path_markers: Vec<String>,

    /// Final filter applied to discovered product URLs
    pub product_url_pattern: String,

    /// Substrings of an `href` that mark a further listing page
    pub pagination_markers: Vec<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::BASE_URL.to_string(),
            listing_seeds: defaults::LISTING_SEEDS.iter().map(|s| s.to_string()).collect(),
            product_path_markers: defaults::PRODUCT_PATH_MARKERS.iter().map(|s| s.to_string()).collect(),
            product_url_pattern: defaults::PRODUCT_URL_PATTERN.to_string(),
            pagination_markers: defaults::PAGINATION_MARKERS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl SiteConfig {
    /// Seed URLs resolved against `base_url`
    pub fn seed_urls(&self) -> ParsingResult<Vec<String>> {
        let base = self.base()?;
        self.listing_seeds
            .iter()
            .map(|seed| {
                base.join(seed)
                    .map(String::from)
                    .map_err(|e| ParsingError::url_resolution_failed(seed, &e.to_string(), Some(&self.base_url)))
            })
            .collect()
    }

    pub fn product_url_regex(&self) -> ParsingResult<Regex> {
        Regex::new(&self.product_url_pattern)
            .map_err(|e| ParsingError::configuration("site.product_url_pattern", &e.to_string()))
    }

    fn base(&self) -> ParsingResult<Url> {
        let base = Url::parse(&self.base_url)
            .map_err(|e| ParsingError::url_resolution_failed(&self.base_url, &e.to_string(), None))?;
        if base.host_str().is_none() {
            return Err(ParsingError::configuration("site.base_url", "base URL has no host"));
        }
        Ok(base)
    }
}

/// Transport settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpClientConfig {
    pub user_agent: String,

    /// Per-request timeout for page fetches
    pub timeout_seconds: u64,

    /// Per-request timeout for media downloads
    pub download_timeout_seconds: u64,

    /// Attempts per request, including the first
    pub max_retries: u32,

    pub follow_redirects: bool,

    /// `name=value` cookie that marks the visitor as verified adult
    pub age_gate_cookie: String,

    /// Element that overlays the page while the age gate is active
    pub age_gate_mask_selector: String,

    /// Style fragment that means the mask is still shown
    pub age_gate_mask_visible_style: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::USER_AGENT.to_string(),
            timeout_seconds: defaults::REQUEST_TIMEOUT_SECONDS,
            download_timeout_seconds: defaults::DOWNLOAD_TIMEOUT_SECONDS,
            max_retries: defaults::RETRY_ATTEMPTS,
            follow_redirects: true,
            age_gate_cookie: defaults::AGE_GATE_COOKIE.to_string(),
            age_gate_mask_selector: "div#mask".to_string(),
            age_gate_mask_visible_style: "display: block".to_string(),
        }
    }
}

/// Catalog walk limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Listing pages visited at most per run
    pub max_pages: u32,

    /// Pause after every successfully visited listing page
    pub request_delay_ms: u64,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_pages: defaults::MAX_PAGES,
            request_delay_ms: defaults::REQUEST_DELAY_MS,
        }
    }
}

/// Product extraction pacing; each saved product is followed by a random pause in this range
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            min_delay_ms: defaults::BATCH_MIN_DELAY_MS,
            max_delay_ms: defaults::BATCH_MAX_DELAY_MS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory that receives one bundle directory per product
    pub directory: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from(defaults::OUTPUT_DIRECTORY),
        }
    }
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// Enable JSON formatted file logs
    pub json_format: bool,

    pub console_output: bool,

    pub file_output: bool,

    /// Directory for the log file; defaults to `logs/` next to the executable
    pub directory: Option<PathBuf>,

    pub file_name: String,

    /// Per-target levels applied below "trace" (e.g. "html5ever": "warn")
    pub module_filters: HashMap<String, String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
            json_format: false,
            console_output: true,
            file_output: false,
            directory: None,
            file_name: defaults::LOG_FILE_NAME.to_string(),
            module_filters: {
                let mut filters = HashMap::new();
                filters.insert("reqwest".to_string(), "info".to_string());
                filters.insert("hyper".to_string(), "warn".to_string());
                filters.insert("hyper_util".to_string(), "warn".to_string());
                filters.insert("html5ever".to_string(), "warn".to_string());
                filters.insert("selectors".to_string(), "warn".to_string());
                filters.insert("cookie_store".to_string(), "warn".to_string());
                filters
            },
        }
    }
}

impl AppConfig {
    /// Reject settings that would make a run fail later in a less obvious way
    pub fn validate(&self) -> ParsingResult<()> {
        self.site.seed_urls()?;
        self.site.product_url_regex()?;

        if self.crawl.max_pages == 0 {
            return Err(ParsingError::configuration("crawl.max_pages", "page budget must be at least 1"));
        }
        if self.batch.min_delay_ms > self.batch.max_delay_ms {
            return Err(ParsingError::configuration(
                "batch.min_delay_ms",
                "minimum delay exceeds maximum delay",
            ));
        }
        if self.http.max_retries == 0 {
            return Err(ParsingError::configuration("http.max_retries", "at least one attempt is required"));
        }
        if !self.http.age_gate_cookie.contains('=') {
            return Err(ParsingError::configuration("http.age_gate_cookie", "expected name=value"));
        }

        ProductAssembler::with_config(self.parsing.clone())?;
        Ok(())
    }
}

/// Configuration manager for loading and saving settings
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Get the application configuration directory
    pub fn get_config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get user config directory")?
            .join(defaults::APP_DIR_NAME);

        Ok(config_dir)
    }

    /// Manager for the per-user configuration file
    pub fn new() -> Result<Self> {
        Ok(Self::with_path(Self::get_config_dir()?.join(defaults::CONFIG_FILE_NAME)))
    }

    /// Manager for an explicit configuration file
    pub fn with_path(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }

    /// Load configuration from file, creating default if it doesn't exist.
    ///
    /// A file that cannot be parsed is backed up next to itself with a
    /// `.corrupted` suffix and replaced by the defaults.
    pub async fn load_config(&self) -> Result<AppConfig> {
        if !fs::try_exists(&self.config_path).await.unwrap_or(false) {
            info!("Configuration file not found, creating default: {:?}", self.config_path);
            let default_config = AppConfig::default();
            self.save_config(&default_config).await?;
            return Ok(default_config);
        }

        let content = fs::read_to_string(&self.config_path)
            .await
            .with_context(|| format!("Failed to read configuration file {:?}", self.config_path))?;

        match serde_json::from_str::<AppConfig>(&content) {
            Ok(config) => {
                info!("Loaded configuration from: {:?}", self.config_path);
                Ok(config)
            }
            Err(parse_error) => {
                warn!("Configuration file is invalid: {}", parse_error);
                warn!("Resetting to default configuration");

                let backup_path = self.config_path.with_extension("json.corrupted");
                if let Err(e) = fs::copy(&self.config_path, &backup_path).await {
                    warn!("Failed to create backup of corrupted config: {}", e);
                } else {
                    info!("Backed up corrupted config to: {:?}", backup_path);
                }

                let default_config = AppConfig::default();
                self.save_config(&default_config)
                    .await
                    .context("Failed to save default configuration")?;
                Ok(default_config)
            }
        }
    }

    /// Save configuration to file
    pub async fn save_config(&self, config: &AppConfig) -> Result<()> {
        if let Some(parent) = self.config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .context("Failed to create config directory")?;
        }

        let content = serde_json::to_string_pretty(config).context("Failed to serialize configuration")?;

        fs::write(&self.config_path, content)
            .await
            .context("Failed to write configuration file")?;

        info!("Saved configuration to: {:?}", self.config_path);
        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}

/// Default configuration values
pub mod defaults {
    pub const APP_DIR_NAME: &str = "wine-catalog-extractor";
    pub const CONFIG_FILE_NAME: &str = "config.json";

    pub const BASE_URL: &str = "https://www.tdpwines.com.br";

    /// Category entry points, relative to the base URL
    pub const LISTING_SEEDS: &[&str] = &["/pais/chile", "/pais", "/produtor/goup"];

    pub const PRODUCT_PATH_MARKERS: &[&str] = &["/vinho-", "/produto/", "/go-up", "/goup"];

    pub const PRODUCT_URL_PATTERN: &str = r"/vinho-|/go-up|/produto/";

    pub const PAGINATION_MARKERS: &[&str] = &["pg=", "page="];

    pub const USER_AGENT: &str = "Mozilla/5.0 (compatible; MettricScraper/1.0)";

    pub const REQUEST_TIMEOUT_SECONDS: u64 = 20;

    pub const DOWNLOAD_TIMEOUT_SECONDS: u64 = 30;

    pub const RETRY_ATTEMPTS: u32 = 3;

    pub const AGE_GATE_COOKIE: &str = "age_verification=yes";

    /// Default maximum listing pages visited per crawl
    pub const MAX_PAGES: u32 = 200;

    /// Default delay after each listing page in milliseconds
    pub const REQUEST_DELAY_MS: u64 = 1000;

    pub const BATCH_MIN_DELAY_MS: u64 = 1000;

    pub const BATCH_MAX_DELAY_MS: u64 = 2000;

    pub const OUTPUT_DIRECTORY: &str = "tdpwines";

    pub const LOG_LEVEL: &str = "info";

    pub const LOG_FILE_NAME: &str = "wine-catalog-extractor.log";
}
