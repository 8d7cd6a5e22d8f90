//! HTTP client for catalog pages and media downloads
//!
//! Wraps a `reqwest` client with a shared cookie jar, retry with exponential
//! backoff on transient statuses, and the catalog's age gate: the first page
//! requested from a host is fetched once to open a session, the
//! age-verification cookie is added, and the page is fetched again. Later
//! requests to that host carry the cookie and need a single GET.

#![allow(clippy::uninlined_format_args)]

use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::cookie::Jar;
use reqwest::{Client, ClientBuilder, Response, StatusCode};
use scraper::{Html, Selector};
use tokio::io::AsyncWriteExt;
use tokio::time::sleep;
use tracing::{debug, info, warn};
use url::Url;

use crate::domain::{MediaDownloader, PageFetcher};
use crate::infrastructure::config::HttpClientConfig;
use crate::infrastructure::error::{ScraperError, ScraperResult};

#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    jar: Arc<Jar>,
    config: HttpClientConfig,
    mask_selector: Selector,
    verified_hosts: Arc<Mutex<HashSet<String>>>,
}

impl HttpClient {
    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let jar = Arc::new(Jar::default());
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(&config.user_agent)
            .cookie_provider(Arc::clone(&jar))
            .gzip(true)
            .brotli(true)
            .redirect(if config.follow_redirects {
                reqwest::redirect::Policy::limited(10)
            } else {
                reqwest::redirect::Policy::none()
            })
            .build()
            .map_err(|e| anyhow!("Failed to create HTTP client: {}", e))?;

        let mask_selector = Selector::parse(&config.age_gate_mask_selector)
            .map_err(|e| anyhow!("Invalid age gate selector '{}': {}", config.age_gate_mask_selector, e))?;

        Ok(Self {
            client,
            jar,
            config,
            mask_selector,
            verified_hosts: Arc::new(Mutex::new(HashSet::new())),
        })
    }

    /// Fetch page markup, passing the age gate on first contact with a host
    pub async fn fetch_html_string(&self, url: &str) -> ScraperResult<String> {
        let parsed = Url::parse(url).map_err(|e| ScraperError::transport(url, format!("invalid URL: {}", e)))?;
        let host = parsed.host_str().unwrap_or_default().to_string();

        let mut body = self.fetch_text(url).await?;

        if self.mark_verified(&host) {
            debug!("Priming age verification for {}", host);
            self.jar
                .add_cookie_str(&format!("{}; Path=/", self.config.age_gate_cookie), &parsed);
            body = self.fetch_text(url).await?;
        }

        if age_mask_visible(&body, &self.mask_selector, &self.config.age_gate_mask_visible_style) {
            warn!("Age verification mask still visible on {}", url);
        }

        Ok(body)
    }

    /// Stream the body of `url` into `destination`
    pub async fn download_to_file(&self, url: &str, destination: &Path) -> ScraperResult<u64> {
        let response = self
            .fetch_response_with_policy(url, Duration::from_secs(self.config.download_timeout_seconds))
            .await?;

        let mut file = tokio::fs::File::create(destination)
            .await
            .map_err(|e| ScraperError::persistence(destination, e))?;

        let mut written = 0u64;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    drop(file);
                    let _ = tokio::fs::remove_file(destination).await;
                    return Err(ScraperError::transport(url, format!("download interrupted: {}", e)));
                }
            };
            file.write_all(&chunk)
                .await
                .map_err(|e| ScraperError::persistence(destination, e))?;
            written += chunk.len() as u64;
        }
        file.flush()
            .await
            .map_err(|e| ScraperError::persistence(destination, e))?;

        info!("Downloaded {} ({} bytes) to {:?}", url, written, destination);
        Ok(written)
    }

    /// Returns true the first time a host is seen
    fn mark_verified(&self, host: &str) -> bool {
        match self.verified_hosts.lock() {
            Ok(mut hosts) => hosts.insert(host.to_string()),
            // A poisoned set only means another request panicked mid-insert
            Err(poisoned) => poisoned.into_inner().insert(host.to_string()),
        }
    }

    async fn fetch_text(&self, url: &str) -> ScraperResult<String> {
        let response = self
            .fetch_response_with_policy(url, Duration::from_secs(self.config.timeout_seconds))
            .await?;

        let body = response
            .text()
            .await
            .map_err(|e| ScraperError::transport(url, format!("Failed to read response body: {}", e)))?;

        if body.is_empty() {
            return Err(ScraperError::transport(url, "empty response"));
        }
        Ok(body)
    }

    /// Fetch response with retry policy based on HTTP status codes and network errors
    async fn fetch_response_with_policy(&self, url: &str, timeout: Duration) -> ScraperResult<Response> {
        let mut last_err = None;

        for attempt in 1..=self.config.max_retries {
            debug!("HTTP GET (attempt {}/{}): {}", attempt, self.config.max_retries, url);
            match self.client.get(url).timeout(timeout).send().await {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_success() {
                        return Ok(resp);
                    }

                    warn!("HTTP error {} on attempt {}: {}", status, attempt, url);
                    if !is_retryable(status) || attempt == self.config.max_retries {
                        return Err(ScraperError::http_status(url, status.as_u16()));
                    }

                    // Respect Retry-After if present on 429/503
                    let mut delay_secs = backoff_secs(attempt);
                    if let Some(retry_after) = resp
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.parse::<u64>().ok())
                    {
                        delay_secs = retry_after.max(delay_secs);
                    }
                    sleep(Duration::from_secs(delay_secs)).await;
                    last_err = Some(ScraperError::http_status(url, status.as_u16()));
                }
                Err(e) => {
                    warn!("Network error on attempt {}: {}", attempt, e);
                    last_err = Some(ScraperError::transport(url, format!("HTTP request failed: {}", e)));
                    if attempt < self.config.max_retries {
                        sleep(Duration::from_secs(backoff_secs(attempt))).await;
                    }
                }
            }
        }

        Err(last_err.unwrap_or_else(|| ScraperError::transport(url, "no attempt was made")))
    }
}

#[async_trait]
impl PageFetcher for HttpClient {
    async fn fetch_page(&self, url: &str) -> Result<String> {
        Ok(self.fetch_html_string(url).await?)
    }
}

#[async_trait]
impl MediaDownloader for HttpClient {
    async fn download(&self, url: &str, destination: &Path) -> Result<u64> {
        Ok(self.download_to_file(url, destination).await?)
    }
}

fn is_retryable(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::REQUEST_TIMEOUT
            | StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    )
}

fn backoff_secs(attempt: u32) -> u64 {
    2_u64.saturating_pow(attempt.saturating_sub(1))
}

/// Whether the age-gate overlay is still rendered visible in `body`
fn age_mask_visible(body: &str, mask: &Selector, visible_style: &str) -> bool {
    Html::parse_document(body)
        .select(mask)
        .next()
        .and_then(|element| element.value().attr("style"))
        .is_some_and(|style| style.contains(visible_style))
}
