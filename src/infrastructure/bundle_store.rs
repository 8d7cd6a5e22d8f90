//! Product bundles on disk
//!
//! One directory per product, named by its product code:
//!
//! ```text
//! <out>/<codigo_produto>/produto.json
//! <out>/<codigo_produto>/imagem_principal.<ext>
//! <out>/<codigo_produto>/ficha_tecnica.pdf
//! ```
//!
//! Media downloads are best-effort. A failed download is logged and the
//! record is still saved.

#![allow(clippy::uninlined_format_args)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tokio::fs;
use tracing::{info, warn};
use url::Url;

use crate::domain::{MediaDownloader, ProductRecord, ProductSink};
use crate::infrastructure::error::{ScraperError, ScraperResult};

pub const RECORD_FILE_NAME: &str = "produto.json";
pub const IMAGE_FILE_STEM: &str = "imagem_principal";
pub const TECHNICAL_SHEET_FILE_NAME: &str = "ficha_tecnica.pdf";
const DEFAULT_IMAGE_EXTENSION: &str = ".jpg";

const DRIVE_HOST: &str = "drive.google.com";

/// Writes product bundles below a base directory
pub struct BundleStore {
    base_dir: PathBuf,
    downloader: Arc<dyn MediaDownloader>,
}

impl BundleStore {
    pub fn new(base_dir: impl Into<PathBuf>, downloader: Arc<dyn MediaDownloader>) -> Self {
        Self {
            base_dir: base_dir.into(),
            downloader,
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Directory for a product code; path separators are replaced and `.`/`..` rejected
    pub fn bundle_dir(&self, product_code: &str) -> ScraperResult<PathBuf> {
        let name = sanitize_dir_name(product_code).ok_or_else(|| {
            ScraperError::persistence(
                self.base_dir.join(product_code),
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "unusable product code for a directory name"),
            )
        })?;
        Ok(self.base_dir.join(name))
    }

    /// Write the record and fetch its media
    pub async fn save_bundle(&self, record: &ProductRecord) -> ScraperResult<PathBuf> {
        let dir = self.bundle_dir(&record.product_code)?;
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| ScraperError::persistence(&dir, e))?;

        let json = serde_json::to_string_pretty(record)?;
        let record_path = dir.join(RECORD_FILE_NAME);
        fs::write(&record_path, json)
            .await
            .map_err(|e| ScraperError::persistence(&record_path, e))?;

        if let Some(image_url) = &record.media.primary_image_url {
            let target = dir.join(format!("{}{}", IMAGE_FILE_STEM, image_extension(image_url)));
            self.download_best_effort(image_url, &target).await;
        }

        if let Some(sheet_url) = &record.media.technical_sheet_url {
            let sheet_url = direct_download_url(sheet_url);
            self.download_best_effort(&sheet_url, &dir.join(TECHNICAL_SHEET_FILE_NAME)).await;
        }

        Ok(dir)
    }

    async fn download_best_effort(&self, url: &str, target: &Path) {
        if let Err(e) = self.downloader.download(url, target).await {
            warn!("Download failed for {}: {:#}", url, e);
        }
    }
}

#[async_trait]
impl ProductSink for BundleStore {
    async fn save(&self, record: &ProductRecord) -> Result<PathBuf> {
        let dir = self.save_bundle(record).await?;
        info!("Saved {} to {:?}", record.product_code, dir);
        Ok(dir)
    }
}

fn sanitize_dir_name(product_code: &str) -> Option<String> {
    let name = product_code.trim().replace(['/', '\\'], "-");
    if name.is_empty() || name == "." || name == ".." {
        None
    } else {
        Some(name)
    }
}

/// Extension of the URL path including the dot, `.jpg` when there is none
pub fn image_extension(url: &str) -> String {
    let path = Url::parse(url)
        .map(|u| u.path().to_string())
        .unwrap_or_else(|_| url.split(['?', '#']).next().unwrap_or_default().to_string());

    Path::new(&path)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .map(|ext| format!(".{}", ext))
        .unwrap_or_else(|| DEFAULT_IMAGE_EXTENSION.to_string())
}

/// Rewrite a file-sharing "view" link into its direct download form.
///
/// The file id is the path segment after `d`; query and fragment never contribute.
pub fn direct_download_url(url: &str) -> String {
    drive_file_id(url)
        .map(|id| format!("https://{}/uc?export=download&id={}", DRIVE_HOST, id))
        .unwrap_or_else(|| url.to_string())
}

fn drive_file_id(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    if !parsed
        .host_str()
        .is_some_and(|host| host.eq_ignore_ascii_case(DRIVE_HOST))
    {
        return None;
    }

    let mut segments = parsed.path_segments()?;
    segments.find(|segment| *segment == "d")?;
    segments
        .next()
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}
