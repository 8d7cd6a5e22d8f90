//! Product bundles written to a temporary output directory
mod support;

use std::sync::Arc;

use support::RecordingDownloader;
use tempfile::TempDir;
use wine_catalog_extractor::domain::ProductSink;
use wine_catalog_extractor::infrastructure::bundle_store::{
    IMAGE_FILE_STEM, RECORD_FILE_NAME, TECHNICAL_SHEET_FILE_NAME,
};
use wine_catalog_extractor::infrastructure::{BundleStore, ProductAssembler};

const STRUCTURED: &str = include_str!("fixtures/product_structured.html");
const HTML_ONLY: &str = include_str!("fixtures/product_html_only.html");

const GO_UP_URL: &str = "https://www.tdpwines.com.br/produto/go-up-cabernet-sauvignon-reserva/";
const BRANCO_URL: &str = "https://www.tdpwines.com.br/vinho-branco-sauvignon-blanc";
const GO_UP_IMAGE: &str = "https://www.tdpwines.com.br/media/catalog/product/go-up-cabernet-sauvignon-reserva.png";
const GO_UP_SHEET: &str =
    "https://goupwines.com.br/wp-content/uploads/2022/02/GO-UP-Cabernet-Sauvignon-Reserva.pdf";

fn assemble(markup: &str, url: &str) -> wine_catalog_extractor::domain::ProductRecord {
    ProductAssembler::new().unwrap().assemble(markup, url).unwrap()
}

#[tokio::test]
async fn bundle_holds_record_image_and_sheet() {
    let out = TempDir::new().unwrap();
    let downloader = Arc::new(RecordingDownloader::default());
    let store = BundleStore::new(out.path(), downloader.clone());

    let dir = store.save(&assemble(STRUCTURED, GO_UP_URL)).await.unwrap();

    assert_eq!(dir, out.path().join("GOUP-CS-RES-750"));
    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.join(RECORD_FILE_NAME)).unwrap()).unwrap();
    assert_eq!(json["codigo_produto"], "GOUP-CS-RES-750");
    assert_eq!(json["caracteristicas"]["volume_ml"], 750);
    assert_eq!(json["caracteristicas"]["teor_alcoolico_percent"], 13.5);

    let image = dir.join(format!("{IMAGE_FILE_STEM}.png"));
    let sheet = dir.join(TECHNICAL_SHEET_FILE_NAME);
    assert!(image.exists());
    assert!(sheet.exists());
    assert_eq!(
        downloader.requests(),
        [(GO_UP_IMAGE.to_string(), image), (GO_UP_SHEET.to_string(), sheet)]
    );
}

#[tokio::test]
async fn shared_sheet_link_is_downloaded_directly() {
    let out = TempDir::new().unwrap();
    let downloader = Arc::new(RecordingDownloader::default());
    let store = BundleStore::new(out.path(), downloader.clone());

    let dir = store.save(&assemble(HTML_ONLY, BRANCO_URL)).await.unwrap();

    let requests = downloader.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].1, dir.join(format!("{IMAGE_FILE_STEM}.jpg")));
    assert_eq!(requests[1].0, "https://drive.google.com/uc?export=download&id=1XyZ");

    // the record keeps the link as published
    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.join(RECORD_FILE_NAME)).unwrap()).unwrap();
    assert_eq!(json["midia"]["ficha_tecnica_url"], "https://drive.google.com/file/d/1XyZ/view");
}

#[tokio::test]
async fn failed_download_still_saves_record() {
    let out = TempDir::new().unwrap();
    let downloader = Arc::new(RecordingDownloader::failing(&[GO_UP_IMAGE, GO_UP_SHEET]));
    let store = BundleStore::new(out.path(), downloader);

    let dir = store.save(&assemble(STRUCTURED, GO_UP_URL)).await.unwrap();

    assert!(dir.join(RECORD_FILE_NAME).exists());
    assert!(!dir.join(TECHNICAL_SHEET_FILE_NAME).exists());
    assert!(!dir.join(format!("{IMAGE_FILE_STEM}.png")).exists());
}

#[tokio::test]
async fn resaving_overwrites_the_bundle() {
    let out = TempDir::new().unwrap();
    let store = BundleStore::new(out.path(), Arc::new(RecordingDownloader::default()));
    let record = assemble(HTML_ONLY, BRANCO_URL);

    let first = store.save(&record).await.unwrap();
    let second = store.save(&record).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 1);
}

#[tokio::test]
async fn unusable_product_code_is_rejected() {
    let out = TempDir::new().unwrap();
    let downloader = Arc::new(RecordingDownloader::default());
    let store = BundleStore::new(out.path(), downloader.clone());
    let mut record = assemble(HTML_ONLY, BRANCO_URL);
    record.product_code = "..".to_string();

    assert!(store.save(&record).await.is_err());
    assert!(downloader.requests().is_empty());
    assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn dotted_product_code_gets_its_own_directory() {
    let out = TempDir::new().unwrap();
    let store = BundleStore::new(out.path(), Arc::new(RecordingDownloader::default()));
    let mut record = assemble(HTML_ONLY, BRANCO_URL);
    record.product_code = "VT..2020".to_string();

    let dir = store.save(&record).await.unwrap();

    assert_eq!(dir, out.path().join("VT..2020"));
    assert!(dir.join(RECORD_FILE_NAME).exists());
}

#[tokio::test]
async fn separators_in_product_code_stay_inside_output() {
    let out = TempDir::new().unwrap();
    let store = BundleStore::new(out.path(), Arc::new(RecordingDownloader::default()));
    let mut record = assemble(HTML_ONLY, BRANCO_URL);
    record.product_code = "../x".to_string();

    let dir = store.save(&record).await.unwrap();

    assert_eq!(dir, out.path().join("..-x"));
    assert!(dir.starts_with(out.path()));
}
