//! Domain module - product records, URLs and the ports around them
//!
//! Plain data types with no I/O, plus the traits that the extraction
//! workflow uses to reach transport and persistence.

pub mod product;
pub mod product_url;
pub mod repositories;
pub mod services;

pub use product::{AlcoholPercent, Characteristics, Media, ProductRecord, VolumeMl};
pub use product_url::{slug_from_url, DEFAULT_PRODUCT_SLUG};
pub use repositories::ProductSink;
pub use services::{MediaDownloader, PageFetcher};
