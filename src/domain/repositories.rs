//! Persistence interface for extracted products

use std::path::PathBuf;

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::product::ProductRecord;

/// Receives every assembled record; where and how it is stored is up to the implementation
#[async_trait]
pub trait ProductSink: Send + Sync {
    /// Persist one record and return the location it was written to
    async fn save(&self, record: &ProductRecord) -> Result<PathBuf>;
}
