//! Embedded structured data (`application/ld+json`) reader
//!
//! Every block is parsed independently. A malformed or empty block is skipped
//! so one broken script tag never costs the rest of the page.

use std::sync::LazyLock;

use scraper::{Html, Selector};
use serde_json::{Map, Value};
use tracing::debug;

use super::ParsingError;

static LD_JSON_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"script[type="application/ld+json"]"#).expect("static selector")
});

const PRODUCT_TYPE: &str = "Product";

/// One JSON object taken from a structured-data block
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredRecord(Map<String, Value>);

impl StructuredRecord {
    /// True when `@type` is `type_name` or a list containing it
    pub fn has_type(&self, type_name: &str) -> bool {
        match self.0.get("@type") {
            Some(Value::String(t)) => t == type_name,
            Some(Value::Array(types)) => types.iter().any(|t| t.as_str() == Some(type_name)),
            _ => false,
        }
    }

    /// Non-empty scalar field rendered as text
    pub fn text(&self, key: &str) -> Option<String> {
        self.0.get(key).and_then(scalar_text)
    }

    /// `additionalProperty` entries that are objects, in document order
    pub fn additional_properties(&self) -> impl Iterator<Item = &Map<String, Value>> {
        self.0
            .get("additionalProperty")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(Value::as_object)
    }
}

/// Render a JSON string or number as trimmed text; other kinds yield `None`
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

/// Collect every structured-data record in the document.
///
/// An object block yields one record; an array block yields one record per
/// object element.
pub fn extract_structured_records(html: &Html) -> Vec<StructuredRecord> {
    let mut records = Vec::new();

    for (index, script) in html.select(&LD_JSON_SELECTOR).enumerate() {
        match parse_block(&script.text().collect::<String>()) {
            Ok(block) => records.extend(block),
            Err(e) => debug!("Skipping structured data block {}: {}", index, e),
        }
    }

    records
}

fn parse_block(payload: &str) -> Result<Vec<StructuredRecord>, ParsingError> {
    let payload = payload.trim();
    if payload.is_empty() {
        return Err(ParsingError::StructuredDataInvalid {
            reason: "empty payload".to_string(),
        });
    }

    let value: Value = serde_json::from_str(payload).map_err(|e| ParsingError::StructuredDataInvalid {
        reason: e.to_string(),
    })?;

    Ok(match value {
        Value::Object(fields) => vec![StructuredRecord(fields)],
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(fields) => Some(StructuredRecord(fields)),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

/// First record typed `Product`, if any
pub fn pick_canonical_product(records: &[StructuredRecord]) -> Option<&StructuredRecord> {
    records.iter().find(|record| record.has_type(PRODUCT_TYPE))
}
