//! Characteristic resolution
//!
//! A label is resolved through three sources in order, stopping at the first
//! hit: the canonical structured record, the first known characteristics
//! container on the page, and finally every line-like element of the document.
//! Each tier is a plain function over already-extracted data so it can be
//! tested without building a page.

use regex::Regex;
use scraper::{Html, Selector};
use tracing::debug;

use super::config::ParsingConfig;
use super::structured_data::{scalar_text, StructuredRecord};
use super::{compile_selector, compile_selectors, flatten_text, ParsingResult};

/// Compiled selectors for the container and document tiers
#[derive(Debug, Clone)]
pub struct FieldResolver {
    containers: Vec<Selector>,
    container_items: Selector,
    document_items: Selector,
}

impl FieldResolver {
    pub fn new(config: &ParsingConfig) -> ParsingResult<Self> {
        Ok(Self {
            containers: compile_selectors(&config.characteristic_containers)?,
            container_items: compile_selector(&config.container_items)?,
            document_items: compile_selector(&config.document_items)?,
        })
    }

    /// Extract the candidate texts of one page once, for many lookups
    pub fn source(&self, html: &Html) -> CharacteristicSource {
        let container_texts = self
            .containers
            .iter()
            .find_map(|selector| html.select(selector).next())
            .map(|container| {
                container
                    .select(&self.container_items)
                    .filter(|item| item.id() != container.id())
                    .map(flatten_text)
                    .collect()
            })
            .unwrap_or_default();

        let document_texts = html.select(&self.document_items).map(flatten_text).collect();

        CharacteristicSource {
            container_texts,
            document_texts,
        }
    }

    /// Resolve a single label against a page
    pub fn resolve(
        &self,
        html: &Html,
        canonical: Option<&StructuredRecord>,
        label: &str,
    ) -> Option<String> {
        self.source(html).resolve(canonical, label)
    }
}

/// Flattened texts of one page, in document order
#[derive(Debug, Clone, Default)]
pub struct CharacteristicSource {
    container_texts: Vec<String>,
    document_texts: Vec<String>,
}

impl CharacteristicSource {
    pub fn new(container_texts: Vec<String>, document_texts: Vec<String>) -> Self {
        Self {
            container_texts,
            document_texts,
        }
    }

    /// Run the tier cascade for `label`
    pub fn resolve(&self, canonical: Option<&StructuredRecord>, label: &str) -> Option<String> {
        canonical
            .and_then(|record| resolve_structured(record, label))
            .or_else(|| first_labelled_value(self.container_texts.iter().map(String::as_str), label))
            .or_else(|| first_labelled_value(self.document_texts.iter().map(String::as_str), label))
    }

    /// Resolve each label in turn, returning the first that yields a value
    pub fn resolve_any(&self, canonical: Option<&StructuredRecord>, labels: &[String]) -> Option<String> {
        labels.iter().find_map(|label| self.resolve(canonical, label))
    }
}

/// Structured tier: value of the first additional property whose name
/// contains `label`, ignoring case
pub fn resolve_structured(record: &StructuredRecord, label: &str) -> Option<String> {
    let needle = label.to_lowercase();
    record
        .additional_properties()
        .find(|property| {
            property
                .get("name")
                .and_then(|name| name.as_str())
                .is_some_and(|name| name.to_lowercase().contains(&needle))
        })
        .and_then(|property| property.get("value"))
        .and_then(scalar_text)
}

/// Text tiers: first text that starts with `label` followed by whitespace
pub fn first_labelled_value<'a>(
    texts: impl IntoIterator<Item = &'a str>,
    label: &str,
) -> Option<String> {
    let pattern = label_pattern(label)?;
    texts.into_iter().find_map(|text| capture_value(&pattern, text))
}

/// Match a single text fragment against `label`
pub fn match_label(text: &str, label: &str) -> Option<String> {
    capture_value(&label_pattern(label)?, text)
}

fn label_pattern(label: &str) -> Option<Regex> {
    match Regex::new(&format!(r"(?i)^{}\s+(.+)", regex::escape(label))) {
        Ok(pattern) => Some(pattern),
        Err(e) => {
            debug!("Unusable characteristic label '{}': {}", label, e);
            None
        }
    }
}

fn capture_value(pattern: &Regex, text: &str) -> Option<String> {
    let value = pattern.captures(text)?.get(1)?.as_str().trim();
    (!value.is_empty()).then(|| value.to_string())
}
