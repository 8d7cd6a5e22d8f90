//! HTML parsing infrastructure
//!
//! Trait-based extraction over `scraper::Html`. Structured data, characteristic
//! resolution, normalization and media location are separate modules so each
//! can be tested on its own; `ProductAssembler` composes them per page.

pub mod config;
pub mod context;
pub mod field_resolver;
pub mod media_locator;
pub mod normalizer;
pub mod product_assembler;
pub mod product_list_parser;
pub mod structured_data;

// Re-export public types
pub use super::parsing_error::{ParsingError, ParsingResult};
pub use config::{CharacteristicLabels, MediaSelectors, ParsingConfig, TechnicalSheetOverride};
pub use context::{DetailParseContext, ParseContext};
pub use field_resolver::{CharacteristicSource, FieldResolver};
pub use media_locator::MediaLocator;
pub use product_assembler::ProductAssembler;
pub use product_list_parser::{ListingLinks, ProductListParser};
pub use structured_data::{extract_structured_records, pick_canonical_product, StructuredRecord};

use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Parser trait for extracting a typed result from a parsed document
pub trait ContextualParser {
    type Output;
    type Context;

    /// Parse HTML with contextual information
    fn parse_with_context(&self, html: &Html, context: &Self::Context) -> ParsingResult<Self::Output>;
}

/// Compile one selector string
pub(crate) fn compile_selector(selector: &str) -> ParsingResult<Selector> {
    Selector::parse(selector).map_err(|e| ParsingError::invalid_selector(selector, &e.to_string()))
}

/// Compile selector strings in order; any invalid selector is an error
pub(crate) fn compile_selectors(selectors: &[String]) -> ParsingResult<Vec<Selector>> {
    selectors.iter().map(|s| compile_selector(s)).collect()
}

/// Visible text of an element: text nodes trimmed, empty ones dropped, joined by one space
pub fn flatten_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Collapse every whitespace run into a single space and trim
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Resolve an `href`/`src` value against the page it was found on
pub(crate) fn resolve_href(page_url: &Url, href: &str) -> Option<Url> {
    match page_url.join(href.trim()) {
        Ok(url) => Some(url),
        Err(e) => {
            tracing::debug!("Skipping unresolvable link '{}' on {}: {}", href, page_url, e);
            None
        }
    }
}

/// Append `item` unless already present, preserving first-seen order
pub(crate) fn push_unique(items: &mut Vec<String>, item: String) {
    if !items.contains(&item) {
        items.push(item);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flatten_text_joins_trimmed_fragments() {
        let html = Html::parse_fragment("<li>  Volume <b> 750 </b>\n ml </li>");
        let li = html.select(&compile_selector("li").unwrap()).next().unwrap();
        assert_eq!(flatten_text(li), "Volume 750 ml");
    }

    #[test]
    fn collapse_whitespace_normalizes_runs() {
        assert_eq!(collapse_whitespace("  Um   tinto\n\tencorpado "), "Um tinto encorpado");
    }

    #[test]
    fn invalid_selector_is_reported() {
        let err = compile_selectors(&["div.ok".to_string(), "div[".to_string()]).unwrap_err();
        assert!(matches!(err, ParsingError::InvalidSelector { selector, .. } if selector == "div["));
    }

    #[test]
    fn push_unique_keeps_first_seen_order() {
        let mut items = Vec::new();
        for url in ["b", "a", "b", "c", "a"] {
            push_unique(&mut items, url.to_string());
        }
        assert_eq!(items, ["b", "a", "c"]);
    }
}
