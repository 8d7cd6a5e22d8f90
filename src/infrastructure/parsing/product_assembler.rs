//! Product page assembly
//!
//! Composes structured data, characteristic resolution, normalization and
//! media location into one `ProductRecord` per fetched page. Assembly is pure:
//! the same markup and URL always give the same record.

use scraper::{Html, Selector};
use tracing::debug;

use super::config::ParsingConfig;
use super::context::DetailParseContext;
use super::field_resolver::{CharacteristicSource, FieldResolver};
use super::media_locator::MediaLocator;
use super::normalizer::{normalize_alcohol, normalize_volume, split_pairings};
use super::structured_data::{extract_structured_records, pick_canonical_product, StructuredRecord};
use super::{collapse_whitespace, compile_selector, compile_selectors, flatten_text, ContextualParser, ParsingResult};
use crate::domain::{slug_from_url, Characteristics, ProductRecord};

pub struct ProductAssembler {
    config: ParsingConfig,
    resolver: FieldResolver,
    media: MediaLocator,
    title: Selector,
    description: Vec<Selector>,
}

impl ProductAssembler {
    pub fn new() -> ParsingResult<Self> {
        Self::with_config(ParsingConfig::default())
    }

    /// Create an assembler with custom selectors and labels
    pub fn with_config(config: ParsingConfig) -> ParsingResult<Self> {
        Ok(Self {
            resolver: FieldResolver::new(&config)?,
            media: MediaLocator::new(&config.media)?,
            title: compile_selector(&config.title)?,
            description: compile_selectors(&config.description)?,
            config,
        })
    }

    /// Parse `markup` and assemble the record for `url`
    pub fn assemble(&self, markup: &str, url: &str) -> ParsingResult<ProductRecord> {
        let context = DetailParseContext::new(url)?;
        let html = Html::parse_document(markup);
        self.parse_with_context(&html, &context)
    }

    fn product_code(canonical: Option<&StructuredRecord>, url: &str) -> String {
        canonical
            .and_then(|record| record.text("sku").or_else(|| record.text("mpn")))
            .unwrap_or_else(|| slug_from_url(url))
    }

    fn title(&self, html: &Html, canonical: Option<&StructuredRecord>) -> String {
        canonical
            .and_then(|record| record.text("name"))
            .or_else(|| html.select(&self.title).next().map(flatten_text))
            .unwrap_or_else(|| self.config.default_title.clone())
    }

    fn description(&self, html: &Html, canonical: Option<&StructuredRecord>) -> Option<String> {
        let structured = canonical
            .and_then(|record| record.text("description"))
            .map(|text| collapse_whitespace(&text))
            .filter(|text| !text.is_empty());

        structured
            .or_else(|| {
                self.description
                    .iter()
                    .find_map(|selector| html.select(selector).next())
                    .map(|block| collapse_whitespace(&flatten_text(block)))
            })
            .filter(|text| !text.is_empty())
    }

    fn characteristics(&self, source: &CharacteristicSource, canonical: Option<&StructuredRecord>) -> Characteristics {
        let labels = &self.config.labels;
        let resolve = |label: &str| source.resolve(canonical, label);

        Characteristics {
            producer: resolve(&labels.producer),
            country: resolve(&labels.country),
            region: resolve(&labels.region),
            wine_type: resolve(&labels.wine_type),
            grape: resolve(&labels.grape),
            volume_ml: resolve(&labels.volume).map(|raw| normalize_volume(&raw)),
            vintage: resolve(&labels.vintage),
            alcohol_percent: resolve(&labels.alcohol).map(|raw| normalize_alcohol(&raw)),
            serving_temperature: resolve(&labels.serving_temperature),
            vinification: resolve(&labels.vinification),
            aging: resolve(&labels.aging),
            body: resolve(&labels.body),
            aging_potential: resolve(&labels.aging_potential),
            pairings: source
                .resolve_any(canonical, &labels.pairings)
                .map(|raw| split_pairings(&raw, &self.config.pairing_conjunction)),
        }
    }
}

impl ContextualParser for ProductAssembler {
    type Output = ProductRecord;
    type Context = DetailParseContext;

    fn parse_with_context(&self, html: &Html, context: &Self::Context) -> ParsingResult<Self::Output> {
        let records = extract_structured_records(html);
        let canonical = pick_canonical_product(&records);
        debug!(
            "Assembling {} ({} structured records, product record: {})",
            context.url,
            records.len(),
            canonical.is_some()
        );

        let source = self.resolver.source(html);

        Ok(ProductRecord {
            product_code: Self::product_code(canonical, &context.url),
            url: context.url.clone(),
            title: self.title(html, canonical),
            description: self.description(html, canonical),
            characteristics: self.characteristics(&source, canonical),
            media: self.media.locate(html, &context.page_url, &context.url),
        })
    }
}
