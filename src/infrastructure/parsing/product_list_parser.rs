//! Listing page link extraction
//!
//! Category and pagination pages carry two kinds of interesting links:
//! product pages (recognized by path markers) and further listing pages
//! (recognized by page-number query markers). Both are resolved against the
//! listing page and restricted to the catalog host.

use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

use super::{compile_selector, push_unique, resolve_href, ContextualParser, ParseContext, ParsingError, ParsingResult};
use crate::infrastructure::config::SiteConfig;

/// Links discovered on one listing page, each list in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingLinks {
    /// Candidate product pages, query and fragment removed
    pub product_links: Vec<String>,
    /// Further listing pages, fragment removed
    pub pagination_links: Vec<String>,
}

/// Parser for catalog listing pages
#[derive(Debug, Clone)]
pub struct ProductListParser {
    links: Selector,
    catalog_host: String,
    product_markers: Vec<String>,
    pagination_markers: Vec<String>,
}

impl ProductListParser {
    pub fn new(site: &SiteConfig) -> ParsingResult<Self> {
        let base = Url::parse(&site.base_url)
            .map_err(|e| ParsingError::url_resolution_failed(&site.base_url, &e.to_string(), None))?;
        let catalog_host = base
            .host_str()
            .ok_or_else(|| ParsingError::configuration("site.base_url", "base URL has no host"))?
            .to_string();

        Ok(Self {
            links: compile_selector("a[href]")?,
            catalog_host,
            product_markers: site.product_path_markers.clone(),
            pagination_markers: site.pagination_markers.clone(),
        })
    }

    fn on_catalog_host(&self, url: &Url) -> bool {
        url.host_str() == Some(self.catalog_host.as_str())
    }
}

impl ContextualParser for ProductListParser {
    type Output = ListingLinks;
    type Context = ParseContext;

    fn parse_with_context(&self, html: &Html, context: &Self::Context) -> ParsingResult<Self::Output> {
        let mut links = ListingLinks::default();

        for anchor in html.select(&self.links) {
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };

            if self.product_markers.iter().any(|m| href.contains(m.as_str())) {
                if let Some(mut url) = resolve_href(&context.page_url, href).filter(|u| self.on_catalog_host(u)) {
                    url.set_query(None);
                    url.set_fragment(None);
                    push_unique(&mut links.product_links, url.into());
                }
            }

            if self.pagination_markers.iter().any(|m| href.contains(m.as_str())) {
                if let Some(mut url) = resolve_href(&context.page_url, href).filter(|u| self.on_catalog_host(u)) {
                    url.set_fragment(None);
                    push_unique(&mut links.pagination_links, url.into());
                }
            }
        }

        debug!(
            "Listing {}: {} product links, {} pagination links",
            context.page_url,
            links.product_links.len(),
            links.pagination_links.len()
        );

        Ok(links)
    }
}
