//! Parsing context for HTML extraction
//!
//! Provides context objects carrying the page URL that relative links and
//! media sources are resolved against.

use url::Url;

use super::{ParsingError, ParsingResult};

/// Context for parsing a listing (category or pagination) page
#[derive(Debug, Clone)]
pub struct ParseContext {
    /// URL of the listing page being parsed
    pub page_url: Url,
}

impl ParseContext {
    pub fn new(page_url: &str) -> ParsingResult<Self> {
        Ok(Self {
            page_url: parse_page_url(page_url)?,
        })
    }
}

/// Detail parsing context for product detail pages
#[derive(Debug, Clone)]
pub struct DetailParseContext {
    /// Product URL exactly as requested; stored verbatim in the record
    pub url: String,

    /// Parsed form of `url`, used to resolve relative resources
    pub page_url: Url,
}

impl DetailParseContext {
    pub fn new(url: &str) -> ParsingResult<Self> {
        Ok(Self {
            url: url.to_string(),
            page_url: parse_page_url(url)?,
        })
    }
}

fn parse_page_url(url: &str) -> ParsingResult<Url> {
    Url::parse(url)
        .map_err(|e| ParsingError::url_resolution_failed(url, &e.to_string(), None))
}
