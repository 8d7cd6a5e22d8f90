//! Parsing error types for HTML and structured-data extraction
//!
//! A characteristic that cannot be resolved is not an error; resolvers return
//! `None` for that. These variants are reserved for real faults: selectors that
//! do not compile, structured-data blocks that are not JSON, URLs that cannot
//! be resolved, and invalid configuration.

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum ParsingError {
    #[error("Invalid CSS selector: {selector} - {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("Structured data block rejected: {reason}")]
    StructuredDataInvalid { reason: String },

    #[error("URL resolution failed: {url} - {reason}")]
    UrlResolutionFailed {
        url: String,
        reason: String,
        base_url: Option<String>,
    },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String, field: String },
}

impl ParsingError {
    /// Create an invalid selector error
    pub fn invalid_selector(selector: &str, reason: &str) -> Self {
        Self::InvalidSelector {
            selector: selector.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create a URL resolution error against an optional base
    pub fn url_resolution_failed(url: &str, reason: &str, base_url: Option<&str>) -> Self {
        Self::UrlResolutionFailed {
            url: url.to_string(),
            reason: reason.to_string(),
            base_url: base_url.map(str::to_string),
        }
    }

    /// Create a configuration error for a named field
    pub fn configuration(field: &str, message: &str) -> Self {
        Self::ConfigurationError {
            message: message.to_string(),
            field: field.to_string(),
        }
    }
}

pub type ParsingResult<T> = Result<T, ParsingError>;
