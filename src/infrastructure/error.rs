//! Crate-level error type for transport and persistence faults

use std::path::PathBuf;

use thiserror::Error;

use super::parsing_error::ParsingError;

#[derive(Error, Debug)]
pub enum ScraperError {
    #[error("Transport error for {url}: {message}")]
    Transport {
        url: String,
        status: Option<u16>,
        message: String,
    },

    #[error(transparent)]
    Parsing(#[from] ParsingError),

    #[error("Persistence error at {}: {source}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ScraperError {
    pub fn transport(url: &str, message: impl Into<String>) -> Self {
        Self::Transport {
            url: url.to_string(),
            status: None,
            message: message.into(),
        }
    }

    pub fn http_status(url: &str, status: u16) -> Self {
        Self::Transport {
            url: url.to_string(),
            status: Some(status),
            message: format!("HTTP error {status}"),
        }
    }

    pub fn persistence(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Persistence {
            path: path.into(),
            source,
        }
    }

    /// True for network and HTTP failures, which skip the URL instead of aborting the run
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// HTTP status of a transport failure, when the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => *status,
            _ => None,
        }
    }
}

pub type ScraperResult<T> = Result<T, ScraperError>;
