//! Infrastructure layer - configuration, transport, parsing and persistence
//!
//! Everything that touches the network, the filesystem or raw HTML lives here.

pub mod bundle_store;
pub mod config;
pub mod error;
pub mod logging;
pub mod parsing;
pub mod parsing_error;
pub mod simple_http_client;

// Re-export commonly used types
pub use bundle_store::BundleStore;
pub use config::{AppConfig, ConfigManager};
pub use error::{ScraperError, ScraperResult};
pub use logging::{bootstrap_dispatch, get_log_directory, init_logging_with_config};
pub use parsing::{ParsingConfig, ParsingError, ParsingResult, ProductAssembler, ProductListParser};
pub use simple_http_client::HttpClient;
