//! llms-txt-monitor: keeps an `llms.txt` inventory of websites up to date
//!
//! This crate crawls a site breadth-first within its host, fingerprints every
//! page (and every external script it references), persists each crawl as an
//! immutable snapshot, and reports which URLs were added, removed, or modified
//! since the previous snapshot.

pub mod config;
pub mod crawler;
pub mod output;
pub mod snapshot;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for llms-txt-monitor operations
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("No snapshot found for baseUrl={base_url}")]
    NotFound { base_url: String },

    #[error("Crawl of {base_url} interrupted by shutdown")]
    Interrupted { base_url: String },

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UrlError {
    #[error("URL is blank")]
    Blank,

    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("URL has no scheme: {0}")]
    MissingScheme(String),

    #[error("Malformed URL: {0}")]
    Malformed(String),
}

/// Result type alias for llms-txt-monitor operations
pub type Result<T> = std::result::Result<T, MonitorError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlResult, Crawler};
pub use snapshot::{DiffReport, Monitor, SnapshotService};
pub use state::{PageInfo, PageType};
pub use storage::{SnapshotStore, SqliteStore};
pub use url::{is_static_asset, normalize_url};
