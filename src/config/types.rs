use crate::crawler::{
    CrawlLimits, CONCURRENCY, CSR_THRESHOLD_BYTES, DEFAULT_RENDER_TIMEOUT, MAX_DEPTH, MAX_PAGES,
    TIMEOUT_MS,
};
use crate::snapshot::DEFAULT_INTERVAL;
use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for llms-txt-monitor
///
/// Every section is optional; missing values fall back to the crawler
/// defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub renderer: Option<RendererConfig>,
    #[serde(default)]
    pub monitor: MonitorConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default, rename = "site")]
    pub sites: Vec<SiteEntry>,
}

impl Config {
    /// URLs of the configured `[[site]]` entries
    pub fn site_urls(&self) -> Vec<String> {
        self.sites.iter().map(|site| site.url.clone()).collect()
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum number of records per crawl
    #[serde(rename = "max-pages")]
    pub max_pages: usize,

    /// Maximum link distance from the base URL
    #[serde(rename = "max-depth")]
    pub max_depth: usize,

    /// Maximum number of concurrent page fetches
    pub concurrency: usize,

    /// Per-request timeout (milliseconds)
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,

    /// Pages shorter than this are checked for client-side rendering
    #[serde(rename = "csr-threshold-bytes")]
    pub csr_threshold_bytes: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_pages: MAX_PAGES,
            max_depth: MAX_DEPTH,
            concurrency: CONCURRENCY,
            timeout_ms: TIMEOUT_MS,
            csr_threshold_bytes: CSR_THRESHOLD_BYTES,
        }
    }
}

impl CrawlerConfig {
    /// Converts the configuration into crawl limits
    pub fn limits(&self) -> CrawlLimits {
        CrawlLimits {
            max_pages: self.max_pages,
            max_depth: self.max_depth,
            concurrency: self.concurrency,
            timeout: Duration::from_millis(self.timeout_ms),
            csr_threshold_bytes: self.csr_threshold_bytes,
        }
    }
}

/// Headless browser configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RendererConfig {
    /// Root URL of the Browserless instance
    #[serde(rename = "browserless-url")]
    pub browserless_url: String,

    /// Optional Browserless API token
    #[serde(default)]
    pub token: Option<String>,

    /// Upper bound for one render (milliseconds)
    #[serde(rename = "timeout-ms", default = "default_render_timeout_ms")]
    pub timeout_ms: u64,
}

impl RendererConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

fn default_render_timeout_ms() -> u64 {
    DEFAULT_RENDER_TIMEOUT.as_millis() as u64
}

/// Periodic monitor configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Delay between two monitoring cycles (milliseconds)
    #[serde(rename = "interval-ms")]
    pub interval_ms: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_INTERVAL.as_millis() as u64,
        }
    }
}

impl MonitorConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            database_path: "./llms-txt.db".to_string(),
        }
    }
}

/// A site monitored from the first cycle on
#[derive(Debug, Clone, Deserialize)]
pub struct SiteEntry {
    /// Base URL of the site
    pub url: String,
}
