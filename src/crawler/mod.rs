//! Crawler module for site traversal and page fingerprinting
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with the fixed crawler user agent
//! - Client-side render detection and the headless renderer
//! - HTML parsing for metadata, visible text, links and scripts
//! - Content fingerprints
//! - The worker pool and the bounded breadth-first crawl

mod engine;
mod fetcher;
mod fingerprint;
mod parser;
mod render;
mod scheduler;

pub use engine::{
    CrawlLimits, CrawlResult, Crawler, SiteCrawler, CONCURRENCY, CSR_THRESHOLD_BYTES, MAX_DEPTH,
    MAX_PAGES, TIMEOUT_MS,
};
pub use fetcher::{build_http_client, fetch_asset, fetch_html, FetchResult, USER_AGENT};
pub use fingerprint::sha256_hex;
pub use parser::{parse_html, visible_text, ParsedPage};
pub use render::{
    hydrate, is_likely_csr, is_richer, BrowserlessRenderer, CsrRenderer, NoopRenderer,
    RenderError, DEFAULT_RENDER_TIMEOUT,
};
pub use scheduler::{ShutdownHandle, WorkerPool};
