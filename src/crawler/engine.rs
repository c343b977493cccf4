//! Bounded breadth-first crawl of a single host
//!
//! The crawl is level-synchronous: every URL of depth `d` is processed,
//! all workers join, and only then does depth `d + 1` start. Within a level
//! up to `concurrency` pages are fetched at once.
//!
//! Per-URL failures never leave this module. A URL that cannot be fetched
//! is logged at debug level and skipped; only the records of successful
//! fetches make it into the [`CrawlResult`].

use super::fetcher::{build_http_client, fetch_asset, fetch_html, FetchResult};
use super::fingerprint::sha256_hex;
use super::parser::parse_html;
use super::render::{hydrate, CsrRenderer};
use super::scheduler::{ShutdownHandle, WorkerPool};
use crate::state::{DropReason, LedgerTally, PageInfo, PageType, UrlLedger, UrlState};
use crate::url::{classify_url, extract_host, is_in_scope, is_static_asset, normalize_url};
use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use url::Url;

/// Maximum number of records per crawl
pub const MAX_PAGES: usize = 100;

/// Maximum link distance from the base URL
pub const MAX_DEPTH: usize = 3;

/// Maximum number of concurrent page workers
pub const CONCURRENCY: usize = 4;

/// Per-request timeout in milliseconds
pub const TIMEOUT_MS: u64 = 8000;

/// Pages shorter than this are treated as client-rendered shells
pub const CSR_THRESHOLD_BYTES: usize = 3072;

/// Bounds applied to every crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlLimits {
    pub max_pages: usize,
    pub max_depth: usize,
    pub concurrency: usize,
    pub timeout: Duration,
    pub csr_threshold_bytes: usize,
}

impl Default for CrawlLimits {
    fn default() -> Self {
        Self {
            max_pages: MAX_PAGES,
            max_depth: MAX_DEPTH,
            concurrency: CONCURRENCY,
            timeout: Duration::from_millis(TIMEOUT_MS),
            csr_threshold_bytes: CSR_THRESHOLD_BYTES,
        }
    }
}

/// Outcome of one crawl
///
/// Records are in discovery order, level by level, and no URL appears
/// twice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlResult {
    pub base_url: String,
    pub pages: Vec<PageInfo>,
    /// The crawl was cut short by shutdown; `pages` is incomplete
    pub interrupted: bool,
}

impl CrawlResult {
    /// A crawl that produced nothing
    pub fn empty(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            pages: Vec::new(),
            interrupted: false,
        }
    }

    /// `(url, content_hash)` pairs in record order
    pub fn fingerprints(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pages
            .iter()
            .map(|page| (page.url.as_str(), page.content_hash.as_str()))
    }

    /// Number of HTML page records
    pub fn page_count(&self) -> usize {
        self.count_of(PageType::Page)
    }

    /// Number of static asset records
    pub fn asset_count(&self) -> usize {
        self.count_of(PageType::StaticAsset)
    }

    fn count_of(&self, page_type: PageType) -> usize {
        self.pages
            .iter()
            .filter(|page| page.page_type == page_type)
            .count()
    }
}

/// Something that can crawl a site
///
/// The snapshot service depends on this trait rather than on [`Crawler`]
/// so it can be driven by a canned crawler in tests.
#[async_trait]
pub trait SiteCrawler: Send + Sync {
    /// Crawls `base_url`; never fails, an unusable base URL yields no pages
    async fn crawl(&self, base_url: &str) -> CrawlResult;
}

/// Breadth-first site crawler
pub struct Crawler {
    client: Client,
    renderer: Arc<dyn CsrRenderer>,
    limits: CrawlLimits,
    pool: WorkerPool,
}

impl Crawler {
    /// Creates a crawler with its own HTTP client
    ///
    /// # Arguments
    ///
    /// * `limits` - Page cap, depth, concurrency, timeout and CSR threshold
    /// * `renderer` - Headless browser used for client-rendered pages
    ///
    /// # Returns
    ///
    /// * `Ok(Crawler)` - Ready to crawl
    /// * `Err(reqwest::Error)` - The HTTP client could not be built
    pub fn new(
        limits: CrawlLimits,
        renderer: Arc<dyn CsrRenderer>,
    ) -> Result<Self, reqwest::Error> {
        let client = build_http_client(limits.timeout)?;
        Ok(Self::with_client(client, renderer, limits))
    }

    /// Creates a crawler around an existing HTTP client
    pub fn with_client(
        client: Client,
        renderer: Arc<dyn CsrRenderer>,
        limits: CrawlLimits,
    ) -> Self {
        Self {
            client,
            renderer,
            pool: WorkerPool::new(limits.concurrency),
            limits,
        }
    }

    /// Returns the limits this crawler applies
    pub fn limits(&self) -> &CrawlLimits {
        &self.limits
    }

    /// Returns the hook that stops in-flight and future crawls
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.pool.shutdown_handle()
    }

    /// Crawls `base_url` breadth-first
    ///
    /// # Algorithm
    ///
    /// 1. Normalize the base URL and take its host as the scope
    /// 2. For each depth from 0 to `max_depth`, while the frontier is not
    ///    empty and the page cap is not reached:
    ///    - admit frontier URLs that normalize, are in scope and can be
    ///      claimed in the ledger
    ///    - process the admitted URLs on the worker pool
    ///    - build the next frontier from the discovered links
    ///
    /// A base URL that does not normalize or has no host yields an empty
    /// result.
    pub async fn crawl(&self, base_url: &str) -> CrawlResult {
        let Some(base) = normalize_url(base_url) else {
            tracing::debug!("Base URL does not normalize: {}", base_url);
            return CrawlResult::empty(base_url);
        };
        let Some(base_host) = extract_host(&base) else {
            tracing::debug!("Base URL has no host: {}", base_url);
            return CrawlResult::empty(base_url);
        };

        tracing::info!("Starting crawl of {}", base);

        let ctx = Arc::new(CrawlContext {
            client: self.client.clone(),
            renderer: Arc::clone(&self.renderer),
            limits: self.limits,
            base_host,
            ledger: UrlLedger::new(),
            pages: Mutex::new(Vec::new()),
        });

        let mut frontier = vec![base];
        let mut depth = 0;

        while !frontier.is_empty() && depth <= self.limits.max_depth {
            if ctx.is_full() {
                tracing::debug!("Reached page cap ({}), stopping crawl", self.limits.max_pages);
                ctx.drop_all(&frontier, DropReason::CapReached);
                break;
            }
            if self.pool.is_shutdown() {
                tracing::info!("Crawl of {} interrupted by shutdown", base_url);
                break;
            }

            let admitted = ctx.admit(frontier);
            tracing::debug!("Depth {}: {} URLs admitted", depth, admitted.len());

            let level_ctx = Arc::clone(&ctx);
            let discovered = self
                .pool
                .run_level(admitted, move |url| {
                    let ctx = Arc::clone(&level_ctx);
                    async move { ctx.process_page(&url).await }
                })
                .await;

            depth += 1;
            frontier = ctx.next_frontier(discovered, depth);
        }

        let tally = ctx.ledger.tally();
        let pages = ctx.take_pages();
        log_tally(&pages, &tally, base_url);

        CrawlResult {
            base_url: base_url.to_string(),
            pages,
            interrupted: self.pool.is_shutdown(),
        }
    }
}

#[async_trait]
impl SiteCrawler for Crawler {
    async fn crawl(&self, base_url: &str) -> CrawlResult {
        Crawler::crawl(self, base_url).await
    }
}

fn log_tally(pages: &[PageInfo], tally: &LedgerTally, base_url: &str) {
    let assets = pages
        .iter()
        .filter(|p| p.page_type == PageType::StaticAsset)
        .count();

    tracing::info!(
        "Crawl of {} finished: {} pages, {} assets ({} URLs seen, {} failed, {} out of scope, {} past depth, {} over cap)",
        base_url,
        pages.len() - assets,
        assets,
        tally.total(),
        tally.fetch_failed,
        tally.host_mismatch,
        tally.depth_cut,
        tally.cap_reached,
    );
}

/// State shared by all workers of one crawl
struct CrawlContext {
    client: Client,
    renderer: Arc<dyn CsrRenderer>,
    limits: CrawlLimits,
    base_host: String,
    ledger: UrlLedger,
    pages: Mutex<Vec<PageInfo>>,
}

impl CrawlContext {
    fn is_full(&self) -> bool {
        self.pages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
            >= self.limits.max_pages
    }

    /// Appends a record unless the cap is reached; check and append happen
    /// under the same lock
    fn record(&self, info: PageInfo) -> bool {
        let mut pages = self.pages.lock().unwrap_or_else(PoisonError::into_inner);
        if pages.len() >= self.limits.max_pages {
            return false;
        }
        pages.push(info);
        true
    }

    fn take_pages(&self) -> Vec<PageInfo> {
        std::mem::take(&mut *self.pages.lock().unwrap_or_else(PoisonError::into_inner))
    }

    fn in_scope(&self, url: &str) -> bool {
        extract_host(url).map_or(false, |host| is_in_scope(&host, &self.base_host))
    }

    fn transition(&self, url: &str, next: UrlState) {
        if let Err(e) = self.ledger.advance(url, next) {
            tracing::debug!("{}", e);
        }
    }

    fn drop_all(&self, urls: &[String], reason: DropReason) {
        for url in urls {
            self.ledger.drop_unclaimed(url, reason);
        }
    }

    /// Filters a frontier down to the URLs this level will fetch, claiming
    /// each of them
    fn admit(&self, frontier: Vec<String>) -> Vec<String> {
        frontier
            .into_iter()
            .filter_map(|raw| {
                let url = normalize_url(&raw)?;
                if !self.in_scope(&url) {
                    tracing::debug!("Skipping out-of-scope URL: {}", url);
                    self.ledger.drop_unclaimed(&url, DropReason::HostMismatch);
                    return None;
                }
                self.ledger.claim(&url).then_some(url)
            })
            .collect()
    }

    /// Builds the frontier for `depth` from the links found one level up
    fn next_frontier(&self, discovered: Vec<Vec<String>>, depth: usize) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut frontier = Vec::new();

        for url in discovered.into_iter().flatten() {
            if self.ledger.is_known(&url) || is_static_asset(&url) || !seen.insert(url.clone()) {
                continue;
            }

            if depth > self.limits.max_depth {
                self.ledger.drop_unclaimed(&url, DropReason::DepthCut);
                continue;
            }

            frontier.push(url);
        }

        frontier
    }

    /// Fetches, records and expands one claimed page
    ///
    /// Returns the normalized, non-asset links of the page.
    async fn process_page(&self, url: &str) -> Vec<String> {
        if self.is_full() {
            self.transition(url, UrlState::Dropped(DropReason::CapReached));
            return Vec::new();
        }

        let html = match fetch_html(&self.client, url).await {
            FetchResult::Success { body, .. } => body,
            failure => {
                tracing::debug!(
                    "Failed to fetch page {}: {}",
                    url,
                    failure.failure_reason().unwrap_or_default()
                );
                self.transition(url, UrlState::Dropped(DropReason::FetchFailed));
                return Vec::new();
            }
        };
        self.transition(url, UrlState::Fetched);

        let html = hydrate(
            self.renderer.as_ref(),
            url,
            html,
            self.limits.csr_threshold_bytes,
        )
        .await;

        let page_url = match Url::parse(url) {
            Ok(page_url) => page_url,
            Err(e) => {
                tracing::debug!("Cannot resolve links of {}: {}", url, e);
                self.transition(url, UrlState::Dropped(DropReason::FetchFailed));
                return Vec::new();
            }
        };
        let parsed = parse_html(&html, &page_url);

        let info = PageInfo::page(
            url,
            parsed.title,
            parsed.description,
            sha256_hex(&parsed.text),
        );
        let hash = info.content_hash.clone();

        if !self.record(info) {
            tracing::debug!("Reached page cap, dropping {}", url);
            self.transition(url, UrlState::Dropped(DropReason::CapReached));
            return Vec::new();
        }
        self.transition(url, UrlState::Recorded);
        tracing::debug!("Recorded page {} (hash: {})", url, hash);

        let links = parsed
            .links
            .iter()
            .filter_map(|link| normalize_url(link))
            .filter(|link| classify_url(link) == PageType::Page)
            .collect();

        for script in &parsed.scripts {
            self.process_asset(script).await;
        }

        links
    }

    /// Fetches and records one `<script src>`; never expanded
    async fn process_asset(&self, raw: &str) {
        let Some(url) = normalize_url(raw) else {
            return;
        };

        if !self.in_scope(&url) {
            tracing::debug!("Skipping out-of-scope script: {}", url);
            self.ledger.drop_unclaimed(&url, DropReason::HostMismatch);
            return;
        }

        if !self.ledger.claim(&url) {
            return;
        }

        if self.is_full() {
            self.transition(&url, UrlState::Dropped(DropReason::CapReached));
            return;
        }

        let bytes = match fetch_asset(&self.client, &url).await {
            FetchResult::Success { body, .. } => body,
            failure => {
                tracing::debug!(
                    "Failed to fetch script {}: {}",
                    url,
                    failure.failure_reason().unwrap_or_default()
                );
                self.transition(&url, UrlState::Dropped(DropReason::FetchFailed));
                return;
            }
        };
        self.transition(&url, UrlState::Fetched);

        if self.record(PageInfo::asset(url.as_str(), sha256_hex(&bytes))) {
            self.transition(&url, UrlState::Recorded);
            tracing::debug!("Recorded script {}", url);
        } else {
            self.transition(&url, UrlState::Dropped(DropReason::CapReached));
        }
    }
}
