//! Crawl, persist and diff cycle for one site
//!
//! The service owns a crawler, a snapshot store and a text generator. It is
//! the only place where crawl results meet persisted state.
//!
//! Calls for the same base URL must not overlap; the caller (normally the
//! [`Monitor`](super::Monitor)) serializes them.

use super::diff::{compute_diff, fingerprint_map, DiffReport};
use crate::crawler::{CrawlResult, SiteCrawler};
use crate::output::{load_statistics, LlmsTxtGenerator, SiteStatistics, TextGenerator};
use crate::storage::{PageRecord, Snapshot, SnapshotStore};
use crate::url::parse_strict;
use crate::{MonitorError, Result};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Coordinates crawls with the snapshot store
pub struct SnapshotService<C, S> {
    crawler: C,
    store: Mutex<S>,
    generator: Box<dyn TextGenerator>,
}

impl<C: SiteCrawler, S: SnapshotStore> SnapshotService<C, S> {
    /// Creates a service that renders `llms.txt` with [`LlmsTxtGenerator`]
    pub fn new(crawler: C, store: S) -> Self {
        Self::with_generator(crawler, store, Box::new(LlmsTxtGenerator))
    }

    /// Creates a service with a custom text generator
    pub fn with_generator(crawler: C, store: S, generator: Box<dyn TextGenerator>) -> Self {
        Self {
            crawler,
            store: Mutex::new(store),
            generator,
        }
    }

    /// Returns the crawler
    pub fn crawler(&self) -> &C {
        &self.crawler
    }

    /// Crawls a site, stores the snapshot and reports what changed
    ///
    /// # Flow
    ///
    /// 1. Validate `base_url`
    /// 2. Load the latest snapshot of the site and its pages, if any
    /// 3. Crawl and persist a new snapshot
    /// 4. Without a prior snapshot every crawled URL is reported as added;
    ///    otherwise the two fingerprint maps are diffed
    ///
    /// # Errors
    ///
    /// * `MonitorError::InvalidBaseUrl` - `base_url` is not an absolute URL
    ///   with a host; nothing is crawled or stored
    /// * `MonitorError::Storage` - reading the prior snapshot or saving the
    ///   new one failed; no partial snapshot is left behind
    /// * `MonitorError::Interrupted` - shutdown cut the crawl short; nothing
    ///   is stored
    pub async fn crawl_and_update(&self, base_url: &str) -> Result<DiffReport> {
        validate_base_url(base_url)?;

        let prior = self.prior_pages(base_url)?;

        let result = self.crawler.crawl(base_url).await;
        let snapshot = self.persist(&result)?;

        let report = match prior {
            None => {
                tracing::info!("First snapshot of {} taken", base_url);
                DiffReport::all_added(result.pages.iter().map(|p| p.url.as_str()))
            }
            Some(prior_pages) => {
                let old = fingerprint_map(
                    prior_pages
                        .iter()
                        .map(|p| (p.url.as_str(), p.content_hash.as_str())),
                );
                let new = fingerprint_map(result.fingerprints());
                compute_diff(&old, &new)
            }
        };

        tracing::info!(
            "Snapshot {} of {}: {}",
            snapshot.id,
            base_url,
            report
        );

        Ok(report)
    }

    /// Crawls a site and stores the snapshot without diffing
    pub async fn crawl_and_store(&self, base_url: &str) -> Result<Snapshot> {
        validate_base_url(base_url)?;

        let result = self.crawler.crawl(base_url).await;
        self.persist(&result)
    }

    /// Deletes every snapshot of a site, then crawls it from scratch
    pub async fn recrawl_fresh(&self, base_url: &str) -> Result<Snapshot> {
        validate_base_url(base_url)?;

        let removed = self.lock_store().delete_by_base_url(base_url)?;
        tracing::info!("Removed {} snapshots of {}", removed, base_url);

        self.crawl_and_store(base_url).await
    }

    /// Renders the latest snapshot of a site as `llms.txt`
    ///
    /// # Errors
    ///
    /// * `MonitorError::NotFound` - the site has no snapshot
    pub fn latest_text(&self, base_url: &str) -> Result<String> {
        let pages = self.latest_pages(base_url)?;
        Ok(self.generator.generate(base_url, Some(&pages)))
    }

    /// Returns the page records of the latest snapshot of a site
    pub fn latest_pages(&self, base_url: &str) -> Result<Vec<PageRecord>> {
        self.prior_pages(base_url)?
            .ok_or_else(|| MonitorError::NotFound {
                base_url: base_url.to_string(),
            })
    }

    /// Lists every site with at least one snapshot
    pub fn base_urls(&self) -> Result<Vec<String>> {
        Ok(self.lock_store().all_base_urls()?)
    }

    /// Per-site statistics for stored sites plus `extra_sites`
    pub fn statistics(&self, extra_sites: &[String]) -> Result<Vec<SiteStatistics>> {
        Ok(load_statistics(&*self.lock_store(), extra_sites)?)
    }

    fn prior_pages(&self, base_url: &str) -> Result<Option<Vec<PageRecord>>> {
        let store = self.lock_store();
        let Some(snapshot) = store.latest_snapshot(base_url)? else {
            return Ok(None);
        };
        let pages = store.pages_of_snapshot(snapshot.id)?;
        Ok(Some(pages))
    }

    fn persist(&self, result: &CrawlResult) -> Result<Snapshot> {
        if result.interrupted {
            return Err(MonitorError::Interrupted {
                base_url: result.base_url.clone(),
            });
        }

        let snapshot = self
            .lock_store()
            .save_snapshot(&result.base_url, &result.pages)?;
        Ok(snapshot)
    }

    fn lock_store(&self) -> MutexGuard<'_, S> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Checks that `base_url` is an absolute URL with a host
pub fn validate_base_url(base_url: &str) -> Result<()> {
    let url = parse_strict(base_url).map_err(|e| MonitorError::InvalidBaseUrl {
        url: base_url.to_string(),
        reason: e.to_string(),
    })?;

    if url.host_str().map_or(true, str::is_empty) {
        return Err(MonitorError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: "URL has no host".to_string(),
        });
    }

    Ok(())
}
