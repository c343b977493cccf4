//! Periodic re-crawl of every monitored site
//!
//! Cycles run with a fixed delay: the next cycle starts `interval` after
//! the previous one finished, so cycles never overlap and every site is
//! updated by one call at a time.

use super::service::SnapshotService;
use crate::crawler::{ShutdownHandle, SiteCrawler};
use crate::storage::SnapshotStore;
use std::sync::Arc;
use std::time::Duration;

/// Default delay between two cycles
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(30_000);

/// Outcome of one monitoring cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub sites: usize,
    pub updated: usize,
    pub failed: usize,
}

/// Runs `crawl_and_update` for every site on a fixed delay
pub struct Monitor<C, S> {
    service: Arc<SnapshotService<C, S>>,
    configured_sites: Vec<String>,
    interval: Duration,
}

impl<C: SiteCrawler, S: SnapshotStore> Monitor<C, S> {
    /// Creates a monitor
    ///
    /// # Arguments
    ///
    /// * `service` - The snapshot service to drive
    /// * `configured_sites` - Sites to monitor even before their first snapshot
    /// * `interval` - Delay between the end of a cycle and the next one
    pub fn new(
        service: Arc<SnapshotService<C, S>>,
        configured_sites: Vec<String>,
        interval: Duration,
    ) -> Self {
        Self {
            service,
            configured_sites,
            interval,
        }
    }

    /// Sites covered by the next cycle
    ///
    /// Stored sites come first, then configured sites not stored yet. A
    /// store failure is logged and only the configured sites are used.
    pub fn sites(&self) -> Vec<String> {
        let mut sites = match self.service.base_urls() {
            Ok(urls) => urls,
            Err(e) => {
                tracing::error!("Could not list monitored sites: {}", e);
                Vec::new()
            }
        };

        for site in &self.configured_sites {
            if !sites.contains(site) {
                sites.push(site.clone());
            }
        }

        sites
    }

    /// Runs one cycle over every site
    ///
    /// A failing site is logged and does not stop the cycle.
    pub async fn run_cycle(&self) -> CycleReport {
        let sites = self.sites();
        let mut report = CycleReport {
            sites: sites.len(),
            ..CycleReport::default()
        };

        tracing::debug!("Monitoring cycle over {} sites", sites.len());

        for site in &sites {
            match self.service.crawl_and_update(site).await {
                Ok(diff) => {
                    report.updated += 1;
                    if !diff.is_empty() {
                        tracing::info!("Changes on {}: {}", site, diff);
                    }
                }
                Err(e) => {
                    report.failed += 1;
                    tracing::error!("Update of {} failed: {}", site, e);
                }
            }
        }

        report
    }

    /// Runs cycles until `shutdown` fires
    ///
    /// The first cycle starts immediately. Shutdown interrupts both a
    /// running cycle and the delay between cycles.
    pub async fn run(&self, shutdown: ShutdownHandle) {
        tracing::info!(
            "Monitor started, delay between cycles: {:?}",
            self.interval
        );

        while !shutdown.is_shutdown() {
            tokio::select! {
                report = self.run_cycle() => {
                    tracing::info!(
                        "Cycle finished: {} sites, {} updated, {} failed",
                        report.sites,
                        report.updated,
                        report.failed
                    );
                }
                _ = shutdown.cancelled() => break,
            }

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = shutdown.cancelled() => break,
            }
        }

        tracing::info!("Monitor stopped");
    }
}
