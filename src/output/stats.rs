//! Statistics generation from the snapshot database
//!
//! This module provides functionality for extracting and displaying
//! per-site statistics from the storage layer.

use crate::state::PageType;
use crate::storage::{SnapshotStore, StorageResult};
use chrono::{DateTime, Utc};

/// Summary of the latest snapshot of one site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteStatistics {
    /// The monitored site
    pub base_url: String,

    /// Latest snapshot id, `None` if the site was never crawled
    pub snapshot_id: Option<i64>,

    /// When the latest snapshot was taken
    pub taken_at: Option<DateTime<Utc>>,

    /// Number of HTML pages in the latest snapshot
    pub pages: usize,

    /// Number of static assets in the latest snapshot
    pub assets: usize,

    /// Number of pages with a meta description
    pub described: usize,
}

/// Loads statistics for every site in the store plus `extra_sites`
///
/// Sites known to the store come first; configured sites that were never
/// crawled are listed after them with empty counts.
///
/// # Arguments
///
/// * `store` - The snapshot store to query
/// * `extra_sites` - Configured sites, possibly not crawled yet
///
/// # Returns
///
/// * `Ok(Vec<SiteStatistics>)` - One entry per site
/// * `Err(StorageError)` - Failed to query the store
pub fn load_statistics<S: SnapshotStore + ?Sized>(
    store: &S,
    extra_sites: &[String],
) -> StorageResult<Vec<SiteStatistics>> {
    let mut sites = store.all_base_urls()?;
    for site in extra_sites {
        if !sites.contains(site) {
            sites.push(site.clone());
        }
    }

    let mut stats = Vec::with_capacity(sites.len());

    for base_url in sites {
        let Some(snapshot) = store.latest_snapshot(&base_url)? else {
            stats.push(SiteStatistics {
                base_url,
                snapshot_id: None,
                taken_at: None,
                pages: 0,
                assets: 0,
                described: 0,
            });
            continue;
        };

        let records = store.pages_of_snapshot(snapshot.id)?;
        let assets = records
            .iter()
            .filter(|r| r.page_type == PageType::StaticAsset)
            .count();
        let described = records.iter().filter(|r| r.description.is_some()).count();

        stats.push(SiteStatistics {
            base_url,
            snapshot_id: Some(snapshot.id),
            taken_at: Some(snapshot.created_at),
            pages: records.len() - assets,
            assets,
            described,
        });
    }

    Ok(stats)
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &[SiteStatistics]) {
    println!("=== Monitored Sites ===\n");

    if stats.is_empty() {
        println!("No sites have been crawled yet.");
        return;
    }

    for site in stats {
        println!("{}", site.base_url);
        match (site.snapshot_id, site.taken_at) {
            (Some(id), Some(taken_at)) => {
                println!("  Latest snapshot: #{} at {}", id, taken_at.to_rfc3339());
                println!("  Pages: {}", site.pages);
                println!("  Static assets: {}", site.assets);

                let coverage = if site.pages > 0 {
                    (site.described as f64 / site.pages as f64) * 100.0
                } else {
                    0.0
                };
                println!(
                    "  With description: {} ({:.1}%)",
                    site.described, coverage
                );
            }
            _ => println!("  Not crawled yet"),
        }
        println!();
    }

    let total_pages: usize = stats.iter().map(|s| s.pages).sum();
    let total_assets: usize = stats.iter().map(|s| s.assets).sum();
    println!(
        "Total: {} sites, {} pages, {} static assets",
        stats.len(),
        total_pages,
        total_assets
    );
}
