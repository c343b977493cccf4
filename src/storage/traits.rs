//! Storage traits and error types
//!
//! This module defines the trait interface for snapshot storage backends and
//! associated error types.

use crate::state::PageInfo;
use crate::storage::{PageRecord, Snapshot};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Snapshot not found: {0}")]
    SnapshotNotFound(i64),

    #[error("Corrupt row: {0}")]
    Corrupt(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for snapshot storage backends
///
/// Snapshots are immutable once saved. A snapshot and its pages are written
/// in one transaction, so a partially written snapshot is never visible to
/// readers.
pub trait SnapshotStore {
    /// Gets the most recent snapshot of a site
    ///
    /// # Returns
    ///
    /// * `Ok(Some(Snapshot))` - The newest snapshot for `base_url`
    /// * `Ok(None)` - The site was never crawled (or was reset)
    fn latest_snapshot(&self, base_url: &str) -> StorageResult<Option<Snapshot>>;

    /// Gets every page record of a snapshot, in the order they were saved
    fn pages_of_snapshot(&self, snapshot_id: i64) -> StorageResult<Vec<PageRecord>>;

    /// Persists a new snapshot with its pages atomically
    ///
    /// # Arguments
    ///
    /// * `base_url` - The site the crawl was for
    /// * `pages` - The crawl records, in discovery order
    ///
    /// # Returns
    ///
    /// The saved snapshot, with its id and creation time
    fn save_snapshot(&mut self, base_url: &str, pages: &[PageInfo]) -> StorageResult<Snapshot>;

    /// Deletes every snapshot and page record of a site
    ///
    /// Returns the number of snapshots removed.
    fn delete_by_base_url(&mut self, base_url: &str) -> StorageResult<usize>;

    /// Lists every site with at least one snapshot, oldest first
    fn all_base_urls(&self) -> StorageResult<Vec<String>>;
}
