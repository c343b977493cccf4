//! Storage module for persisting snapshots
//!
//! This module handles all database operations for the monitor, including:
//! - SQLite database initialization and schema management
//! - Atomic persistence of a snapshot together with its page records
//! - Lookup of the latest snapshot per site
//! - Hard reset of every snapshot of a site

mod schema;
mod sqlite;
mod traits;

pub use schema::{initialize_schema, SCHEMA_VERSION};
pub use sqlite::SqliteStore;
pub use traits::{SnapshotStore, StorageError, StorageResult};

use crate::state::{PageInfo, PageType};
use chrono::{DateTime, Utc};
use std::path::Path;

/// Opens (or creates) the snapshot database at `path`
pub fn open_store(path: &Path) -> StorageResult<SqliteStore> {
    SqliteStore::new(path)
}

/// One persisted crawl of one site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub id: i64,
    pub base_url: String,
    pub created_at: DateTime<Utc>,
}

/// A page or asset of a persisted snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRecord {
    pub snapshot_id: i64,
    pub url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub content_hash: String,
    pub page_type: PageType,
}

impl PageRecord {
    /// Builds the record of `info` inside snapshot `snapshot_id`
    pub fn from_page_info(snapshot_id: i64, info: &PageInfo) -> Self {
        Self {
            snapshot_id,
            url: info.url.clone(),
            title: info.title.clone(),
            description: info.description.clone(),
            content_hash: info.content_hash.clone(),
            page_type: info.page_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_from_page_info() {
        let info = PageInfo::page("https://example.com/", "Home", Some("Desc".into()), "abc");
        let record = PageRecord::from_page_info(7, &info);

        assert_eq!(record.snapshot_id, 7);
        assert_eq!(record.url, "https://example.com/");
        assert_eq!(record.title.as_deref(), Some("Home"));
        assert_eq!(record.description.as_deref(), Some("Desc"));
        assert_eq!(record.content_hash, "abc");
        assert_eq!(record.page_type, PageType::Page);
    }

    #[test]
    fn test_open_store_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshots.db");

        let store = open_store(&path).unwrap();
        assert!(store.all_base_urls().unwrap().is_empty());
        assert!(path.exists());
    }
}
