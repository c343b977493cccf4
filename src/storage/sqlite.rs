//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the SnapshotStore trait.

use crate::state::{PageInfo, PageType};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{SnapshotStore, StorageError, StorageResult};
use crate::storage::{PageRecord, Snapshot};
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Creates a new SqliteStore instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStore)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Gets a snapshot by ID
    pub fn get_snapshot(&self, snapshot_id: i64) -> StorageResult<Snapshot> {
        let row = self
            .conn
            .query_row(
                "SELECT id, base_url, created_at FROM snapshots WHERE id = ?1",
                params![snapshot_id],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?;

        match row {
            Some(raw) => snapshot_from_row(raw),
            None => Err(StorageError::SnapshotNotFound(snapshot_id)),
        }
    }
}

impl SnapshotStore for SqliteStore {
    fn latest_snapshot(&self, base_url: &str) -> StorageResult<Option<Snapshot>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, base_url, created_at FROM snapshots
                 WHERE base_url = ?1
                 ORDER BY id DESC
                 LIMIT 1",
                params![base_url],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?;

        row.map(snapshot_from_row).transpose()
    }

    fn pages_of_snapshot(&self, snapshot_id: i64) -> StorageResult<Vec<PageRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT snapshot_id, url, title, description, content_hash, page_type
             FROM pages WHERE snapshot_id = ?1 ORDER BY id",
        )?;

        let rows = stmt
            .query_map(params![snapshot_id], |row| {
                Ok((
                    PageRecord {
                        snapshot_id: row.get(0)?,
                        url: row.get(1)?,
                        title: row.get(2)?,
                        description: row.get(3)?,
                        content_hash: row.get(4)?,
                        page_type: PageType::Page,
                    },
                    row.get::<_, String>(5)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(mut record, page_type)| {
                record.page_type = PageType::from_db_string(&page_type).ok_or_else(|| {
                    StorageError::Corrupt(format!(
                        "unknown page type '{}' for {}",
                        page_type, record.url
                    ))
                })?;
                Ok(record)
            })
            .collect()
    }

    fn save_snapshot(&mut self, base_url: &str, pages: &[PageInfo]) -> StorageResult<Snapshot> {
        // Stored with microsecond precision
        let created_at = Utc::now().trunc_subsecs(6);
        let tx = self.conn.transaction()?;

        tx.execute(
            "INSERT INTO snapshots (base_url, created_at) VALUES (?1, ?2)",
            params![base_url, to_db_time(&created_at)],
        )?;
        let id = tx.last_insert_rowid();

        {
            let mut stmt = tx.prepare(
                "INSERT INTO pages (snapshot_id, url, title, description, content_hash, page_type)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;

            for page in pages {
                stmt.execute(params![
                    id,
                    page.url,
                    page.title,
                    page.description,
                    page.content_hash,
                    page.page_type.to_db_string(),
                ])?;
            }
        }

        tx.commit()?;

        tracing::debug!(
            "Saved snapshot {} for {} with {} pages",
            id,
            base_url,
            pages.len()
        );

        Ok(Snapshot {
            id,
            base_url: base_url.to_string(),
            created_at,
        })
    }

    fn delete_by_base_url(&mut self, base_url: &str) -> StorageResult<usize> {
        let tx = self.conn.transaction()?;

        tx.execute(
            "DELETE FROM pages WHERE snapshot_id IN (SELECT id FROM snapshots WHERE base_url = ?1)",
            params![base_url],
        )?;
        let removed = tx.execute(
            "DELETE FROM snapshots WHERE base_url = ?1",
            params![base_url],
        )?;

        tx.commit()?;

        tracing::debug!("Deleted {} snapshots for {}", removed, base_url);
        Ok(removed)
    }

    fn all_base_urls(&self) -> StorageResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT base_url FROM snapshots GROUP BY base_url ORDER BY MIN(id)",
        )?;

        let urls = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;

        Ok(urls)
    }
}

fn to_db_time(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn snapshot_from_row((id, base_url, created_at): (i64, String, String)) -> StorageResult<Snapshot> {
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map_err(|e| StorageError::Corrupt(format!("snapshot {} created_at: {}", id, e)))?
        .with_timezone(&Utc);

    Ok(Snapshot {
        id,
        base_url,
        created_at,
    })
}
