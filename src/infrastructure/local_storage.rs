//! Local SQLite storage for quotes.
//!
//! Exposes a small key/value surface (one serialized value per key) plus the
//! single-row sync state. The same schema backs both the on-disk store and
//! the in-memory session store.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::domain::{AppError, Result, SyncState};

/// Local storage repository using SQLite.
pub struct LocalStorage {
    conn: Connection,
}

impl LocalStorage {
    /// Opens or creates the local storage database.
    ///
    /// # Errors
    /// Returns error if database cannot be opened or schema creation fails.
    pub fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| AppError::io("Failed to create storage directory", e))?;
        }

        let conn = Connection::open(path).map_err(AppError::database)?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )
        .map_err(AppError::database)?;

        let storage = Self { conn };
        storage.init_schema()?;

        tracing::debug!(path = %path.display(), "Opened quote storage");

        Ok(storage)
    }

    /// Opens a storage that lives only as long as this value.
    ///
    /// # Errors
    /// Returns error if schema creation fails.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(AppError::database)?;
        let storage = Self { conn };
        storage.init_schema()?;
        Ok(storage)
    }

    /// Initialize database schema.
    fn init_schema(&self) -> Result<()> {
        self.conn
            .execute_batch(
                r"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE IF NOT EXISTS sync_state (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                last_sync TEXT,
                last_remote_count INTEGER NOT NULL DEFAULT 0,
                quote_count INTEGER NOT NULL DEFAULT 0,
                is_syncing INTEGER NOT NULL DEFAULT 0,
                last_error TEXT
            );

            INSERT OR IGNORE INTO sync_state (id) VALUES (1);
            ",
            )
            .map_err(AppError::database)?;

        Ok(())
    }

    /// Read the value stored under `key`.
    pub fn get_value(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()
            .map_err(AppError::database)
    }

    /// Store `value` under `key`, replacing any previous value.
    pub fn set_value(&self, key: &str, value: &str) -> Result<()> {
        self.conn
            .execute(
                r"
            INSERT INTO kv (key, value) VALUES (?1, ?2)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = datetime('now')
            ",
                params![key, value],
            )
            .map_err(AppError::database)?;

        Ok(())
    }

    /// Get sync state.
    pub fn get_sync_state(&self) -> Result<SyncState> {
        self.conn
            .query_row(
                r"
            SELECT last_sync, last_remote_count, quote_count, is_syncing, last_error
            FROM sync_state WHERE id = 1
            ",
                [],
                |row| {
                    let last_sync_str: Option<String> = row.get(0)?;
                    let last_sync = last_sync_str
                        .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
                        .map(|dt| dt.with_timezone(&Utc));

                    Ok(SyncState {
                        last_sync,
                        last_remote_count: row.get::<_, i64>(1)? as usize,
                        quote_count: row.get::<_, i64>(2)? as usize,
                        is_syncing: row.get::<_, i32>(3)? != 0,
                        last_error: row.get(4)?,
                    })
                },
            )
            .map_err(AppError::database)
    }

    /// Update sync state.
    pub fn update_sync_state(&self, state: &SyncState) -> Result<()> {
        self.conn
            .execute(
                r"
            UPDATE sync_state SET
                last_sync = ?1,
                last_remote_count = ?2,
                quote_count = ?3,
                is_syncing = ?4,
                last_error = ?5
            WHERE id = 1
            ",
                params![
                    state.last_sync.map(|dt| dt.to_rfc3339()),
                    state.last_remote_count as i64,
                    state.quote_count as i64,
                    i32::from(state.is_syncing),
                    &state.last_error,
                ],
            )
            .map_err(AppError::database)?;

        Ok(())
    }

    /// Get total storage size in bytes (0 for in-memory storage).
    pub fn get_storage_size(&self) -> Result<u64> {
        let path = match self.conn.path() {
            Some(p) if !p.is_empty() => Path::new(p),
            _ => return Ok(0),
        };
        let metadata = std::fs::metadata(path)
            .map_err(|e| AppError::io("Failed to get storage size", e))?;
        Ok(metadata.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_open_creates_schema() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("nested").join("test.db");

        let storage = LocalStorage::open(&db_path).unwrap();

        let count: i64 = storage
            .conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table'",
                [],
                |row| row.get(0),
            )
            .unwrap();

        assert_eq!(count, 2);
        assert!(storage.get_storage_size().unwrap() > 0);
    }

    #[test]
    fn test_value_roundtrip_and_overwrite() {
        let storage = LocalStorage::open_in_memory().unwrap();

        assert_eq!(storage.get_value("k").unwrap(), None);

        storage.set_value("k", "one").unwrap();
        storage.set_value("k", "two").unwrap();
        assert_eq!(storage.get_value("k").unwrap().as_deref(), Some("two"));
    }

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");

        LocalStorage::open(&db_path)
            .unwrap()
            .set_value("selected_category", "Motivation")
            .unwrap();

        let reopened = LocalStorage::open(&db_path).unwrap();
        assert_eq!(
            reopened.get_value("selected_category").unwrap().as_deref(),
            Some("Motivation")
        );
    }

    #[test]
    fn test_sync_state_roundtrip() {
        let storage = LocalStorage::open_in_memory().unwrap();

        let state = SyncState {
            last_remote_count: 4,
            quote_count: 7,
            ..SyncState::default()
        }
        .with_sync_time()
        .with_error("timeout");

        storage.update_sync_state(&state).unwrap();
        let loaded = storage.get_sync_state().unwrap();

        assert!(!loaded.is_syncing);
        assert!(loaded.last_sync.is_some());
        assert_eq!(loaded.last_remote_count, 4);
        assert_eq!(loaded.quote_count, 7);
        assert_eq!(loaded.last_error.as_deref(), Some("timeout"));
    }

    #[test]
    fn test_in_memory_size_is_zero() {
        let storage = LocalStorage::open_in_memory().unwrap();
        assert_eq!(storage.get_storage_size().unwrap(), 0);
    }
}
