//! SQLite-backed selection store.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use super::{SavedSelection, SelectionStore, StoreError, STATE_KEY};

/// SQLite-backed selection store.
pub struct SqliteSelectionStore {
    conn: Mutex<Connection>,
}

impl SqliteSelectionStore {
    /// Open (or create) the database file and its tables.
    pub fn new(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|e| StoreError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn =
            Connection::open_in_memory().map_err(|e| StoreError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )
        .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Database("connection lock poisoned".to_string()))
    }
}

impl SelectionStore for SqliteSelectionStore {
    fn load(&self) -> Result<Option<SavedSelection>, StoreError> {
        let conn = self.conn()?;
        let value: Option<String> = conn
            .query_row(
                "SELECT value FROM kv WHERE key = ?1",
                params![STATE_KEY],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| StoreError::Database(e.to_string()))?;

        value
            .map(|json| {
                serde_json::from_str(&json).map_err(|e| StoreError::Serialization(e.to_string()))
            })
            .transpose()
    }

    fn save(&self, selection: &SavedSelection) -> Result<(), StoreError> {
        let json = serde_json::to_string(selection)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
            params![STATE_KEY, json, Utc::now().to_rfc3339()],
        )
        .map_err(|e| StoreError::Database(e.to_string()))?;

        debug!(pool = selection.pool.len(), k = selection.k, m = selection.m, "Saved selection");
        Ok(())
    }

    fn clear(&self) -> Result<bool, StoreError> {
        let conn = self.conn()?;
        let removed = conn
            .execute("DELETE FROM kv WHERE key = ?1", params![STATE_KEY])
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(removed > 0)
    }
}
