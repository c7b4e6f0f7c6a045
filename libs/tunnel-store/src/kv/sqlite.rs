//! SQLite-backed key-value medium.

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use super::KeyValueStore;
use crate::error::StorageError;

/// Key-value store in a single SQLite table.
pub struct SqliteKv {
    conn: Connection,
}

impl SqliteKv {
    /// Open or create a database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;

        // Every write must be on disk before the call returns
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=FULL;")?;

        let store = Self { conn };
        store.init_schema()?;

        Ok(store)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<(), StorageError> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            "#,
        )?;

        debug!("Tunnel store schema initialized");
        Ok(())
    }
}

impl KeyValueStore for SqliteKv {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.conn
            .query_row(
                "SELECT value FROM kv WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .map_err(Into::into)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn.execute(
            r#"
            INSERT INTO kv (key, value) VALUES (?1, ?2)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            "#,
            params![key, value],
        )?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_sqlite_kv_in_memory() {
        let kv = SqliteKv::open_in_memory().unwrap();
        assert!(kv.get("missing").unwrap().is_none());

        kv.set("tunnelStatus", "CONNECTED").unwrap();
        assert_eq!(kv.get("tunnelStatus").unwrap().as_deref(), Some("CONNECTED"));

        // Upsert
        kv.set("tunnelStatus", "RECONNECTING").unwrap();
        assert_eq!(
            kv.get("tunnelStatus").unwrap().as_deref(),
            Some("RECONNECTING")
        );

        kv.delete("tunnelStatus").unwrap();
        assert!(kv.get("tunnelStatus").unwrap().is_none());
    }

    #[test]
    fn test_sqlite_kv_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.db");

        {
            let kv = SqliteKv::open(&path).unwrap();
            kv.set("udpSupported", "true").unwrap();
        }

        let kv = SqliteKv::open(&path).unwrap();
        assert_eq!(kv.get("udpSupported").unwrap().as_deref(), Some("true"));
    }

    #[test]
    fn test_sqlite_kv_rejects_garbage_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.db");
        std::fs::write(&path, b"this is definitely not a sqlite database file").unwrap();

        assert!(matches!(
            SqliteKv::open(&path),
            Err(StorageError::Sqlite(_))
        ));
    }
}
