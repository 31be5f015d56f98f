//! Main store implementation.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use rusqlite::{Connection, OptionalExtension, params};
use time::OffsetDateTime;
use tracing::{debug, info};

use securityhub_core::KeyValueStore;

use crate::error::{Error, Result};
use crate::schema;

/// One stored key with its last write time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredEntry {
    pub key: String,
    pub value: String,
    pub updated_at: OffsetDateTime,
}

/// SQLite-based key-value store for SecurityHub client state.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl SqliteStore {
    /// Open or create a database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| Error::CreateDirectory {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        info!("Opening database at {}", path.display());
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;
        schema::initialize(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
            path: Some(path.to_path_buf()),
        })
    }

    /// Open the default database location.
    pub fn open_default() -> Result<Self> {
        Self::open(crate::default_db_path())
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::initialize(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            path: None,
        })
    }

    /// Location of the database file, `None` when in memory.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| Error::LockPoisoned)
    }

    /// Read the value stored under `key`.
    pub fn get_value(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn()?;
        let value = conn
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    /// Insert or replace the value under `key`.
    pub fn set_value(&self, key: &str, value: &str) -> Result<()> {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = ?3",
            params![key, value, now],
        )?;
        debug!("Stored {} ({} bytes)", key, value.len());
        Ok(())
    }

    /// Delete `key`. Returns whether it existed.
    pub fn remove_value(&self, key: &str) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM kv WHERE key = ?1", [key])?;
        Ok(deleted > 0)
    }

    /// All keys in lexical order.
    pub fn list_keys(&self) -> Result<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT key FROM kv ORDER BY key")?;
        let keys = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(keys)
    }

    /// All entries with their write times, in key order.
    pub fn entries(&self) -> Result<Vec<StoredEntry>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT key, value, updated_at FROM kv ORDER BY key")?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rows
            .into_iter()
            .map(|(key, value, updated_at)| StoredEntry {
                key,
                value,
                updated_at: OffsetDateTime::from_unix_timestamp(updated_at)
                    .unwrap_or(OffsetDateTime::UNIX_EPOCH),
            })
            .collect())
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> securityhub_core::Result<Option<String>> {
        Ok(self.get_value(key)?)
    }

    fn set(&self, key: &str, value: &str) -> securityhub_core::Result<()> {
        Ok(self.set_value(key, value)?)
    }

    fn remove(&self, key: &str) -> securityhub_core::Result<()> {
        self.remove_value(key)?;
        Ok(())
    }

    fn keys(&self) -> securityhub_core::Result<Vec<String>> {
        Ok(self.list_keys()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_in_memory() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(store.list_keys().unwrap().is_empty());
        assert!(store.path().is_none());
    }

    #[test]
    fn test_set_get_replace() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert_eq!(store.get_value("session").unwrap(), None);

        store.set_value("session", r#"{"token":"a"}"#).unwrap();
        store.set_value("session", r#"{"token":"b"}"#).unwrap();
        assert_eq!(
            store.get_value("session").unwrap().as_deref(),
            Some(r#"{"token":"b"}"#)
        );
        assert_eq!(store.entries().unwrap().len(), 1);
    }

    #[test]
    fn test_remove() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.set_value("systemLogs", "[]").unwrap();
        assert!(store.remove_value("systemLogs").unwrap());
        assert!(!store.remove_value("systemLogs").unwrap());
        assert_eq!(store.get_value("systemLogs").unwrap(), None);
    }

    #[test]
    fn test_keys_sorted() {
        let store = SqliteStore::open_in_memory().unwrap();
        for key in ["stayMode-1", "armedHomes-1", "session"] {
            store.set_value(key, "null").unwrap();
        }
        assert_eq!(
            store.list_keys().unwrap(),
            vec!["armedHomes-1", "session", "stayMode-1"]
        );
    }
}
