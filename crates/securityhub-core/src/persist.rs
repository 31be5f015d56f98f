//! Key-value persistence port.
//!
//! Session data, home-board flags and the system log are stored as JSON
//! strings under well-known keys. [`MemoryStore`] keeps them in memory; the
//! `securityhub-store` crate provides a SQLite-backed implementation.

use std::collections::BTreeMap;
use std::sync::RwLock;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::{Error, Result};

/// Key of the persisted login session.
pub const SESSION_KEY: &str = "session";

/// Key of the persisted system log.
pub const SYSTEM_LOGS_KEY: &str = "systemLogs";

/// Key of a client's per-site armed flags.
pub fn armed_homes_key(client_id: u32) -> String {
    format!("armedHomes-{}", client_id)
}

/// Key of a client's per-site stay-mode flags.
pub fn stay_mode_key(client_id: u32) -> String {
    format!("stayMode-{}", client_id)
}

/// String key-value storage.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a key; removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;

    /// All keys, sorted.
    fn keys(&self) -> Result<Vec<String>>;
}

/// Read and deserialize a JSON value.
///
/// Returns `Ok(None)` when the key is missing. A stored value that does not
/// parse is logged and treated as missing.
pub fn load_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Result<Option<T>> {
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            warn!("Ignoring unreadable value under '{}': {}", key, e);
            Ok(None)
        }
    }
}

/// Read and deserialize a JSON value, failing on a value that does not parse.
///
/// Returns `Ok(None)` only when the key is missing.
pub fn load_json_strict<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>> {
    match store.get(key)? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Serialize a value as JSON and store it.
pub fn save_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<()> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw)
}

/// In-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> Error {
    Error::Persistence("memory store lock poisoned".to_string())
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.read().map_err(|_| poisoned())?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        let entries = self.entries.read().map_err(|_| poisoned())?;
        Ok(entries.keys().cloned().collect())
    }
}
