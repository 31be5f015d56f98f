//! Persisted system log, newest entry first.

use std::sync::Arc;

use time::OffsetDateTime;

use securityhub_types::SystemLogEntry;

use crate::error::Result;
use crate::persist::{KeyValueStore, SYSTEM_LOGS_KEY, load_json, load_json_strict, save_json};

/// System log stored under the `systemLogs` key.
#[derive(Clone)]
pub struct SystemLog {
    store: Arc<dyn KeyValueStore>,
}

impl SystemLog {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// All entries, newest first. Missing or unreadable logs read as empty.
    pub fn entries(&self) -> Result<Vec<SystemLogEntry>> {
        Ok(load_json(self.store.as_ref(), SYSTEM_LOGS_KEY)?.unwrap_or_default())
    }

    /// Record a message timestamped now.
    pub fn append(&self, message: impl Into<String>) -> Result<SystemLogEntry> {
        self.append_at(message, OffsetDateTime::now_utc())
    }

    /// Record a message with an explicit timestamp.
    ///
    /// Fails with [`crate::Error::Serialization`] when the stored log is
    /// unreadable; the stored value is left as it is.
    pub fn append_at(
        &self,
        message: impl Into<String>,
        timestamp: OffsetDateTime,
    ) -> Result<SystemLogEntry> {
        let entry = SystemLogEntry {
            timestamp,
            message: message.into(),
        };
        let mut entries: Vec<SystemLogEntry> =
            load_json_strict(self.store.as_ref(), SYSTEM_LOGS_KEY)?.unwrap_or_default();
        entries.insert(0, entry.clone());
        save_json(self.store.as_ref(), SYSTEM_LOGS_KEY, &entries)?;
        Ok(entry)
    }

    /// Remove every entry.
    pub fn clear(&self) -> Result<()> {
        self.store.remove(SYSTEM_LOGS_KEY)
    }
}

impl std::fmt::Debug for SystemLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemLog").finish_non_exhaustive()
    }
}
