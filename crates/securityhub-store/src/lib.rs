//! Local persistence for SecurityHub client state.
//!
//! This crate provides a SQLite-backed [`KeyValueStore`](securityhub_core::KeyValueStore)
//! so the session, home board flags and system log survive restarts.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use securityhub_core::SessionStore;
//! use securityhub_store::SqliteStore;
//!
//! let store = Arc::new(SqliteStore::open_default()?);
//! let sessions = SessionStore::new(store);
//! if let Some(session) = sessions.load()? {
//!     println!("logged in as {}", session.username);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod error;
mod schema;
mod store;

pub use error::{Error, Result};
pub use store::{SqliteStore, StoredEntry};

/// Default database path following platform conventions.
///
/// - Linux: `~/.local/share/securityhub/state.db`
/// - macOS: `~/Library/Application Support/securityhub/state.db`
/// - Windows: `C:\Users\<user>\AppData\Local\securityhub\state.db`
pub fn default_db_path() -> std::path::PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("securityhub")
        .join("state.db")
}
