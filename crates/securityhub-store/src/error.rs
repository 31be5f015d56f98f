//! Error types for securityhub-store.

use std::path::PathBuf;

/// Result type for securityhub-store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in securityhub-store.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Database error from SQLite.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Failed to create database directory.
    #[error("Failed to create database directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The connection mutex was poisoned by a panicking writer.
    #[error("Database connection lock poisoned")]
    LockPoisoned,
}

impl From<Error> for securityhub_core::Error {
    fn from(err: Error) -> Self {
        securityhub_core::Error::Persistence(err.to_string())
    }
}
