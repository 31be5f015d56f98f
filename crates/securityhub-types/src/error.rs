//! Error types for data parsing in securityhub-types.

use thiserror::Error;

/// Errors that can occur when parsing SecurityHub data.
///
/// This error type is transport-agnostic and does not include
/// HTTP-specific errors (those belong in securityhub-core).
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// Unknown arming mode name.
    #[error("Unknown mode '{0}'. Valid modes: stay, away, disarm")]
    UnknownMode(String),

    /// A sensor-status payload was not shaped as expected.
    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),

    /// An empty sensor key.
    #[error("Sensor key must not be empty")]
    EmptySensorKey,
}

/// Result type alias using securityhub-types' ParseError type.
pub type ParseResult<T> = std::result::Result<T, ParseError>;
