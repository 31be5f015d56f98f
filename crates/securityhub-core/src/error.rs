//! Error types for securityhub-core.
//!
//! Every failure of the pipeline is one of three kinds as far as the user is
//! concerned:
//!
//! | Error | Meaning | Recovery |
//! |-------|---------|----------|
//! | [`Error::Network`] | Request could not be sent or the connection dropped | Next scheduled poll |
//! | [`Error::Http`] | Server answered with a non-2xx status | Next poll; 5xx are transient |
//! | [`Error::Protocol`] | Body missing expected fields or not JSON | Do not retry; report |
//!
//! None of them is fatal to a running [`crate::SiteMonitor`]: the view keeps
//! its last-known sensor values and shows a banner until the next successful
//! fetch. The remaining variants cover local concerns (configuration, input
//! validation, persistence).

use thiserror::Error;

use securityhub_types::ParseError;

/// Errors that can occur in the SecurityHub client.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The request could not be sent or the connection failed.
    #[error("Server not reachable at {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The response body did not have the expected shape.
    #[error("Unexpected response: {0}")]
    Protocol(String),

    /// Invalid base URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Rejected user input (blank credentials, out-of-range index, ...).
    #[error("{0}")]
    InvalidInput(String),

    /// Invalid configuration values.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// No client with this id in the directory.
    #[error("Invalid Client ID: {0}")]
    UnknownClient(u32),

    /// No site with this id in the directory.
    #[error("Invalid Site ID: {0}")]
    UnknownSite(String),

    /// The persistence backend failed.
    #[error("Storage error: {0}")]
    Persistence(String),

    /// Persisted or transmitted JSON could not be (de)serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The owning view was stopped before the operation completed.
    #[error("Operation cancelled")]
    Cancelled,
}

impl Error {
    /// Whether the failure is expected to clear up on its own by the next poll.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Network { .. } => true,
            Error::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Build a protocol error from any displayable cause.
    pub fn protocol(message: impl std::fmt::Display) -> Self {
        Error::Protocol(message.to_string())
    }
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::UnknownMode(_) | ParseError::EmptySensorKey => {
                Error::InvalidInput(err.to_string())
            }
            other => Error::Protocol(other.to_string()),
        }
    }
}

/// Result type alias using securityhub-core's Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        let server = Error::Http {
            status: 503,
            message: "Service Unavailable".to_string(),
        };
        let client = Error::Http {
            status: 401,
            message: "Invalid token.".to_string(),
        };
        assert!(server.is_transient());
        assert!(!client.is_transient());
        assert!(!Error::Protocol("no token".to_string()).is_transient());
        assert!(!Error::Cancelled.is_transient());
    }

    #[test]
    fn test_parse_error_conversion() {
        let err: Error = ParseError::UnknownMode("panic".to_string()).into();
        assert!(matches!(err, Error::InvalidInput(_)));

        let err: Error = ParseError::InvalidSnapshot("bad".to_string()).into();
        assert!(matches!(err, Error::Protocol(_)));
    }

    #[test]
    fn test_display_messages() {
        assert_eq!(Error::UnknownClient(7).to_string(), "Invalid Client ID: 7");
        assert_eq!(
            Error::InvalidInput("Please enter both username and password.".to_string())
                .to_string(),
            "Please enter both username and password."
        );
    }
}
