//! Client library for SecurityHub security monitoring sites.
//!
//! This crate implements the sensor synchronization pipeline of a SecurityHub
//! site: it polls the remote API for sensor snapshots, merges them into
//! accumulated per-sensor state, projects that state into chart series, and
//! sends mode and sensor commands.
//!
//! # Features
//!
//! - **API client**: timed snapshot fetches, commands and login over HTTP
//! - **State merging**: history buffers, pulse rates, uptime and disconnect detection
//! - **Charts**: pure projection of sensor history into labelled series
//! - **Commands**: per-field state machines where the latest command always wins
//! - **Site monitor**: cancellable polling with watch-channel subscriptions
//! - **Persistence port**: session, home board flags and the system log
//! - **Mock API**: random readings and failure injection for tests and demos
//!
//! # Error Kinds
//!
//! | Error | Raised by |
//! |-------|-----------|
//! | [`Error::Network`] | Requests that cannot be sent |
//! | [`Error::Http`] | Non-2xx answers |
//! | [`Error::Protocol`] | Bodies without the expected shape |
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use securityhub_core::{MockApi, MonitorOptions, SiteMonitor};
//!
//! #[tokio::main]
//! async fn main() -> securityhub_core::Result<()> {
//!     let api = Arc::new(MockApi::new());
//!     let monitor = SiteMonitor::new(api, "1", "token", MonitorOptions::default())?;
//!
//!     monitor.refresh().await?;
//!     let view = monitor.view();
//!     assert!(view.api_error.is_none());
//!     assert_eq!(view.sensors.len(), 3);
//!     Ok(())
//! }
//! ```

pub mod board;
pub mod chart;
pub mod client;
pub mod commands;
pub mod error;
pub mod merge;
pub mod mock;
pub mod monitor;
pub mod persist;
pub mod session;
pub mod syslog;
pub mod traits;
pub mod util;

pub use board::{BANNER_TTL, Banner, BoardRow, HomeBoard};
pub use chart::{ChartKind, ChartPoint, ChartSeries, project};
pub use client::{ApiClient, CommandAck, DEFAULT_TIMEOUT, FetchedSnapshot, LoginResponse};
pub use commands::{CommandPhase, Controlled, Resolution, Ticket};
pub use error::{Error, Result};
pub use merge::{DEFAULT_INTERVAL, MergeContext, MergeOutcome, merge};
pub use mock::{MockApi, RecordedCommand, site_series};
pub use monitor::{
    MonitorOptions, NOTIFICATION_CAPACITY, SiteMonitor, SiteView, fetch_failed_banner,
};
pub use persist::{KeyValueStore, MemoryStore, load_json, load_json_strict, save_json};
pub use session::{Landing, Session, SessionStore};
pub use syslog::SystemLog;
pub use traits::SecurityApi;

// Re-export the data model for convenience
pub use securityhub_types::{
    Client, Directory, HistoryEntry, Mode, Notification, SensorKey, SensorMap, SensorReading,
    SensorState, Site, Snapshot, SystemLogEntry,
};
