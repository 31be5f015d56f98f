//! Platform-agnostic types for SecurityHub site monitoring.
//!
//! This crate provides the shared data model used by the SecurityHub client
//! library (securityhub-core), its persistence backends and the CLI.
//!
//! # Features
//!
//! - Sensor keys, snapshot payloads and accumulated sensor state
//! - Arming modes (`Stay`, `Away`, `Disarm`)
//! - Notifications and system-log entries
//! - The client/site directory
//!
//! # Example
//!
//! ```
//! use securityhub_types::{Mode, SensorKey, SensorReading, Snapshot};
//!
//! let snapshot = Snapshot::new()
//!     .with(SensorKey::pir(), SensorReading::value(1.0))
//!     .with(SensorKey::dht(), SensorReading::climate(22.0, 45.0));
//! assert_eq!(snapshot.len(), 2);
//! assert_eq!("away".parse::<Mode>().unwrap(), Mode::Away);
//! ```

pub mod error;
pub mod site;
pub mod types;

pub use error::{ParseError, ParseResult};
pub use site::{Client, Directory, Site, SiteRef, Zones};
pub use types::{
    HISTORY_CAPACITY, HistoryEntry, Mode, Notification, PULSE_WINDOW_MS, SensorKey, SensorMap,
    SensorReading, SensorState, Snapshot, SystemLogEntry, default_sensor_map, unix_millis,
};
