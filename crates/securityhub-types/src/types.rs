//! Core types for SecurityHub sensor data.

use core::fmt;
use core::str::FromStr;
use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::{ParseError, ParseResult};

/// Maximum number of samples kept in a sensor's history buffer.
pub const HISTORY_CAPACITY: usize = 50;

/// Width of the trailing window used to compute [`SensorState::pulse`], in milliseconds.
pub const PULSE_WINDOW_MS: i64 = 60_000;

/// Identifier of a sensor within a site (`pir`, `vibration`, `dht`, ...).
///
/// The server may report keys beyond the three built-in ones; any non-empty
/// string is a valid key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct SensorKey(String);

impl SensorKey {
    /// Passive infrared motion sensor.
    pub const PIR: &'static str = "pir";
    /// Vibration sensor.
    pub const VIBRATION: &'static str = "vibration";
    /// Combined temperature / humidity sensor.
    pub const DHT: &'static str = "dht";

    /// Create a key from any string.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The PIR key.
    pub fn pir() -> Self {
        Self::new(Self::PIR)
    }

    /// The vibration key.
    pub fn vibration() -> Self {
        Self::new(Self::VIBRATION)
    }

    /// The DHT key.
    pub fn dht() -> Self {
        Self::new(Self::DHT)
    }

    /// The raw key as sent on the wire.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Upper-case form used in user-facing messages (`PIR`, `DHT`).
    pub fn label(&self) -> String {
        self.0.to_uppercase()
    }

    /// Whether this sensor reports temperature/humidity rather than a single value.
    pub fn is_climate(&self) -> bool {
        self.0 == Self::DHT
    }
}

impl fmt::Display for SensorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SensorKey {
    type Err = ParseError;

    fn from_str(s: &str) -> ParseResult<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ParseError::EmptySensorKey);
        }
        Ok(Self::new(trimmed.to_lowercase()))
    }
}

impl From<&str> for SensorKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Arming mode of a site's alarm logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Mode {
    /// Armed with occupants inside (perimeter only).
    #[cfg_attr(feature = "serde", serde(alias = "stay", alias = "STAY"))]
    Stay,
    /// Fully armed, nobody home.
    #[cfg_attr(feature = "serde", serde(alias = "away", alias = "AWAY"))]
    Away,
    /// Alarm logic off.
    #[default]
    #[cfg_attr(feature = "serde", serde(alias = "disarm", alias = "DISARM"))]
    Disarm,
}

impl Mode {
    /// All modes in display order.
    pub const ALL: [Mode; 3] = [Mode::Stay, Mode::Away, Mode::Disarm];

    /// Wire name of the mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Stay => "Stay",
            Mode::Away => "Away",
            Mode::Disarm => "Disarm",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = ParseError;

    /// Parse a mode name case-insensitively.
    ///
    /// ```
    /// use securityhub_types::Mode;
    ///
    /// assert_eq!("stay".parse::<Mode>(), Ok(Mode::Stay));
    /// assert_eq!("AWAY".parse::<Mode>(), Ok(Mode::Away));
    /// assert!("panic".parse::<Mode>().is_err());
    /// ```
    fn from_str(s: &str) -> ParseResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "stay" => Ok(Mode::Stay),
            "away" => Ok(Mode::Away),
            "disarm" => Ok(Mode::Disarm),
            _ => Err(ParseError::UnknownMode(s.to_string())),
        }
    }
}

/// One sensor's entry in a sensor-status payload.
///
/// Every field is optional: the server only sends what it knows.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SensorReading {
    /// Single-valued reading (PIR, vibration).
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub value: Option<f64>,
    /// Temperature in degrees Celsius (DHT).
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub temperature: Option<f64>,
    /// Relative humidity percentage (DHT).
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub humidity: Option<f64>,
    /// Connection status as seen by the server. Absent means connected.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub connected: Option<bool>,
}

impl SensorReading {
    /// Reading with a single value.
    pub fn value(value: f64) -> Self {
        Self {
            value: Some(value),
            ..Default::default()
        }
    }

    /// Reading with temperature and humidity.
    pub fn climate(temperature: f64, humidity: f64) -> Self {
        Self {
            temperature: Some(temperature),
            humidity: Some(humidity),
            ..Default::default()
        }
    }

    /// Set the connection flag.
    #[must_use]
    pub fn with_connected(mut self, connected: bool) -> Self {
        self.connected = Some(connected);
        self
    }

    /// Whether the server reports the sensor as connected (defaults to `true`).
    pub fn is_connected(&self) -> bool {
        self.connected.unwrap_or(true)
    }

    /// The scalar recorded in history: `value`, else `temperature`, else 0.
    pub fn primary_value(&self) -> f64 {
        self.value.or(self.temperature).unwrap_or(0.0)
    }
}

/// One fetched sensor-status payload.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Snapshot {
    readings: BTreeMap<SensorKey, SensorReading>,
}

impl Snapshot {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a sensor's reading.
    #[must_use]
    pub fn with(mut self, key: impl Into<SensorKey>, reading: SensorReading) -> Self {
        self.insert(key.into(), reading);
        self
    }

    /// Add or replace a sensor's reading.
    pub fn insert(&mut self, key: SensorKey, reading: SensorReading) {
        self.readings.insert(key, reading);
    }

    /// Reading for a key, if present.
    pub fn get(&self, key: &SensorKey) -> Option<&SensorReading> {
        self.readings.get(key)
    }

    /// Iterate over readings in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&SensorKey, &SensorReading)> {
        self.readings.iter()
    }

    /// Number of sensors in the snapshot.
    pub fn len(&self) -> usize {
        self.readings.len()
    }

    /// Whether the snapshot carries no sensors.
    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Parse a sensor-status JSON body.
    ///
    /// The map of readings is taken from a nested `data` object when present,
    /// otherwise from the top-level object. Members that are not objects
    /// (such as `"status": "success"`) are skipped, and so are sensor entries
    /// that do not parse; see [`Snapshot::from_json_partial`] to inspect them.
    ///
    /// ```
    /// use securityhub_types::{SensorKey, Snapshot};
    ///
    /// let body = serde_json::json!({
    ///     "status": "success",
    ///     "data": { "pir": { "value": 1, "connected": true } }
    /// });
    /// let snapshot = Snapshot::from_json(&body).unwrap();
    /// assert_eq!(snapshot.get(&SensorKey::pir()).unwrap().value, Some(1.0));
    /// ```
    #[cfg(feature = "serde")]
    pub fn from_json(body: &serde_json::Value) -> ParseResult<Self> {
        Self::from_json_partial(body).map(|(snapshot, _)| snapshot)
    }

    /// Parse a sensor-status JSON body, returning the readable sensors and
    /// one error per sensor entry that was left out.
    ///
    /// Only a body that is not a JSON object fails as a whole.
    #[cfg(feature = "serde")]
    pub fn from_json_partial(body: &serde_json::Value) -> ParseResult<(Self, Vec<ParseError>)> {
        let object = body
            .as_object()
            .ok_or_else(|| ParseError::InvalidSnapshot("expected a JSON object".to_string()))?;

        let members = match object.get("data") {
            Some(serde_json::Value::Object(data)) => data,
            _ => object,
        };

        let mut snapshot = Self::new();
        let mut rejected = Vec::new();
        for (key, entry) in members {
            if !entry.is_object() {
                continue;
            }
            match serde_json::from_value::<SensorReading>(entry.clone()) {
                Ok(reading) => snapshot.insert(SensorKey::new(key.as_str()), reading),
                Err(e) => rejected.push(ParseError::InvalidSnapshot(format!(
                    "sensor '{}': {}",
                    key, e
                ))),
            }
        }
        Ok((snapshot, rejected))
    }
}

impl FromIterator<(SensorKey, SensorReading)> for Snapshot {
    fn from_iter<I: IntoIterator<Item = (SensorKey, SensorReading)>>(iter: I) -> Self {
        Self {
            readings: iter.into_iter().collect(),
        }
    }
}

/// One sample of a sensor's history buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HistoryEntry {
    /// Scalar value (`value`, else `temperature`, else 0).
    pub value: f64,
    /// Temperature, when the reading carried one.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub temperature: Option<f64>,
    /// Humidity, when the reading carried one.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub humidity: Option<f64>,
    /// Merge time in unix milliseconds.
    pub timestamp: i64,
}

impl HistoryEntry {
    /// Build the history sample for a reading merged at `timestamp`.
    pub fn from_reading(reading: &SensorReading, timestamp: i64) -> Self {
        Self {
            value: reading.primary_value(),
            temperature: reading.temperature,
            humidity: reading.humidity,
            timestamp,
        }
    }
}

/// Accumulated state of one sensor in a mounted site view.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SensorState {
    /// User-controlled flag; only changed by an acknowledged command.
    pub enabled: bool,
    /// Server-reported connection status.
    pub connected: bool,
    /// Latest single value.
    pub value: f64,
    /// Latest temperature (DHT).
    pub temperature: f64,
    /// Latest humidity (DHT).
    pub humidity: f64,
    /// Sliding window of the last [`HISTORY_CAPACITY`] samples, oldest first.
    pub history: Vec<HistoryEntry>,
    /// Samples within the last [`PULSE_WINDOW_MS`] of the latest merge.
    pub pulse: u32,
    /// Latency of the most recent fetch, in milliseconds.
    pub response_time_ms: f64,
    /// Seconds of monitoring accumulated since the view was mounted.
    pub uptime_secs: f64,
}

impl Default for SensorState {
    fn default() -> Self {
        Self {
            enabled: false,
            connected: true,
            value: 0.0,
            temperature: 0.0,
            humidity: 0.0,
            history: Vec::new(),
            pulse: 0,
            response_time_ms: 0.0,
            uptime_secs: 0.0,
        }
    }
}

impl SensorState {
    /// Append a sample, evicting the oldest ones beyond [`HISTORY_CAPACITY`].
    pub fn push_history(&mut self, entry: HistoryEntry) {
        self.history.push(entry);
        if self.history.len() > HISTORY_CAPACITY {
            let excess = self.history.len() - HISTORY_CAPACITY;
            self.history.drain(..excess);
        }
    }

    /// Count history samples strictly newer than `now_ms - PULSE_WINDOW_MS`.
    pub fn count_recent(&self, now_ms: i64) -> u32 {
        let cutoff = now_ms - PULSE_WINDOW_MS;
        self.history.iter().filter(|h| h.timestamp > cutoff).count() as u32
    }

    /// Uptime expressed in hours, as shown on the dashboard.
    pub fn uptime_hours(&self) -> f64 {
        self.uptime_secs / 3600.0
    }
}

/// Per-site sensor state, ordered by key.
pub type SensorMap = BTreeMap<SensorKey, SensorState>;

/// The sensor map a freshly mounted site view starts from: `dht`, `pir`, `vibration`.
pub fn default_sensor_map() -> SensorMap {
    [SensorKey::pir(), SensorKey::vibration(), SensorKey::dht()]
        .into_iter()
        .map(|key| (key, SensorState::default()))
        .collect()
}

/// An ephemeral, dismissible message shown in a site view.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Notification {
    /// Human-readable text.
    pub message: String,
    /// Sensor the message is about, if any.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub sensor: Option<SensorKey>,
    /// When the notification was raised.
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    pub at: OffsetDateTime,
}

impl Notification {
    /// Create a notification not tied to a sensor.
    pub fn new(message: impl Into<String>, at: OffsetDateTime) -> Self {
        Self {
            message: message.into(),
            sensor: None,
            at,
        }
    }

    /// Create a notification about a sensor.
    pub fn for_sensor(sensor: SensorKey, message: impl Into<String>, at: OffsetDateTime) -> Self {
        Self {
            message: message.into(),
            sensor: Some(sensor),
            at,
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// A persisted system-log line.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SystemLogEntry {
    /// When the event happened.
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    pub timestamp: OffsetDateTime,
    /// What happened.
    pub message: String,
}

/// Convert a timestamp to unix milliseconds.
pub fn unix_millis(at: OffsetDateTime) -> i64 {
    (at.unix_timestamp_nanos() / 1_000_000) as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sensor_key_label() {
        assert_eq!(SensorKey::pir().label(), "PIR");
        assert_eq!(SensorKey::new("vibration").label(), "VIBRATION");
        assert!(SensorKey::dht().is_climate());
        assert!(!SensorKey::pir().is_climate());
    }

    #[test]
    fn test_sensor_key_parse() {
        assert_eq!(" PIR ".parse::<SensorKey>().unwrap(), SensorKey::pir());
        assert_eq!("".parse::<SensorKey>(), Err(ParseError::EmptySensorKey));
    }

    #[test]
    fn test_mode_round_trip_names() {
        for mode in Mode::ALL {
            assert_eq!(mode.as_str().parse::<Mode>().unwrap(), mode);
        }
        assert_eq!(Mode::default(), Mode::Disarm);
        assert!(matches!(
            "armed".parse::<Mode>(),
            Err(ParseError::UnknownMode(_))
        ));
    }

    #[test]
    fn test_primary_value_falls_back_to_temperature() {
        assert_eq!(SensorReading::value(1.0).primary_value(), 1.0);
        assert_eq!(SensorReading::climate(24.5, 60.0).primary_value(), 24.5);
        assert_eq!(SensorReading::default().primary_value(), 0.0);
        // An explicit zero value is kept rather than replaced by temperature.
        let reading = SensorReading {
            value: Some(0.0),
            temperature: Some(21.0),
            ..Default::default()
        };
        assert_eq!(reading.primary_value(), 0.0);
    }

    #[test]
    fn test_push_history_evicts_oldest() {
        let mut state = SensorState::default();
        for i in 0..(HISTORY_CAPACITY as i64 + 5) {
            state.push_history(HistoryEntry {
                value: i as f64,
                temperature: None,
                humidity: None,
                timestamp: i,
            });
        }
        assert_eq!(state.history.len(), HISTORY_CAPACITY);
        assert_eq!(state.history[0].timestamp, 5);
        assert_eq!(
            state.history.last().map(|h| h.timestamp),
            Some(HISTORY_CAPACITY as i64 + 4)
        );
    }

    #[test]
    fn test_count_recent_window_is_exclusive() {
        let mut state = SensorState::default();
        let now = 1_000_000;
        for ts in [now - PULSE_WINDOW_MS, now - PULSE_WINDOW_MS + 1, now] {
            state.push_history(HistoryEntry {
                value: 1.0,
                temperature: None,
                humidity: None,
                timestamp: ts,
            });
        }
        assert_eq!(state.count_recent(now), 2);
    }

    #[test]
    fn test_default_sensor_map() {
        let map = default_sensor_map();
        assert_eq!(map.len(), 3);
        assert!(map.values().all(|s| !s.enabled && s.connected));
    }

    #[test]
    fn test_snapshot_from_nested_data() {
        let body = serde_json::json!({
            "status": "success",
            "data": {
                "pir": { "connected": true, "value": 0 },
                "dht": { "temperature": 22.5, "humidity": 41 }
            }
        });
        let snapshot = Snapshot::from_json(&body).unwrap();
        assert_eq!(snapshot.len(), 2);
        let dht = snapshot.get(&SensorKey::dht()).unwrap();
        assert_eq!(dht.temperature, Some(22.5));
        assert_eq!(dht.connected, None);
        assert!(dht.is_connected());
    }

    #[test]
    fn test_snapshot_from_flat_body_skips_scalars() {
        let body = serde_json::json!({
            "status": "success",
            "vibration": { "value": 1, "connected": false }
        });
        let snapshot = Snapshot::from_json(&body).unwrap();
        assert_eq!(snapshot.len(), 1);
        assert!(!snapshot.get(&SensorKey::vibration()).unwrap().is_connected());
    }

    #[test]
    fn test_snapshot_empty_and_invalid() {
        assert!(Snapshot::from_json(&serde_json::json!({})).unwrap().is_empty());
        assert!(Snapshot::from_json(&serde_json::json!([1, 2])).is_err());
    }

    #[test]
    fn test_snapshot_skips_malformed_sensor() {
        let body = serde_json::json!({
            "data": {
                "pir": { "value": "high" },
                "vibration": { "value": true },
                "dht": { "temperature": 21.0, "humidity": 40 }
            }
        });
        let (snapshot, rejected) = Snapshot::from_json_partial(&body).unwrap();
        assert_eq!(snapshot.len(), 1);
        assert!(snapshot.get(&SensorKey::dht()).is_some());
        assert_eq!(rejected.len(), 2);
        assert!(rejected[0].to_string().contains("sensor 'pir'"));

        assert_eq!(Snapshot::from_json(&body).unwrap(), snapshot);
    }
}
