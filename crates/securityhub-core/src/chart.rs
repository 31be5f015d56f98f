//! Projection of sensor history into chart series.
//!
//! The monitor publishes a fresh projection on its own timer; the CLI renders
//! it as text. [`project`] is pure, so the same sensor map always yields the
//! same series.

use serde::{Deserialize, Serialize};
use time::UtcOffset;

use securityhub_types::{HistoryEntry, SensorKey, SensorMap};

use crate::util::{format_clock, from_unix_millis};

/// Which quantity a series plots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Pir,
    Vibration,
    Temperature,
    Humidity,
}

impl ChartKind {
    /// All series in display order.
    pub const ALL: [ChartKind; 4] = [
        ChartKind::Pir,
        ChartKind::Vibration,
        ChartKind::Temperature,
        ChartKind::Humidity,
    ];

    /// Sensor whose history feeds this series.
    pub fn sensor(&self) -> SensorKey {
        match self {
            ChartKind::Pir => SensorKey::pir(),
            ChartKind::Vibration => SensorKey::vibration(),
            ChartKind::Temperature | ChartKind::Humidity => SensorKey::dht(),
        }
    }

    /// Dataset label.
    pub fn label(&self) -> &'static str {
        match self {
            ChartKind::Pir => "PIR Value",
            ChartKind::Vibration => "VIBRATION Value",
            ChartKind::Temperature => "Temperature (°C)",
            ChartKind::Humidity => "Humidity (%)",
        }
    }

    /// Chart title.
    pub fn title(&self) -> &'static str {
        match self {
            ChartKind::Pir => "PIR Sensor",
            ChartKind::Vibration => "Vibration Sensor",
            ChartKind::Temperature => "Temperature",
            ChartKind::Humidity => "Humidity",
        }
    }

    /// Y-axis title.
    pub fn axis_title(&self) -> &'static str {
        match self {
            ChartKind::Pir | ChartKind::Vibration => "Value",
            ChartKind::Temperature => "°C",
            ChartKind::Humidity => "%",
        }
    }

    fn y(&self, entry: &HistoryEntry) -> f64 {
        match self {
            ChartKind::Pir | ChartKind::Vibration => entry.value,
            ChartKind::Temperature => entry.temperature.unwrap_or(0.0),
            ChartKind::Humidity => entry.humidity.unwrap_or(0.0),
        }
    }
}

/// One plotted point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    /// Local clock time of the sample (`HH:MM:SS`).
    pub x: String,
    pub y: f64,
}

/// A labelled line of points, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub kind: ChartKind,
    pub label: String,
    pub title: String,
    pub axis_title: String,
    pub points: Vec<ChartPoint>,
}

impl ChartSeries {
    /// Smallest and largest y value, if the series has points.
    pub fn range(&self) -> Option<(f64, f64)> {
        self.points.iter().map(|p| p.y).fold(None, |acc, y| match acc {
            None => Some((y, y)),
            Some((lo, hi)) => Some((lo.min(y), hi.max(y))),
        })
    }

    /// Most recent y value.
    pub fn latest(&self) -> Option<f64> {
        self.points.last().map(|p| p.y)
    }
}

/// Build the chart series for a sensor map.
///
/// Series appear in [`ChartKind::ALL`] order; a series whose sensor is not in
/// the map is omitted.
pub fn project(sensors: &SensorMap, offset: UtcOffset) -> Vec<ChartSeries> {
    ChartKind::ALL
        .iter()
        .filter_map(|kind| {
            let state = sensors.get(&kind.sensor())?;
            let points = state
                .history
                .iter()
                .map(|entry| ChartPoint {
                    x: format_clock(from_unix_millis(entry.timestamp), offset),
                    y: kind.y(entry),
                })
                .collect();
            Some(ChartSeries {
                kind: *kind,
                label: kind.label().to_string(),
                title: kind.title().to_string(),
                axis_title: kind.axis_title().to_string(),
                points,
            })
        })
        .collect()
}
