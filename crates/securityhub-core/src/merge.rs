//! Merging fetched snapshots into accumulated sensor state.
//!
//! A merge is a pure function of the previous [`SensorMap`], the new
//! [`Snapshot`] and a [`MergeContext`]; the caller applies the returned
//! [`MergeOutcome`] to its view in one step.

use std::time::Duration;

use time::{OffsetDateTime, UtcOffset};

use securityhub_types::{HistoryEntry, Notification, SensorMap, SensorState, Snapshot};

use crate::util::format_clock;

/// Default poll cadence; also the amount every known sensor's uptime advances per merge.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);

/// Inputs of a merge that do not come from the snapshot itself.
#[derive(Debug, Clone)]
pub struct MergeContext {
    /// Merge time; history samples are stamped with it.
    pub now: OffsetDateTime,
    /// Latency of the fetch that produced the snapshot, shared by all its sensors.
    pub response_time_ms: f64,
    /// Poll interval, added to each known sensor's uptime.
    pub interval: Duration,
    /// Site label used in notifications ("for Home {site}").
    pub site: String,
    /// Offset used to render clock times in notifications.
    pub utc_offset: UtcOffset,
}

impl MergeContext {
    /// Context for a merge happening now with the default interval.
    pub fn new(site: impl Into<String>, response_time_ms: f64) -> Self {
        Self {
            now: OffsetDateTime::now_utc(),
            response_time_ms,
            interval: DEFAULT_INTERVAL,
            site: site.into(),
            utc_offset: UtcOffset::UTC,
        }
    }

    /// Override the merge time.
    #[must_use]
    pub fn at(mut self, now: OffsetDateTime) -> Self {
        self.now = now;
        self
    }

    /// Override the interval.
    #[must_use]
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Override the display offset.
    #[must_use]
    pub fn utc_offset(mut self, offset: UtcOffset) -> Self {
        self.utc_offset = offset;
        self
    }
}

/// Result of a merge: the new state and the notifications it raised.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    pub sensors: SensorMap,
    pub notifications: Vec<Notification>,
}

/// Merge a snapshot into the previous sensor state.
///
/// Every key of `previous` has its uptime advanced by one interval. Keys
/// present in the snapshot additionally get the reported fields overlaid,
/// a new history sample, a recomputed pulse and the shared response time.
/// A `connected` transition from `true` to `false` raises one notification.
/// Keys absent from the snapshot are otherwise left untouched.
pub fn merge(previous: &SensorMap, snapshot: &Snapshot, ctx: &MergeContext) -> MergeOutcome {
    let step = ctx.interval.as_secs_f64();
    let now_ms = securityhub_types::unix_millis(ctx.now);

    let mut sensors: SensorMap = previous
        .iter()
        .map(|(key, state)| {
            let mut state = state.clone();
            state.uptime_secs += step;
            (key.clone(), state)
        })
        .collect();
    let mut notifications = Vec::new();

    for (key, reading) in snapshot.iter() {
        let prior = previous.get(key);
        let was_connected = prior.map_or(true, |s| s.connected);
        let is_connected = reading.is_connected();
        let prior_uptime = prior.map_or(0.0, |s| s.uptime_secs);

        let state = sensors.entry(key.clone()).or_insert_with(SensorState::default);
        if let Some(value) = reading.value {
            state.value = value;
        }
        if let Some(temperature) = reading.temperature {
            state.temperature = temperature;
        }
        if let Some(humidity) = reading.humidity {
            state.humidity = humidity;
        }
        state.connected = is_connected;
        state.response_time_ms = ctx.response_time_ms;
        state.uptime_secs = prior_uptime + step;

        state.push_history(HistoryEntry::from_reading(reading, now_ms));
        state.pulse = state.count_recent(now_ms);

        if was_connected && !is_connected {
            let message = format!(
                "{} disconnected at {} for Home {}",
                key.label(),
                format_clock(ctx.now, ctx.utc_offset),
                ctx.site
            );
            notifications.push(Notification::for_sensor(key.clone(), message, ctx.now));
        }
    }

    MergeOutcome {
        sensors,
        notifications,
    }
}

#[cfg(test)]
mod tests {
    use securityhub_types::{
        HISTORY_CAPACITY, SensorKey, SensorReading, default_sensor_map,
    };
    use time::macros::datetime;

    use super::*;

    fn ctx_at(now: OffsetDateTime) -> MergeContext {
        MergeContext::new("1", 12.5).at(now)
    }

    #[test]
    fn test_merge_overlays_reported_fields() {
        let previous = default_sensor_map();
        let snapshot = Snapshot::new()
            .with(SensorKey::pir(), SensorReading::value(1.0))
            .with(SensorKey::dht(), SensorReading::climate(23.5, 48.0));

        let outcome = merge(&previous, &snapshot, &ctx_at(datetime!(2024-05-01 10:00:00 UTC)));

        let pir = &outcome.sensors[&SensorKey::pir()];
        assert_eq!(pir.value, 1.0);
        assert_eq!(pir.history.len(), 1);
        assert_eq!(pir.pulse, 1);
        assert_eq!(pir.response_time_ms, 12.5);

        let dht = &outcome.sensors[&SensorKey::dht()];
        assert_eq!(dht.temperature, 23.5);
        assert_eq!(dht.humidity, 48.0);
        assert_eq!(dht.history[0].value, 23.5);
        assert_eq!(dht.history[0].humidity, Some(48.0));
        assert!(outcome.notifications.is_empty());
    }

    #[test]
    fn test_absent_sensors_only_gain_uptime() {
        let mut previous = default_sensor_map();
        previous.get_mut(&SensorKey::vibration()).unwrap().value = 1.0;
        let snapshot = Snapshot::new().with(SensorKey::pir(), SensorReading::value(0.0));

        let outcome = merge(&previous, &snapshot, &ctx_at(datetime!(2024-05-01 10:00:00 UTC)));

        let vibration = &outcome.sensors[&SensorKey::vibration()];
        assert_eq!(vibration.uptime_secs, 5.0);
        assert_eq!(vibration.value, 1.0);
        assert!(vibration.history.is_empty());
        assert_eq!(vibration.response_time_ms, 0.0);
    }

    #[test]
    fn test_empty_snapshot_changes_only_uptime() {
        let previous = default_sensor_map();
        let outcome = merge(&previous, &Snapshot::new(), &ctx_at(datetime!(2024-05-01 10:00:00 UTC)));

        for (key, state) in &outcome.sensors {
            let mut expected = previous[key].clone();
            expected.uptime_secs += 5.0;
            assert_eq!(state, &expected);
        }
        assert!(outcome.notifications.is_empty());
    }

    #[test]
    fn test_uptime_advances_once_per_merge_for_reported_sensors() {
        let mut sensors = default_sensor_map();
        let mut now = datetime!(2024-05-01 10:00:00 UTC);
        for cycle in 1..=4 {
            let snapshot = Snapshot::new()
                .with(SensorKey::pir(), SensorReading::value(0.0).with_connected(cycle % 2 == 0));
            sensors = merge(&sensors, &snapshot, &ctx_at(now)).sensors;
            assert_eq!(sensors[&SensorKey::pir()].uptime_secs, 5.0 * cycle as f64);
            assert_eq!(sensors[&SensorKey::dht()].uptime_secs, 5.0 * cycle as f64);
            now += time::Duration::seconds(5);
        }
    }

    #[test]
    fn test_disconnect_edge_raises_one_notification() {
        let now = datetime!(2024-05-01 10:15:30 UTC);
        let first = merge(
            &default_sensor_map(),
            &Snapshot::new().with(SensorKey::vibration(), SensorReading::value(0.0)),
            &ctx_at(now),
        );
        let second = merge(
            &first.sensors,
            &Snapshot::new()
                .with(SensorKey::vibration(), SensorReading::value(0.0).with_connected(false)),
            &ctx_at(now + time::Duration::seconds(5)),
        );

        assert_eq!(second.notifications.len(), 1);
        let note = &second.notifications[0];
        assert_eq!(note.sensor, Some(SensorKey::vibration()));
        assert_eq!(note.message, "VIBRATION disconnected at 10:15:35 for Home 1");
        assert!(!second.sensors[&SensorKey::vibration()].connected);

        // Staying disconnected does not repeat the notification.
        let third = merge(
            &second.sensors,
            &Snapshot::new()
                .with(SensorKey::vibration(), SensorReading::value(0.0).with_connected(false)),
            &ctx_at(now + time::Duration::seconds(10)),
        );
        assert!(third.notifications.is_empty());
    }

    #[test]
    fn test_missing_connected_flag_means_reconnected() {
        let mut previous = default_sensor_map();
        previous.get_mut(&SensorKey::pir()).unwrap().connected = false;

        let outcome = merge(
            &previous,
            &Snapshot::new().with(SensorKey::pir(), SensorReading::value(1.0)),
            &ctx_at(datetime!(2024-05-01 10:00:00 UTC)),
        );
        assert!(outcome.sensors[&SensorKey::pir()].connected);
        assert!(outcome.notifications.is_empty());
    }

    #[test]
    fn test_unknown_sensor_is_added() {
        let outcome = merge(
            &default_sensor_map(),
            &Snapshot::new().with("smoke", SensorReading::value(1.0).with_connected(false)),
            &ctx_at(datetime!(2024-05-01 10:00:00 UTC)),
        );
        let smoke = &outcome.sensors[&SensorKey::new("smoke")];
        assert_eq!(smoke.uptime_secs, 5.0);
        assert!(!smoke.enabled);
        // A new key starts from "connected", so reporting it disconnected is an edge.
        assert_eq!(outcome.notifications.len(), 1);
    }

    #[test]
    fn test_enabled_flag_is_never_touched() {
        let mut previous = default_sensor_map();
        previous.get_mut(&SensorKey::pir()).unwrap().enabled = true;
        let outcome = merge(
            &previous,
            &Snapshot::new().with(SensorKey::pir(), SensorReading::value(1.0)),
            &ctx_at(datetime!(2024-05-01 10:00:00 UTC)),
        );
        assert!(outcome.sensors[&SensorKey::pir()].enabled);
    }

    #[test]
    fn test_pulse_counts_only_last_minute() {
        let mut sensors = default_sensor_map();
        let start = datetime!(2024-05-01 10:00:00 UTC);
        // Ten samples 5 s apart all land inside the window.
        for i in 0..10 {
            let snapshot = Snapshot::new().with(SensorKey::pir(), SensorReading::value(1.0));
            sensors = merge(&sensors, &snapshot, &ctx_at(start + time::Duration::seconds(5 * i))).sensors;
        }
        assert_eq!(sensors[&SensorKey::pir()].pulse, 10);

        // Two minutes later every earlier sample has aged out.
        let late = start + time::Duration::minutes(3);
        sensors = merge(
            &sensors,
            &Snapshot::new().with(SensorKey::pir(), SensorReading::value(1.0)),
            &ctx_at(late),
        )
        .sensors;
        assert_eq!(sensors[&SensorKey::pir()].pulse, 1);
    }

    #[test]
    fn test_history_is_capped() {
        let mut sensors = default_sensor_map();
        let start = datetime!(2024-05-01 10:00:00 UTC);
        for i in 0..(HISTORY_CAPACITY as i64 + 10) {
            let snapshot = Snapshot::new().with(SensorKey::pir(), SensorReading::value(i as f64));
            sensors = merge(&sensors, &snapshot, &ctx_at(start + time::Duration::seconds(5 * i))).sensors;
        }
        let history = &sensors[&SensorKey::pir()].history;
        assert_eq!(history.len(), HISTORY_CAPACITY);
        assert_eq!(history[0].value, 10.0);
    }
}
