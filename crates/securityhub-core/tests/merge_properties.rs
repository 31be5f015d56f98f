//! Property tests for the sensor state merger.

use std::time::Duration;

use proptest::prelude::*;
use time::OffsetDateTime;
use time::macros::datetime;

use securityhub_core::{MergeContext, SensorKey, SensorReading, Snapshot, merge};
use securityhub_types::{HISTORY_CAPACITY, PULSE_WINDOW_MS, default_sensor_map, unix_millis};

/// One poll: PIR reading (if reported), its connected flag, and seconds since the last poll.
type Poll = (Option<(f64, bool)>, u64);

fn polls() -> impl Strategy<Value = Vec<Poll>> {
    proptest::collection::vec(
        (
            proptest::option::of((0.0f64..=1.0, any::<bool>())),
            1u64..30,
        ),
        0..120,
    )
}

fn start() -> OffsetDateTime {
    datetime!(2024-05-01 10:00:00 UTC)
}

proptest! {
    #[test]
    fn history_stays_bounded_and_chronological(polls in polls()) {
        let mut sensors = default_sensor_map();
        let mut now = start();
        for (reading, gap) in polls {
            now += Duration::from_secs(gap);
            let mut snapshot = Snapshot::new();
            if let Some((value, connected)) = reading {
                snapshot.insert(SensorKey::pir(), SensorReading::value(value).with_connected(connected));
            }
            sensors = merge(&sensors, &snapshot, &MergeContext::new("1", 10.0).at(now)).sensors;

            let pir = &sensors[&SensorKey::pir()];
            prop_assert!(pir.history.len() <= HISTORY_CAPACITY);
            prop_assert!(pir.history.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
        }
    }

    #[test]
    fn pulse_counts_samples_in_the_last_minute(polls in polls()) {
        let mut sensors = default_sensor_map();
        let mut now = start();
        for (reading, gap) in polls {
            now += Duration::from_secs(gap);
            let Some((value, _)) = reading else { continue };
            let snapshot = Snapshot::new().with(SensorKey::pir(), SensorReading::value(value));
            sensors = merge(&sensors, &snapshot, &MergeContext::new("1", 10.0).at(now)).sensors;

            let pir = &sensors[&SensorKey::pir()];
            let cutoff = unix_millis(now) - PULSE_WINDOW_MS;
            let expected = pir.history.iter().filter(|h| h.timestamp > cutoff).count() as u32;
            prop_assert_eq!(pir.pulse, expected);
        }
    }

    #[test]
    fn uptime_grows_one_interval_per_merge(polls in polls(), interval in 1u64..60) {
        let mut sensors = default_sensor_map();
        let ctx = MergeContext::new("1", 10.0)
            .at(start())
            .interval(Duration::from_secs(interval));
        let merges = polls.len();
        for (reading, _) in polls {
            let mut snapshot = Snapshot::new();
            if let Some((value, connected)) = reading {
                snapshot.insert(SensorKey::pir(), SensorReading::value(value).with_connected(connected));
            }
            sensors = merge(&sensors, &snapshot, &ctx).sensors;
        }
        let expected = (merges as u64 * interval) as f64;
        for state in sensors.values() {
            prop_assert_eq!(state.uptime_secs, expected);
        }
    }

    #[test]
    fn one_notification_per_disconnect(flags in proptest::collection::vec(any::<bool>(), 1..60)) {
        let mut sensors = default_sensor_map();
        let mut was_connected = true;
        for (i, connected) in flags.into_iter().enumerate() {
            let now = start() + Duration::from_secs(5 * i as u64);
            let snapshot = Snapshot::new()
                .with(SensorKey::vibration(), SensorReading::value(0.0).with_connected(connected));
            let outcome = merge(&sensors, &snapshot, &MergeContext::new("7", 10.0).at(now));

            let expected = usize::from(was_connected && !connected);
            prop_assert_eq!(outcome.notifications.len(), expected);
            if expected == 1 {
                prop_assert!(outcome.notifications[0].message.starts_with("VIBRATION disconnected at"));
                prop_assert!(outcome.notifications[0].message.ends_with("for Home 7"));
            }
            was_connected = connected;
            sensors = outcome.sensors;
        }
    }
}
