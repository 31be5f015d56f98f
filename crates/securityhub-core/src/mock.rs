//! Mock API implementation for testing and demos.
//!
//! The [`MockApi`] implements the [`SecurityApi`] trait, so it can stand in
//! for the HTTP client anywhere a generic API is accepted.
//!
//! # Features
//!
//! - **Random readings**: PIR and vibration fire at random, the DHT sensor
//!   drifts between plausible temperature and humidity bounds
//! - **Failure injection**: fail every fetch, or only the next few
//! - **Forced disconnects**: report chosen sensors as disconnected
//! - **Scripted acknowledgments**: queue command responses, each with its own delay
//! - **Latency simulation**: add artificial delays to fetches

use std::collections::{BTreeSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use rand::Rng;
use time::{OffsetDateTime, UtcOffset};
use tokio::sync::RwLock;

use securityhub_types::{Mode, SensorKey, SensorReading, Snapshot};

use crate::chart::{ChartKind, ChartPoint, ChartSeries};
use crate::client::{CommandAck, FetchedSnapshot, LoginResponse};
use crate::error::{Error, Result};
use crate::traits::SecurityApi;
use crate::util::format_clock;

/// Number of points in a generated site-data series.
pub const SITE_SERIES_POINTS: usize = 20;

/// A command received by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCommand {
    Mode {
        site_id: String,
        mode: Mode,
    },
    Sensor {
        site_id: String,
        sensor: SensorKey,
        enabled: bool,
    },
}

#[derive(Debug, Clone)]
struct ScriptedAck {
    response: std::result::Result<CommandAck, u16>,
    delay: Duration,
}

/// A mock SecurityHub server.
///
/// # Example
///
/// ```
/// use securityhub_core::{MockApi, SecurityApi};
///
/// #[tokio::main]
/// async fn main() {
///     let api = MockApi::new();
///     let fetched = api.fetch_status("1", "token").await.unwrap();
///     assert_eq!(fetched.snapshot.len(), 3);
///     assert_eq!(api.fetch_count(), 1);
/// }
/// ```
pub struct MockApi {
    fixed_snapshot: RwLock<Option<Snapshot>>,
    disconnected: RwLock<BTreeSet<SensorKey>>,
    should_fail: AtomicBool,
    fail_message: RwLock<String>,
    /// Number of fetches to fail before succeeding again.
    remaining_failures: AtomicU32,
    /// Simulated fetch latency in milliseconds (0 = no delay).
    fetch_latency_ms: AtomicU64,
    login_failure: RwLock<Option<String>>,
    acks: RwLock<VecDeque<ScriptedAck>>,
    commands: RwLock<Vec<RecordedCommand>>,
    fetch_count: AtomicU32,
    command_count: AtomicU32,
    login_count: AtomicU32,
}

impl std::fmt::Debug for MockApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockApi")
            .field("should_fail", &self.should_fail.load(Ordering::Relaxed))
            .field("fetch_count", &self.fetch_count.load(Ordering::Relaxed))
            .field("command_count", &self.command_count.load(Ordering::Relaxed))
            .finish()
    }
}

impl Default for MockApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MockApi {
    /// Create a mock that generates random readings and accepts every command.
    pub fn new() -> Self {
        Self {
            fixed_snapshot: RwLock::new(None),
            disconnected: RwLock::new(BTreeSet::new()),
            should_fail: AtomicBool::new(false),
            fail_message: RwLock::new("Mock failure".to_string()),
            remaining_failures: AtomicU32::new(0),
            fetch_latency_ms: AtomicU64::new(0),
            login_failure: RwLock::new(None),
            acks: RwLock::new(VecDeque::new()),
            commands: RwLock::new(Vec::new()),
            fetch_count: AtomicU32::new(0),
            command_count: AtomicU32::new(0),
            login_count: AtomicU32::new(0),
        }
    }

    /// Generate one random snapshot for the built-in sensors.
    pub fn random_snapshot() -> Snapshot {
        let mut rng = rand::rng();
        let pir = if rng.random_bool(0.3) { 1.0 } else { 0.0 };
        let vibration = if rng.random_bool(0.2) { 1.0 } else { 0.0 };
        let temperature = round1(rng.random_range(20.0..30.0));
        let humidity = round1(rng.random_range(50.0..80.0));
        Snapshot::new()
            .with(SensorKey::pir(), SensorReading::value(pir).with_connected(true))
            .with(
                SensorKey::vibration(),
                SensorReading::value(vibration).with_connected(true),
            )
            .with(
                SensorKey::dht(),
                SensorReading::climate(temperature, humidity).with_connected(true),
            )
    }

    /// Always return this snapshot instead of random readings.
    pub async fn set_snapshot(&self, snapshot: Snapshot) {
        *self.fixed_snapshot.write().await = Some(snapshot);
    }

    /// Go back to random readings.
    pub async fn clear_snapshot(&self) {
        *self.fixed_snapshot.write().await = None;
    }

    /// Report a sensor as disconnected (or connected again).
    pub async fn set_disconnected(&self, sensor: SensorKey, disconnected: bool) {
        let mut set = self.disconnected.write().await;
        if disconnected {
            set.insert(sensor);
        } else {
            set.remove(&sensor);
        }
    }

    /// Make every fetch fail with a network-style error.
    pub async fn set_should_fail(&self, fail: bool, message: Option<&str>) {
        self.should_fail.store(fail, Ordering::Relaxed);
        if let Some(msg) = message {
            *self.fail_message.write().await = msg.to_string();
        }
    }

    /// Fail the next `count` fetches, then succeed.
    pub fn set_transient_failures(&self, count: u32) {
        self.remaining_failures.store(count, Ordering::Relaxed);
    }

    /// Set simulated fetch latency.
    pub fn set_fetch_latency(&self, latency: Duration) {
        self.fetch_latency_ms
            .store(latency.as_millis() as u64, Ordering::Relaxed);
    }

    /// Make logins fail with HTTP 401 and this message.
    pub async fn set_login_failure(&self, message: Option<&str>) {
        *self.login_failure.write().await = message.map(String::from);
    }

    /// Queue the response of the next command.
    pub async fn queue_ack(&self, ack: CommandAck, delay: Duration) {
        self.acks.write().await.push_back(ScriptedAck {
            response: Ok(ack),
            delay,
        });
    }

    /// Queue an HTTP error as the response of the next command.
    pub async fn queue_command_error(&self, status: u16, delay: Duration) {
        self.acks.write().await.push_back(ScriptedAck {
            response: Err(status),
            delay,
        });
    }

    /// Commands received so far, in arrival order.
    pub async fn commands(&self) -> Vec<RecordedCommand> {
        self.commands.read().await.clone()
    }

    /// Get the number of fetches attempted.
    pub fn fetch_count(&self) -> u32 {
        self.fetch_count.load(Ordering::Relaxed)
    }

    /// Get the number of commands received.
    pub fn command_count(&self) -> u32 {
        self.command_count.load(Ordering::Relaxed)
    }

    /// Get the number of login attempts.
    pub fn login_count(&self) -> u32 {
        self.login_count.load(Ordering::Relaxed)
    }

    async fn check_should_fail(&self) -> Result<()> {
        let latency = self.fetch_latency_ms.load(Ordering::Relaxed);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }

        let transient = self
            .remaining_failures
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1))
            .is_ok();
        if transient || self.should_fail.load(Ordering::Relaxed) {
            return Err(Error::Http {
                status: 503,
                message: self.fail_message.read().await.clone(),
            });
        }
        Ok(())
    }

    async fn respond(&self, command: RecordedCommand) -> Result<CommandAck> {
        self.command_count.fetch_add(1, Ordering::Relaxed);
        self.commands.write().await.push(command);

        let scripted = self.acks.write().await.pop_front();
        let Some(scripted) = scripted else {
            return Ok(CommandAck::success());
        };
        if !scripted.delay.is_zero() {
            tokio::time::sleep(scripted.delay).await;
        }
        scripted.response.map_err(|status| Error::Http {
            status,
            message: "Mock command failure".to_string(),
        })
    }
}

#[async_trait]
impl SecurityApi for MockApi {
    async fn login(&self, username: &str, _password: &str) -> Result<LoginResponse> {
        self.login_count.fetch_add(1, Ordering::Relaxed);
        if let Some(message) = self.login_failure.read().await.clone() {
            return Err(Error::Http {
                status: 401,
                message,
            });
        }
        let admin = username == "admin";
        Ok(LoginResponse {
            token: format!("mock-{}", username),
            username: Some(username.to_string()),
            role: Some(if admin { "admin" } else { "user" }.to_string()),
            is_superuser: admin,
            user_id: None,
        })
    }

    async fn fetch_status(&self, _site_id: &str, _token: &str) -> Result<FetchedSnapshot> {
        self.fetch_count.fetch_add(1, Ordering::Relaxed);
        let started = Instant::now();
        self.check_should_fail().await?;

        let mut snapshot = match self.fixed_snapshot.read().await.clone() {
            Some(snapshot) => snapshot,
            None => Self::random_snapshot(),
        };
        for key in self.disconnected.read().await.iter() {
            let reading = snapshot.get(key).copied().unwrap_or_default();
            snapshot.insert(key.clone(), reading.with_connected(false));
        }

        Ok(FetchedSnapshot {
            snapshot,
            response_time_ms: started.elapsed().as_secs_f64() * 1000.0,
        })
    }

    async fn set_mode(&self, site_id: &str, _token: &str, mode: Mode) -> Result<CommandAck> {
        self.respond(RecordedCommand::Mode {
            site_id: site_id.to_string(),
            mode,
        })
        .await
    }

    async fn set_sensor(
        &self,
        site_id: &str,
        _token: &str,
        sensor: &SensorKey,
        enabled: bool,
    ) -> Result<CommandAck> {
        self.respond(RecordedCommand::Sensor {
            site_id: site_id.to_string(),
            sensor: sensor.clone(),
            enabled,
        })
        .await
    }
}

/// Generate the mock "site data" series for one quantity.
///
/// Produces [`SITE_SERIES_POINTS`] samples one minute apart ending at `now`,
/// oldest first.
pub fn site_series(kind: ChartKind, now: OffsetDateTime, offset: UtcOffset) -> ChartSeries {
    let mut rng = rand::rng();
    let points = (0..SITE_SERIES_POINTS)
        .rev()
        .map(|minutes_ago| {
            let at = now - time::Duration::minutes(minutes_ago as i64);
            let y = match kind {
                ChartKind::Temperature => round1(rng.random_range(20.0..30.0)),
                ChartKind::Humidity => round1(rng.random_range(50.0..80.0)),
                ChartKind::Vibration => f64::from(u8::from(rng.random_bool(0.2))),
                ChartKind::Pir => f64::from(u8::from(rng.random_bool(0.3))),
            };
            ChartPoint {
                x: format_clock(at, offset),
                y,
            }
        })
        .collect();

    ChartSeries {
        kind,
        label: kind.label().to_string(),
        title: kind.title().to_string(),
        axis_title: kind.axis_title().to_string(),
        points,
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
