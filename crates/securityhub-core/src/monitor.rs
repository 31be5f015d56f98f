//! Live monitoring of one site.
//!
//! A [`SiteMonitor`] is the mounted security view of a site. While it runs it
//! polls the sensor-status endpoint, merges every snapshot into the
//! accumulated [`SiteView`], and republishes chart projections on a separate
//! timer. Mode and sensor commands go through the same monitor so that every
//! state transition happens under a single lock.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use securityhub_core::{MonitorOptions, SiteMonitor, ApiClient};
//!
//! # async fn example() -> securityhub_core::Result<()> {
//! let api = Arc::new(ApiClient::new("http://localhost:8000")?);
//! let mut monitor = SiteMonitor::new(api, "1", "token", MonitorOptions::default())?;
//! monitor.start()?;
//!
//! let mut views = monitor.subscribe();
//! views.changed().await.ok();
//! println!("{} sensors", views.borrow().sensors.len());
//!
//! monitor.stop().await;
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use futures::Stream;
use serde::Serialize;
use time::{OffsetDateTime, UtcOffset};
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use securityhub_types::{Mode, Notification, SensorKey, SensorMap, default_sensor_map};

use crate::chart::{ChartSeries, project};
use crate::client::FetchedSnapshot;
use crate::commands::{
    Controlled, MODE_FAILED_BANNER, Resolution, SENSOR_FAILED_BANNER, mode_applied_message,
    mode_rejected_message, sensor_applied_message, sensor_rejected_message,
};
use crate::error::{Error, Result};
use crate::merge::{DEFAULT_INTERVAL, MergeContext, merge};
use crate::traits::SecurityApi;

/// Options for a [`SiteMonitor`].
#[derive(Debug, Clone)]
pub struct MonitorOptions {
    /// Time between sensor-status fetches. The first fetch happens immediately.
    pub poll_interval: Duration,
    /// Time between chart projections.
    pub chart_interval: Duration,
    /// Offset used for clock times in notifications and chart labels.
    pub utc_offset: UtcOffset,
}

impl Default for MonitorOptions {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_INTERVAL,
            chart_interval: Duration::from_secs(5),
            utc_offset: UtcOffset::UTC,
        }
    }
}

impl MonitorOptions {
    /// Set the poll interval.
    #[must_use]
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the chart interval.
    #[must_use]
    pub fn chart_interval(mut self, interval: Duration) -> Self {
        self.chart_interval = interval;
        self
    }

    /// Set the display offset.
    #[must_use]
    pub fn utc_offset(mut self, offset: UtcOffset) -> Self {
        self.utc_offset = offset;
        self
    }

    /// Validate the options.
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval.is_zero() {
            return Err(Error::InvalidConfig(
                "poll interval must be greater than zero".to_string(),
            ));
        }
        if self.chart_interval.is_zero() {
            return Err(Error::InvalidConfig(
                "chart interval must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Number of notifications a view keeps; older ones are dropped first.
pub const NOTIFICATION_CAPACITY: usize = 50;

/// Everything the security view of a site shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteView {
    pub site_id: String,
    pub sensors: SensorMap,
    pub mode: Controlled<Mode>,
    /// Command state of each sensor's `enabled` flag.
    pub sensor_controls: BTreeMap<SensorKey, Controlled<bool>>,
    /// Newest last, at most [`NOTIFICATION_CAPACITY`].
    pub notifications: Vec<Notification>,
    /// Notifications raised since mount, including dismissed and dropped ones.
    #[serde(skip)]
    pub notifications_raised: u64,
    /// Error banner; cleared by the next successful fetch.
    pub api_error: Option<String>,
    /// Time of the last successful fetch.
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_fetch: Option<OffsetDateTime>,
}

impl SiteView {
    /// The view of a freshly mounted site.
    pub fn new(site_id: impl Into<String>) -> Self {
        Self {
            site_id: site_id.into(),
            sensors: default_sensor_map(),
            mode: Controlled::new(Mode::default()),
            sensor_controls: BTreeMap::new(),
            notifications: Vec::new(),
            notifications_raised: 0,
            api_error: None,
            last_fetch: None,
        }
    }

    /// The acknowledged mode.
    pub fn mode(&self) -> Mode {
        *self.mode.value()
    }

    /// Remove the notification at `index`.
    pub fn dismiss_notification(&mut self, index: usize) -> Option<Notification> {
        (index < self.notifications.len()).then(|| self.notifications.remove(index))
    }

    fn push_notification(&mut self, message: String, sensor: Option<SensorKey>) {
        let now = OffsetDateTime::now_utc();
        let notification = match sensor {
            Some(key) => Notification::for_sensor(key, message, now),
            None => Notification::new(message, now),
        };
        self.add_notification(notification);
    }

    fn add_notification(&mut self, notification: Notification) {
        self.notifications.push(notification);
        self.notifications_raised += 1;
        let excess = self
            .notifications
            .len()
            .saturating_sub(NOTIFICATION_CAPACITY);
        self.notifications.drain(..excess);
    }

    /// Notifications raised after `raised` had been reached, oldest first.
    ///
    /// Pass the `notifications_raised` of an earlier view. Assumes nothing
    /// was dismissed in between; dropped notifications are not returned.
    pub fn notifications_since(&self, raised: u64) -> &[Notification] {
        let new = self.notifications_raised.saturating_sub(raised);
        let new = usize::try_from(new).unwrap_or(usize::MAX);
        let start = self.notifications.len().saturating_sub(new);
        &self.notifications[start..]
    }

    fn sensor_control(&mut self, key: &SensorKey) -> &mut Controlled<bool> {
        let enabled = self.sensors.get(key).is_some_and(|s| s.enabled);
        self.sensor_controls
            .entry(key.clone())
            .or_insert_with(|| Controlled::new(enabled))
    }
}

/// Banner shown while a site's sensor data cannot be fetched.
pub fn fetch_failed_banner(site_id: &str) -> String {
    format!(
        "Failed to fetch sensor data for Home {}. Please ensure the backend server is running.",
        site_id
    )
}

struct Shared {
    api: Arc<dyn SecurityApi>,
    site_id: String,
    token: String,
    options: MonitorOptions,
    cancel: CancellationToken,
    state: Mutex<SiteView>,
    view_tx: watch::Sender<SiteView>,
    chart_tx: watch::Sender<Vec<ChartSeries>>,
}

impl Shared {
    fn publish(&self, view: &SiteView) {
        self.view_tx.send_replace(view.clone());
    }

    /// Fetch once and apply the result. Returns the fetch error, if any.
    async fn poll_once(&self) -> Result<()> {
        let fetched = tokio::select! {
            _ = self.cancel.cancelled() => return Err(Error::Cancelled),
            result = self.api.fetch_status(&self.site_id, &self.token) => result,
        };
        self.apply_fetch(fetched).await
    }

    async fn apply_fetch(&self, fetched: Result<FetchedSnapshot>) -> Result<()> {
        let mut view = self.state.lock().await;
        if self.cancel.is_cancelled() {
            debug!("Site {} stopped; discarding fetch result", self.site_id);
            return Err(Error::Cancelled);
        }

        let outcome = match fetched {
            Ok(fetched) => {
                let now = OffsetDateTime::now_utc();
                let ctx = MergeContext::new(self.site_id.clone(), fetched.response_time_ms)
                    .at(now)
                    .interval(self.options.poll_interval)
                    .utc_offset(self.options.utc_offset);
                let outcome = merge(&view.sensors, &fetched.snapshot, &ctx);
                for notification in &outcome.notifications {
                    warn!("{}", notification.message);
                }
                view.sensors = outcome.sensors;
                for notification in outcome.notifications {
                    view.add_notification(notification);
                }
                view.api_error = None;
                view.last_fetch = Some(now);
                debug!(
                    "Merged {} sensor(s) for site {}",
                    fetched.snapshot.len(),
                    self.site_id
                );
                Ok(())
            }
            Err(e) => {
                warn!("Failed to fetch sensor data for site {}: {}", self.site_id, e);
                view.api_error = Some(fetch_failed_banner(&self.site_id));
                Err(e)
            }
        };
        self.publish(&view);
        outcome
    }

    fn project_charts(&self, view: &SiteView) {
        self.chart_tx
            .send_replace(project(&view.sensors, self.options.utc_offset));
    }
}

/// The mounted security view of one site.
pub struct SiteMonitor {
    shared: Arc<Shared>,
    tasks: Vec<JoinHandle<()>>,
}

impl std::fmt::Debug for SiteMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SiteMonitor")
            .field("site_id", &self.shared.site_id)
            .field("options", &self.shared.options)
            .field("running", &self.is_running())
            .finish()
    }
}

impl SiteMonitor {
    /// Create a monitor for a site. Nothing is fetched until [`start`](Self::start).
    pub fn new(
        api: Arc<dyn SecurityApi>,
        site_id: impl Into<String>,
        token: impl Into<String>,
        options: MonitorOptions,
    ) -> Result<Self> {
        options.validate()?;
        let site_id = site_id.into();
        let view = SiteView::new(site_id.clone());
        let charts = project(&view.sensors, options.utc_offset);
        let (view_tx, _) = watch::channel(view.clone());
        let (chart_tx, _) = watch::channel(charts);

        Ok(Self {
            shared: Arc::new(Shared {
                api,
                site_id,
                token: token.into(),
                options,
                cancel: CancellationToken::new(),
                state: Mutex::new(view),
                view_tx,
                chart_tx,
            }),
            tasks: Vec::new(),
        })
    }

    pub fn site_id(&self) -> &str {
        &self.shared.site_id
    }

    pub fn options(&self) -> &MonitorOptions {
        &self.shared.options
    }

    /// Whether the background tasks are running.
    pub fn is_running(&self) -> bool {
        !self.tasks.is_empty() && !self.shared.cancel.is_cancelled()
    }

    /// Token that stops the monitor when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.shared.cancel.clone()
    }

    /// Whether the monitor has been stopped.
    pub fn is_stopped(&self) -> bool {
        self.shared.cancel.is_cancelled()
    }

    /// Spawn the polling and chart tasks.
    ///
    /// Starting a running monitor does nothing; a stopped monitor cannot be
    /// restarted.
    pub fn start(&mut self) -> Result<()> {
        if self.shared.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        if !self.tasks.is_empty() {
            debug!("Monitor for site {} already running", self.shared.site_id);
            return Ok(());
        }

        info!(
            "Monitoring site {} every {:?}",
            self.shared.site_id, self.shared.options.poll_interval
        );
        self.tasks.push(tokio::spawn(poll_loop(self.shared.clone())));
        self.tasks.push(tokio::spawn(chart_loop(self.shared.clone())));
        Ok(())
    }

    /// Stop the background tasks and wait for them to finish.
    ///
    /// Fetches and command responses that complete afterwards are discarded.
    pub async fn stop(&mut self) {
        self.shared.cancel.cancel();
        for handle in self.tasks.drain(..) {
            if let Err(e) = handle.await {
                warn!("Monitor task for site {} ended abnormally: {}", self.shared.site_id, e);
            }
        }
        info!("Stopped monitoring site {}", self.shared.site_id);
    }

    /// Fetch and merge once, outside the schedule.
    pub async fn refresh(&self) -> Result<()> {
        self.shared.poll_once().await
    }

    /// Current view.
    pub fn view(&self) -> SiteView {
        self.shared.view_tx.borrow().clone()
    }

    /// Receiver notified after every state transition.
    pub fn subscribe(&self) -> watch::Receiver<SiteView> {
        self.shared.view_tx.subscribe()
    }

    /// Receiver of the latest chart projection.
    pub fn charts(&self) -> watch::Receiver<Vec<ChartSeries>> {
        self.shared.chart_tx.subscribe()
    }

    /// Stream of views, starting with the current one and ending when the
    /// monitor is dropped.
    pub fn updates(&self) -> impl Stream<Item = SiteView> + Send + use<> {
        let rx = self.subscribe();
        futures::stream::unfold((rx, true), |(mut rx, first)| async move {
            if !first && rx.changed().await.is_err() {
                return None;
            }
            let view = rx.borrow_and_update().clone();
            Some((view, (rx, false)))
        })
    }

    /// Ask the server to switch the site's mode.
    ///
    /// The mode changes only when the server answers `success`. Any other
    /// answer leaves it unchanged and raises the error banner.
    pub async fn set_mode(&self, mode: Mode) -> Result<Resolution> {
        let shared = &self.shared;
        let ticket = {
            let mut view = shared.state.lock().await;
            if shared.cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            let ticket = view.mode.begin(mode);
            shared.publish(&view);
            ticket
        };
        debug!("Setting mode of site {} to {}", shared.site_id, mode);

        let result = tokio::select! {
            _ = shared.cancel.cancelled() => return Err(Error::Cancelled),
            result = shared.api.set_mode(&shared.site_id, &shared.token, mode) => result,
        };

        let mut view = shared.state.lock().await;
        if shared.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        let resolution = match &result {
            Ok(ack) if ack.is_success() => view.mode.apply(&ticket),
            Ok(ack) => view
                .mode
                .reject(&ticket, format!("server answered '{}'", ack.status)),
            Err(e) => view.mode.reject(&ticket, e.to_string()),
        };
        match resolution {
            Resolution::Applied => {
                info!("Site {} mode set to {}", shared.site_id, mode);
                view.push_notification(mode_applied_message(mode), None);
            }
            Resolution::Rejected => {
                warn!("Mode command for site {} failed: {:?}", shared.site_id, view.mode.phase());
                view.api_error = Some(MODE_FAILED_BANNER.to_string());
                view.push_notification(mode_rejected_message(mode), None);
            }
            Resolution::Superseded => {
                debug!("Ignoring superseded mode response for site {}", shared.site_id);
            }
        }
        shared.publish(&view);
        Ok(resolution)
    }

    /// Ask the server to enable or disable a sensor.
    pub async fn toggle_sensor(&self, sensor: &SensorKey, enabled: bool) -> Result<Resolution> {
        let shared = &self.shared;
        let ticket = {
            let mut view = shared.state.lock().await;
            if shared.cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            let ticket = view.sensor_control(sensor).begin(enabled);
            shared.publish(&view);
            ticket
        };

        let result = tokio::select! {
            _ = shared.cancel.cancelled() => return Err(Error::Cancelled),
            result = shared.api.set_sensor(&shared.site_id, &shared.token, sensor, enabled) => result,
        };

        let mut view = shared.state.lock().await;
        if shared.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        let control = view.sensor_control(sensor);
        let resolution = match &result {
            Ok(ack) if ack.is_success() => control.apply(&ticket),
            Ok(ack) => control.reject(&ticket, format!("server answered '{}'", ack.status)),
            Err(e) => control.reject(&ticket, e.to_string()),
        };
        match resolution {
            Resolution::Applied => {
                view.sensors.entry(sensor.clone()).or_default().enabled = enabled;
                info!("{}", sensor_applied_message(sensor, enabled));
                view.push_notification(sensor_applied_message(sensor, enabled), Some(sensor.clone()));
            }
            Resolution::Rejected => {
                warn!("Sensor command for {} on site {} failed", sensor, shared.site_id);
                view.api_error = Some(SENSOR_FAILED_BANNER.to_string());
                view.push_notification(
                    sensor_rejected_message(sensor, enabled),
                    Some(sensor.clone()),
                );
            }
            Resolution::Superseded => {
                debug!("Ignoring superseded response for sensor {}", sensor);
            }
        }
        shared.publish(&view);
        Ok(resolution)
    }

    /// Dismiss the notification at `index`.
    pub async fn dismiss_notification(&self, index: usize) -> Option<Notification> {
        let mut view = self.shared.state.lock().await;
        let removed = view.dismiss_notification(index);
        if removed.is_some() {
            self.shared.publish(&view);
        }
        removed
    }
}

impl Drop for SiteMonitor {
    fn drop(&mut self) {
        self.shared.cancel.cancel();
    }
}

async fn poll_loop(shared: Arc<Shared>) {
    let mut ticker = interval(shared.options.poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = shared.cancel.cancelled() => {
                debug!("Polling of site {} cancelled", shared.site_id);
                break;
            }
            _ = ticker.tick() => {
                if let Err(Error::Cancelled) = shared.poll_once().await {
                    break;
                }
            }
        }
    }
}

async fn chart_loop(shared: Arc<Shared>) {
    let mut ticker = interval(shared.options.chart_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = shared.cancel.cancelled() => break,
            _ = ticker.tick() => {
                let view = shared.state.lock().await;
                if shared.cancel.is_cancelled() {
                    break;
                }
                shared.project_charts(&view);
            }
        }
    }
}
