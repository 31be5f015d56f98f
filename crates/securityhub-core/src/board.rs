//! Per-client home board: armed and stay flags for each site.
//!
//! Flags are local to this client and persisted under `armedHomes-{id}` and
//! `stayMode-{id}`. Every toggle is recorded in the system log and raises a
//! short-lived banner message.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use time::OffsetDateTime;
use tracing::{debug, info};

use securityhub_types::{Client, Directory, Site};

use crate::error::{Error, Result};
use crate::persist::{KeyValueStore, armed_homes_key, load_json, save_json, stay_mode_key};
use crate::syslog::SystemLog;

/// How long a banner message stays visible.
pub const BANNER_TTL: Duration = Duration::from_secs(5);

/// A transient message raised by a toggle.
#[derive(Debug, Clone, PartialEq)]
pub struct Banner {
    pub message: String,
    pub raised_at: OffsetDateTime,
}

/// One site row of the board.
#[derive(Debug, Clone, Copy)]
pub struct BoardRow<'a> {
    /// Zero-based position in the client's site list.
    pub index: usize,
    pub site: &'a Site,
    pub armed: bool,
    pub stay: bool,
}

/// Mounted home board of one client.
pub struct HomeBoard {
    store: Arc<dyn KeyValueStore>,
    log: SystemLog,
    client: Client,
    armed: Vec<bool>,
    stay: Vec<bool>,
    banners: Vec<Banner>,
}

impl std::fmt::Debug for HomeBoard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HomeBoard")
            .field("client", &self.client.id)
            .field("armed", &self.armed)
            .field("stay", &self.stay)
            .finish()
    }
}

impl HomeBoard {
    /// Load a client's board.
    ///
    /// Missing flags are initialised at random; stored arrays whose length
    /// does not match the client's site count are padded or truncated. The
    /// resulting flags are saved straight away.
    pub fn mount(store: Arc<dyn KeyValueStore>, directory: &Directory, client_id: u32) -> Result<Self> {
        let client = directory
            .find_client(client_id)
            .cloned()
            .ok_or(Error::UnknownClient(client_id))?;
        let count = client.sites.len();

        let armed = load_flags(store.as_ref(), &armed_homes_key(client_id), count)?;
        let stay = load_flags(store.as_ref(), &stay_mode_key(client_id), count)?;

        let board = Self {
            log: SystemLog::new(store.clone()),
            store,
            client,
            armed,
            stay,
            banners: Vec::new(),
        };
        board.save()?;
        debug!("Mounted home board for client {}", client_id);
        Ok(board)
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn armed(&self) -> &[bool] {
        &self.armed
    }

    pub fn stay(&self) -> &[bool] {
        &self.stay
    }

    /// Rows in site order.
    pub fn rows(&self) -> impl Iterator<Item = BoardRow<'_>> {
        self.client
            .sites
            .iter()
            .enumerate()
            .map(|(index, site)| BoardRow {
                index,
                site,
                armed: self.armed[index],
                stay: self.stay[index],
            })
    }

    /// Flip the armed flag of the site at `index`.
    pub fn toggle_armed(&mut self, index: usize) -> Result<String> {
        self.toggle_armed_at(index, OffsetDateTime::now_utc())
    }

    /// Flip the armed flag, timestamping the log and banner with `now`.
    pub fn toggle_armed_at(&mut self, index: usize, now: OffsetDateTime) -> Result<String> {
        let site = self.site(index)?;
        let armed = !self.armed[index];
        let message = format!(
            "HOME NO {} at {} is now {}",
            index + 1,
            site.address,
            if armed { "Armed" } else { "Disarmed" }
        );
        let mut flags = self.armed.clone();
        flags[index] = armed;
        self.save_flags(&flags, &self.stay)?;
        self.armed = flags;
        self.record(message, now)
    }

    /// Flip the stay flag of the site at `index`.
    pub fn toggle_stay(&mut self, index: usize) -> Result<String> {
        self.toggle_stay_at(index, OffsetDateTime::now_utc())
    }

    /// Flip the stay flag, timestamping the log and banner with `now`.
    pub fn toggle_stay_at(&mut self, index: usize, now: OffsetDateTime) -> Result<String> {
        let site = self.site(index)?;
        let stay = !self.stay[index];
        let message = format!(
            "HOME NO {} at {} is now in {}",
            index + 1,
            site.address,
            if stay { "Stay Mode" } else { "Away Mode" }
        );
        let mut flags = self.stay.clone();
        flags[index] = stay;
        self.save_flags(&self.armed, &flags)?;
        self.stay = flags;
        self.record(message, now)
    }

    /// Banner messages still visible at `now`; expired ones are dropped.
    pub fn banners(&mut self, now: OffsetDateTime) -> &[Banner] {
        self.banners
            .retain(|banner| now - banner.raised_at < BANNER_TTL);
        &self.banners
    }

    fn site(&self, index: usize) -> Result<&Site> {
        self.client.sites.get(index).ok_or_else(|| {
            Error::InvalidInput(format!(
                "No home at position {} (client {} has {})",
                index + 1,
                self.client.id,
                self.client.sites.len()
            ))
        })
    }

    /// Log and announce a toggle whose flags are already saved.
    fn record(&mut self, message: String, now: OffsetDateTime) -> Result<String> {
        self.log.append_at(message.clone(), now)?;
        self.banners.push(Banner {
            message: message.clone(),
            raised_at: now,
        });
        info!("{}", message);
        Ok(message)
    }

    fn save(&self) -> Result<()> {
        self.save_flags(&self.armed, &self.stay)
    }

    fn save_flags(&self, armed: &[bool], stay: &[bool]) -> Result<()> {
        save_json(self.store.as_ref(), &armed_homes_key(self.client.id), armed)?;
        save_json(self.store.as_ref(), &stay_mode_key(self.client.id), stay)
    }
}

fn load_flags(store: &dyn KeyValueStore, key: &str, count: usize) -> Result<Vec<bool>> {
    let mut flags: Vec<bool> = load_json(store, key)?.unwrap_or_default();
    flags.truncate(count);
    let mut rng = rand::rng();
    while flags.len() < count {
        flags.push(rng.random_bool(0.5));
    }
    Ok(flags)
}
