//! Command implementations for the CLI.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;

use securityhub_core::{KeyValueStore, SecurityApi, SessionStore};

use crate::cli::OutputFormat;
use crate::config::{Config, resolve_format};
use crate::format::FormatOptions;
use crate::util::{connect_api, open_store, write_output};

mod board;
mod config;
mod control;
mod logs;
mod session;
mod site_data;
mod status;
mod watch;

pub use board::{cmd_arm, cmd_sites, cmd_stay};
pub use config::cmd_config;
pub use control::{cmd_mode, cmd_sensor};
pub use logs::cmd_logs;
pub use session::{cmd_login, cmd_logout, cmd_whoami};
pub use site_data::cmd_site_data;
pub use status::cmd_status;
pub use watch::{WatchArgs, cmd_watch};

/// Settings shared by every command.
pub struct AppContext {
    pub config: Config,
    pub opts: FormatOptions,
    pub api_url: String,
    pub db: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub quiet: bool,
    pub json: bool,
}

impl AppContext {
    /// Output format for a command's `--format` value.
    pub fn format(&self, arg: Option<OutputFormat>) -> OutputFormat {
        resolve_format(arg, self.json, &self.config)
    }

    /// The local state store.
    pub fn store(&self) -> Result<Arc<dyn KeyValueStore>> {
        let store: Arc<dyn KeyValueStore> = open_store(self.db.as_deref())?;
        Ok(store)
    }

    pub fn sessions(&self) -> Result<SessionStore> {
        Ok(SessionStore::new(self.store()?))
    }

    /// The server API, or the built-in mock.
    pub fn api(&self, mock: bool) -> Result<Arc<dyn SecurityApi>> {
        connect_api(mock, &self.api_url, self.config.timeout())
    }

    /// Write command output to `--output` or stdout.
    pub fn write(&self, content: &str) -> Result<()> {
        write_output(self.output.as_ref(), content)
    }

    /// Print a status message on stderr unless `--quiet`.
    pub fn note(&self, message: &str) {
        if !self.quiet {
            eprintln!("{}", message);
        }
    }
}
