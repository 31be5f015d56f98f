//! Configuration file management.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use time::UtcOffset;

use securityhub_core::MonitorOptions;

use crate::cli::{ConfigKey, OutputFormat};

/// Server used when neither flag, env var nor config names one.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_CLIENT: u32 = 1;
pub const DEFAULT_SITE: u32 = 1;
pub const DEFAULT_POLL_SECS: u64 = 5;
pub const DEFAULT_CHART_SECS: u64 = 5;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Configuration file structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the SecurityHub server
    #[serde(default)]
    pub api_url: Option<String>,

    /// Default client id for the home board
    #[serde(default)]
    pub client: Option<u32>,

    /// Default site id for status, watch and commands
    #[serde(default)]
    pub site: Option<u32>,

    /// Polling interval in seconds
    #[serde(default)]
    pub poll_interval: Option<u64>,

    /// Chart refresh interval in seconds
    #[serde(default)]
    pub chart_interval: Option<u64>,

    /// Request timeout in seconds
    #[serde(default)]
    pub timeout: Option<u64>,

    /// Disable colored output
    #[serde(default)]
    pub no_color: bool,

    /// Default output format
    #[serde(default)]
    pub format: Option<String>,
}

impl Config {
    /// Get the config file path.
    ///
    /// `SECURITYHUB_CONFIG` overrides the platform location.
    pub fn path() -> PathBuf {
        if let Some(path) = std::env::var_os("SECURITYHUB_CONFIG") {
            return PathBuf::from(path);
        }
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("securityhub")
            .join("config.toml")
    }

    /// Load config from file, or return default if not found
    pub fn load() -> Self {
        let path = Self::path();
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Warning: {:#}", e);
                Self::default()
            }
        }
    }

    /// Load config from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))
    }

    /// Save config to file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }

    pub fn client_id(&self) -> u32 {
        self.client.unwrap_or(DEFAULT_CLIENT)
    }

    pub fn site_id(&self) -> u32 {
        self.site.unwrap_or(DEFAULT_SITE)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    /// Monitor options from the configured intervals.
    pub fn monitor_options(&self, utc_offset: UtcOffset) -> MonitorOptions {
        MonitorOptions::default()
            .poll_interval(Duration::from_secs(
                self.poll_interval.unwrap_or(DEFAULT_POLL_SECS),
            ))
            .chart_interval(Duration::from_secs(
                self.chart_interval.unwrap_or(DEFAULT_CHART_SECS),
            ))
            .utc_offset(utc_offset)
    }

    /// Current value of `key`, `None` when unset.
    pub fn get(&self, key: ConfigKey) -> Option<String> {
        match key {
            ConfigKey::ApiUrl => self.api_url.clone(),
            ConfigKey::Client => self.client.map(|v| v.to_string()),
            ConfigKey::Site => self.site.map(|v| v.to_string()),
            ConfigKey::PollInterval => self.poll_interval.map(|v| v.to_string()),
            ConfigKey::ChartInterval => self.chart_interval.map(|v| v.to_string()),
            ConfigKey::Timeout => self.timeout.map(|v| v.to_string()),
            ConfigKey::NoColor => Some(self.no_color.to_string()),
            ConfigKey::Format => self.format.clone(),
        }
    }

    /// Validate and store `value` under `key`.
    pub fn set(&mut self, key: ConfigKey, value: &str) -> Result<()> {
        match key {
            ConfigKey::ApiUrl => {
                if !(value.starts_with("http://") || value.starts_with("https://")) {
                    bail!("API URL must start with http:// or https://");
                }
                self.api_url = Some(value.trim_end_matches('/').to_string());
            }
            ConfigKey::Client => self.client = Some(parse_id(value, "client")?),
            ConfigKey::Site => self.site = Some(parse_id(value, "site")?),
            ConfigKey::PollInterval => self.poll_interval = Some(parse_secs(value)?),
            ConfigKey::ChartInterval => self.chart_interval = Some(parse_secs(value)?),
            ConfigKey::Timeout => self.timeout = Some(parse_secs(value)?),
            ConfigKey::NoColor => {
                self.no_color = value
                    .parse()
                    .context("Invalid boolean value. Use: true or false")?;
            }
            ConfigKey::Format => {
                let format = value.to_lowercase();
                if format != "text" && format != "json" {
                    bail!("Invalid format '{}'. Valid values: text, json", value);
                }
                self.format = Some(format);
            }
        }
        Ok(())
    }

    /// Remove `key`, restoring its default.
    pub fn unset(&mut self, key: ConfigKey) {
        match key {
            ConfigKey::ApiUrl => self.api_url = None,
            ConfigKey::Client => self.client = None,
            ConfigKey::Site => self.site = None,
            ConfigKey::PollInterval => self.poll_interval = None,
            ConfigKey::ChartInterval => self.chart_interval = None,
            ConfigKey::Timeout => self.timeout = None,
            ConfigKey::NoColor => self.no_color = false,
            ConfigKey::Format => self.format = None,
        }
    }
}

fn parse_id(value: &str, what: &str) -> Result<u32> {
    value
        .parse()
        .with_context(|| format!("'{}' is not a valid {} id", value, what))
}

fn parse_secs(value: &str) -> Result<u64> {
    match value.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => bail!("'{}' is not a positive number of seconds", value),
    }
}

/// Resolve the server URL: flag or env var first, then config, then default.
pub fn resolve_api_url(arg: Option<&str>, config: &Config) -> String {
    arg.map(str::to_string)
        .or_else(|| config.api_url.clone())
        .unwrap_or_else(|| DEFAULT_API_URL.to_string())
}

/// Resolve the site id from arg or config.
pub fn resolve_site(site: Option<u32>, config: &Config) -> u32 {
    site.unwrap_or_else(|| config.site_id())
}

/// Resolve output format: `--json` wins, then `--format`, then config.
pub fn resolve_format(arg: Option<OutputFormat>, json: bool, config: &Config) -> OutputFormat {
    if json {
        return OutputFormat::Json;
    }
    arg.unwrap_or_else(|| match config.format.as_deref() {
        Some("json") => OutputFormat::Json,
        _ => OutputFormat::Text,
    })
}
