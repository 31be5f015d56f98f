//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::builder::FalseyValueParser;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use securityhub_types::{Mode, SensorKey};

/// Output format for commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Visual styling mode for output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum StyleMode {
    /// Standard styling with colors
    Minimal,
    /// Rich styling with tables and headers (default)
    #[default]
    Rich,
    /// Plain text with no decorations (for scripting)
    Plain,
}

/// Reusable site selection arguments
#[derive(Debug, Clone, Args)]
pub struct SiteArgs {
    /// Site (home) id, or use SECURITYHUB_SITE env var
    #[arg(short, long, env = "SECURITYHUB_SITE")]
    pub site: Option<u32>,

    /// Talk to the built-in mock site instead of the server
    #[arg(long)]
    pub mock: bool,
}

/// Reusable output format arguments
#[derive(Debug, Clone, Args)]
pub struct OutputArgs {
    /// Output format
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,
}

#[derive(Parser)]
#[command(name = "securityhub")]
#[command(author, version, about = "CLI for SecurityHub security monitoring sites", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output as JSON (shorthand for --format json)
    #[arg(long, global = true)]
    pub json: bool,

    /// Output compact JSON (no pretty-printing)
    #[arg(long, global = true)]
    pub compact: bool,

    /// Disable colored output (honors NO_COLOR)
    #[arg(
        long,
        global = true,
        env = "NO_COLOR",
        value_parser = FalseyValueParser::new()
    )]
    pub no_color: bool,

    /// Visual styling mode (minimal, rich, plain)
    #[arg(
        long,
        global = true,
        value_enum,
        default_value = "rich",
        env = "SECURITYHUB_STYLE"
    )]
    pub style: StyleMode,

    /// Base URL of the SecurityHub server
    #[arg(long, global = true, env = "SECURITYHUB_API_URL")]
    pub api_url: Option<String>,

    /// Path of the local state database
    #[arg(long, global = true, env = "SECURITYHUB_DB")]
    pub db: Option<PathBuf>,

    /// Write output to file instead of stdout
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in and remember the session
    Login {
        /// Account name (prompted when omitted)
        #[arg(short, long)]
        username: Option<String>,

        /// Account password (prompted when omitted)
        #[arg(long, env = "SECURITYHUB_PASSWORD", hide_env_values = true)]
        password: Option<String>,

        /// Log in against the built-in mock server
        #[arg(long)]
        mock: bool,
    },

    /// Forget the saved session
    Logout,

    /// Show the logged-in account
    Whoami {
        #[command(flatten)]
        output: OutputArgs,
    },

    /// List a client's homes with their armed and stay flags
    Sites {
        /// Client id (defaults to the configured client)
        #[arg(short, long)]
        client: Option<u32>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Toggle the armed flag of a home
    Arm {
        /// Home number as listed by `sites` (1-based)
        #[arg(value_parser = parse_home_number)]
        home: usize,

        /// Client id (defaults to the configured client)
        #[arg(short, long)]
        client: Option<u32>,
    },

    /// Toggle the stay flag of a home
    Stay {
        /// Home number as listed by `sites` (1-based)
        #[arg(value_parser = parse_home_number)]
        home: usize,

        /// Client id (defaults to the configured client)
        #[arg(short, long)]
        client: Option<u32>,
    },

    /// Fetch sensor status of one or more sites once
    Status {
        /// Site id(s) - can be specified multiple times, or comma-separated
        #[arg(short, long, value_delimiter = ',', env = "SECURITYHUB_SITE")]
        site: Vec<u32>,

        /// Talk to the built-in mock site instead of the server
        #[arg(long)]
        mock: bool,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Continuously monitor a site
    Watch {
        #[command(flatten)]
        site: SiteArgs,

        #[command(flatten)]
        output: OutputArgs,

        /// Polling interval in seconds (defaults to the configured interval)
        #[arg(short, long)]
        interval: Option<u64>,

        /// Number of fetches before exiting (0 for unlimited)
        #[arg(short = 'n', long, default_value = "0")]
        count: u32,

        /// Print the chart summary after every fetch
        #[arg(long)]
        charts: bool,
    },

    /// Set the system mode of a site
    Mode {
        /// New mode (stay, away, disarm)
        #[arg(value_parser = parse_mode)]
        mode: Mode,

        #[command(flatten)]
        site: SiteArgs,
    },

    /// Enable or disable a sensor
    Sensor {
        /// Sensor key (pir, vibration, dht)
        #[arg(value_parser = parse_sensor_key)]
        sensor: SensorKey,

        /// New state (on/off)
        #[arg(value_parser = parse_bool_arg, action = ArgAction::Set)]
        enabled: bool,

        #[command(flatten)]
        site: SiteArgs,
    },

    /// Show the system log
    Logs {
        /// Delete every entry
        #[arg(long)]
        clear: bool,

        /// Show only the newest N entries
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Show generated sample data for a site
    SiteData {
        /// Site id (defaults to the configured site)
        #[arg(short, long)]
        site: Option<u32>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Parse a 1-based home number
fn parse_home_number(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(format!("'{}' is not a valid home number (1, 2, ...)", s)),
    }
}

fn parse_mode(s: &str) -> Result<Mode, String> {
    s.parse::<Mode>()
        .map_err(|_| format!("Invalid mode '{}'. Valid values: stay, away, disarm", s))
}

fn parse_sensor_key(s: &str) -> Result<SensorKey, String> {
    s.parse::<SensorKey>().map_err(|e| e.to_string())
}

/// Parse boolean argument with flexible input
fn parse_bool_arg(s: &str) -> Result<bool, String> {
    match s.to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" | "enable" | "enabled" => Ok(true),
        "false" | "no" | "off" | "0" | "disable" | "disabled" => Ok(false),
        _ => Err(format!(
            "Invalid boolean value '{}'. Use: on/off, true/false, yes/no, 1/0",
            s
        )),
    }
}

/// Configuration keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConfigKey {
    /// Base URL of the SecurityHub server
    ApiUrl,
    /// Default client id
    Client,
    /// Default site id
    Site,
    /// Polling interval in seconds
    PollInterval,
    /// Chart refresh interval in seconds
    ChartInterval,
    /// Request timeout in seconds
    Timeout,
    /// Disable colored output
    NoColor,
    /// Default output format
    Format,
}

/// Configuration subcommands
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Get a configuration value
    Get {
        /// Configuration key
        #[arg(value_enum)]
        key: ConfigKey,
    },

    /// Set a configuration value
    Set {
        /// Configuration key
        #[arg(value_enum)]
        key: ConfigKey,
        /// Configuration value
        value: String,
    },

    /// Unset (remove) a configuration value
    Unset {
        /// Configuration key to remove
        #[arg(value_enum)]
        key: ConfigKey,
    },

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_home_number() {
        assert_eq!(parse_home_number("2"), Ok(2));
        assert!(parse_home_number("0").is_err());
        assert!(parse_home_number("two").is_err());
    }

    #[test]
    fn test_parse_mode_is_case_insensitive() {
        assert_eq!(parse_mode("STAY"), Ok(Mode::Stay));
        assert!(parse_mode("panic").unwrap_err().contains("stay, away, disarm"));
    }

    #[test]
    fn test_parse_bool_arg() {
        assert_eq!(parse_bool_arg("on"), Ok(true));
        assert_eq!(parse_bool_arg("Disabled"), Ok(false));
        assert!(parse_bool_arg("maybe").is_err());
    }

    #[test]
    fn test_parse_sensor_command() {
        let cli = Cli::try_parse_from(["securityhub", "sensor", "PIR", "off", "--site", "3"]).unwrap();
        match cli.command {
            Commands::Sensor {
                sensor,
                enabled,
                site,
            } => {
                assert_eq!(sensor, SensorKey::pir());
                assert!(!enabled);
                assert_eq!(site.site, Some(3));
                assert!(!site.mock);
            }
            _ => panic!("expected sensor command"),
        }
    }

    #[test]
    fn test_parse_sensor_on_with_no_color_flag() {
        let cli = Cli::try_parse_from(["securityhub", "--no-color", "sensor", "pir", "on"]).unwrap();
        assert!(cli.no_color);
        match cli.command {
            Commands::Sensor { enabled, .. } => assert!(enabled),
            _ => panic!("expected sensor command"),
        }
        assert!(Cli::try_parse_from(["securityhub", "sensor", "pir", "maybe"]).is_err());
        assert!(Cli::try_parse_from(["securityhub", "sensor", "pir"]).is_err());
    }

    #[test]
    fn test_status_accepts_site_list() {
        let cli = Cli::try_parse_from(["securityhub", "status", "--site", "1,2", "--mock"]).unwrap();
        match cli.command {
            Commands::Status { site, mock, .. } => {
                assert_eq!(site, vec![1, 2]);
                assert!(mock);
            }
            _ => panic!("expected status command"),
        }
    }
}
