//! Command-line interface for SecurityHub security monitoring sites.
//!
//! # Features
//!
//! - **Sessions**: log in once and reuse the saved token
//! - **Status**: fetch and merge a site's sensor snapshot
//! - **Watch**: poll a site continuously with disconnect notifications
//! - **Commands**: switch the system mode and enable or disable sensors
//! - **Home board**: list a client's homes and toggle armed and stay flags
//! - **System log**: review or clear recorded events
//! - **Mock server**: every site command works offline with `--mock`
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `login` | Log in and remember the session |
//! | `logout` | Forget the saved session |
//! | `whoami` | Show the logged-in account |
//! | `sites` | List a client's homes |
//! | `arm` / `stay` | Toggle a home's flags |
//! | `status` | Fetch sensor status once |
//! | `watch` | Continuously monitor a site |
//! | `mode` | Set the system mode |
//! | `sensor` | Enable or disable a sensor |
//! | `logs` | Show the system log |
//! | `site-data` | Show generated sample series for a site |
//! | `config` | Manage CLI configuration |
//! | `completions` | Generate shell completions |
//!
//! # Configuration
//!
//! Settings live in `~/.config/securityhub/config.toml` (or platform
//! equivalent), overridable with `SECURITYHUB_CONFIG`. Session, board flags
//! and the system log are stored in a SQLite database under the local data
//! directory, overridable with `--db` or `SECURITYHUB_DB`.
//!
//! # Environment Variables
//!
//! - `SECURITYHUB_API_URL`: Server base URL (overridden by `--api-url`)
//! - `SECURITYHUB_SITE`: Default site id (overridden by `--site`)
//! - `SECURITYHUB_PASSWORD`: Password for `login`
//! - `NO_COLOR`: Disable colored output when set
//!
//! # Examples
//!
//! Watch the demo site for three fetches:
//! ```bash
//! securityhub watch --mock -n 3 --interval 1
//! ```
//!
//! Log in and switch a site to away mode:
//! ```bash
//! securityhub login -u ali
//! securityhub mode away --site 2
//! ```

// The binary entry point and command implementations are in main.rs.

pub use securityhub_core;
pub use securityhub_types;
