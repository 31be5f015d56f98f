//! Utility functions for CLI operations.

use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use dialoguer::{Input, Password, theme::ColorfulTheme};
use time::UtcOffset;

use securityhub_core::{ApiClient, MockApi, SecurityApi, SessionStore};
use securityhub_store::SqliteStore;

/// Token used for sites served by the built-in mock.
pub const MOCK_TOKEN: &str = "mock-token";

/// The local UTC offset, falling back to UTC when it cannot be determined.
pub fn local_offset() -> UtcOffset {
    let seconds = chrono::Local::now().offset().local_minus_utc();
    UtcOffset::from_whole_seconds(seconds).unwrap_or(UtcOffset::UTC)
}

/// Open the state database at `path`, or at the default location.
pub fn open_store(path: Option<&Path>) -> Result<Arc<SqliteStore>> {
    let path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(securityhub_store::default_db_path);
    let store = SqliteStore::open(&path)
        .with_context(|| format!("Failed to open state database: {}", path.display()))?;
    Ok(Arc::new(store))
}

/// Build the API the command talks to.
pub fn connect_api(
    mock: bool,
    api_url: &str,
    timeout: std::time::Duration,
) -> Result<Arc<dyn SecurityApi>> {
    if mock {
        tracing::debug!("Using the built-in mock site");
        return Ok(Arc::new(MockApi::new()));
    }
    let client = ApiClient::with_timeout(api_url, timeout)
        .with_context(|| format!("Invalid API URL: {}", api_url))?;
    Ok(Arc::new(client))
}

/// Token of the saved session; the mock accepts any token.
pub fn require_token(sessions: &SessionStore, mock: bool) -> Result<String> {
    match sessions.load().context("Failed to read the saved session")? {
        Some(session) => Ok(session.token),
        None if mock => Ok(MOCK_TOKEN.to_string()),
        None => bail!(
            "Not logged in. Run 'securityhub login' first, or use --mock for the demo site."
        ),
    }
}

/// Whether prompts can be shown.
pub fn is_interactive() -> bool {
    io::stdin().is_terminal() && io::stderr().is_terminal()
}

/// Use `value`, prompting for it on a terminal. Non-interactive runs get an
/// empty string, which login rejects.
pub fn username_or_prompt(value: Option<String>) -> Result<String> {
    match value {
        Some(v) => Ok(v),
        None if is_interactive() => Input::<String>::with_theme(&ColorfulTheme::default())
            .with_prompt("Username")
            .interact_text()
            .context("Failed to read username"),
        None => Ok(String::new()),
    }
}

pub fn password_or_prompt(value: Option<String>) -> Result<String> {
    match value {
        Some(v) => Ok(v),
        None if is_interactive() => Password::with_theme(&ColorfulTheme::default())
            .with_prompt("Password")
            .interact()
            .context("Failed to read password"),
        None => Ok(String::new()),
    }
}

/// Write output to file or stdout
pub fn write_output(output: Option<&PathBuf>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write to {}", path.display()))?;
        }
        None => {
            print!("{}", content);
            io::stdout().flush()?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use securityhub_core::{MemoryStore, Session};

    use super::*;

    #[test]
    fn test_require_token_without_session() {
        let sessions = SessionStore::new(Arc::new(MemoryStore::new()));
        let err = require_token(&sessions, false).unwrap_err().to_string();
        assert!(err.contains("Not logged in"));
        assert_eq!(require_token(&sessions, true).unwrap(), MOCK_TOKEN);
    }

    #[test]
    fn test_require_token_uses_saved_session() {
        let sessions = SessionStore::new(Arc::new(MemoryStore::new()));
        sessions
            .save(&Session {
                token: "abc".to_string(),
                username: "ali".to_string(),
                role: None,
                is_superuser: false,
                user_id: None,
            })
            .unwrap();
        assert_eq!(require_token(&sessions, false).unwrap(), "abc");
        assert_eq!(require_token(&sessions, true).unwrap(), "abc");
    }

    #[test]
    fn test_connect_api_rejects_bad_url() {
        let err = connect_api(false, "not a url", std::time::Duration::from_secs(1));
        assert!(err.is_err());
        assert!(connect_api(true, "not a url", std::time::Duration::from_secs(1)).is_ok());
    }

    #[test]
    fn test_open_store_at_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.db");
        let store = open_store(Some(&path)).unwrap();
        assert_eq!(store.path(), Some(path.as_path()));
    }

    #[test]
    fn test_write_output_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        write_output(Some(&path), "hello\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello\n");
    }
}
