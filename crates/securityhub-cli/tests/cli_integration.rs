//! CLI Integration Tests
//!
//! These tests run the `securityhub` binary against the built-in mock site,
//! with the config file and state database redirected into a temporary
//! directory.
//!
//! ```
//! cargo test --package securityhub-cli --test cli_integration
//! ```

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

/// Run securityhub with an isolated config file and database.
fn run_in(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_securityhub"))
        .args(args)
        .env("SECURITYHUB_CONFIG", dir.join("config.toml"))
        .env("SECURITYHUB_DB", dir.join("state.db"))
        .env("NO_COLOR", "1")
        .env_remove("SECURITYHUB_SITE")
        .env_remove("SECURITYHUB_API_URL")
        .env_remove("SECURITYHUB_PASSWORD")
        .env_remove("SECURITYHUB_STYLE")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to run securityhub binary")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

// =============================================================================
// Help and Version
// =============================================================================

#[test]
fn test_help_command() {
    let dir = TempDir::new().unwrap();
    let output = run_in(dir.path(), &["--help"]);

    assert!(output.status.success(), "Help should succeed");
    let out = stdout(&output);
    assert!(out.contains("SecurityHub"));
    for cmd in ["login", "status", "watch", "mode", "sensor", "sites", "logs"] {
        assert!(out.contains(cmd), "Help should list {}", cmd);
    }
}

#[test]
fn test_version_command() {
    let dir = TempDir::new().unwrap();
    let output = run_in(dir.path(), &["--version"]);

    assert!(output.status.success());
    assert!(stdout(&output).contains("securityhub"));
}

#[test]
fn test_subcommand_help() {
    let dir = TempDir::new().unwrap();
    for cmd in [
        "login", "logout", "whoami", "sites", "arm", "stay", "status", "watch", "mode", "sensor",
        "logs", "site-data", "config",
    ] {
        let output = run_in(dir.path(), &[cmd, "--help"]);
        assert!(output.status.success(), "{} --help should succeed", cmd);
        assert!(!stdout(&output).is_empty(), "{} --help should produce output", cmd);
    }
}

#[test]
fn test_completions() {
    let dir = TempDir::new().unwrap();
    let output = run_in(dir.path(), &["completions", "bash"]);

    assert!(output.status.success());
    assert!(stdout(&output).contains("securityhub"));
}

// =============================================================================
// Sessions
// =============================================================================

#[test]
fn test_whoami_without_session_fails() {
    let dir = TempDir::new().unwrap();
    let output = run_in(dir.path(), &["whoami"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("Not logged in"));
}

#[test]
fn test_login_whoami_logout() {
    let dir = TempDir::new().unwrap();

    let output = run_in(
        dir.path(),
        &["login", "-u", "admin", "--password", "secret", "--mock"],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Logged in as admin (administration)"));

    let output = run_in(dir.path(), &["whoami", "--json"]);
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["username"], "admin");
    assert!(json.get("token").is_none(), "token must not be printed");

    let output = run_in(dir.path(), &["logout"]);
    assert!(output.status.success());
    assert!(!run_in(dir.path(), &["whoami"]).status.success());
}

#[test]
fn test_login_with_blank_credentials_fails() {
    let dir = TempDir::new().unwrap();
    let output = run_in(dir.path(), &["login", "--mock"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("Please enter both username and password."));
}

#[test]
fn test_status_without_session_or_mock_fails() {
    let dir = TempDir::new().unwrap();
    let output = run_in(dir.path(), &["status"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("Not logged in"));
}

// =============================================================================
// Site monitoring against the mock
// =============================================================================

#[test]
fn test_status_mock_text() {
    let dir = TempDir::new().unwrap();
    let output = run_in(dir.path(), &["status", "--mock", "--site", "2"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("Home 2"));
    assert!(out.contains("DHT"));
    assert!(out.contains("PIR"));
    assert!(out.contains("VIBRATION"));
}

#[test]
fn test_status_mock_json_multiple_sites() {
    let dir = TempDir::new().unwrap();
    let output = run_in(dir.path(), &["status", "--mock", "--site", "1,3", "--json"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let views = json.as_array().unwrap();
    assert_eq!(views.len(), 2);
    assert_eq!(views[0]["site_id"], "1");
    assert_eq!(views[1]["site_id"], "3");
    assert!(views[0]["api_error"].is_null());
    assert!(views[0]["last_fetch"].is_string());
}

#[test]
fn test_watch_mock_stops_after_count() {
    let dir = TempDir::new().unwrap();
    let output = run_in(
        dir.path(),
        &["watch", "--mock", "-n", "2", "--interval", "1"],
    );

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 2, "one line per fetch: {}", out);
    assert!(lines.iter().all(|l| l.contains("DHT") && l.contains("ms")));
    assert!(stderr(&output).contains("Watching: Home 1"));
}

#[test]
fn test_watch_mock_json_lines() {
    let dir = TempDir::new().unwrap();
    let output = run_in(
        dir.path(),
        &["watch", "--mock", "-n", "1", "--interval", "1", "--format", "json"],
    );

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    let view: serde_json::Value = serde_json::from_str(out.trim()).unwrap();
    assert_eq!(view["site_id"], "1");
}

#[test]
fn test_mode_mock() {
    let dir = TempDir::new().unwrap();
    let output = run_in(dir.path(), &["mode", "away", "--mock"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("System mode set to Away"));
}

#[test]
fn test_mode_rejects_unknown_value() {
    let dir = TempDir::new().unwrap();
    let output = run_in(dir.path(), &["mode", "party", "--mock"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("Valid values: stay, away, disarm"));
}

#[test]
fn test_sensor_on_with_no_color_env() {
    let dir = TempDir::new().unwrap();
    let output = run_in(dir.path(), &["sensor", "pir", "on", "--mock"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("[OK] PIR sensor enabled"));
    assert!(!out.contains('\u{1b}'), "NO_COLOR=1 must disable colors");
}

#[test]
fn test_no_color_env_accepts_any_value() {
    let dir = TempDir::new().unwrap();
    for value in ["1", "yes", "true"] {
        let output = Command::new(env!("CARGO_BIN_EXE_securityhub"))
            .args(["config", "path"])
            .env("SECURITYHUB_CONFIG", dir.path().join("config.toml"))
            .env("NO_COLOR", value)
            .output()
            .expect("Failed to run securityhub binary");
        assert!(output.status.success(), "NO_COLOR={}: {}", value, stderr(&output));
    }
}

#[test]
fn test_sensor_mock() {
    let dir = TempDir::new().unwrap();
    let output = run_in(dir.path(), &["sensor", "pir", "off", "--mock", "--site", "3"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("PIR sensor disabled"));
}

// =============================================================================
// Home board and system log
// =============================================================================

/// Armed flags of client 1's homes, as listed by `sites --json`.
fn armed_flags(dir: &Path) -> Vec<bool> {
    let output = run_in(dir, &["sites", "--client", "1", "--json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    json["homes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|home| home["armed"].as_bool().unwrap())
        .collect()
}

#[test]
fn test_sites_lists_client_homes() {
    let dir = TempDir::new().unwrap();
    let output = run_in(dir.path(), &["sites", "--client", "1", "--json"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["client_name"], "Ali");
    let homes = json["homes"].as_array().unwrap();
    assert_eq!(homes.len(), 2);
    assert_eq!(homes[0]["home"], 1);
    assert!(homes[0]["armed"].is_boolean());
    assert!(homes[0]["stay"].is_boolean());

    // Flags picked on first use are kept.
    let first = armed_flags(dir.path());
    assert_eq!(armed_flags(dir.path()), first);
}

#[test]
fn test_arm_persists_and_logs() {
    let dir = TempDir::new().unwrap();
    let before = armed_flags(dir.path());
    let expected = if before[0] { "Disarmed" } else { "Armed" };

    let output = run_in(dir.path(), &["arm", "1"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(
        stdout(&output).contains(&format!("HOME NO 1 at 123 Main St is now {}", expected))
    );

    let after = armed_flags(dir.path());
    assert_eq!(after[0], !before[0]);
    assert_eq!(after[1], before[1]);

    let output = run_in(dir.path(), &["logs"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains(&format!("is now {}", expected)));

    let output = run_in(dir.path(), &["logs", "--clear"]);
    assert!(output.status.success());
    let output = run_in(dir.path(), &["logs"]);
    assert!(stdout(&output).contains("No system log entries."));
}

#[test]
fn test_stay_out_of_range_fails() {
    let dir = TempDir::new().unwrap();
    let output = run_in(dir.path(), &["stay", "3", "--client", "1"]);

    assert!(!output.status.success());
}

#[test]
fn test_arm_rejects_home_zero() {
    let dir = TempDir::new().unwrap();
    let output = run_in(dir.path(), &["arm", "0"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("not a valid home number"));
}

// =============================================================================
// Site data and configuration
// =============================================================================

#[test]
fn test_site_data_json() {
    let dir = TempDir::new().unwrap();
    let output = run_in(dir.path(), &["site-data", "--site", "1", "--json"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["site_id"], 1);
    assert_eq!(json["address"], "123 Main St");
    assert!(!json["series"].as_array().unwrap().is_empty());
}

#[test]
fn test_site_data_unknown_site_fails() {
    let dir = TempDir::new().unwrap();
    let output = run_in(dir.path(), &["site-data", "--site", "99"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("Invalid Site ID: 99"));
}

#[test]
fn test_config_set_get_unset() {
    let dir = TempDir::new().unwrap();

    let output = run_in(dir.path(), &["config", "set", "site", "4"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let output = run_in(dir.path(), &["config", "get", "site"]);
    assert_eq!(stdout(&output).trim(), "4");

    // The configured site becomes the default for site commands.
    let output = run_in(dir.path(), &["status", "--mock", "--json"]);
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json[0]["site_id"], "4");

    let output = run_in(dir.path(), &["config", "unset", "site"]);
    assert!(output.status.success());
    let output = run_in(dir.path(), &["config", "get", "site"]);
    assert!(stdout(&output).trim().is_empty());
}

#[test]
fn test_config_set_rejects_invalid_value() {
    let dir = TempDir::new().unwrap();
    let output = run_in(dir.path(), &["config", "set", "api-url", "ftp://hub"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("http://"));
    assert!(!dir.path().join("config.toml").exists());
}

#[test]
fn test_config_path_honors_override() {
    let dir = TempDir::new().unwrap();
    let output = run_in(dir.path(), &["config", "path"]);

    assert!(output.status.success());
    assert!(stdout(&output).trim().ends_with("config.toml"));
}
