//! Visual styling utilities for the CLI.
//!
//! Spinners for network round trips, colored status words and table styles.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;

use securityhub_types::Mode;

use crate::cli::StyleMode;

/// Standard spinner tick characters (Braille dots animation)
const SPINNER_TICK_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// Standard spinner tick interval
const SPINNER_TICK_MS: u64 = 80;

fn spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars(SPINNER_TICK_CHARS)
}

/// Create a spinner for a request to the server.
pub fn request_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(spinner_style());
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
    pb
}

/// Comfort thresholds used to color climate readings.
pub mod climate {
    pub const COLD: f64 = 18.0;
    pub const WARM: f64 = 26.0;
    pub const DRY: f64 = 30.0;
    pub const HUMID: f64 = 70.0;
}

pub fn format_connected(connected: bool, no_color: bool) -> String {
    match (connected, no_color) {
        (true, true) => "online".to_string(),
        (false, true) => "offline".to_string(),
        (true, false) => format!("{}", "online".green()),
        (false, false) => format!("{}", "offline".red()),
    }
}

pub fn format_enabled(enabled: bool, no_color: bool) -> String {
    match (enabled, no_color) {
        (true, true) => "on".to_string(),
        (false, true) => "off".to_string(),
        (true, false) => format!("{}", "on".green()),
        (false, false) => format!("{}", "off".dimmed()),
    }
}

pub fn format_armed(armed: bool, no_color: bool) -> String {
    let word = if armed { "Armed" } else { "Disarmed" };
    if no_color {
        word.to_string()
    } else if armed {
        format!("{}", word.red().bold())
    } else {
        format!("{}", word.green())
    }
}

pub fn format_stay(stay: bool, no_color: bool) -> String {
    let word = if stay { "Stay" } else { "Away" };
    if no_color {
        word.to_string()
    } else if stay {
        format!("{}", word.yellow())
    } else {
        format!("{}", word.cyan())
    }
}

/// Format a system mode with its color.
pub fn format_mode(mode: Mode, no_color: bool) -> String {
    if no_color {
        return mode.to_string();
    }
    match mode {
        Mode::Stay => format!("{}", mode.yellow().bold()),
        Mode::Away => format!("{}", mode.red().bold()),
        Mode::Disarm => format!("{}", mode.green()),
    }
}

/// Format a motion or vibration value: non-zero is a detection.
pub fn format_detection(value: f64, no_color: bool) -> String {
    let text = format!("{}", value);
    if no_color || value == 0.0 {
        text
    } else {
        format!("{}", text.red().bold())
    }
}

/// Format temperature with comfort coloring.
pub fn format_temp_colored(celsius: f64, no_color: bool) -> String {
    let formatted = format!("{:.1}", celsius);
    if no_color {
        formatted
    } else if celsius < climate::COLD {
        format!("{}", formatted.cyan())
    } else if celsius > climate::WARM {
        // Orange color (RGB: 255, 165, 0)
        format!("{}", formatted.truecolor(255, 165, 0))
    } else {
        format!("{}", formatted.green())
    }
}

/// Format humidity percentage with comfort coloring.
pub fn format_humidity_colored(percent: f64, no_color: bool) -> String {
    let formatted = format!("{:.0}%", percent);
    if no_color {
        formatted
    } else if !(climate::DRY..=climate::HUMID).contains(&percent) {
        format!("{}", formatted.yellow())
    } else {
        format!("{}", formatted.green())
    }
}

/// Format a success message.
pub fn format_success(message: &str, no_color: bool) -> String {
    if no_color {
        format!("[OK] {}", message)
    } else {
        format!("{} {}", "[OK]".green(), message)
    }
}

/// Format an info message.
pub fn format_info(message: &str, no_color: bool) -> String {
    if no_color {
        format!("[--] {}", message)
    } else {
        format!("{} {}", "[--]".cyan(), message)
    }
}

/// Format a warning message.
pub fn format_warning(message: &str, no_color: bool) -> String {
    if no_color {
        format!("[!!] {}", message)
    } else {
        format!("{} {}", "[!!]".yellow(), message)
    }
}

/// Format a title header.
pub fn format_title(title: &str, no_color: bool) -> String {
    let rule = "━".repeat(title.chars().count());
    if no_color {
        format!("{}\n{}", title, rule)
    } else {
        format!("{}\n{}", title.bold(), rule.dimmed())
    }
}

/// Apply table style based on StyleMode.
pub fn apply_table_style(table: &mut tabled::Table, style: StyleMode) {
    use tabled::settings::Style;
    match style {
        StyleMode::Rich | StyleMode::Minimal => {
            table.with(Style::rounded());
        }
        StyleMode::Plain => {
            table.with(Style::blank());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_words() {
        assert_eq!(format_connected(false, true), "offline");
        assert_eq!(format_enabled(true, true), "on");
        assert_eq!(format_armed(true, true), "Armed");
        assert_eq!(format_stay(false, true), "Away");
        assert_eq!(format_mode(Mode::Disarm, true), "Disarm");
    }

    #[test]
    fn test_climate_formatting() {
        assert_eq!(format_temp_colored(22.04, true), "22.0");
        assert_eq!(format_humidity_colored(61.4, true), "61%");
    }

    #[test]
    fn test_colored_output_contains_escape_codes() {
        assert!(format_armed(true, false).contains('\u{1b}'));
        assert!(!format_detection(0.0, false).contains('\u{1b}'));
        assert!(format_detection(1.0, false).contains('\u{1b}'));
    }

    #[test]
    fn test_message_prefixes() {
        assert_eq!(format_success("done", true), "[OK] done");
        assert_eq!(format_info("note", true), "[--] note");
        assert_eq!(format_warning("careful", true), "[!!] careful");
    }

    #[test]
    fn test_title_underline_matches_width() {
        assert_eq!(format_title("Home 1", true), "Home 1\n━━━━━━");
    }
}
