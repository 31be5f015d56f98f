//! Output formatting utilities for text and JSON output.

use anyhow::Result;
use owo_colors::OwoColorize;
use serde::Serialize;
use tabled::builder::Builder;
use tabled::{Table, Tabled};
use time::UtcOffset;
use time::macros::format_description;

use securityhub_core::util::format_clock;
use securityhub_core::{BoardRow, ChartSeries, Session, SiteView};
use securityhub_types::{SensorKey, SensorState, SystemLogEntry};

use crate::cli::StyleMode;
use crate::style;

/// Formatting options for output.
#[derive(Debug, Clone, Copy)]
pub struct FormatOptions {
    /// Disable colored output.
    pub no_color: bool,
    /// Use compact JSON output (no pretty-printing).
    pub compact: bool,
    /// Visual styling mode.
    pub style: StyleMode,
    /// Offset for rendered clock times.
    pub utc_offset: UtcOffset,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            no_color: false,
            compact: false,
            style: StyleMode::Rich,
            utc_offset: UtcOffset::UTC,
        }
    }
}

impl FormatOptions {
    pub fn new(no_color: bool, style: StyleMode) -> Self {
        // Plain mode automatically disables colors for pipe-friendliness
        Self {
            no_color: no_color || style == StyleMode::Plain,
            style,
            ..Default::default()
        }
    }

    pub fn is_rich(&self) -> bool {
        self.style == StyleMode::Rich
    }

    pub fn is_plain(&self) -> bool {
        self.style == StyleMode::Plain
    }

    pub fn with_compact(mut self, compact: bool) -> Self {
        self.compact = compact;
        self
    }

    pub fn with_utc_offset(mut self, offset: UtcOffset) -> Self {
        self.utc_offset = offset;
        self
    }

    /// Serialize value to JSON string, respecting compact option.
    pub fn as_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<String> {
        let json = if self.compact {
            serde_json::to_string(value)?
        } else {
            serde_json::to_string_pretty(value)?
        };
        Ok(json + "\n")
    }

    /// Render the temperature unit, ASCII-only in plain mode.
    fn celsius(&self, value: f64) -> String {
        let number = style::format_temp_colored(value, self.no_color);
        if self.is_plain() {
            format!("{}C", number)
        } else {
            format!("{}°C", number)
        }
    }
}

/// One-cell summary of a sensor's latest reading.
fn format_reading(key: &SensorKey, state: &SensorState, opts: &FormatOptions) -> String {
    if key.is_climate() {
        format!(
            "{} {}",
            opts.celsius(state.temperature),
            style::format_humidity_colored(state.humidity, opts.no_color)
        )
    } else {
        style::format_detection(state.value, opts.no_color)
    }
}

/// Response time shared by the sensors of the last fetch.
fn response_time(view: &SiteView) -> f64 {
    view.sensors
        .values()
        .map(|s| s.response_time_ms)
        .fold(0.0, f64::max)
}

/// Format the full status of a site: header, banner, sensor table and notifications.
#[must_use]
pub fn format_site_view_text(view: &SiteView, opts: &FormatOptions) -> String {
    #[derive(Tabled)]
    struct SensorRow {
        #[tabled(rename = "Sensor")]
        sensor: String,
        #[tabled(rename = "Status")]
        status: String,
        #[tabled(rename = "Enabled")]
        enabled: String,
        #[tabled(rename = "Reading")]
        reading: String,
        #[tabled(rename = "Pulse")]
        pulse: u32,
        #[tabled(rename = "Response")]
        response: String,
        #[tabled(rename = "Uptime")]
        uptime: String,
    }

    let mut out = String::new();
    let title = format!("Home {}", view.site_id);
    if opts.is_rich() {
        out.push_str(&style::format_title(&title, opts.no_color));
        out.push('\n');
    } else {
        out.push_str(&title);
        out.push('\n');
    }

    let fetched = view
        .last_fetch
        .map(|at| format_clock(at, opts.utc_offset))
        .unwrap_or_else(|| "never".to_string());
    out.push_str(&format!(
        "Mode: {} | Last fetch: {}\n",
        style::format_mode(view.mode(), opts.no_color),
        fetched
    ));

    if let Some(error) = &view.api_error {
        out.push_str(&style::format_warning(error, opts.no_color));
        out.push('\n');
    }

    let rows: Vec<SensorRow> = view
        .sensors
        .iter()
        .map(|(key, state)| SensorRow {
            sensor: if opts.no_color {
                key.label()
            } else {
                format!("{}", key.label().cyan())
            },
            status: style::format_connected(state.connected, opts.no_color),
            enabled: style::format_enabled(state.enabled, opts.no_color),
            reading: format_reading(key, state, opts),
            pulse: state.pulse,
            response: format!("{:.0} ms", state.response_time_ms),
            uptime: format!("{:.2} h", state.uptime_hours()),
        })
        .collect();

    let mut table = Table::new(rows);
    style::apply_table_style(&mut table, opts.style);
    out.push_str(&format!("{}\n", table));

    if !view.notifications.is_empty() {
        out.push_str("\nNotifications:\n");
        for (index, note) in view.notifications.iter().enumerate() {
            out.push_str(&format!(
                "  {}. [{}] {}\n",
                index + 1,
                format_clock(note.at, opts.utc_offset),
                note.message
            ));
        }
    }
    out
}

/// Format one line per fetch for `watch`.
#[must_use]
pub fn format_watch_line(view: &SiteView, opts: &FormatOptions) -> String {
    let clock = view
        .last_fetch
        .map(|at| format_clock(at, opts.utc_offset))
        .unwrap_or_else(|| "--:--:--".to_string());

    let sensors: Vec<String> = view
        .sensors
        .iter()
        .map(|(key, state)| {
            let reading = if state.connected {
                format_reading(key, state, opts)
            } else {
                style::format_connected(false, opts.no_color)
            };
            format!("{} {}", key.label(), reading)
        })
        .collect();

    let mut line = format!(
        "[{}] {} | {:.0} ms",
        clock,
        sensors.join(" | "),
        response_time(view)
    );
    if let Some(error) = &view.api_error {
        line.push_str(" | ");
        line.push_str(&style::format_warning(error, opts.no_color));
    }
    line.push('\n');
    line
}

/// Format a short summary of each chart series.
#[must_use]
pub fn format_chart_summary(series: &[ChartSeries]) -> String {
    series
        .iter()
        .map(|s| match (s.latest(), s.range()) {
            (Some(latest), Some((min, max))) => format!(
                "  {}: {} points, latest {}, range {}..{}\n",
                s.label,
                s.points.len(),
                latest,
                min,
                max
            ),
            _ => format!("  {}: no data\n", s.label),
        })
        .collect()
}

/// Format chart series as one table, one row per sample time.
#[must_use]
pub fn format_series_text(series: &[ChartSeries], opts: &FormatOptions) -> String {
    if series.is_empty() {
        return "No data.\n".to_string();
    }

    let mut builder = Builder::default();
    let mut header = vec!["Time".to_string()];
    header.extend(series.iter().map(|s| s.label.clone()));
    builder.push_record(header);

    let rows = series.iter().map(|s| s.points.len()).max().unwrap_or(0);
    for i in 0..rows {
        let time = series
            .iter()
            .find_map(|s| s.points.get(i).map(|p| p.x.clone()))
            .unwrap_or_default();
        let mut record = vec![time];
        record.extend(
            series
                .iter()
                .map(|s| s.points.get(i).map(|p| p.y.to_string()).unwrap_or_default()),
        );
        builder.push_record(record);
    }

    let mut table = builder.build();
    style::apply_table_style(&mut table, opts.style);
    format!("{}\n", table)
}

/// JSON shape of a home board row.
#[derive(Debug, Serialize)]
pub struct SiteRowJson {
    pub home: usize,
    pub site_id: u32,
    pub site_type: String,
    pub address: String,
    pub armed: bool,
    pub stay: bool,
}

impl From<BoardRow<'_>> for SiteRowJson {
    fn from(row: BoardRow<'_>) -> Self {
        Self {
            home: row.index + 1,
            site_id: row.site.site_id,
            site_type: row.site.site_type.clone(),
            address: row.site.address.clone(),
            armed: row.armed,
            stay: row.stay,
        }
    }
}

/// Format a client's home board as a table.
#[must_use]
pub fn format_board_text(client_name: &str, rows: &[BoardRow<'_>], opts: &FormatOptions) -> String {
    #[derive(Tabled)]
    struct HomeRow {
        #[tabled(rename = "#")]
        home: usize,
        #[tabled(rename = "Site")]
        site_id: u32,
        #[tabled(rename = "Type")]
        site_type: String,
        #[tabled(rename = "Address")]
        address: String,
        #[tabled(rename = "Armed")]
        armed: String,
        #[tabled(rename = "Mode")]
        stay: String,
    }

    let rows: Vec<HomeRow> = rows
        .iter()
        .map(|row| HomeRow {
            home: row.index + 1,
            site_id: row.site.site_id,
            site_type: row.site.site_type.clone(),
            address: row.site.address.clone(),
            armed: style::format_armed(row.armed, opts.no_color),
            stay: style::format_stay(row.stay, opts.no_color),
        })
        .collect();

    let header = format!("Homes of {}", client_name);
    let header = if opts.is_rich() {
        style::format_title(&header, opts.no_color)
    } else {
        header
    };

    let mut table = Table::new(rows);
    style::apply_table_style(&mut table, opts.style);
    format!("{}\n{}\n", header, table)
}

/// Format system log entries, newest first.
#[must_use]
pub fn format_logs_text(entries: &[SystemLogEntry], opts: &FormatOptions) -> String {
    if entries.is_empty() {
        return "No system log entries.\n".to_string();
    }
    let stamp = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    entries
        .iter()
        .map(|entry| {
            let at = entry
                .timestamp
                .to_offset(opts.utc_offset)
                .format(&stamp)
                .unwrap_or_default();
            if opts.no_color {
                format!("{}  {}\n", at, entry.message)
            } else {
                format!("{}  {}\n", at.dimmed(), entry.message)
            }
        })
        .collect()
}

/// JSON shape of the logged-in account; the token is never printed.
#[derive(Debug, Serialize)]
pub struct SessionJson<'a> {
    pub username: &'a str,
    pub role: Option<&'a str>,
    pub is_superuser: bool,
    pub user_id: Option<u64>,
    pub admin: bool,
}

impl<'a> From<&'a Session> for SessionJson<'a> {
    fn from(session: &'a Session) -> Self {
        Self {
            username: &session.username,
            role: session.role.as_deref(),
            is_superuser: session.is_superuser,
            user_id: session.user_id,
            admin: session.is_admin(),
        }
    }
}

#[must_use]
pub fn format_session_text(session: &Session, opts: &FormatOptions) -> String {
    let name = if opts.no_color {
        session.username.clone()
    } else {
        format!("{}", session.username.cyan())
    };
    let role = if session.is_admin() {
        "administrator"
    } else {
        session.role.as_deref().unwrap_or("user")
    };
    match session.user_id {
        Some(id) => format!("{} ({}, id {})\n", name, role, id),
        None => format!("{} ({})\n", name, role),
    }
}
