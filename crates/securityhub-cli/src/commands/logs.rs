//! System log command.

use anyhow::{Context, Result};

use securityhub_core::SystemLog;

use crate::cli::OutputFormat;
use crate::commands::AppContext;
use crate::format::format_logs_text;
use crate::style;

pub fn cmd_logs(
    ctx: &AppContext,
    clear: bool,
    limit: Option<usize>,
    format: Option<OutputFormat>,
) -> Result<()> {
    let log = SystemLog::new(ctx.store()?);

    if clear {
        log.clear().context("Failed to clear the system log")?;
        return ctx.write(&format!(
            "{}\n",
            style::format_success("System log cleared", ctx.opts.no_color)
        ));
    }

    let mut entries = log.entries().context("Failed to read the system log")?;
    if let Some(limit) = limit {
        entries.truncate(limit);
    }

    let content = match ctx.format(format) {
        OutputFormat::Json => ctx.opts.as_json(&entries)?,
        OutputFormat::Text => format_logs_text(&entries, &ctx.opts),
    };
    ctx.write(&content)
}
