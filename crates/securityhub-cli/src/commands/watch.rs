//! Watch command implementation.
//!
//! Mounts a site monitor and prints one line per fetch until the count is
//! reached or Ctrl+C is pressed. New notifications are printed as warnings
//! on stderr as they arrive.

use std::time::Duration;

use anyhow::Result;
use futures::StreamExt;
use owo_colors::OwoColorize;

use securityhub_core::SiteMonitor;

use crate::cli::{OutputFormat, SiteArgs};
use crate::commands::AppContext;
use crate::config::resolve_site;
use crate::format::{format_chart_summary, format_watch_line};
use crate::style;
use crate::util::{local_offset, require_token};

/// Arguments for the watch command.
pub struct WatchArgs {
    pub site: SiteArgs,
    pub interval: Option<u64>,
    pub count: u32,
    pub format: Option<OutputFormat>,
    pub charts: bool,
}

pub async fn cmd_watch(ctx: &AppContext, args: WatchArgs) -> Result<()> {
    let WatchArgs {
        site,
        interval,
        count,
        format,
        charts,
    } = args;

    let site_id = resolve_site(site.site, &ctx.config);
    let token = require_token(&ctx.sessions()?, site.mock)?;
    let api = ctx.api(site.mock)?;
    let mut options = ctx.config.monitor_options(local_offset());
    if let Some(secs) = interval {
        options = options.poll_interval(Duration::from_secs(secs));
    }
    let format = ctx.format(format);
    let no_color = ctx.opts.no_color;

    let mut monitor = SiteMonitor::new(api, site_id.to_string(), token, options)?;

    if !ctx.quiet {
        let header = if no_color {
            format!("Watching: Home {}", site_id)
        } else {
            format!("Watching: Home {}", site_id.to_string().green())
        };
        eprintln!("{}", header);
        let secs = monitor.options().poll_interval.as_secs_f64();
        if count > 0 {
            eprintln!(
                "Interval: {}s | Count: {} | Press Ctrl+C to stop",
                secs, count
            );
        } else {
            eprintln!("Interval: {}s | Press Ctrl+C to stop", secs);
        }
        eprintln!("{}", "-".repeat(50));
    }

    let chart_rx = monitor.charts();
    let mut updates = Box::pin(monitor.updates());
    // The first item is the view before any fetch.
    let mut seen_notifications = match updates.next().await {
        Some(view) => view.notifications_raised,
        None => 0,
    };
    monitor.start()?;

    let mut fetches: u32 = 0;
    while count == 0 || fetches < count {
        let view = tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                eprintln!("\nShutting down...");
                break;
            }
            next = updates.next() => match next {
                Some(view) => view,
                None => break,
            },
        };
        fetches += 1;

        let content = match format {
            OutputFormat::Json => ctx.opts.with_compact(true).as_json(&view)?,
            OutputFormat::Text => format_watch_line(&view, &ctx.opts),
        };
        ctx.write(&content)?;

        for notification in view.notifications_since(seen_notifications) {
            ctx.note(&style::format_warning(&notification.message, no_color));
        }
        seen_notifications = view.notifications_raised;

        if charts && format == OutputFormat::Text {
            let summary = format_chart_summary(&chart_rx.borrow());
            ctx.write(&summary)?;
        }
    }

    if count > 0 && fetches >= count {
        ctx.note(&format!("Completed {} fetches.", fetches));
    }
    monitor.stop().await;
    Ok(())
}
