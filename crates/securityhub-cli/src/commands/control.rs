//! Mode and sensor commands.

use std::io::IsTerminal;

use anyhow::{Result, anyhow};

use securityhub_core::{Resolution, SiteMonitor, SiteView};
use securityhub_types::{Mode, SensorKey};

use crate::cli::SiteArgs;
use crate::commands::AppContext;
use crate::config::resolve_site;
use crate::style;
use crate::util::{local_offset, require_token};

fn monitor(ctx: &AppContext, site: &SiteArgs) -> Result<SiteMonitor> {
    let site_id = resolve_site(site.site, &ctx.config);
    let token = require_token(&ctx.sessions()?, site.mock)?;
    let api = ctx.api(site.mock)?;
    let options = ctx.config.monitor_options(local_offset());
    Ok(SiteMonitor::new(api, site_id.to_string(), token, options)?)
}

/// Report the outcome of a command from the view it left behind.
fn report(ctx: &AppContext, resolution: Resolution, view: &SiteView) -> Result<()> {
    let message = view
        .notifications
        .last()
        .map(|n| n.message.clone())
        .unwrap_or_default();
    match resolution {
        Resolution::Applied => ctx.write(&format!(
            "{}\n",
            style::format_success(&message, ctx.opts.no_color)
        )),
        Resolution::Rejected => {
            let banner = view.api_error.clone().unwrap_or_default();
            Err(anyhow!("{}\n{}", message, banner))
        }
        Resolution::Superseded => {
            ctx.note(&style::format_info(
                "A newer command replaced this one.",
                ctx.opts.no_color,
            ));
            Ok(())
        }
    }
}

pub async fn cmd_mode(ctx: &AppContext, mode: Mode, site: &SiteArgs) -> Result<()> {
    let monitor = monitor(ctx, site)?;
    let spinner = (!ctx.quiet && std::io::stderr().is_terminal()).then(|| {
        style::request_spinner(&format!(
            "Setting Home {} to {}...",
            monitor.site_id(),
            mode
        ))
    });
    let result = monitor.set_mode(mode).await;
    if let Some(sp) = spinner {
        sp.finish_and_clear();
    }
    report(ctx, result?, &monitor.view())
}

pub async fn cmd_sensor(
    ctx: &AppContext,
    sensor: &SensorKey,
    enabled: bool,
    site: &SiteArgs,
) -> Result<()> {
    let monitor = monitor(ctx, site)?;
    let spinner = (!ctx.quiet && std::io::stderr().is_terminal()).then(|| {
        style::request_spinner(&format!(
            "Turning {} {} on Home {}...",
            sensor.label(),
            if enabled { "on" } else { "off" },
            monitor.site_id()
        ))
    });
    let result = monitor.toggle_sensor(sensor, enabled).await;
    if let Some(sp) = spinner {
        sp.finish_and_clear();
    }
    report(ctx, result?, &monitor.view())
}
