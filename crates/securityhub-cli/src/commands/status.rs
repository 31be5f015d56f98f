//! Status command implementation.

use std::io::IsTerminal;

use anyhow::{Result, bail};

use securityhub_core::{SiteMonitor, SiteView};

use crate::cli::OutputFormat;
use crate::commands::AppContext;
use crate::format::format_site_view_text;
use crate::style;
use crate::util::{local_offset, require_token};

/// Fetch each site once and print its merged view.
pub async fn cmd_status(
    ctx: &AppContext,
    sites: Vec<u32>,
    mock: bool,
    format: Option<OutputFormat>,
) -> Result<()> {
    let sites = if sites.is_empty() {
        vec![ctx.config.site_id()]
    } else {
        sites
    };
    let token = require_token(&ctx.sessions()?, mock)?;
    let api = ctx.api(mock)?;
    let options = ctx.config.monitor_options(local_offset());

    let spinner = (!ctx.quiet && std::io::stderr().is_terminal())
        .then(|| style::request_spinner("Fetching sensor status..."));

    let mut views: Vec<SiteView> = Vec::with_capacity(sites.len());
    let mut failed = 0;
    for site in &sites {
        let monitor = SiteMonitor::new(api.clone(), site.to_string(), token.as_str(), options.clone())?;
        if let Err(e) = monitor.refresh().await {
            tracing::debug!("Status of site {} failed: {}", site, e);
            failed += 1;
        }
        views.push(monitor.view());
    }

    if let Some(sp) = spinner {
        sp.finish_and_clear();
    }

    let content = match ctx.format(format) {
        OutputFormat::Json => ctx.opts.as_json(&views)?,
        OutputFormat::Text => views
            .iter()
            .map(|view| format_site_view_text(view, &ctx.opts))
            .collect::<Vec<_>>()
            .join("\n"),
    };
    ctx.write(&content)?;

    if failed > 0 {
        bail!("Failed to fetch {} of {} site(s)", failed, sites.len());
    }
    Ok(())
}
