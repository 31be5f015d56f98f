//! Generated sample data for a site.

use anyhow::{Result, bail};
use serde::Serialize;
use time::OffsetDateTime;

use securityhub_core::{ChartKind, ChartSeries, site_series};
use securityhub_types::Directory;

use crate::cli::OutputFormat;
use crate::commands::AppContext;
use crate::format::format_series_text;
use crate::style;

#[derive(Debug, Serialize)]
struct SiteDataJson<'a> {
    site_id: u32,
    address: &'a str,
    series: &'a [ChartSeries],
}

pub fn cmd_site_data(ctx: &AppContext, site: Option<u32>, format: Option<OutputFormat>) -> Result<()> {
    let site_id = site.unwrap_or_else(|| ctx.config.site_id());
    let directory = Directory::builtin();
    let Some(found) = directory.find_site(site_id) else {
        bail!(securityhub_core::Error::UnknownSite(site_id.to_string()));
    };

    let now = OffsetDateTime::now_utc();
    let series: Vec<ChartSeries> = ChartKind::ALL
        .iter()
        .map(|kind| site_series(*kind, now, ctx.opts.utc_offset))
        .collect();

    let content = match ctx.format(format) {
        OutputFormat::Json => ctx.opts.as_json(&SiteDataJson {
            site_id,
            address: &found.site.address,
            series: &series,
        })?,
        OutputFormat::Text => {
            let title = format!(
                "Site data for Home {} ({}, {})",
                site_id, found.site.site_type, found.site.address
            );
            let title = if ctx.opts.is_rich() {
                style::format_title(&title, ctx.opts.no_color)
            } else {
                title
            };
            format!("{}\n{}", title, format_series_text(&series, &ctx.opts))
        }
    };
    ctx.write(&content)
}
