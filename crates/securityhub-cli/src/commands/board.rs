//! Home board commands: list homes and toggle their armed and stay flags.

use anyhow::{Context, Result};
use serde::Serialize;

use securityhub_core::{BoardRow, HomeBoard};
use securityhub_types::Directory;

use crate::cli::OutputFormat;
use crate::commands::AppContext;
use crate::format::{SiteRowJson, format_board_text};
use crate::style;

#[derive(Debug, Serialize)]
struct BoardJson {
    client_id: u32,
    client_name: String,
    homes: Vec<SiteRowJson>,
}

fn mount(ctx: &AppContext, client: Option<u32>) -> Result<HomeBoard> {
    let client_id = client.unwrap_or_else(|| ctx.config.client_id());
    let board = HomeBoard::mount(ctx.store()?, &Directory::builtin(), client_id)
        .with_context(|| format!("Failed to load the home board of client {}", client_id))?;
    Ok(board)
}

pub fn cmd_sites(ctx: &AppContext, client: Option<u32>, format: Option<OutputFormat>) -> Result<()> {
    let board = mount(ctx, client)?;
    let rows: Vec<BoardRow<'_>> = board.rows().collect();

    let content = match ctx.format(format) {
        OutputFormat::Json => ctx.opts.as_json(&BoardJson {
            client_id: board.client().id,
            client_name: board.client().name.clone(),
            homes: rows.iter().copied().map(SiteRowJson::from).collect(),
        })?,
        OutputFormat::Text => format_board_text(&board.client().name, &rows, &ctx.opts),
    };
    ctx.write(&content)
}

pub fn cmd_arm(ctx: &AppContext, home: usize, client: Option<u32>) -> Result<()> {
    let mut board = mount(ctx, client)?;
    let message = board.toggle_armed(home - 1)?;
    ctx.write(&format!("{}\n", style::format_success(&message, ctx.opts.no_color)))
}

pub fn cmd_stay(ctx: &AppContext, home: usize, client: Option<u32>) -> Result<()> {
    let mut board = mount(ctx, client)?;
    let message = board.toggle_stay(home - 1)?;
    ctx.write(&format!("{}\n", style::format_success(&message, ctx.opts.no_color)))
}
