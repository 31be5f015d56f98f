use std::io;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod config;
mod format;
mod style;
mod util;

use cli::{Cli, Commands};
use commands::{
    AppContext, WatchArgs, cmd_arm, cmd_config, cmd_login, cmd_logout, cmd_logs, cmd_mode,
    cmd_sensor, cmd_site_data, cmd_sites, cmd_stay, cmd_status, cmd_watch, cmd_whoami,
};
use config::{Config, resolve_api_url};
use format::FormatOptions;
use util::local_offset;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Handle completions command early (before tracing init)
    if let Commands::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        clap_complete::generate(shell, &mut cmd, "securityhub", &mut io::stdout());
        return Ok(());
    }

    // When quiet mode is enabled, suppress info-level logging
    let filter = if cli.quiet {
        EnvFilter::new("warn")
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let config = Config::load();
    let opts = FormatOptions::new(cli.no_color || config.no_color, cli.style)
        .with_compact(cli.compact)
        .with_utc_offset(local_offset());
    let api_url = resolve_api_url(cli.api_url.as_deref(), &config);
    if let Some(ref path) = cli.output {
        tracing::debug!("Output will be written to: {}", path.display());
    }

    let ctx = AppContext {
        config,
        opts,
        api_url,
        db: cli.db,
        output: cli.output,
        quiet: cli.quiet,
        json: cli.json,
    };

    match cli.command {
        Commands::Login {
            username,
            password,
            mock,
        } => cmd_login(&ctx, username, password, mock).await,
        Commands::Logout => cmd_logout(&ctx),
        Commands::Whoami { output } => cmd_whoami(&ctx, output.format),
        Commands::Sites { client, output } => cmd_sites(&ctx, client, output.format),
        Commands::Arm { home, client } => cmd_arm(&ctx, home, client),
        Commands::Stay { home, client } => cmd_stay(&ctx, home, client),
        Commands::Status { site, mock, output } => {
            cmd_status(&ctx, site, mock, output.format).await
        }
        Commands::Watch {
            site,
            output,
            interval,
            count,
            charts,
        } => {
            cmd_watch(
                &ctx,
                WatchArgs {
                    site,
                    interval,
                    count,
                    format: output.format,
                    charts,
                },
            )
            .await
        }
        Commands::Mode { mode, site } => cmd_mode(&ctx, mode, &site).await,
        Commands::Sensor {
            sensor,
            enabled,
            site,
        } => cmd_sensor(&ctx, &sensor, enabled, &site).await,
        Commands::Logs {
            clear,
            limit,
            output,
        } => cmd_logs(&ctx, clear, limit, output.format),
        Commands::SiteData { site, output } => cmd_site_data(&ctx, site, output.format),
        Commands::Config { action } => cmd_config(&ctx, action),
        Commands::Completions { .. } => {
            // Already handled above
            unreachable!()
        }
    }
}
