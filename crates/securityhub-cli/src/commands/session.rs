//! Login, logout and whoami.

use std::io::IsTerminal;

use anyhow::{Context, Result, bail};

use securityhub_core::Landing;

use crate::cli::OutputFormat;
use crate::commands::AppContext;
use crate::format::{SessionJson, format_session_text};
use crate::style;
use crate::util::{password_or_prompt, username_or_prompt};

pub async fn cmd_login(
    ctx: &AppContext,
    username: Option<String>,
    password: Option<String>,
    mock: bool,
) -> Result<()> {
    let username = username_or_prompt(username)?;
    let password = password_or_prompt(password)?;

    let sessions = ctx.sessions()?;
    let api = ctx.api(mock)?;

    let spinner = (!ctx.quiet && std::io::stderr().is_terminal())
        .then(|| style::request_spinner("Logging in..."));
    let result = sessions.login(&*api, &username, &password).await;
    if let Some(sp) = spinner {
        sp.finish_and_clear();
    }
    let session = result.context("Login failed")?;

    let landing = match session.landing() {
        Landing::Superuser => "administration".to_string(),
        Landing::Home(client) => format!("home board of client {}", client),
    };
    ctx.write(&format!(
        "{}\n",
        style::format_success(
            &format!("Logged in as {} ({})", session.username, landing),
            ctx.opts.no_color
        )
    ))
}

pub fn cmd_logout(ctx: &AppContext) -> Result<()> {
    let sessions = ctx.sessions()?;
    match sessions.load()? {
        Some(session) => {
            sessions.clear()?;
            ctx.write(&format!(
                "{}\n",
                style::format_success(
                    &format!("Logged out {}", session.username),
                    ctx.opts.no_color
                )
            ))
        }
        None => {
            ctx.note(&style::format_info("Not logged in.", ctx.opts.no_color));
            Ok(())
        }
    }
}

pub fn cmd_whoami(ctx: &AppContext, format: Option<OutputFormat>) -> Result<()> {
    let Some(session) = ctx.sessions()?.load()? else {
        bail!("Not logged in. Run 'securityhub login' first.");
    };
    let content = match ctx.format(format) {
        OutputFormat::Json => ctx.opts.as_json(&SessionJson::from(&session))?,
        OutputFormat::Text => format_session_text(&session, &ctx.opts),
    };
    ctx.write(&content)
}
