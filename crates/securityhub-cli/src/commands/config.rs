//! Config command implementation.

use anyhow::{Context, Result, bail};
use clap::ValueEnum;

use crate::cli::{ConfigAction, ConfigKey};
use crate::commands::AppContext;
use crate::config::Config;
use crate::style;

pub fn cmd_config(ctx: &AppContext, action: ConfigAction) -> Result<()> {
    let path = Config::path();
    let no_color = ctx.opts.no_color;

    match action {
        ConfigAction::Show => {
            let content = toml::to_string_pretty(&ctx.config)
                .context("Failed to serialize config")?;
            ctx.write(&content)
        }
        ConfigAction::Get { key } => match ctx.config.get(key) {
            Some(value) => ctx.write(&format!("{}\n", value)),
            None => {
                ctx.note(&style::format_info("(not set)", no_color));
                Ok(())
            }
        },
        ConfigAction::Set { key, value } => {
            let mut config = ctx.config.clone();
            config.set(key, &value)?;
            config.save_to(&path)?;
            ctx.note(&style::format_success(
                &format!("Set {} = {}", key_name(key), value),
                no_color,
            ));
            Ok(())
        }
        ConfigAction::Unset { key } => {
            let mut config = ctx.config.clone();
            config.unset(key);
            config.save_to(&path)?;
            ctx.note(&style::format_success(&format!("Unset {}", key_name(key)), no_color));
            Ok(())
        }
        ConfigAction::Path => ctx.write(&format!("{}\n", path.display())),
        ConfigAction::Init => {
            if path.exists() {
                bail!("Config file already exists: {}", path.display());
            }
            Config::default().save_to(&path)?;
            ctx.note(&style::format_success(
                &format!("Created {}", path.display()),
                no_color,
            ));
            Ok(())
        }
    }
}

/// Key name as typed on the command line.
fn key_name(key: ConfigKey) -> String {
    key.to_possible_value()
        .map(|v| v.get_name().to_string())
        .unwrap_or_else(|| format!("{:?}", key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_name_matches_cli_spelling() {
        assert_eq!(key_name(ConfigKey::ApiUrl), "api-url");
        assert_eq!(key_name(ConfigKey::PollInterval), "poll-interval");
        assert_eq!(key_name(ConfigKey::Site), "site");
    }
}
