//! Config command - manage configuration.

use anyhow::Result;
use catalog_store::{SettingsStore, default_cart_path, default_config_dir};
use clap::{Args, Subcommand};
use tracing::info;

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration.
    Show {
        /// Include environment overrides.
        #[arg(long)]
        effective: bool,
    },

    /// Show configuration paths.
    Path,

    /// Set a value.
    Set {
        /// Setting name.
        key: String,
        /// New value. Empty clears `api_token`.
        value: String,
    },

    /// Reset to defaults.
    Reset,
}

/// Runs the config command.
pub async fn run(args: &ConfigArgs, cli: &Cli, store: &SettingsStore) -> Result<()> {
    match &args.action {
        ConfigAction::Show { effective } => show_config(*effective, cli, store).await,
        ConfigAction::Path => show_paths(cli, store),
        ConfigAction::Set { key, value } => set_value(key, value, cli, store).await,
        ConfigAction::Reset => reset_config(cli, store).await,
    }
}

async fn show_config(effective: bool, cli: &Cli, store: &SettingsStore) -> Result<()> {
    let settings = if effective {
        store.effective().await
    } else {
        store.get().await
    };

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_settings(&settings, store.path()));
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            let path = store.path().display().to_string();
            println!("{}", formatter.format_settings(&settings, &path)?);
        }
    }

    Ok(())
}

fn show_paths(cli: &Cli, store: &SettingsStore) -> Result<()> {
    let config_dir = default_config_dir();
    let cart_path = default_cart_path();

    match cli.format {
        OutputFormat::Text => {
            println!("Configuration Paths");
            println!("{}", "─".repeat(40));
            println!();
            println!("Config dir:    {}", config_dir.display());
            println!("Settings file: {}", store.path().display());
            println!("Cart file:     {}", cart_path.display());
        }
        OutputFormat::Json => {
            let paths = serde_json::json!({
                "config_dir": config_dir.display().to_string(),
                "settings_file": store.path().display().to_string(),
                "cart_file": cart_path.display().to_string(),
            });
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&paths)?);
        }
    }

    Ok(())
}

async fn set_value(key: &str, value: &str, cli: &Cli, store: &SettingsStore) -> Result<()> {
    store.set_value(key, value).await?;
    store.save().await?;

    info!(key, "Setting updated");
    if !cli.quiet {
        let shown = if key == "api_token" { "(hidden)" } else { value };
        println!("{key} = {shown}");
    }

    Ok(())
}

async fn reset_config(cli: &Cli, store: &SettingsStore) -> Result<()> {
    let path = store.path().to_path_buf();

    if tokio::fs::try_exists(&path).await.unwrap_or(false) {
        tokio::fs::remove_file(&path).await?;
        store.reset().await;
        info!(path = %path.display(), "Settings reset");
        if !cli.quiet {
            println!("Configuration reset to defaults");
        }
    } else if !cli.quiet {
        println!("No configuration file to reset");
    }

    Ok(())
}
