//! Whoami command - show the authentication state.

use anyhow::Result;
use catalog_store::SettingsStore;

use crate::app::App;
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Runs the whoami command.
pub async fn run(cli: &Cli, settings: &SettingsStore) -> Result<()> {
    let app = App::new(cli, settings).await?;
    let state = app.auth.state();
    let api_url = app.settings.api_base_url.as_str();

    match cli.format {
        OutputFormat::Text => {
            println!("{}", TextFormatter::new(!cli.no_color).format_auth(&state, api_url));
        }
        OutputFormat::Json => {
            println!("{}", JsonFormatter::new(cli.pretty).format_auth(&state, api_url)?);
        }
    }
    Ok(())
}
