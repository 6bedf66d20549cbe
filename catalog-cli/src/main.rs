// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! Catalog CLI - browse and edit the product catalog from the command line.
//!
//! # Examples
//!
//! ```bash
//! # List products
//! catalog list
//!
//! # Show one product as JSON
//! catalog show 3 --format json --pretty
//!
//! # Create a product (requires an API token)
//! catalog create --title Lamp --price 25 --description "Desk lamp" \
//!     --category home --image https://example.com/lamp.png
//!
//! # Cart
//! catalog cart add 3
//! catalog cart show
//!
//! # Point at another server
//! catalog --api-url http://localhost:3000 list
//! ```

mod app;
mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use catalog_store::{LogLevel, SettingsStore};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use commands::{cart, config, product};

// ============================================================================
// CLI Definition
// ============================================================================

/// Catalog CLI - product catalog client.
#[derive(Parser)]
#[command(name = "catalog")]
#[command(about = "Browse and edit a product catalog")]
#[command(long_about = r#"
Catalog talks to a products REST API (fakestoreapi.com by default).

Reading is anonymous. Creating, updating and deleting products needs an
API token, set with `catalog config set api_token <token>` or the
CATALOG_API_TOKEN environment variable.

Examples:
  catalog list                   # All products
  catalog show 3                 # One product
  catalog delete 3               # Delete (signed in)
  catalog cart show              # Cart contents
  catalog --format json list     # JSON output
"#)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (minimal output).
    #[arg(long, short, global = true)]
    pub quiet: bool,

    /// API base URL for this invocation (overrides CATALOG_API_URL).
    #[arg(long, global = true)]
    pub api_url: Option<String>,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// List all products.
    #[command(visible_alias = "ls")]
    List(product::ListArgs),

    /// Show one product.
    Show {
        /// Product id.
        id: u64,
    },

    /// Create a product.
    Create(product::ProductFields),

    /// Update a product. Omitted fields keep their current value.
    Update {
        /// Product id.
        id: u64,

        #[command(flatten)]
        fields: product::ProductFields,
    },

    /// Delete a product.
    #[command(visible_alias = "rm")]
    Delete {
        /// Product id.
        id: u64,
    },

    /// Manage the cart.
    Cart(cart::CartArgs),

    /// Show the authentication state.
    Whoami,

    /// Manage configuration.
    Config(config::ConfigArgs),
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text with colors.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// CLI exit codes.
#[repr(i32)]
pub enum ExitCode {
    /// Success.
    Success = 0,
    /// General error.
    Error = 1,
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool, level: LogLevel) {
    if quiet {
        return;
    }

    let filter = if verbose {
        EnvFilter::new("catalog=debug,info")
    } else {
        EnvFilter::new(format!("catalog={level}"))
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = SettingsStore::load_default().await;
    setup_logging(cli.verbose, cli.quiet, settings.get().await.log_level);

    let result = match &cli.command {
        Commands::List(args) => product::list(args, &cli, &settings).await,
        Commands::Show { id } => product::show(*id, &cli, &settings).await,
        Commands::Create(fields) => product::create(fields, &cli, &settings).await,
        Commands::Update { id, fields } => product::update(*id, fields, &cli, &settings).await,
        Commands::Delete { id } => product::delete(*id, &cli, &settings).await,
        Commands::Cart(args) => cart::run(args, &cli, &settings).await,
        Commands::Whoami => commands::whoami::run(&cli, &settings).await,
        Commands::Config(args) => config::run(args, &cli, &settings).await,
    };

    if let Err(e) = result {
        if !cli.quiet {
            eprintln!("Error: {e}");
        }
        std::process::exit(ExitCode::Error as i32);
    }

    Ok(())
}
