//! Cart command - manage the local cart.

use anyhow::{Result, anyhow};
use catalog_core::ProductId;
use catalog_store::SettingsStore;
use clap::{Args, Subcommand};
use tracing::{info, warn};

use crate::app::App;
use crate::output::{CartLine, JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the cart command.
#[derive(Args)]
pub struct CartArgs {
    #[command(subcommand)]
    pub action: CartAction,
}

/// Cart subcommands.
#[derive(Subcommand)]
pub enum CartAction {
    /// Add one unit of a product.
    Add {
        /// Product id.
        id: ProductId,
    },

    /// Remove a product entirely.
    Remove {
        /// Product id.
        id: ProductId,
    },

    /// Show cart contents.
    Show,

    /// Empty the cart.
    Clear,
}

/// Runs the cart command.
pub async fn run(args: &CartArgs, cli: &Cli, settings: &SettingsStore) -> Result<()> {
    let app = App::new(cli, settings).await?;

    match &args.action {
        CartAction::Add { id } => add(&app, *id, cli).await,
        CartAction::Remove { id } => remove(&app, *id, cli).await,
        CartAction::Show => show(&app, cli).await,
        CartAction::Clear => {
            app.cart.clear().await;
            app.cart.save().await?;
            info!("Cart cleared");
            report(cli, "Cart cleared")
        }
    }
}

async fn add(app: &App, id: ProductId, cli: &Cli) -> Result<()> {
    let details = app.details(id);
    details.init().await;
    let view = details.view().await;
    let product = view.product.ok_or_else(|| {
        anyhow!(view.error.unwrap_or_else(|| format!("product {id} not found")))
    })?;

    details.add_to_cart(id).await;
    app.cart.save().await?;

    let count = app.cart.count().await;
    report(cli, &format!("Added {} to cart ({count} items)", product.title))
}

async fn remove(app: &App, id: ProductId, cli: &Cli) -> Result<()> {
    if !app.cart.remove(id).await {
        anyhow::bail!("product {id} is not in the cart");
    }
    app.cart.save().await?;
    report(cli, &format!("Removed product {id} from cart"))
}

async fn show(app: &App, cli: &Cli) -> Result<()> {
    let items = app.cart.items().await;

    let products = if items.is_empty() {
        Vec::new()
    } else {
        let list = app.list();
        list.init().await;
        let view = list.view().await;
        if let Some(error) = &view.error {
            warn!(error = %error, "Could not load products, showing ids only");
        }
        view.products
    };

    let lines: Vec<CartLine> = items
        .into_iter()
        .map(|item| CartLine {
            product: products.iter().find(|p| p.id == item.product_id).cloned(),
            item,
        })
        .collect();

    match cli.format {
        OutputFormat::Text => println!("{}", TextFormatter::new(!cli.no_color).format_cart(&lines)),
        OutputFormat::Json => println!("{}", JsonFormatter::new(cli.pretty).format_cart(&lines)?),
    }
    Ok(())
}

fn report(cli: &Cli, message: &str) -> Result<()> {
    match cli.format {
        OutputFormat::Text => {
            if !cli.quiet {
                println!("{}", TextFormatter::new(!cli.no_color).format_success(message));
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({ "ok": true, "message": message });
            println!("{}", JsonFormatter::new(cli.pretty).format(&output)?);
        }
    }
    Ok(())
}
