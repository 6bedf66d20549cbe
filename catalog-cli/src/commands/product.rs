//! Product commands - list, show, create, update, delete.

use anyhow::{Result, anyhow};
use catalog_core::{Product, ProductId, ProductPatch};
use catalog_store::{ProductStore, SettingsStore};
use clap::Args;
use tracing::{debug, info};

use crate::app::App;
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the list command.
#[derive(Args)]
pub struct ListArgs {
    /// Bypass cached responses.
    #[arg(long, short)]
    pub refresh: bool,
}

/// Product form fields.
#[derive(Args, Debug, Clone, Default)]
pub struct ProductFields {
    /// Display title.
    #[arg(long)]
    pub title: Option<String>,

    /// Unit price.
    #[arg(long)]
    pub price: Option<f64>,

    /// Long description.
    #[arg(long)]
    pub description: Option<String>,

    /// Category name.
    #[arg(long)]
    pub category: Option<String>,

    /// Image URL.
    #[arg(long)]
    pub image: Option<String>,
}

impl ProductFields {
    /// Returns true if no field was given.
    pub fn is_empty(&self) -> bool {
        self.to_patch().is_empty()
    }

    /// The fields as a form submission.
    pub fn to_patch(&self) -> ProductPatch {
        self.apply_to(ProductPatch::default())
    }

    /// Overlays the given fields on `base`.
    pub fn apply_to(&self, base: ProductPatch) -> ProductPatch {
        ProductPatch {
            title: self.title.clone().or(base.title),
            price: self.price.or(base.price),
            description: self.description.clone().or(base.description),
            category: self.category.clone().or(base.category),
            image: self.image.clone().or(base.image),
            rating: base.rating,
        }
    }
}

/// Runs the list command.
pub async fn list(args: &ListArgs, cli: &Cli, settings: &SettingsStore) -> Result<()> {
    let app = App::new(cli, settings).await?;
    let list = app.list();

    if args.refresh {
        list.refresh().await;
    } else {
        list.init().await;
    }

    let view = list.view().await;
    if let Some(error) = view.error {
        anyhow::bail!(error);
    }

    match cli.format {
        OutputFormat::Text => {
            println!("{}", TextFormatter::new(!cli.no_color).format_product_list(&view.products));
        }
        OutputFormat::Json => {
            println!("{}", JsonFormatter::new(cli.pretty).format(&view.products)?);
        }
    }
    Ok(())
}

/// Runs the show command.
pub async fn show(id: ProductId, cli: &Cli, settings: &SettingsStore) -> Result<()> {
    let app = App::new(cli, settings).await?;
    let details = app.details(id);
    details.init().await;

    let view = details.view().await;
    if let Some(error) = view.error {
        anyhow::bail!(error);
    }
    let product = view
        .product
        .ok_or_else(|| anyhow!("product {id} not found"))?;

    print_product(&product, cli)
}

/// Runs the create command.
pub async fn create(fields: &ProductFields, cli: &Cli, settings: &SettingsStore) -> Result<()> {
    let app = App::new(cli, settings).await?;
    app.require_auth()?;

    app.form(None).save(fields.to_patch()).await?;
    check_mutation(&app.store).await?;

    let created = app
        .store
        .products()
        .await
        .pop()
        .ok_or_else(|| anyhow!("server returned no product"))?;
    info!(id = created.id, "Product created");
    debug!(route = %app.router.current(), "Form closed");

    print_product(&created, cli)
}

/// Runs the update command.
pub async fn update(
    id: ProductId,
    fields: &ProductFields,
    cli: &Cli,
    settings: &SettingsStore,
) -> Result<()> {
    if fields.is_empty() {
        anyhow::bail!(
            "nothing to update: pass at least one of --title, --price, --description, --category, --image"
        );
    }

    let app = App::new(cli, settings).await?;
    app.require_auth()?;

    // The collection must be loaded for the update to be reconciled into it.
    app.store.load_products().await;

    let form = app.form(Some(id));
    form.init().await;
    let current = current_selection(&app.store, id).await?;

    let mut base = ProductPatch::from(&current);
    base.rating = None;
    let patch = fields.apply_to(base);
    form.save(patch.clone()).await?;
    check_mutation(&app.store).await?;

    let updated = app
        .store
        .products()
        .await
        .into_iter()
        .find(|p| p.id == id)
        .unwrap_or_else(|| current.patched(&patch));
    info!(id, "Product updated");

    print_product(&updated, cli)
}

/// Runs the delete command.
pub async fn delete(id: ProductId, cli: &Cli, settings: &SettingsStore) -> Result<()> {
    let app = App::new(cli, settings).await?;
    app.require_auth()?;

    let details = app.details(id);
    details.init().await;
    let current = current_selection(&app.store, id).await?;

    details.delete(id).await;
    check_mutation(&app.store).await?;
    debug!(route = %app.router.current(), "Details closed");
    info!(id, "Product deleted");

    match cli.format {
        OutputFormat::Text => {
            let message = format!("Deleted product {id} ({})", current.title);
            println!("{}", TextFormatter::new(!cli.no_color).format_success(&message));
        }
        OutputFormat::Json => {
            let output = serde_json::json!({ "deleted": id, "title": current.title });
            println!("{}", JsonFormatter::new(cli.pretty).format(&output)?);
        }
    }
    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

async fn current_selection(store: &ProductStore, id: ProductId) -> Result<Product> {
    match store.selected_product().await {
        Some(product) => Ok(product),
        None => {
            let error = store.error().await;
            Err(anyhow!(error.unwrap_or_else(|| format!("product {id} not found"))))
        }
    }
}

/// Turns a failed mutation into an error.
async fn check_mutation(store: &ProductStore) -> Result<()> {
    match store.mutation_error().await {
        Some(error) => Err(anyhow!(error)),
        None => Ok(()),
    }
}

fn print_product(product: &Product, cli: &Cli) -> Result<()> {
    match cli.format {
        OutputFormat::Text => println!("{}", TextFormatter::new(!cli.no_color).format_product(product)),
        OutputFormat::Json => println!("{}", JsonFormatter::new(cli.pretty).format(product)?),
    }
    Ok(())
}
