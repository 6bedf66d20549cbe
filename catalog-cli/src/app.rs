//! Per-invocation wiring of client, stores and router.

use anyhow::{Context, Result};
use catalog_core::AuthState;
use catalog_store::{
    AuthStore, CartStore, ProductDetailsContainer, ProductFormContainer, ProductListContainer,
    ProductStore, Router, Settings, SettingsStore,
};
use std::sync::Arc;
use tracing::debug;

use crate::Cli;

/// Everything a command needs, built from settings and flags.
pub struct App {
    pub settings: Settings,
    pub store: Arc<ProductStore>,
    pub auth: Arc<AuthStore>,
    pub cart: Arc<CartStore>,
    pub router: Arc<Router>,
}

impl App {
    /// Builds the app from stored settings, environment and `--api-url`.
    pub async fn new(cli: &Cli, settings: &SettingsStore) -> Result<Self> {
        let mut settings = settings.effective().await;
        if let Some(url) = &cli.api_url {
            settings.api_base_url.clone_from(url);
        }
        debug!(url = %settings.api_base_url, signed_in = settings.has_token(), "Building client");

        let api = Arc::new(
            settings
                .build_client()
                .with_context(|| format!("invalid API URL: {}", settings.api_base_url))?,
        );
        let router = Arc::new(Router::default());
        let store = Arc::new(ProductStore::new(api, router.clone()));
        let auth = Arc::new(AuthStore::new(auth_state(&settings)));
        let cart = Arc::new(CartStore::load_default().await);

        Ok(Self {
            settings,
            store,
            auth,
            cart,
            router,
        })
    }

    pub fn list(&self) -> ProductListContainer {
        ProductListContainer::new(self.store.clone(), self.auth.clone(), self.cart.clone())
    }

    pub fn details(&self, id: u64) -> ProductDetailsContainer {
        ProductDetailsContainer::new(id, self.store.clone(), self.auth.clone(), self.cart.clone())
    }

    pub fn form(&self, id: Option<u64>) -> ProductFormContainer {
        ProductFormContainer::new(id, self.store.clone(), self.router.clone())
    }

    /// Fails unless a token is configured.
    pub fn require_auth(&self) -> Result<()> {
        if self.auth.is_authenticated() {
            Ok(())
        } else {
            anyhow::bail!(
                "not signed in: run `catalog config set api_token <token>` or set CATALOG_API_TOKEN"
            )
        }
    }
}

/// A configured token counts as signed in; the user name is not known locally.
fn auth_state(settings: &Settings) -> AuthState {
    if settings.has_token() {
        AuthState {
            is_authenticated: true,
            username: None,
        }
    } else {
        AuthState::anonymous()
    }
}
