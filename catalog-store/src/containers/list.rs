use catalog_core::{Product, ProductId};
use serde::Serialize;
use std::sync::Arc;

use crate::auth::AuthStore;
use crate::cart::CartStore;
use crate::channel::RequestStatus;
use crate::product_store::ProductStore;

/// What the product list renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListView {
    /// Current collection.
    pub products: Vec<Product>,
    /// Derived store error.
    pub error: Option<String>,
    /// Derived store loading flag.
    pub loading: bool,
    /// Whether edit controls are shown.
    pub is_authenticated: bool,
}

/// Product list container.
#[derive(Clone)]
pub struct ProductListContainer {
    store: Arc<ProductStore>,
    auth: Arc<AuthStore>,
    cart: Arc<CartStore>,
}

impl ProductListContainer {
    /// Creates the container.
    pub fn new(store: Arc<ProductStore>, auth: Arc<AuthStore>, cart: Arc<CartStore>) -> Self {
        Self { store, auth, cart }
    }

    /// Loads the collection unless it was already requested.
    pub async fn init(&self) {
        if self.store.list_status().await == RequestStatus::Idle {
            self.store.load_products().await;
        }
    }

    /// Current view model.
    pub async fn view(&self) -> ListView {
        let snapshot = self.store.snapshot().await;
        ListView {
            products: snapshot.products,
            error: snapshot.error,
            loading: snapshot.loading,
            is_authenticated: self.auth.is_authenticated(),
        }
    }

    /// Adds one unit of `product_id` to the cart.
    pub async fn add_to_cart(&self, product_id: ProductId) {
        self.cart.add_to_cart(product_id).await;
    }

    /// Drops cached responses and reloads the collection.
    pub async fn refresh(&self) {
        self.store.refresh_cache().await;
    }
}
