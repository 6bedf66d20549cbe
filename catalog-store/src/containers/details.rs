use catalog_core::{Product, ProductId};
use serde::Serialize;
use std::sync::Arc;

use crate::auth::AuthStore;
use crate::cart::CartStore;
use crate::product_store::ProductStore;

/// What the details page renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailsView {
    /// Selected product, once loaded.
    pub product: Option<Product>,
    /// Derived store error.
    pub error: Option<String>,
    /// Derived store loading flag.
    pub loading: bool,
    /// Whether the delete control is shown.
    pub is_authenticated: bool,
}

/// Product details container, opened for one id.
#[derive(Clone)]
pub struct ProductDetailsContainer {
    id: ProductId,
    store: Arc<ProductStore>,
    auth: Arc<AuthStore>,
    cart: Arc<CartStore>,
}

impl ProductDetailsContainer {
    /// Creates the container for product `id`.
    pub fn new(
        id: ProductId,
        store: Arc<ProductStore>,
        auth: Arc<AuthStore>,
        cart: Arc<CartStore>,
    ) -> Self {
        Self {
            id,
            store,
            auth,
            cart,
        }
    }

    /// Drops any previous selection and loads this container's product.
    pub async fn init(&self) {
        self.store.clear_selected_product().await;
        self.store.load_product(self.id).await;
    }

    /// Current view model.
    pub async fn view(&self) -> DetailsView {
        let snapshot = self.store.snapshot().await;
        DetailsView {
            product: snapshot.selected_product,
            error: snapshot.error,
            loading: snapshot.loading,
            is_authenticated: self.auth.is_authenticated(),
        }
    }

    /// Adds one unit of `product_id` to the cart.
    pub async fn add_to_cart(&self, product_id: ProductId) {
        self.cart.add_to_cart(product_id).await;
    }

    /// Deletes `product_id`. The store navigates back to the list on success.
    pub async fn delete(&self, product_id: ProductId) {
        self.store.delete_product(product_id).await;
    }
}
