use catalog_core::{CoreError, Navigator, NewProduct, Product, ProductId, ProductPatch, Route};
use serde::Serialize;
use std::sync::Arc;
use tracing::error;

use crate::error::StoreError;
use crate::product_store::{NO_SELECTION, ProductStore};

/// What the product form renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormView {
    /// Product being edited, once loaded. `None` in create mode.
    pub product: Option<Product>,
    /// Derived store loading flag.
    pub loading: bool,
    /// Same flag, used to disable the submit control.
    pub is_submitting: bool,
}

/// Create/edit form container.
///
/// Opened with an id it edits that product; without one (or with `0`) it
/// creates a new one.
#[derive(Clone)]
pub struct ProductFormContainer {
    id: Option<ProductId>,
    store: Arc<ProductStore>,
    navigator: Arc<dyn Navigator>,
}

impl ProductFormContainer {
    /// Creates the container.
    pub fn new(
        id: Option<ProductId>,
        store: Arc<ProductStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            id: id.filter(|id| *id != NO_SELECTION),
            store,
            navigator,
        }
    }

    /// Id being edited, if any.
    pub fn product_id(&self) -> Option<ProductId> {
        self.id
    }

    /// Drops any previous selection and loads the edited product.
    pub async fn init(&self) {
        self.store.clear_selected_product().await;
        if let Some(id) = self.id {
            self.store.load_product(id).await;
        }
    }

    /// Current view model.
    pub async fn view(&self) -> FormView {
        let snapshot = self.store.snapshot().await;
        FormView {
            product: snapshot.selected_product,
            loading: snapshot.loading,
            is_submitting: snapshot.loading,
        }
    }

    /// Submits the form.
    ///
    /// All of title, price, description, category and image must be filled.
    /// Store failures land in the store's error state, not in the result.
    ///
    /// # Errors
    ///
    /// Returns a validation error, without touching the store, when a
    /// required field is missing.
    pub async fn save(&self, form: ProductPatch) -> Result<(), StoreError> {
        let missing = form.missing_required_fields();
        if !missing.is_empty() {
            error!(missing = ?missing, "Missing required fields");
            let fields = missing.iter().map(ToString::to_string).collect();
            return Err(CoreError::MissingFields(fields).into());
        }

        match self.id {
            Some(id) => self.store.update_product(id, form).await,
            None => self.store.create_product(NewProduct::try_from(form)?).await,
        }
        Ok(())
    }

    /// Leaves the form without saving.
    pub fn cancel(&self) {
        self.navigator.navigate(Route::ProductList);
    }
}
