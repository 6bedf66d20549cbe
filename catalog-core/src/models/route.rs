//! Navigation targets.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::product::ProductId;

/// A screen the application can navigate to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", tag = "route", content = "id")]
pub enum Route {
    /// The product list.
    #[default]
    ProductList,
    /// A single product.
    ProductDetails(ProductId),
    /// The create form.
    NewProduct,
    /// The edit form for a product.
    EditProduct(ProductId),
    /// The shopping cart.
    Cart,
}

impl Route {
    /// Returns the URL path for this route.
    pub fn path(&self) -> String {
        match self {
            Self::ProductList => "/products".to_string(),
            Self::ProductDetails(id) => format!("/products/{id}"),
            Self::NewProduct => "/products/new".to_string(),
            Self::EditProduct(id) => format!("/products/{id}/edit"),
            Self::Cart => "/cart".to_string(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
