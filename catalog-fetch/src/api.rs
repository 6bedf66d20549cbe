//! The data client contract consumed by the product store.

use async_trait::async_trait;
use catalog_core::{NewProduct, Product, ProductId, ProductPatch};

use crate::error::FetchError;

/// CRUD operations on the product resource.
///
/// Implementations own no view state. Every call may fail with a
/// [`FetchError`] whose `Display` output is a human-readable message.
///
/// ## Implementing the contract
///
/// ```ignore
/// struct FixtureApi(Vec<Product>);
///
/// #[async_trait]
/// impl ProductApi for FixtureApi {
///     async fn list(&self) -> Result<Vec<Product>, FetchError> {
///         Ok(self.0.clone())
///     }
///     // ...
/// }
/// ```
#[async_trait]
pub trait ProductApi: Send + Sync {
    /// Fetches all products.
    async fn list(&self) -> Result<Vec<Product>, FetchError>;

    /// Fetches a single product.
    async fn get(&self, id: ProductId) -> Result<Product, FetchError>;

    /// Creates a product; the server assigns its id.
    async fn create(&self, product: &NewProduct) -> Result<Product, FetchError>;

    /// Updates a product with the fields present in `patch`.
    async fn update(&self, id: ProductId, patch: &ProductPatch) -> Result<Product, FetchError>;

    /// Deletes a product.
    async fn delete(&self, id: ProductId) -> Result<(), FetchError>;

    /// Drops any cached responses so the next read hits the server.
    async fn invalidate_cache(&self);
}
