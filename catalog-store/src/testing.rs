//! Test doubles shared by the store's unit tests.

use async_trait::async_trait;
use catalog_core::{NewProduct, Product, ProductId, ProductPatch, Rating};
use catalog_fetch::{FetchError, ProductApi};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// In-memory data client with scripted failures and delays.
///
/// Responses are computed when a call starts; a scripted delay only holds
/// back their delivery.
#[derive(Default)]
pub struct MockApi {
    remote: Mutex<Vec<Product>>,
    calls: Mutex<Vec<&'static str>>,
    fail_next: Mutex<Option<FetchError>>,
    delays: Mutex<HashMap<&'static str, Duration>>,
    update_response: Mutex<Option<Product>>,
}

impl MockApi {
    pub fn with_products(products: Vec<Product>) -> Self {
        let api = Self::default();
        api.set_products(products);
        api
    }

    pub fn set_products(&self, products: Vec<Product>) {
        *self.remote.lock().unwrap() = products;
    }

    pub fn insert_remote(&self, product: Product) {
        self.remote.lock().unwrap().push(product);
    }

    /// The next call of any kind fails with `error`.
    pub fn fail_next(&self, error: FetchError) {
        *self.fail_next.lock().unwrap() = Some(error);
    }

    /// The next `op` call is delivered after `delay`.
    pub fn delay_next(&self, op: &'static str, delay: Duration) {
        self.delays.lock().unwrap().insert(op, delay);
    }

    /// Every update answers with `product`.
    pub fn set_update_response(&self, product: Product) {
        *self.update_response.lock().unwrap() = Some(product);
    }

    pub fn call_count(&self, op: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| **c == op).count()
    }

    /// Records the call and returns its scripted failure and delay.
    fn start(&self, op: &'static str) -> (Option<FetchError>, Option<Duration>) {
        self.calls.lock().unwrap().push(op);
        let failure = self.fail_next.lock().unwrap().take();
        let delay = self.delays.lock().unwrap().remove(op);
        (failure, delay)
    }

    async fn deliver<T>(result: Result<T, FetchError>, delay: Option<Duration>) -> Result<T, FetchError> {
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        result
    }

    fn not_found(id: ProductId) -> FetchError {
        FetchError::server(404, format!("Product {id} not found"))
    }
}

#[async_trait]
impl ProductApi for MockApi {
    async fn list(&self) -> Result<Vec<Product>, FetchError> {
        let (failure, delay) = self.start("list");
        let result = match failure {
            Some(e) => Err(e),
            None => Ok(self.remote.lock().unwrap().clone()),
        };
        Self::deliver(result, delay).await
    }

    async fn get(&self, id: ProductId) -> Result<Product, FetchError> {
        let (failure, delay) = self.start("get");
        let result = match failure {
            Some(e) => Err(e),
            None => self
                .remote
                .lock()
                .unwrap()
                .iter()
                .find(|p| p.id == id)
                .cloned()
                .ok_or_else(|| Self::not_found(id)),
        };
        Self::deliver(result, delay).await
    }

    async fn create(&self, product: &NewProduct) -> Result<Product, FetchError> {
        let (failure, delay) = self.start("create");
        let result = match failure {
            Some(e) => Err(e),
            None => {
                let mut remote = self.remote.lock().unwrap();
                let id = remote.iter().map(|p| p.id).max().unwrap_or(0) + 1;
                let created = Product::from_new(id, product.clone());
                remote.push(created.clone());
                Ok(created)
            }
        };
        Self::deliver(result, delay).await
    }

    async fn update(&self, id: ProductId, patch: &ProductPatch) -> Result<Product, FetchError> {
        let (failure, delay) = self.start("update");
        let result = match failure {
            Some(e) => Err(e),
            None => {
                let scripted = self.update_response.lock().unwrap().clone();
                match scripted {
                    Some(product) => Ok(product),
                    None => {
                        let mut remote = self.remote.lock().unwrap();
                        match remote.iter_mut().find(|p| p.id == id) {
                            Some(slot) => {
                                *slot = slot.patched(patch);
                                Ok(slot.clone().with_rating(Rating::empty()))
                            }
                            None => Err(Self::not_found(id)),
                        }
                    }
                }
            }
        };
        Self::deliver(result, delay).await
    }

    async fn delete(&self, id: ProductId) -> Result<(), FetchError> {
        let (failure, delay) = self.start("delete");
        let result = match failure {
            Some(e) => Err(e),
            None => {
                let mut remote = self.remote.lock().unwrap();
                let before = remote.len();
                remote.retain(|p| p.id != id);
                if remote.len() == before {
                    Err(Self::not_found(id))
                } else {
                    Ok(())
                }
            }
        };
        Self::deliver(result, delay).await
    }

    async fn invalidate_cache(&self) {
        self.calls.lock().unwrap().push("invalidate_cache");
    }
}

/// A fully populated product with a non-empty rating.
pub fn sample_product(id: ProductId) -> Product {
    Product {
        id,
        title: format!("Product {id}"),
        price: 10.0 * id as f64,
        description: "d".to_string(),
        category: "c".to_string(),
        image: "i".to_string(),
        rating: Rating::new(4.5, 10),
    }
}

/// Store, auth and cart wired to `api` with a fresh router.
pub fn fixture(
    api: std::sync::Arc<MockApi>,
) -> (
    std::sync::Arc<crate::ProductStore>,
    std::sync::Arc<crate::AuthStore>,
    std::sync::Arc<crate::CartStore>,
    std::sync::Arc<crate::Router>,
) {
    use std::sync::Arc;

    let router = Arc::new(crate::Router::default());
    let store = Arc::new(crate::ProductStore::new(api, router.clone()));
    (
        store,
        Arc::new(crate::AuthStore::default()),
        Arc::new(crate::CartStore::in_memory()),
        router,
    )
}
