//! In-memory response cache for product reads.
//!
//! Holds the last list response and individual product responses, each
//! valid for a fixed TTL. A zero TTL disables caching.

use catalog_core::{Product, ProductId};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

/// Default time-to-live for cached responses.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone)]
struct Entry<T> {
    value: T,
    stored_at: Instant,
}

impl<T: Clone> Entry<T> {
    fn new(value: T) -> Self {
        Self {
            value,
            stored_at: Instant::now(),
        }
    }

    fn fresh(&self, ttl: Duration) -> Option<T> {
        (self.stored_at.elapsed() < ttl).then(|| self.value.clone())
    }
}

#[derive(Debug, Default)]
struct CacheInner {
    list: Option<Entry<Vec<Product>>>,
    items: HashMap<ProductId, Entry<Product>>,
}

/// TTL cache for product list and product-by-id responses.
#[derive(Debug)]
pub struct ResponseCache {
    ttl: Duration,
    inner: RwLock<CacheInner>,
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL)
    }
}

impl ResponseCache {
    /// Creates a cache with the given TTL.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            inner: RwLock::new(CacheInner::default()),
        }
    }

    /// Creates a cache that never stores anything.
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    /// Returns true if entries can be stored.
    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero()
    }

    /// Returns the cached product list, if fresh.
    pub async fn list(&self) -> Option<Vec<Product>> {
        let inner = self.inner.read().await;
        inner.list.as_ref().and_then(|e| e.fresh(self.ttl))
    }

    /// Stores a product list.
    pub async fn store_list(&self, products: &[Product]) {
        if !self.is_enabled() {
            return;
        }
        self.inner.write().await.list = Some(Entry::new(products.to_vec()));
    }

    /// Returns a cached product, if fresh.
    pub async fn item(&self, id: ProductId) -> Option<Product> {
        let inner = self.inner.read().await;
        inner.items.get(&id).and_then(|e| e.fresh(self.ttl))
    }

    /// Stores a single product.
    pub async fn store_item(&self, product: &Product) {
        if !self.is_enabled() {
            return;
        }
        self.inner
            .write()
            .await
            .items
            .insert(product.id, Entry::new(product.clone()));
    }

    /// Drops the list and, if given, one product entry.
    pub async fn evict(&self, id: Option<ProductId>) {
        let mut inner = self.inner.write().await;
        inner.list = None;
        if let Some(id) = id {
            inner.items.remove(&id);
        }
        debug!(id = ?id, "Evicted cache entries");
    }

    /// Drops every entry.
    pub async fn clear(&self) {
        let mut inner = self.inner.write().await;
        inner.list = None;
        inner.items.clear();
        debug!("Response cache cleared");
    }
}
