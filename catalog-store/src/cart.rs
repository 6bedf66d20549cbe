//! Shopping cart.
//!
//! Accumulates product ids added from the views. Optionally backed by a
//! JSON file so the cart survives restarts.

use catalog_core::{CartItem, ProductId};
use std::path::PathBuf;
use tokio::sync::{RwLock, watch};
use tracing::{debug, info};

use crate::error::StoreError;
use crate::persistence::{default_cart_path, load_json_or_default, save_json};

/// Cart with change notifications.
#[derive(Debug)]
pub struct CartStore {
    items: RwLock<Vec<CartItem>>,
    path: Option<PathBuf>,
    notify: watch::Sender<u64>,
}

impl Default for CartStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl CartStore {
    /// Creates an empty cart that is never written to disk.
    pub fn in_memory() -> Self {
        Self::with_items(Vec::new(), None)
    }

    fn with_items(items: Vec<CartItem>, path: Option<PathBuf>) -> Self {
        let (notify, _) = watch::channel(0);
        Self {
            items: RwLock::new(items),
            path,
            notify,
        }
    }

    /// Loads the cart from the default path.
    pub async fn load_default() -> Self {
        Self::load(default_cart_path()).await
    }

    /// Loads the cart from `path`, starting empty if it is missing or
    /// unreadable.
    pub async fn load(path: PathBuf) -> Self {
        let items: Vec<CartItem> = load_json_or_default(&path).await;
        debug!(path = %path.display(), count = items.len(), "Cart loaded");
        Self::with_items(items, Some(path))
    }

    /// Adds one unit of `product_id`.
    pub async fn add_to_cart(&self, product_id: ProductId) {
        {
            let mut items = self.items.write().await;
            match items.iter_mut().find(|i| i.product_id == product_id) {
                Some(item) => item.quantity += 1,
                None => items.push(CartItem::new(product_id)),
            }
        }
        self.notify_change();
        info!(product_id, "Added to cart");
    }

    /// Removes `product_id` entirely. Returns false if it was not in the cart.
    pub async fn remove(&self, product_id: ProductId) -> bool {
        let removed = {
            let mut items = self.items.write().await;
            let before = items.len();
            items.retain(|i| i.product_id != product_id);
            items.len() != before
        };
        if removed {
            self.notify_change();
        }
        removed
    }

    /// Empties the cart.
    pub async fn clear(&self) {
        self.items.write().await.clear();
        self.notify_change();
    }

    /// Returns the cart lines in insertion order.
    pub async fn items(&self) -> Vec<CartItem> {
        self.items.read().await.clone()
    }

    /// Total number of units.
    pub async fn count(&self) -> u32 {
        self.items.read().await.iter().map(|i| i.quantity).sum()
    }

    /// Writes the cart to its file, if it has one.
    ///
    /// # Errors
    ///
    /// Returns error if the cart cannot be written to disk.
    pub async fn save(&self) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let items = self.items.read().await;
        save_json(path, &*items).await
    }

    /// Subscribes to cart changes.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.notify.subscribe()
    }

    fn notify_change(&self) {
        self.notify.send_modify(|version| *version += 1);
    }
}
