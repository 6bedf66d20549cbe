//! Shopping cart types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::product::ProductId;

/// A line in the shopping cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// Product added to the cart.
    pub product_id: ProductId,
    /// Number of units.
    pub quantity: u32,
    /// When the product was first added.
    pub added_at: DateTime<Utc>,
}

impl CartItem {
    /// Creates a cart line with a single unit.
    pub fn new(product_id: ProductId) -> Self {
        Self {
            product_id,
            quantity: 1,
            added_at: Utc::now(),
        }
    }
}
