//! Output formatting for CLI.

mod json;
mod text;

use catalog_core::{CartItem, Product};

pub use json::JsonFormatter;
pub use text::TextFormatter;

/// A cart entry joined with its product, when the product could be loaded.
#[derive(Debug, Clone)]
pub struct CartLine {
    pub item: CartItem,
    pub product: Option<Product>,
}

impl CartLine {
    /// Price times quantity, if the product is known.
    pub fn subtotal(&self) -> Option<f64> {
        self.product
            .as_ref()
            .map(|p| p.price * f64::from(self.item.quantity))
    }
}

/// Sum of the known subtotals.
pub fn cart_total(lines: &[CartLine]) -> f64 {
    lines.iter().filter_map(CartLine::subtotal).sum()
}

/// Hides all but the first four characters of a token.
pub fn mask_token(token: &str) -> String {
    let visible: String = token.chars().take(4).collect();
    format!("{visible}****")
}
