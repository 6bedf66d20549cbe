//! Text output formatting with colors.

use catalog_core::{AuthState, Product, Rating};
use catalog_store::Settings;
use chrono::Local;
use std::path::Path;

use super::{CartLine, cart_total, mask_token};

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";

/// Widest title shown in the product table.
const TITLE_WIDTH: usize = 40;

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    /// Formats the product table.
    pub fn format_product_list(&self, products: &[Product]) -> String {
        if products.is_empty() {
            return self.dim("No products");
        }

        let mut lines = vec![self.bold(&format!(
            "{:>4}  {:<width$}  {:>9}  {}",
            "ID",
            "TITLE",
            "PRICE",
            "RATING",
            width = TITLE_WIDTH
        ))];
        for p in products {
            lines.push(format!(
                "{:>4}  {:<width$}  {:>9}  {}",
                p.id,
                truncate(&p.title, TITLE_WIDTH),
                format_price(p.price),
                self.format_rating(p.rating),
                width = TITLE_WIDTH
            ));
        }
        lines.push(self.dim(&format!("{} products", products.len())));
        lines.join("\n")
    }

    /// Formats one product in full.
    pub fn format_product(&self, product: &Product) -> String {
        [
            format!("{} {}", self.bold(&product.title), self.dim(&format!("#{}", product.id))),
            format!("Price:    {}", self.green(&format_price(product.price))),
            format!("Category: {}", product.category),
            format!("Rating:   {}", self.format_rating(product.rating)),
            format!("Image:    {}", self.cyan(&product.image)),
            String::new(),
            product.description.clone(),
        ]
        .join("\n")
    }

    /// Formats the cart with subtotals.
    pub fn format_cart(&self, lines: &[CartLine]) -> String {
        if lines.is_empty() {
            return self.dim("Cart is empty");
        }

        let mut out = Vec::with_capacity(lines.len() + 2);
        for line in lines {
            let title = line
                .product
                .as_ref()
                .map_or_else(|| self.dim("(unavailable)"), |p| truncate(&p.title, TITLE_WIDTH));
            let subtotal = line
                .subtotal()
                .map_or_else(|| "-".to_string(), format_price);
            let added = line.item.added_at.with_timezone(&Local).format("%Y-%m-%d");
            out.push(format!(
                "{:>4}  {:<width$}  x{:<3} {:>9}  {}",
                line.item.product_id,
                title,
                line.item.quantity,
                subtotal,
                self.dim(&format!("added {added}")),
                width = TITLE_WIDTH
            ));
        }

        let units: u32 = lines.iter().map(|l| l.item.quantity).sum();
        out.push("─".repeat(TITLE_WIDTH + 20));
        out.push(format!(
            "{units} items, total {}",
            self.bold(&format_price(cart_total(lines)))
        ));
        out.join("\n")
    }

    /// Formats the authentication state.
    pub fn format_auth(&self, state: &AuthState, api_url: &str) -> String {
        let status = if state.is_authenticated {
            let who = state.username.as_deref().unwrap_or("token");
            self.green(&format!("Signed in ({who})"))
        } else {
            self.yellow("Anonymous")
        };
        format!("{status}\nAPI: {api_url}")
    }

    /// Formats settings, masking the token.
    pub fn format_settings(&self, settings: &Settings, path: &Path) -> String {
        let token = settings
            .api_token
            .as_deref()
            .map_or_else(|| self.dim("(none)"), mask_token);
        [
            self.bold("Catalog Configuration"),
            "─".repeat(40),
            format!("api_base_url:   {}", settings.api_base_url),
            format!("timeout_secs:   {}", settings.timeout_secs),
            format!("max_retries:    {}", settings.max_retries),
            format!("cache_ttl_secs: {}", settings.cache_ttl_secs),
            format!("api_token:      {token}"),
            format!("log_level:      {}", settings.log_level),
            String::new(),
            self.dim(&format!("File: {}", path.display())),
        ]
        .join("\n")
    }

    /// Formats a success message.
    pub fn format_success(&self, message: &str) -> String {
        format!("{} {message}", self.green("✓"))
    }

    /// Formats an error message.
    pub fn format_error(&self, message: &str) -> String {
        format!("{} {message}", self.red("✗"))
    }

    fn format_rating(&self, rating: Rating) -> String {
        if rating.count == 0 {
            return self.dim("unrated");
        }
        let text = format!("★ {:.1} ({})", rating.rate, rating.count);
        if rating.rate >= 4.0 {
            self.green(&text)
        } else if rating.rate >= 2.5 {
            self.yellow(&text)
        } else {
            self.red(&text)
        }
    }

    // ========================================================================
    // Colors
    // ========================================================================

    fn paint(&self, code: &str, text: &str) -> String {
        if self.use_colors {
            format!("{code}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn bold(&self, text: &str) -> String {
        self.paint(BOLD, text)
    }

    fn dim(&self, text: &str) -> String {
        self.paint(DIM, text)
    }

    fn green(&self, text: &str) -> String {
        self.paint(GREEN, text)
    }

    fn yellow(&self, text: &str) -> String {
        self.paint(YELLOW, text)
    }

    fn red(&self, text: &str) -> String {
        self.paint(RED, text)
    }

    fn cyan(&self, text: &str) -> String {
        self.paint(CYAN, text)
    }
}

fn format_price(price: f64) -> String {
    format!("${price:.2}")
}

/// Shortens `text` to `width` characters, ending with an ellipsis.
fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut out: String = text.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("exactly ten", 11), "exactly ten");
        assert_eq!(truncate("a longer title", 8), "a longe…");
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(109.95), "$109.95");
        assert_eq!(format_price(50.0), "$50.00");
    }

    #[test]
    fn test_rating_colors() {
        let formatter = TextFormatter::new(true);
        assert!(formatter.format_rating(Rating::new(4.5, 10)).contains(GREEN));
        assert!(formatter.format_rating(Rating::new(3.2, 120)).contains(YELLOW));
        assert!(formatter.format_rating(Rating::new(1.0, 3)).contains(RED));
        assert!(formatter.format_rating(Rating::empty()).contains("unrated"));
    }
}
