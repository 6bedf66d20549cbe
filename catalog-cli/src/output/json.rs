//! JSON output formatting.

use anyhow::Result;
use catalog_core::{AuthState, ProductId};
use catalog_store::{LogLevel, Settings};
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use super::{CartLine, cart_total, mask_token};

// ============================================================================
// Output Types
// ============================================================================

/// JSON output for the cart.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartOutput {
    pub items: Vec<CartLineOutput>,
    pub total_items: u32,
    pub total_price: f64,
}

/// One cart line.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineOutput {
    pub product_id: ProductId,
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<f64>,
    #[serde(serialize_with = "serialize_datetime")]
    pub added_at: DateTime<Utc>,
}

/// Settings with the token masked.
#[derive(Debug, Serialize)]
pub struct SettingsOutput {
    pub api_base_url: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub cache_ttl_secs: u64,
    pub api_token: Option<String>,
    pub log_level: LogLevel,
    pub path: String,
}

/// Authentication state plus the endpoint it applies to.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthOutput<'a> {
    #[serde(flatten)]
    pub state: &'a AuthState,
    pub api_url: &'a str,
}

fn serialize_datetime<S>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    s.serialize_str(&dt.to_rfc3339())
}

// ============================================================================
// JSON Formatter
// ============================================================================

/// JSON formatter.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Formats any serializable value.
    pub fn format<T: Serialize + ?Sized>(&self, data: &T) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(data)?
        } else {
            serde_json::to_string(data)?
        };
        Ok(json)
    }

    /// Formats the cart with totals.
    pub fn format_cart(&self, lines: &[CartLine]) -> Result<String> {
        let output = CartOutput {
            items: lines
                .iter()
                .map(|line| CartLineOutput {
                    product_id: line.item.product_id,
                    quantity: line.item.quantity,
                    title: line.product.as_ref().map(|p| p.title.clone()),
                    unit_price: line.product.as_ref().map(|p| p.price),
                    added_at: line.item.added_at,
                })
                .collect(),
            total_items: lines.iter().map(|l| l.item.quantity).sum(),
            total_price: cart_total(lines),
        };
        self.format(&output)
    }

    /// Formats settings, masking the token.
    pub fn format_settings(&self, settings: &Settings, path: &str) -> Result<String> {
        let output = SettingsOutput {
            api_base_url: settings.api_base_url.clone(),
            timeout_secs: settings.timeout_secs,
            max_retries: settings.max_retries,
            cache_ttl_secs: settings.cache_ttl_secs,
            api_token: settings.api_token.as_deref().map(mask_token),
            log_level: settings.log_level,
            path: path.to_string(),
        };
        self.format(&output)
    }

    /// Formats the authentication state.
    pub fn format_auth(&self, state: &AuthState, api_url: &str) -> Result<String> {
        self.format(&AuthOutput { state, api_url })
    }
}
