//! Product-related types.
//!
//! This module contains the catalog entity and its request payloads:
//! - [`Product`] - A catalog item as returned by the API
//! - [`Rating`] - Aggregate customer rating
//! - [`NewProduct`] - Create payload (a product without an id)
//! - [`ProductPatch`] - Partial update payload

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Server-assigned product identifier.
///
/// `0` is never assigned by the server and is used as the "no selection"
/// sentinel by the store.
pub type ProductId = u64;

/// Names of the fields a product form must fill before it can be saved.
pub const REQUIRED_FIELDS: [&str; 5] = ["title", "price", "description", "category", "image"];

// ============================================================================
// Rating
// ============================================================================

/// Aggregate customer rating for a product.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rating {
    /// Average rate (0.0 - 5.0).
    pub rate: f64,
    /// Number of ratings.
    pub count: u64,
}

impl Rating {
    /// Creates a new rating.
    pub const fn new(rate: f64, count: u64) -> Self {
        Self { rate, count }
    }

    /// The empty rating (no votes).
    pub const fn empty() -> Self {
        Self::new(0.0, 0)
    }
}

// ============================================================================
// Product
// ============================================================================

/// A catalog item.
///
/// Identity is [`Product::id`]. `rating` is optional on the wire since the
/// update endpoint never echoes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Server-assigned identifier.
    pub id: ProductId,
    /// Display title.
    pub title: String,
    /// Unit price.
    pub price: f64,
    /// Long description.
    pub description: String,
    /// Category name.
    pub category: String,
    /// Image URL.
    pub image: String,
    /// Customer rating.
    #[serde(default)]
    pub rating: Rating,
}

impl Product {
    /// Builds a product from a server-assigned id and a create payload.
    pub fn from_new(id: ProductId, product: NewProduct) -> Self {
        Self {
            id,
            title: product.title,
            price: product.price,
            description: product.description,
            category: product.category,
            image: product.image,
            rating: product.rating,
        }
    }

    /// Returns a copy with `patch` applied on top of this product.
    ///
    /// Fields absent from the patch keep their current value.
    #[must_use]
    pub fn patched(&self, patch: &ProductPatch) -> Self {
        Self {
            id: self.id,
            title: patch.title.clone().unwrap_or_else(|| self.title.clone()),
            price: patch.price.unwrap_or(self.price),
            description: patch
                .description
                .clone()
                .unwrap_or_else(|| self.description.clone()),
            category: patch.category.clone().unwrap_or_else(|| self.category.clone()),
            image: patch.image.clone().unwrap_or_else(|| self.image.clone()),
            rating: patch.rating.unwrap_or(self.rating),
        }
    }

    /// Returns the same product with its rating replaced.
    #[must_use]
    pub fn with_rating(mut self, rating: Rating) -> Self {
        self.rating = rating;
        self
    }
}

// ============================================================================
// Request Payloads
// ============================================================================

/// Create payload: a product without an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    /// Display title.
    pub title: String,
    /// Unit price.
    pub price: f64,
    /// Long description.
    pub description: String,
    /// Category name.
    pub category: String,
    /// Image URL.
    pub image: String,
    /// Initial rating.
    #[serde(default)]
    pub rating: Rating,
}

impl TryFrom<ProductPatch> for NewProduct {
    type Error = CoreError;

    /// Promotes a fully filled form into a create payload with an empty rating.
    fn try_from(patch: ProductPatch) -> Result<Self, Self::Error> {
        let missing = patch.missing_required_fields();
        if !missing.is_empty() {
            return Err(CoreError::MissingFields(
                missing.iter().map(ToString::to_string).collect(),
            ));
        }

        match patch {
            ProductPatch {
                title: Some(title),
                price: Some(price),
                description: Some(description),
                category: Some(category),
                image: Some(image),
                ..
            } => Ok(Self {
                title,
                price,
                description,
                category,
                image,
                rating: Rating::empty(),
            }),
            _ => Err(CoreError::InvalidData("incomplete product form".to_string())),
        }
    }
}

/// Partial update payload. Absent fields are not serialized.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProductPatch {
    /// Display title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Unit price.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    /// Long description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Category name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Image URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Rating.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<Rating>,
}

impl ProductPatch {
    /// Returns true if the patch carries no field at all.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Lists required fields that are absent or blank.
    ///
    /// Blank strings and a zero price count as missing.
    pub fn missing_required_fields(&self) -> Vec<&'static str> {
        fn blank(value: Option<&String>) -> bool {
            value.is_none_or(|v| v.trim().is_empty())
        }

        let checks = [
            blank(self.title.as_ref()),
            self.price.is_none_or(|p| p == 0.0 || p.is_nan()),
            blank(self.description.as_ref()),
            blank(self.category.as_ref()),
            blank(self.image.as_ref()),
        ];

        REQUIRED_FIELDS
            .iter()
            .zip(checks)
            .filter_map(|(name, missing)| missing.then_some(*name))
            .collect()
    }
}

impl From<&Product> for ProductPatch {
    fn from(product: &Product) -> Self {
        Self {
            title: Some(product.title.clone()),
            price: Some(product.price),
            description: Some(product.description.clone()),
            category: Some(product.category.clone()),
            image: Some(product.image.clone()),
            rating: Some(product.rating),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
