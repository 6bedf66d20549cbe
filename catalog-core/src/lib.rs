// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Catalog Core
//!
//! Core types, models, and traits for the product catalog.
//!
//! This crate provides the foundational abstractions used across the other
//! catalog crates:
//!
//! - Domain models (products, cart lines, auth state, routes)
//! - Error types
//! - The navigation seam used by the state store
//!
//! ## Key Types
//!
//! ### Products
//! - [`Product`] - A catalog item as returned by the API
//! - [`NewProduct`] - Create payload
//! - [`ProductPatch`] - Partial update payload, also used as form data
//! - [`Rating`] - Aggregate customer rating
//!
//! ### Application
//! - [`CartItem`] - A line in the shopping cart
//! - [`AuthState`] - Signed-in state consumed by the views
//! - [`Route`] - Navigation targets
//! - [`Navigator`] - Navigation side-effect sink

pub mod error;
pub mod models;
pub mod traits;

// Re-export error types
pub use error::CoreError;

// Re-export all model types
pub use models::{
    AuthState, CartItem, NewProduct, Product, ProductId, ProductPatch, REQUIRED_FIELDS, Rating,
    Route,
};

// Re-export traits
pub use traits::{Navigator, NoopNavigator};
