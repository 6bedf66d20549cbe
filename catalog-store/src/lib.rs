// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Catalog Store
//!
//! State management for the product catalog.
//!
//! This crate provides:
//!
//! - **ProductStore**: reconciles REST results into an observable collection
//!   and selection, with derived `loading`/`error`
//! - **Containers**: list, details and form view models over the store
//! - **CartStore** / **AuthStore**: the cart and the signed-in state
//! - **Router**: in-process navigation target
//! - **SettingsStore**: persisted configuration
//!
//! ## Usage
//!
//! ```ignore
//! use catalog_store::{ProductStore, Router, SettingsStore};
//! use std::sync::Arc;
//!
//! let settings = SettingsStore::load_default().await.effective().await;
//! let api = Arc::new(settings.build_client()?);
//! let store = ProductStore::new(api, Arc::new(Router::default()));
//!
//! store.load_products().await;
//! let mut rx = store.subscribe();
//! while rx.changed().await.is_ok() {
//!     println!("{} products", store.products().await.len());
//! }
//! ```

pub mod auth;
pub mod cart;
pub mod channel;
pub mod containers;
pub mod error;
pub mod navigation;
pub mod persistence;
pub mod product_store;
pub mod settings;

pub use auth::AuthStore;
pub use cart::CartStore;
pub use channel::{Channel, ChannelEvent, MutationState, RequestStatus};
pub use containers::{
    DetailsView, FormView, ListView, ProductDetailsContainer, ProductFormContainer,
    ProductListContainer,
};
pub use error::StoreError;
pub use navigation::Router;
pub use persistence::{
    default_cart_path, default_config_dir, default_settings_path, load_json, load_json_or_default,
    save_json,
};
pub use product_store::{
    CREATED_PRODUCT_RATING, NO_SELECTION, ProductStore, ProductView, UPDATED_PRODUCT_RATING,
};
pub use settings::{ENV_API_TOKEN, ENV_API_URL, LogLevel, SETTING_KEYS, Settings, SettingsStore};

#[cfg(test)]
mod testing;
