// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Catalog Fetch
//!
//! The product data client for the catalog.
//!
//! This crate provides:
//!
//! - [`api::ProductApi`] - The CRUD contract consumed by the product store
//! - [`client::RestProductClient`] - `reqwest` implementation against a
//!   `/products` REST resource, with retries and a read cache
//! - [`cache::ResponseCache`] - TTL cache for list and by-id responses
//! - [`retry::RetryStrategy`] - Backoff policy for transient failures
//!
//! ## Example
//!
//! ```ignore
//! use catalog_fetch::{ProductApi, RestProductClient};
//!
//! let client = RestProductClient::builder()
//!     .base_url("https://fakestoreapi.com")
//!     .build()?;
//!
//! let products = client.list().await?;
//! ```

pub mod api;
pub mod cache;
pub mod client;
pub mod error;
pub mod retry;

// Re-export key types at crate root
pub use api::ProductApi;
pub use cache::{DEFAULT_CACHE_TTL, ResponseCache};
pub use client::{DEFAULT_BASE_URL, RestProductClient, RestProductClientBuilder};
pub use error::FetchError;
pub use retry::RetryStrategy;
