//! Domain models for the catalog.
//!
//! ## Submodules
//!
//! - [`product`] - Product entity and request payloads
//! - [`cart`] - Shopping cart lines
//! - [`session`] - Authentication state
//! - [`route`] - Navigation targets

mod cart;
mod product;
mod route;
mod session;

pub use cart::CartItem;
pub use product::{NewProduct, Product, ProductId, ProductPatch, REQUIRED_FIELDS, Rating};
pub use route::Route;
pub use session::AuthState;
