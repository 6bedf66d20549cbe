//! Presentation containers.
//!
//! Each container projects store and auth state into a view model and
//! forwards user intents to the store or the cart. Containers hold no state
//! of their own beyond the id they were opened with.

mod details;
mod form;
mod list;

pub use details::{DetailsView, ProductDetailsContainer};
pub use form::{FormView, ProductFormContainer};
pub use list::{ListView, ProductListContainer};
