//! CLI command implementations.

pub mod cart;
pub mod config;
pub mod product;
pub mod whoami;
