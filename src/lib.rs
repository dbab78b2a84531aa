//! # Shopfront
//!
//! Typed client for a json-server style storefront backend: product search
//! with filters, sorting and paging, single-product reads and writes with
//! soft deletion, plus the cart, checkout, order and address logic the
//! storefront pages are built on.
//!
//! The [`mock`] module provides a compatible fake backend.
pub mod addresses;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod mock;
pub mod orders;
pub mod products;
pub mod query;

pub use client::StoreClient;
pub use error::{Result, ShopError};
