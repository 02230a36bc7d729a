//! RedShop Core - Shared types library.
//!
//! This crate provides common types used across all RedShop components:
//! - `cart` - Cart state manager, catalog, promo codes and checkout
//! - `cli` - Terminal storefront for browsing and managing the cart
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access, no timers.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for product IDs, prices, categories,
//!   payment methods and promo code input

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
