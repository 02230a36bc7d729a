//! Core types for RedShop.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod price;
pub mod promo_input;
pub mod status;

pub use id::*;
pub use price::Price;
pub use promo_input::{PromoInput, PromoInputError};
pub use status::*;
