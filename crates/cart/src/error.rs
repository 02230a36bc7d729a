//! Error types for the cart crate.
//!
//! Every error here is recoverable and local: nothing in the cart is fatal,
//! and unknown product IDs are silent no-ops rather than errors.

use std::path::PathBuf;

use redshop_core::ProductId;
use thiserror::Error;

/// Errors from applying or removing a promo code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PromoError {
    /// A promo code is already in effect; it must be removed first.
    #[error("promo code {code} is already applied, remove it first")]
    AlreadyApplied {
        /// The code currently in effect.
        code: &'static str,
    },

    /// No known promo code matches.
    #[error("promo code not found: {0}")]
    NotFound(String),

    /// Removal attempted with no promo code in effect.
    #[error("no promo code applied")]
    NoneApplied,
}

/// Errors from a key-value store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    #[error("storage I/O failed for {path}: {source}")]
    Io {
        /// File that was being accessed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The key cannot be mapped to a storage location.
    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),
}

/// Errors from the simulated checkout flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CheckoutError {
    /// Checkout started with nothing in the cart.
    #[error("add items to the cart before checking out")]
    EmptyCart,

    /// Payment confirmed before a payment method was chosen.
    #[error("choose a payment method")]
    NoPaymentMethod,

    /// Order completion attempted before payment was confirmed.
    #[error("payment has not been confirmed")]
    NotConfirmed,
}

/// Errors from loading a product catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Catalog file could not be read.
    #[error("failed to read catalog {path}: {source}")]
    Io {
        /// Catalog file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Catalog YAML is malformed.
    #[error("catalog parsing failed: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Two products share an ID.
    #[error("duplicate product id {0}")]
    DuplicateId(ProductId),

    /// A product has a price below zero.
    #[error("product {0} has a negative price")]
    NegativePrice(ProductId),
}
