//! RedShop Cart - the storefront's cart state and its collaborators.
//!
//! # Architecture
//!
//! - [`manager::CartManager`] owns the cart and is the only way to change it
//! - [`store::KeyValueStore`] persists the cart snapshot as a JSON string
//! - [`timer`] provides the clock and the cancellable removal timers
//! - [`driver::CartHandle`] shares a cart between tasks and fires timers on
//!   wall-clock time
//! - [`catalog`] and [`promo`] are the read-only product and promo code lists
//! - [`checkout`] runs the simulated payment flow
//!
//! The manager is an ordinary owned value. Any number of carts can coexist,
//! each with its own store and clock.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod checkout;
pub mod config;
pub mod driver;
pub mod error;
pub mod manager;
pub mod promo;
pub mod store;
pub mod timer;
pub mod totals;

pub use catalog::{Catalog, Product};
pub use checkout::{Checkout, OrderConfirmation};
pub use config::{CartConfig, ConfigError};
pub use driver::CartHandle;
pub use error::{CatalogError, CheckoutError, PromoError, StoreError};
pub use manager::{
    CART_STORAGE_KEY, CartEvent, CartEventKind, CartManager, LineItem, PendingRemoval,
    REMOVAL_GRACE_WINDOW,
};
pub use promo::{BUILTIN_PROMO_CODES, PromoBook, PromoCode};
pub use store::{FileStore, KeyValueStore, MemoryStore};
pub use timer::{Clock, ManualClock, SystemClock, TimerHandle, TimerQueue};
pub use totals::CartTotals;
