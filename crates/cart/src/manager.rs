//! Cart state manager.
//!
//! [`CartManager`] owns the authoritative cart: its line items in display
//! order, the single applied promo code, and the items waiting out their
//! removal grace window. Every change to the line items is written to the
//! key-value store straight away; promo state is session-only.
//!
//! Removal is deferred. [`CartManager::request_removal`] leaves the item in
//! the cart, flags it as pending and schedules a timer. The item is deleted
//! when [`CartManager::fire_due_timers`] runs after the deadline, unless
//! [`CartManager::undo_removal`] cancelled the timer first. Whoever hosts the
//! manager drives the timers, either by calling `fire_due_timers` from its
//! event loop or through [`crate::driver::CartHandle`].
//!
//! Observers subscribe to [`CartEvent`]s instead of the manager touching any
//! display directly.

use std::collections::BTreeMap;
use std::time::Duration;

use redshop_core::{Category, Price, ProductId};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info, instrument, warn};

use crate::catalog::{Catalog, Product};
use crate::error::PromoError;
use crate::promo::{PromoBook, PromoCode};
use crate::store::KeyValueStore;
use crate::timer::{Clock, TimerHandle, TimerQueue};
use crate::totals::CartTotals;

/// Storage key for the cart snapshot.
pub const CART_STORAGE_KEY: &str = "redshop_cart";

/// How long a requested removal can still be undone.
pub const REMOVAL_GRACE_WINDOW: Duration = Duration::from_secs(3);

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// One product in the cart with its quantity.
///
/// Display fields are copied from the catalog when the product is first
/// added and are not refreshed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub product_id: ProductId,
    pub title: String,
    pub unit_price: Price,
    /// Always at least 1.
    pub quantity: u32,
    pub image: String,
    pub category: Category,
}

impl LineItem {
    /// A line item for `quantity` units of `product` at its catalog price.
    #[must_use]
    pub fn from_product(product: &Product, quantity: u32) -> Self {
        Self {
            product_id: product.id,
            title: product.title.clone(),
            unit_price: product.price,
            quantity,
            image: product.image.clone(),
            category: product.category,
        }
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.unit_price.times(self.quantity)
    }
}

/// An item waiting out its removal grace window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRemoval {
    /// The line item as it was when removal was requested.
    pub item: LineItem,
    /// Its index in the cart at that moment.
    pub position: usize,
    /// Clock time at which the item is deleted.
    pub deadline: Duration,
    timer: TimerHandle,
}

impl PendingRemoval {
    /// Handle of the deferred deletion.
    #[must_use]
    pub const fn timer(&self) -> TimerHandle {
        self.timer
    }
}

/// What changed in the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartEventKind {
    /// The cart was replaced from the stored snapshot.
    Loaded,
    ItemAdded {
        product_id: ProductId,
        /// Quantity after the add.
        quantity: u32,
    },
    QuantityChanged {
        product_id: ProductId,
        quantity: u32,
    },
    RemovalRequested {
        product_id: ProductId,
        deadline: Duration,
    },
    RemovalUndone {
        product_id: ProductId,
    },
    /// A pending removal expired and the item left the cart.
    ItemRemoved {
        product_id: ProductId,
    },
    PromoApplied {
        code: &'static str,
        discount_percent: u8,
    },
    PromoRemoved {
        code: &'static str,
    },
    /// The cart was emptied after a purchase.
    Cleared,
}

/// A cart change together with the item count after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartEvent {
    pub kind: CartEventKind,
    /// Sum of quantities over all line items.
    pub item_count: u32,
}

/// The cart state manager.
pub struct CartManager<S, C> {
    cart: Vec<LineItem>,
    applied_promo: Option<PromoCode>,
    pending: BTreeMap<ProductId, PendingRemoval>,
    timers: TimerQueue<ProductId>,
    store: S,
    clock: C,
    promos: PromoBook,
    storage_key: String,
    grace_window: Duration,
    events: broadcast::Sender<CartEvent>,
}

impl<S: KeyValueStore, C: Clock> CartManager<S, C> {
    /// An empty cart persisting to `store` and timing removals with `clock`.
    ///
    /// Nothing is read from the store until [`Self::load`] is called.
    #[must_use]
    pub fn new(store: S, clock: C) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            cart: Vec::new(),
            applied_promo: None,
            pending: BTreeMap::new(),
            timers: TimerQueue::new(),
            store,
            clock,
            promos: PromoBook::default(),
            storage_key: CART_STORAGE_KEY.to_string(),
            grace_window: REMOVAL_GRACE_WINDOW,
            events,
        }
    }

    /// Use a different storage key for the snapshot.
    #[must_use]
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// Use a different removal grace window.
    #[must_use]
    pub fn with_grace_window(mut self, grace_window: Duration) -> Self {
        self.grace_window = grace_window;
        self
    }

    /// Use a different set of promo codes.
    #[must_use]
    pub fn with_promos(mut self, promos: PromoBook) -> Self {
        self.promos = promos;
        self
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Replace the cart with the stored snapshot.
    ///
    /// A missing, unreadable or malformed snapshot yields an empty cart. So
    /// does one with duplicate product IDs or a zero quantity. Outstanding
    /// pending removals are cancelled, since they refer to the replaced cart.
    #[instrument(skip(self), fields(key = %self.storage_key))]
    pub fn load(&mut self) {
        self.cancel_all_removals();
        self.cart = self.read_snapshot();
        debug!(items = self.cart.len(), "Cart loaded");
        self.emit(CartEventKind::Loaded);
    }

    fn read_snapshot(&self) -> Vec<LineItem> {
        let raw = match self.store.get(&self.storage_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(error = %e, "Failed to read cart snapshot, starting empty");
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<LineItem>>(&raw) {
            Ok(items) if is_consistent(&items) => items,
            Ok(_) => {
                warn!("Cart snapshot has duplicate or empty items, starting empty");
                Vec::new()
            }
            Err(e) => {
                warn!(error = %e, "Malformed cart snapshot, starting empty");
                Vec::new()
            }
        }
    }

    fn persist(&mut self) {
        let json = match serde_json::to_string(&self.cart) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "Failed to serialize cart snapshot");
                return;
            }
        };
        if let Err(e) = self.store.set(&self.storage_key, &json) {
            warn!(error = %e, "Failed to persist cart snapshot");
        }
    }

    // =========================================================================
    // Line items
    // =========================================================================

    /// Add `quantity` units of `product`, merging with an existing line.
    ///
    /// A quantity of zero is treated as one.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub fn add_item(&mut self, product: &Product, quantity: u32) {
        let quantity = quantity.max(1);
        let new_quantity = if let Some(existing) = self.find_mut(product.id) {
            existing.quantity = existing.quantity.saturating_add(quantity);
            existing.quantity
        } else {
            self.cart.push(LineItem::from_product(product, quantity));
            quantity
        };

        debug!(quantity = new_quantity, "Item added");
        self.persist();
        self.emit(CartEventKind::ItemAdded {
            product_id: product.id,
            quantity: new_quantity,
        });
    }

    /// Add a catalog product by ID. Returns `false` if the ID is unknown.
    pub fn add_product(&mut self, catalog: &Catalog, product_id: ProductId, quantity: u32) -> bool {
        catalog.get(product_id).is_some_and(|product| {
            self.add_item(product, quantity);
            true
        })
    }

    /// Flag an item for deletion after the grace window.
    ///
    /// The item stays in the cart, and in the totals, until the timer fires.
    /// Returns `false` without doing anything if the item is not in the cart
    /// or is already pending removal.
    #[instrument(skip(self))]
    pub fn request_removal(&mut self, product_id: ProductId) -> bool {
        if self.pending.contains_key(&product_id) {
            return false;
        }
        let Some(position) = self.cart.iter().position(|i| i.product_id == product_id) else {
            return false;
        };
        let Some(item) = self.cart.get(position).cloned() else {
            return false;
        };

        let deadline = self.clock.now().saturating_add(self.grace_window);
        let timer = self.timers.schedule(deadline, product_id);
        self.pending.insert(
            product_id,
            PendingRemoval {
                item,
                position,
                deadline,
                timer,
            },
        );

        debug!(?deadline, "Removal scheduled");
        self.emit(CartEventKind::RemovalRequested {
            product_id,
            deadline,
        });
        true
    }

    /// Cancel a pending removal. The item was never taken out of the cart,
    /// so it is left exactly as it is.
    ///
    /// Returns `false` if nothing was pending for this product.
    #[instrument(skip(self))]
    pub fn undo_removal(&mut self, product_id: ProductId) -> bool {
        let Some(pending) = self.pending.remove(&product_id) else {
            return false;
        };
        self.timers.cancel(pending.timer);

        debug!("Removal undone");
        self.emit(CartEventKind::RemovalUndone { product_id });
        true
    }

    /// Set an item's quantity. Zero requests removal instead.
    ///
    /// Returns `false` if the item is absent (or, for zero, if removal was
    /// not scheduled).
    #[instrument(skip(self))]
    pub fn set_quantity(&mut self, product_id: ProductId, quantity: u32) -> bool {
        if quantity < 1 {
            return self.request_removal(product_id);
        }
        let Some(item) = self.find_mut(product_id) else {
            return false;
        };
        item.quantity = quantity;

        debug!("Quantity updated");
        self.persist();
        self.emit(CartEventKind::QuantityChanged {
            product_id,
            quantity,
        });
        true
    }

    /// Add one unit to an item already in the cart.
    pub fn increment(&mut self, product_id: ProductId) -> bool {
        self.get(product_id)
            .map(|item| item.quantity.saturating_add(1))
            .is_some_and(|quantity| self.set_quantity(product_id, quantity))
    }

    /// Take one unit off an item; at quantity 1 this requests removal.
    pub fn decrement(&mut self, product_id: ProductId) -> bool {
        self.get(product_id)
            .map(|item| item.quantity.saturating_sub(1))
            .is_some_and(|quantity| self.set_quantity(product_id, quantity))
    }

    /// Empty the cart after a completed purchase.
    ///
    /// Outstanding removal timers are cancelled: their items are gone anyway.
    #[instrument(skip(self))]
    pub fn clear_after_purchase(&mut self) {
        let cancelled = self.cancel_all_removals();
        self.cart.clear();
        self.persist();

        info!(cancelled_removals = cancelled, "Cart cleared after purchase");
        self.emit(CartEventKind::Cleared);
    }

    // =========================================================================
    // Timers
    // =========================================================================

    /// Delete every item whose grace window has elapsed.
    ///
    /// An expired timer deletes its item whatever happened to the line in the
    /// meantime; only an undo prevents it. Returns the removed product IDs in
    /// deadline order.
    pub fn fire_due_timers(&mut self) -> Vec<ProductId> {
        let now = self.clock.now();
        let mut removed = Vec::new();

        for (handle, product_id) in self.timers.drain_due(now) {
            let live = self
                .pending
                .get(&product_id)
                .is_some_and(|p| p.timer == handle);
            if !live {
                continue;
            }
            self.pending.remove(&product_id);
            self.cart.retain(|item| item.product_id != product_id);

            debug!(%product_id, "Pending removal expired");
            self.persist();
            self.emit(CartEventKind::ItemRemoved { product_id });
            removed.push(product_id);
        }

        removed
    }

    /// Clock time of the next pending deletion.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    /// How long until the next pending deletion is due (zero if overdue).
    #[must_use]
    pub fn time_until_next_timer(&self) -> Option<Duration> {
        self.next_deadline()
            .map(|deadline| deadline.saturating_sub(self.clock.now()))
    }

    fn cancel_all_removals(&mut self) -> usize {
        let pending = std::mem::take(&mut self.pending);
        for removal in pending.values() {
            self.timers.cancel(removal.timer);
        }
        pending.len()
    }

    // =========================================================================
    // Promo codes
    // =========================================================================

    /// Apply a promo code and return its discount percentage.
    ///
    /// The code must match exactly; trimming user input is the caller's job.
    ///
    /// # Errors
    ///
    /// Returns [`PromoError::AlreadyApplied`] if a code is already in effect,
    /// or [`PromoError::NotFound`] if the code is unknown. State is unchanged
    /// on error.
    #[instrument(skip(self))]
    pub fn apply_promo(&mut self, code: &str) -> Result<u8, PromoError> {
        if let Some(active) = self.applied_promo {
            return Err(PromoError::AlreadyApplied { code: active.code });
        }
        let promo = self
            .promos
            .find(code)
            .ok_or_else(|| PromoError::NotFound(code.to_string()))?;
        self.applied_promo = Some(promo);

        info!(discount_percent = promo.discount_percent, "Promo code applied");
        self.emit(CartEventKind::PromoApplied {
            code: promo.code,
            discount_percent: promo.discount_percent,
        });
        Ok(promo.discount_percent)
    }

    /// Remove the applied promo code and return it.
    ///
    /// # Errors
    ///
    /// Returns [`PromoError::NoneApplied`] if no code is in effect.
    #[instrument(skip(self))]
    pub fn remove_promo(&mut self) -> Result<&'static str, PromoError> {
        let promo = self.applied_promo.take().ok_or(PromoError::NoneApplied)?;

        info!(code = promo.code, "Promo code removed");
        self.emit(CartEventKind::PromoRemoved { code: promo.code });
        Ok(promo.code)
    }

    /// Drop any applied promo code.
    pub fn clear_promo(&mut self) {
        if let Some(promo) = self.applied_promo.take() {
            self.emit(CartEventKind::PromoRemoved { code: promo.code });
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Subtotal, discount and total. Pending removals still count.
    #[must_use]
    pub fn compute_totals(&self) -> CartTotals {
        CartTotals::compute(&self.cart, self.applied_promo.as_ref())
    }

    /// Line items in display order, including those pending removal.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.cart
    }

    #[must_use]
    pub fn get(&self, product_id: ProductId) -> Option<&LineItem> {
        self.cart.iter().find(|i| i.product_id == product_id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cart.is_empty()
    }

    /// Sum of quantities over all line items.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.cart
            .iter()
            .fold(0_u32, |count, item| count.saturating_add(item.quantity))
    }

    #[must_use]
    pub const fn applied_promo(&self) -> Option<&PromoCode> {
        self.applied_promo.as_ref()
    }

    /// Pending removals ordered by product ID.
    pub fn pending_removals(&self) -> impl Iterator<Item = &PendingRemoval> {
        self.pending.values()
    }

    #[must_use]
    pub fn pending_removal(&self, product_id: ProductId) -> Option<&PendingRemoval> {
        self.pending.get(&product_id)
    }

    #[must_use]
    pub fn is_pending_removal(&self, product_id: ProductId) -> bool {
        self.pending.contains_key(&product_id)
    }

    #[must_use]
    pub const fn grace_window(&self) -> Duration {
        self.grace_window
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Give up the manager and keep its store.
    #[must_use]
    pub fn into_store(self) -> S {
        self.store
    }

    #[must_use]
    pub const fn clock(&self) -> &C {
        &self.clock
    }

    /// Receive every [`CartEvent`] emitted from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CartEvent> {
        self.events.subscribe()
    }

    fn find_mut(&mut self, product_id: ProductId) -> Option<&mut LineItem> {
        self.cart.iter_mut().find(|i| i.product_id == product_id)
    }

    fn emit(&self, kind: CartEventKind) {
        // No subscribers is fine.
        self.events
            .send(CartEvent {
                kind,
                item_count: self.item_count(),
            })
            .ok();
    }
}

/// At most one line per product, every quantity at least 1, no negative
/// unit price.
fn is_consistent(items: &[LineItem]) -> bool {
    let mut seen = std::collections::HashSet::with_capacity(items.len());
    items.iter().all(|item| {
        item.quantity >= 1 && !item.unit_price.is_negative() && seen.insert(item.product_id)
    })
}
