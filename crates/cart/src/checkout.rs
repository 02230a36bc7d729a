//! Simulated checkout.
//!
//! No payment is taken. The flow mirrors the storefront's payment dialog:
//! 1. [`Checkout::begin`] snapshots the cart and its totals for the summary
//! 2. The shopper picks a payment method
//! 3. [`Checkout::confirm`] issues an order number
//! 4. [`Checkout::complete`] empties the cart and drops the promo code

use chrono::{DateTime, Utc};
use rand::Rng;
use redshop_core::{OrderNumber, PaymentMethod};
use serde::Serialize;
use tracing::info;

use crate::error::CheckoutError;
use crate::manager::{CartManager, LineItem};
use crate::store::KeyValueStore;
use crate::timer::Clock;
use crate::totals::CartTotals;

/// Smallest order number issued.
const MIN_ORDER_NUMBER: i32 = 10_000;
/// Largest order number issued.
const MAX_ORDER_NUMBER: i32 = 99_999;

/// Receipt for a confirmed (simulated) order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderConfirmation {
    pub order_number: OrderNumber,
    pub payment_method: PaymentMethod,
    pub totals: CartTotals,
    pub items: Vec<LineItem>,
    /// Applied promo code, if any.
    pub promo_code: Option<&'static str>,
    pub placed_at: DateTime<Utc>,
}

/// An in-progress checkout.
#[derive(Debug, Clone)]
pub struct Checkout {
    items: Vec<LineItem>,
    totals: CartTotals,
    promo_code: Option<&'static str>,
    payment_method: Option<PaymentMethod>,
    confirmation: Option<OrderConfirmation>,
}

impl Checkout {
    /// Start checking out the current cart.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::EmptyCart`] if the cart has no items.
    pub fn begin<S: KeyValueStore, C: Clock>(
        cart: &CartManager<S, C>,
    ) -> Result<Self, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        Ok(Self {
            items: cart.items().to_vec(),
            totals: cart.compute_totals(),
            promo_code: cart.applied_promo().map(|p| p.code),
            payment_method: None,
            confirmation: None,
        })
    }

    /// Totals shown on the payment summary.
    #[must_use]
    pub const fn totals(&self) -> &CartTotals {
        &self.totals
    }

    #[must_use]
    pub const fn payment_method(&self) -> Option<PaymentMethod> {
        self.payment_method
    }

    /// Choose (or change) the payment method. Ignored once confirmed.
    pub fn select_payment_method(&mut self, method: PaymentMethod) {
        if self.confirmation.is_none() {
            self.payment_method = Some(method);
        }
    }

    /// Confirm payment and issue an order number.
    ///
    /// Confirming again returns the existing confirmation.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::NoPaymentMethod`] if no method was selected.
    pub fn confirm<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Result<&OrderConfirmation, CheckoutError> {
        let payment_method = self.payment_method.ok_or(CheckoutError::NoPaymentMethod)?;

        let confirmation = self.confirmation.get_or_insert_with(|| {
            let order_number =
                OrderNumber::new(rng.random_range(MIN_ORDER_NUMBER..=MAX_ORDER_NUMBER));
            info!(%order_number, %payment_method, "Order confirmed");
            OrderConfirmation {
                order_number,
                payment_method,
                totals: self.totals,
                items: self.items.clone(),
                promo_code: self.promo_code,
                placed_at: Utc::now(),
            }
        });
        Ok(confirmation)
    }

    #[must_use]
    pub const fn confirmation(&self) -> Option<&OrderConfirmation> {
        self.confirmation.as_ref()
    }

    /// Finish the purchase: empty the cart and drop the promo code.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::NotConfirmed`] if payment was not confirmed;
    /// the cart is left untouched.
    pub fn complete<S: KeyValueStore, C: Clock>(
        self,
        cart: &mut CartManager<S, C>,
    ) -> Result<OrderConfirmation, CheckoutError> {
        let confirmation = self.confirmation.ok_or(CheckoutError::NotConfirmed)?;
        cart.clear_after_purchase();
        cart.clear_promo();
        Ok(confirmation)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use redshop_core::{Price, ProductId};

    use super::*;
    use crate::catalog::Catalog;
    use crate::manager::CART_STORAGE_KEY;
    use crate::store::MemoryStore;
    use crate::timer::ManualClock;

    fn filled_cart() -> CartManager<MemoryStore, ManualClock> {
        let catalog = Catalog::demo();
        let mut cart = CartManager::new(MemoryStore::new(), ManualClock::new());
        cart.add_product(&catalog, ProductId::new(2), 1);
        cart.add_product(&catalog, ProductId::new(4), 2);
        cart
    }

    #[test]
    fn test_begin_rejects_empty_cart() {
        let cart = CartManager::new(MemoryStore::new(), ManualClock::new());
        assert_eq!(Checkout::begin(&cart).unwrap_err(), CheckoutError::EmptyCart);
    }

    #[test]
    fn test_confirm_requires_payment_method() {
        let cart = filled_cart();
        let mut checkout = Checkout::begin(&cart).unwrap();
        let mut rng = StdRng::seed_from_u64(7);

        assert_eq!(
            checkout.confirm(&mut rng).unwrap_err(),
            CheckoutError::NoPaymentMethod
        );
    }

    #[test]
    fn test_complete_requires_confirmation() {
        let mut cart = filled_cart();
        let checkout = Checkout::begin(&cart).unwrap();
        assert_eq!(
            checkout.complete(&mut cart).unwrap_err(),
            CheckoutError::NotConfirmed
        );
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_full_flow_clears_cart_and_promo() {
        let mut cart = filled_cart();
        cart.apply_promo("REDSHOP10").unwrap();
        let mut rng = StdRng::seed_from_u64(42);

        let mut checkout = Checkout::begin(&cart).unwrap();
        assert_eq!(checkout.totals().subtotal, Price::from_whole(169_970));
        assert_eq!(checkout.totals().discount, Price::from_whole(16_997));

        checkout.select_payment_method(PaymentMethod::Card);
        let order_number = checkout.confirm(&mut rng).unwrap().order_number;
        assert!((MIN_ORDER_NUMBER..=MAX_ORDER_NUMBER).contains(&order_number.as_i32()));

        // Confirming twice keeps the first order number.
        assert_eq!(checkout.confirm(&mut rng).unwrap().order_number, order_number);

        let receipt = checkout.complete(&mut cart).unwrap();
        assert_eq!(receipt.items.len(), 2);
        assert_eq!(receipt.promo_code, Some("REDSHOP10"));
        assert_eq!(receipt.payment_method, PaymentMethod::Card);

        assert!(cart.is_empty());
        assert!(cart.applied_promo().is_none());
        assert_eq!(cart.compute_totals(), CartTotals::default());
        assert_eq!(
            cart.store().get(CART_STORAGE_KEY).unwrap().as_deref(),
            Some("[]")
        );
    }

    #[test]
    fn test_payment_method_locked_after_confirm() {
        let cart = filled_cart();
        let mut checkout = Checkout::begin(&cart).unwrap();
        let mut rng = StdRng::seed_from_u64(1);

        checkout.select_payment_method(PaymentMethod::Sbp);
        checkout.confirm(&mut rng).unwrap();
        checkout.select_payment_method(PaymentMethod::Cash);

        assert_eq!(checkout.payment_method(), Some(PaymentMethod::Sbp));
    }
}
