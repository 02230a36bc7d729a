//! Simulated checkout of the persisted cart.

use std::io::{self, Write};

use redshop_cart::{CartConfig, Checkout};
use redshop_core::PaymentMethod;

use super::cart::apply_promo;
use crate::render;

/// Pay for the cart and empty it.
///
/// # Errors
///
/// Returns an error if the cart is empty or the promo code is rejected.
pub fn run(
    config: &CartConfig,
    payment: PaymentMethod,
    promo: Option<&str>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut cart = config.open_cart();
    if let Some(code) = promo {
        apply_promo(&mut cart, code)?;
    }

    let mut checkout = Checkout::begin(&cart)?;
    checkout.select_payment_method(payment);
    checkout.confirm(&mut rand::rng())?;
    let order = checkout.complete(&mut cart)?;

    let mut out = io::stdout().lock();
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&order)?)?;
    } else {
        render::receipt(&mut out, &order)?;
    }
    Ok(())
}
