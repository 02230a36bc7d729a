//! Cart commands: show, add, set and remove.
//!
//! Each command opens the persisted cart, applies one change and exits.
//! A promo code given on the command line only lasts for that invocation.

use std::io::{self, Write};

use redshop_cart::{
    CartConfig, CartEvent, CartEventKind, CartHandle, CartManager, Clock, KeyValueStore,
};
use redshop_core::{ProductId, PromoInput};
use tokio::sync::broadcast::error::RecvError;
use tracing::info;

use crate::render;

/// Show the cart, optionally previewing totals with a promo code.
///
/// # Errors
///
/// Returns an error if the promo code is invalid or output fails.
pub fn show(
    config: &CartConfig,
    promo: Option<&str>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut cart = config.open_cart();
    if let Some(code) = promo {
        apply_promo(&mut cart, code)?;
    }

    let mut out = io::stdout().lock();
    if json {
        let view = serde_json::json!({
            "items": cart.items(),
            "itemCount": cart.item_count(),
            "promo": cart.applied_promo(),
            "totals": cart.compute_totals(),
        });
        writeln!(out, "{}", serde_json::to_string_pretty(&view)?)?;
    } else {
        render::cart(&mut out, &cart)?;
    }
    Ok(())
}

/// Add `quantity` units of a catalog product.
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded or the product is unknown.
pub fn add(
    config: &CartConfig,
    id: ProductId,
    quantity: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = config.catalog()?;
    let mut cart = config.open_cart();

    if !cart.add_product(&catalog, id, quantity) {
        return Err(format!("Product {id} not found").into());
    }
    info!(%id, quantity, "Added to cart");

    render::cart(&mut io::stdout().lock(), &cart)?;
    Ok(())
}

/// Set an item's quantity. Zero goes through the removal grace window.
///
/// # Errors
///
/// Returns an error if the product is not in the cart.
pub async fn set(
    config: &CartConfig,
    id: ProductId,
    quantity: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    if quantity == 0 {
        return remove(config, id).await;
    }

    let mut cart = config.open_cart();
    if !cart.set_quantity(id, quantity) {
        return Err(format!("Product {id} is not in the cart").into());
    }

    render::cart(&mut io::stdout().lock(), &cart)?;
    Ok(())
}

/// How an interactive removal ended.
enum Removal {
    Removed,
    Undone,
}

/// Remove an item once its grace window elapses. Ctrl-C before then undoes
/// the removal and leaves the cart unchanged.
///
/// # Errors
///
/// Returns an error if the product is not in the cart or the Ctrl-C handler
/// cannot be installed.
pub async fn remove(config: &CartConfig, id: ProductId) -> Result<(), Box<dyn std::error::Error>> {
    let handle = CartHandle::new(config.open_cart());
    let (title, grace, mut events) = {
        let cart = handle.lock().await;
        let item = cart
            .get(id)
            .ok_or_else(|| format!("Product {id} is not in the cart"))?;
        (item.title.clone(), cart.grace_window(), cart.subscribe())
    };

    handle.update(|cart| cart.request_removal(id)).await;
    let timers = handle.spawn_timers();
    writeln!(
        io::stdout().lock(),
        "Removing {title} in {:.1}s. Press Ctrl-C to undo.",
        grace.as_secs_f64()
    )?;

    let outcome = loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(CartEvent { kind: CartEventKind::ItemRemoved { product_id }, .. })
                    if product_id == id => break Removal::Removed,
                Ok(_) | Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => return Err("Cart event stream closed".into()),
            },
            signal = tokio::signal::ctrl_c() => {
                signal?;
                // The timer may have fired just before the signal arrived.
                if handle.update(|cart| cart.undo_removal(id)).await {
                    break Removal::Undone;
                }
                break Removal::Removed;
            }
        }
    };
    timers.abort();

    let cart = handle.lock().await;
    let mut out = io::stdout().lock();
    match outcome {
        Removal::Removed => writeln!(out, "Removed {title}")?,
        Removal::Undone => writeln!(out, "Kept {title}")?,
    }
    render::cart(&mut out, &cart)?;
    Ok(())
}

/// Validate and apply a promo code typed by the shopper.
///
/// # Errors
///
/// Returns an error if the input is blank or too long, the code is unknown,
/// or a code is already applied.
pub fn apply_promo<S: KeyValueStore, C: Clock>(
    cart: &mut CartManager<S, C>,
    raw: &str,
) -> Result<u8, Box<dyn std::error::Error>> {
    let input = PromoInput::parse(raw)?;
    Ok(cart.apply_promo(input.as_str())?)
}
