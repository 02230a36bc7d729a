//! Plain-text rendering of catalog, cart and receipt views.

use std::io::{self, Write};

use redshop_cart::{
    CartManager, CartTotals, Clock, KeyValueStore, OrderConfirmation, Product, PromoCode,
};

/// One catalog line: `[id] title - price (category)`.
pub fn product_row(out: &mut impl Write, product: &Product) -> io::Result<()> {
    writeln!(
        out,
        "[{}] {} - {} ({})",
        product.id, product.title, product.price, product.category
    )
}

/// The product detail view.
pub fn product_detail(out: &mut impl Write, product: &Product) -> io::Result<()> {
    writeln!(out, "{} [{}]", product.title, product.id)?;
    writeln!(out, "Category: {}", product.category)?;
    writeln!(out, "Price:    {}", product.price)?;
    writeln!(out)?;
    let description = if product.full_description.is_empty() {
        &product.description
    } else {
        &product.full_description
    };
    writeln!(out, "{description}")?;
    if !product.features.is_empty() {
        writeln!(out)?;
        for feature in &product.features {
            writeln!(out, "  * {feature}")?;
        }
    }
    Ok(())
}

pub fn promos(out: &mut impl Write, codes: &[PromoCode]) -> io::Result<()> {
    for promo in codes {
        writeln!(
            out,
            "{:<12} {:>3}%  {}",
            promo.code, promo.discount_percent, promo.description
        )?;
    }
    Ok(())
}

/// The cart with line totals and the totals block.
///
/// Items waiting out their removal grace window are marked and still count
/// towards the totals.
pub fn cart<S: KeyValueStore, C: Clock>(
    out: &mut impl Write,
    cart: &CartManager<S, C>,
) -> io::Result<()> {
    if cart.is_empty() {
        return writeln!(out, "Cart is empty");
    }

    for item in cart.items() {
        let marker = if cart.is_pending_removal(item.product_id) {
            " (removing, undo available)"
        } else {
            ""
        };
        writeln!(
            out,
            "[{}] {} x{} @ {} = {}{marker}",
            item.product_id,
            item.title,
            item.quantity,
            item.unit_price,
            item.line_total()
        )?;
    }
    writeln!(out, "Items: {}", cart.item_count())?;
    totals(out, &cart.compute_totals(), cart.applied_promo())
}

pub fn totals(
    out: &mut impl Write,
    totals: &CartTotals,
    promo: Option<&PromoCode>,
) -> io::Result<()> {
    writeln!(out, "Subtotal: {}", totals.subtotal)?;
    if let Some(promo) = promo {
        writeln!(
            out,
            "Discount: -{} ({} {}%)",
            totals.discount, promo.code, promo.discount_percent
        )?;
    }
    writeln!(out, "Total:    {}", totals.total)
}

pub fn receipt(out: &mut impl Write, order: &OrderConfirmation) -> io::Result<()> {
    writeln!(out, "Order #{} confirmed", order.order_number)?;
    writeln!(out, "Paid by {}", order.payment_method)?;
    for item in &order.items {
        writeln!(
            out,
            "  {} x{} = {}",
            item.title,
            item.quantity,
            item.line_total()
        )?;
    }
    writeln!(out, "Subtotal: {}", order.totals.subtotal)?;
    if let Some(code) = order.promo_code {
        writeln!(out, "Discount: -{} ({code})", order.totals.discount)?;
    }
    writeln!(out, "Total:    {}", order.totals.total)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use redshop_cart::{Catalog, ManualClock, MemoryStore};
    use redshop_core::ProductId;

    use super::*;

    fn rendered(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_empty_cart() {
        let cart = CartManager::new(MemoryStore::new(), ManualClock::new());
        assert_eq!(rendered(|out| super::cart(out, &cart)), "Cart is empty\n");
    }

    #[test]
    fn test_cart_with_promo_and_pending_removal() {
        let catalog = Catalog::demo();
        let mut cart = CartManager::new(MemoryStore::new(), ManualClock::new());
        cart.add_product(&catalog, ProductId::new(1), 1);
        cart.add_product(&catalog, ProductId::new(4), 2);
        cart.apply_promo("TECH20").unwrap();
        cart.request_removal(ProductId::new(4));

        let text = rendered(|out| super::cart(out, &cart));
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 6);
        assert!(lines[0].starts_with("[1] "));
        assert!(!lines[0].contains("removing"));
        assert!(lines[1].ends_with("(removing, undo available)"));
        assert_eq!(lines[2], "Items: 3");
        assert_eq!(lines[3], "Subtotal: 184\u{a0}970\u{a0}₽");
        assert_eq!(lines[4], "Discount: -36\u{a0}994\u{a0}₽ (TECH20 20%)");
        assert_eq!(lines[5], "Total:    147\u{a0}976\u{a0}₽");
    }

    #[test]
    fn test_product_detail_lists_features() {
        let catalog = Catalog::demo();
        let product = catalog.get(ProductId::new(1)).unwrap();
        let text = rendered(|out| product_detail(out, product));

        assert!(text.starts_with(&format!("{} [1]\n", product.title)));
        assert!(text.contains("Price:    114\u{a0}990\u{a0}₽"));
        assert_eq!(
            text.lines().filter(|l| l.starts_with("  * ")).count(),
            product.features.len()
        );
    }
}
