//! Cart totals with promo-code discount.

use redshop_core::Price;
use serde::Serialize;

use crate::manager::LineItem;
use crate::promo::PromoCode;

/// Subtotal, discount and amount due.
///
/// `total == subtotal - discount` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CartTotals {
    pub subtotal: Price,
    pub discount: Price,
    pub total: Price,
}

impl CartTotals {
    /// Totals for a list of line items with an optional promo applied.
    ///
    /// Amounts saturate at [`Price::MAX`] rather than overflow, and a
    /// discount is capped at 100%, so the total is never negative.
    #[must_use]
    pub fn compute(items: &[LineItem], promo: Option<&PromoCode>) -> Self {
        let subtotal: Price = items.iter().map(LineItem::line_total).sum();
        let discount = promo.map_or(Price::ZERO, |p| {
            subtotal.percent(p.discount_percent.min(100))
        });

        Self {
            subtotal,
            discount,
            total: subtotal - discount,
        }
    }
}

#[cfg(test)]
mod tests {
    use redshop_core::{Category, ProductId};

    use super::*;
    use crate::promo::PromoBook;

    fn item(id: i32, price: i64, quantity: u32) -> LineItem {
        LineItem {
            product_id: ProductId::new(id),
            title: format!("Product {id}"),
            unit_price: Price::from_whole(price),
            quantity,
            image: String::new(),
            category: Category::Accessory,
        }
    }

    #[test]
    fn test_empty_cart_is_all_zero() {
        assert_eq!(CartTotals::compute(&[], None), CartTotals::default());
    }

    #[test]
    fn test_no_promo_means_no_discount() {
        let totals = CartTotals::compute(&[item(1, 34_990, 2), item(2, 45_990, 1)], None);
        assert_eq!(totals.subtotal, Price::from_whole(115_970));
        assert_eq!(totals.discount, Price::ZERO);
        assert_eq!(totals.total, totals.subtotal);
    }

    #[test]
    fn test_tech20_on_100990() {
        let promo = PromoBook::default().find("TECH20");
        let totals = CartTotals::compute(&[item(1, 64_990, 1), item(2, 36_000, 1)], promo.as_ref());

        assert_eq!(totals.subtotal, Price::from_whole(100_990));
        assert_eq!(totals.discount, Price::from_whole(20_198));
        assert_eq!(totals.total, Price::from_whole(80_792));
        assert_eq!(totals.total, totals.subtotal - totals.discount);
    }

    #[test]
    fn test_overflowing_lines_saturate() {
        let mut huge = item(1, 1, 4_000_000_000);
        huge.unit_price = Price::MAX;
        let totals = CartTotals::compute(&[huge, item(2, 10, 1)], None);

        assert_eq!(totals.subtotal, Price::MAX);
        assert_eq!(totals.total, Price::MAX);
    }

    #[test]
    fn test_discount_above_100_percent_is_capped() {
        let promo = PromoCode {
            code: "OVER",
            discount_percent: 150,
            description: "misconfigured",
        };
        let totals = CartTotals::compute(&[item(1, 1_000, 2)], Some(&promo));

        assert_eq!(totals.discount, Price::from_whole(2_000));
        assert_eq!(totals.total, Price::ZERO);
    }
}
