//! Type-safe price representation using decimal arithmetic.
//!
//! The store trades in a single currency (Russian roubles), so a price is a
//! bare decimal amount. Amounts serialize as JSON numbers so snapshots stay
//! readable by anything that wrote plain numeric prices.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, Sub};

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Currency sign appended to formatted prices.
const CURRENCY_SIGN: char = '₽';

/// Separator used between digit groups and before the currency sign.
const GROUP_SEPARATOR: char = '\u{a0}';

/// A price in roubles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl Price {
    /// A zero price.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// The largest representable price. Arithmetic saturates here.
    pub const MAX: Self = Self(Decimal::MAX);

    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from a whole number of roubles.
    #[must_use]
    pub fn from_whole(amount: i64) -> Self {
        Self(Decimal::from(amount))
    }

    /// The decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Whether the amount is below zero.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Price of `quantity` units at this unit price, saturating at
    /// [`Self::MAX`].
    #[must_use]
    pub fn times(&self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(Decimal::from(quantity)))
    }

    /// The given percentage of this price (e.g. `percent(20)` of 100 is 20).
    #[must_use]
    pub fn percent(&self, percent: u8) -> Self {
        Self((self.0 / Decimal::ONE_HUNDRED).saturating_mul(Decimal::from(percent)))
    }

    /// Format for display the way the storefront shows prices (e.g. `114 990 ₽`).
    ///
    /// Rounds to whole roubles, half away from zero, and groups thousands.
    #[must_use]
    pub fn display(&self) -> String {
        let rounded = self
            .0
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .normalize();
        let digits = rounded.abs().to_string();

        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 4);
        if rounded.is_sign_negative() && !rounded.is_zero() {
            grouped.push('-');
        }
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(GROUP_SEPARATOR);
            }
            grouped.push(c);
        }
        grouped.push(GROUP_SEPARATOR);
        grouped.push(CURRENCY_SIGN);
        grouped
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sub for Price {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_groups_thousands() {
        assert_eq!(Price::from_whole(114_990).display(), "114\u{a0}990\u{a0}₽");
        assert_eq!(Price::from_whole(1_000_000).display(), "1\u{a0}000\u{a0}000\u{a0}₽");
        assert_eq!(Price::from_whole(999).display(), "999\u{a0}₽");
        assert_eq!(Price::ZERO.display(), "0\u{a0}₽");
    }

    #[test]
    fn test_display_rounds_to_whole_roubles() {
        assert_eq!(Price::new(Decimal::new(20_198_5, 1)).display(), "20\u{a0}199\u{a0}₽");
        assert_eq!(Price::new(Decimal::new(20_198_4, 1)).display(), "20\u{a0}198\u{a0}₽");
    }

    #[test]
    fn test_percent() {
        let subtotal = Price::from_whole(100_990);
        assert_eq!(subtotal.percent(20), Price::from_whole(20_198));
        assert_eq!(subtotal.percent(0), Price::ZERO);
        assert_eq!(subtotal.percent(100), subtotal);
    }

    #[test]
    fn test_times_and_sum() {
        let total: Price = [Price::from_whole(34_990).times(2), Price::from_whole(45_990).times(1)]
            .into_iter()
            .sum();
        assert_eq!(total, Price::from_whole(115_970));
    }

    #[test]
    fn test_arithmetic_saturates_instead_of_overflowing() {
        let huge = Price::new(Decimal::from_i128_with_scale(100_000_000_000_000_000_000, 0));
        assert_eq!(huge.times(4_000_000_000), Price::MAX);
        assert_eq!(Price::MAX + Price::from_whole(1), Price::MAX);
        assert_eq!([Price::MAX, Price::MAX].into_iter().sum::<Price>(), Price::MAX);

        let discount = Price::MAX.percent(100);
        assert!(Price::MAX - discount < Price::from_whole(100));
        assert!(Price::MAX.percent(20) < Price::MAX);
        assert!(!Price::MAX.display().is_empty());
    }

    #[test]
    fn test_serializes_as_number() {
        let json = serde_json::to_string(&Price::from_whole(99_990)).unwrap();
        assert_eq!(json, "99990.0");

        let parsed: Price = serde_json::from_str("99990").unwrap();
        assert_eq!(parsed, Price::from_whole(99_990));
    }
}
