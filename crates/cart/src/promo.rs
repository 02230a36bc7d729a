//! Promo codes known to the store.

use serde::Serialize;

/// A percentage discount that can be applied to the cart subtotal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PromoCode {
    /// Code as typed by the shopper. Matched exactly, case-sensitive.
    pub code: &'static str,
    /// Discount in percent, 0 to 100.
    pub discount_percent: u8,
    pub description: &'static str,
}

/// Codes available in the storefront.
pub const BUILTIN_PROMO_CODES: &[PromoCode] = &[
    PromoCode {
        code: "REDSHOP10",
        discount_percent: 10,
        description: "10% off everything",
    },
    PromoCode {
        code: "TECH20",
        discount_percent: 20,
        description: "20% off electronics",
    },
    PromoCode {
        code: "NEWYEAR2025",
        discount_percent: 15,
        description: "15% off holiday shopping",
    },
];

/// Read-only lookup over a fixed list of promo codes.
#[derive(Debug, Clone, Copy)]
pub struct PromoBook {
    codes: &'static [PromoCode],
}

impl PromoBook {
    /// A book over the given codes.
    ///
    /// Discounts above 100% are not rejected here; callers own the list.
    #[must_use]
    pub const fn new(codes: &'static [PromoCode]) -> Self {
        Self { codes }
    }

    /// Find a code by exact match. No trimming, no case folding.
    #[must_use]
    pub fn find(&self, code: &str) -> Option<PromoCode> {
        self.codes.iter().find(|p| p.code == code).copied()
    }

    /// All codes in the book.
    #[must_use]
    pub const fn codes(&self) -> &'static [PromoCode] {
        self.codes
    }
}

impl Default for PromoBook {
    fn default() -> Self {
        Self::new(BUILTIN_PROMO_CODES)
    }
}
