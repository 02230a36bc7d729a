//! Promo code text as typed by a shopper.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`PromoInput`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PromoInputError {
    /// The input is empty after trimming.
    #[error("promo code cannot be empty")]
    Empty,
    /// The input is too long.
    #[error("promo code must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
}

/// A promo code entered in the promo field.
///
/// Surrounding whitespace is trimmed; nothing else is normalized. Matching
/// against known codes stays case-sensitive.
///
/// ## Examples
///
/// ```
/// use redshop_core::PromoInput;
///
/// assert_eq!(PromoInput::parse("  TECH20 ").unwrap().as_str(), "TECH20");
/// assert!(PromoInput::parse("   ").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct PromoInput(String);

impl PromoInput {
    /// Maximum length of a promo code, in characters.
    pub const MAX_LENGTH: usize = 32;

    /// Parse a `PromoInput` from raw field text.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input is empty or longer than
    /// [`Self::MAX_LENGTH`] characters.
    pub fn parse(s: &str) -> Result<Self, PromoInputError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(PromoInputError::Empty);
        }
        if trimmed.chars().count() > Self::MAX_LENGTH {
            return Err(PromoInputError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PromoInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PromoInput {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl core::str::FromStr for PromoInput {
    type Err = PromoInputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims() {
        let input = PromoInput::parse("\tREDSHOP10\n").unwrap();
        assert_eq!(input.as_str(), "REDSHOP10");
    }

    #[test]
    fn test_parse_keeps_case() {
        assert_eq!(PromoInput::parse("tech20").unwrap().as_str(), "tech20");
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(PromoInput::parse(""), Err(PromoInputError::Empty));
        assert_eq!(PromoInput::parse("  "), Err(PromoInputError::Empty));
    }

    #[test]
    fn test_parse_too_long() {
        let long = "A".repeat(33);
        assert!(matches!(
            PromoInput::parse(&long),
            Err(PromoInputError::TooLong { max: 32 })
        ));
    }
}
