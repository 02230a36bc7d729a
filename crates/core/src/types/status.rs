//! Enums for catalog categories and checkout payment methods.

use serde::{Deserialize, Serialize};

/// Product category used for catalog filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Laptop,
    Phone,
    Tablet,
    Accessory,
}

impl Category {
    /// All categories in storefront filter order.
    pub const ALL: [Self; 4] = [Self::Laptop, Self::Phone, Self::Tablet, Self::Accessory];

    /// The string form used in snapshots and filter controls.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Laptop => "laptop",
            Self::Phone => "phone",
            Self::Tablet => "tablet",
            Self::Accessory => "accessory",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "laptop" => Ok(Self::Laptop),
            "phone" => Ok(Self::Phone),
            "tablet" => Ok(Self::Tablet),
            "accessory" => Ok(Self::Accessory),
            _ => Err(format!("invalid category: {s}")),
        }
    }
}

/// Payment method chosen on the (simulated) payment step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Bank card.
    Card,
    /// Faster Payments System transfer.
    Sbp,
    /// Cash on delivery.
    Cash,
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Card => write!(f, "card"),
            Self::Sbp => write!(f, "sbp"),
            Self::Cash => write!(f, "cash"),
        }
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "card" => Ok(Self::Card),
            "sbp" => Ok(Self::Sbp),
            "cash" => Ok(Self::Cash),
            _ => Err(format!("invalid payment method: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_category_roundtrips_through_str() {
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>().unwrap(), category);
        }
        assert!("Laptop".parse::<Category>().is_err());
    }

    #[test]
    fn test_category_serde_is_snake_case() {
        let json = serde_json::to_string(&Category::Accessory).unwrap();
        assert_eq!(json, "\"accessory\"");
    }

    #[test]
    fn test_payment_method_from_str() {
        assert_eq!("sbp".parse::<PaymentMethod>().unwrap(), PaymentMethod::Sbp);
        assert_eq!(PaymentMethod::Cash.to_string(), "cash");
        assert!("bitcoin".parse::<PaymentMethod>().is_err());
    }
}
