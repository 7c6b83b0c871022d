//! Whole-unit prices as issued by the backend.
//!
//! Catalog prices are natural numbers in the store's major currency unit
//! (dollars, not cents). Cart totals are computed in `f64` and only rounded
//! when sent back to the backend.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A catalog price in whole currency units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(u64);

impl Price {
    /// Create a price from whole currency units.
    #[must_use]
    pub const fn new(units: u64) -> Self {
        Self(units)
    }

    /// Whole currency units.
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// The price in cents, as the payment processor expects it.
    #[must_use]
    pub const fn cents(&self) -> u64 {
        self.0.saturating_mul(100)
    }
}

impl From<u64> for Price {
    fn from(units: u64) -> Self {
        Self(units)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.0)
    }
}

/// Format a computed amount (cart total, line total) with two decimals.
#[must_use]
pub fn format_amount(amount: f64) -> String {
    format!("${amount:.2}")
}
