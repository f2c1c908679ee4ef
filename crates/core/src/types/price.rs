//! Type-safe price representation using decimal arithmetic.
//!
//! The storefront trades in a single currency (Pakistani rupees), so a
//! price is a decimal amount with no currency tag. The backend exchanges
//! prices as bare JSON numbers, which is why the inner decimal opts into
//! `rust_decimal::serde::float` instead of the default string form.

use rust_decimal::Decimal;
use rust_decimal::RoundingStrategy;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// A rupee amount.
///
/// Wraps [`Decimal`] so money never mixes with plain numbers, and so
/// totals are exact (no binary-float drift across repeated cart
/// recomputation).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Price(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl Price {
    /// Create a price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from a whole number of rupees.
    #[must_use]
    pub fn rupees(amount: i64) -> Self {
        Self(Decimal::from(amount))
    }

    /// The zero price.
    #[must_use]
    pub const fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    /// Get the underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Whether this price is exactly zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Multiply a unit price by a quantity, yielding a line total.
    #[must_use]
    pub fn times(&self, count: u32) -> Self {
        Self(self.0 * Decimal::from(count))
    }

    /// Percentage saved against a base price, rounded half-away-from-zero
    /// the way a shopper expects.
    ///
    /// Returns `None` when the base is zero or nothing is saved, so
    /// callers can suppress the badge entirely.
    #[must_use]
    pub fn percent_off(base: Self, effective: Self) -> Option<u32> {
        if base.0.is_zero() {
            return None;
        }
        let percent = ((base.0 - effective.0) / base.0 * Decimal::from(100))
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        match percent.to_u32() {
            Some(p) if p > 0 => Some(p),
            _ => None,
        }
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Rs {}", self.0)
    }
}

impl std::ops::Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl std::ops::AddAssign for Price {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl std::ops::Sub for Price {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl std::iter::Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), |acc, p| acc + p)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_times_and_sum() {
        let a = Price::rupees(100).times(2);
        let b = Price::rupees(50);
        assert_eq!(a + b, Price::rupees(250));

        let total: Price = [a, b].into_iter().sum();
        assert_eq!(total, Price::rupees(250));
    }

    #[test]
    fn test_serde_as_json_number() {
        let p = Price::rupees(600);
        assert_eq!(serde_json::to_string(&p).unwrap(), "600.0");

        let back: Price = serde_json::from_str("600").unwrap();
        assert_eq!(back, p);

        let fractional: Price = serde_json::from_str("99.5").unwrap();
        assert_eq!(fractional.to_string(), "Rs 99.5");
    }

    #[test]
    fn test_percent_off() {
        assert_eq!(
            Price::percent_off(Price::rupees(1000), Price::rupees(600)),
            Some(40)
        );
        // Rounds half away from zero: 1/3 off 150 is 33.33..%
        assert_eq!(
            Price::percent_off(Price::rupees(150), Price::rupees(100)),
            Some(33)
        );
        // No saving, no badge
        assert_eq!(
            Price::percent_off(Price::rupees(100), Price::rupees(100)),
            None
        );
        // Price increase is not a discount
        assert_eq!(
            Price::percent_off(Price::rupees(100), Price::rupees(120)),
            None
        );
        // Zero base would divide by zero
        assert_eq!(Price::percent_off(Price::zero(), Price::rupees(10)), None);
    }
}
