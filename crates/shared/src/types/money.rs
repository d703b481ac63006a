//! Integer credit amounts.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Card balances are whole credits; every operation on them is checked.

use serde::{Deserialize, Serialize};

/// An amount of meal card credits in the smallest currency unit.
///
/// Balances are never negative, but signed deltas are, so the inner
/// representation is `i64`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Credits(i64);

impl Credits {
    /// Zero credits.
    pub const ZERO: Self = Self(0);

    /// Creates an amount from raw units.
    #[must_use]
    pub const fn new(units: i64) -> Self {
        Self(units)
    }

    /// Returns the raw units.
    #[must_use]
    pub const fn units(self) -> i64 {
        self.0
    }

    /// Returns true if the amount is zero.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Returns true if the amount is strictly positive.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Returns true if the amount is negative.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Adds a signed delta, returning `None` on overflow.
    #[must_use]
    pub const fn checked_add(self, delta: Self) -> Option<Self> {
        match self.0.checked_add(delta.0) {
            Some(units) => Some(Self(units)),
            None => None,
        }
    }

    /// Negates the amount, returning `None` on overflow.
    #[must_use]
    pub const fn checked_neg(self) -> Option<Self> {
        match self.0.checked_neg() {
            Some(units) => Some(Self(units)),
            None => None,
        }
    }

    /// Absolute value, saturating at `i64::MAX`.
    #[must_use]
    pub const fn saturating_abs(self) -> Self {
        Self(self.0.saturating_abs())
    }
}

impl From<i64> for Credits {
    fn from(units: i64) -> Self {
        Self(units)
    }
}

impl From<Credits> for i64 {
    fn from(credits: Credits) -> Self {
        credits.0
    }
}

impl std::iter::Sum for Credits {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        Self(iter.map(|c| c.0).fold(0_i64, i64::saturating_add))
    }
}

impl std::fmt::Display for Credits {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_credits_zero() {
        assert!(Credits::ZERO.is_zero());
        assert!(!Credits::ZERO.is_positive());
        assert!(!Credits::ZERO.is_negative());
    }

    #[rstest]
    #[case(100, 50, Some(150))]
    #[case(100, -100, Some(0))]
    #[case(100, -150, Some(-50))]
    #[case(i64::MAX, 1, None)]
    fn test_checked_add(#[case] base: i64, #[case] delta: i64, #[case] expected: Option<i64>) {
        let result = Credits::new(base).checked_add(Credits::new(delta));
        assert_eq!(result.map(Credits::units), expected);
    }

    #[test]
    fn test_checked_neg_overflow() {
        assert_eq!(Credits::new(i64::MIN).checked_neg(), None);
        assert_eq!(Credits::new(150).checked_neg(), Some(Credits::new(-150)));
    }

    #[test]
    fn test_sum() {
        let total: Credits = [100, -30, 50].into_iter().map(Credits::new).sum();
        assert_eq!(total, Credits::new(120));
    }

    #[test]
    fn test_serde_transparent() {
        let json = serde_json::to_string(&Credits::new(42)).unwrap();
        assert_eq!(json, "42");
        let parsed: Credits = serde_json::from_str("-7").unwrap();
        assert_eq!(parsed, Credits::new(-7));
    }
}
