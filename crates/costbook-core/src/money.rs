//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Where Floats Stop
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  QUANTITIES ARE REAL, MONEY IS NOT                                      │
//! │                                                                         │
//! │  A recipe may use 0.35 kg of flour or yield 2.5 batches, so quantities │
//! │  are f64. Costs are always whole cents (i64).                          │
//! │                                                                         │
//! │    qty (f64) × unit cost (cents) ──► Money::scale ──► cents (i64)      │
//! │    total (cents) ÷ output qty (f64) ──► Money::per_unit ──► cents      │
//! │                                                                         │
//! │  Those two functions are the only places a float touches money, and    │
//! │  both round to whole cents before returning.                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use costbook_core::money::Money;
//!
//! let flour_per_kg = Money::from_cents(250); // $2.50
//! let line = flour_per_kg.scale(3.0);        // 3 kg
//! assert_eq!(line.cents(), 750);
//!
//! let per_loaf = line.per_unit(2.0).unwrap();
//! assert_eq!(per_loaf.cents(), 375);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::types::Rate;

// =============================================================================
// Quantity Helpers
// =============================================================================

/// Clamps a quantity to a usable, non-negative value.
///
/// Negative quantities count as zero; NaN and infinities count as zero.
#[inline]
pub fn non_negative_quantity(qty: f64) -> f64 {
    if qty.is_finite() {
        qty.max(0.0)
    } else {
        0.0
    }
}

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents for USD).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative intermediate values (e.g. price - cost)
/// - **Single field tuple struct**: Zero-cost abstraction over i64
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Returns the value, or zero if it is negative.
    #[inline]
    pub const fn non_negative(&self) -> Self {
        if self.0 < 0 {
            Money(0)
        } else {
            *self
        }
    }

    /// Rounds a real-valued amount of cents to whole cents.
    ///
    /// Rounds half away from zero (`2.5 → 3`, `-2.5 → -3`). Non-finite
    /// input yields `0`; values beyond the `i64` range saturate.
    ///
    /// ## Example
    /// ```rust
    /// use costbook_core::money::Money;
    ///
    /// assert_eq!(Money::round_cents(2.5), 3);
    /// assert_eq!(Money::round_cents(2.4999), 2);
    /// assert_eq!(Money::round_cents(f64::NAN), 0);
    /// ```
    #[inline]
    pub fn round_cents(value: f64) -> i64 {
        if value.is_finite() {
            value.round() as i64
        } else {
            0
        }
    }

    /// Multiplies a unit cost by a real quantity and rounds to whole cents.
    ///
    /// ## User Workflow
    /// ```text
    /// BOM line: 0.35 kg flour @ $2.50/kg
    ///      │
    ///      ▼
    /// scale(0.35) ← THIS FUNCTION
    ///      │
    ///      ▼
    /// Line cost: 87.5 → 88 cents
    /// ```
    #[inline]
    pub fn scale(&self, qty: f64) -> Money {
        Money(Self::round_cents(qty * self.0 as f64))
    }

    /// Divides a batch amount by its output quantity.
    ///
    /// Returns `None` when `output_qty` is zero, negative, or not finite:
    /// the cost per unit is undefined, which is different from a cost of 0.
    ///
    /// ## Example
    /// ```rust
    /// use costbook_core::money::Money;
    ///
    /// let batch = Money::from_cents(1000);
    /// assert_eq!(batch.per_unit(3.0), Some(Money::from_cents(333)));
    /// assert_eq!(batch.per_unit(0.0), None);
    /// ```
    #[inline]
    pub fn per_unit(&self, output_qty: f64) -> Option<Money> {
        if output_qty.is_finite() && output_qty > 0.0 {
            Some(Money(Self::round_cents(self.0 as f64 / output_qty)))
        } else {
            None
        }
    }

    /// Applies a basis-point rate and returns the rate's share of this amount.
    ///
    /// ## Implementation
    /// Integer math: `(amount * bps + 5000) / 10000`. The +5000 rounds
    /// half up; `i128` keeps large amounts from overflowing.
    ///
    /// ## Example
    /// ```rust
    /// use costbook_core::money::Money;
    /// use costbook_core::types::Rate;
    ///
    /// let cost = Money::from_cents(1000);
    /// assert_eq!(cost.apply_rate(Rate::from_bps(825)).cents(), 83);
    /// ```
    pub fn apply_rate(&self, rate: Rate) -> Money {
        let share = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_cents(share.clamp(i64::MIN as i128, i64::MAX as i128) as i64)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// The renderer formats currency for the user's locale; this is for the
/// CLI report and logs.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

// Arithmetic saturates at the i64 bounds; a total never wraps.

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "$10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "$5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-$5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "$0.00");
    }

    #[test]
    fn test_round_cents_half_away_from_zero() {
        assert_eq!(Money::round_cents(0.5), 1);
        assert_eq!(Money::round_cents(1.5), 2);
        assert_eq!(Money::round_cents(2.5), 3);
        assert_eq!(Money::round_cents(-2.5), -3);
        assert_eq!(Money::round_cents(87.49), 87);
    }

    #[test]
    fn test_round_cents_non_finite() {
        assert_eq!(Money::round_cents(f64::NAN), 0);
        assert_eq!(Money::round_cents(f64::INFINITY), 0);
        assert_eq!(Money::round_cents(f64::NEG_INFINITY), 0);
    }

    #[test]
    fn test_scale_fractional_quantity() {
        let per_kg = Money::from_cents(250);
        assert_eq!(per_kg.scale(3.0).cents(), 750);
        assert_eq!(per_kg.scale(0.35).cents(), 88); // 87.5 → 88
        assert_eq!(per_kg.scale(0.0).cents(), 0);
    }

    #[test]
    fn test_per_unit() {
        let batch = Money::from_cents(750);
        assert_eq!(batch.per_unit(2.0), Some(Money::from_cents(375)));
        assert_eq!(batch.per_unit(0.0), None);
        assert_eq!(batch.per_unit(-4.0), None);
        assert_eq!(batch.per_unit(f64::NAN), None);
        assert_eq!(batch.per_unit(f64::INFINITY), None);
    }

    #[test]
    fn test_per_unit_zero_total_is_defined() {
        assert_eq!(Money::zero().per_unit(5.0), Some(Money::zero()));
    }

    #[test]
    fn test_apply_rate() {
        let cost = Money::from_cents(1000);
        assert_eq!(cost.apply_rate(Rate::from_bps(1000)).cents(), 100);
        assert_eq!(cost.apply_rate(Rate::from_bps(825)).cents(), 83);
        assert_eq!(cost.apply_rate(Rate::zero()).cents(), 0);
    }

    #[test]
    fn test_non_negative_quantity() {
        assert_eq!(non_negative_quantity(2.5), 2.5);
        assert_eq!(non_negative_quantity(-1.0), 0.0);
        assert_eq!(non_negative_quantity(f64::NAN), 0.0);
        assert_eq!(non_negative_quantity(f64::INFINITY), 0.0);
    }

    #[test]
    fn test_arithmetic_and_sum() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((a * 3).cents(), 3000);

        let total: Money = vec![a, b, Money::from_cents(1)].into_iter().sum();
        assert_eq!(total.cents(), 1501);
    }

    #[test]
    fn test_arithmetic_saturates() {
        let max = Money::from_cents(i64::MAX);
        let one = Money::from_cents(1);

        assert_eq!(max + one, max);
        let mut acc = max;
        acc += max;
        assert_eq!(acc, max);
        assert_eq!(Money::from_cents(i64::MIN) - one, Money::from_cents(i64::MIN));
        assert_eq!((max * 2).cents(), i64::MAX);

        let total: Money = vec![max, max, one].into_iter().sum();
        assert_eq!(total, max);
    }

    #[test]
    fn test_non_negative() {
        assert_eq!(Money::from_cents(-5).non_negative(), Money::zero());
        assert_eq!(Money::from_cents(5).non_negative().cents(), 5);
    }
}
