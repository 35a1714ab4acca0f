//! # Money Module
//!
//! Provides the `Money` type and the rounding primitives every calculator
//! in this crate goes through.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  Repeated VAT computations on floats drift by fractions of a tetri,    │
//! │  and invoices stop adding up.                                          │
//! │                                                                         │
//! │  OUR SOLUTION: Integer minor units + one rounding rule                  │
//! │    1800 bps of 10000 tetri = 1800 tetri, exactly                        │
//! │    Every rate multiplication rounds half-to-even                        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rounding Rules
//! | Helper                   | Rule                | Used by                 |
//! |--------------------------|---------------------|-------------------------|
//! | [`percentage_of`]        | half to even        | tax, decision, strategy |
//! | [`percentage_of_ceil`]   | ceiling             | margin calculator fees  |
//! | [`ratio_bps`]            | half to even, 0 / 0 | every margin percentage |
//! | [`Money::scale`]         | half to even        | market adjustments      |
//!
//! ## Usage
//! ```rust
//! use pricing_core::money::{percentage_of, Money};
//!
//! let price = Money::from_cents(10000); // 100.00 GEL
//! let vat = percentage_of(price, 1800); // 18%
//! assert_eq!(vat.cents(), 1800);
//! ```

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::types::Rate;
use crate::BPS_SCALE;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (tetri for GEL,
/// cents for USD/EUR).
///
/// ## Design Decisions
/// - **i64 (signed)**: Stored inputs are never negative, but computed net
///   profit is, and a negative net profit is how a reject is signalled
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
///
/// ## Where Money Flows
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  supplier cost ─┐                                                       │
/// │  shipping ──────┼──► fees / VAT ──► net profit ──► publish / reject     │
/// │  retail price ──┘                                                       │
/// │                                                                         │
/// │  line items ──► subtotal ──► VAT ──► invoice total ──► ledger mirror    │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units.
    ///
    /// ## Example
    /// ```rust
    /// use pricing_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // 10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor_part(&self) -> i64 {
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

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies money by a quantity (invoice line totals), saturating at
    /// the `i64` bounds.
    ///
    /// ## Example
    /// ```rust
    /// use pricing_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299);
    /// assert_eq!(unit_price.multiply_quantity(3).cents(), 897);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// Applies a rate with Bankers Rounding (round half to even).
    ///
    /// ## Bankers Rounding Explained
    /// ```text
    /// ┌─────────────────────────────────────────────────────────────────────┐
    /// │  BANKERS ROUNDING (Round Half to Even)                              │
    /// │                                                                     │
    /// │  Standard rounding always rounds 0.5 UP, causing systematic bias:  │
    /// │    0.5 → 1, 1.5 → 2, 2.5 → 3, 3.5 → 4 (always up = +bias)         │
    /// │                                                                     │
    /// │  Bankers Rounding rounds 0.5 to nearest EVEN number:               │
    /// │    0.5 → 0, 1.5 → 2, 2.5 → 2, 3.5 → 4 (alternates = no bias)      │
    /// │                                                                     │
    /// │  Repeated VAT computations therefore do not drift                  │
    /// └─────────────────────────────────────────────────────────────────────┘
    /// ```
    ///
    /// ## Example
    /// ```rust
    /// use pricing_core::money::Money;
    /// use pricing_core::types::Rate;
    ///
    /// // 250 × 1% = 2.5 → 2 (even)
    /// assert_eq!(Money::from_cents(250).percentage(Rate::from_bps(100)).cents(), 2);
    /// // 350 × 1% = 3.5 → 4 (even)
    /// assert_eq!(Money::from_cents(350).percentage(Rate::from_bps(100)).cents(), 4);
    /// ```
    #[inline]
    pub fn percentage(&self, rate: Rate) -> Money {
        percentage_of(*self, rate.bps())
    }

    /// Applies a rate and rounds up to the next whole minor unit.
    #[inline]
    pub fn percentage_ceil(&self, rate: Rate) -> Money {
        percentage_of_ceil(*self, rate.bps())
    }

    /// Multiplies by an exact decimal factor, rounding half to even.
    ///
    /// ## Example
    /// ```rust
    /// use pricing_core::money::Money;
    /// use rust_decimal::Decimal;
    ///
    /// let competitor = Money::from_cents(9000);
    /// let cap = competitor.scale(Decimal::new(92, 2)); // 92%
    /// assert_eq!(cap.cents(), 8280);
    /// ```
    pub fn scale(&self, factor: Decimal) -> Money {
        let scaled = Decimal::from(self.0)
            .checked_mul(factor)
            .map(|d| d.round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven));

        match scaled.and_then(|d| d.to_i64()) {
            Some(cents) => Money(cents),
            // Saturate rather than wrap; only reachable with absurd factors.
            None if (self.0 >= 0) == factor.is_sign_positive() => Money(i64::MAX),
            None => Money(i64::MIN),
        }
    }
}

// =============================================================================
// Rounding Primitives
// =============================================================================

/// Integer division rounding half to even.
///
/// `denominator` must not be zero; callers special-case zero before calling.
pub(crate) fn div_round_half_even(numerator: i128, denominator: i128) -> i128 {
    let (n, d) = if denominator < 0 {
        (-numerator, -denominator)
    } else {
        (numerator, denominator)
    };

    let quotient = n.div_euclid(d);
    let remainder = n.rem_euclid(d);

    match (remainder * 2).cmp(&d) {
        Ordering::Less => quotient,
        Ordering::Greater => quotient + 1,
        Ordering::Equal if quotient % 2 == 0 => quotient,
        Ordering::Equal => quotient + 1,
    }
}

/// Integer division rounding towards positive infinity.
pub(crate) fn div_ceil(numerator: i128, denominator: i128) -> i128 {
    let (n, d) = if denominator < 0 {
        (-numerator, -denominator)
    } else {
        (numerator, denominator)
    };

    let quotient = n.div_euclid(d);
    if n.rem_euclid(d) == 0 {
        quotient
    } else {
        quotient + 1
    }
}

/// Clamps an i128 intermediate back into i64 minor units.
pub(crate) fn saturate(value: i128) -> i64 {
    value.clamp(i64::MIN as i128, i64::MAX as i128) as i64
}

/// `round(amount × bps / 10000)`, half to even.
///
/// ## Example
/// ```rust
/// use pricing_core::money::{percentage_of, Money};
///
/// assert_eq!(percentage_of(Money::from_cents(10000), 500).cents(), 500);
/// assert_eq!(percentage_of(Money::from_cents(1000), 825).cents(), 82); // 82.5 → 82
/// ```
pub fn percentage_of(amount: Money, bps: u32) -> Money {
    let product = amount.0 as i128 * bps as i128;
    Money(saturate(div_round_half_even(product, BPS_SCALE as i128)))
}

/// `ceil(amount × bps / 10000)`.
///
/// ## Example
/// ```rust
/// use pricing_core::money::{percentage_of_ceil, Money};
///
/// assert_eq!(percentage_of_ceil(Money::from_cents(1001), 300).cents(), 31); // 30.03 → 31
/// ```
pub fn percentage_of_ceil(amount: Money, bps: u32) -> Money {
    let product = amount.0 as i128 * bps as i128;
    Money(saturate(div_ceil(product, BPS_SCALE as i128)))
}

/// `round(numerator / denominator × 10000)` in basis points.
///
/// A zero denominator yields 0 instead of NaN/Infinity.
///
/// ## Example
/// ```rust
/// use pricing_core::money::{ratio_bps, Money};
///
/// assert_eq!(ratio_bps(Money::from_cents(1800), Money::from_cents(10000)), 1800);
/// assert_eq!(ratio_bps(Money::from_cents(1800), Money::zero()), 0);
/// ```
pub fn ratio_bps(numerator: Money, denominator: Money) -> i64 {
    if denominator.is_zero() {
        return 0;
    }
    let scaled = numerator.0 as i128 * BPS_SCALE as i128;
    saturate(div_round_half_even(scaled, denominator.0 as i128))
}

/// Rounds a float to the nearest integer, half to even.
///
/// Fails fast on NaN/Infinity and on values outside the i64 range.
///
/// ## Example
/// ```rust
/// use pricing_core::money::safe_round;
///
/// assert_eq!(safe_round("x", 2.5).unwrap(), 2);
/// assert_eq!(safe_round("x", 3.5).unwrap(), 4);
/// assert!(safe_round("x", f64::NAN).is_err());
/// ```
pub fn safe_round(field: &str, value: f64) -> CoreResult<i64> {
    if !value.is_finite() {
        return Err(CoreError::NonFinite {
            field: field.to_string(),
            value,
        });
    }

    let rounded = value.round_ties_even();
    // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive.
    if rounded < i64::MIN as f64 || rounded >= i64::MAX as f64 {
        return Err(CoreError::NumericOverflow {
            field: field.to_string(),
            value,
        });
    }

    Ok(rounded as i64)
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows a plain decimal amount without a currency symbol; the
/// currency travels separately (see [`crate::types::Currency`]).
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor_part())
    }
}

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

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(self.0.saturating_neg())
    }
}

/// Multiplication by i64 (quantities).
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        self.multiply_quantity(qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.major(), 10);
        assert_eq!(money.minor_part(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1099).to_string(), "10.99");
        assert_eq!(Money::from_cents(500).to_string(), "5.00");
        assert_eq!(Money::from_cents(-550).to_string(), "-5.50");
        assert_eq!(Money::zero().to_string(), "0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((b - a).cents(), -500);
        assert_eq!((-a).cents(), -1000);
        assert_eq!((a * 3).cents(), 3000);

        let total: Money = [a, b, b].iter().sum();
        assert_eq!(total.cents(), 2000);
    }

    #[test]
    fn test_arithmetic_saturates() {
        let max = Money::from_cents(i64::MAX);

        assert_eq!(max + Money::from_cents(100), max);
        assert_eq!(Money::from_cents(i64::MIN) - Money::from_cents(1), Money::from_cents(i64::MIN));
        assert_eq!(-Money::from_cents(i64::MIN), max);
        assert_eq!(Money::from_cents(10_i64.pow(16)).multiply_quantity(1000), max);

        let mut total = max;
        total += Money::from_cents(1);
        assert_eq!(total, max);

        let sum: Money = [max, max].iter().sum();
        assert_eq!(sum, max);
    }

    #[test]
    fn test_half_even_division() {
        assert_eq!(div_round_half_even(5, 2), 2); // 2.5 → 2
        assert_eq!(div_round_half_even(7, 2), 4); // 3.5 → 4
        assert_eq!(div_round_half_even(-5, 2), -2); // -2.5 → -2
        assert_eq!(div_round_half_even(-7, 2), -4); // -3.5 → -4
        assert_eq!(div_round_half_even(10, 3), 3);
        assert_eq!(div_round_half_even(11, 3), 4);
        assert_eq!(div_round_half_even(5, -2), -2);
    }

    #[test]
    fn test_ceil_division() {
        assert_eq!(div_ceil(10, 5), 2);
        assert_eq!(div_ceil(11, 5), 3);
        assert_eq!(div_ceil(-11, 5), -2);
        assert_eq!(div_ceil(0, 5), 0);
    }

    #[test]
    fn test_percentage_of() {
        assert_eq!(percentage_of(Money::from_cents(10000), 1800).cents(), 1800);
        assert_eq!(percentage_of(Money::from_cents(250), 100).cents(), 2);
        assert_eq!(percentage_of(Money::from_cents(350), 100).cents(), 4);
        assert_eq!(percentage_of(Money::from_cents(10000), 0).cents(), 0);
        assert_eq!(percentage_of_ceil(Money::from_cents(10001), 100).cents(), 101);
        assert_eq!(percentage_of_ceil(Money::from_cents(10000), 100).cents(), 100);
    }

    #[test]
    fn test_percentage_does_not_overflow() {
        let huge = Money::from_cents(i64::MAX / 2);
        let fee = percentage_of(huge, 10000);
        assert_eq!(fee, huge);
    }

    #[test]
    fn test_ratio_bps() {
        assert_eq!(ratio_bps(Money::from_cents(2000), Money::from_cents(10000)), 2000);
        assert_eq!(ratio_bps(Money::from_cents(-500), Money::from_cents(10000)), -500);
        assert_eq!(ratio_bps(Money::from_cents(1), Money::from_cents(3)), 3333);
        assert_eq!(ratio_bps(Money::from_cents(100), Money::zero()), 0);
    }

    #[test]
    fn test_scale() {
        assert_eq!(Money::from_cents(9000).scale(dec!(0.92)).cents(), 8280);
        assert_eq!(Money::from_cents(8280).scale(dec!(1.05)).cents(), 8694);
        assert_eq!(Money::from_cents(5).scale(dec!(0.5)).cents(), 2); // 2.5 → 2
        assert_eq!(Money::from_cents(7).scale(dec!(0.5)).cents(), 4); // 3.5 → 4
    }

    #[test]
    fn test_safe_round() {
        assert_eq!(safe_round("x", 0.5).unwrap(), 0);
        assert_eq!(safe_round("x", 1.5).unwrap(), 2);
        assert_eq!(safe_round("x", -2.5).unwrap(), -2);
        assert!(matches!(
            safe_round("x", f64::NAN),
            Err(CoreError::NonFinite { .. })
        ));
        assert!(matches!(
            safe_round("x", f64::NEG_INFINITY),
            Err(CoreError::NonFinite { .. })
        ));
        assert!(matches!(
            safe_round("x", 1e30),
            Err(CoreError::NumericOverflow { .. })
        ));
    }

    /// Splitting 10.00 three ways loses a minor unit; the engine never hides
    /// that, it surfaces as an explicit 1-unit difference.
    #[test]
    fn test_division_precision_loss_documented() {
        let ten = Money::from_cents(1000);
        let one_third = Money::from_cents(1000 / 3);
        let reconstructed = one_third * 3;
        assert_eq!(reconstructed.cents(), 999);
        assert_eq!((ten - reconstructed).cents(), 1);
    }
}
