//! # Money Module
//!
//! `Money` for monetary values and `CommissionRate` for referral commission
//! math.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer đồng                                             │
//! │  VND has no fractional unit in practice, so every amount in the         │
//! │  system is a whole number of đồng stored as i64. Commission is          │
//! │  computed with integer basis-point math, never floats.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use shop_core::money::{calculate_commission, CommissionRate, Money};
//!
//! let total = Money::from_dong(500_000);
//! let shipping = Money::from_dong(30_000);
//! let rate = CommissionRate::from_fraction(0.1);
//!
//! let commission = calculate_commission(total, shipping, rate);
//! assert_eq!(commission.dong(), 47_000);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in whole Vietnamese đồng.
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative intermediate values (revenue after
///   shipping can go below zero; callers clamp where the rules demand it)
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from whole đồng.
    #[inline]
    pub const fn from_dong(dong: i64) -> Self {
        Money(dong)
    }

    /// Returns the value in whole đồng.
    #[inline]
    pub const fn dong(&self) -> i64 {
        self.0
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

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Clamps negative values to zero.
    ///
    /// Used wherever a business rule says "never negative": commission on
    /// orders whose shipping exceeds the total, remaining stock reporting.
    #[inline]
    pub const fn clamp_zero(&self) -> Self {
        if self.0 < 0 {
            Money(0)
        } else {
            *self
        }
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use shop_core::money::Money;
    ///
    /// let flash_price = Money::from_dong(99_000);
    /// let total = flash_price.multiply_quantity(3);
    /// assert_eq!(total.dong(), 297_000);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Applies a commission rate, rounding half away from zero.
    ///
    /// ## Implementation
    /// Integer math: `(amount * bps + 5000) / 10000`. The +5000 provides
    /// rounding (5000/10000 = 0.5). i128 intermediate prevents overflow on
    /// large amounts.
    pub fn commission(&self, rate: CommissionRate) -> Money {
        let commission = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_dong(commission as i64)
    }
}

/// Display implementation shows đồng with dot grouping, e.g. `1.234.567₫`.
///
/// ## Note
/// This is for logs and debugging. UI formatting happens elsewhere.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let digits = self.0.abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        let offset = digits.len() % 3;
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (i + 3 - offset) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(c);
        }
        write!(f, "{}{}₫", sign, grouped)
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Commission Rate
// =============================================================================

/// Commission rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000. 1000 bps = 10%. The database stores the
/// rate as a fraction 0..1 (REAL); converting to bps at the boundary keeps
/// all arithmetic in integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionRate(u32);

impl CommissionRate {
    /// Creates a commission rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        CommissionRate(bps)
    }

    /// Creates a commission rate from a fraction in 0..=1.
    ///
    /// Fractions outside the range are clamped; the validation layer rejects
    /// them before they reach here.
    pub fn from_fraction(fraction: f64) -> Self {
        let clamped = fraction.clamp(0.0, 1.0);
        CommissionRate((clamped * 10_000.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a fraction (for persistence and display).
    #[inline]
    pub fn fraction(&self) -> f64 {
        self.0 as f64 / 10_000.0
    }

    /// Zero commission rate.
    #[inline]
    pub const fn zero() -> Self {
        CommissionRate(0)
    }
}

impl Default for CommissionRate {
    fn default() -> Self {
        CommissionRate::zero()
    }
}

// =============================================================================
// Commission Calculation
// =============================================================================

/// Computes the referral commission for an order.
///
/// ## Rules
/// - Revenue base = total − shipping (shipping is excluded from commission)
/// - commission = round(revenue × rate)
/// - Clamped to ≥ 0: shipping exceeding the total yields zero commission,
///   never a negative number
///
/// ## Example
/// ```rust
/// use shop_core::money::{calculate_commission, CommissionRate, Money};
///
/// let commission = calculate_commission(
///     Money::from_dong(500_000),
///     Money::from_dong(30_000),
///     CommissionRate::from_fraction(0.1),
/// );
/// assert_eq!(commission.dong(), 47_000);
/// ```
pub fn calculate_commission(total: Money, shipping: Money, rate: CommissionRate) -> Money {
    let revenue = (total - shipping).clamp_zero();
    revenue.commission(rate)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_dong() {
        let money = Money::from_dong(99_000);
        assert_eq!(money.dong(), 99_000);
    }

    #[test]
    fn test_display_grouping() {
        assert_eq!(format!("{}", Money::from_dong(1_234_567)), "1.234.567₫");
        assert_eq!(format!("{}", Money::from_dong(500)), "500₫");
        assert_eq!(format!("{}", Money::from_dong(0)), "0₫");
        assert_eq!(format!("{}", Money::from_dong(-30_000)), "-30.000₫");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_dong(100_000);
        let b = Money::from_dong(30_000);

        assert_eq!((a + b).dong(), 130_000);
        assert_eq!((a - b).dong(), 70_000);
        assert_eq!((a * 3).dong(), 300_000);
    }

    #[test]
    fn test_commission_rate_from_fraction() {
        assert_eq!(CommissionRate::from_fraction(0.1).bps(), 1000);
        assert_eq!(CommissionRate::from_fraction(0.075).bps(), 750);
        assert_eq!(CommissionRate::from_fraction(1.0).bps(), 10_000);
        // Out-of-range fractions clamp
        assert_eq!(CommissionRate::from_fraction(1.5).bps(), 10_000);
        assert_eq!(CommissionRate::from_fraction(-0.2).bps(), 0);
    }

    #[test]
    fn test_commission_referred_order_example() {
        // total 500000, shipping 30000, rate 0.1 → round(470000 * 0.1) = 47000
        let commission = calculate_commission(
            Money::from_dong(500_000),
            Money::from_dong(30_000),
            CommissionRate::from_fraction(0.1),
        );
        assert_eq!(commission.dong(), 47_000);
    }

    #[test]
    fn test_commission_rounds() {
        // 333 * 0.15 = 49.95 → 50
        let commission = calculate_commission(
            Money::from_dong(333),
            Money::zero(),
            CommissionRate::from_fraction(0.15),
        );
        assert_eq!(commission.dong(), 50);
    }

    #[test]
    fn test_commission_never_negative() {
        // shipping >= total yields zero for every rate
        for bps in [0u32, 500, 1000, 10_000] {
            let commission = calculate_commission(
                Money::from_dong(30_000),
                Money::from_dong(50_000),
                CommissionRate::from_bps(bps),
            );
            assert_eq!(commission.dong(), 0);
        }
    }

    #[test]
    fn test_commission_formula_matches_rounding() {
        // For T > S, commission == round((T - S) * R)
        let cases = [(500_000i64, 30_000i64, 1000u32), (120_001, 1, 333), (999, 0, 9999)];
        for (t, s, bps) in cases {
            let expected = ((t - s) as f64 * (bps as f64 / 10_000.0)).round() as i64;
            let got = calculate_commission(
                Money::from_dong(t),
                Money::from_dong(s),
                CommissionRate::from_bps(bps),
            );
            assert_eq!(got.dong(), expected, "T={} S={} bps={}", t, s, bps);
        }
    }

    #[test]
    fn test_clamp_zero() {
        assert_eq!(Money::from_dong(-5).clamp_zero().dong(), 0);
        assert_eq!(Money::from_dong(5).clamp_zero().dong(), 5);
    }
}
