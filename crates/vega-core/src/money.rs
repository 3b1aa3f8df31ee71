//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    Every price, discount, payment, and change amount in the system      │
//! │    is an i64 count of the smallest currency unit. The database, the     │
//! │    cart math, and the commit protocol all use cents; only display       │
//! │    code converts to major units.                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

use crate::error::ValidationError;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit.
///
/// ## Design Decisions
/// - **i64 (signed)**: a mis-entered discount can drive a total negative,
///   and the commit validation wants to see that raw value
/// - **Single field tuple struct**: zero-cost abstraction over i64
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
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
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies money by a quantity (line total = unit price × quantity).
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Floors the value at zero. Used for display totals only; the commit
    /// protocol always checks the raw signed value.
    #[inline]
    pub const fn clamp_display(&self) -> Self {
        if self.0 < 0 {
            Money(0)
        } else {
            Money(self.0)
        }
    }

    /// Parses operator input like `"12.50"`, `"7"`, or `"0.99"` into cents.
    ///
    /// ## Rules
    /// - At most one decimal point, at most two fractional digits
    /// - No sign: operator-entered discounts and payments are non-negative
    /// - Empty input parses as zero (an untouched payment field)
    pub fn parse(field: &str, input: &str) -> Result<Money, ValidationError> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(Money::zero());
        }

        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: reason.to_string(),
        };

        let (major_part, minor_part) = match input.split_once('.') {
            Some((major, minor)) => (major, minor),
            None => (input, ""),
        };

        if major_part.is_empty() && minor_part.is_empty() {
            return Err(invalid("no digits"));
        }
        if minor_part.len() > 2 {
            return Err(invalid("more than two decimal places"));
        }
        if !major_part.chars().all(|c| c.is_ascii_digit())
            || !minor_part.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid("expected digits and an optional decimal point"));
        }

        let major: i64 = if major_part.is_empty() {
            0
        } else {
            major_part.parse().map_err(|_| invalid("amount too large"))?
        };
        // "12.5" means 12.50, so pad the fraction to two digits
        let minor: i64 = match minor_part.len() {
            0 => 0,
            1 => minor_part.parse::<i64>().unwrap_or(0) * 10,
            _ => minor_part.parse::<i64>().unwrap_or(0),
        };

        let cents = major
            .checked_mul(100)
            .and_then(|c| c.checked_add(minor))
            .ok_or_else(|| invalid("amount too large"))?;
        Ok(Money::from_cents(cents))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor())
    }
}

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
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.major(), 10);
        assert_eq!(money.minor(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((a * 3).cents(), 3000);
        assert_eq!(a.multiply_quantity(4).cents(), 4000);
    }

    #[test]
    fn test_clamp_display() {
        assert_eq!(Money::from_cents(-250).clamp_display().cents(), 0);
        assert_eq!(Money::from_cents(250).clamp_display().cents(), 250);
    }

    #[test]
    fn test_parse_whole_and_fractional() {
        assert_eq!(Money::parse("payment", "12.50").unwrap().cents(), 1250);
        assert_eq!(Money::parse("payment", "7").unwrap().cents(), 700);
        assert_eq!(Money::parse("payment", "0.99").unwrap().cents(), 99);
        assert_eq!(Money::parse("payment", ".5").unwrap().cents(), 50);
        assert_eq!(Money::parse("payment", "12.5").unwrap().cents(), 1250);
    }

    #[test]
    fn test_parse_empty_is_zero() {
        // An untouched payment field reads as zero, matching register behavior
        assert_eq!(Money::parse("payment", "").unwrap().cents(), 0);
        assert_eq!(Money::parse("payment", "  ").unwrap().cents(), 0);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Money::parse("payment", "abc").is_err());
        assert!(Money::parse("payment", "1.234").is_err());
        assert!(Money::parse("payment", "-5").is_err());
        assert!(Money::parse("payment", "1.2.3").is_err());
        assert!(Money::parse("payment", ".").is_err());
    }

    #[test]
    fn test_parse_rejects_overflowing_amount() {
        // Fits in i64 as major units but not as cents.
        assert!(Money::parse("payment", "999999999999999999").is_err());
        // Well past i64 entirely.
        assert!(Money::parse("payment", "99999999999999999999").is_err());
        // Largest representable amount still parses.
        assert_eq!(
            Money::parse("payment", "92233720368547758.07").unwrap().cents(),
            i64::MAX
        );
    }
}
