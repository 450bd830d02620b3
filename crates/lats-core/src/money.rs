//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Smallest-Unit Integers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Browser POS code:                                                      │
//! │    subtotal * 0.16 = 1439.9999999999998  ❌                             │
//! │                                                                         │
//! │  Here: integer amounts in the smallest currency unit                    │
//! │    TZS has no minor unit, so 10 000 TZS is Money(10_000)               │
//! │    A 2-decimal currency stores 10.99 as Money(1099)                    │
//! │                                                                         │
//! │  Percentages are basis points: 1600 bps = 16%                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use lats_core::money::Money;
//!
//! let price = Money::from_minor(2500);
//! let line = price.multiply_quantity(3);
//! assert_eq!(line.minor(), 7500);
//! assert_eq!((line - price).minor(), 5000);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::types::TaxRate;

/// Basis points in 100%.
const BPS_SCALE: i128 = 10_000;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit.
///
/// ## Where Money Flows
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Variant.selling_price ──► CartLineItem.unit_price ──► total_price      │
/// │                                                                         │
/// │  Σ total_price ──► subtotal ──► − discount ──► + VAT ──► total          │
/// │                                                                         │
/// │  total ──► SaleRequest ──► sale-processing collaborator                 │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[serde(transparent)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from the smallest currency unit.
    #[inline]
    pub const fn from_minor(amount: i64) -> Self {
        Money(amount)
    }

    /// Returns the value in the smallest currency unit.
    #[inline]
    pub const fn minor(&self) -> i64 {
        self.0
    }

    /// Zero.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Parses a decimal amount typed by the operator into the smallest unit.
    ///
    /// `decimals` is the number of minor digits of the currency (0 for TZS,
    /// 2 for USD). Returns `None` for empty, malformed, or over-precise input.
    ///
    /// ## Example
    /// ```rust
    /// use lats_core::money::Money;
    ///
    /// assert_eq!(Money::parse_decimal("1500", 0), Some(Money::from_minor(1500)));
    /// assert_eq!(Money::parse_decimal("12.5", 2), Some(Money::from_minor(1250)));
    /// assert_eq!(Money::parse_decimal("-3", 0), Some(Money::from_minor(-3)));
    /// assert_eq!(Money::parse_decimal("1.234", 2), None);
    /// assert_eq!(Money::parse_decimal("abc", 0), None);
    /// ```
    pub fn parse_decimal(input: &str, decimals: u8) -> Option<Money> {
        let input = input.trim();
        let (negative, digits) = match input.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, input),
        };

        let (whole, frac) = match digits.split_once('.') {
            Some((whole, frac)) => (whole, frac),
            None => (digits, ""),
        };

        if whole.is_empty() && frac.is_empty() {
            return None;
        }
        if frac.len() > decimals as usize {
            return None;
        }
        if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit())
        {
            return None;
        }

        let scale = 10_i64.checked_pow(u32::from(decimals))?;
        let whole_value: i64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
        let frac_value: i64 = if frac.is_empty() {
            0
        } else {
            // "5" with 2 decimals means 50 minor units
            let padded = format!("{:0<width$}", frac, width = decimals as usize);
            padded.parse().ok()?
        };

        let amount = whole_value.checked_mul(scale)?.checked_add(frac_value)?;
        Some(Money(if negative { -amount } else { amount }))
    }

    /// Returns `bps` basis points of this amount, rounded half-up.
    ///
    /// ## Implementation
    /// `(amount * bps + 5000) / 10000` in i128, saturating at the i64 bounds.
    ///
    /// ## Example
    /// ```rust
    /// use lats_core::money::Money;
    ///
    /// let subtotal = Money::from_minor(100_000);
    /// assert_eq!(subtotal.percentage(1000).minor(), 10_000); // 10%
    /// assert_eq!(subtotal.percentage(15_000).minor(), 150_000); // 150%, not capped here
    /// ```
    pub fn percentage(&self, bps: u32) -> Money {
        let scaled = (self.0 as i128 * bps as i128 + BPS_SCALE / 2) / BPS_SCALE;
        Money(i64::try_from(scaled).unwrap_or(if scaled < 0 { i64::MIN } else { i64::MAX }))
    }

    /// Calculates tax on this amount at the given rate.
    ///
    /// ## Example
    /// ```rust
    /// use lats_core::money::Money;
    /// use lats_core::types::TaxRate;
    ///
    /// let net = Money::from_minor(9000);
    /// assert_eq!(net.calculate_tax(TaxRate::from_bps(1600)).minor(), 1440);
    /// ```
    #[inline]
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        self.percentage(rate.bps())
    }

    /// Multiplies a unit price by a quantity, saturating on overflow.
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// Restricts the amount to `[min, max]`.
    ///
    /// ## Example
    /// ```rust
    /// use lats_core::money::Money;
    ///
    /// let ceiling = Money::from_minor(50_000);
    /// let clamped = Money::from_minor(80_000).clamp_to(Money::zero(), ceiling);
    /// assert_eq!(clamped, ceiling);
    /// ```
    #[inline]
    pub fn clamp_to(self, min: Money, max: Money) -> Money {
        if self < min {
            min
        } else if self > max {
            max
        } else {
            self
        }
    }

    /// Returns `self / whole` as a percentage for display. Zero when `whole` is zero.
    pub fn ratio_percent(&self, whole: Money) -> f64 {
        if whole.is_zero() {
            return 0.0;
        }
        self.0 as f64 / whole.0 as f64 * 100.0
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Debug display of the raw smallest-unit amount.
///
/// Currency symbols and grouping belong to `PosConfig::format_currency`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
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
