//! # Money Module
//!
//! `Money` is an amount in cents. Prices, line totals, tax and order totals
//! are all carried as whole cents so that sums are exact.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Cart: 3 × $0.10 lipstick samples                                       │
//! │                                                                         │
//! │  f64:    0.1 + 0.1 + 0.1 = 0.30000000000000004  → tax drifts           │
//! │  cents:  10 + 10 + 10    = 30                    → tax is exact        │
//! │                                                                         │
//! │  The only rounding in the system happens in two places:                │
//! │    • calculate_tax()          subtotal × rate, half-up to the cent     │
//! │    • discounted_by_percent()  deal price, half-up to the cent          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use gebeya_core::money::Money;
//! use gebeya_core::types::TaxRate;
//!
//! let subtotal = Money::from_cents(2500); // $25.00
//! let tax = subtotal.calculate_tax(TaxRate::from_bps(1000));
//! assert_eq!(tax.cents(), 250);
//! assert_eq!((subtotal + tax).to_string(), "$27.50");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;
use ts_rs::TS;

use crate::types::TaxRate;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in cents.
///
/// Signed so that intermediate arithmetic can represent differences, but the
/// storefront never persists a negative price or total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ## Example
    /// ```rust
    /// use gebeya_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole-dollar part.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the cents part (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Calculates tax on this amount, rounding half-up to the cent.
    ///
    /// ## Implementation
    /// `(cents × bps + 5000) / 10000` in `i128`, so a subtotal anywhere in
    /// the `i64` range cannot overflow the intermediate product.
    ///
    /// ## Example
    /// ```rust
    /// use gebeya_core::money::Money;
    /// use gebeya_core::types::TaxRate;
    ///
    /// // $0.05 × 10% = $0.005 → $0.01
    /// let tax = Money::from_cents(5).calculate_tax(TaxRate::from_bps(1000));
    /// assert_eq!(tax.cents(), 1);
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        let tax_cents = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_cents(tax_cents as i64)
    }

    /// Multiplies a unit price by a quantity.
    ///
    /// Returns `None` on overflow.
    #[inline]
    pub fn checked_mul_quantity(&self, qty: i64) -> Option<Self> {
        self.0.checked_mul(qty).map(Money)
    }

    /// Adds two amounts, returning `None` on overflow.
    #[inline]
    pub fn checked_add(&self, other: Money) -> Option<Self> {
        self.0.checked_add(other.0).map(Money)
    }

    /// Returns the price after taking `percent` off, rounded half-up to the cent.
    ///
    /// This is the deal price: `original × (100 − percent) / 100`.
    ///
    /// ## Example
    /// ```rust
    /// use gebeya_core::money::Money;
    ///
    /// let original = Money::from_cents(4999); // $49.99
    /// // 49.99 × 0.75 = 37.4925 → 37.49
    /// assert_eq!(original.discounted_by_percent(25).cents(), 3749);
    /// ```
    pub fn discounted_by_percent(&self, percent: u8) -> Money {
        let keep = 100 - i128::from(percent.min(100));
        let cents = (self.0 as i128 * keep + 50) / 100;
        Money::from_cents(cents as i64)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows money as `$12.34`. The SPA formats prices itself; this is for logs.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, self.dollars().abs(), self.cents_part())
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
