//! # Money Module
//!
//! Provides the `Money` type for folio amounts: room rates, stay totals,
//! collected amounts and channel commissions.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌                                  │
//! │                                                                         │
//! │  A 3-night stay at 89.90 computed in floats can drift by a cent,       │
//! │  and the guest's folio then never balances to zero.                    │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    8990 cents × 3 nights = 26970 cents, exactly                        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Monthly analytics are the exception: they are multiplied by fractional FX
//! rates and must stay unrounded, so they use `rust_decimal::Decimal`
//! (see [`crate::fx`]).
//!
//! ## Usage
//! ```rust
//! use hotelier_core::money::Money;
//!
//! let nightly = Money::from_cents(8990); // 89.90
//! let stay = nightly.for_nights(3);      // 269.70
//! assert_eq!(stay.cents(), 26970);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};
use ts_rs::TS;

use crate::types::CommissionRate;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest unit of the reservation currency.
///
/// ## Design Decisions
/// - **i64 (signed)**: a folio balance can go negative when a guest over-pays
/// - **No currency field**: the currency lives on the reservation; Money is
///   only ever combined with amounts of the same reservation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use hotelier_core::money::Money;
    ///
    /// let rate = Money::from_cents(12000); // 120.00
    /// assert_eq!(rate.cents(), 12000);
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

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Price of a stay of `nights` nights at this nightly rate.
    ///
    /// ## Example
    /// ```rust
    /// use hotelier_core::money::Money;
    ///
    /// let nightly = Money::from_cents(10000);
    /// assert_eq!(nightly.for_nights(4).cents(), 40000);
    /// ```
    #[inline]
    pub const fn for_nights(&self, nights: i64) -> Self {
        Money(self.0 * nights)
    }

    /// Applies a basis-point rate, rounding half away from zero to the cent.
    ///
    /// Used for channel commissions.
    ///
    /// ## Example
    /// ```rust
    /// use hotelier_core::money::Money;
    /// use hotelier_core::types::CommissionRate;
    ///
    /// let total = Money::from_cents(26970);          // 269.70
    /// let fee = total.apply_rate(CommissionRate::from_bps(1500)); // 15%
    /// assert_eq!(fee.cents(), 4046);                 // 40.455 → 40.46
    /// ```
    pub fn apply_rate(&self, rate: CommissionRate) -> Money {
        // i128 keeps large folios from overflowing
        let scaled = self.0 as i128 * rate.bps() as i128;
        let rounded = if scaled >= 0 {
            (scaled + 5000) / 10000
        } else {
            (scaled - 5000) / 10000
        };
        Money::from_cents(rounded as i64)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Plain `major.minor` rendering; the currency code is shown by the view.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let cents = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, cents / 100, cents % 100)
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

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
