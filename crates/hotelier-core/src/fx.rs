//! # Exchange Rates
//!
//! Resolves the EUR-based rate for a month and converts aggregates into the
//! display currency.
//!
//! ## Month-End Lookup
//! ```text
//!   month 2024-02  ──►  last_day = 2024-02-29  ──►  fx_rates WHERE rate_date = 2024-02-29
//!                                                       │
//!                               found ◄─────────────────┴──────────► missing
//!                                 │                                     │
//!                  amount × eur_to_usd / eur_to_try          amount × 1 (pass-through)
//! ```
//!
//! There is no nearest-date fallback. A missing row means "no conversion
//! available": amounts stay in EUR and the result carries
//! [`RateStatus::Unavailable`] so a view can label them.
//!
//! Converted values are never rounded here. Rounding is a display concern.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use ts_rs::TS;

use crate::error::StoreResult;
use crate::store::AnalyticsStore;
use crate::types::{DisplayCurrency, FxRate, YearMonth};

// =============================================================================
// Resolver
// =============================================================================

/// The rate published on the last calendar day of `month`, if any.
///
/// ## Example
/// ```text
/// resolve_rate(store, 2024-02)  → looks up 2024-02-29
/// resolve_rate(store, 2023-02)  → looks up 2023-02-28
/// ```
pub async fn resolve_rate<S>(store: &S, month: YearMonth) -> StoreResult<Option<FxRate>>
where
    S: AnalyticsStore + ?Sized,
{
    let rate_date = month.last_day();
    let rate = store.query_fx_rate(rate_date).await?;

    debug!(%month, %rate_date, found = rate.is_some(), "Resolved FX rate");

    Ok(rate)
}

// =============================================================================
// Converter
// =============================================================================

/// Multiplier from EUR into `target`.
///
/// `Eur` is always 1. Other currencies use the matching field of `rate`, or
/// 1 when no rate is available.
pub fn multiplier(target: DisplayCurrency, rate: Option<&FxRate>) -> Decimal {
    match (target, rate) {
        (DisplayCurrency::Eur, _) => Decimal::ONE,
        (DisplayCurrency::Usd, Some(rate)) => rate.eur_to_usd,
        (DisplayCurrency::Try, Some(rate)) => rate.eur_to_try,
        (_, None) => Decimal::ONE,
    }
}

/// Converts an EUR amount into `target`. Unrounded.
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
/// use hotelier_core::fx::convert;
/// use hotelier_core::types::{DisplayCurrency, FxRate};
///
/// let rate = FxRate {
///     rate_date: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
///     eur_to_usd: Decimal::new(108, 2),  // 1.08
///     eur_to_try: Decimal::new(3300, 2), // 33.00
/// };
/// let revenue = Decimal::new(100, 0);
///
/// assert_eq!(convert(revenue, DisplayCurrency::Usd, Some(&rate)), Decimal::new(108, 0));
/// assert_eq!(convert(revenue, DisplayCurrency::Usd, None), revenue);
/// ```
pub fn convert(amount_eur: Decimal, target: DisplayCurrency, rate: Option<&FxRate>) -> Decimal {
    amount_eur * multiplier(target, rate)
}

// =============================================================================
// Applied Rate
// =============================================================================

/// How a converted figure relates to the FX table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RateStatus {
    /// Display currency is EUR; no rate involved.
    NotNeeded,
    /// Converted with the rate dated `rate_date`.
    Applied {
        #[ts(as = "String")]
        rate_date: NaiveDate,
    },
    /// No rate dated `rate_date`; figures are EUR values passed through 1:1.
    Unavailable {
        #[ts(as = "String")]
        rate_date: NaiveDate,
    },
}

impl RateStatus {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, RateStatus::Unavailable { .. })
    }
}

/// The conversion chosen for one month and display currency.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedRate {
    pub currency: DisplayCurrency,
    pub rate: Option<FxRate>,
    pub status: RateStatus,
}

impl AppliedRate {
    /// Resolves the month's rate for `currency`.
    ///
    /// EUR skips the lookup. A missing rate for USD/TRY is logged and
    /// recorded, never returned as an error.
    pub async fn for_month<S>(
        store: &S,
        month: YearMonth,
        currency: DisplayCurrency,
    ) -> StoreResult<Self>
    where
        S: AnalyticsStore + ?Sized,
    {
        if currency == DisplayCurrency::Eur {
            return Ok(AppliedRate {
                currency,
                rate: None,
                status: RateStatus::NotNeeded,
            });
        }

        let rate_date = month.last_day();
        let rate = resolve_rate(store, month).await?;
        let status = match &rate {
            Some(_) => RateStatus::Applied { rate_date },
            None => {
                warn!(
                    %month,
                    %rate_date,
                    currency = currency.code(),
                    "No FX rate for month end, showing EUR values unconverted"
                );
                RateStatus::Unavailable { rate_date }
            }
        };

        Ok(AppliedRate {
            currency,
            rate,
            status,
        })
    }

    /// Converts an EUR amount with this rate.
    pub fn convert(&self, amount_eur: Decimal) -> Decimal {
        convert(amount_eur, self.currency, self.rate.as_ref())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{date, fx_rate, MemoryStore};
    use rust_decimal_macros::dec;

    #[test]
    fn test_eur_is_identity() {
        let rate = fx_rate(date(2024, 1, 31), dec!(1.08), dec!(33.0));
        for amount in [dec!(0), dec!(1234.56), dec!(-10.5)] {
            assert_eq!(convert(amount, DisplayCurrency::Eur, Some(&rate)), amount);
            assert_eq!(convert(amount, DisplayCurrency::Eur, None), amount);
        }
    }

    #[test]
    fn test_convert_uses_matching_field() {
        let rate = fx_rate(date(2024, 1, 31), dec!(1.0825), dec!(33.1234));
        assert_eq!(
            convert(dec!(200), DisplayCurrency::Usd, Some(&rate)),
            dec!(216.5000)
        );
        assert_eq!(
            convert(dec!(200), DisplayCurrency::Try, Some(&rate)),
            dec!(6624.6800)
        );
    }

    #[test]
    fn test_missing_rate_passes_through() {
        assert_eq!(convert(dec!(50000), DisplayCurrency::Usd, None), dec!(50000));
        assert_eq!(convert(dec!(50000), DisplayCurrency::Try, None), dec!(50000));
    }

    #[tokio::test]
    async fn test_resolve_rate_uses_last_day_of_month() {
        let store = MemoryStore::new();
        store.seed_fx_rate(fx_rate(date(2024, 2, 28), dec!(1.01), dec!(30.0)));
        store.seed_fx_rate(fx_rate(date(2024, 2, 29), dec!(1.08), dec!(33.0)));

        let feb = YearMonth::new(2024, 2).unwrap();
        let rate = resolve_rate(&store, feb).await.unwrap().unwrap();
        assert_eq!(rate.rate_date, date(2024, 2, 29));
        assert_eq!(rate.eur_to_usd, dec!(1.08));
    }

    #[tokio::test]
    async fn test_resolve_rate_has_no_nearest_date_fallback() {
        let store = MemoryStore::new();
        store.seed_fx_rate(fx_rate(date(2024, 3, 30), dec!(1.08), dec!(33.0)));

        let march = YearMonth::new(2024, 3).unwrap();
        assert!(resolve_rate(&store, march).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_applied_rate_status() {
        let store = MemoryStore::new();
        store.seed_fx_rate(fx_rate(date(2024, 1, 31), dec!(1.10), dec!(32.0)));
        let jan = YearMonth::new(2024, 1).unwrap();
        let feb = YearMonth::new(2024, 2).unwrap();

        let eur = AppliedRate::for_month(&store, jan, DisplayCurrency::Eur)
            .await
            .unwrap();
        assert_eq!(eur.status, RateStatus::NotNeeded);

        let usd = AppliedRate::for_month(&store, jan, DisplayCurrency::Usd)
            .await
            .unwrap();
        assert_eq!(
            usd.status,
            RateStatus::Applied {
                rate_date: date(2024, 1, 31)
            }
        );
        assert_eq!(usd.convert(dec!(10)), dec!(11.00));

        let missing = AppliedRate::for_month(&store, feb, DisplayCurrency::Try)
            .await
            .unwrap();
        assert!(missing.status.is_unavailable());
        assert_eq!(missing.convert(dec!(10)), dec!(10));
    }
}
