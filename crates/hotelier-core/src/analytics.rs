//! # Analytics Aggregator
//!
//! Turns the pre-computed `monthly_stats` rows (stored in EUR) into the
//! figures of the analytics screens, in the currency the user picked.
//!
//! ```text
//!   monthly_stats(hotel, month) ──┐
//!                                 ├──► convert ──► MonthlyKpis
//!   fx_rates(last day of month) ──┘         │
//!                                           ├──► ProjectedKpis      (placeholder)
//!                                           ├──► trends (all months)
//!                                           └──► ChannelDistribution (placeholder)
//! ```
//!
//! ## Rate Selection
//! Every figure of a request is converted with the rate of the *selected*
//! month, trends included. A missing rate leaves figures in EUR and is
//! reported through [`RateStatus::Unavailable`].
//!
//! ## Placeholders
//! The "future" tab and the channel split are fixed heuristics, not models.
//! Their types carry `placeholder: true` so a view can label them.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use ts_rs::TS;

use crate::config::ForecastConfig;
use crate::error::StoreResult;
use crate::fx::{AppliedRate, RateStatus};
use crate::store::AnalyticsStore;
use crate::types::{DisplayCurrency, MonthlyStats, YearMonth};

/// Share of converted revenue attributed to each channel of the placeholder
/// split. The first entry goes to the month's strongest channel.
pub const CHANNEL_SPLIT: [(&str, u32); 5] = [
    ("", 40),
    ("Direct Booking", 25),
    ("Booking.com", 20),
    ("Expedia", 10),
    ("Others", 5),
];

// =============================================================================
// Result Types
// =============================================================================

/// KPI cards of the current-month tab.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MonthlyKpis {
    #[ts(as = "String")]
    pub month: YearMonth,
    pub currency: DisplayCurrency,
    pub total_bookings: i64,
    #[ts(as = "String")]
    pub total_revenue: Decimal,
    #[ts(as = "String")]
    pub adr: Decimal,
    pub strongest_channel: String,
    pub rate: RateStatus,
}

/// KPI cards of the "future" tab. A fixed uplift over the month, not a
/// forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProjectedKpis {
    /// Always `true`.
    pub placeholder: bool,
    #[ts(as = "String")]
    pub month: YearMonth,
    pub currency: DisplayCurrency,
    pub future_bookings: i64,
    #[ts(as = "String")]
    pub future_revenue: Decimal,
    #[ts(as = "String")]
    pub future_adr: Decimal,
    pub booking_window_days: i64,
    pub rate: RateStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TrendPoint {
    #[ts(as = "String")]
    pub month: YearMonth,
    #[ts(as = "String")]
    pub value: Decimal,
}

/// A chart series, oldest month first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TrendSeries {
    pub currency: Option<DisplayCurrency>,
    pub points: Vec<TrendPoint>,
    pub rate: RateStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ChannelShare {
    pub label: String,
    #[ts(as = "String")]
    pub value: Decimal,
}

/// Revenue by channel for the month. Split by fixed percentages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ChannelDistribution {
    /// Always `true`.
    pub placeholder: bool,
    #[ts(as = "String")]
    pub month: YearMonth,
    pub currency: DisplayCurrency,
    pub shares: Vec<ChannelShare>,
    pub rate: RateStatus,
}

// =============================================================================
// Service
// =============================================================================

/// Read-only analytics over an [`AnalyticsStore`].
pub struct AnalyticsService<S: AnalyticsStore + ?Sized> {
    store: Arc<S>,
    forecast: ForecastConfig,
}

impl<S: AnalyticsStore + ?Sized> Clone for AnalyticsService<S> {
    fn clone(&self) -> Self {
        AnalyticsService {
            store: Arc::clone(&self.store),
            forecast: self.forecast.clone(),
        }
    }
}

impl<S: AnalyticsStore + ?Sized> AnalyticsService<S> {
    pub fn new(store: Arc<S>, forecast: ForecastConfig) -> Self {
        AnalyticsService { store, forecast }
    }

    /// KPIs of `month` in `currency`, or `None` when the month has no stats.
    pub async fn kpis(
        &self,
        hotel_id: &str,
        month: YearMonth,
        currency: DisplayCurrency,
    ) -> StoreResult<Option<MonthlyKpis>> {
        let stats = match self.store.query_monthly_stats(hotel_id, month).await? {
            Some(stats) => stats,
            None => return Ok(None),
        };
        let rate = AppliedRate::for_month(self.store.as_ref(), month, currency).await?;
        Ok(Some(kpis_from(&stats, month, &rate)))
    }

    /// "Future" KPIs: the month's KPIs with the configured uplifts,
    /// rounded to whole units.
    pub async fn projected_kpis(
        &self,
        hotel_id: &str,
        month: YearMonth,
        currency: DisplayCurrency,
    ) -> StoreResult<Option<ProjectedKpis>> {
        let kpis = match self.kpis(hotel_id, month, currency).await? {
            Some(kpis) => kpis,
            None => return Ok(None),
        };

        let future_bookings = uplift(
            Decimal::from(kpis.total_bookings),
            self.forecast.bookings_uplift_pct,
        );

        Ok(Some(ProjectedKpis {
            placeholder: true,
            month,
            currency,
            future_bookings: future_bookings.to_i64().unwrap_or(i64::MAX),
            future_revenue: uplift(kpis.total_revenue, self.forecast.revenue_uplift_pct),
            future_adr: uplift(kpis.adr, self.forecast.adr_uplift_pct),
            booking_window_days: self.forecast.booking_window_days,
            rate: kpis.rate,
        }))
    }

    /// Revenue of every month, converted with `selected_month`'s rate.
    pub async fn revenue_trend(
        &self,
        hotel_id: &str,
        selected_month: YearMonth,
        currency: DisplayCurrency,
    ) -> StoreResult<TrendSeries> {
        self.converted_trend(hotel_id, selected_month, currency, |s| s.total_revenue_eur)
            .await
    }

    /// ADR of every month, converted with `selected_month`'s rate.
    pub async fn adr_trend(
        &self,
        hotel_id: &str,
        selected_month: YearMonth,
        currency: DisplayCurrency,
    ) -> StoreResult<TrendSeries> {
        self.converted_trend(hotel_id, selected_month, currency, |s| s.adr_eur)
            .await
    }

    /// Bookings of every month. Counts are never converted.
    pub async fn bookings_trend(&self, hotel_id: &str) -> StoreResult<TrendSeries> {
        let stats = self.store.list_monthly_stats(hotel_id).await?;
        Ok(TrendSeries {
            currency: None,
            points: stats
                .iter()
                .map(|s| TrendPoint {
                    month: s.month(),
                    value: Decimal::from(s.total_bookings),
                })
                .collect(),
            rate: RateStatus::NotNeeded,
        })
    }

    /// Placeholder revenue split of `month` by channel.
    ///
    /// The strongest channel gets 40 %; when it is also one of the fixed
    /// labels, the two shares are merged into one entry.
    pub async fn channel_distribution(
        &self,
        hotel_id: &str,
        month: YearMonth,
        currency: DisplayCurrency,
    ) -> StoreResult<Option<ChannelDistribution>> {
        let stats = match self.store.query_monthly_stats(hotel_id, month).await? {
            Some(stats) => stats,
            None => return Ok(None),
        };
        let rate = AppliedRate::for_month(self.store.as_ref(), month, currency).await?;
        let revenue = rate.convert(stats.total_revenue_eur);

        let mut shares: Vec<ChannelShare> = Vec::with_capacity(CHANNEL_SPLIT.len());
        for (label, pct) in CHANNEL_SPLIT {
            let label = if label.is_empty() {
                stats.strongest_channel.as_str()
            } else {
                label
            };
            let value = revenue * Decimal::new(pct as i64, 2);
            match shares.iter_mut().find(|s| s.label == label) {
                Some(existing) => existing.value += value,
                None => shares.push(ChannelShare {
                    label: label.to_string(),
                    value,
                }),
            }
        }

        Ok(Some(ChannelDistribution {
            placeholder: true,
            month,
            currency,
            shares,
            rate: rate.status,
        }))
    }

    /// Months with stats, newest first.
    pub async fn available_months(&self, hotel_id: &str) -> StoreResult<Vec<YearMonth>> {
        let mut months: Vec<YearMonth> = self
            .store
            .list_monthly_stats(hotel_id)
            .await?
            .iter()
            .map(MonthlyStats::month)
            .collect();
        months.sort_unstable_by(|a, b| b.cmp(a));
        months.dedup();
        Ok(months)
    }

    async fn converted_trend<F>(
        &self,
        hotel_id: &str,
        selected_month: YearMonth,
        currency: DisplayCurrency,
        field: F,
    ) -> StoreResult<TrendSeries>
    where
        F: Fn(&MonthlyStats) -> Decimal + Send,
    {
        let stats = self.store.list_monthly_stats(hotel_id).await?;
        let rate = AppliedRate::for_month(self.store.as_ref(), selected_month, currency).await?;

        Ok(TrendSeries {
            currency: Some(currency),
            points: stats
                .iter()
                .map(|s| TrendPoint {
                    month: s.month(),
                    value: rate.convert(field(s)),
                })
                .collect(),
            rate: rate.status,
        })
    }
}

fn kpis_from(stats: &MonthlyStats, month: YearMonth, rate: &AppliedRate) -> MonthlyKpis {
    MonthlyKpis {
        month,
        currency: rate.currency,
        total_bookings: stats.total_bookings,
        total_revenue: rate.convert(stats.total_revenue_eur),
        adr: rate.convert(stats.adr_eur),
        strongest_channel: stats.strongest_channel.clone(),
        rate: rate.status,
    }
}

/// `value × (1 + pct/100)`, rounded half away from zero to a whole unit.
fn uplift(value: Decimal, pct: Decimal) -> Decimal {
    let factor = Decimal::ONE + pct / Decimal::ONE_HUNDRED;
    (value * factor).round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

// =============================================================================
// Unit Tests
// =============================================================================
