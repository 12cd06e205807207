//! # Analytics Repository
//!
//! Exchange rates and pre-computed monthly statistics.
//!
//! Decimal columns are stored as TEXT and parsed back with
//! [`Decimal::from_str`]; a value that fails to parse surfaces as
//! [`DbError::InvalidData`] instead of a silent zero.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::SqlitePool;
use std::str::FromStr;
use tracing::debug;

use crate::error::{DbError, DbResult};
use hotelier_core::{FxRate, MonthlyStats, YearMonth};

#[derive(Debug, sqlx::FromRow)]
struct FxRateRow {
    rate_date: NaiveDate,
    eur_to_usd: String,
    eur_to_try: String,
}

impl TryFrom<FxRateRow> for FxRate {
    type Error = DbError;

    fn try_from(row: FxRateRow) -> Result<Self, Self::Error> {
        Ok(FxRate {
            rate_date: row.rate_date,
            eur_to_usd: parse_decimal("fx_rates.eur_to_usd", &row.eur_to_usd)?,
            eur_to_try: parse_decimal("fx_rates.eur_to_try", &row.eur_to_try)?,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct MonthlyStatsRow {
    id: String,
    hotel_id: String,
    month_start: NaiveDate,
    total_bookings: i64,
    total_revenue_eur: String,
    adr_eur: String,
    strongest_channel: String,
}

impl TryFrom<MonthlyStatsRow> for MonthlyStats {
    type Error = DbError;

    fn try_from(row: MonthlyStatsRow) -> Result<Self, Self::Error> {
        Ok(MonthlyStats {
            total_revenue_eur: parse_decimal("monthly_stats.total_revenue_eur", &row.total_revenue_eur)?,
            adr_eur: parse_decimal("monthly_stats.adr_eur", &row.adr_eur)?,
            id: row.id,
            hotel_id: row.hotel_id,
            month_start: row.month_start,
            total_bookings: row.total_bookings,
            strongest_channel: row.strongest_channel,
        })
    }
}

fn parse_decimal(field: &str, raw: &str) -> DbResult<Decimal> {
    Decimal::from_str(raw.trim()).map_err(|_| DbError::invalid_data(field, raw))
}

const STATS_COLUMNS: &str =
    "id, hotel_id, month_start, total_bookings, total_revenue_eur, adr_eur, strongest_channel";

#[derive(Debug, Clone)]
pub struct AnalyticsRepository {
    pool: SqlitePool,
}

impl AnalyticsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        AnalyticsRepository { pool }
    }

    // -------------------------------------------------------------------------
    // FX rates
    // -------------------------------------------------------------------------

    /// Inserts or replaces the rates published on `rate.rate_date`.
    pub async fn upsert_fx_rate(&self, rate: &FxRate) -> DbResult<()> {
        debug!(rate_date = %rate.rate_date, "Upserting FX rate");

        sqlx::query(
            r#"
            INSERT INTO fx_rates (rate_date, eur_to_usd, eur_to_try)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(rate_date) DO UPDATE SET
                eur_to_usd = excluded.eur_to_usd,
                eur_to_try = excluded.eur_to_try
            "#,
        )
        .bind(rate.rate_date)
        .bind(rate.eur_to_usd.to_string())
        .bind(rate.eur_to_try.to_string())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// The record dated exactly `date`. No nearest-date fallback.
    pub async fn get_fx_rate(&self, date: NaiveDate) -> DbResult<Option<FxRate>> {
        let row = sqlx::query_as::<_, FxRateRow>(
            "SELECT rate_date, eur_to_usd, eur_to_try FROM fx_rates WHERE rate_date = ?1",
        )
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;

        row.map(FxRate::try_from).transpose()
    }

    // -------------------------------------------------------------------------
    // Monthly stats
    // -------------------------------------------------------------------------

    /// Inserts or replaces the aggregate of `(hotel_id, month_start)`.
    pub async fn upsert_monthly_stats(&self, stats: &MonthlyStats) -> DbResult<()> {
        debug!(hotel_id = %stats.hotel_id, month = %stats.month(), "Upserting monthly stats");

        sqlx::query(
            r#"
            INSERT INTO monthly_stats (
                id, hotel_id, month_start, total_bookings,
                total_revenue_eur, adr_eur, strongest_channel
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(hotel_id, month_start) DO UPDATE SET
                total_bookings = excluded.total_bookings,
                total_revenue_eur = excluded.total_revenue_eur,
                adr_eur = excluded.adr_eur,
                strongest_channel = excluded.strongest_channel
            "#,
        )
        .bind(&stats.id)
        .bind(&stats.hotel_id)
        .bind(stats.month_start)
        .bind(stats.total_bookings)
        .bind(stats.total_revenue_eur.to_string())
        .bind(stats.adr_eur.to_string())
        .bind(&stats.strongest_channel)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_monthly_stats(
        &self,
        hotel_id: &str,
        month: YearMonth,
    ) -> DbResult<Option<MonthlyStats>> {
        let row = sqlx::query_as::<_, MonthlyStatsRow>(&format!(
            "SELECT {STATS_COLUMNS} FROM monthly_stats WHERE hotel_id = ?1 AND month_start = ?2"
        ))
        .bind(hotel_id)
        .bind(month.first_day())
        .fetch_optional(&self.pool)
        .await?;

        row.map(MonthlyStats::try_from).transpose()
    }

    /// Every month of the hotel, oldest first.
    pub async fn list_monthly_stats(&self, hotel_id: &str) -> DbResult<Vec<MonthlyStats>> {
        let rows = sqlx::query_as::<_, MonthlyStatsRow>(&format!(
            "SELECT {STATS_COLUMNS} FROM monthly_stats WHERE hotel_id = ?1 ORDER BY month_start"
        ))
        .bind(hotel_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(MonthlyStats::try_from).collect()
    }
}
