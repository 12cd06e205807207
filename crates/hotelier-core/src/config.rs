//! # Booking Configuration
//!
//! Tunables of the reservation flow and the analytics screens.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`HOTELIER_*`)
//! 2. Defaults (this file)
//!
//! Configuration is read-only after startup; services take it by value.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::warn;

use crate::{DEFAULT_CONFIRMATION_ATTEMPTS, DEFAULT_CONFIRMATION_PREFIX, DEFAULT_CURRENCY};

/// Reservation flow configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingConfig {
    /// How many confirmation numbers are tried before giving up.
    pub confirmation_max_attempts: u32,

    /// Leading segment of every confirmation number ("RES").
    pub confirmation_prefix: String,

    /// Currency of new reservations when the form leaves it empty.
    pub default_currency: String,

    pub forecast: ForecastConfig,
}

/// Uplifts of the "future" analytics tab.
///
/// These are a fixed heuristic, not a model. Every value produced from them
/// is returned inside [`crate::analytics::ProjectedKpis`], which is marked as
/// a placeholder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastConfig {
    /// Percent added to bookings (15 → +15 %).
    pub bookings_uplift_pct: Decimal,
    pub revenue_uplift_pct: Decimal,
    pub adr_uplift_pct: Decimal,
    /// Average days between booking and arrival.
    pub booking_window_days: i64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        ForecastConfig {
            bookings_uplift_pct: Decimal::new(15, 0),
            revenue_uplift_pct: Decimal::new(8, 0),
            adr_uplift_pct: Decimal::new(5, 0),
            booking_window_days: 45,
        }
    }
}

impl Default for BookingConfig {
    fn default() -> Self {
        BookingConfig {
            confirmation_max_attempts: DEFAULT_CONFIRMATION_ATTEMPTS,
            confirmation_prefix: DEFAULT_CONFIRMATION_PREFIX.to_string(),
            default_currency: DEFAULT_CURRENCY.to_string(),
            forecast: ForecastConfig::default(),
        }
    }
}

impl BookingConfig {
    /// Defaults overridden by environment variables.
    ///
    /// ## Environment Variables
    /// - `HOTELIER_CONFIRMATION_MAX_ATTEMPTS`: e.g. "8"
    /// - `HOTELIER_CONFIRMATION_PREFIX`: e.g. "BKG"
    /// - `HOTELIER_DEFAULT_CURRENCY`: e.g. "TRY"
    /// - `HOTELIER_FORECAST_BOOKINGS_UPLIFT`, `HOTELIER_FORECAST_REVENUE_UPLIFT`,
    ///   `HOTELIER_FORECAST_ADR_UPLIFT`: percent, e.g. "12.5"
    /// - `HOTELIER_FORECAST_WINDOW_DAYS`: e.g. "30"
    ///
    /// Unparseable values are logged and ignored.
    pub fn from_env() -> Self {
        BookingConfig::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`BookingConfig::from_env`] with an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = BookingConfig::default();

        if let Some(attempts) = parsed::<u32, _>(&lookup, "HOTELIER_CONFIRMATION_MAX_ATTEMPTS") {
            config.confirmation_max_attempts = attempts.max(1);
        }

        if let Some(prefix) = lookup("HOTELIER_CONFIRMATION_PREFIX") {
            let prefix = prefix.trim().to_ascii_uppercase();
            if !prefix.is_empty() {
                config.confirmation_prefix = prefix;
            }
        }

        if let Some(currency) = lookup("HOTELIER_DEFAULT_CURRENCY") {
            config.default_currency = currency.trim().to_ascii_uppercase();
        }

        if let Some(pct) = parsed(&lookup, "HOTELIER_FORECAST_BOOKINGS_UPLIFT") {
            config.forecast.bookings_uplift_pct = pct;
        }
        if let Some(pct) = parsed(&lookup, "HOTELIER_FORECAST_REVENUE_UPLIFT") {
            config.forecast.revenue_uplift_pct = pct;
        }
        if let Some(pct) = parsed(&lookup, "HOTELIER_FORECAST_ADR_UPLIFT") {
            config.forecast.adr_uplift_pct = pct;
        }
        if let Some(days) = parsed(&lookup, "HOTELIER_FORECAST_WINDOW_DAYS") {
            config.forecast.booking_window_days = days;
        }

        config
    }
}

fn parsed<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "Ignoring unparseable configuration value");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = BookingConfig::default();
        assert_eq!(config.confirmation_max_attempts, 5);
        assert_eq!(config.confirmation_prefix, "RES");
        assert_eq!(config.default_currency, "EUR");
        assert_eq!(config.forecast.bookings_uplift_pct, dec!(15));
        assert_eq!(config.forecast.revenue_uplift_pct, dec!(8));
        assert_eq!(config.forecast.adr_uplift_pct, dec!(5));
        assert_eq!(config.forecast.booking_window_days, 45);
    }

    #[test]
    fn test_overrides() {
        let config = BookingConfig::from_lookup(lookup_from(&[
            ("HOTELIER_CONFIRMATION_MAX_ATTEMPTS", "8"),
            ("HOTELIER_CONFIRMATION_PREFIX", "bkg"),
            ("HOTELIER_DEFAULT_CURRENCY", "try"),
            ("HOTELIER_FORECAST_REVENUE_UPLIFT", "12.5"),
            ("HOTELIER_FORECAST_WINDOW_DAYS", "30"),
        ]));
        assert_eq!(config.confirmation_max_attempts, 8);
        assert_eq!(config.confirmation_prefix, "BKG");
        assert_eq!(config.default_currency, "TRY");
        assert_eq!(config.forecast.revenue_uplift_pct, dec!(12.5));
        assert_eq!(config.forecast.bookings_uplift_pct, dec!(15));
        assert_eq!(config.forecast.booking_window_days, 30);
    }

    #[test]
    fn test_garbage_is_ignored() {
        let config = BookingConfig::from_lookup(lookup_from(&[
            ("HOTELIER_CONFIRMATION_MAX_ATTEMPTS", "many"),
            ("HOTELIER_FORECAST_ADR_UPLIFT", "five"),
        ]));
        assert_eq!(config, BookingConfig::default());
    }

    #[test]
    fn test_zero_attempts_is_clamped() {
        let config =
            BookingConfig::from_lookup(lookup_from(&[("HOTELIER_CONFIRMATION_MAX_ATTEMPTS", "0")]));
        assert_eq!(config.confirmation_max_attempts, 1);
    }
}
