//! # hotelier-core: Reservation & Room-State Logic
//!
//! Booking rules of the hotel dashboard. Everything here talks to storage
//! through the traits in [`store`]; no SQL, no network, no file system.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Hotelier Dashboard Architecture                     │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Dashboard views                              │   │
//! │  │   Reservation form ─ Room board ─ Analytics tabs ─ Currency     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ hotelier-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────────┐ ┌─────────────┐ ┌────────────┐ ┌──────────┐  │   │
//! │  │   │   booking   │ │ projection  │ │ analytics  │ │    fx    │  │   │
//! │  │   │ Reservation │ │ RoomProj-   │ │ Analytics  │ │ resolve  │  │   │
//! │  │   │ Service     │ │ ection      │ │ Service    │ │ convert  │  │   │
//! │  │   └──────┬──────┘ └─────────────┘ └─────┬──────┘ └──────────┘  │   │
//! │  │          │ availability · confirmation   │                      │   │
//! │  │          ▼                               ▼                      │   │
//! │  │   ReservationStore                 AnalyticsStore   (traits)    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 hotelier-db (Database Layer)                    │   │
//! │  │        SQLite schema + guards, repositories, SqliteStore        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Room, Guest, Reservation, MonthlyStats, ...)
//! - [`money`] - Integer-cent money for folio amounts
//! - [`error`] - Booking, validation and storage error types
//! - [`validation`] - Reservation form rules
//! - [`store`] - Storage traits consumed by the services
//! - [`availability`] - Half-open overlap check for a room
//! - [`confirmation`] - Unique confirmation numbers
//! - [`booking`] - Guest + reservation orchestration, status changes
//! - [`projection`] - Room board status derived from reservations
//! - [`fx`] - Month-end exchange rates and conversion
//! - [`analytics`] - KPIs, trends and placeholder forecasts
//! - [`cache`] - Caching decorator for a reservation store
//! - [`config`] - Environment-driven configuration
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::NaiveDate;
//! use hotelier_core::availability::ranges_overlap;
//! use hotelier_core::money::Money;
//!
//! // A stay ending on the 5th never conflicts with one starting on the 5th
//! let d = |day| NaiveDate::from_ymd_opt(2024, 2, day).unwrap();
//! assert!(!ranges_overlap(d(1), d(5), d(5), d(8)));
//!
//! // Three nights at 89.90
//! assert_eq!(Money::from_cents(8990).for_nights(3).to_string(), "269.70");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod analytics;
pub mod availability;
pub mod booking;
pub mod cache;
pub mod config;
pub mod confirmation;
pub mod error;
pub mod fx;
pub mod money;
pub mod projection;
pub mod store;
pub mod types;
pub mod validation;

#[cfg(test)]
mod testing;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use analytics::AnalyticsService;
pub use booking::{GuestInput, ReservationInput, ReservationService};
pub use cache::CachingReservationStore;
pub use config::BookingConfig;
pub use error::{
    BookingError, BookingResult, StorageError, StorageErrorKind, StoreResult, UserError,
    ValidationError,
};
pub use money::Money;
pub use projection::RoomProjection;
pub use store::{AnalyticsStore, ReservationFilter, ReservationStore};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Longest accepted first or last name.
pub const MAX_NAME_LENGTH: usize = 100;

/// Currency of reservations when the form leaves it empty.
pub const DEFAULT_CURRENCY: &str = "EUR";

/// Leading segment of confirmation numbers.
pub const DEFAULT_CONFIRMATION_PREFIX: &str = "RES";

/// Confirmation numbers tried before a booking gives up.
pub const DEFAULT_CONFIRMATION_ATTEMPTS: u32 = 5;
