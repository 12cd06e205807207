//! # hotelier-db: Database Layer for the Hotelier Dashboard
//!
//! SQLite storage for hotels, rooms, guests, reservations, FX rates and
//! monthly statistics, exposed to hotelier-core through [`SqliteStore`].
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Hotelier Data Flow                                 │
//! │                                                                         │
//! │  ReservationService / AnalyticsService (hotelier-core)                 │
//! │       │  ReservationStore + AnalyticsStore traits                       │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   hotelier-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ HotelRepo     │    │ 001_initial  │  │   │
//! │  │   │ SqlitePool    │◄───│ RoomRepo      │    │ 002_guards   │  │   │
//! │  │   │ SqliteStore   │    │ GuestRepo     │    │              │  │   │
//! │  │   │               │    │ ReservationRepo│   │              │  │   │
//! │  │   │               │    │ AnalyticsRepo │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (HOTELIER_DB_PATH)                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//! - [`store`] - Storage-trait implementation for hotelier-core
//!
//! ## Usage
//!
//! ```rust,ignore
//! use hotelier_core::{BookingConfig, ReservationService};
//! use hotelier_db::{Database, DbConfig};
//! use std::sync::Arc;
//!
//! let db = Database::new(DbConfig::from_env()).await?;
//! let bookings = ReservationService::new(Arc::new(db.store()), BookingConfig::from_env());
//! let board = bookings.room_board("hotel-id", chrono::Utc::now().date_naive()).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod store;

#[cfg(test)]
mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use store::SqliteStore;

// Repository re-exports for convenience
pub use repository::analytics::AnalyticsRepository;
pub use repository::guest::GuestRepository;
pub use repository::hotel::HotelRepository;
pub use repository::reservation::ReservationRepository;
pub use repository::room::RoomRepository;
