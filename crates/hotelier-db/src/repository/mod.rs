//! # Repository Module
//!
//! Database repository implementations for the hotelier schema.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  SqliteStore (storage traits)      seed binary                         │
//! │       │                                 │                               │
//! │       │  db.reservations().query(hotel, &filter)                       │
//! │       ▼                                 ▼                               │
//! │  ReservationRepository                                                 │
//! │  ├── insert(&self, reservation)                                        │
//! │  ├── get_by_id(&self, hotel_id, id)                                    │
//! │  ├── query(&self, hotel_id, filter)                                    │
//! │  └── update_status / update_dates                                      │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every read of hotel-owned rows takes the `hotel_id`; rows of other hotels
//! are never returned.
//!
//! ## Available Repositories
//!
//! - [`hotel::HotelRepository`] - Properties
//! - [`room::RoomRepository`] - Rooms, room types, housekeeping status
//! - [`guest::GuestRepository`] - Guest profiles
//! - [`reservation::ReservationRepository`] - Reservations and their guards
//! - [`analytics::AnalyticsRepository`] - FX rates and monthly statistics

pub mod analytics;
pub mod guest;
pub mod hotel;
pub mod reservation;
pub mod room;
