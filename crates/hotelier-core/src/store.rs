//! # Storage Traits
//!
//! The core never talks SQL. It consumes a transactional store through two
//! traits, implemented by `hotelier-db::SqliteStore` in production and by an
//! in-memory double in tests.
//!
//! ```text
//! ┌────────────────────┐  query_reservations / insert_guest / ...  ┌──────────────┐
//! │ ReservationService │ ────────────────────────────────────────► │ Reservation  │
//! │ AnalyticsService   │ ────────────────────────────────────────► │ Store (DB)   │
//! └────────────────────┘  query_fx_rate / query_monthly_stats      └──────────────┘
//! ```
//!
//! Every method is a suspension point. Latency and timeouts are the
//! transport's concern, not the core's.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::availability::ranges_overlap;
use crate::error::StoreResult;
use crate::types::{
    FxRate, Guest, MonthlyStats, Reservation, ReservationStatus, Room, RoomDetails, RoomType,
    YearMonth,
};

// =============================================================================
// Reservation Filter
// =============================================================================

/// Narrows a reservation query within one hotel.
///
/// Stores may push any part of the filter down into SQL; callers that depend
/// on a property re-check it with [`ReservationFilter::matches`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ReservationFilter {
    pub room_id: Option<String>,
    pub exclude_statuses: Vec<ReservationStatus>,
    pub exclude_reservation_id: Option<String>,
    /// Only reservations overlapping this half-open `[check_in, check_out)`.
    pub overlapping: Option<(NaiveDate, NaiveDate)>,
}

impl ReservationFilter {
    /// Every reservation of the hotel.
    pub fn all() -> Self {
        ReservationFilter::default()
    }

    /// Reservations of one room.
    pub fn for_room(room_id: impl Into<String>) -> Self {
        ReservationFilter {
            room_id: Some(room_id.into()),
            ..ReservationFilter::default()
        }
    }

    /// Drops cancelled, no-show and checked-out reservations.
    pub fn holding_room(mut self) -> Self {
        self.exclude_statuses = ReservationStatus::RELEASED.to_vec();
        self
    }

    /// Drops the reservation being edited.
    pub fn excluding(mut self, reservation_id: Option<&str>) -> Self {
        self.exclude_reservation_id = reservation_id.map(str::to_string);
        self
    }

    /// Keeps only reservations overlapping `[check_in, check_out)`.
    pub fn overlapping(mut self, check_in: NaiveDate, check_out: NaiveDate) -> Self {
        self.overlapping = Some((check_in, check_out));
        self
    }

    /// In-memory evaluation of the filter.
    pub fn matches(&self, reservation: &Reservation) -> bool {
        if let Some(room_id) = &self.room_id {
            if reservation.room_id.as_deref() != Some(room_id.as_str()) {
                return false;
            }
        }

        if self.exclude_statuses.contains(&reservation.status) {
            return false;
        }

        if self.exclude_reservation_id.as_deref() == Some(reservation.id.as_str()) {
            return false;
        }

        if let Some((check_in, check_out)) = self.overlapping {
            if !ranges_overlap(
                reservation.check_in_date,
                reservation.check_out_date,
                check_in,
                check_out,
            ) {
                return false;
            }
        }

        true
    }
}

// =============================================================================
// Reservation Store
// =============================================================================

/// Reservation, guest and room access used by the booking flow and the room
/// board.
#[async_trait]
pub trait ReservationStore: Send + Sync {
    /// Reservations of `hotel_id` matching `filter`.
    async fn query_reservations(
        &self,
        hotel_id: &str,
        filter: &ReservationFilter,
    ) -> StoreResult<Vec<Reservation>>;

    async fn find_reservation(
        &self,
        hotel_id: &str,
        reservation_id: &str,
    ) -> StoreResult<Option<Reservation>>;

    /// A room of `hotel_id` with its room type, if it exists in that hotel.
    async fn find_room(&self, hotel_id: &str, room_id: &str) -> StoreResult<Option<RoomDetails>>;

    /// A room type of `hotel_id`, if it exists in that hotel.
    async fn find_room_type(
        &self,
        hotel_id: &str,
        room_type_id: &str,
    ) -> StoreResult<Option<RoomType>>;

    /// Rooms of the hotel ordered by room number.
    async fn list_rooms(&self, hotel_id: &str) -> StoreResult<Vec<Room>>;

    /// Whether any reservation anywhere already uses this confirmation number.
    async fn confirmation_number_exists(&self, confirmation_number: &str) -> StoreResult<bool>;

    async fn insert_guest(&self, guest: &Guest) -> StoreResult<Guest>;

    /// Removes a guest. Used to compensate a failed booking.
    async fn delete_guest(&self, guest_id: &str) -> StoreResult<()>;

    /// Inserts a reservation.
    ///
    /// Must fail with a `UniqueViolation` on a duplicate confirmation number
    /// and with an `OverlapViolation` when the room is already held for an
    /// overlapping range.
    async fn insert_reservation(&self, reservation: &Reservation) -> StoreResult<Reservation>;

    async fn update_reservation_status(
        &self,
        hotel_id: &str,
        reservation_id: &str,
        status: ReservationStatus,
    ) -> StoreResult<Reservation>;

    /// Moves a stay. Subject to the same overlap guard as inserts.
    async fn update_reservation_dates(
        &self,
        hotel_id: &str,
        reservation_id: &str,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> StoreResult<Reservation>;

    /// Notification that the hotel's reservations changed.
    ///
    /// Plain stores ignore it; caching decorators drop their occupancy data.
    async fn reservations_changed(&self, _hotel_id: &str) {}
}

// =============================================================================
// Analytics Store
// =============================================================================

/// Read access to exchange rates and monthly aggregates.
#[async_trait]
pub trait AnalyticsStore: Send + Sync {
    /// The FX record dated exactly `date`.
    async fn query_fx_rate(&self, date: NaiveDate) -> StoreResult<Option<FxRate>>;

    async fn query_monthly_stats(
        &self,
        hotel_id: &str,
        month: YearMonth,
    ) -> StoreResult<Option<MonthlyStats>>;

    /// Every month of the hotel, oldest first.
    async fn list_monthly_stats(&self, hotel_id: &str) -> StoreResult<Vec<MonthlyStats>>;
}
