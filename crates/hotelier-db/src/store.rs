//! # SQLite Store
//!
//! Implements the hotelier-core storage traits on top of the repositories.
//!
//! ```text
//!   ReservationService ─┐                     ┌─► ReservationRepository
//!                       ├─► SqliteStore ──────┼─► RoomRepository
//!   AnalyticsService ───┘   (DbError →        ├─► GuestRepository
//!                            StorageError)    └─► AnalyticsRepository
//! ```
//!
//! Guarantees relied on by the booking flow:
//! - a duplicate confirmation number fails with a `UniqueViolation` whose
//!   field names `confirmation_number`
//! - an overlapping room-holding write fails with an `OverlapViolation`

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::pool::Database;
use hotelier_core::{
    AnalyticsStore, FxRate, Guest, MonthlyStats, Reservation, ReservationFilter,
    ReservationStatus, ReservationStore, Room, RoomDetails, RoomType, StoreResult, YearMonth,
};

/// Storage-trait view of a [`Database`].
#[derive(Debug, Clone)]
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    pub fn new(db: Database) -> Self {
        SqliteStore { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

#[async_trait]
impl ReservationStore for SqliteStore {
    async fn query_reservations(
        &self,
        hotel_id: &str,
        filter: &ReservationFilter,
    ) -> StoreResult<Vec<Reservation>> {
        Ok(self.db.reservations().query(hotel_id, filter).await?)
    }

    async fn find_reservation(
        &self,
        hotel_id: &str,
        reservation_id: &str,
    ) -> StoreResult<Option<Reservation>> {
        Ok(self.db.reservations().get_by_id(hotel_id, reservation_id).await?)
    }

    async fn find_room(&self, hotel_id: &str, room_id: &str) -> StoreResult<Option<RoomDetails>> {
        Ok(self.db.rooms().find_details(hotel_id, room_id).await?)
    }

    async fn find_room_type(
        &self,
        hotel_id: &str,
        room_type_id: &str,
    ) -> StoreResult<Option<RoomType>> {
        Ok(self.db.rooms().get_room_type(hotel_id, room_type_id).await?)
    }

    async fn list_rooms(&self, hotel_id: &str) -> StoreResult<Vec<Room>> {
        Ok(self.db.rooms().list_by_hotel(hotel_id).await?)
    }

    async fn confirmation_number_exists(&self, confirmation_number: &str) -> StoreResult<bool> {
        Ok(self
            .db
            .reservations()
            .confirmation_number_exists(confirmation_number)
            .await?)
    }

    async fn insert_guest(&self, guest: &Guest) -> StoreResult<Guest> {
        Ok(self.db.guests().insert(guest).await?)
    }

    async fn delete_guest(&self, guest_id: &str) -> StoreResult<()> {
        Ok(self.db.guests().delete(guest_id).await?)
    }

    async fn insert_reservation(&self, reservation: &Reservation) -> StoreResult<Reservation> {
        Ok(self.db.reservations().insert(reservation).await?)
    }

    async fn update_reservation_status(
        &self,
        hotel_id: &str,
        reservation_id: &str,
        status: ReservationStatus,
    ) -> StoreResult<Reservation> {
        Ok(self
            .db
            .reservations()
            .update_status(hotel_id, reservation_id, status)
            .await?)
    }

    async fn update_reservation_dates(
        &self,
        hotel_id: &str,
        reservation_id: &str,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> StoreResult<Reservation> {
        Ok(self
            .db
            .reservations()
            .update_dates(hotel_id, reservation_id, check_in, check_out)
            .await?)
    }
}

#[async_trait]
impl AnalyticsStore for SqliteStore {
    async fn query_fx_rate(&self, date: NaiveDate) -> StoreResult<Option<FxRate>> {
        Ok(self.db.analytics().get_fx_rate(date).await?)
    }

    async fn query_monthly_stats(
        &self,
        hotel_id: &str,
        month: YearMonth,
    ) -> StoreResult<Option<MonthlyStats>> {
        Ok(self.db.analytics().get_monthly_stats(hotel_id, month).await?)
    }

    async fn list_monthly_stats(&self, hotel_id: &str) -> StoreResult<Vec<MonthlyStats>> {
        Ok(self.db.analytics().list_monthly_stats(hotel_id).await?)
    }
}

// =============================================================================
// Integration Tests (services over SQLite)
// =============================================================================
