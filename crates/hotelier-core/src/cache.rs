//! # Caching Store Decorator
//!
//! Wraps any [`ReservationStore`] and memoizes `query_reservations` per
//! hotel and filter. The room board polls the same queries repeatedly; the
//! underlying rows only change through the write methods below.
//!
//! ```text
//!   ReservationService ──► CachingReservationStore ──► SqliteStore
//!                              │  reads: per-(hotel, filter) map
//!                              │         (not filled if a write overtook them)
//!                              │  writes: pass through, drop hotel entries
//!                              └─ reservations_changed: drop hotel entries
//! ```
//!
//! Writes made to the inner store by other processes are not seen until the
//! next invalidation. Wrap only stores that this process owns.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::StoreResult;
use crate::store::{ReservationFilter, ReservationStore};
use crate::types::{Guest, Reservation, ReservationStatus, Room, RoomDetails, RoomType};

type CacheKey = (String, ReservationFilter);

#[derive(Default)]
struct CacheState {
    entries: HashMap<CacheKey, Vec<Reservation>>,
    /// Bumped by every invalidation of a hotel. A read only fills the cache
    /// if its hotel's generation is unchanged since the read started.
    generations: HashMap<String, u64>,
}

impl CacheState {
    fn generation(&self, hotel_id: &str) -> u64 {
        self.generations.get(hotel_id).copied().unwrap_or(0)
    }
}

pub struct CachingReservationStore<S> {
    inner: S,
    state: RwLock<CacheState>,
}

impl<S: ReservationStore> CachingReservationStore<S> {
    pub fn new(inner: S) -> Self {
        CachingReservationStore {
            inner,
            state: RwLock::new(CacheState::default()),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Drops every cached query of `hotel_id` and discards reads of it that
    /// are still in flight.
    pub async fn invalidate(&self, hotel_id: &str) {
        let mut state = self.state.write().await;
        *state.generations.entry(hotel_id.to_string()).or_insert(0) += 1;
        let before = state.entries.len();
        state.entries.retain(|(hotel, _), _| hotel != hotel_id);
        debug!(hotel_id = %hotel_id, dropped = before - state.entries.len(), "Invalidated reservation cache");
    }

    /// Number of cached queries.
    pub async fn len(&self) -> usize {
        self.state.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.entries.is_empty()
    }
}

#[async_trait]
impl<S: ReservationStore> ReservationStore for CachingReservationStore<S> {
    async fn query_reservations(
        &self,
        hotel_id: &str,
        filter: &ReservationFilter,
    ) -> StoreResult<Vec<Reservation>> {
        let key = (hotel_id.to_string(), filter.clone());

        let generation = {
            let state = self.state.read().await;
            if let Some(hit) = state.entries.get(&key) {
                return Ok(hit.clone());
            }
            state.generation(hotel_id)
        };

        let fresh = self.inner.query_reservations(hotel_id, filter).await?;

        let mut state = self.state.write().await;
        if state.generation(hotel_id) == generation {
            state.entries.insert(key, fresh.clone());
        } else {
            debug!(hotel_id = %hotel_id, "Reservation read overtaken by a write, not cached");
        }
        Ok(fresh)
    }

    async fn find_reservation(
        &self,
        hotel_id: &str,
        reservation_id: &str,
    ) -> StoreResult<Option<Reservation>> {
        self.inner.find_reservation(hotel_id, reservation_id).await
    }

    async fn find_room(&self, hotel_id: &str, room_id: &str) -> StoreResult<Option<RoomDetails>> {
        self.inner.find_room(hotel_id, room_id).await
    }

    async fn find_room_type(
        &self,
        hotel_id: &str,
        room_type_id: &str,
    ) -> StoreResult<Option<RoomType>> {
        self.inner.find_room_type(hotel_id, room_type_id).await
    }

    async fn list_rooms(&self, hotel_id: &str) -> StoreResult<Vec<Room>> {
        self.inner.list_rooms(hotel_id).await
    }

    async fn confirmation_number_exists(&self, confirmation_number: &str) -> StoreResult<bool> {
        self.inner.confirmation_number_exists(confirmation_number).await
    }

    async fn insert_guest(&self, guest: &Guest) -> StoreResult<Guest> {
        self.inner.insert_guest(guest).await
    }

    async fn delete_guest(&self, guest_id: &str) -> StoreResult<()> {
        self.inner.delete_guest(guest_id).await
    }

    async fn insert_reservation(&self, reservation: &Reservation) -> StoreResult<Reservation> {
        let result = self.inner.insert_reservation(reservation).await;
        // A rejected insert can mean a competing write landed.
        self.invalidate(&reservation.hotel_id).await;
        result
    }

    async fn update_reservation_status(
        &self,
        hotel_id: &str,
        reservation_id: &str,
        status: ReservationStatus,
    ) -> StoreResult<Reservation> {
        let result = self
            .inner
            .update_reservation_status(hotel_id, reservation_id, status)
            .await;
        self.invalidate(hotel_id).await;
        result
    }

    async fn update_reservation_dates(
        &self,
        hotel_id: &str,
        reservation_id: &str,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> StoreResult<Reservation> {
        let result = self
            .inner
            .update_reservation_dates(hotel_id, reservation_id, check_in, check_out)
            .await;
        self.invalidate(hotel_id).await;
        result
    }

    async fn reservations_changed(&self, hotel_id: &str) {
        self.invalidate(hotel_id).await;
        self.inner.reservations_changed(hotel_id).await;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::{GuestInput, ReservationInput, ReservationService};
    use crate::config::BookingConfig;
    use crate::testing::{date, reservation, MemoryStore, HOTEL};
    use crate::types::RoomStatus;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_repeated_queries_hit_cache() {
        let cache = CachingReservationStore::new(MemoryStore::with_room("room-101"));
        let filter = ReservationFilter::all().holding_room();

        cache.query_reservations(HOTEL, &filter).await.unwrap();
        cache.query_reservations(HOTEL, &filter).await.unwrap();
        cache
            .query_reservations(HOTEL, &ReservationFilter::for_room("room-101"))
            .await
            .unwrap();

        assert_eq!(cache.inner().query_count(), 2);
        assert_eq!(cache.len().await, 2);

        cache.invalidate(HOTEL).await;
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_read_overtaken_by_write_is_not_cached() {
        let store = MemoryStore::with_room("room-101");
        store.seed_reservation(reservation(
            "res-a",
            "room-101",
            date(2024, 1, 12),
            date(2024, 1, 14),
            ReservationStatus::Confirmed,
        ));
        let (rows_read, resume) = store.pause_next_query();
        let cache = Arc::new(CachingReservationStore::new(store));
        let filter = ReservationFilter::all().holding_room();

        let reader = {
            let cache = Arc::clone(&cache);
            let filter = filter.clone();
            tokio::spawn(async move { cache.query_reservations(HOTEL, &filter).await })
        };

        // The reader holds the pre-write rows while the status changes.
        rows_read.await.unwrap();
        cache
            .update_reservation_status(HOTEL, "res-a", ReservationStatus::CheckedIn)
            .await
            .unwrap();
        resume.notify_one();

        let overtaken = reader.await.unwrap().unwrap();
        assert_eq!(overtaken[0].status, ReservationStatus::Confirmed);
        assert!(cache.is_empty().await);

        let current = cache.query_reservations(HOTEL, &filter).await.unwrap();
        assert_eq!(current[0].status, ReservationStatus::CheckedIn);
        assert_eq!(cache.inner().query_count(), 2);
    }

    #[tokio::test]
    async fn test_cancellation_during_read_frees_room() {
        let store = MemoryStore::with_room("room-101");
        store.seed_reservation(reservation(
            "res-a",
            "room-101",
            date(2024, 2, 1),
            date(2024, 2, 4),
            ReservationStatus::Confirmed,
        ));
        let (rows_read, resume) = store.pause_next_query();
        let svc = ReservationService::new(
            Arc::new(CachingReservationStore::new(store)),
            BookingConfig::default(),
        );
        let check_in = date(2024, 2, 1);
        let check_out = date(2024, 2, 4);

        let checker = {
            let svc = svc.clone();
            tokio::spawn(async move {
                svc.is_available(HOTEL, "room-101", check_in, check_out, None)
                    .await
            })
        };

        rows_read.await.unwrap();
        svc.transition_status(HOTEL, "res-a", ReservationStatus::Cancelled)
            .await
            .unwrap();
        resume.notify_one();

        // Answered from the rows read before the cancellation
        assert!(!checker.await.unwrap().unwrap());

        assert!(svc
            .is_available(HOTEL, "room-101", check_in, check_out, None)
            .await
            .unwrap());
        svc.create_reservation(
            HOTEL,
            GuestInput {
                first_name: "Ben".to_string(),
                last_name: "Ortiz".to_string(),
                ..GuestInput::default()
            },
            ReservationInput::new("room-101", check_in, check_out),
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_status_change_invalidates_board() {
        let store = MemoryStore::with_room("room-101");
        store.seed_reservation(reservation(
            "res-a",
            "room-101",
            date(2024, 1, 12),
            date(2024, 1, 14),
            ReservationStatus::Confirmed,
        ));
        let svc = ReservationService::new(
            Arc::new(CachingReservationStore::new(store)),
            BookingConfig::default(),
        );
        let today = date(2024, 1, 12);

        let before = svc.room_board(HOTEL, today).await.unwrap();
        assert_eq!(before[0].display_status, RoomStatus::Available);

        svc.transition_status(HOTEL, "res-a", ReservationStatus::CheckedIn)
            .await
            .unwrap();

        let after = svc.room_board(HOTEL, today).await.unwrap();
        assert_eq!(after[0].display_status, RoomStatus::Occupied);
    }

    #[tokio::test]
    async fn test_create_reservation_invalidates_and_forwards() {
        let svc = ReservationService::new(
            Arc::new(CachingReservationStore::new(MemoryStore::with_room("room-101"))),
            BookingConfig::default(),
        );
        let check_in = date(2024, 2, 1);
        let check_out = date(2024, 2, 3);

        assert!(svc
            .is_available(HOTEL, "room-101", check_in, check_out, None)
            .await
            .unwrap());

        svc.create_reservation(
            HOTEL,
            GuestInput {
                first_name: "Ana".to_string(),
                last_name: "Silva".to_string(),
                ..GuestInput::default()
            },
            ReservationInput::new("room-101", check_in, check_out),
        )
        .await
        .unwrap();

        assert!(!svc
            .is_available(HOTEL, "room-101", check_in, check_out, None)
            .await
            .unwrap());
        assert_eq!(
            svc.store().inner().change_notifications(),
            vec![HOTEL.to_string()]
        );
    }
}
