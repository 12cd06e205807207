//! In-memory store and fixtures for unit tests.
//!
//! `MemoryStore` enforces the same guards as the SQLite schema (unique
//! confirmation numbers, no overlapping stays, guest in the same hotel) and
//! can be told to fail specific writes or to pause a read.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{oneshot, Notify};

use crate::error::{StorageError, StorageErrorKind, StoreResult};
use crate::store::{AnalyticsStore, ReservationFilter, ReservationStore};
use crate::types::{
    BookingChannel, FxRate, Guest, MonthlyStats, Reservation, ReservationStatus, Room,
    RoomDetails, RoomStatus, RoomType, YearMonth,
};

pub const HOTEL: &str = "hotel-1";

// =============================================================================
// Fixtures
// =============================================================================

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn room(id: &str, room_number: &str, status: RoomStatus) -> Room {
    Room {
        id: id.to_string(),
        hotel_id: HOTEL.to_string(),
        room_number: room_number.to_string(),
        room_type_id: Some("type-double".to_string()),
        floor: Some(1),
        status,
        notes: None,
    }
}

pub fn double_room_type() -> RoomType {
    RoomType {
        id: "type-double".to_string(),
        name: "Double".to_string(),
        description: None,
        base_rate_cents: 10000,
        max_occupancy: 2,
        amenities: vec!["wifi".to_string()],
    }
}

pub fn reservation(
    id: &str,
    room_id: &str,
    check_in: NaiveDate,
    check_out: NaiveDate,
    status: ReservationStatus,
) -> Reservation {
    let now = Utc::now();
    Reservation {
        id: id.to_string(),
        hotel_id: HOTEL.to_string(),
        guest_id: Some(format!("guest-of-{}", id)),
        room_id: Some(room_id.to_string()),
        room_type_id: Some("type-double".to_string()),
        confirmation_number: format!("RES-TEST-{}", id.to_ascii_uppercase()),
        check_in_date: check_in,
        check_out_date: check_out,
        adults: 2,
        children: 0,
        total_amount_cents: 0,
        paid_amount_cents: 0,
        currency: "EUR".to_string(),
        status,
        channel: BookingChannel::Direct,
        commission_rate_bps: 0,
        special_requests: None,
        arrival_time: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn fx_rate(rate_date: NaiveDate, eur_to_usd: Decimal, eur_to_try: Decimal) -> FxRate {
    FxRate {
        rate_date,
        eur_to_usd,
        eur_to_try,
    }
}

pub fn monthly_stats(
    month: &str,
    total_bookings: i64,
    total_revenue_eur: Decimal,
    adr_eur: Decimal,
) -> MonthlyStats {
    let month: YearMonth = month.parse().unwrap();
    MonthlyStats {
        id: format!("stats-{}", month),
        hotel_id: HOTEL.to_string(),
        month_start: month.first_day(),
        total_bookings,
        total_revenue_eur,
        adr_eur,
        strongest_channel: "booking_com".to_string(),
    }
}

// =============================================================================
// Memory Store
// =============================================================================

#[derive(Default)]
struct State {
    rooms: Vec<RoomDetails>,
    /// (hotel_id, room type)
    room_types: Vec<(String, RoomType)>,
    guests: Vec<Guest>,
    reservations: Vec<Reservation>,
    fx_rates: Vec<FxRate>,
    monthly_stats: Vec<MonthlyStats>,
}

#[derive(Default)]
struct Faults {
    guest_insert: Option<StorageError>,
    guest_delete: Option<StorageError>,
    reservation_insert: VecDeque<StorageError>,
    blind_queries: bool,
    /// Upcoming confirmation-number checks that report the code as taken.
    codes_taken: usize,
}

/// Holds one `query_reservations` call after it has read its rows.
struct QueryGate {
    rows_read: oneshot::Sender<()>,
    resume: Arc<Notify>,
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    faults: Mutex<Faults>,
    queries: AtomicUsize,
    code_checks: AtomicUsize,
    query_gate: Mutex<Option<QueryGate>>,
    changed: Mutex<Vec<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// A store with one clean double room in [`HOTEL`].
    ///
    /// `"room-101"` gets room number `"101"`.
    pub fn with_room(room_id: &str) -> Self {
        let store = MemoryStore::new();
        let number = room_id.trim_start_matches("room-");
        store.seed_room(room(room_id, number, RoomStatus::Clean));
        store
    }

    /// Adds a room of the double room type, registering the type for the
    /// room's hotel.
    pub fn seed_room(&self, room: Room) {
        let mut state = self.state.lock().unwrap();
        let room_type = double_room_type();
        if !state
            .room_types
            .iter()
            .any(|(hotel, t)| hotel == &room.hotel_id && t.id == room_type.id)
        {
            state.room_types.push((room.hotel_id.clone(), room_type.clone()));
        }
        state.rooms.push(RoomDetails {
            room,
            room_type: Some(room_type),
        });
    }

    pub fn seed_room_type(&self, hotel_id: &str, room_type: RoomType) {
        self.state
            .lock()
            .unwrap()
            .room_types
            .push((hotel_id.to_string(), room_type));
    }

    pub fn seed_reservation(&self, reservation: Reservation) {
        self.state.lock().unwrap().reservations.push(reservation);
    }

    pub fn seed_fx_rate(&self, rate: FxRate) {
        self.state.lock().unwrap().fx_rates.push(rate);
    }

    pub fn seed_monthly_stats(&self, stats: MonthlyStats) {
        self.state.lock().unwrap().monthly_stats.push(stats);
    }

    pub fn guests(&self) -> Vec<Guest> {
        self.state.lock().unwrap().guests.clone()
    }

    pub fn reservations(&self) -> Vec<Reservation> {
        self.state.lock().unwrap().reservations.clone()
    }

    /// Number of `query_reservations` calls so far.
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    /// Number of `confirmation_number_exists` calls so far.
    pub fn code_check_count(&self) -> usize {
        self.code_checks.load(Ordering::SeqCst)
    }

    /// Hotels passed to `reservations_changed`, in call order.
    pub fn change_notifications(&self) -> Vec<String> {
        self.changed.lock().unwrap().clone()
    }

    pub fn fail_guest_insert(&self, err: StorageError) {
        self.faults.lock().unwrap().guest_insert = Some(err);
    }

    pub fn fail_guest_delete(&self, err: StorageError) {
        self.faults.lock().unwrap().guest_delete = Some(err);
    }

    /// Queues an error for the next reservation insert. Queued errors are
    /// consumed one per insert.
    pub fn fail_reservation_insert(&self, err: StorageError) {
        self.faults.lock().unwrap().reservation_insert.push_back(err);
    }

    /// Reports the next `count` confirmation numbers as taken.
    pub fn report_codes_taken(&self, count: usize) {
        self.faults.lock().unwrap().codes_taken = count;
    }

    /// Pauses the next `query_reservations` once it has read its rows.
    ///
    /// The receiver fires when the rows are read; the call returns them
    /// after `notify_one` on the returned handle.
    pub fn pause_next_query(&self) -> (oneshot::Receiver<()>, Arc<Notify>) {
        let (rows_read, read) = oneshot::channel();
        let resume = Arc::new(Notify::new());
        *self.query_gate.lock().unwrap() = Some(QueryGate {
            rows_read,
            resume: Arc::clone(&resume),
        });
        (read, resume)
    }

    /// Makes `query_reservations` return nothing, as if every competing
    /// booking committed after the read.
    pub fn blind_queries(&self) {
        self.faults.lock().unwrap().blind_queries = true;
    }

    fn overlap_exists(state: &State, candidate: &Reservation) -> bool {
        if !candidate.status.holds_room() {
            return false;
        }
        let room_id = match &candidate.room_id {
            Some(room_id) => room_id,
            None => return false,
        };
        state.reservations.iter().any(|r| {
            r.id != candidate.id
                && r.room_id.as_ref() == Some(room_id)
                && r.status.holds_room()
                && r.overlaps(candidate.check_in_date, candidate.check_out_date)
        })
    }

    fn not_found(what: &str, id: &str) -> StorageError {
        StorageError::new(StorageErrorKind::NotFound, format!("{} {} not found", what, id))
    }
}

#[async_trait]
impl ReservationStore for MemoryStore {
    async fn query_reservations(
        &self,
        hotel_id: &str,
        filter: &ReservationFilter,
    ) -> StoreResult<Vec<Reservation>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if self.faults.lock().unwrap().blind_queries {
            return Ok(Vec::new());
        }

        let rows: Vec<Reservation> = self
            .state
            .lock()
            .unwrap()
            .reservations
            .iter()
            .filter(|r| r.hotel_id == hotel_id && filter.matches(r))
            .cloned()
            .collect();

        let gate = self.query_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            let _ = gate.rows_read.send(());
            gate.resume.notified().await;
        }
        Ok(rows)
    }

    async fn find_reservation(
        &self,
        hotel_id: &str,
        reservation_id: &str,
    ) -> StoreResult<Option<Reservation>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .reservations
            .iter()
            .find(|r| r.hotel_id == hotel_id && r.id == reservation_id)
            .cloned())
    }

    async fn find_room(&self, hotel_id: &str, room_id: &str) -> StoreResult<Option<RoomDetails>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .rooms
            .iter()
            .find(|d| d.room.hotel_id == hotel_id && d.room.id == room_id)
            .cloned())
    }

    async fn list_rooms(&self, hotel_id: &str) -> StoreResult<Vec<Room>> {
        let state = self.state.lock().unwrap();
        let mut rooms: Vec<Room> = state
            .rooms
            .iter()
            .filter(|d| d.room.hotel_id == hotel_id)
            .map(|d| d.room.clone())
            .collect();
        rooms.sort_by(|a, b| a.room_number.cmp(&b.room_number));
        Ok(rooms)
    }

    async fn find_room_type(
        &self,
        hotel_id: &str,
        room_type_id: &str,
    ) -> StoreResult<Option<RoomType>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .room_types
            .iter()
            .find(|(hotel, t)| hotel == hotel_id && t.id == room_type_id)
            .map(|(_, t)| t.clone()))
    }

    async fn confirmation_number_exists(&self, confirmation_number: &str) -> StoreResult<bool> {
        self.code_checks.fetch_add(1, Ordering::SeqCst);
        {
            let mut faults = self.faults.lock().unwrap();
            if faults.codes_taken > 0 {
                faults.codes_taken -= 1;
                return Ok(true);
            }
        }
        let state = self.state.lock().unwrap();
        Ok(state
            .reservations
            .iter()
            .any(|r| r.confirmation_number == confirmation_number))
    }

    async fn insert_guest(&self, guest: &Guest) -> StoreResult<Guest> {
        if let Some(err) = self.faults.lock().unwrap().guest_insert.take() {
            return Err(err);
        }
        self.state.lock().unwrap().guests.push(guest.clone());
        Ok(guest.clone())
    }

    async fn delete_guest(&self, guest_id: &str) -> StoreResult<()> {
        if let Some(err) = self.faults.lock().unwrap().guest_delete.take() {
            return Err(err);
        }
        let mut state = self.state.lock().unwrap();
        let before = state.guests.len();
        state.guests.retain(|g| g.id != guest_id);
        if state.guests.len() == before {
            return Err(MemoryStore::not_found("guest", guest_id));
        }
        Ok(())
    }

    async fn insert_reservation(&self, reservation: &Reservation) -> StoreResult<Reservation> {
        if let Some(err) = self.faults.lock().unwrap().reservation_insert.pop_front() {
            return Err(err);
        }

        let mut state = self.state.lock().unwrap();

        if state
            .reservations
            .iter()
            .any(|r| r.confirmation_number == reservation.confirmation_number)
        {
            return Err(StorageError::unique("reservations.confirmation_number"));
        }

        if let Some(guest_id) = &reservation.guest_id {
            let same_hotel = state
                .guests
                .iter()
                .any(|g| &g.id == guest_id && g.hotel_id == reservation.hotel_id);
            if !same_hotel {
                return Err(StorageError::other("guest belongs to another hotel"));
            }
        }

        if MemoryStore::overlap_exists(&state, reservation) {
            return Err(StorageError::overlap());
        }

        state.reservations.push(reservation.clone());
        Ok(reservation.clone())
    }

    async fn update_reservation_status(
        &self,
        hotel_id: &str,
        reservation_id: &str,
        status: ReservationStatus,
    ) -> StoreResult<Reservation> {
        let mut state = self.state.lock().unwrap();
        let existing = state
            .reservations
            .iter_mut()
            .find(|r| r.hotel_id == hotel_id && r.id == reservation_id)
            .ok_or_else(|| MemoryStore::not_found("reservation", reservation_id))?;
        existing.status = status;
        existing.updated_at = Utc::now();
        Ok(existing.clone())
    }

    async fn update_reservation_dates(
        &self,
        hotel_id: &str,
        reservation_id: &str,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> StoreResult<Reservation> {
        let mut state = self.state.lock().unwrap();
        let mut moved = state
            .reservations
            .iter()
            .find(|r| r.hotel_id == hotel_id && r.id == reservation_id)
            .cloned()
            .ok_or_else(|| MemoryStore::not_found("reservation", reservation_id))?;
        moved.check_in_date = check_in;
        moved.check_out_date = check_out;
        moved.updated_at = Utc::now();

        if MemoryStore::overlap_exists(&state, &moved) {
            return Err(StorageError::overlap());
        }

        if let Some(slot) = state.reservations.iter_mut().find(|r| r.id == reservation_id) {
            *slot = moved.clone();
        }
        Ok(moved)
    }

    async fn reservations_changed(&self, hotel_id: &str) {
        self.changed.lock().unwrap().push(hotel_id.to_string());
    }
}

#[async_trait]
impl AnalyticsStore for MemoryStore {
    async fn query_fx_rate(&self, date: NaiveDate) -> StoreResult<Option<FxRate>> {
        let state = self.state.lock().unwrap();
        Ok(state.fx_rates.iter().find(|r| r.rate_date == date).cloned())
    }

    async fn query_monthly_stats(
        &self,
        hotel_id: &str,
        month: YearMonth,
    ) -> StoreResult<Option<MonthlyStats>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .monthly_stats
            .iter()
            .find(|s| s.hotel_id == hotel_id && s.month_start == month.first_day())
            .cloned())
    }

    async fn list_monthly_stats(&self, hotel_id: &str) -> StoreResult<Vec<MonthlyStats>> {
        let state = self.state.lock().unwrap();
        let mut stats: Vec<MonthlyStats> = state
            .monthly_stats
            .iter()
            .filter(|s| s.hotel_id == hotel_id)
            .cloned()
            .collect();
        stats.sort_by_key(|s| s.month_start);
        Ok(stats)
    }
}
