//! # Reservation Service
//!
//! Creates, moves and advances reservations on top of a [`ReservationStore`].
//!
//! ## Create Flow
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────────┐
//! │ create_reservation(hotel, guest_input, reservation_input)               │
//! │                                                                          │
//! │  1. validate          dates, names, email, occupancy, amounts            │
//! │        │  ✗ → InvalidDateRange / Validation        (nothing written)     │
//! │  2. room check        find_room + advisory availability, room type       │
//! │        │  ✗ → RoomNotFound / RoomUnavailable       (nothing written)     │
//! │        │  ✗ → RoomTypeNotFound / RoomTypeMismatch  (nothing written)     │
//! │  3. insert guest                                                         │
//! │        │  ✗ → GuestCreationFailed                  (nothing written)     │
//! │  4. confirmation number ◄──────────────┐                                 │
//! │  5. insert reservation (Confirmed)     │ duplicate number: draw again    │
//! │        │  ✗ overlap guard → RoomUnavailable  ┐                           │
//! │        │  ✗ anything else → ReservationInsertFailed                      │
//! │        │                                     └─ guest deleted first      │
//! │  6. reservations_changed(hotel)                                          │
//! └──────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Partial Writes
//! The guest and reservation inserts are two store calls. When the second
//! fails, the guest written by step 3 is deleted again. If that delete also
//! fails the error says so (`guest_rolled_back: false`) and carries the
//! guest id, so the orphan can be cleaned up or reused.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};
use ts_rs::TS;
use uuid::Uuid;

use crate::availability;
use crate::config::BookingConfig;
use crate::confirmation::ConfirmationCodeGenerator;
use crate::error::{BookingError, BookingResult, StorageError, StorageErrorKind};
use crate::projection::{project_rooms, RoomProjection};
use crate::store::{ReservationFilter, ReservationStore};
use crate::types::{
    BookingChannel, Guest, GuestType, Reservation, ReservationStatus, RoomDetails, RoomType,
};
use crate::validation::{
    validate_amount_cents, validate_commission_bps, validate_currency_code, validate_email,
    validate_name, validate_occupancy, validate_stay_dates,
};

// =============================================================================
// Inputs
// =============================================================================

/// Guest section of the reservation form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GuestInput {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub id_number: Option<String>,
    pub nationality: Option<String>,
    #[ts(as = "Option<String>")]
    pub date_of_birth: Option<NaiveDate>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    #[serde(default)]
    pub guest_type: GuestType,
    #[serde(default)]
    pub vip: bool,
    pub notes: Option<String>,
}

impl GuestInput {
    pub fn validate(&self) -> BookingResult<()> {
        validate_name("first_name", &self.first_name)?;
        validate_name("last_name", &self.last_name)?;
        validate_email(self.email.as_deref())?;
        Ok(())
    }

    /// A new guest of `hotel_id`. Blank optional fields become `None`.
    fn into_guest(self, hotel_id: &str) -> Guest {
        Guest {
            id: Uuid::new_v4().to_string(),
            hotel_id: hotel_id.to_string(),
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: non_blank(self.email),
            phone: non_blank(self.phone),
            id_number: non_blank(self.id_number),
            nationality: non_blank(self.nationality),
            date_of_birth: self.date_of_birth,
            address: non_blank(self.address),
            city: non_blank(self.city),
            country: non_blank(self.country),
            guest_type: self.guest_type,
            vip: self.vip,
            notes: non_blank(self.notes),
            created_at: Utc::now(),
        }
    }
}

/// Stay section of the reservation form.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReservationInput {
    pub room_id: Option<String>,
    pub room_type_id: Option<String>,
    #[ts(as = "String")]
    pub check_in_date: NaiveDate,
    #[ts(as = "String")]
    pub check_out_date: NaiveDate,
    pub adults: i64,
    #[serde(default)]
    pub children: i64,
    /// Stay total in cents. Defaults to the room type's base rate × nights.
    pub total_amount_cents: Option<i64>,
    #[serde(default)]
    pub paid_amount_cents: i64,
    /// Defaults to the configured currency.
    pub currency: Option<String>,
    #[serde(default)]
    pub channel: BookingChannel,
    #[serde(default)]
    pub commission_rate_bps: i64,
    pub special_requests: Option<String>,
    pub arrival_time: Option<String>,
}

impl ReservationInput {
    /// A minimal stay: one room, two adults, everything else defaulted.
    pub fn new(room_id: impl Into<String>, check_in_date: NaiveDate, check_out_date: NaiveDate) -> Self {
        ReservationInput {
            room_id: Some(room_id.into()),
            room_type_id: None,
            check_in_date,
            check_out_date,
            adults: 2,
            children: 0,
            total_amount_cents: None,
            paid_amount_cents: 0,
            currency: None,
            channel: BookingChannel::Direct,
            commission_rate_bps: 0,
            special_requests: None,
            arrival_time: None,
        }
    }

    pub fn validate(&self) -> BookingResult<()> {
        validate_stay_dates(self.check_in_date, self.check_out_date)?;
        validate_occupancy(self.adults, self.children)?;
        if let Some(total) = self.total_amount_cents {
            validate_amount_cents("total_amount", total)?;
        }
        validate_amount_cents("paid_amount", self.paid_amount_cents)?;
        validate_commission_bps(self.commission_rate_bps)?;
        if let Some(currency) = &self.currency {
            validate_currency_code(currency.trim())?;
        }
        Ok(())
    }

    fn nights(&self) -> i64 {
        (self.check_out_date - self.check_in_date).num_days()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// =============================================================================
// Service
// =============================================================================

/// Reservation operations exposed to the dashboard.
pub struct ReservationService<S: ReservationStore + ?Sized> {
    store: Arc<S>,
    codes: ConfirmationCodeGenerator,
    config: BookingConfig,
}

impl<S: ReservationStore + ?Sized> Clone for ReservationService<S> {
    fn clone(&self) -> Self {
        ReservationService {
            store: Arc::clone(&self.store),
            codes: self.codes.clone(),
            config: self.config.clone(),
        }
    }
}

impl<S: ReservationStore + ?Sized> ReservationService<S> {
    pub fn new(store: Arc<S>, config: BookingConfig) -> Self {
        ReservationService {
            codes: ConfirmationCodeGenerator::from_config(&config),
            store,
            config,
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn config(&self) -> &BookingConfig {
        &self.config
    }

    /// Whether `room_id` is free for `[check_in, check_out)`.
    ///
    /// `exclude_reservation_id` skips the reservation being edited.
    pub async fn is_available(
        &self,
        hotel_id: &str,
        room_id: &str,
        check_in: NaiveDate,
        check_out: NaiveDate,
        exclude_reservation_id: Option<&str>,
    ) -> BookingResult<bool> {
        validate_stay_dates(check_in, check_out)?;
        let free = availability::is_available(
            self.store.as_ref(),
            hotel_id,
            room_id,
            check_in,
            check_out,
            exclude_reservation_id,
        )
        .await?;
        Ok(free)
    }

    /// Creates a guest and a confirmed reservation for them.
    ///
    /// ## Errors
    /// - `InvalidDateRange`, `Validation`: bad input, nothing written
    /// - `RoomNotFound`, `RoomUnavailable`: room problem, nothing written
    ///   (or the guest rolled back, when the overlap is caught at insert)
    /// - `RoomTypeNotFound`, `RoomTypeMismatch`: the requested room type is
    ///   not in the hotel or is not the room's type, nothing written
    /// - `GuestCreationFailed`: nothing written
    /// - `ConfirmationCodeExhausted`, `ReservationInsertFailed`: guest
    ///   rolled back if possible
    pub async fn create_reservation(
        &self,
        hotel_id: &str,
        guest_input: GuestInput,
        input: ReservationInput,
    ) -> BookingResult<Reservation> {
        // 1. Validate
        guest_input.validate()?;
        input.validate()?;

        // 2. Room existence, advisory availability, room type, default price
        let room = match input.room_id.as_deref() {
            Some(room_id) => Some(self.check_room(hotel_id, room_id, &input).await?),
            None => None,
        };
        let room_type = self
            .resolve_room_type(hotel_id, room.as_ref(), input.room_type_id.as_deref())
            .await?;
        let total_amount_cents = input.total_amount_cents.unwrap_or_else(|| {
            room_type
                .as_ref()
                .map(|t| t.base_rate().for_nights(input.nights()).cents())
                .unwrap_or(0)
        });

        // 3. Guest
        let guest = self
            .store
            .insert_guest(&guest_input.into_guest(hotel_id))
            .await
            .map_err(BookingError::GuestCreationFailed)?;

        // 4 + 5. Confirmation number and reservation
        let now = Utc::now();
        let mut draft = Reservation {
            id: Uuid::new_v4().to_string(),
            hotel_id: hotel_id.to_string(),
            guest_id: Some(guest.id.clone()),
            room_id: input.room_id.clone(),
            room_type_id: input
                .room_type_id
                .clone()
                .or_else(|| room.as_ref().and_then(|r| r.room.room_type_id.clone())),
            confirmation_number: String::new(),
            check_in_date: input.check_in_date,
            check_out_date: input.check_out_date,
            adults: input.adults,
            children: input.children,
            total_amount_cents,
            paid_amount_cents: input.paid_amount_cents,
            currency: input
                .currency
                .as_deref()
                .map(|c| c.trim().to_string())
                .unwrap_or_else(|| self.config.default_currency.clone()),
            status: ReservationStatus::Confirmed,
            channel: input.channel,
            commission_rate_bps: input.commission_rate_bps,
            special_requests: non_blank(input.special_requests.clone()),
            arrival_time: non_blank(input.arrival_time.clone()),
            created_at: now,
            updated_at: now,
        };

        let reservation = self.insert_with_fresh_code(&guest, &mut draft).await?;

        // 6. Notify
        self.store.reservations_changed(hotel_id).await;

        info!(
            hotel_id = %hotel_id,
            reservation_id = %reservation.id,
            confirmation_number = %reservation.confirmation_number,
            room_id = ?reservation.room_id,
            check_in = %reservation.check_in_date,
            check_out = %reservation.check_out_date,
            "Reservation created"
        );

        Ok(reservation)
    }

    /// Moves a reservation along the status state machine.
    pub async fn transition_status(
        &self,
        hotel_id: &str,
        reservation_id: &str,
        next: ReservationStatus,
    ) -> BookingResult<Reservation> {
        let current = self.require_reservation(hotel_id, reservation_id).await?;

        if !current.status.can_transition_to(next) {
            return Err(BookingError::InvalidStatusTransition {
                reservation_id: reservation_id.to_string(),
                from: current.status,
                to: next,
            });
        }

        let updated = self
            .store
            .update_reservation_status(hotel_id, reservation_id, next)
            .await
            .map_err(|e| not_found_or(e, reservation_id))?;

        self.store.reservations_changed(hotel_id).await;

        info!(
            hotel_id = %hotel_id,
            reservation_id = %reservation_id,
            from = %current.status,
            to = %next,
            "Reservation status changed"
        );

        Ok(updated)
    }

    /// Moves a stay to new dates, keeping its room and price.
    pub async fn change_dates(
        &self,
        hotel_id: &str,
        reservation_id: &str,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> BookingResult<Reservation> {
        validate_stay_dates(check_in, check_out)?;
        let current = self.require_reservation(hotel_id, reservation_id).await?;

        if let (Some(room_id), true) = (current.room_id.as_deref(), current.status.holds_room()) {
            let free = availability::is_available(
                self.store.as_ref(),
                hotel_id,
                room_id,
                check_in,
                check_out,
                Some(reservation_id),
            )
            .await?;
            if !free {
                return Err(room_unavailable(room_id, check_in, check_out));
            }
        }

        let updated = self
            .store
            .update_reservation_dates(hotel_id, reservation_id, check_in, check_out)
            .await
            .map_err(|e| {
                if e.is_overlap() {
                    room_unavailable(current.room_id.as_deref().unwrap_or_default(), check_in, check_out)
                } else {
                    not_found_or(e, reservation_id)
                }
            })?;

        self.store.reservations_changed(hotel_id).await;

        info!(
            hotel_id = %hotel_id,
            reservation_id = %reservation_id,
            %check_in,
            %check_out,
            "Reservation dates changed"
        );

        Ok(updated)
    }

    /// Display status of every room of the hotel on `today`.
    pub async fn room_board(&self, hotel_id: &str, today: NaiveDate) -> BookingResult<Vec<RoomProjection>> {
        let rooms = self.store.list_rooms(hotel_id).await?;
        let reservations = self
            .store
            .query_reservations(hotel_id, &ReservationFilter::all().holding_room())
            .await?;
        Ok(project_rooms(&rooms, &reservations, today))
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    async fn check_room(
        &self,
        hotel_id: &str,
        room_id: &str,
        input: &ReservationInput,
    ) -> BookingResult<RoomDetails> {
        let room = self
            .store
            .find_room(hotel_id, room_id)
            .await?
            .ok_or_else(|| BookingError::RoomNotFound(room_id.to_string()))?;

        let free = availability::is_available(
            self.store.as_ref(),
            hotel_id,
            room_id,
            input.check_in_date,
            input.check_out_date,
            None,
        )
        .await?;
        if !free {
            return Err(room_unavailable(room_id, input.check_in_date, input.check_out_date));
        }

        Ok(room)
    }

    /// The room type of the stay.
    ///
    /// A requested type must be the chosen room's type; without a room it
    /// must exist in the hotel.
    async fn resolve_room_type(
        &self,
        hotel_id: &str,
        room: Option<&RoomDetails>,
        requested: Option<&str>,
    ) -> BookingResult<Option<RoomType>> {
        match (room, requested) {
            (Some(details), Some(type_id)) => {
                if details.room.room_type_id.as_deref() != Some(type_id) {
                    return Err(BookingError::RoomTypeMismatch {
                        room_id: details.room.id.clone(),
                        room_type_id: type_id.to_string(),
                    });
                }
                Ok(details.room_type.clone())
            }
            (Some(details), None) => Ok(details.room_type.clone()),
            (None, Some(type_id)) => {
                let room_type = self
                    .store
                    .find_room_type(hotel_id, type_id)
                    .await?
                    .ok_or_else(|| BookingError::RoomTypeNotFound(type_id.to_string()))?;
                Ok(Some(room_type))
            }
            (None, None) => Ok(None),
        }
    }

    async fn require_reservation(&self, hotel_id: &str, reservation_id: &str) -> BookingResult<Reservation> {
        self.store
            .find_reservation(hotel_id, reservation_id)
            .await?
            .ok_or_else(|| BookingError::ReservationNotFound(reservation_id.to_string()))
    }

    /// Draws confirmation numbers and inserts `draft` until one sticks.
    ///
    /// Every draw costs one attempt of a single budget, whether the number
    /// was found taken by the existence check or by the insert.
    async fn insert_with_fresh_code(&self, guest: &Guest, draft: &mut Reservation) -> BookingResult<Reservation> {
        let today = Utc::now().date_naive();
        let mut attempts_left = self.codes.max_attempts();

        loop {
            let (code, used) = match self
                .codes
                .generate_with(self.store.as_ref(), attempts_left, || self.codes.candidate(today))
                .await
            {
                Ok(drawn) => drawn,
                Err(BookingError::Storage(source)) => {
                    return Err(self.insert_failed(guest, source).await);
                }
                Err(BookingError::ConfirmationCodeExhausted { .. }) => {
                    self.roll_back_guest(guest).await;
                    return Err(self.codes_exhausted());
                }
                Err(other) => {
                    self.roll_back_guest(guest).await;
                    return Err(other);
                }
            };
            attempts_left = attempts_left.saturating_sub(used);
            draft.confirmation_number = code;

            match self.store.insert_reservation(draft).await {
                Ok(reservation) => return Ok(reservation),
                Err(e) if e.is_unique_violation_on("confirmation_number") => {
                    warn!(
                        confirmation_number = %draft.confirmation_number,
                        attempts_left,
                        "Confirmation number taken at insert"
                    );
                    if attempts_left == 0 {
                        self.roll_back_guest(guest).await;
                        return Err(self.codes_exhausted());
                    }
                }
                Err(e) if e.is_overlap() => {
                    self.roll_back_guest(guest).await;
                    return Err(room_unavailable(
                        draft.room_id.as_deref().unwrap_or_default(),
                        draft.check_in_date,
                        draft.check_out_date,
                    ));
                }
                Err(source) => {
                    return Err(self.insert_failed(guest, source).await);
                }
            }
        }
    }

    fn codes_exhausted(&self) -> BookingError {
        BookingError::ConfirmationCodeExhausted {
            attempts: self.codes.max_attempts(),
        }
    }

    async fn insert_failed(&self, guest: &Guest, source: StorageError) -> BookingError {
        let guest_rolled_back = self.roll_back_guest(guest).await;
        BookingError::ReservationInsertFailed {
            guest_id: guest.id.clone(),
            guest_rolled_back,
            source,
        }
    }

    /// Deletes a guest created by a failed booking. Returns whether it worked.
    async fn roll_back_guest(&self, guest: &Guest) -> bool {
        match self.store.delete_guest(&guest.id).await {
            Ok(()) => {
                info!(guest_id = %guest.id, "Rolled back guest of failed booking");
                true
            }
            Err(e) => {
                error!(
                    guest_id = %guest.id,
                    hotel_id = %guest.hotel_id,
                    error = %e,
                    "Could not roll back guest of failed booking"
                );
                false
            }
        }
    }
}

fn room_unavailable(room_id: &str, check_in: NaiveDate, check_out: NaiveDate) -> BookingError {
    BookingError::RoomUnavailable {
        room_id: room_id.to_string(),
        check_in,
        check_out,
    }
}

fn not_found_or(err: StorageError, reservation_id: &str) -> BookingError {
    if err.kind == StorageErrorKind::NotFound {
        BookingError::ReservationNotFound(reservation_id.to_string())
    } else {
        BookingError::Storage(err)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
