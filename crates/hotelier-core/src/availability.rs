//! # Availability Checker
//!
//! Decides whether a room is free for a stay.
//!
//! ## Half-Open Overlap
//! ```text
//!   existing   [──────────)            check_in 03, check_out 07
//!   new             [──────────)       check_in 05 → overlaps
//!   new     [───)                      check_out 03 → back-to-back, free
//!
//!   overlap ⇔ new.check_in < existing.check_out
//!           ∧ new.check_out > existing.check_in
//! ```
//!
//! ## Advisory, Not a Lock
//! Two bookings can both pass this check before either commits. The store's
//! overlap guard on insert is authoritative; this check exists to give the
//! front desk an early, field-level answer.

use chrono::NaiveDate;
use tracing::debug;

use crate::error::StoreResult;
use crate::store::{ReservationFilter, ReservationStore};
use crate::types::Reservation;

/// Half-open overlap of `[a_in, a_out)` and `[b_in, b_out)`.
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use hotelier_core::availability::ranges_overlap;
///
/// let d = |day| NaiveDate::from_ymd_opt(2024, 2, day).unwrap();
/// assert!(ranges_overlap(d(1), d(5), d(3), d(7)));
/// assert!(!ranges_overlap(d(1), d(3), d(3), d(7))); // back-to-back
/// ```
#[inline]
pub fn ranges_overlap(a_in: NaiveDate, a_out: NaiveDate, b_in: NaiveDate, b_out: NaiveDate) -> bool {
    a_in < b_out && b_in < a_out
}

/// Reservations in `reservations` that block `room_id` for the stay.
///
/// Only reservations that still hold their room count, and
/// `exclude_reservation_id` (the booking being edited) is skipped.
pub fn conflicting<'a>(
    reservations: &'a [Reservation],
    room_id: &str,
    check_in: NaiveDate,
    check_out: NaiveDate,
    exclude_reservation_id: Option<&str>,
) -> Vec<&'a Reservation> {
    reservations
        .iter()
        .filter(|r| r.room_id.as_deref() == Some(room_id))
        .filter(|r| r.status.holds_room())
        .filter(|r| exclude_reservation_id != Some(r.id.as_str()))
        .filter(|r| r.overlaps(check_in, check_out))
        .collect()
}

/// Reservations of the store that block `room_id` for the stay.
///
/// The store may pre-filter by dates; the half-open rule is applied again
/// here so the answer never depends on the store's SQL.
pub async fn find_conflicts<S>(
    store: &S,
    hotel_id: &str,
    room_id: &str,
    check_in: NaiveDate,
    check_out: NaiveDate,
    exclude_reservation_id: Option<&str>,
) -> StoreResult<Vec<Reservation>>
where
    S: ReservationStore + ?Sized,
{
    let filter = ReservationFilter::for_room(room_id)
        .holding_room()
        .excluding(exclude_reservation_id)
        .overlapping(check_in, check_out);

    let candidates = store.query_reservations(hotel_id, &filter).await?;

    let conflicts: Vec<Reservation> = conflicting(
        &candidates,
        room_id,
        check_in,
        check_out,
        exclude_reservation_id,
    )
    .into_iter()
    .cloned()
    .collect();

    debug!(
        hotel_id = %hotel_id,
        room_id = %room_id,
        %check_in,
        %check_out,
        conflicts = conflicts.len(),
        "Checked room availability"
    );

    Ok(conflicts)
}

/// `true` when no reservation holding `room_id` overlaps the stay.
///
/// The caller guarantees `check_out > check_in`.
pub async fn is_available<S>(
    store: &S,
    hotel_id: &str,
    room_id: &str,
    check_in: NaiveDate,
    check_out: NaiveDate,
    exclude_reservation_id: Option<&str>,
) -> StoreResult<bool>
where
    S: ReservationStore + ?Sized,
{
    let conflicts = find_conflicts(
        store,
        hotel_id,
        room_id,
        check_in,
        check_out,
        exclude_reservation_id,
    )
    .await?;

    Ok(conflicts.is_empty())
}

// =============================================================================
// Unit Tests
// =============================================================================
