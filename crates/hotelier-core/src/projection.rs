//! # Room Status Projection
//!
//! Derives what the room board shows for each room from the room's stored
//! status and the reservations on it. Recomputed on every read; never written
//! back to the room.
//!
//! ## Precedence
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │ 1. checked_in reservation with check_in <= today < check_out         │
//! │      → Occupied, occupying guest = that reservation's guest          │
//! │ 2. confirmed reservation with check_in == today                      │
//! │      → Available, arriving guest surfaced                            │
//! │ 3. otherwise                                                         │
//! │      → stored status verbatim (clean, dirty, maintenance, ...)       │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A guest who checked in is "in house" until checkout day, so on the
//! checkout day itself rule 1 no longer applies and the next arrival (rule 2)
//! can show.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use ts_rs::TS;

use crate::types::{Reservation, ReservationStatus, Room, RoomStatus};

/// One tile of the room board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RoomProjection {
    pub room_id: String,
    pub room_number: String,
    /// Housekeeping status as stored.
    pub stored_status: RoomStatus,
    /// Status to display.
    pub display_status: RoomStatus,
    /// Guest of the checked-in reservation covering today.
    pub occupying_guest_id: Option<String>,
    pub occupying_reservation_id: Option<String>,
    /// Guest of a confirmed reservation arriving today.
    pub arriving_guest_id: Option<String>,
    pub arriving_reservation_id: Option<String>,
}

impl RoomProjection {
    pub fn is_occupied(&self) -> bool {
        self.occupying_reservation_id.is_some()
    }

    pub fn has_arrival(&self) -> bool {
        self.arriving_reservation_id.is_some()
    }
}

/// Projects one room. `reservations` may contain other rooms' reservations.
pub fn project_status(room: &Room, reservations: &[Reservation], today: NaiveDate) -> RoomProjection {
    project_from(
        room,
        reservations
            .iter()
            .filter(|r| r.room_id.as_deref() == Some(room.id.as_str())),
        today,
    )
}

/// Projects every room of a hotel in one pass over its reservations.
///
/// Output order follows `rooms`.
pub fn project_rooms(rooms: &[Room], reservations: &[Reservation], today: NaiveDate) -> Vec<RoomProjection> {
    let mut by_room: HashMap<&str, Vec<&Reservation>> = HashMap::new();
    for reservation in reservations {
        if let Some(room_id) = reservation.room_id.as_deref() {
            by_room.entry(room_id).or_default().push(reservation);
        }
    }

    rooms
        .iter()
        .map(|room| {
            let on_room = by_room.get(room.id.as_str()).map(Vec::as_slice).unwrap_or(&[]);
            project_from(room, on_room.iter().copied(), today)
        })
        .collect()
}

fn project_from<'a, I>(room: &Room, on_room: I, today: NaiveDate) -> RoomProjection
where
    I: Iterator<Item = &'a Reservation>,
{
    let mut occupying: Option<&Reservation> = None;
    let mut arriving: Option<&Reservation> = None;

    for reservation in on_room {
        match reservation.status {
            ReservationStatus::CheckedIn if reservation.covers(today) => {
                occupying.get_or_insert(reservation);
            }
            ReservationStatus::Confirmed if reservation.check_in_date == today => {
                arriving.get_or_insert(reservation);
            }
            _ => {}
        }
    }

    let display_status = if occupying.is_some() {
        RoomStatus::Occupied
    } else if arriving.is_some() {
        RoomStatus::Available
    } else {
        room.status
    };

    RoomProjection {
        room_id: room.id.clone(),
        room_number: room.room_number.clone(),
        stored_status: room.status,
        display_status,
        occupying_guest_id: occupying.and_then(|r| r.guest_id.clone()),
        occupying_reservation_id: occupying.map(|r| r.id.clone()),
        arriving_guest_id: arriving.and_then(|r| r.guest_id.clone()),
        arriving_reservation_id: arriving.map(|r| r.id.clone()),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
