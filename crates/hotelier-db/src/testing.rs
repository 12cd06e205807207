//! Fixtures for the database tests.
//!
//! `seeded_db()` builds:
//! ```text
//!   hotel-1 ── type-double (100.00/night) ── room-101, room-102   guest-1
//!   hotel-2 ─────────────────────────────── room-201             guest-2
//! ```

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;

use crate::pool::{Database, DbConfig};
use hotelier_core::{
    BookingChannel, Guest, GuestType, Hotel, MonthlyStats, Reservation, ReservationStatus, Room,
    RoomStatus, RoomType, YearMonth,
};

pub const HOTEL: &str = "hotel-1";
pub const OTHER_HOTEL: &str = "hotel-2";

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).unwrap()
}

pub fn hotel(id: &str, name: &str) -> Hotel {
    Hotel {
        id: id.to_string(),
        name: name.to_string(),
        city: Some("Antalya".to_string()),
        brand_color: None,
    }
}

pub fn room_type(id: &str, base_rate_cents: i64) -> RoomType {
    RoomType {
        id: id.to_string(),
        name: "Double".to_string(),
        description: None,
        base_rate_cents,
        max_occupancy: 2,
        amenities: vec!["wifi".to_string(), "minibar".to_string()],
    }
}

pub fn room(id: &str, hotel_id: &str, room_number: &str, room_type_id: Option<&str>) -> Room {
    Room {
        id: id.to_string(),
        hotel_id: hotel_id.to_string(),
        room_number: room_number.to_string(),
        room_type_id: room_type_id.map(str::to_string),
        floor: Some(1),
        status: RoomStatus::Clean,
        notes: None,
    }
}

pub fn guest(id: &str, hotel_id: &str) -> Guest {
    Guest {
        id: id.to_string(),
        hotel_id: hotel_id.to_string(),
        first_name: "Ana".to_string(),
        last_name: "Silva".to_string(),
        email: Some("ana@example.com".to_string()),
        phone: None,
        id_number: None,
        nationality: Some("PT".to_string()),
        date_of_birth: Some(date(1990, 4, 2)),
        address: None,
        city: None,
        country: None,
        guest_type: GuestType::Individual,
        vip: false,
        notes: None,
        created_at: fixed_time(),
    }
}

pub fn reservation(
    id: &str,
    hotel_id: &str,
    guest_id: &str,
    room_id: &str,
    check_in: NaiveDate,
    check_out: NaiveDate,
) -> Reservation {
    Reservation {
        id: id.to_string(),
        hotel_id: hotel_id.to_string(),
        guest_id: Some(guest_id.to_string()),
        room_id: Some(room_id.to_string()),
        room_type_id: None,
        confirmation_number: format!("RES-TEST-{}", id.to_uppercase()),
        check_in_date: check_in,
        check_out_date: check_out,
        adults: 2,
        children: 0,
        total_amount_cents: 20000,
        paid_amount_cents: 0,
        currency: "EUR".to_string(),
        status: ReservationStatus::Confirmed,
        channel: BookingChannel::Direct,
        commission_rate_bps: 0,
        special_requests: None,
        arrival_time: Some("14:00".to_string()),
        created_at: fixed_time(),
        updated_at: fixed_time(),
    }
}

pub fn monthly_stats(
    hotel_id: &str,
    month: &str,
    total_bookings: i64,
    total_revenue_eur: Decimal,
    adr_eur: Decimal,
) -> MonthlyStats {
    let month: YearMonth = month.parse().unwrap();
    MonthlyStats {
        id: format!("stats-{hotel_id}-{month}"),
        hotel_id: hotel_id.to_string(),
        month_start: month.first_day(),
        total_bookings,
        total_revenue_eur,
        adr_eur,
        strongest_channel: "booking_com".to_string(),
    }
}

/// In-memory database with two hotels, their rooms and one guest each.
pub async fn seeded_db() -> Database {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();

    db.hotels().insert(&hotel(HOTEL, "Grand Harbour")).await.unwrap();
    db.hotels().insert(&hotel(OTHER_HOTEL, "Old Town Inn")).await.unwrap();

    db.rooms()
        .insert_room_type(HOTEL, &room_type("type-double", 10000))
        .await
        .unwrap();
    for (id, hotel_id, number, type_id) in [
        ("room-101", HOTEL, "101", Some("type-double")),
        ("room-102", HOTEL, "102", Some("type-double")),
        ("room-201", OTHER_HOTEL, "201", None),
    ] {
        db.rooms().insert(&room(id, hotel_id, number, type_id)).await.unwrap();
    }

    db.guests().insert(&guest("guest-1", HOTEL)).await.unwrap();
    db.guests().insert(&guest("guest-2", OTHER_HOTEL)).await.unwrap();

    db
}
