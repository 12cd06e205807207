//! # Seed Data Generator
//!
//! Populates a database with demo hotels for dashboard development.
//!
//! ## Usage
//! ```bash
//! # 12 months of history (default)
//! cargo run -p hotelier-db --bin seed
//!
//! # Longer history, custom file
//! cargo run -p hotelier-db --bin seed -- --months 24 --db ./data/hotelier.db
//! ```
//!
//! ## Generated Data
//! - Two hotels, three room types each, six rooms per floor on three floors
//! - Month-end FX rates for every month except the current one, so the
//!   dashboard's "rate unavailable" path is visible
//! - Monthly statistics per hotel
//! - A handful of live reservations around today, created through the
//!   booking flow (arrivals, in-house guests, a cancellation)

use chrono::{Duration, NaiveDate, Utc};
use hotelier_core::{
    BookingChannel, BookingConfig, FxRate, GuestInput, Hotel, MonthlyStats, ReservationInput,
    ReservationService, ReservationStatus, Room, RoomStatus, RoomType, YearMonth,
};
use hotelier_db::{Database, DbConfig, SqliteStore};
use rust_decimal::Decimal;
use std::env;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// (name, city, brand colour)
const HOTELS: &[(&str, &str, &str)] = &[
    ("Grand Harbour", "Antalya", "#1f6f8b"),
    ("Old Town Inn", "Istanbul", "#8b3a1f"),
];

/// (name, base rate in cents, max occupancy, amenities)
const ROOM_TYPES: &[(&str, i64, i64, &[&str])] = &[
    ("Standard", 8990, 2, &["wifi", "tv"]),
    ("Deluxe", 12900, 3, &["wifi", "tv", "minibar"]),
    ("Suite", 21900, 4, &["wifi", "tv", "minibar", "balcony", "bathtub"]),
];

const CHANNELS: &[&str] = &["booking_com", "direct", "expedia", "airbnb"];

const FLOORS: i64 = 3;
const ROOMS_PER_FLOOR: i64 = 6;

/// (first, last, channel)
const GUESTS: &[(&str, &str, BookingChannel)] = &[
    ("Ayse", "Yilmaz", BookingChannel::Direct),
    ("Jonas", "Becker", BookingChannel::BookingCom),
    ("Maria", "Rossi", BookingChannel::Expedia),
    ("Emre", "Kaya", BookingChannel::Phone),
    ("Sofia", "Novak", BookingChannel::Airbnb),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args: Vec<String> = env::args().collect();

    let mut months: u32 = 12;
    let mut db_path: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--months" | "-m" => {
                if i + 1 < args.len() {
                    months = args[i + 1].parse().unwrap_or(12).max(1);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Hotelier Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -m, --months <N>   Months of history to generate (default: 12)");
                println!("  -d, --db <PATH>    Database file path (default: $HOTELIER_DB_PATH or ./hotelier.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            other => warn!(argument = %other, "Ignoring unknown argument"),
        }
        i += 1;
    }

    let config = match db_path {
        Some(path) => DbConfig::new(path),
        None => DbConfig::from_env(),
    };

    println!("🌱 Hotelier Seed Data Generator");
    println!("===============================");
    println!("Database: {}", config.database_path.display());
    println!("Months:   {}", months);
    println!();

    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.hotels().list().await?;
    if !existing.is_empty() {
        println!("⚠ Database already has {} hotels", existing.len());
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let today = Utc::now().date_naive();
    let current = YearMonth::from_date(today);
    let history = month_range(current, months);

    let start = std::time::Instant::now();

    let rates = seed_fx_rates(&db, &history, current).await?;
    println!("✓ {} month-end FX rates (none for {})", rates, current);

    let bookings = ReservationService::new(Arc::new(db.store()), BookingConfig::from_env());

    for (hotel_idx, (name, city, color)) in HOTELS.iter().enumerate() {
        let hotel = db
            .hotels()
            .insert(&Hotel {
                id: Uuid::new_v4().to_string(),
                name: name.to_string(),
                city: Some(city.to_string()),
                brand_color: Some(color.to_string()),
            })
            .await?;

        let rooms = seed_rooms(&db, &hotel.id, hotel_idx).await?;
        let stats = seed_monthly_stats(&db, &hotel.id, &history, hotel_idx).await?;
        let live = seed_reservations(&bookings, &hotel.id, &rooms, today).await?;

        println!(
            "✓ {}: {} rooms, {} months of stats, {} live reservations",
            hotel.name,
            rooms.len(),
            stats,
            live
        );
    }

    println!();
    println!("✓ Seed complete in {:?}", start.elapsed());

    Ok(())
}

/// Initializes the tracing subscriber.
///
/// Default filter: `info,hotelier=debug,sqlx=warn`; `RUST_LOG` overrides it.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,hotelier=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// The `count` months ending with `current`, oldest first.
fn month_range(current: YearMonth, count: u32) -> Vec<YearMonth> {
    let mut months = Vec::with_capacity(count as usize);
    let mut month = current;
    for _ in 0..count {
        months.push(month);
        month = YearMonth::from_date(month.first_day() - Duration::days(1));
    }
    months.reverse();
    months
}

/// Writes a rate on the last day of every month but `current`.
async fn seed_fx_rates(
    db: &Database,
    history: &[YearMonth],
    current: YearMonth,
) -> Result<usize, Box<dyn std::error::Error>> {
    let mut written = 0;
    for (idx, month) in history.iter().enumerate() {
        if *month == current {
            continue;
        }
        let step = Decimal::from(idx as i64);
        db.analytics()
            .upsert_fx_rate(&FxRate {
                rate_date: month.last_day(),
                eur_to_usd: Decimal::new(1050, 3) + step * Decimal::new(4, 3),
                eur_to_try: Decimal::new(3000, 2) + step * Decimal::new(75, 2),
            })
            .await?;
        written += 1;
    }
    Ok(written)
}

async fn seed_rooms(
    db: &Database,
    hotel_id: &str,
    hotel_idx: usize,
) -> Result<Vec<Room>, Box<dyn std::error::Error>> {
    let mut types = Vec::new();
    for (name, rate, occupancy, amenities) in ROOM_TYPES {
        let room_type = RoomType {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            description: None,
            // Second hotel is priced 10% lower
            base_rate_cents: rate - (rate / 10) * hotel_idx as i64,
            max_occupancy: *occupancy,
            amenities: amenities.iter().map(|a| a.to_string()).collect(),
        };
        types.push(db.rooms().insert_room_type(hotel_id, &room_type).await?);
    }

    let mut rooms = Vec::new();
    for floor in 1..=FLOORS {
        for n in 1..=ROOMS_PER_FLOOR {
            // Standard rooms first, a suite at the end of each corridor
            let room_type = match n {
                ROOMS_PER_FLOOR => &types[2],
                n if n > 3 => &types[1],
                _ => &types[0],
            };
            let status = match (floor + n) % 7 {
                0 => RoomStatus::Dirty,
                3 if floor == FLOORS => RoomStatus::Maintenance,
                _ => RoomStatus::Clean,
            };
            let room = Room {
                id: Uuid::new_v4().to_string(),
                hotel_id: hotel_id.to_string(),
                room_number: format!("{}{:02}", floor, n),
                room_type_id: Some(room_type.id.clone()),
                floor: Some(floor),
                status,
                notes: None,
            };
            rooms.push(db.rooms().insert(&room).await?);
        }
    }

    Ok(rooms)
}

async fn seed_monthly_stats(
    db: &Database,
    hotel_id: &str,
    history: &[YearMonth],
    hotel_idx: usize,
) -> Result<usize, Box<dyn std::error::Error>> {
    for (idx, month) in history.iter().enumerate() {
        let seed = (idx * 7 + hotel_idx * 13) as i64;
        // Summer peak
        let season = match month.month() {
            6..=8 => 40,
            4 | 5 | 9 => 20,
            _ => 0,
        };
        let total_bookings = 60 + season + (seed * 11) % 35;
        let adr_eur = Decimal::new(9500 + (seed * 137) % 4000 + season * 50, 2);
        let average_nights = Decimal::new(27, 1);

        db.analytics()
            .upsert_monthly_stats(&MonthlyStats {
                id: Uuid::new_v4().to_string(),
                hotel_id: hotel_id.to_string(),
                month_start: month.first_day(),
                total_bookings,
                total_revenue_eur: (adr_eur * Decimal::from(total_bookings) * average_nights)
                    .round_dp(2),
                adr_eur,
                strongest_channel: CHANNELS[(idx + hotel_idx) % CHANNELS.len()].to_string(),
            })
            .await?;
    }
    Ok(history.len())
}

/// Arrivals today, in-house guests and one cancellation, created through
/// the booking flow so they carry real confirmation numbers.
async fn seed_reservations(
    bookings: &ReservationService<SqliteStore>,
    hotel_id: &str,
    rooms: &[Room],
    today: NaiveDate,
) -> Result<usize, Box<dyn std::error::Error>> {
    let sellable: Vec<&Room> = rooms.iter().filter(|r| r.status.is_sellable()).collect();
    let mut created = 0;

    for (idx, (room, (first, last, channel))) in sellable.iter().zip(GUESTS).enumerate() {
        // Even: arriving today; odd: arrived yesterday and checked in
        let check_in = if idx % 2 == 0 { today } else { today - Duration::days(1) };
        let nights = 2 + (idx as i64 % 3);

        let mut stay = ReservationInput::new(room.id.clone(), check_in, check_in + Duration::days(nights));
        stay.channel = *channel;
        if *channel != BookingChannel::Direct && *channel != BookingChannel::Phone {
            stay.commission_rate_bps = 1500;
        }

        let guest = GuestInput {
            first_name: first.to_string(),
            last_name: last.to_string(),
            email: Some(format!(
                "{}.{}@example.com",
                first.to_lowercase(),
                last.to_lowercase()
            )),
            ..GuestInput::default()
        };

        let reservation = bookings.create_reservation(hotel_id, guest, stay).await?;
        created += 1;

        let next = match idx {
            1 | 3 => Some(ReservationStatus::CheckedIn),
            4 => Some(ReservationStatus::Cancelled),
            _ => None,
        };
        if let Some(status) = next {
            bookings
                .transition_status(hotel_id, &reservation.id, status)
                .await?;
        }

        info!(
            confirmation = %reservation.confirmation_number,
            room = %room.room_number,
            "Seeded reservation"
        );
    }

    Ok(created)
}
