//! # Domain Types
//!
//! Core domain types shared by the booking flow, the room board and the
//! analytics screens.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Hotel       │   │      Room       │   │   Reservation   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │──►│  hotel_id (FK)  │◄──│  room_id (FK?)  │       │
//! │  │  name, city     │   │  room_number    │   │  guest_id (FK?) │       │
//! │  └─────────────────┘   │  status         │   │  confirmation_# │       │
//! │                        └─────────────────┘   │  check_in/out   │       │
//! │  ┌─────────────────┐   ┌─────────────────┐   │  status/channel │       │
//! │  │    RoomType     │   │     Guest       │   └─────────────────┘       │
//! │  │  base_rate      │   │  hotel_id (FK)  │                              │
//! │  │  max_occupancy  │   │  guest_type,vip │   MonthlyStats · FxRate      │
//! │  └─────────────────┘   └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has an immutable `id` (UUID v4) used for relations. A
//! reservation additionally carries a human-readable `confirmation_number`
//! that is unique across the whole store.
//!
//! ## Closed Enums
//! Every status column is a closed enum so that status derivation and the
//! reservation state machine are checked exhaustively by the compiler.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Commission Rate
// =============================================================================

/// Channel commission represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01%. The booking form accepts 0–100 %, which maps to
/// 0–10000 bps; 1500 bps = 15% (a typical OTA commission).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CommissionRate(u32);

impl CommissionRate {
    /// Creates a commission rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        CommissionRate(bps)
    }

    /// Creates a commission rate from a percentage (form input).
    pub fn from_percentage(pct: f64) -> Self {
        CommissionRate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero commission (direct bookings, walk-ins).
    #[inline]
    pub const fn zero() -> Self {
        CommissionRate(0)
    }
}

impl Default for CommissionRate {
    fn default() -> Self {
        CommissionRate::zero()
    }
}

// =============================================================================
// Hotel
// =============================================================================

/// A property. Root scope for every other entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Hotel {
    pub id: String,
    pub name: String,
    pub city: Option<String>,
    /// Accent colour used by the dashboard header.
    pub brand_color: Option<String>,
}

// =============================================================================
// Room Type
// =============================================================================

/// A category of room with its nightly base rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RoomType {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    /// Nightly base rate in cents of the hotel currency.
    pub base_rate_cents: i64,
    pub max_occupancy: i64,
    pub amenities: Vec<String>,
}

impl RoomType {
    /// Returns the nightly base rate as Money.
    #[inline]
    pub fn base_rate(&self) -> Money {
        Money::from_cents(self.base_rate_cents)
    }
}

// =============================================================================
// Room Status
// =============================================================================

/// Stored housekeeping / operational state of a room.
///
/// This is NOT occupancy. Occupancy is derived by
/// [`crate::projection::project_status`] from reservations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    Available,
    Occupied,
    OutOfOrder,
    Maintenance,
    Dirty,
    Clean,
}

impl RoomStatus {
    /// Database / wire representation.
    pub const fn as_str(&self) -> &'static str {
        match self {
            RoomStatus::Available => "available",
            RoomStatus::Occupied => "occupied",
            RoomStatus::OutOfOrder => "out_of_order",
            RoomStatus::Maintenance => "maintenance",
            RoomStatus::Dirty => "dirty",
            RoomStatus::Clean => "clean",
        }
    }

    /// Whether the front desk may put a new booking into this room.
    ///
    /// Mirrors the room picker of the reservation form.
    pub const fn is_sellable(&self) -> bool {
        matches!(self, RoomStatus::Available | RoomStatus::Clean)
    }
}

impl Default for RoomStatus {
    fn default() -> Self {
        RoomStatus::Available
    }
}

impl fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Room
// =============================================================================

/// A physical room. `room_number` is unique within its hotel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Room {
    pub id: String,
    pub hotel_id: String,
    pub room_number: String,
    pub room_type_id: Option<String>,
    pub floor: Option<i64>,
    pub status: RoomStatus,
    pub notes: Option<String>,
}

/// A room together with its (optional) room type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RoomDetails {
    pub room: Room,
    pub room_type: Option<RoomType>,
}

// =============================================================================
// Guest
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum GuestType {
    Individual,
    Group,
    Corporate,
}

impl Default for GuestType {
    fn default() -> Self {
        GuestType::Individual
    }
}

/// A guest profile, scoped to one hotel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Guest {
    pub id: String,
    pub hotel_id: String,
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
    pub guest_type: GuestType,
    pub vip: bool,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Guest {
    /// "First Last", as shown on the room board.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

// =============================================================================
// Reservation Status
// =============================================================================

/// Lifecycle state of a reservation.
///
/// ## State Machine
/// ```text
///                ┌──────────► CheckedIn ──────► CheckedOut
///                │
///   Confirmed ───┼──────────► Cancelled
///                │
///                └──────────► NoShow
/// ```
/// `CheckedOut`, `Cancelled` and `NoShow` are terminal and release the room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    Confirmed,
    CheckedIn,
    CheckedOut,
    Cancelled,
    NoShow,
}

impl ReservationStatus {
    /// Statuses that no longer hold the room.
    pub const RELEASED: [ReservationStatus; 3] = [
        ReservationStatus::Cancelled,
        ReservationStatus::NoShow,
        ReservationStatus::CheckedOut,
    ];

    /// Whether a reservation in this status blocks its room for its dates.
    pub const fn holds_room(&self) -> bool {
        matches!(
            self,
            ReservationStatus::Confirmed | ReservationStatus::CheckedIn
        )
    }

    /// Whether `self -> next` is a legal transition.
    pub const fn can_transition_to(&self, next: ReservationStatus) -> bool {
        use ReservationStatus::*;
        matches!(
            (self, next),
            (Confirmed, CheckedIn)
                | (Confirmed, Cancelled)
                | (Confirmed, NoShow)
                | (CheckedIn, CheckedOut)
        )
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Confirmed => "confirmed",
            ReservationStatus::CheckedIn => "checked_in",
            ReservationStatus::CheckedOut => "checked_out",
            ReservationStatus::Cancelled => "cancelled",
            ReservationStatus::NoShow => "no_show",
        }
    }
}

impl Default for ReservationStatus {
    fn default() -> Self {
        ReservationStatus::Confirmed
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Booking Channel
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum BookingChannel {
    Direct,
    BookingCom,
    Expedia,
    Airbnb,
    WalkIn,
    Phone,
}

impl Default for BookingChannel {
    fn default() -> Self {
        BookingChannel::Direct
    }
}

// =============================================================================
// Reservation
// =============================================================================

/// A booking of a room (or of a room type, when unassigned) for a stay.
///
/// Dates are half-open: the guest sleeps the nights
/// `check_in_date .. check_out_date`, so a stay ending on day D never
/// conflicts with one starting on day D.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Reservation {
    pub id: String,
    pub hotel_id: String,
    pub guest_id: Option<String>,
    pub room_id: Option<String>,
    pub room_type_id: Option<String>,
    /// Human-readable booking reference, unique across the store.
    pub confirmation_number: String,
    #[ts(as = "String")]
    pub check_in_date: NaiveDate,
    #[ts(as = "String")]
    pub check_out_date: NaiveDate,
    pub adults: i64,
    pub children: i64,
    /// Stay total in cents of `currency`.
    pub total_amount_cents: i64,
    /// Amount already collected, in cents of `currency`.
    pub paid_amount_cents: i64,
    /// ISO 4217 code, e.g. "EUR".
    pub currency: String,
    pub status: ReservationStatus,
    pub channel: BookingChannel,
    pub commission_rate_bps: i64,
    pub special_requests: Option<String>,
    /// Expected arrival time as entered by the front desk ("14:30").
    pub arrival_time: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Reservation {
    /// Number of nights in the stay.
    #[inline]
    pub fn nights(&self) -> i64 {
        (self.check_out_date - self.check_in_date).num_days()
    }

    /// Half-open overlap with `[check_in, check_out)`.
    #[inline]
    pub fn overlaps(&self, check_in: NaiveDate, check_out: NaiveDate) -> bool {
        crate::availability::ranges_overlap(
            self.check_in_date,
            self.check_out_date,
            check_in,
            check_out,
        )
    }

    /// Whether the guest is in house on `day`.
    #[inline]
    pub fn covers(&self, day: NaiveDate) -> bool {
        self.check_in_date <= day && day < self.check_out_date
    }

    /// Returns the stay total as Money.
    #[inline]
    pub fn total_amount(&self) -> Money {
        Money::from_cents(self.total_amount_cents)
    }

    /// Returns the collected amount as Money.
    #[inline]
    pub fn paid_amount(&self) -> Money {
        Money::from_cents(self.paid_amount_cents)
    }

    /// Outstanding balance (negative when over-paid).
    pub fn balance_due(&self) -> Money {
        self.total_amount() - self.paid_amount()
    }

    /// Commission owed to the booking channel on the stay total.
    pub fn commission(&self) -> Money {
        let rate = CommissionRate::from_bps(self.commission_rate_bps.max(0) as u32);
        self.total_amount().apply_rate(rate)
    }
}

// =============================================================================
// Analytics Types
// =============================================================================

/// Pre-computed monthly aggregate for one hotel, in EUR (canonical currency).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MonthlyStats {
    pub id: String,
    pub hotel_id: String,
    /// First day of the month.
    #[ts(as = "String")]
    pub month_start: NaiveDate,
    pub total_bookings: i64,
    #[ts(as = "String")]
    pub total_revenue_eur: Decimal,
    #[ts(as = "String")]
    pub adr_eur: Decimal,
    pub strongest_channel: String,
}

impl MonthlyStats {
    /// The month this row describes.
    pub fn month(&self) -> YearMonth {
        YearMonth::from_date(self.month_start)
    }
}

/// EUR-based exchange rates published for one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FxRate {
    #[ts(as = "String")]
    pub rate_date: NaiveDate,
    #[ts(as = "String")]
    pub eur_to_usd: Decimal,
    #[ts(as = "String")]
    pub eur_to_try: Decimal,
}

/// Currencies the dashboard can display aggregates in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum DisplayCurrency {
    Eur,
    Usd,
    Try,
}

impl DisplayCurrency {
    /// ISO 4217 code.
    pub const fn code(&self) -> &'static str {
        match self {
            DisplayCurrency::Eur => "EUR",
            DisplayCurrency::Usd => "USD",
            DisplayCurrency::Try => "TRY",
        }
    }
}

impl Default for DisplayCurrency {
    fn default() -> Self {
        DisplayCurrency::Eur
    }
}

impl FromStr for DisplayCurrency {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "eur" => Ok(DisplayCurrency::Eur),
            "usd" => Ok(DisplayCurrency::Usd),
            "try" => Ok(DisplayCurrency::Try),
            _ => Err(ValidationError::NotAllowed {
                field: "currency".to_string(),
                allowed: vec!["eur".to_string(), "usd".to_string(), "try".to_string()],
            }),
        }
    }
}

// =============================================================================
// Year-Month
// =============================================================================

/// A calendar month, written `YYYY-MM`.
///
/// Monthly stats are keyed by their first day, FX rates by the last day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    /// Creates a month, rejecting `month` outside 1..=12.
    pub fn new(year: i32, month: u32) -> Result<Self, ValidationError> {
        if !(1..=12).contains(&month) {
            return Err(ValidationError::OutOfRange {
                field: "month".to_string(),
                min: 1,
                max: 12,
            });
        }
        if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(ValidationError::InvalidFormat {
                field: "month".to_string(),
                reason: format!("year {} is out of range", year),
            });
        }
        Ok(YearMonth { year, month })
    }

    /// The month containing `date`.
    pub fn from_date(date: NaiveDate) -> Self {
        YearMonth {
            year: date.year(),
            month: date.month(),
        }
    }

    #[inline]
    pub const fn year(&self) -> i32 {
        self.year
    }

    #[inline]
    pub const fn month(&self) -> u32 {
        self.month
    }

    /// First calendar day of the month.
    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .unwrap_or(NaiveDate::MIN)
    }

    /// Last calendar day of the month (handles leap years).
    pub fn last_day(&self) -> NaiveDate {
        self.next().first_day().pred_opt().unwrap_or(NaiveDate::MAX)
    }

    /// The following month.
    pub fn next(&self) -> Self {
        if self.month == 12 {
            YearMonth {
                year: self.year + 1,
                month: 1,
            }
        } else {
            YearMonth {
                year: self.year,
                month: self.month + 1,
            }
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidFormat {
            field: "month".to_string(),
            reason: "expected YYYY-MM".to_string(),
        };

        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        YearMonth::new(year, month)
    }
}

impl TryFrom<String> for YearMonth {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<YearMonth> for String {
    fn from(value: YearMonth) -> Self {
        value.to_string()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_commission_rate_from_percentage() {
        let rate = CommissionRate::from_percentage(15.0);
        assert_eq!(rate.bps(), 1500);
        assert!((rate.percentage() - 15.0).abs() < 0.001);
    }

    #[test]
    fn test_reservation_status_transitions() {
        use ReservationStatus::*;
        assert!(Confirmed.can_transition_to(CheckedIn));
        assert!(Confirmed.can_transition_to(Cancelled));
        assert!(Confirmed.can_transition_to(NoShow));
        assert!(CheckedIn.can_transition_to(CheckedOut));

        assert!(!CheckedIn.can_transition_to(Cancelled));
        assert!(!CheckedOut.can_transition_to(CheckedIn));
        assert!(!Cancelled.can_transition_to(Confirmed));
        assert!(!NoShow.can_transition_to(CheckedIn));
        assert!(!Confirmed.can_transition_to(CheckedOut));
    }

    #[test]
    fn test_released_statuses_do_not_hold_room() {
        for status in ReservationStatus::RELEASED {
            assert!(!status.holds_room());
        }
        assert!(ReservationStatus::Confirmed.holds_room());
        assert!(ReservationStatus::CheckedIn.holds_room());
    }

    #[test]
    fn test_enum_wire_names() {
        assert_eq!(
            serde_json::to_string(&BookingChannel::BookingCom).unwrap(),
            "\"booking_com\""
        );
        assert_eq!(
            serde_json::to_string(&RoomStatus::OutOfOrder).unwrap(),
            "\"out_of_order\""
        );
        assert_eq!(ReservationStatus::NoShow.as_str(), "no_show");
    }

    #[test]
    fn test_year_month_last_day() {
        let feb_leap: YearMonth = "2024-02".parse().unwrap();
        assert_eq!(feb_leap.last_day(), date(2024, 2, 29));

        let feb: YearMonth = "2023-02".parse().unwrap();
        assert_eq!(feb.last_day(), date(2023, 2, 28));

        let dec: YearMonth = "2024-12".parse().unwrap();
        assert_eq!(dec.first_day(), date(2024, 12, 1));
        assert_eq!(dec.last_day(), date(2024, 12, 31));
    }

    #[test]
    fn test_year_month_parse_rejects_garbage() {
        assert!("2024-13".parse::<YearMonth>().is_err());
        assert!("2024".parse::<YearMonth>().is_err());
        assert!("abcd-01".parse::<YearMonth>().is_err());
        assert_eq!("2024-01".parse::<YearMonth>().unwrap().to_string(), "2024-01");
    }

    #[test]
    fn test_year_month_serde_as_string() {
        let month = YearMonth::new(2024, 3).unwrap();
        assert_eq!(serde_json::to_string(&month).unwrap(), "\"2024-03\"");
        let back: YearMonth = serde_json::from_str("\"2024-03\"").unwrap();
        assert_eq!(back, month);
    }

    #[test]
    fn test_display_currency_parse() {
        assert_eq!("USD".parse::<DisplayCurrency>().unwrap(), DisplayCurrency::Usd);
        assert_eq!("try".parse::<DisplayCurrency>().unwrap(), DisplayCurrency::Try);
        assert!("gbp".parse::<DisplayCurrency>().is_err());
    }
}
