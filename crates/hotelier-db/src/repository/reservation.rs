//! # Reservation Repository
//!
//! Reservation rows plus the two schema guards that protect them.
//!
//! ## Guards
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  INSERT / UPDATE reservations                                          │
//! │       │                                                                 │
//! │       ├── UNIQUE(confirmation_number) ──► DbError::UniqueViolation     │
//! │       │                                                                 │
//! │       ├── reservations_no_overlap_* trigger                            │
//! │       │     same room, both confirmed/checked_in,                      │
//! │       │     a.in < b.out AND b.in < a.out   ──► DbError::OverlapViolation│
//! │       │                                                                 │
//! │       └── reservations_guest_same_hotel_* trigger                      │
//! │             guest.hotel_id != hotel_id      ──► ForeignKeyViolation    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! SQLite runs one writer at a time, so two bookings racing for the same
//! room cannot both pass the overlap trigger.

use chrono::{NaiveDate, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use hotelier_core::{Reservation, ReservationFilter, ReservationStatus};

const RESERVATION_COLUMNS: &str = r#"
    id, hotel_id, guest_id, room_id, room_type_id, confirmation_number,
    check_in_date, check_out_date, adults, children,
    total_amount_cents, paid_amount_cents, currency, status, channel,
    commission_rate_bps, special_requests, arrival_time, created_at, updated_at
"#;

#[derive(Debug, Clone)]
pub struct ReservationRepository {
    pool: SqlitePool,
}

impl ReservationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ReservationRepository { pool }
    }

    /// Inserts a new reservation.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - confirmation number taken
    /// * `Err(DbError::OverlapViolation)` - room already held for those nights
    /// * `Err(DbError::ForeignKeyViolation)` - unknown room/guest, or a guest of another hotel
    pub async fn insert(&self, reservation: &Reservation) -> DbResult<Reservation> {
        debug!(
            confirmation = %reservation.confirmation_number,
            room_id = ?reservation.room_id,
            check_in = %reservation.check_in_date,
            check_out = %reservation.check_out_date,
            "Inserting reservation"
        );

        sqlx::query(
            r#"
            INSERT INTO reservations (
                id, hotel_id, guest_id, room_id, room_type_id, confirmation_number,
                check_in_date, check_out_date, adults, children,
                total_amount_cents, paid_amount_cents, currency, status, channel,
                commission_rate_bps, special_requests, arrival_time, created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6,
                ?7, ?8, ?9, ?10,
                ?11, ?12, ?13, ?14, ?15,
                ?16, ?17, ?18, ?19, ?20
            )
            "#,
        )
        .bind(&reservation.id)
        .bind(&reservation.hotel_id)
        .bind(&reservation.guest_id)
        .bind(&reservation.room_id)
        .bind(&reservation.room_type_id)
        .bind(&reservation.confirmation_number)
        .bind(reservation.check_in_date)
        .bind(reservation.check_out_date)
        .bind(reservation.adults)
        .bind(reservation.children)
        .bind(reservation.total_amount_cents)
        .bind(reservation.paid_amount_cents)
        .bind(&reservation.currency)
        .bind(reservation.status)
        .bind(reservation.channel)
        .bind(reservation.commission_rate_bps)
        .bind(&reservation.special_requests)
        .bind(&reservation.arrival_time)
        .bind(reservation.created_at)
        .bind(reservation.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(reservation.clone())
    }

    /// A reservation of `hotel_id`. Reservations of other hotels are invisible.
    pub async fn get_by_id(&self, hotel_id: &str, id: &str) -> DbResult<Option<Reservation>> {
        let reservation = sqlx::query_as::<_, Reservation>(&format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations WHERE id = ?1 AND hotel_id = ?2"
        ))
        .bind(id)
        .bind(hotel_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(reservation)
    }

    /// Reservations of the hotel matching `filter`, ordered by arrival.
    ///
    /// Every part of the filter is pushed down into SQL.
    pub async fn query(&self, hotel_id: &str, filter: &ReservationFilter) -> DbResult<Vec<Reservation>> {
        let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new(format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations WHERE hotel_id = "
        ));
        qb.push_bind(hotel_id.to_string());

        if let Some(room_id) = &filter.room_id {
            qb.push(" AND room_id = ").push_bind(room_id.clone());
        }

        if !filter.exclude_statuses.is_empty() {
            qb.push(" AND status NOT IN (");
            let mut statuses = qb.separated(", ");
            for status in &filter.exclude_statuses {
                statuses.push_bind(status.as_str());
            }
            statuses.push_unseparated(")");
        }

        if let Some(id) = &filter.exclude_reservation_id {
            qb.push(" AND id <> ").push_bind(id.clone());
        }

        if let Some((check_in, check_out)) = filter.overlapping {
            // Half-open: existing.in < new.out AND new.in < existing.out
            qb.push(" AND check_in_date < ")
                .push_bind(check_out)
                .push(" AND check_out_date > ")
                .push_bind(check_in);
        }

        qb.push(" ORDER BY check_in_date, confirmation_number");

        let reservations = qb
            .build_query_as::<Reservation>()
            .fetch_all(&self.pool)
            .await?;

        debug!(hotel_id = %hotel_id, count = reservations.len(), "Queried reservations");
        Ok(reservations)
    }

    pub async fn confirmation_number_exists(&self, confirmation_number: &str) -> DbResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM reservations WHERE confirmation_number = ?1)",
        )
        .bind(confirmation_number)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    /// Writes a new status. The state machine is checked by the caller;
    /// re-entering a room-holding status still runs the overlap trigger.
    pub async fn update_status(
        &self,
        hotel_id: &str,
        id: &str,
        status: ReservationStatus,
    ) -> DbResult<Reservation> {
        debug!(reservation_id = %id, status = %status, "Updating reservation status");

        let result = sqlx::query(
            "UPDATE reservations SET status = ?3, updated_at = ?4 WHERE id = ?1 AND hotel_id = ?2",
        )
        .bind(id)
        .bind(hotel_id)
        .bind(status)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Reservation", id));
        }

        self.require(hotel_id, id).await
    }

    /// Moves a stay to new dates.
    ///
    /// ## Returns
    /// * `Err(DbError::OverlapViolation)` - the room is held for the new nights
    /// * `Err(DbError::ConstraintViolation)` - check-out not after check-in
    pub async fn update_dates(
        &self,
        hotel_id: &str,
        id: &str,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> DbResult<Reservation> {
        debug!(
            reservation_id = %id,
            check_in = %check_in,
            check_out = %check_out,
            "Updating reservation dates"
        );

        let result = sqlx::query(
            r#"
            UPDATE reservations
            SET check_in_date = ?3, check_out_date = ?4, updated_at = ?5
            WHERE id = ?1 AND hotel_id = ?2
            "#,
        )
        .bind(id)
        .bind(hotel_id)
        .bind(check_in)
        .bind(check_out)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Reservation", id));
        }

        self.require(hotel_id, id).await
    }

    pub async fn count_by_hotel(&self, hotel_id: &str) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM reservations WHERE hotel_id = ?1")
                .bind(hotel_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    async fn require(&self, hotel_id: &str, id: &str) -> DbResult<Reservation> {
        self.get_by_id(hotel_id, id)
            .await?
            .ok_or_else(|| DbError::not_found("Reservation", id))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
