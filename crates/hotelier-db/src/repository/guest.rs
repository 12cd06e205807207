//! # Guest Repository
//!
//! Guest profiles, scoped to one hotel. A reservation may only point at a
//! guest of its own hotel (enforced by the `reservations_guest_same_hotel_*`
//! triggers).

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use hotelier_core::Guest;

const GUEST_COLUMNS: &str = r#"
    id, hotel_id, first_name, last_name, email, phone, id_number, nationality,
    date_of_birth, address, city, country, guest_type, vip, notes, created_at
"#;

#[derive(Debug, Clone)]
pub struct GuestRepository {
    pool: SqlitePool,
}

impl GuestRepository {
    pub fn new(pool: SqlitePool) -> Self {
        GuestRepository { pool }
    }

    pub async fn insert(&self, guest: &Guest) -> DbResult<Guest> {
        debug!(id = %guest.id, hotel_id = %guest.hotel_id, "Inserting guest");

        sqlx::query(
            r#"
            INSERT INTO guests (
                id, hotel_id, first_name, last_name, email, phone, id_number, nationality,
                date_of_birth, address, city, country, guest_type, vip, notes, created_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8,
                ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16
            )
            "#,
        )
        .bind(&guest.id)
        .bind(&guest.hotel_id)
        .bind(&guest.first_name)
        .bind(&guest.last_name)
        .bind(&guest.email)
        .bind(&guest.phone)
        .bind(&guest.id_number)
        .bind(&guest.nationality)
        .bind(guest.date_of_birth)
        .bind(&guest.address)
        .bind(&guest.city)
        .bind(&guest.country)
        .bind(guest.guest_type)
        .bind(guest.vip)
        .bind(&guest.notes)
        .bind(guest.created_at)
        .execute(&self.pool)
        .await?;

        Ok(guest.clone())
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Guest>> {
        let guest = sqlx::query_as::<_, Guest>(&format!(
            "SELECT {GUEST_COLUMNS} FROM guests WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(guest)
    }

    /// Removes a guest.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - no such guest
    /// * `Err(DbError::ForeignKeyViolation)` - a reservation still references it
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting guest");

        let result = sqlx::query("DELETE FROM guests WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Guest", id));
        }

        Ok(())
    }

    pub async fn count_by_hotel(&self, hotel_id: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM guests WHERE hotel_id = ?1")
            .bind(hotel_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
