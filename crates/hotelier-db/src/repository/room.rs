//! # Room Repository
//!
//! Rooms and their room types.
//!
//! ```text
//!   room_types (hotel_id, base_rate_cents, amenities JSON)
//!        ▲
//!        │ room_type_id (nullable)
//!   rooms (hotel_id, room_number UNIQUE per hotel, status)
//! ```
//!
//! A room's `status` column is the housekeeping state; occupancy is derived
//! from reservations by `hotelier_core::projection`.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use hotelier_core::{Room, RoomDetails, RoomStatus, RoomType};

const ROOM_COLUMNS: &str = "id, hotel_id, room_number, room_type_id, floor, status, notes";

/// Row shape of `room_types`; amenities are a JSON array.
#[derive(Debug, sqlx::FromRow)]
struct RoomTypeRow {
    id: String,
    name: String,
    description: Option<String>,
    base_rate_cents: i64,
    max_occupancy: i64,
    amenities: String,
}

impl TryFrom<RoomTypeRow> for RoomType {
    type Error = DbError;

    fn try_from(row: RoomTypeRow) -> Result<Self, Self::Error> {
        let amenities: Vec<String> = serde_json::from_str(&row.amenities)
            .map_err(|_| DbError::invalid_data("room_types.amenities", row.amenities.clone()))?;

        Ok(RoomType {
            id: row.id,
            name: row.name,
            description: row.description,
            base_rate_cents: row.base_rate_cents,
            max_occupancy: row.max_occupancy,
            amenities,
        })
    }
}

/// Repository for room and room type operations.
#[derive(Debug, Clone)]
pub struct RoomRepository {
    pool: SqlitePool,
}

impl RoomRepository {
    pub fn new(pool: SqlitePool) -> Self {
        RoomRepository { pool }
    }

    // -------------------------------------------------------------------------
    // Room types
    // -------------------------------------------------------------------------

    pub async fn insert_room_type(&self, hotel_id: &str, room_type: &RoomType) -> DbResult<RoomType> {
        debug!(hotel_id = %hotel_id, name = %room_type.name, "Inserting room type");

        let amenities = serde_json::to_string(&room_type.amenities)
            .map_err(|e| DbError::Internal(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO room_types (
                id, hotel_id, name, description, base_rate_cents, max_occupancy, amenities
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&room_type.id)
        .bind(hotel_id)
        .bind(&room_type.name)
        .bind(&room_type.description)
        .bind(room_type.base_rate_cents)
        .bind(room_type.max_occupancy)
        .bind(amenities)
        .execute(&self.pool)
        .await?;

        Ok(room_type.clone())
    }

    /// A room type of `hotel_id`. Types of other hotels are not returned.
    pub async fn get_room_type(&self, hotel_id: &str, id: &str) -> DbResult<Option<RoomType>> {
        let row = sqlx::query_as::<_, RoomTypeRow>(
            r#"
            SELECT id, name, description, base_rate_cents, max_occupancy, amenities
            FROM room_types
            WHERE hotel_id = ?1 AND id = ?2
            "#,
        )
        .bind(hotel_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(RoomType::try_from).transpose()
    }

    pub async fn list_room_types(&self, hotel_id: &str) -> DbResult<Vec<RoomType>> {
        let rows = sqlx::query_as::<_, RoomTypeRow>(
            r#"
            SELECT id, name, description, base_rate_cents, max_occupancy, amenities
            FROM room_types
            WHERE hotel_id = ?1
            ORDER BY base_rate_cents, name
            "#,
        )
        .bind(hotel_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(RoomType::try_from).collect()
    }

    // -------------------------------------------------------------------------
    // Rooms
    // -------------------------------------------------------------------------

    /// Inserts a new room.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - room number already used in the hotel
    pub async fn insert(&self, room: &Room) -> DbResult<Room> {
        debug!(hotel_id = %room.hotel_id, room_number = %room.room_number, "Inserting room");

        sqlx::query(
            r#"
            INSERT INTO rooms (id, hotel_id, room_number, room_type_id, floor, status, notes)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&room.id)
        .bind(&room.hotel_id)
        .bind(&room.room_number)
        .bind(&room.room_type_id)
        .bind(room.floor)
        .bind(room.status)
        .bind(&room.notes)
        .execute(&self.pool)
        .await?;

        Ok(room.clone())
    }

    /// A room of `hotel_id`. Rooms of other hotels are invisible.
    pub async fn get_by_id(&self, hotel_id: &str, id: &str) -> DbResult<Option<Room>> {
        let room = sqlx::query_as::<_, Room>(&format!(
            "SELECT {ROOM_COLUMNS} FROM rooms WHERE id = ?1 AND hotel_id = ?2"
        ))
        .bind(id)
        .bind(hotel_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(room)
    }

    /// A room together with its room type.
    pub async fn find_details(&self, hotel_id: &str, id: &str) -> DbResult<Option<RoomDetails>> {
        let Some(room) = self.get_by_id(hotel_id, id).await? else {
            return Ok(None);
        };

        let room_type = match &room.room_type_id {
            Some(type_id) => self.get_room_type(hotel_id, type_id).await?,
            None => None,
        };

        Ok(Some(RoomDetails { room, room_type }))
    }

    /// Rooms of the hotel ordered by room number.
    pub async fn list_by_hotel(&self, hotel_id: &str) -> DbResult<Vec<Room>> {
        let rooms = sqlx::query_as::<_, Room>(&format!(
            "SELECT {ROOM_COLUMNS} FROM rooms WHERE hotel_id = ?1 ORDER BY room_number"
        ))
        .bind(hotel_id)
        .fetch_all(&self.pool)
        .await?;

        debug!(hotel_id = %hotel_id, count = rooms.len(), "Listed rooms");
        Ok(rooms)
    }

    /// Sets the housekeeping status of a room.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - no such room in the hotel
    pub async fn update_status(&self, hotel_id: &str, id: &str, status: RoomStatus) -> DbResult<Room> {
        debug!(room_id = %id, status = %status, "Updating room status");

        let result = sqlx::query("UPDATE rooms SET status = ?3 WHERE id = ?1 AND hotel_id = ?2")
            .bind(id)
            .bind(hotel_id)
            .bind(status)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Room", id));
        }

        self.get_by_id(hotel_id, id)
            .await?
            .ok_or_else(|| DbError::not_found("Room", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{room, seeded_db, HOTEL, OTHER_HOTEL};

    #[tokio::test]
    async fn test_find_details_includes_room_type() {
        let db = seeded_db().await;

        let details = db.rooms().find_details(HOTEL, "room-101").await.unwrap().unwrap();
        assert_eq!(details.room.room_number, "101");
        let room_type = details.room_type.unwrap();
        assert_eq!(room_type.base_rate_cents, 10000);
        assert_eq!(room_type.amenities, vec!["wifi", "minibar"]);
    }

    #[tokio::test]
    async fn test_room_type_is_scoped_to_hotel() {
        let db = seeded_db().await;

        let found = db.rooms().get_room_type(HOTEL, "type-double").await.unwrap();
        assert_eq!(found.map(|t| t.name).as_deref(), Some("Double"));

        assert!(db
            .rooms()
            .get_room_type(OTHER_HOTEL, "type-double")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_rooms_are_scoped_to_hotel() {
        let db = seeded_db().await;

        assert!(db.rooms().find_details(OTHER_HOTEL, "room-101").await.unwrap().is_none());

        let numbers: Vec<String> = db
            .rooms()
            .list_by_hotel(HOTEL)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.room_number)
            .collect();
        assert_eq!(numbers, vec!["101", "102"]);
    }

    #[tokio::test]
    async fn test_room_number_unique_per_hotel() {
        let db = seeded_db().await;

        let err = db
            .rooms()
            .insert(&room("room-dup", HOTEL, "101", None))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));

        // Same number in another hotel is fine
        db.rooms()
            .insert(&room("room-other-101", OTHER_HOTEL, "101", None))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_update_status() {
        let db = seeded_db().await;

        let updated = db
            .rooms()
            .update_status(HOTEL, "room-102", RoomStatus::Maintenance)
            .await
            .unwrap();
        assert_eq!(updated.status, RoomStatus::Maintenance);

        let err = db
            .rooms()
            .update_status(OTHER_HOTEL, "room-102", RoomStatus::Clean)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
