//! # Hotel Repository
//!
//! Properties are the root scope of every other row.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use hotelier_core::Hotel;

/// Repository for hotel database operations.
#[derive(Debug, Clone)]
pub struct HotelRepository {
    pool: SqlitePool,
}

impl HotelRepository {
    pub fn new(pool: SqlitePool) -> Self {
        HotelRepository { pool }
    }

    /// Inserts a new hotel.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - ID already exists
    pub async fn insert(&self, hotel: &Hotel) -> DbResult<Hotel> {
        debug!(id = %hotel.id, name = %hotel.name, "Inserting hotel");

        sqlx::query("INSERT INTO hotels (id, name, city, brand_color) VALUES (?1, ?2, ?3, ?4)")
            .bind(&hotel.id)
            .bind(&hotel.name)
            .bind(&hotel.city)
            .bind(&hotel.brand_color)
            .execute(&self.pool)
            .await?;

        Ok(hotel.clone())
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Hotel>> {
        let hotel = sqlx::query_as::<_, Hotel>(
            "SELECT id, name, city, brand_color FROM hotels WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(hotel)
    }

    /// All hotels ordered by name (the dashboard's hotel picker).
    pub async fn list(&self) -> DbResult<Vec<Hotel>> {
        let hotels = sqlx::query_as::<_, Hotel>(
            "SELECT id, name, city, brand_color FROM hotels ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(hotels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::testing::hotel;

    #[tokio::test]
    async fn test_insert_and_list() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.hotels();

        repo.insert(&hotel("hotel-b", "Seaside")).await.unwrap();
        repo.insert(&hotel("hotel-a", "Alpine Lodge")).await.unwrap();

        let names: Vec<String> = repo.list().await.unwrap().into_iter().map(|h| h.name).collect();
        assert_eq!(names, vec!["Alpine Lodge", "Seaside"]);

        let found = repo.get_by_id("hotel-b").await.unwrap().unwrap();
        assert_eq!(found.city.as_deref(), Some("Antalya"));
        assert!(repo.get_by_id("missing").await.unwrap().is_none());
    }
}
