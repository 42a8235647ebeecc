//! Venue catalog.

use crate::rows::{self, VENUE_COLUMNS, to_db_int};
use crate::{PostgresStore, is_foreign_key_violation, storage};
use async_trait::async_trait;
use venue_booking_core::providers::VenueRepository;
use venue_booking_core::{BookingError, Result, Venue, VenueFilter, VenueId};

#[async_trait]
impl VenueRepository for PostgresStore {
    #[tracing::instrument(skip(self, venue), fields(venue_id = %venue.id))]
    async fn create(&self, venue: &Venue) -> Result<Venue> {
        let sql = format!(
            "INSERT INTO venues ({VENUE_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             RETURNING {VENUE_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(venue.id.as_uuid())
            .bind(&venue.name)
            .bind(&venue.location)
            .bind(&venue.description)
            .bind(to_db_int(venue.capacity, "capacity")?)
            .bind(venue.price_per_day)
            .bind(&venue.category)
            .bind(venue.owner_id.as_uuid())
            .bind(&venue.image_urls)
            .bind(venue.is_active)
            .bind(venue.created_at)
            .bind(venue.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(storage("Failed to create venue"))?;

        rows::venue(&row)
    }

    async fn get(&self, id: VenueId) -> Result<Venue> {
        let sql = format!("SELECT {VENUE_COLUMNS} FROM venues WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(storage("Failed to get venue"))?
            .ok_or_else(|| BookingError::not_found("Venue", id))?;

        rows::venue(&row)
    }

    async fn list(&self, filter: &VenueFilter) -> Result<Vec<Venue>> {
        let sql = format!(
            "SELECT {VENUE_COLUMNS} FROM venues \
             WHERE ($1::TEXT IS NULL OR lower(category) = lower($1)) \
               AND (NOT $2 OR is_active) \
             ORDER BY name, id"
        );
        let rows = sqlx::query(&sql)
            .bind(filter.category.as_deref())
            .bind(filter.active_only)
            .fetch_all(&self.pool)
            .await
            .map_err(storage("Failed to list venues"))?;

        rows.iter().map(rows::venue).collect()
    }

    #[tracing::instrument(skip(self, venue), fields(venue_id = %venue.id))]
    async fn update(&self, venue: &Venue) -> Result<Venue> {
        let sql = format!(
            "UPDATE venues SET name = $2, location = $3, description = $4, capacity = $5, \
                 price_per_day = $6, category = $7, image_urls = $8, is_active = $9, \
                 updated_at = $10 \
             WHERE id = $1 \
             RETURNING {VENUE_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(venue.id.as_uuid())
            .bind(&venue.name)
            .bind(&venue.location)
            .bind(&venue.description)
            .bind(to_db_int(venue.capacity, "capacity")?)
            .bind(venue.price_per_day)
            .bind(&venue.category)
            .bind(&venue.image_urls)
            .bind(venue.is_active)
            .bind(venue.updated_at)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage("Failed to update venue"))?
            .ok_or_else(|| BookingError::not_found("Venue", venue.id))?;

        rows::venue(&row)
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, id: VenueId) -> Result<()> {
        let result = sqlx::query("DELETE FROM venues WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    BookingError::VenueInUse {
                        venue: id.to_string(),
                    }
                } else {
                    storage("Failed to delete venue")(e)
                }
            })?;

        if result.rows_affected() == 0 {
            return Err(BookingError::not_found("Venue", id));
        }
        Ok(())
    }
}
