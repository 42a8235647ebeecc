//! Saved venues (bookmarks).

use crate::rows;
use crate::{PostgresStore, is_foreign_key_violation, is_unique_violation, storage};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use venue_booking_core::providers::SavedVenueRepository;
use venue_booking_core::{BookingError, Result, SavedVenue, UserId, VenueId};

#[async_trait]
impl SavedVenueRepository for PostgresStore {
    #[tracing::instrument(skip(self, at))]
    async fn save(
        &self,
        user_id: UserId,
        venue_id: VenueId,
        at: DateTime<Utc>,
    ) -> Result<SavedVenue> {
        let row = sqlx::query(
            "INSERT INTO saved_venues (user_id, venue_id, saved_at) VALUES ($1, $2, $3) \
             RETURNING user_id, venue_id, saved_at",
        )
        .bind(user_id.as_uuid())
        .bind(venue_id.as_uuid())
        .bind(at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                BookingError::AlreadySaved {
                    venue: venue_id.to_string(),
                }
            } else if is_foreign_key_violation(&e) {
                BookingError::not_found("Venue", venue_id)
            } else {
                storage("Failed to save venue")(e)
            }
        })?;

        rows::saved_venue(&row)
    }

    #[tracing::instrument(skip(self))]
    async fn remove(&self, user_id: UserId, venue_id: VenueId) -> Result<()> {
        let result = sqlx::query("DELETE FROM saved_venues WHERE user_id = $1 AND venue_id = $2")
            .bind(user_id.as_uuid())
            .bind(venue_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(storage("Failed to remove saved venue"))?;

        if result.rows_affected() == 0 {
            return Err(BookingError::not_found("Saved venue", venue_id));
        }
        Ok(())
    }

    async fn list(&self, user_id: UserId) -> Result<Vec<SavedVenue>> {
        let rows = sqlx::query(
            "SELECT user_id, venue_id, saved_at FROM saved_venues \
             WHERE user_id = $1 ORDER BY saved_at DESC, venue_id",
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(storage("Failed to list saved venues"))?;

        rows.iter().map(rows::saved_venue).collect()
    }
}
