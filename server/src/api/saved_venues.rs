//! Bookmark endpoints for the calling user:
//! - GET /api/saved-venues
//! - POST /api/saved-venues/:venue_id
//! - DELETE /api/saved-venues/:venue_id

use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use venue_booking_core::{SavedVenue, VenueId};
use venue_booking_web::{AppError, CurrentUser};

/// The caller's saved venues, newest first.
pub async fn list_saved(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
) -> Result<Json<Vec<SavedVenue>>, AppError> {
    Ok(Json(state.saved_venues(&caller).await?))
}

/// Save a venue. Saving it twice is a 409 `ALREADY_SAVED`.
pub async fn save_venue(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(venue_id): Path<VenueId>,
) -> Result<(StatusCode, Json<SavedVenue>), AppError> {
    let saved = state.save_venue(&caller, venue_id).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

/// Remove a saved venue.
pub async fn unsave_venue(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(venue_id): Path<VenueId>,
) -> Result<StatusCode, AppError> {
    state.unsave_venue(&caller, venue_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
