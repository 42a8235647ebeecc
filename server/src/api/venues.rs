//! Venue catalog endpoints:
//! - GET /api/venues - List (`category`, `active_only`)
//! - POST /api/venues - Create (admin)
//! - GET /api/venues/:id - Details
//! - PUT /api/venues/:id - Partial update (admin)
//! - DELETE /api/venues/:id - Delete (admin; refused while bookings exist)
//! - GET /api/venues/:id/availability - Availability check

use crate::services::Availability;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use venue_booking_core::{NaiveDate, NewVenue, Venue, VenueFilter, VenueId, VenueUpdate};
use venue_booking_web::{AppError, RequireAdmin};

/// Query parameters for the availability check.
#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    /// First day (inclusive)
    pub start: NaiveDate,
    /// Last day (exclusive)
    pub end: NaiveDate,
    /// Number of guests
    #[serde(default = "default_guests")]
    pub guests: u32,
}

const fn default_guests() -> u32 {
    1
}

/// List venues.
///
/// ```bash
/// curl "http://localhost:8080/api/venues?category=garden&active_only=true"
/// ```
pub async fn list_venues(
    State(state): State<AppState>,
    Query(filter): Query<VenueFilter>,
) -> Result<Json<Vec<Venue>>, AppError> {
    Ok(Json(state.list_venues(&filter).await?))
}

/// Create a venue; the calling admin becomes its owner.
pub async fn create_venue(
    State(state): State<AppState>,
    RequireAdmin(caller): RequireAdmin,
    Json(request): Json<NewVenue>,
) -> Result<(StatusCode, Json<Venue>), AppError> {
    let venue = state.create_venue(&caller, request).await?;
    Ok((StatusCode::CREATED, Json(venue)))
}

/// Venue details.
pub async fn get_venue(
    State(state): State<AppState>,
    Path(id): Path<VenueId>,
) -> Result<Json<Venue>, AppError> {
    Ok(Json(state.venue(id).await?))
}

/// Apply a partial update.
pub async fn update_venue(
    State(state): State<AppState>,
    RequireAdmin(caller): RequireAdmin,
    Path(id): Path<VenueId>,
    Json(update): Json<VenueUpdate>,
) -> Result<Json<Venue>, AppError> {
    Ok(Json(state.update_venue(&caller, id, update).await?))
}

/// Delete a venue without bookings.
pub async fn delete_venue(
    State(state): State<AppState>,
    RequireAdmin(caller): RequireAdmin,
    Path(id): Path<VenueId>,
) -> Result<StatusCode, AppError> {
    state.delete_venue(&caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Check whether a booking would be accepted.
///
/// Refusals use the same error codes as booking creation
/// (`INVALID_RANGE`, `CAPACITY_EXCEEDED`, `CONFLICT`, ...).
///
/// ```bash
/// curl "http://localhost:8080/api/venues/<id>/availability?start=2024-06-01&end=2024-06-03&guests=40"
/// ```
pub async fn availability(
    State(state): State<AppState>,
    Path(id): Path<VenueId>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Availability>, AppError> {
    let availability = state
        .check_availability(id, query.start, query.end, query.guests)
        .await?;
    Ok(Json(availability))
}
