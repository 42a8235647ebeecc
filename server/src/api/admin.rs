//! Admin dashboard.

use crate::state::AppState;
use axum::{Json, extract::State};
use venue_booking_core::DashboardSummary;
use venue_booking_web::{AppError, RequireAdmin};

/// Counts of venues, bookings per status, payments per status, and revenue.
pub async fn summary(
    State(state): State<AppState>,
    RequireAdmin(caller): RequireAdmin,
) -> Result<Json<DashboardSummary>, AppError> {
    Ok(Json(state.summary(&caller).await?))
}
