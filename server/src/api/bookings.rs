//! Booking endpoints:
//! - POST /api/bookings - Request a booking (starts Pending)
//! - GET /api/bookings - Admin: all bookings; client: own bookings
//! - GET /api/bookings/:id - Details (owner or admin)
//! - POST /api/bookings/:id/approve - Pending → Approved (admin)
//! - POST /api/bookings/:id/reject - Pending → Rejected (admin)
//! - PUT /api/bookings/:id/payment - Set payment status (admin)
//! - POST /api/bookings/:id/payment-reminder - Remind an unpaid booking's contact (admin)
//!
//! # State Machine
//!
//! ```text
//! Pending ──approve──▶ Approved
//!    │
//!    └────reject────▶ Rejected
//!
//! Unpaid ──▶ Paid ──▶ Refunded
//! ```

use crate::services::{NewBooking, PaymentReminder};
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use venue_booking_core::{
    Booking, BookingFilter, BookingId, BookingStatus, ContactInfo, NaiveDate, PaymentStatus,
    VenueId,
};
use venue_booking_web::{AppError, CurrentUser, RequireAdmin};

/// Request to book a venue.
#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    /// Venue to book
    pub venue_id: VenueId,
    /// First day (inclusive)
    pub start_date: NaiveDate,
    /// Last day (exclusive)
    pub end_date: NaiveDate,
    /// Number of guests
    pub guest_count: u32,
    /// Contact details (`email`, optional `phone`)
    #[serde(flatten)]
    pub contact: ContactInfo,
}

/// Query parameters for listing bookings.
#[derive(Debug, Default, Deserialize)]
pub struct ListBookingsQuery {
    /// Filter by venue
    pub venue_id: Option<VenueId>,
    /// Filter by approval status
    pub status: Option<BookingStatus>,
}

/// Request to change the payment status.
#[derive(Debug, Deserialize)]
pub struct PaymentRequest {
    /// Target payment status
    pub status: PaymentStatus,
}

/// Request a booking for the caller.
///
/// ```bash
/// curl -X POST http://localhost:8080/api/bookings \
///   -H "X-User-Id: <uuid>" -H "X-User-Role: client" \
///   -H "Content-Type: application/json" \
///   -d '{"venue_id":"<uuid>","start_date":"2024-06-01","end_date":"2024-06-03",
///        "guest_count":40,"email":"guest@example.com","phone":"0712345678"}'
/// ```
pub async fn create_booking(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Json(request): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    let booking = state
        .request_booking(
            &caller,
            NewBooking {
                venue_id: request.venue_id,
                start_date: request.start_date,
                end_date: request.end_date,
                guest_count: request.guest_count,
                contact: request.contact,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

/// List bookings visible to the caller.
pub async fn list_bookings(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Query(query): Query<ListBookingsQuery>,
) -> Result<Json<Vec<Booking>>, AppError> {
    let filter = BookingFilter {
        venue_id: query.venue_id,
        user_id: None,
        status: query.status,
    };
    Ok(Json(state.list_bookings(&caller, filter).await?))
}

/// Booking details.
pub async fn get_booking(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<BookingId>,
) -> Result<Json<Booking>, AppError> {
    Ok(Json(state.booking(&caller, id).await?))
}

/// Approve a pending booking.
pub async fn approve_booking(
    State(state): State<AppState>,
    RequireAdmin(caller): RequireAdmin,
    Path(id): Path<BookingId>,
) -> Result<Json<Booking>, AppError> {
    Ok(Json(state.approve_booking(&caller, id).await?))
}

/// Reject a pending booking.
pub async fn reject_booking(
    State(state): State<AppState>,
    RequireAdmin(caller): RequireAdmin,
    Path(id): Path<BookingId>,
) -> Result<Json<Booking>, AppError> {
    Ok(Json(state.reject_booking(&caller, id).await?))
}

/// Move the payment status forward.
pub async fn set_payment(
    State(state): State<AppState>,
    RequireAdmin(caller): RequireAdmin,
    Path(id): Path<BookingId>,
    Json(request): Json<PaymentRequest>,
) -> Result<Json<Booking>, AppError> {
    Ok(Json(state.set_payment(&caller, id, request.status).await?))
}

/// Send a payment reminder for an unpaid booking.
pub async fn remind_payment(
    State(state): State<AppState>,
    RequireAdmin(caller): RequireAdmin,
    Path(id): Path<BookingId>,
) -> Result<Json<PaymentReminder>, AppError> {
    Ok(Json(state.remind_payment(&caller, id).await?))
}
