//! Axum integration for the venue booking platform.
//!
//! This crate is the imperative shell's HTTP edge. The functional core in
//! `venue-booking-core` never sees a request; handlers turn requests into
//! core calls and core errors into responses.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │         Imperative Shell (Axum)         │  ← HTTP, JSON, headers
//! │  - Caller identity from the gateway     │  ← Correlation IDs
//! │  - Response serialization               │  ← Logging
//! ├─────────────────────────────────────────┤
//! │         Functional Core                 │
//! │  - Booking rules (VenueSchedule)        │  ← Testable at memory speed
//! │  - Access checks                        │  ← No I/O, no side effects
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use venue_booking_web::{AppError, CurrentUser};
//! use axum::{Router, routing::get, Json};
//!
//! async fn my_bookings(
//!     State(state): State<AppState>,
//!     CurrentUser(caller): CurrentUser,
//! ) -> Result<Json<Vec<Booking>>, AppError> {
//!     Ok(Json(state.bookings.list(&caller, filter).await?))
//! }
//!
//! let app = Router::new()
//!     .route("/api/bookings", get(my_bookings))
//!     .layer(correlation_id_layer())
//!     .with_state(app_state);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;

// Re-export key types for convenience
pub use error::AppError;
pub use extractors::{CorrelationId, CurrentUser, RequireAdmin, USER_ID_HEADER, USER_ROLE_HEADER};
pub use middleware::{CORRELATION_ID_HEADER, correlation_id_layer};
