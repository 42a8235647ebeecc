//! Error types for web handlers.
//!
//! [`AppError`] bridges [`BookingError`] and HTTP responses by implementing
//! Axum's `IntoResponse`. Every domain error category maps to its own status
//! code and machine-readable `code`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::fmt;
use venue_booking_core::BookingError;

/// Application error type for web handlers.
///
/// # Examples
///
/// ```ignore
/// async fn handler(Path(id): Path<Uuid>) -> Result<Json<Venue>, AppError> {
///     // BookingError converts through `?`
///     let venue = state.venues.get(VenueId::from_uuid(id)).await?;
///     Ok(Json(venue))
/// }
/// ```
#[derive(Debug)]
pub struct AppError {
    /// HTTP status code
    status: StatusCode,
    /// Error message (user-facing)
    message: String,
    /// Error code (for client error handling)
    code: &'static str,
    /// Internal error (for logging, not exposed to client)
    source: Option<anyhow::Error>,
}

impl AppError {
    /// Create a new application error.
    #[must_use]
    pub const fn new(status: StatusCode, message: String, code: &'static str) -> Self {
        Self {
            status,
            message,
            code,
            source: None,
        }
    }

    /// Create a new error with a source error.
    #[must_use]
    pub fn with_source(mut self, source: anyhow::Error) -> Self {
        self.source = Some(source);
        self
    }

    /// HTTP status of the error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine-readable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.code
    }

    /// Create a 401 Unauthenticated error (missing or malformed identity).
    #[must_use]
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message.into(), "UNAUTHENTICATED")
    }

    /// Create a 403 error for a caller whose role does not permit the action.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message.into(), "UNAUTHORIZED")
    }

    /// Create a 404 Not Found error.
    #[must_use]
    pub fn not_found(resource: impl fmt::Display, id: impl fmt::Display) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            format!("{resource} with id {id} not found"),
            "NOT_FOUND",
        )
    }

    /// Create a 409 Conflict error with a specific code.
    #[must_use]
    pub fn conflict(message: impl Into<String>, code: &'static str) -> Self {
        Self::new(StatusCode::CONFLICT, message.into(), code)
    }

    /// Create a 422 Unprocessable Entity error with a specific code.
    #[must_use]
    pub fn unprocessable(message: impl Into<String>, code: &'static str) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message.into(), code)
    }

    /// Create a 500 Internal Server Error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            message.into(),
            "INTERNAL_SERVER_ERROR",
        )
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Error response body (JSON).
#[derive(Debug, Serialize)]
struct ErrorResponse {
    /// Error code (for client error handling).
    code: &'static str,
    /// Human-readable error message.
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log internal errors
        if self.status.is_server_error() {
            match &self.source {
                Some(source) => tracing::error!(
                    status = %self.status,
                    code = self.code,
                    message = %self.message,
                    error = %source,
                    "Internal server error"
                ),
                None => tracing::error!(
                    status = %self.status,
                    code = self.code,
                    message = %self.message,
                    "Internal server error"
                ),
            }
        } else {
            tracing::debug!(status = %self.status, code = self.code, "Request refused");
        }

        let body = ErrorResponse {
            code: self.code,
            message: self.message,
        };

        (self.status, Json(body)).into_response()
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        let message = err.to_string();
        match err {
            BookingError::InvalidRange { .. } => Self::unprocessable(message, "INVALID_RANGE"),
            BookingError::Validation(_) => Self::unprocessable(message, "VALIDATION_ERROR"),
            BookingError::CapacityExceeded { .. } => {
                Self::unprocessable(message, "CAPACITY_EXCEEDED")
            }
            BookingError::VenueInactive(_) => Self::unprocessable(message, "VENUE_INACTIVE"),
            BookingError::Conflict { .. } => Self::conflict(message, "CONFLICT"),
            BookingError::InvalidTransition { .. } => {
                Self::conflict(message, "INVALID_TRANSITION")
            }
            BookingError::AlreadySaved { .. } => Self::conflict(message, "ALREADY_SAVED"),
            BookingError::Duplicate { .. } => Self::conflict(message, "DUPLICATE"),
            BookingError::VenueInUse { .. } => Self::conflict(message, "VENUE_IN_USE"),
            BookingError::NotFound { .. } => Self::new(StatusCode::NOT_FOUND, message, "NOT_FOUND"),
            BookingError::Unauthorized(_) => Self::forbidden(message),
            BookingError::Storage(_) => {
                Self::internal("An internal error occurred").with_source(anyhow::Error::new(err))
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use venue_booking_core::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    #[test]
    fn test_error_display() {
        let err = AppError::unauthenticated("missing X-User-Id header");
        assert_eq!(err.to_string(), "[UNAUTHENTICATED] missing X-User-Id header");
    }

    #[test]
    fn test_not_found() {
        let err = AppError::from(BookingError::not_found("Venue", "123"));
        assert_eq!(err.to_string(), "[NOT_FOUND] Venue with id 123 not found");
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_domain_errors_stay_distinguishable() {
        let cases = [
            (
                BookingError::InvalidRange { start: day(3), end: day(1) },
                StatusCode::UNPROCESSABLE_ENTITY,
                "INVALID_RANGE",
            ),
            (
                BookingError::CapacityExceeded { guests: 60, capacity: 50 },
                StatusCode::UNPROCESSABLE_ENTITY,
                "CAPACITY_EXCEEDED",
            ),
            (
                BookingError::Conflict { existing: "b1".into(), start: day(1), end: day(3) },
                StatusCode::CONFLICT,
                "CONFLICT",
            ),
            (
                BookingError::InvalidTransition {
                    axis: "approval",
                    from: "approved".into(),
                    to: "rejected".into(),
                },
                StatusCode::CONFLICT,
                "INVALID_TRANSITION",
            ),
            (
                BookingError::AlreadySaved { venue: "v1".into() },
                StatusCode::CONFLICT,
                "ALREADY_SAVED",
            ),
            (
                BookingError::Unauthorized("only admins may approve bookings".into()),
                StatusCode::FORBIDDEN,
                "UNAUTHORIZED",
            ),
            (
                BookingError::Storage("connection reset".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_SERVER_ERROR",
            ),
        ];

        for (domain, status, code) in cases {
            let err = AppError::from(domain);
            assert_eq!(err.status(), status);
            assert_eq!(err.code(), code);
        }
    }

    #[test]
    fn test_storage_details_are_not_exposed() {
        let err = AppError::from(BookingError::Storage("password=hunter2".into()));
        assert!(!err.to_string().contains("hunter2"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[tokio::test]
    async fn test_response_body_carries_code_and_message() {
        let response =
            AppError::from(BookingError::AlreadySaved { venue: "v1".into() }).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["code"], "ALREADY_SAVED");
        assert!(json["message"].as_str().unwrap().contains("v1"));
    }
}
