//! Custom Axum extractors.
//!
//! - `CorrelationId`: the request's correlation ID (set by the middleware)
//! - `CurrentUser`: the caller identity forwarded by the authentication gateway
//! - `RequireAdmin`: like `CurrentUser`, but rejects non-admin callers
//!
//! The gateway authenticates the caller and forwards two headers:
//! `X-User-Id` (UUID) and `X-User-Role` (`admin` or `client`). This service
//! trusts them as-is. A missing or malformed header is a 401.
//!
//! # Examples
//!
//! ```ignore
//! use venue_booking_web::extractors::{CorrelationId, CurrentUser, RequireAdmin};
//!
//! async fn approve(
//!     RequireAdmin(caller): RequireAdmin,
//!     correlation_id: CorrelationId,
//!     Path(id): Path<Uuid>,
//! ) -> Result<Json<Booking>, AppError> {
//!     tracing::info!(correlation_id = %correlation_id.0, user = %caller.user_id, "Approving");
//!     // ...
//! }
//! ```

use crate::error::AppError;
use crate::middleware::CORRELATION_ID_HEADER;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{HeaderMap, request::Parts},
};
use uuid::Uuid;
use venue_booking_core::{Caller, Role, UserId};

/// Header carrying the authenticated user's id.
pub const USER_ID_HEADER: &str = "X-User-Id";

/// Header carrying the authenticated user's role.
pub const USER_ROLE_HEADER: &str = "X-User-Role";

/// Correlation ID for request tracing.
///
/// Prefers the ID stored by [`correlation_id_layer`](crate::correlation_id_layer),
/// then the `X-Correlation-ID` header, and generates a new UUID v4 otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorrelationId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for CorrelationId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(id) = parts.extensions.get::<Self>() {
            return Ok(*id);
        }

        let correlation_id = parts
            .headers
            .get(CORRELATION_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| Uuid::parse_str(s).ok())
            .unwrap_or_else(Uuid::new_v4);

        Ok(Self(correlation_id))
    }
}

/// The authenticated caller, as forwarded by the gateway.
///
/// # Example
///
/// ```ignore
/// async fn my_bookings(CurrentUser(caller): CurrentUser) -> String {
///     format!("bookings of {}", caller.user_id)
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub Caller);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        caller_from_headers(&parts.headers).map(Self)
    }
}

/// An authenticated caller holding the admin role.
///
/// Rejects clients with 403 before the handler runs.
#[derive(Debug, Clone, Copy)]
pub struct RequireAdmin(pub Caller);

#[async_trait]
impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let caller = caller_from_headers(&parts.headers)?;
        if !caller.is_admin() {
            tracing::debug!(user_id = %caller.user_id, "Admin route refused");
            return Err(AppError::forbidden("this action requires the admin role"));
        }
        Ok(Self(caller))
    }
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Result<&'a str, AppError> {
    headers
        .get(name)
        .ok_or_else(|| AppError::unauthenticated(format!("missing {name} header")))?
        .to_str()
        .map(str::trim)
        .map_err(|_| AppError::unauthenticated(format!("malformed {name} header")))
}

fn caller_from_headers(headers: &HeaderMap) -> Result<Caller, AppError> {
    let user_id = Uuid::parse_str(header(headers, USER_ID_HEADER)?)
        .map_err(|_| AppError::unauthenticated(format!("malformed {USER_ID_HEADER} header")))?;
    let role: Role = header(headers, USER_ROLE_HEADER)?
        .parse()
        .map_err(|_| AppError::unauthenticated(format!("malformed {USER_ROLE_HEADER} header")))?;

    Ok(Caller::new(UserId::from_uuid(user_id), role))
}
