//! User endpoints:
//! - POST /api/users - Register (admin accounts require an admin caller)
//! - GET /api/users/me - Caller's profile
//! - GET /api/users - List users (admin)

use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode};
use venue_booking_core::{NewUser, User};
use venue_booking_web::{AppError, CurrentUser, RequireAdmin};

/// Register a user.
///
/// The credential is a reference issued by the authentication gateway
/// (a password hash or an OAuth subject), never a raw password.
///
/// ```bash
/// curl -X POST http://localhost:8080/api/users \
///   -H "Content-Type: application/json" \
///   -d '{"username":"otieno","email":"otieno@example.com",
///        "credential":{"kind":"oauth","provider":"google","subject":"1234"}}'
/// ```
pub async fn register_user(
    State(state): State<AppState>,
    caller: Option<CurrentUser>,
    Json(request): Json<NewUser>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let caller = caller.map(|CurrentUser(caller)| caller);
    let user = state.register_user(caller.as_ref(), request).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// The caller's own profile.
pub async fn me(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
) -> Result<Json<User>, AppError> {
    Ok(Json(state.current_user(&caller).await?))
}

/// List every user.
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(caller): RequireAdmin,
) -> Result<Json<Vec<User>>, AppError> {
    Ok(Json(state.list_users(&caller).await?))
}
