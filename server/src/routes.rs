//! Router configuration.

use crate::api::{admin, bookings, saved_venues, users, venues};
use crate::state::AppState;
use axum::{
    Router,
    extract::State,
    routing::{get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use venue_booking_web::correlation_id_layer;
use venue_booking_web::handlers::{health_check, readiness};

async fn readiness_check(State(state): State<AppState>) -> impl axum::response::IntoResponse {
    readiness(state.is_ready().await)
}

/// Build the complete router.
///
/// Health checks sit at the root; everything else is nested under `/api`.
/// Identity comes from gateway headers, checked per handler.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Users
        .route("/users", post(users::register_user).get(users::list_users))
        .route("/users/me", get(users::me))
        // Venues
        .route("/venues", get(venues::list_venues).post(venues::create_venue))
        .route(
            "/venues/:id",
            get(venues::get_venue)
                .put(venues::update_venue)
                .delete(venues::delete_venue),
        )
        .route("/venues/:id/availability", get(venues::availability))
        // Bookings
        .route(
            "/bookings",
            post(bookings::create_booking).get(bookings::list_bookings),
        )
        .route("/bookings/:id", get(bookings::get_booking))
        .route("/bookings/:id/approve", post(bookings::approve_booking))
        .route("/bookings/:id/reject", post(bookings::reject_booking))
        .route("/bookings/:id/payment", put(bookings::set_payment))
        .route(
            "/bookings/:id/payment-reminder",
            post(bookings::remind_payment),
        )
        // Saved venues
        .route("/saved-venues", get(saved_venues::list_saved))
        .route(
            "/saved-venues/:venue_id",
            post(saved_venues::save_venue).delete(saved_venues::unsave_venue),
        )
        // Admin
        .route("/admin/summary", get(admin::summary));

    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .nest("/api", api_routes)
        .layer(correlation_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
