//! Application state for the booking HTTP server.

use std::sync::Arc;
use venue_booking_core::BookingEnvironment;
use venue_booking_core::providers::{
    BookingRepository, Notifier, ReportRepository, SavedVenueRepository, StoreHealth,
    UserRepository, VenueRepository,
};

/// A store that backs every repository the server needs.
pub trait Store:
    VenueRepository
    + BookingRepository
    + SavedVenueRepository
    + UserRepository
    + ReportRepository
    + StoreHealth
    + 'static
{
}

impl<T> Store for T where
    T: VenueRepository
        + BookingRepository
        + SavedVenueRepository
        + UserRepository
        + ReportRepository
        + StoreHealth
        + 'static
{
}

/// Application state shared across all HTTP handlers.
///
/// Built once in `main` and cloned (cheaply, via `Arc`) for each request.
#[derive(Clone)]
pub struct AppState {
    /// Venue catalog
    pub venues: Arc<dyn VenueRepository>,
    /// Bookings (the only booking write path)
    pub bookings: Arc<dyn BookingRepository>,
    /// Bookmarks
    pub saved: Arc<dyn SavedVenueRepository>,
    /// User records
    pub users: Arc<dyn UserRepository>,
    /// Dashboard aggregates
    pub reports: Arc<dyn ReportRepository>,
    /// Readiness probe
    pub health: Arc<dyn StoreHealth>,
    /// Outbound notifications; `None` when disabled
    pub notifier: Option<Arc<dyn Notifier>>,
    /// Clock and conflict policy
    pub env: BookingEnvironment,
}

impl AppState {
    /// Create state where one store backs every repository.
    #[must_use]
    pub fn new<S: Store>(
        store: S,
        notifier: Option<Arc<dyn Notifier>>,
        env: BookingEnvironment,
    ) -> Self {
        let store = Arc::new(store);
        Self {
            venues: store.clone(),
            bookings: store.clone(),
            saved: store.clone(),
            users: store.clone(),
            reports: store.clone(),
            health: store,
            notifier,
            env,
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("env", &self.env)
            .field("notifications", &self.notifier.is_some())
            .finish_non_exhaustive()
    }
}
