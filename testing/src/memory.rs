//! In-memory implementation of every repository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use venue_booking_core::providers::{
    BookingRepository, ReportRepository, SavedVenueRepository, StoreHealth, UserRepository,
    VenueRepository,
};
use venue_booking_core::{
    Booking, BookingCommand, BookingEnvironment, BookingError, BookingFilter, BookingId,
    BookingStatus, DashboardSummary, DateRange, Result, SavedVenue, User, UserId, Venue,
    VenueFilter, VenueId, VenueSchedule,
};

#[derive(Debug, Default)]
struct State {
    users: HashMap<UserId, User>,
    venues: HashMap<VenueId, Venue>,
    bookings: HashMap<BookingId, Booking>,
    saved: Vec<SavedVenue>,
}

impl State {
    fn venue(&self, id: VenueId) -> Result<&Venue> {
        self.venues
            .get(&id)
            .ok_or_else(|| BookingError::not_found("Venue", id))
    }

    fn bookings_of(&self, venue_id: VenueId) -> impl Iterator<Item = &Booking> {
        self.bookings.values().filter(move |b| b.venue_id == venue_id)
    }
}

/// In-memory store for tests.
///
/// All state sits behind a single mutex, so each operation is atomic with
/// respect to every other, like a serialisable transaction.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| BookingError::Storage("in-memory store lock poisoned".into()))
    }

    /// Number of stored bookings.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the lock is poisoned.
    pub fn booking_count(&self) -> Result<usize> {
        Ok(self.lock()?.bookings.len())
    }

    /// Number of stored bookmarks.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the lock is poisoned.
    pub fn saved_count(&self) -> Result<usize> {
        Ok(self.lock()?.saved.len())
    }
}

#[async_trait]
impl StoreHealth for InMemoryStore {
    async fn ping(&self) -> Result<()> {
        self.lock().map(|_| ())
    }
}

#[async_trait]
impl VenueRepository for InMemoryStore {
    async fn create(&self, venue: &Venue) -> Result<Venue> {
        let mut state = self.lock()?;
        state.venues.insert(venue.id, venue.clone());
        Ok(venue.clone())
    }

    async fn get(&self, id: VenueId) -> Result<Venue> {
        self.lock()?.venue(id).cloned()
    }

    async fn list(&self, filter: &VenueFilter) -> Result<Vec<Venue>> {
        let state = self.lock()?;
        let mut venues: Vec<Venue> = state
            .venues
            .values()
            .filter(|v| filter.matches(v))
            .cloned()
            .collect();
        venues.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(venues)
    }

    async fn update(&self, venue: &Venue) -> Result<Venue> {
        let mut state = self.lock()?;
        let slot = state
            .venues
            .get_mut(&venue.id)
            .ok_or_else(|| BookingError::not_found("Venue", venue.id))?;
        *slot = venue.clone();
        Ok(venue.clone())
    }

    async fn delete(&self, id: VenueId) -> Result<()> {
        let mut state = self.lock()?;
        state.venue(id)?;
        if state.bookings_of(id).next().is_some() {
            return Err(BookingError::VenueInUse {
                venue: id.to_string(),
            });
        }
        state.saved.retain(|s| s.venue_id != id);
        state.venues.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl BookingRepository for InMemoryStore {
    async fn execute(&self, command: BookingCommand, env: &BookingEnvironment) -> Result<Booking> {
        let mut state = self.lock()?;
        let booking_id = command.booking_id();

        let venue_id = match &command {
            BookingCommand::Request { request, .. } => {
                request.dates()?;
                request.venue_id
            }
            _ => {
                state
                    .bookings
                    .get(&booking_id)
                    .ok_or_else(|| BookingError::not_found("Booking", booking_id))?
                    .venue_id
            }
        };

        let venue = state.venue(venue_id)?.clone();
        let bookings = state.bookings_of(venue_id).cloned().collect();
        let mut schedule = VenueSchedule::new(venue, bookings);

        let event = schedule.handle(command, env)?;
        schedule.apply(&event);

        let booking = schedule
            .into_booking(booking_id)
            .ok_or_else(|| BookingError::not_found("Booking", booking_id))?;
        state.bookings.insert(booking.id, booking.clone());
        Ok(booking)
    }

    async fn get(&self, id: BookingId) -> Result<Booking> {
        self.lock()?
            .bookings
            .get(&id)
            .cloned()
            .ok_or_else(|| BookingError::not_found("Booking", id))
    }

    async fn list(&self, filter: &BookingFilter) -> Result<Vec<Booking>> {
        let state = self.lock()?;
        let mut bookings: Vec<Booking> = state
            .bookings
            .values()
            .filter(|b| filter.matches(b))
            .cloned()
            .collect();
        bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(bookings)
    }

    async fn schedule(&self, venue_id: VenueId, range: &DateRange) -> Result<VenueSchedule> {
        let state = self.lock()?;
        let venue = state.venue(venue_id)?.clone();
        let bookings = state
            .bookings_of(venue_id)
            .filter(|b| b.status != BookingStatus::Rejected && b.dates.overlaps(range))
            .cloned()
            .collect();
        Ok(VenueSchedule::new(venue, bookings))
    }
}

#[async_trait]
impl SavedVenueRepository for InMemoryStore {
    async fn save(
        &self,
        user_id: UserId,
        venue_id: VenueId,
        at: DateTime<Utc>,
    ) -> Result<SavedVenue> {
        let mut state = self.lock()?;
        state.venue(venue_id)?;
        if state
            .saved
            .iter()
            .any(|s| s.user_id == user_id && s.venue_id == venue_id)
        {
            return Err(BookingError::AlreadySaved {
                venue: venue_id.to_string(),
            });
        }
        let saved = SavedVenue {
            user_id,
            venue_id,
            saved_at: at,
        };
        state.saved.push(saved.clone());
        Ok(saved)
    }

    async fn remove(&self, user_id: UserId, venue_id: VenueId) -> Result<()> {
        let mut state = self.lock()?;
        let before = state.saved.len();
        state
            .saved
            .retain(|s| !(s.user_id == user_id && s.venue_id == venue_id));
        if state.saved.len() == before {
            return Err(BookingError::not_found("Saved venue", venue_id));
        }
        Ok(())
    }

    async fn list(&self, user_id: UserId) -> Result<Vec<SavedVenue>> {
        let state = self.lock()?;
        let mut saved: Vec<SavedVenue> = state
            .saved
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        saved.sort_by(|a, b| b.saved_at.cmp(&a.saved_at));
        Ok(saved)
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create(&self, user: &User) -> Result<User> {
        let mut state = self.lock()?;
        for existing in state.users.values() {
            if existing.username == user.username {
                return Err(BookingError::Duplicate {
                    field: "username",
                    value: user.username.clone(),
                });
            }
            if existing.email == user.email {
                return Err(BookingError::Duplicate {
                    field: "email",
                    value: user.email.clone(),
                });
            }
        }
        state.users.insert(user.id, user.clone());
        Ok(user.clone())
    }

    async fn get(&self, id: UserId) -> Result<User> {
        self.lock()?
            .users
            .get(&id)
            .cloned()
            .ok_or_else(|| BookingError::not_found("User", id))
    }

    async fn list(&self) -> Result<Vec<User>> {
        let state = self.lock()?;
        let mut users: Vec<User> = state.users.values().cloned().collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }
}

#[async_trait]
impl ReportRepository for InMemoryStore {
    async fn summary(&self) -> Result<DashboardSummary> {
        let state = self.lock()?;
        let mut summary = DashboardSummary {
            venues: state.venues.len() as u64,
            active_venues: state.venues.values().filter(|v| v.is_active).count() as u64,
            ..DashboardSummary::default()
        };
        for booking in state.bookings.values() {
            summary.count_booking(booking);
        }
        Ok(summary)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::{fixtures, test_clock};
    use venue_booking_core::{ConflictPolicy, PaymentStatus};

    fn env() -> BookingEnvironment {
        BookingEnvironment::new(Arc::new(test_clock()), ConflictPolicy::ApprovedOnly)
    }

    async fn request(
        store: &InMemoryStore,
        venue: VenueId,
        start: u32,
        end: u32,
    ) -> Result<Booking> {
        let request =
            fixtures::booking_request(venue, fixtures::day(start), fixtures::day(end), 10);
        store
            .execute(
                BookingCommand::Request {
                    booking_id: BookingId::new(),
                    request,
                },
                &env(),
            )
            .await
    }

    #[tokio::test]
    async fn test_failed_command_persists_nothing() {
        let store = InMemoryStore::new();
        let venue = VenueRepository::create(&store, &fixtures::venue("Hall", 50))
            .await
            .unwrap();

        assert!(matches!(
            request(&store, venue.id, 4, 2).await,
            Err(BookingError::InvalidRange { .. })
        ));
        assert_eq!(store.booking_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unknown_venue_is_not_found() {
        let store = InMemoryStore::new();
        assert!(matches!(
            request(&store, VenueId::new(), 1, 2).await,
            Err(BookingError::NotFound { entity: "Venue", .. })
        ));
    }

    #[tokio::test]
    async fn test_approval_conflict_leaves_records_unchanged() {
        let store = InMemoryStore::new();
        let venue = VenueRepository::create(&store, &fixtures::venue("Hall", 50))
            .await
            .unwrap();
        let a = request(&store, venue.id, 1, 3).await.unwrap();
        let b = request(&store, venue.id, 2, 4).await.unwrap();

        store
            .execute(BookingCommand::Approve { booking_id: a.id }, &env())
            .await
            .unwrap();
        let result = store
            .execute(BookingCommand::Approve { booking_id: b.id }, &env())
            .await;

        assert!(matches!(result, Err(BookingError::Conflict { .. })));
        assert_eq!(
            BookingRepository::get(&store, b.id).await.unwrap().status,
            BookingStatus::Pending
        );
        assert_eq!(
            BookingRepository::get(&store, a.id).await.unwrap().status,
            BookingStatus::Approved
        );
    }

    #[tokio::test]
    async fn test_venue_with_bookings_cannot_be_deleted() {
        let store = InMemoryStore::new();
        let venue = VenueRepository::create(&store, &fixtures::venue("Hall", 50))
            .await
            .unwrap();
        request(&store, venue.id, 1, 3).await.unwrap();

        assert!(matches!(
            VenueRepository::delete(&store, venue.id).await,
            Err(BookingError::VenueInUse { .. })
        ));
    }

    #[tokio::test]
    async fn test_saved_venue_uniqueness() {
        let store = InMemoryStore::new();
        let venue = VenueRepository::create(&store, &fixtures::venue("Hall", 50))
            .await
            .unwrap();
        let user = UserId::new();
        let now = Utc::now();

        store.save(user, venue.id, now).await.unwrap();
        assert!(matches!(
            store.save(user, venue.id, now).await,
            Err(BookingError::AlreadySaved { .. })
        ));
        assert_eq!(store.saved_count().unwrap(), 1);

        store.remove(user, venue.id).await.unwrap();
        assert!(matches!(
            store.remove(user, venue.id).await,
            Err(BookingError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_duplicate_users_are_refused() {
        let store = InMemoryStore::new();
        let first = fixtures::new_user("wanjiru", venue_booking_core::Role::Client)
            .into_user(UserId::new(), Utc::now())
            .unwrap();
        UserRepository::create(&store, &first).await.unwrap();

        let mut second = first.clone();
        second.id = UserId::new();
        second.email = "other@example.com".into();
        assert!(matches!(
            UserRepository::create(&store, &second).await,
            Err(BookingError::Duplicate { field: "username", .. })
        ));
    }

    #[tokio::test]
    async fn test_summary_counts_paid_revenue() {
        let store = InMemoryStore::new();
        let venue = VenueRepository::create(&store, &fixtures::venue("Hall", 50))
            .await
            .unwrap();
        let paid = request(&store, venue.id, 1, 3).await.unwrap();
        request(&store, venue.id, 5, 6).await.unwrap();
        store
            .execute(
                BookingCommand::SetPayment {
                    booking_id: paid.id,
                    status: PaymentStatus::Paid,
                },
                &env(),
            )
            .await
            .unwrap();

        let summary = store.summary().await.unwrap();
        assert_eq!(summary.venues, 1);
        assert_eq!(summary.bookings.pending, 2);
        assert_eq!(summary.payments.paid, 1);
        assert_eq!(summary.revenue, paid.total_cost);
    }
}
