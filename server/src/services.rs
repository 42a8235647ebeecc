//! Use cases behind the REST handlers.
//!
//! Each operation checks the caller's role before touching state, runs the
//! repository call, records metrics, and sends notifications. Handlers stay
//! thin: extract, call one of these, serialise.

use crate::metrics;
use crate::state::AppState;
use serde::Serialize;
use venue_booking_core::access::{ensure_admin, ensure_owner_or_admin};
use venue_booking_core::{
    Booking, BookingCommand, BookingError, BookingFilter, BookingId, BookingRequest, BookingStatus,
    Caller,
    ContactInfo, DashboardSummary, DateRange, NaiveDate, NewUser, NewVenue, PaymentStatus,
    Result, Role, SavedVenue, User, UserId, Venue, VenueFilter, VenueId, VenueUpdate,
};

/// A booking request as submitted by the caller.
#[derive(Debug, Clone)]
pub struct NewBooking {
    /// Venue to book
    pub venue_id: VenueId,
    /// First day (inclusive)
    pub start_date: NaiveDate,
    /// Last day (exclusive)
    pub end_date: NaiveDate,
    /// Number of guests
    pub guest_count: u32,
    /// Contact details
    pub contact: ContactInfo,
}

/// Successful availability check.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Availability {
    /// Venue checked
    pub venue_id: VenueId,
    /// Checked range
    #[serde(flatten)]
    pub dates: DateRange,
    /// Guest count checked
    pub guest_count: u32,
    /// Always `true`; refusals are errors
    pub available: bool,
    /// Number of days in the range
    pub days: i64,
    /// Price a booking of this range would cost
    pub total_cost: i64,
}

#[derive(Debug, Clone, Copy)]
enum Notice {
    Received,
    Approved,
    Rejected,
    PaymentReminder,
}

/// Outcome of a payment reminder.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PaymentReminder {
    /// Booking reminded about
    pub booking_id: BookingId,
    /// Outstanding amount, in minor units
    pub amount_due: i64,
    /// Whether the notifier accepted the message
    pub sent: bool,
}

impl AppState {
    // ═══════════════════════════════════════════════════════════
    // Venues
    // ═══════════════════════════════════════════════════════════

    /// Create a venue owned by the calling admin.
    ///
    /// # Errors
    ///
    /// `Unauthorized` for non-admins, `Validation` for bad attributes.
    #[tracing::instrument(skip(self, new), fields(user_id = %caller.user_id))]
    pub async fn create_venue(&self, caller: &Caller, new: NewVenue) -> Result<Venue> {
        ensure_admin(caller, "create venues")?;
        let venue = new.into_venue(VenueId::new(), caller.user_id, self.env.now())?;
        let venue = self.venues.create(&venue).await?;
        tracing::info!(venue_id = %venue.id, name = %venue.name, "Venue created");
        Ok(venue)
    }

    /// Fetch one venue.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id.
    pub async fn venue(&self, id: VenueId) -> Result<Venue> {
        self.venues.get(id).await
    }

    /// List venues.
    ///
    /// # Errors
    ///
    /// `Storage` on persistence failure.
    pub async fn list_venues(&self, filter: &VenueFilter) -> Result<Vec<Venue>> {
        self.venues.list(filter).await
    }

    /// Apply a partial update to a venue.
    ///
    /// # Errors
    ///
    /// `Unauthorized`, `NotFound` or `Validation`.
    #[tracing::instrument(skip(self, update), fields(user_id = %caller.user_id))]
    pub async fn update_venue(
        &self,
        caller: &Caller,
        id: VenueId,
        update: VenueUpdate,
    ) -> Result<Venue> {
        ensure_admin(caller, "update venues")?;
        let current = self.venues.get(id).await?;
        let venue = update.apply_to(current, self.env.now())?;
        self.venues.update(&venue).await
    }

    /// Delete a venue that has no bookings.
    ///
    /// # Errors
    ///
    /// `Unauthorized`, `NotFound` or `VenueInUse`.
    #[tracing::instrument(skip(self), fields(user_id = %caller.user_id))]
    pub async fn delete_venue(&self, caller: &Caller, id: VenueId) -> Result<()> {
        ensure_admin(caller, "delete venues")?;
        self.venues.delete(id).await?;
        tracing::info!(venue_id = %id, "Venue deleted");
        Ok(())
    }

    /// Whether a booking of `venue_id` for the given dates and guests
    /// would be accepted now.
    ///
    /// # Errors
    ///
    /// `InvalidRange`, `NotFound`, `VenueInactive`, `Validation`,
    /// `CapacityExceeded` or `Conflict`.
    #[tracing::instrument(skip(self))]
    pub async fn check_availability(
        &self,
        venue_id: VenueId,
        start: NaiveDate,
        end: NaiveDate,
        guests: u32,
    ) -> Result<Availability> {
        let dates = DateRange::new(start, end)?;
        let schedule = self.bookings.schedule(venue_id, &dates).await?;
        schedule.check_availability(&dates, guests, self.env.policy)?;

        let days = dates.days();
        Ok(Availability {
            venue_id,
            dates,
            guest_count: guests,
            available: true,
            days,
            total_cost: schedule.venue().price_per_day.saturating_mul(days),
        })
    }

    // ═══════════════════════════════════════════════════════════
    // Bookings
    // ═══════════════════════════════════════════════════════════

    /// Record a Pending booking for the caller.
    ///
    /// # Errors
    ///
    /// Any availability error, or `Storage`.
    #[tracing::instrument(
        skip(self, new),
        fields(user_id = %caller.user_id, venue_id = %new.venue_id)
    )]
    pub async fn request_booking(&self, caller: &Caller, new: NewBooking) -> Result<Booking> {
        let command = BookingCommand::Request {
            booking_id: BookingId::new(),
            request: BookingRequest {
                venue_id: new.venue_id,
                user_id: caller.user_id,
                start_date: new.start_date,
                end_date: new.end_date,
                guest_count: new.guest_count,
                contact: new.contact,
            },
        };

        let result = self.bookings.execute(command, &self.env).await;
        metrics::record_booking_request(result.is_ok());
        let booking = result.inspect_err(record_refusal)?;

        tracing::info!(
            booking_id = %booking.id,
            total_cost = booking.total_cost,
            "Booking requested"
        );
        self.notify(Notice::Received, &booking).await;
        Ok(booking)
    }

    /// Bookings visible to the caller: everything for admins, otherwise
    /// only the caller's own.
    ///
    /// # Errors
    ///
    /// `Storage` on persistence failure.
    pub async fn list_bookings(
        &self,
        caller: &Caller,
        mut filter: BookingFilter,
    ) -> Result<Vec<Booking>> {
        if !caller.is_admin() {
            filter.user_id = Some(caller.user_id);
        }
        self.bookings.list(&filter).await
    }

    /// Fetch one booking owned by the caller (or any, for admins).
    ///
    /// # Errors
    ///
    /// `NotFound` or `Unauthorized`.
    pub async fn booking(&self, caller: &Caller, id: BookingId) -> Result<Booking> {
        let booking = self.bookings.get(id).await?;
        ensure_owner_or_admin(caller, booking.user_id)?;
        Ok(booking)
    }

    /// Pending → Approved.
    ///
    /// # Errors
    ///
    /// `Unauthorized`, `NotFound`, `InvalidTransition` or `Conflict`.
    #[tracing::instrument(skip(self), fields(user_id = %caller.user_id))]
    pub async fn approve_booking(&self, caller: &Caller, id: BookingId) -> Result<Booking> {
        ensure_admin(caller, "approve bookings")?;
        let booking = self
            .bookings
            .execute(BookingCommand::Approve { booking_id: id }, &self.env)
            .await
            .inspect_err(record_refusal)?;

        metrics::record_transition(booking.status);
        tracing::info!(booking_id = %id, "Booking approved");
        self.notify(Notice::Approved, &booking).await;
        Ok(booking)
    }

    /// Pending → Rejected.
    ///
    /// # Errors
    ///
    /// `Unauthorized`, `NotFound` or `InvalidTransition`.
    #[tracing::instrument(skip(self), fields(user_id = %caller.user_id))]
    pub async fn reject_booking(&self, caller: &Caller, id: BookingId) -> Result<Booking> {
        ensure_admin(caller, "reject bookings")?;
        let booking = self
            .bookings
            .execute(BookingCommand::Reject { booking_id: id }, &self.env)
            .await?;

        metrics::record_transition(booking.status);
        tracing::info!(booking_id = %id, "Booking rejected");
        self.notify(Notice::Rejected, &booking).await;
        Ok(booking)
    }

    /// Move the payment status forward.
    ///
    /// # Errors
    ///
    /// `Unauthorized`, `NotFound` or `InvalidTransition`.
    #[tracing::instrument(skip(self), fields(user_id = %caller.user_id))]
    pub async fn set_payment(
        &self,
        caller: &Caller,
        id: BookingId,
        status: PaymentStatus,
    ) -> Result<Booking> {
        ensure_admin(caller, "update payments")?;
        let booking = self
            .bookings
            .execute(
                BookingCommand::SetPayment {
                    booking_id: id,
                    status,
                },
                &self.env,
            )
            .await?;

        metrics::record_payment(status);
        Ok(booking)
    }

    /// Remind the contact of an unpaid, non-rejected booking.
    ///
    /// # Errors
    ///
    /// `Unauthorized`, `NotFound`, or `Validation` when the booking is
    /// rejected or no longer unpaid.
    #[tracing::instrument(skip(self), fields(user_id = %caller.user_id))]
    pub async fn remind_payment(&self, caller: &Caller, id: BookingId) -> Result<PaymentReminder> {
        ensure_admin(caller, "send payment reminders")?;
        let booking = self.bookings.get(id).await?;
        if booking.payment_status != PaymentStatus::Unpaid
            || booking.status == BookingStatus::Rejected
        {
            return Err(BookingError::Validation(format!(
                "booking {id} is {} and {}; reminders apply to unpaid open bookings only",
                booking.status, booking.payment_status
            )));
        }

        let sent = self.notify(Notice::PaymentReminder, &booking).await;
        tracing::info!(booking_id = %id, sent, "Payment reminder processed");
        Ok(PaymentReminder {
            booking_id: id,
            amount_due: booking.total_cost,
            sent,
        })
    }

    // ═══════════════════════════════════════════════════════════
    // Saved venues
    // ═══════════════════════════════════════════════════════════

    /// Bookmark a venue for the caller.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown venue, `AlreadySaved` for a duplicate.
    #[tracing::instrument(skip(self), fields(user_id = %caller.user_id))]
    pub async fn save_venue(&self, caller: &Caller, venue_id: VenueId) -> Result<SavedVenue> {
        self.saved.save(caller.user_id, venue_id, self.env.now()).await
    }

    /// Remove a bookmark of the caller.
    ///
    /// # Errors
    ///
    /// `NotFound` if the venue was not saved.
    #[tracing::instrument(skip(self), fields(user_id = %caller.user_id))]
    pub async fn unsave_venue(&self, caller: &Caller, venue_id: VenueId) -> Result<()> {
        self.saved.remove(caller.user_id, venue_id).await
    }

    /// The caller's bookmarks, newest first.
    ///
    /// # Errors
    ///
    /// `Storage` on persistence failure.
    pub async fn saved_venues(&self, caller: &Caller) -> Result<Vec<SavedVenue>> {
        self.saved.list(caller.user_id).await
    }

    // ═══════════════════════════════════════════════════════════
    // Users & reporting
    // ═══════════════════════════════════════════════════════════

    /// Register a user. Only an admin caller may register another admin.
    ///
    /// # Errors
    ///
    /// `Unauthorized`, `Validation` or `Duplicate`.
    #[tracing::instrument(skip(self, new))]
    pub async fn register_user(&self, caller: Option<&Caller>, new: NewUser) -> Result<User> {
        if new.role == Role::Admin && !caller.is_some_and(Caller::is_admin) {
            return Err(BookingError::Unauthorized(
                "only admins may register admin accounts".into(),
            ));
        }
        let user = new.into_user(UserId::new(), self.env.now())?;
        let user = self.users.create(&user).await?;
        tracing::info!(user_id = %user.id, role = user.role.as_str(), "User registered");

        if let Some(notifier) = &self.notifier {
            if let Err(error) = notifier.user_registered(&user).await {
                tracing::warn!(user_id = %user.id, %error, "Welcome message failed");
            }
        }
        Ok(user)
    }

    /// The caller's own profile.
    ///
    /// # Errors
    ///
    /// `NotFound` if the gateway identity has no user record.
    pub async fn current_user(&self, caller: &Caller) -> Result<User> {
        self.users.get(caller.user_id).await
    }

    /// All users.
    ///
    /// # Errors
    ///
    /// `Unauthorized` for non-admins.
    pub async fn list_users(&self, caller: &Caller) -> Result<Vec<User>> {
        ensure_admin(caller, "list users")?;
        self.users.list().await
    }

    /// Dashboard aggregates.
    ///
    /// # Errors
    ///
    /// `Unauthorized` for non-admins.
    pub async fn summary(&self, caller: &Caller) -> Result<DashboardSummary> {
        ensure_admin(caller, "view the dashboard")?;
        self.reports.summary().await
    }

    /// Whether the store answers queries.
    pub async fn is_ready(&self) -> bool {
        match self.health.ping().await {
            Ok(()) => true,
            Err(error) => {
                tracing::warn!(%error, "Readiness probe failed");
                false
            }
        }
    }

    /// Best-effort delivery; `true` only if the notifier accepted it.
    async fn notify(&self, notice: Notice, booking: &Booking) -> bool {
        let Some(notifier) = &self.notifier else {
            return false;
        };

        let venue = match self.venues.get(booking.venue_id).await {
            Ok(venue) => venue,
            Err(error) => {
                tracing::warn!(booking_id = %booking.id, %error, "Notification skipped");
                return false;
            }
        };

        let sent = match notice {
            Notice::Received => notifier.booking_received(booking, &venue).await,
            Notice::Approved => notifier.booking_approved(booking, &venue).await,
            Notice::Rejected => notifier.booking_rejected(booking, &venue).await,
            Notice::PaymentReminder => notifier.payment_reminder(booking, &venue).await,
        };
        match sent {
            Ok(()) => true,
            Err(error) => {
                tracing::warn!(booking_id = %booking.id, ?notice, %error, "Notification failed");
                false
            }
        }
    }
}

fn record_refusal(error: &BookingError) {
    if matches!(error, BookingError::Conflict { .. }) {
        metrics::record_conflict();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use venue_booking_core::{BookingEnvironment, ConflictPolicy};
    use venue_booking_testing::{
        InMemoryStore, NotificationKind, RecordingNotifier, fixtures, test_clock,
    };

    fn state(policy: ConflictPolicy) -> (AppState, RecordingNotifier) {
        let notifier = RecordingNotifier::new();
        let env = BookingEnvironment::new(Arc::new(test_clock()), policy);
        let state = AppState::new(InMemoryStore::new(), Some(Arc::new(notifier.clone())), env);
        (state, notifier)
    }

    fn new_booking(venue_id: VenueId, start: u32, end: u32) -> NewBooking {
        let request =
            fixtures::booking_request(venue_id, fixtures::day(start), fixtures::day(end), 20);
        NewBooking {
            venue_id,
            start_date: request.start_date,
            end_date: request.end_date,
            guest_count: request.guest_count,
            contact: request.contact,
        }
    }

    #[tokio::test]
    async fn test_example_schedule() {
        let (state, notifier) = state(ConflictPolicy::ApprovedOnly);
        let admin = fixtures::admin();
        let client = fixtures::client();
        let venue = state
            .create_venue(&admin, fixtures::new_venue("Karen Gardens", 50))
            .await
            .unwrap();

        let a = state.request_booking(&client, new_booking(venue.id, 1, 3)).await.unwrap();
        assert_eq!(a.user_id, client.user_id);
        state.approve_booking(&admin, a.id).await.unwrap();

        let b = state.request_booking(&client, new_booking(venue.id, 2, 4)).await;
        assert!(matches!(b, Err(BookingError::Conflict { .. })));

        let c = state.request_booking(&client, new_booking(venue.id, 3, 5)).await.unwrap();
        assert_eq!(c.status, BookingStatus::Pending);

        let kinds: Vec<_> = notifier.sent().into_iter().map(|n| n.kind).collect();
        assert_eq!(
            kinds,
            vec![
                NotificationKind::Received,
                NotificationKind::Approved,
                NotificationKind::Received
            ]
        );
    }

    #[tokio::test]
    async fn test_clients_cannot_mutate_admin_state() {
        let (state, _) = state(ConflictPolicy::ApprovedOnly);
        let admin = fixtures::admin();
        let client = fixtures::client();

        assert!(matches!(
            state.create_venue(&client, fixtures::new_venue("Hall", 10)).await,
            Err(BookingError::Unauthorized(_))
        ));

        let venue = state.create_venue(&admin, fixtures::new_venue("Hall", 10)).await.unwrap();
        let mut booking = new_booking(venue.id, 1, 2);
        booking.guest_count = 5;
        let booking = state.request_booking(&client, booking).await.unwrap();

        assert!(matches!(
            state.approve_booking(&client, booking.id).await,
            Err(BookingError::Unauthorized(_))
        ));
        assert!(matches!(
            state.set_payment(&client, booking.id, PaymentStatus::Paid).await,
            Err(BookingError::Unauthorized(_))
        ));
        assert!(matches!(
            state.summary(&client).await,
            Err(BookingError::Unauthorized(_))
        ));

        let unchanged = state.booking(&admin, booking.id).await.unwrap();
        assert_eq!(unchanged.status, BookingStatus::Pending);
        assert_eq!(unchanged.payment_status, PaymentStatus::Unpaid);
    }

    #[tokio::test]
    async fn test_clients_only_see_their_own_bookings() {
        let (state, _) = state(ConflictPolicy::ApprovedOnly);
        let admin = fixtures::admin();
        let alice = fixtures::client();
        let bob = fixtures::client();
        let venue = state.create_venue(&admin, fixtures::new_venue("Hall", 50)).await.unwrap();

        let mine = state.request_booking(&alice, new_booking(venue.id, 1, 2)).await.unwrap();
        state.request_booking(&bob, new_booking(venue.id, 5, 6)).await.unwrap();

        let listed = state.list_bookings(&alice, BookingFilter::default()).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, mine.id);

        assert_eq!(
            state.list_bookings(&admin, BookingFilter::default()).await.unwrap().len(),
            2
        );
        assert!(matches!(
            state.booking(&bob, mine.id).await,
            Err(BookingError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn test_notification_failure_does_not_fail_booking() {
        let (state, notifier) = state(ConflictPolicy::ApprovedOnly);
        notifier.fail_deliveries();
        let venue = state
            .create_venue(&fixtures::admin(), fixtures::new_venue("Hall", 50))
            .await
            .unwrap();

        let booking = state
            .request_booking(&fixtures::client(), new_booking(venue.id, 1, 2))
            .await;
        assert!(booking.is_ok());
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn test_availability_reports_cost_and_refusals() {
        let (state, _) = state(ConflictPolicy::ApprovedAndPending);
        let venue = state
            .create_venue(&fixtures::admin(), fixtures::new_venue("Hall", 50))
            .await
            .unwrap();

        let open = state
            .check_availability(venue.id, fixtures::day(1), fixtures::day(4), 10)
            .await
            .unwrap();
        assert_eq!(open.days, 3);
        assert_eq!(open.total_cost, 3 * venue.price_per_day);

        state
            .request_booking(&fixtures::client(), new_booking(venue.id, 2, 3))
            .await
            .unwrap();
        assert!(matches!(
            state
                .check_availability(venue.id, fixtures::day(1), fixtures::day(4), 10)
                .await,
            Err(BookingError::Conflict { .. })
        ));
        assert!(matches!(
            state
                .check_availability(venue.id, fixtures::day(4), fixtures::day(4), 10)
                .await,
            Err(BookingError::InvalidRange { .. })
        ));
        assert!(matches!(
            state
                .check_availability(venue.id, fixtures::day(10), fixtures::day(11), 51)
                .await,
            Err(BookingError::CapacityExceeded { .. })
        ));
    }

    #[tokio::test]
    async fn test_only_admins_register_admins() {
        let (state, _) = state(ConflictPolicy::ApprovedOnly);

        assert!(matches!(
            state
                .register_user(None, fixtures::new_user("mallory", Role::Admin))
                .await,
            Err(BookingError::Unauthorized(_))
        ));

        let admin = fixtures::admin();
        let created = state
            .register_user(Some(&admin), fixtures::new_user("wanjiku", Role::Admin))
            .await
            .unwrap();
        assert_eq!(created.role, Role::Admin);

        let client = state
            .register_user(None, fixtures::new_user("otieno", Role::Client))
            .await
            .unwrap();
        let me = state
            .current_user(&Caller::new(client.id, Role::Client))
            .await
            .unwrap();
        assert_eq!(me.username, "otieno");
    }

    #[tokio::test]
    async fn test_registration_sends_welcome() {
        let (state, notifier) = state(ConflictPolicy::ApprovedOnly);

        let user = state
            .register_user(None, fixtures::new_user("akinyi", Role::Client))
            .await
            .unwrap();

        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].kind, NotificationKind::Welcome);
        assert_eq!(sent[0].email, user.email);
        assert_eq!(sent[0].phone.as_deref(), Some("+254700000000"));
        assert_eq!(sent[0].booking_id, None);

        notifier.fail_deliveries();
        assert!(
            state
                .register_user(None, fixtures::new_user("baraka", Role::Client))
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_payment_reminder_only_for_open_unpaid_bookings() {
        let (state, notifier) = state(ConflictPolicy::ApprovedOnly);
        let admin = fixtures::admin();
        let client = fixtures::client();
        let venue = state.create_venue(&admin, fixtures::new_venue("Hall", 50)).await.unwrap();
        let booking = state.request_booking(&client, new_booking(venue.id, 1, 3)).await.unwrap();

        assert!(matches!(
            state.remind_payment(&client, booking.id).await,
            Err(BookingError::Unauthorized(_))
        ));

        let reminder = state.remind_payment(&admin, booking.id).await.unwrap();
        assert!(reminder.sent);
        assert_eq!(reminder.amount_due, booking.total_cost);
        let last = notifier.sent().pop().unwrap();
        assert_eq!(last.kind, NotificationKind::PaymentReminder);
        assert_eq!(last.booking_id, Some(booking.id));
        assert_eq!(last.venue_name.as_deref(), Some("Hall"));

        state.set_payment(&admin, booking.id, PaymentStatus::Paid).await.unwrap();
        assert!(matches!(
            state.remind_payment(&admin, booking.id).await,
            Err(BookingError::Validation(_))
        ));

        let rejected = state.request_booking(&client, new_booking(venue.id, 5, 6)).await.unwrap();
        state.reject_booking(&admin, rejected.id).await.unwrap();
        assert!(matches!(
            state.remind_payment(&admin, rejected.id).await,
            Err(BookingError::Validation(_))
        ));

        let pending = state.request_booking(&client, new_booking(venue.id, 8, 9)).await.unwrap();
        notifier.fail_deliveries();
        let undelivered = state.remind_payment(&admin, pending.id).await.unwrap();
        assert!(!undelivered.sent);
    }
}
