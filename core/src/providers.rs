//! Persistence and notification interfaces.
//!
//! The core depends only on these traits. `venue-booking-postgres` provides
//! the production implementations and `venue-booking-testing` provides
//! in-memory ones.
//!
//! # Atomicity
//!
//! [`BookingRepository::execute`] is the only write path for bookings. An
//! implementation must load the [`VenueSchedule`](crate::VenueSchedule),
//! call `handle` and persist the event as one atomic unit, serialised per
//! venue, so that two concurrent commands can never both pass the overlap
//! check for the same dates.

use crate::environment::BookingEnvironment;
use crate::error::Result;
use crate::schedule::{BookingCommand, VenueSchedule};
use crate::types::{
    Booking, BookingFilter, BookingId, DashboardSummary, DateRange, SavedVenue, User, UserId,
    Venue, VenueFilter, VenueId,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Venue catalog storage.
#[async_trait]
pub trait VenueRepository: Send + Sync {
    /// Inserts a new venue.
    ///
    /// # Errors
    ///
    /// Returns `Storage` on persistence failure.
    async fn create(&self, venue: &Venue) -> Result<Venue>;

    /// Fetches a venue.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no venue has `id`.
    async fn get(&self, id: VenueId) -> Result<Venue>;

    /// Lists venues matching `filter`, by name.
    ///
    /// # Errors
    ///
    /// Returns `Storage` on persistence failure.
    async fn list(&self, filter: &VenueFilter) -> Result<Vec<Venue>>;

    /// Replaces a venue's attributes.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the venue does not exist.
    async fn update(&self, venue: &Venue) -> Result<Venue>;

    /// Deletes a venue and its bookmarks.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the venue does not exist and `VenueInUse` if
    /// bookings reference it.
    async fn delete(&self, id: VenueId) -> Result<()>;
}

/// Booking storage.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Validates and persists `command` atomically, returning the resulting
    /// booking.
    ///
    /// # Errors
    ///
    /// Returns whatever [`VenueSchedule::handle`] refuses with, `NotFound` for
    /// unknown venues or bookings, and `Storage` on persistence failure.
    /// Nothing is persisted on error.
    async fn execute(&self, command: BookingCommand, env: &BookingEnvironment) -> Result<Booking>;

    /// Fetches a booking.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no booking has `id`.
    async fn get(&self, id: BookingId) -> Result<Booking>;

    /// Lists bookings matching `filter`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `Storage` on persistence failure.
    async fn list(&self, filter: &BookingFilter) -> Result<Vec<Booking>>;

    /// Loads a read-only schedule of `venue_id` with the non-rejected
    /// bookings overlapping `range`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the venue does not exist.
    async fn schedule(&self, venue_id: VenueId, range: &DateRange) -> Result<VenueSchedule>;
}

/// Bookmark storage.
#[async_trait]
pub trait SavedVenueRepository: Send + Sync {
    /// Bookmarks `venue_id` for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the venue does not exist and `AlreadySaved` if
    /// the pair exists.
    async fn save(
        &self,
        user_id: UserId,
        venue_id: VenueId,
        at: DateTime<Utc>,
    ) -> Result<SavedVenue>;

    /// Removes a bookmark.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the pair does not exist.
    async fn remove(&self, user_id: UserId, venue_id: VenueId) -> Result<()>;

    /// Bookmarks of `user_id`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `Storage` on persistence failure.
    async fn list(&self, user_id: UserId) -> Result<Vec<SavedVenue>>;
}

/// User account storage.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts a new user.
    ///
    /// # Errors
    ///
    /// Returns `Duplicate` if the username or email is taken.
    async fn create(&self, user: &User) -> Result<User>;

    /// Fetches a user.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no user has `id`.
    async fn get(&self, id: UserId) -> Result<User>;

    /// All users, by username.
    ///
    /// # Errors
    ///
    /// Returns `Storage` on persistence failure.
    async fn list(&self) -> Result<Vec<User>>;
}

/// Read-only aggregates for the admin dashboard.
#[async_trait]
pub trait ReportRepository: Send + Sync {
    /// Computes the dashboard summary.
    ///
    /// # Errors
    ///
    /// Returns `Storage` on persistence failure.
    async fn summary(&self) -> Result<DashboardSummary>;
}

/// Reachability of the backing store, for readiness probes.
#[async_trait]
pub trait StoreHealth: Send + Sync {
    /// Checks that the store answers queries.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the store is unreachable.
    async fn ping(&self) -> Result<()>;
}

/// A notification could not be delivered.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Notification failed: {0}")]
pub struct NotificationError(pub String);

/// Outbound messages to clients.
///
/// Delivery is best effort; callers log failures and carry on.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// A booking request was recorded.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError`] if delivery failed.
    async fn booking_received(
        &self,
        booking: &Booking,
        venue: &Venue,
    ) -> std::result::Result<(), NotificationError>;

    /// A booking was approved.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError`] if delivery failed.
    async fn booking_approved(
        &self,
        booking: &Booking,
        venue: &Venue,
    ) -> std::result::Result<(), NotificationError>;

    /// A booking was rejected.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError`] if delivery failed.
    async fn booking_rejected(
        &self,
        booking: &Booking,
        venue: &Venue,
    ) -> std::result::Result<(), NotificationError>;

    /// A booking is still unpaid.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError`] if delivery failed.
    async fn payment_reminder(
        &self,
        booking: &Booking,
        venue: &Venue,
    ) -> std::result::Result<(), NotificationError>;

    /// Welcome message for a newly registered user.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError`] if delivery failed.
    async fn user_registered(&self, user: &User) -> std::result::Result<(), NotificationError>;
}

/// Normalises a phone number to international form.
///
/// Numbers already starting with `+` are kept; a leading `0` is replaced by
/// the default country code `+254`; anything else gets a `+` prefix.
/// Whitespace and dashes are removed. Returns `None` for blank input.
///
/// ```
/// use venue_booking_core::providers::normalize_phone;
///
/// assert_eq!(normalize_phone("0712 345-678").as_deref(), Some("+254712345678"));
/// assert_eq!(normalize_phone("254712345678").as_deref(), Some("+254712345678"));
/// assert_eq!(normalize_phone("+447700900123").as_deref(), Some("+447700900123"));
/// ```
#[must_use]
pub fn normalize_phone(raw: &str) -> Option<String> {
    let digits: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();

    if digits.is_empty() {
        return None;
    }
    if digits.starts_with('+') {
        Some(digits)
    } else if let Some(rest) = digits.strip_prefix('0') {
        Some(format!("+254{rest}"))
    } else {
        Some(format!("+{digits}"))
    }
}
