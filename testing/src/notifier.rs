//! Notifier that records messages instead of sending them.

use async_trait::async_trait;
use std::sync::{Arc, Mutex, PoisonError};
use std::sync::atomic::{AtomicBool, Ordering};
use venue_booking_core::providers::{NotificationError, Notifier, normalize_phone};
use venue_booking_core::{Booking, BookingId, User, Venue};

/// Which message was sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    /// Booking request recorded
    Received,
    /// Booking approved
    Approved,
    /// Booking rejected
    Rejected,
    /// Booking still unpaid
    PaymentReminder,
    /// New account registered
    Welcome,
}

/// A captured notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Message kind
    pub kind: NotificationKind,
    /// Booking it refers to; `None` for account messages
    pub booking_id: Option<BookingId>,
    /// Recipient email
    pub email: String,
    /// Normalised recipient phone
    pub phone: Option<String>,
    /// Venue name included in the message; `None` for account messages
    pub venue_name: Option<String>,
}

/// Recording notifier for tests.
///
/// Can be switched into a failing mode to check that delivery errors never
/// fail the booking operation.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<Notification>>>,
    failing: Arc<AtomicBool>,
}

impl RecordingNotifier {
    /// Create a notifier that records every message.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent delivery fail (nothing is recorded).
    pub fn fail_deliveries(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    /// Messages recorded so far.
    #[must_use]
    pub fn sent(&self) -> Vec<Notification> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, notification: Notification) -> Result<(), NotificationError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(NotificationError("delivery disabled".into()));
        }
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification);
        Ok(())
    }

    fn record_booking(
        &self,
        kind: NotificationKind,
        booking: &Booking,
        venue: &Venue,
    ) -> Result<(), NotificationError> {
        self.record(Notification {
            kind,
            booking_id: Some(booking.id),
            email: booking.contact.email.clone(),
            phone: booking.contact.phone.as_deref().and_then(normalize_phone),
            venue_name: Some(venue.name.clone()),
        })
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn booking_received(
        &self,
        booking: &Booking,
        venue: &Venue,
    ) -> Result<(), NotificationError> {
        self.record_booking(NotificationKind::Received, booking, venue)
    }

    async fn booking_approved(
        &self,
        booking: &Booking,
        venue: &Venue,
    ) -> Result<(), NotificationError> {
        self.record_booking(NotificationKind::Approved, booking, venue)
    }

    async fn booking_rejected(
        &self,
        booking: &Booking,
        venue: &Venue,
    ) -> Result<(), NotificationError> {
        self.record_booking(NotificationKind::Rejected, booking, venue)
    }

    async fn payment_reminder(
        &self,
        booking: &Booking,
        venue: &Venue,
    ) -> Result<(), NotificationError> {
        self.record_booking(NotificationKind::PaymentReminder, booking, venue)
    }

    async fn user_registered(&self, user: &User) -> Result<(), NotificationError> {
        self.record(Notification {
            kind: NotificationKind::Welcome,
            booking_id: None,
            email: user.email.clone(),
            phone: user.phone.as_deref().and_then(normalize_phone),
            venue_name: None,
        })
    }
}
