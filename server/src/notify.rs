//! Notifier that writes booking notifications to the log.
//!
//! Stands in for an SMS or email gateway: every message becomes a
//! structured `tracing` event on the `notifications` target.

use async_trait::async_trait;
use venue_booking_core::providers::{NotificationError, Notifier, normalize_phone};
use venue_booking_core::{Booking, User, Venue};

/// Logs each notification instead of delivering it.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl LogNotifier {
    fn send(kind: &'static str, booking: &Booking, venue: &Venue, message: &str) {
        let phone = booking.contact.phone.as_deref().and_then(normalize_phone);
        tracing::info!(
            target: "notifications",
            kind,
            booking_id = %booking.id,
            email = %booking.contact.email,
            phone = phone.as_deref().unwrap_or("-"),
            venue = %venue.name,
            "{message}"
        );
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn booking_received(
        &self,
        booking: &Booking,
        venue: &Venue,
    ) -> Result<(), NotificationError> {
        let message = format!(
            "Your request for {} on {} has been received and is awaiting approval",
            venue.name, booking.dates
        );
        Self::send("received", booking, venue, &message);
        Ok(())
    }

    async fn booking_approved(
        &self,
        booking: &Booking,
        venue: &Venue,
    ) -> Result<(), NotificationError> {
        let message = format!(
            "Your booking for {} on {} is confirmed. Total: {}",
            venue.name, booking.dates, booking.total_cost
        );
        Self::send("approved", booking, venue, &message);
        Ok(())
    }

    async fn booking_rejected(
        &self,
        booking: &Booking,
        venue: &Venue,
    ) -> Result<(), NotificationError> {
        let message = format!(
            "Your request for {} on {} could not be accepted",
            venue.name, booking.dates
        );
        Self::send("rejected", booking, venue, &message);
        Ok(())
    }

    async fn payment_reminder(
        &self,
        booking: &Booking,
        venue: &Venue,
    ) -> Result<(), NotificationError> {
        let message = format!(
            "Payment of {} for {} on {} is still pending. Complete payment to confirm your booking",
            booking.total_cost, venue.name, booking.dates
        );
        Self::send("payment_reminder", booking, venue, &message);
        Ok(())
    }

    async fn user_registered(&self, user: &User) -> Result<(), NotificationError> {
        let phone = user.phone.as_deref().and_then(normalize_phone);
        tracing::info!(
            target: "notifications",
            kind = "welcome",
            user_id = %user.id,
            email = %user.email,
            phone = phone.as_deref().unwrap_or("-"),
            "Welcome, {}! Discover venues for your next event",
            user.username
        );
        Ok(())
    }
}
