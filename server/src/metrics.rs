//! Business metrics for the booking platform.
//!
//! # Exported Metrics
//!
//! ## Counters
//! - `venue_booking_bookings_total{outcome}` - Booking requests by outcome (created, refused)
//! - `venue_booking_transitions_total{to}` - Approval transitions by target status
//! - `venue_booking_payments_total{to}` - Payment transitions by target status
//! - `venue_booking_conflicts_total` - Requests or approvals refused for overlapping dates

use metrics::describe_counter;
use venue_booking_core::{BookingStatus, PaymentStatus};

/// Register all metric descriptions.
///
/// Call once at startup, after the exporter is installed.
pub fn register_booking_metrics() {
    describe_counter!(
        "venue_booking_bookings_total",
        "Total number of booking requests by outcome (created, refused)"
    );
    describe_counter!(
        "venue_booking_transitions_total",
        "Total number of approval transitions by target status"
    );
    describe_counter!(
        "venue_booking_payments_total",
        "Total number of payment transitions by target status"
    );
    describe_counter!(
        "venue_booking_conflicts_total",
        "Total number of requests or approvals refused for overlapping dates"
    );

    tracing::info!("Booking metrics registered");
}

/// Record a booking request.
pub fn record_booking_request(created: bool) {
    let outcome = if created { "created" } else { "refused" };
    metrics::counter!("venue_booking_bookings_total", "outcome" => outcome).increment(1);
}

/// Record an approval transition.
pub fn record_transition(to: BookingStatus) {
    metrics::counter!("venue_booking_transitions_total", "to" => to.as_str()).increment(1);
    tracing::debug!(to = to.as_str(), "Recorded transition metric");
}

/// Record a payment transition.
pub fn record_payment(to: PaymentStatus) {
    metrics::counter!("venue_booking_payments_total", "to" => to.as_str()).increment(1);
}

/// Record a refusal for overlapping dates.
pub fn record_conflict() {
    metrics::counter!("venue_booking_conflicts_total").increment(1);
}
