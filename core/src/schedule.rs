//! Booking rules for a single venue.
//!
//! A [`VenueSchedule`] is a venue together with the bookings relevant to the
//! command being processed. Repositories load it (under a lock on the venue),
//! call [`VenueSchedule::handle`] to validate a [`BookingCommand`], persist the
//! resulting [`BookingEvent`] and fold it back with [`VenueSchedule::apply`].
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use chrono::{NaiveDate, Utc};
//! use venue_booking_core::{
//!     BookingCommand, BookingEnvironment, BookingId, BookingRequest, ConflictPolicy,
//!     ContactInfo, NewVenue, SystemClock, UserId, VenueId, VenueSchedule,
//! };
//!
//! # fn main() -> venue_booking_core::Result<()> {
//! let env = BookingEnvironment::new(Arc::new(SystemClock), ConflictPolicy::ApprovedOnly);
//! let venue = NewVenue {
//!     name: "Garden".into(),
//!     location: "Nairobi".into(),
//!     description: String::new(),
//!     capacity: 50,
//!     price_per_day: 10_000,
//!     category: "garden".into(),
//!     image_urls: vec![],
//!     is_active: true,
//! }
//! .into_venue(VenueId::new(), UserId::new(), Utc::now())?;
//!
//! let mut schedule = VenueSchedule::new(venue.clone(), Vec::new());
//! let event = schedule.handle(
//!     BookingCommand::Request {
//!         booking_id: BookingId::new(),
//!         request: BookingRequest {
//!             venue_id: venue.id,
//!             user_id: UserId::new(),
//!             start_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
//!             end_date: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
//!             guest_count: 40,
//!             contact: ContactInfo { email: "guest@example.com".into(), phone: None },
//!         },
//!     },
//!     &env,
//! )?;
//! schedule.apply(&event);
//! assert_eq!(schedule.bookings()[0].total_cost, 20_000);
//! # Ok(())
//! # }
//! ```

use crate::environment::{BookingEnvironment, ConflictPolicy};
use crate::error::{BookingError, Result};
use crate::types::{
    Booking, BookingId, BookingRequest, BookingStatus, DateRange, PaymentStatus, Venue,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Commands and events
// ============================================================================

/// A state-changing request against a venue's schedule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BookingCommand {
    /// Create a Pending booking
    Request {
        /// Id for the new booking
        booking_id: BookingId,
        /// What is being requested
        request: BookingRequest,
    },
    /// Pending → Approved
    Approve {
        /// Target booking
        booking_id: BookingId,
    },
    /// Pending → Rejected
    Reject {
        /// Target booking
        booking_id: BookingId,
    },
    /// Advance the payment status
    SetPayment {
        /// Target booking
        booking_id: BookingId,
        /// Requested payment status
        status: PaymentStatus,
    },
}

impl BookingCommand {
    /// Booking the command creates or targets.
    #[must_use]
    pub const fn booking_id(&self) -> BookingId {
        match self {
            Self::Request { booking_id, .. }
            | Self::Approve { booking_id }
            | Self::Reject { booking_id }
            | Self::SetPayment { booking_id, .. } => *booking_id,
        }
    }
}

/// The validated outcome of a [`BookingCommand`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BookingEvent {
    /// A booking was created in Pending state
    Requested {
        /// The new booking
        booking: Booking,
    },
    /// Approval status changed
    StatusChanged {
        /// Booking id
        booking_id: BookingId,
        /// Previous status
        from: BookingStatus,
        /// New status
        to: BookingStatus,
        /// When
        at: DateTime<Utc>,
    },
    /// Payment status changed
    PaymentChanged {
        /// Booking id
        booking_id: BookingId,
        /// Previous status
        from: PaymentStatus,
        /// New status
        to: PaymentStatus,
        /// When
        at: DateTime<Utc>,
    },
}

impl BookingEvent {
    /// Booking the event belongs to.
    #[must_use]
    pub const fn booking_id(&self) -> BookingId {
        match self {
            Self::Requested { booking } => booking.id,
            Self::StatusChanged { booking_id, .. } | Self::PaymentChanged { booking_id, .. } => {
                *booking_id
            }
        }
    }
}

// ============================================================================
// Schedule
// ============================================================================

/// A venue and the bookings that can affect a decision about it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VenueSchedule {
    venue: Venue,
    bookings: Vec<Booking>,
}

impl VenueSchedule {
    /// Creates a schedule from loaded state.
    #[must_use]
    pub const fn new(venue: Venue, bookings: Vec<Booking>) -> Self {
        Self { venue, bookings }
    }

    /// The venue.
    #[must_use]
    pub const fn venue(&self) -> &Venue {
        &self.venue
    }

    /// The loaded bookings.
    #[must_use]
    pub fn bookings(&self) -> &[Booking] {
        &self.bookings
    }

    /// Looks up a loaded booking.
    #[must_use]
    pub fn booking(&self, id: BookingId) -> Option<&Booking> {
        self.bookings.iter().find(|b| b.id == id)
    }

    /// Consumes the schedule, returning the booking with `id` if loaded.
    #[must_use]
    pub fn into_booking(self, id: BookingId) -> Option<Booking> {
        self.bookings.into_iter().find(|b| b.id == id)
    }

    /// First loaded booking overlapping `range` whose status is blocking,
    /// ignoring `exclude`.
    fn first_conflict(
        &self,
        range: &DateRange,
        blocking: impl Fn(BookingStatus) -> bool,
        exclude: Option<BookingId>,
    ) -> Option<&Booking> {
        self.bookings.iter().find(|b| {
            Some(b.id) != exclude && blocking(b.status) && b.dates.overlaps(range)
        })
    }

    /// Whether a request for `range` and `guests` could be accepted now.
    ///
    /// # Errors
    ///
    /// - [`BookingError::VenueInactive`] if the venue does not take bookings
    /// - [`BookingError::Validation`] if `guests` is zero
    /// - [`BookingError::CapacityExceeded`] if `guests` exceeds the capacity
    /// - [`BookingError::Conflict`] if a blocking booking overlaps `range`
    pub fn check_availability(
        &self,
        range: &DateRange,
        guests: u32,
        policy: ConflictPolicy,
    ) -> Result<()> {
        if !self.venue.is_active {
            return Err(BookingError::VenueInactive(self.venue.id.to_string()));
        }
        if guests == 0 {
            return Err(BookingError::Validation(
                "guest count must be at least 1".into(),
            ));
        }
        if guests > self.venue.capacity {
            return Err(BookingError::CapacityExceeded {
                guests,
                capacity: self.venue.capacity,
            });
        }
        match self.first_conflict(range, |s| policy.blocks(s), None) {
            Some(existing) => Err(BookingError::Conflict {
                existing: existing.id.to_string(),
                start: range.start(),
                end: range.end(),
            }),
            None => Ok(()),
        }
    }

    /// Validates `command` against the loaded state.
    ///
    /// Does not modify the schedule; pass the returned event to
    /// [`VenueSchedule::apply`] once it has been persisted.
    ///
    /// # Errors
    ///
    /// Returns the [`BookingError`] describing why the command is refused.
    pub fn handle(
        &self,
        command: BookingCommand,
        env: &BookingEnvironment,
    ) -> Result<BookingEvent> {
        match command {
            BookingCommand::Request {
                booking_id,
                request,
            } => self.handle_request(booking_id, request, env),
            BookingCommand::Approve { booking_id } => {
                self.handle_approval(booking_id, BookingStatus::Approved, env)
            }
            BookingCommand::Reject { booking_id } => {
                self.handle_approval(booking_id, BookingStatus::Rejected, env)
            }
            BookingCommand::SetPayment { booking_id, status } => {
                self.handle_payment(booking_id, status, env)
            }
        }
    }

    fn handle_request(
        &self,
        booking_id: BookingId,
        request: BookingRequest,
        env: &BookingEnvironment,
    ) -> Result<BookingEvent> {
        let dates = request.dates()?;
        request.contact.validate()?;
        if request.venue_id != self.venue.id {
            return Err(BookingError::not_found("Venue", request.venue_id));
        }
        self.check_availability(&dates, request.guest_count, env.policy)?;

        let now = env.now();
        let booking = Booking {
            id: booking_id,
            venue_id: self.venue.id,
            user_id: request.user_id,
            dates,
            guest_count: request.guest_count,
            status: BookingStatus::Pending,
            payment_status: PaymentStatus::Unpaid,
            contact: request.contact,
            total_cost: self.venue.price_per_day.saturating_mul(dates.days()),
            created_at: now,
            updated_at: now,
        };
        Ok(BookingEvent::Requested { booking })
    }

    fn handle_approval(
        &self,
        booking_id: BookingId,
        to: BookingStatus,
        env: &BookingEnvironment,
    ) -> Result<BookingEvent> {
        let booking = self
            .booking(booking_id)
            .ok_or_else(|| BookingError::not_found("Booking", booking_id))?;

        if !booking.status.can_transition_to(to) {
            return Err(BookingError::approval_transition(booking.status, to));
        }

        // Other bookings may have been approved since this one was requested.
        if to == BookingStatus::Approved {
            let approved = |s: BookingStatus| s == BookingStatus::Approved;
            if let Some(existing) =
                self.first_conflict(&booking.dates, approved, Some(booking_id))
            {
                return Err(BookingError::Conflict {
                    existing: existing.id.to_string(),
                    start: booking.dates.start(),
                    end: booking.dates.end(),
                });
            }
        }

        Ok(BookingEvent::StatusChanged {
            booking_id,
            from: booking.status,
            to,
            at: env.now(),
        })
    }

    fn handle_payment(
        &self,
        booking_id: BookingId,
        to: PaymentStatus,
        env: &BookingEnvironment,
    ) -> Result<BookingEvent> {
        let booking = self
            .booking(booking_id)
            .ok_or_else(|| BookingError::not_found("Booking", booking_id))?;

        if !booking.payment_status.can_transition_to(to) {
            return Err(BookingError::InvalidTransition {
                axis: "payment",
                from: booking.payment_status.to_string(),
                to: to.to_string(),
            });
        }

        Ok(BookingEvent::PaymentChanged {
            booking_id,
            from: booking.payment_status,
            to,
            at: env.now(),
        })
    }

    /// Folds a persisted event into the schedule.
    pub fn apply(&mut self, event: &BookingEvent) {
        match event {
            BookingEvent::Requested { booking } => {
                self.bookings.push(booking.clone());
            }
            BookingEvent::StatusChanged { booking_id, to, at, .. } => {
                if let Some(b) = self.bookings.iter_mut().find(|b| b.id == *booking_id) {
                    b.status = *to;
                    b.updated_at = *at;
                }
            }
            BookingEvent::PaymentChanged { booking_id, to, at, .. } => {
                if let Some(b) = self.bookings.iter_mut().find(|b| b.id == *booking_id) {
                    b.payment_status = *to;
                    b.updated_at = *at;
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::environment::Clock;
    use crate::types::{ContactInfo, UserId, VenueId};
    use chrono::NaiveDate;
    use proptest::prelude::*;
    use std::sync::Arc;

    struct FixedClock(DateTime<Utc>);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    fn env(policy: ConflictPolicy) -> BookingEnvironment {
        let now = DateTime::parse_from_rfc3339("2024-05-01T09:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        BookingEnvironment::new(Arc::new(FixedClock(now)), policy)
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn venue(capacity: u32) -> Venue {
        let now = Utc::now();
        Venue {
            id: VenueId::new(),
            name: "Lakeside Hall".into(),
            location: "Naivasha".into(),
            description: String::new(),
            capacity,
            price_per_day: 15_000,
            category: "hall".into(),
            owner_id: UserId::new(),
            image_urls: vec![],
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn request(venue: &Venue, start: u32, end: u32, guests: u32) -> BookingCommand {
        BookingCommand::Request {
            booking_id: BookingId::new(),
            request: BookingRequest {
                venue_id: venue.id,
                user_id: UserId::new(),
                start_date: day(start),
                end_date: day(end),
                guest_count: guests,
                contact: ContactInfo {
                    email: "client@example.com".into(),
                    phone: Some("0712345678".into()),
                },
            },
        }
    }

    /// Handles and applies a command, returning the affected booking id.
    fn run(
        schedule: &mut VenueSchedule,
        cmd: BookingCommand,
        env: &BookingEnvironment,
    ) -> Result<BookingId> {
        let event = schedule.handle(cmd, env)?;
        schedule.apply(&event);
        Ok(event.booking_id())
    }

    #[test]
    fn test_request_creates_pending_booking_with_total_cost() {
        let env = env(ConflictPolicy::ApprovedOnly);
        let v = venue(50);
        let mut schedule = VenueSchedule::new(v.clone(), vec![]);

        let id = run(&mut schedule, request(&v, 1, 4, 20), &env).unwrap();
        let booking = schedule.booking(id).unwrap();

        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.payment_status, PaymentStatus::Unpaid);
        assert_eq!(booking.total_cost, 45_000);
        assert_eq!(booking.created_at, env.now());
    }

    #[test]
    fn test_request_requires_contact_email() {
        let env = env(ConflictPolicy::ApprovedOnly);
        let v = venue(50);
        let schedule = VenueSchedule::new(v.clone(), vec![]);

        for email in ["", "   ", "guest", "guest@localhost", "@example.com"] {
            let mut cmd = request(&v, 1, 3, 10);
            if let BookingCommand::Request { request, .. } = &mut cmd {
                request.contact.email = email.into();
            }
            let result = schedule.handle(cmd, &env);
            assert!(
                matches!(result, Err(BookingError::Validation(_))),
                "email {email:?} accepted"
            );
        }
        assert!(schedule.bookings().is_empty());
    }

    #[test]
    fn test_conflict_example_is_boundary_exclusive() {
        let env = env(ConflictPolicy::ApprovedOnly);
        let v = venue(50);
        let mut schedule = VenueSchedule::new(v.clone(), vec![]);

        let a = run(&mut schedule, request(&v, 1, 3, 10), &env).unwrap();
        run(&mut schedule, BookingCommand::Approve { booking_id: a }, &env).unwrap();

        let b = schedule.handle(request(&v, 2, 4, 10), &env);
        assert!(matches!(b, Err(BookingError::Conflict { .. })));

        let c = schedule.handle(request(&v, 3, 5, 10), &env);
        assert!(c.is_ok());
    }

    #[test]
    fn test_invalid_range_and_capacity() {
        let env = env(ConflictPolicy::ApprovedOnly);
        let v = venue(50);
        let schedule = VenueSchedule::new(v.clone(), vec![]);

        assert!(matches!(
            schedule.handle(request(&v, 3, 3, 10), &env),
            Err(BookingError::InvalidRange { .. })
        ));
        assert!(matches!(
            schedule.handle(request(&v, 4, 2, 10), &env),
            Err(BookingError::InvalidRange { .. })
        ));
        assert!(matches!(
            schedule.handle(request(&v, 1, 2, 51), &env),
            Err(BookingError::CapacityExceeded { guests: 51, capacity: 50 })
        ));
        assert!(matches!(
            schedule.handle(request(&v, 1, 2, 0), &env),
            Err(BookingError::Validation(_))
        ));
        assert!(schedule.bookings().is_empty());
    }

    #[test]
    fn test_inactive_venue_refuses_requests() {
        let env = env(ConflictPolicy::ApprovedOnly);
        let mut v = venue(50);
        v.is_active = false;
        let schedule = VenueSchedule::new(v.clone(), vec![]);

        assert!(matches!(
            schedule.handle(request(&v, 1, 2, 10), &env),
            Err(BookingError::VenueInactive(_))
        ));
    }

    #[test]
    fn test_pending_blocks_only_under_strict_policy() {
        let v = venue(50);

        let loose = env(ConflictPolicy::ApprovedOnly);
        let mut schedule = VenueSchedule::new(v.clone(), vec![]);
        run(&mut schedule, request(&v, 1, 3, 10), &loose).unwrap();
        assert!(schedule.handle(request(&v, 2, 4, 10), &loose).is_ok());

        let strict = env(ConflictPolicy::ApprovedAndPending);
        assert!(matches!(
            schedule.handle(request(&v, 2, 4, 10), &strict),
            Err(BookingError::Conflict { .. })
        ));
    }

    #[test]
    fn test_approval_rechecks_overlap_and_leaves_state_unchanged() {
        let env = env(ConflictPolicy::ApprovedOnly);
        let v = venue(50);
        let mut schedule = VenueSchedule::new(v.clone(), vec![]);

        let first = run(&mut schedule, request(&v, 1, 3, 10), &env).unwrap();
        let second = run(&mut schedule, request(&v, 2, 4, 10), &env).unwrap();
        run(&mut schedule, BookingCommand::Approve { booking_id: first }, &env).unwrap();

        let before = schedule.clone();
        let result = schedule.handle(BookingCommand::Approve { booking_id: second }, &env);

        assert!(matches!(result, Err(BookingError::Conflict { .. })));
        assert_eq!(schedule, before);
        assert_eq!(schedule.booking(second).unwrap().status, BookingStatus::Pending);
    }

    #[test]
    fn test_terminal_states_reject_transitions() {
        let env = env(ConflictPolicy::ApprovedOnly);
        let v = venue(50);
        let mut schedule = VenueSchedule::new(v.clone(), vec![]);

        let approved = run(&mut schedule, request(&v, 1, 3, 10), &env).unwrap();
        run(&mut schedule, BookingCommand::Approve { booking_id: approved }, &env).unwrap();
        let rejected = run(&mut schedule, request(&v, 5, 6, 10), &env).unwrap();
        run(&mut schedule, BookingCommand::Reject { booking_id: rejected }, &env).unwrap();

        for cmd in [
            BookingCommand::Reject { booking_id: approved },
            BookingCommand::Approve { booking_id: approved },
            BookingCommand::Approve { booking_id: rejected },
        ] {
            assert!(matches!(
                schedule.handle(cmd, &env),
                Err(BookingError::InvalidTransition { axis: "approval", .. })
            ));
        }
    }

    #[test]
    fn test_payment_moves_forward_independently_of_approval() {
        let env = env(ConflictPolicy::ApprovedOnly);
        let v = venue(50);
        let mut schedule = VenueSchedule::new(v.clone(), vec![]);
        let id = run(&mut schedule, request(&v, 1, 3, 10), &env).unwrap();

        let refund_early = schedule.handle(
            BookingCommand::SetPayment { booking_id: id, status: PaymentStatus::Refunded },
            &env,
        );
        assert!(matches!(
            refund_early,
            Err(BookingError::InvalidTransition { axis: "payment", .. })
        ));

        run(
            &mut schedule,
            BookingCommand::SetPayment { booking_id: id, status: PaymentStatus::Paid },
            &env,
        )
        .unwrap();
        run(
            &mut schedule,
            BookingCommand::SetPayment { booking_id: id, status: PaymentStatus::Refunded },
            &env,
        )
        .unwrap();

        let booking = schedule.booking(id).unwrap();
        assert_eq!(booking.payment_status, PaymentStatus::Refunded);
        assert_eq!(booking.status, BookingStatus::Pending);
    }

    #[test]
    fn test_unknown_booking_is_not_found() {
        let env = env(ConflictPolicy::ApprovedOnly);
        let schedule = VenueSchedule::new(venue(10), vec![]);
        assert!(matches!(
            schedule.handle(BookingCommand::Approve { booking_id: BookingId::new() }, &env),
            Err(BookingError::NotFound { entity: "Booking", .. })
        ));
    }

    #[derive(Clone, Debug)]
    enum Op {
        Request { start: u32, len: u32 },
        Approve(usize),
        Reject(usize),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (1u32..25, 1u32..6).prop_map(|(start, len)| Op::Request { start, len }),
            (0usize..32).prop_map(Op::Approve),
            (0usize..32).prop_map(Op::Reject),
        ]
    }

    proptest! {
        #[test]
        fn prop_approved_bookings_never_overlap(
            ops in prop::collection::vec(op(), 1..60),
            strict in any::<bool>(),
        ) {
            let policy = if strict {
                ConflictPolicy::ApprovedAndPending
            } else {
                ConflictPolicy::ApprovedOnly
            };
            let env = env(policy);
            let v = venue(100);
            let mut schedule = VenueSchedule::new(v.clone(), vec![]);

            for op in ops {
                let ids: Vec<BookingId> = schedule.bookings().iter().map(|b| b.id).collect();
                let pick = |i: usize| ids.get(i % ids.len().max(1)).copied();
                let cmd = match op {
                    Op::Request { start, len } => Some(request(&v, start, start + len, 10)),
                    Op::Approve(i) => {
                        pick(i).map(|booking_id| BookingCommand::Approve { booking_id })
                    }
                    Op::Reject(i) => {
                        pick(i).map(|booking_id| BookingCommand::Reject { booking_id })
                    }
                };
                if let Some(cmd) = cmd {
                    let _ = run(&mut schedule, cmd, &env);
                }
            }

            let approved: Vec<&Booking> = schedule
                .bookings()
                .iter()
                .filter(|b| b.status == BookingStatus::Approved)
                .collect();
            for (i, a) in approved.iter().enumerate() {
                for b in &approved[i + 1..] {
                    prop_assert!(!a.dates.overlaps(&b.dates), "{} overlaps {}", a.dates, b.dates);
                }
            }
        }
    }
}
