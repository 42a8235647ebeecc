//! # Venue Booking Testing
//!
//! Testing utilities for the venue booking platform.
//!
//! This crate provides:
//! - [`mocks::FixedClock`]: deterministic time
//! - [`InMemoryStore`]: every repository trait behind one mutex
//! - [`RecordingNotifier`]: captures outbound notifications
//! - [`fixtures`]: callers, venues and booking requests for tests
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use venue_booking_core::{BookingCommand, BookingEnvironment, ConflictPolicy, BookingId};
//! use venue_booking_core::providers::{BookingRepository, VenueRepository};
//! use venue_booking_testing::{fixtures, test_clock, InMemoryStore};
//!
//! # tokio_test::block_on(async {
//! let store = InMemoryStore::new();
//! let env = BookingEnvironment::new(Arc::new(test_clock()), ConflictPolicy::ApprovedOnly);
//!
//! let venue = store.create(&fixtures::venue("Garden", 50)).await.unwrap();
//! let request = fixtures::booking_request(venue.id, fixtures::day(1), fixtures::day(3), 20);
//! let booking = store
//!     .execute(BookingCommand::Request { booking_id: BookingId::new(), request }, &env)
//!     .await
//!     .unwrap();
//! assert_eq!(booking.dates.days(), 2);
//! # });
//! ```

mod memory;
mod notifier;

pub use memory::InMemoryStore;
pub use mocks::{FixedClock, test_clock};
pub use notifier::{Notification, NotificationKind, RecordingNotifier};

/// Mock implementations of environment traits.
pub mod mocks {
    use chrono::{DateTime, Utc};
    use std::sync::{Arc, Mutex, PoisonError};
    use venue_booking_core::Clock;

    /// Fixed clock for deterministic tests
    ///
    /// Returns the same time until advanced, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use venue_booking_testing::mocks::FixedClock;
    /// use venue_booking_core::Clock;
    /// use chrono::{Duration, Utc};
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// assert_eq!(time1, clock.now()); // Always the same!
    ///
    /// clock.advance(Duration::hours(1));
    /// assert_eq!(clock.now() - time1, Duration::hours(1));
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: Arc<Mutex<DateTime<Utc>>>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub fn new(time: DateTime<Utc>) -> Self {
            Self {
                time: Arc::new(Mutex::new(time)),
            }
        }

        /// Moves the clock forward. Clones share the same time.
        pub fn advance(&self, by: chrono::Duration) {
            let mut time = self.time.lock().unwrap_or_else(PoisonError::into_inner);
            *time += by;
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            *self.time.lock().unwrap_or_else(PoisonError::into_inner)
        }
    }

    /// Create a default fixed clock for tests (2024-05-01 09:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2024-05-01T09:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

/// Builders for common test data.
pub mod fixtures {
    use chrono::NaiveDate;
    use venue_booking_core::{
        BookingRequest, Caller, ContactInfo, Credential, NewUser, NewVenue, Role, UserId, Venue,
        VenueId,
    };

    /// A day in June 2024.
    ///
    /// # Panics
    ///
    /// Panics if `d` is not a valid day of June.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).expect("valid June date")
    }

    /// A fresh admin caller.
    #[must_use]
    pub fn admin() -> Caller {
        Caller::new(UserId::new(), Role::Admin)
    }

    /// A fresh client caller.
    #[must_use]
    pub fn client() -> Caller {
        Caller::new(UserId::new(), Role::Client)
    }

    /// Venue creation payload.
    #[must_use]
    pub fn new_venue(name: &str, capacity: u32) -> NewVenue {
        NewVenue {
            name: name.to_string(),
            location: "Nairobi".to_string(),
            description: format!("{name} for weddings and corporate events"),
            capacity,
            price_per_day: 25_000,
            category: "garden".to_string(),
            image_urls: vec![format!("https://img.example.com/{}.jpg", name.to_lowercase())],
            is_active: true,
        }
    }

    /// An active venue owned by a fresh admin.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn venue(name: &str, capacity: u32) -> Venue {
        new_venue(name, capacity)
            .into_venue(VenueId::new(), UserId::new(), chrono::Utc::now())
            .expect("fixture venue is valid")
    }

    /// Booking request from a fresh user.
    #[must_use]
    pub fn booking_request(
        venue_id: VenueId,
        start: NaiveDate,
        end: NaiveDate,
        guests: u32,
    ) -> BookingRequest {
        BookingRequest {
            venue_id,
            user_id: UserId::new(),
            start_date: start,
            end_date: end,
            guest_count: guests,
            contact: ContactInfo {
                email: "guest@example.com".to_string(),
                phone: Some("0712345678".to_string()),
            },
        }
    }

    /// Registration payload with a password credential.
    #[must_use]
    pub fn new_user(username: &str, role: Role) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            role,
            credential: Credential::Password {
                hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string(),
            },
            phone: Some("0700000000".to_string()),
            location: Some("Nairobi".to_string()),
        }
    }
}

/// Installs a test-friendly tracing subscriber once per process.
///
/// Honours `RUST_LOG`; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}
