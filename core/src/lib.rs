//! # Venue Booking Core
//!
//! Domain types and booking rules for the venue booking platform.
//!
//! This crate is the functional core of the system. It owns:
//!
//! - **Types**: venues, bookings, users, saved venues and their identifiers
//! - **Schedule**: the per-venue availability and status-transition rules
//! - **Access**: role checks performed before any mutation
//! - **Providers**: repository and notifier traits implemented by the
//!   `postgres` and `testing` crates
//! - **Environment**: injected clock and conflict policy
//!
//! ## Architecture Principles
//!
//! - Functional Core, Imperative Shell: `schedule` performs no I/O
//! - Commands are validated against loaded state and produce events
//! - Repositories run load → handle → persist inside one transaction
//!
//! ## Example
//!
//! ```
//! use chrono::NaiveDate;
//! use venue_booking_core::types::DateRange;
//!
//! # fn main() -> venue_booking_core::Result<()> {
//! let day = |d| NaiveDate::from_ymd_opt(2024, 6, d).unwrap();
//! let a = DateRange::new(day(1), day(3))?;
//! let b = DateRange::new(day(3), day(5))?;
//! assert!(!a.overlaps(&b)); // end is exclusive
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod access;
pub mod environment;
pub mod error;
pub mod providers;
pub mod schedule;
pub mod types;

// Re-export commonly used types
pub use chrono::{DateTime, NaiveDate, Utc};
pub use environment::{BookingEnvironment, Clock, ConflictPolicy, SystemClock};
pub use error::{BookingError, Result};
pub use schedule::{BookingCommand, BookingEvent, VenueSchedule};
pub use types::*;
