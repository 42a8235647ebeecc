//! Injected dependencies for the booking rules.
//!
//! The schedule never reads the system clock or global configuration
//! directly; everything it needs arrives through [`BookingEnvironment`].

use crate::error::BookingError;
use crate::types::BookingStatus;
use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Clock trait for time operations
///
/// Abstracted to allow fixed time in tests.
///
/// # Example
///
/// ```
/// use venue_booking_core::environment::Clock;
/// use chrono::{DateTime, Utc};
///
/// struct FixedClock {
///     time: DateTime<Utc>,
/// }
///
/// impl Clock for FixedClock {
///     fn now(&self) -> DateTime<Utc> {
///         self.time
///     }
/// }
/// ```
pub trait Clock: Send + Sync {
    /// Get the current time
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Which existing bookings block an overlapping request.
///
/// Approved bookings always block. Whether pending ones do is a deployment
/// choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConflictPolicy {
    /// Only approved bookings block new requests
    #[default]
    ApprovedOnly,
    /// Approved and pending bookings both block new requests
    ApprovedAndPending,
}

impl ConflictPolicy {
    /// Whether a booking in `status` blocks an overlapping new request.
    #[must_use]
    pub const fn blocks(self, status: BookingStatus) -> bool {
        match self {
            Self::ApprovedOnly => matches!(status, BookingStatus::Approved),
            Self::ApprovedAndPending => {
                matches!(status, BookingStatus::Approved | BookingStatus::Pending)
            }
        }
    }

    /// Configuration name of the policy.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ApprovedOnly => "approved-only",
            Self::ApprovedAndPending => "approved-and-pending",
        }
    }
}

impl fmt::Display for ConflictPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConflictPolicy {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "approved-only" => Ok(Self::ApprovedOnly),
            "approved-and-pending" => Ok(Self::ApprovedAndPending),
            other => Err(BookingError::Validation(format!(
                "unknown conflict policy '{other}'"
            ))),
        }
    }
}

/// Environment for the booking rules.
#[derive(Clone)]
pub struct BookingEnvironment {
    /// Clock for timestamps
    pub clock: Arc<dyn Clock>,
    /// Blocking policy for new requests
    pub policy: ConflictPolicy,
}

impl BookingEnvironment {
    /// Creates a new `BookingEnvironment`
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, policy: ConflictPolicy) -> Self {
        Self { clock, policy }
    }

    /// Current time according to the injected clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}

impl Default for BookingEnvironment {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock), ConflictPolicy::default())
    }
}

impl fmt::Debug for BookingEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BookingEnvironment")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_blocking() {
        assert!(ConflictPolicy::ApprovedOnly.blocks(BookingStatus::Approved));
        assert!(!ConflictPolicy::ApprovedOnly.blocks(BookingStatus::Pending));
        assert!(ConflictPolicy::ApprovedAndPending.blocks(BookingStatus::Pending));
        assert!(!ConflictPolicy::ApprovedAndPending.blocks(BookingStatus::Rejected));
    }

    #[test]
    fn test_policy_parse() {
        assert_eq!(
            "Approved-And-Pending".parse::<ConflictPolicy>().unwrap(),
            ConflictPolicy::ApprovedAndPending
        );
        assert_eq!(
            "approved_and_pending".parse::<ConflictPolicy>().unwrap(),
            ConflictPolicy::ApprovedAndPending
        );
        assert_eq!(
            "APPROVED_ONLY".parse::<ConflictPolicy>().unwrap(),
            ConflictPolicy::ApprovedOnly
        );
        assert!("strict".parse::<ConflictPolicy>().is_err());
    }
}
