//! Error types for booking, venue and user operations.

use crate::types::BookingStatus;
use chrono::NaiveDate;
use thiserror::Error;

/// Result type alias for domain operations.
pub type Result<T> = std::result::Result<T, BookingError>;

/// Error taxonomy for the booking platform.
///
/// Every variant is a distinct failure category surfaced to the caller;
/// none of them is silently coerced into another.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BookingError {
    // ═══════════════════════════════════════════════════════════
    // Request Validation
    // ═══════════════════════════════════════════════════════════
    /// Start date is not strictly before end date.
    #[error("Invalid date range: start {start} must be before end {end}")]
    InvalidRange {
        /// Requested start date
        start: NaiveDate,
        /// Requested end date
        end: NaiveDate,
    },

    /// Guest count exceeds the venue capacity.
    #[error("Guest count ({guests}) exceeds venue capacity ({capacity})")]
    CapacityExceeded {
        /// Requested guest count
        guests: u32,
        /// Venue capacity
        capacity: u32,
    },

    /// The venue is not accepting bookings.
    #[error("Venue {0} is not active")]
    VenueInactive(String),

    /// Malformed input that is not covered by a more specific variant.
    #[error("Validation failed: {0}")]
    Validation(String),

    // ═══════════════════════════════════════════════════════════
    // State Conflicts
    // ═══════════════════════════════════════════════════════════
    /// The requested dates overlap a blocking booking of the same venue.
    #[error("Venue is not available from {start} to {end}: overlaps booking {existing}")]
    Conflict {
        /// Conflicting booking id
        existing: String,
        /// Requested start date
        start: NaiveDate,
        /// Requested end date
        end: NaiveDate,
    },

    /// The status change is not allowed from the current state.
    #[error("Cannot change {axis} status from {from} to {to}")]
    InvalidTransition {
        /// Which status axis was targeted (`approval` or `payment`)
        axis: &'static str,
        /// Current status
        from: String,
        /// Requested status
        to: String,
    },

    /// The (user, venue) pair is already bookmarked.
    #[error("Venue {venue} is already saved")]
    AlreadySaved {
        /// Venue id
        venue: String,
    },

    /// The venue still has bookings and cannot be deleted.
    #[error("Venue {venue} has bookings and cannot be deleted")]
    VenueInUse {
        /// Venue id
        venue: String,
    },

    /// A unique attribute (username, email) is already taken.
    #[error("{field} '{value}' is already registered")]
    Duplicate {
        /// Attribute name
        field: &'static str,
        /// Offending value
        value: String,
    },

    // ═══════════════════════════════════════════════════════════
    // Lookup / Authorization
    // ═══════════════════════════════════════════════════════════
    /// Requested entity not found.
    #[error("{entity} with id {id} not found")]
    NotFound {
        /// Entity kind
        entity: &'static str,
        /// Entity id
        id: String,
    },

    /// The caller's role does not permit the operation.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    // ═══════════════════════════════════════════════════════════
    // System Errors
    // ═══════════════════════════════════════════════════════════
    /// Persistence failed.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl BookingError {
    /// Shorthand for [`BookingError::NotFound`].
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Shorthand for an approval-axis [`BookingError::InvalidTransition`].
    #[must_use]
    pub fn approval_transition(from: BookingStatus, to: BookingStatus) -> Self {
        Self::InvalidTransition {
            axis: "approval",
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = BookingError::not_found("Venue", "42");
        assert_eq!(err.to_string(), "Venue with id 42 not found");
    }

    #[test]
    fn test_transition_display() {
        let err =
            BookingError::approval_transition(BookingStatus::Approved, BookingStatus::Rejected);
        assert_eq!(err.to_string(), "Cannot change approval status from approved to rejected");
    }
}
