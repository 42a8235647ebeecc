//! Domain types for the venue booking platform.
//!
//! Value objects, entities and query filters shared by every crate in the
//! workspace. Nothing here performs I/O.

use crate::error::{BookingError, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Identifiers
// ============================================================================

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            #[doc = concat!("Creates a new random `", stringify!($name), "`")]
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            #[doc = concat!("Create a `", stringify!($name), "` from a `Uuid`")]
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Get the inner UUID
            #[must_use]
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_id!(
    /// Unique identifier for a venue
    VenueId
);
uuid_id!(
    /// Unique identifier for a booking
    BookingId
);
uuid_id!(
    /// Unique identifier for a user
    UserId
);

// ============================================================================
// Callers and roles
// ============================================================================

/// Role of an authenticated user.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// May mutate venues and booking statuses
    Admin,
    /// May request bookings and bookmark venues
    Client,
}

impl Role {
    /// Lowercase storage / wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Client => "client",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "client" => Ok(Self::Client),
            other => Err(BookingError::Validation(format!("unknown role '{other}'"))),
        }
    }
}

/// Identity of the caller as forwarded by the authentication gateway.
///
/// The core trusts this value as already validated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Caller {
    /// Authenticated user
    pub user_id: UserId,
    /// Role granted to the user
    pub role: Role,
}

impl Caller {
    /// Creates a new caller.
    #[must_use]
    pub const fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    /// Whether the caller may perform admin-only mutations.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }
}

// ============================================================================
// Date ranges
// ============================================================================

/// Half-open calendar range `[start, end)`.
///
/// Construction guarantees `start < end`, so every `DateRange` covers at
/// least one day.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawDateRange")]
pub struct DateRange {
    #[serde(rename = "start_date")]
    start: NaiveDate,
    #[serde(rename = "end_date")]
    end: NaiveDate,
}

#[derive(Deserialize)]
struct RawDateRange {
    start_date: NaiveDate,
    end_date: NaiveDate,
}

impl TryFrom<RawDateRange> for DateRange {
    type Error = BookingError;

    fn try_from(raw: RawDateRange) -> Result<Self> {
        Self::new(raw.start_date, raw.end_date)
    }
}

impl DateRange {
    /// Creates a range, rejecting `start >= end`.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::InvalidRange`] if `start` is not strictly
    /// before `end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start < end {
            Ok(Self { start, end })
        } else {
            Err(BookingError::InvalidRange { start, end })
        }
    }

    /// First day of the range (inclusive).
    #[must_use]
    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    /// Day after the last booked day (exclusive).
    #[must_use]
    pub const fn end(&self) -> NaiveDate {
        self.end
    }

    /// Half-open overlap test: `[a,b)` and `[c,d)` overlap iff `a < d && c < b`.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Number of days covered (always ≥ 1).
    #[must_use]
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

// ============================================================================
// Venues
// ============================================================================

/// A bookable venue.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Venue {
    /// Venue ID
    pub id: VenueId,
    /// Display name
    pub name: String,
    /// Free-form location
    pub location: String,
    /// Description shown to clients
    pub description: String,
    /// Maximum number of guests
    pub capacity: u32,
    /// Price per booked day, in minor currency units
    pub price_per_day: i64,
    /// Category (garden, hall, ...)
    pub category: String,
    /// Admin who owns the listing
    pub owner_id: UserId,
    /// Image references, in display order
    pub image_urls: Vec<String>,
    /// Whether the venue accepts new bookings
    pub is_active: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Attributes of a venue to be created.
#[derive(Clone, Debug, Deserialize)]
pub struct NewVenue {
    /// Display name
    pub name: String,
    /// Free-form location
    pub location: String,
    /// Description
    #[serde(default)]
    pub description: String,
    /// Maximum number of guests
    pub capacity: u32,
    /// Price per day in minor units
    pub price_per_day: i64,
    /// Category
    pub category: String,
    /// Image references
    #[serde(default)]
    pub image_urls: Vec<String>,
    /// Initial active flag
    #[serde(default = "default_active")]
    pub is_active: bool,
}

const fn default_active() -> bool {
    true
}

impl NewVenue {
    /// Validates the attributes and builds the venue record.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Validation`] for blank text fields, zero
    /// capacity or a negative price.
    pub fn into_venue(self, id: VenueId, owner_id: UserId, now: DateTime<Utc>) -> Result<Venue> {
        let venue = Venue {
            id,
            name: self.name.trim().to_string(),
            location: self.location.trim().to_string(),
            description: self.description,
            capacity: self.capacity,
            price_per_day: self.price_per_day,
            category: self.category.trim().to_string(),
            owner_id,
            image_urls: self.image_urls,
            is_active: self.is_active,
            created_at: now,
            updated_at: now,
        };
        venue.validate()?;
        Ok(venue)
    }
}

/// Partial update of a venue. Absent fields are left unchanged.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct VenueUpdate {
    /// New name
    pub name: Option<String>,
    /// New location
    pub location: Option<String>,
    /// New description
    pub description: Option<String>,
    /// New capacity
    pub capacity: Option<u32>,
    /// New price per day
    pub price_per_day: Option<i64>,
    /// New category
    pub category: Option<String>,
    /// Replacement image list
    pub image_urls: Option<Vec<String>>,
    /// New active flag
    pub is_active: Option<bool>,
}

impl VenueUpdate {
    /// Applies the update to `venue` and re-validates it.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Validation`] if the updated venue is invalid.
    pub fn apply_to(self, mut venue: Venue, now: DateTime<Utc>) -> Result<Venue> {
        if let Some(name) = self.name {
            venue.name = name.trim().to_string();
        }
        if let Some(location) = self.location {
            venue.location = location.trim().to_string();
        }
        if let Some(description) = self.description {
            venue.description = description;
        }
        if let Some(capacity) = self.capacity {
            venue.capacity = capacity;
        }
        if let Some(price) = self.price_per_day {
            venue.price_per_day = price;
        }
        if let Some(category) = self.category {
            venue.category = category.trim().to_string();
        }
        if let Some(images) = self.image_urls {
            venue.image_urls = images;
        }
        if let Some(active) = self.is_active {
            venue.is_active = active;
        }
        venue.updated_at = now;
        venue.validate()?;
        Ok(venue)
    }
}

impl Venue {
    fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(BookingError::Validation("venue name is required".into()));
        }
        if self.location.is_empty() {
            return Err(BookingError::Validation("venue location is required".into()));
        }
        if self.category.is_empty() {
            return Err(BookingError::Validation("venue category is required".into()));
        }
        if self.capacity == 0 {
            return Err(BookingError::Validation("capacity must be greater than zero".into()));
        }
        if self.price_per_day < 0 {
            return Err(BookingError::Validation("price per day cannot be negative".into()));
        }
        Ok(())
    }
}

/// Venue listing filter.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct VenueFilter {
    /// Only venues of this category
    pub category: Option<String>,
    /// Hide inactive venues
    #[serde(default)]
    pub active_only: bool,
}

impl VenueFilter {
    /// Whether `venue` passes the filter.
    #[must_use]
    pub fn matches(&self, venue: &Venue) -> bool {
        (!self.active_only || venue.is_active)
            && self
                .category
                .as_ref()
                .is_none_or(|c| c.eq_ignore_ascii_case(&venue.category))
    }
}

// ============================================================================
// Bookings
// ============================================================================

/// Approval status of a booking.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    /// Awaiting an admin decision
    Pending,
    /// Accepted by an admin (terminal)
    Approved,
    /// Declined by an admin (terminal)
    Rejected,
}

impl BookingStatus {
    /// Lowercase storage / wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Only `Pending → Approved` and `Pending → Rejected` are legal.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Approved | Self::Rejected)
        )
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(BookingError::Validation(format!("unknown booking status '{other}'"))),
        }
    }
}

/// Payment status of a booking, independent of approval.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Nothing paid yet
    Unpaid,
    /// Paid in full
    Paid,
    /// Payment returned (terminal)
    Refunded,
}

impl PaymentStatus {
    /// Lowercase storage / wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unpaid => "unpaid",
            Self::Paid => "paid",
            Self::Refunded => "refunded",
        }
    }

    /// Payment moves forward only: `Unpaid → Paid → Refunded`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Unpaid, Self::Paid) | (Self::Paid, Self::Refunded)
        )
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "unpaid" => Ok(Self::Unpaid),
            "paid" => Ok(Self::Paid),
            "refunded" => Ok(Self::Refunded),
            other => Err(BookingError::Validation(format!("unknown payment status '{other}'"))),
        }
    }
}

/// How to reach the person who requested a booking.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    /// Contact email
    pub email: String,
    /// Optional contact phone
    #[serde(default)]
    pub phone: Option<String>,
}

impl ContactInfo {
    /// Rejects a blank or malformed email.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Validation`] if `email` is not plausible.
    pub fn validate(&self) -> Result<()> {
        if is_plausible_email(self.email.trim()) {
            Ok(())
        } else {
            Err(BookingError::Validation(format!(
                "invalid contact email '{}'",
                self.email
            )))
        }
    }
}

/// A booking of a venue for a date range.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    /// Booking ID
    pub id: BookingId,
    /// Booked venue
    pub venue_id: VenueId,
    /// Requesting user
    pub user_id: UserId,
    /// Booked dates, `[start_date, end_date)`
    #[serde(flatten)]
    pub dates: DateRange,
    /// Number of guests
    pub guest_count: u32,
    /// Approval status
    pub status: BookingStatus,
    /// Payment status
    pub payment_status: PaymentStatus,
    /// Contact details
    pub contact: ContactInfo,
    /// `price_per_day × days` at request time, in minor units
    pub total_cost: i64,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last status change
    pub updated_at: DateTime<Utc>,
}

/// A client's request to book a venue.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BookingRequest {
    /// Venue to book
    pub venue_id: VenueId,
    /// Requesting user
    pub user_id: UserId,
    /// First day (inclusive)
    pub start_date: NaiveDate,
    /// Last day (exclusive)
    pub end_date: NaiveDate,
    /// Number of guests
    pub guest_count: u32,
    /// Contact details
    pub contact: ContactInfo,
}

impl BookingRequest {
    /// The requested range.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::InvalidRange`] if `start_date >= end_date`.
    pub fn dates(&self) -> Result<DateRange> {
        DateRange::new(self.start_date, self.end_date)
    }
}

/// Booking listing filter.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct BookingFilter {
    /// Only bookings of this venue
    pub venue_id: Option<VenueId>,
    /// Only bookings of this user
    pub user_id: Option<UserId>,
    /// Only bookings in this approval status
    pub status: Option<BookingStatus>,
}

impl BookingFilter {
    /// Whether `booking` passes the filter.
    #[must_use]
    pub fn matches(&self, booking: &Booking) -> bool {
        self.venue_id.is_none_or(|v| v == booking.venue_id)
            && self.user_id.is_none_or(|u| u == booking.user_id)
            && self.status.is_none_or(|s| s == booking.status)
    }
}

// ============================================================================
// Saved venues
// ============================================================================

/// A venue bookmarked by a user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedVenue {
    /// Owner of the bookmark
    pub user_id: UserId,
    /// Bookmarked venue
    pub venue_id: VenueId,
    /// When it was saved
    pub saved_at: DateTime<Utc>,
}

// ============================================================================
// Users
// ============================================================================

/// Reference to how the gateway authenticates a user.
///
/// Hashing and token verification happen in the gateway; only the reference
/// is stored here.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Credential {
    /// Password hash produced by the gateway
    Password {
        /// Opaque hash
        hash: String,
    },
    /// External identity provider account
    OAuth {
        /// Provider name (e.g. `google`)
        provider: String,
        /// Subject identifier at the provider
        subject: String,
    },
}

/// A registered user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User ID
    pub id: UserId,
    /// Unique username
    pub username: String,
    /// Unique email
    pub email: String,
    /// Role
    pub role: Role,
    /// Credential reference (never serialized to clients)
    #[serde(skip_serializing)]
    pub credential: Credential,
    /// Optional phone
    pub phone: Option<String>,
    /// Optional location
    pub location: Option<String>,
    /// Registration timestamp
    pub created_at: DateTime<Utc>,
}

/// Registration payload.
#[derive(Clone, Debug, Deserialize)]
pub struct NewUser {
    /// Desired username
    pub username: String,
    /// Email address
    pub email: String,
    /// Requested role
    #[serde(default = "default_role")]
    pub role: Role,
    /// Credential reference
    pub credential: Credential,
    /// Optional phone
    #[serde(default)]
    pub phone: Option<String>,
    /// Optional location
    #[serde(default)]
    pub location: Option<String>,
}

const fn default_role() -> Role {
    Role::Client
}

impl NewUser {
    /// Validates the payload and builds the user record.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Validation`] for a blank username, a
    /// malformed email or an empty credential reference.
    pub fn into_user(self, id: UserId, now: DateTime<Utc>) -> Result<User> {
        let username = self.username.trim().to_string();
        let email = self.email.trim().to_ascii_lowercase();

        if username.is_empty() {
            return Err(BookingError::Validation("username is required".into()));
        }
        if !is_plausible_email(&email) {
            return Err(BookingError::Validation(format!("invalid email '{email}'")));
        }
        let empty_credential = match &self.credential {
            Credential::Password { hash } => hash.is_empty(),
            Credential::OAuth { provider, subject } => provider.is_empty() || subject.is_empty(),
        };
        if empty_credential {
            return Err(BookingError::Validation("credential reference is required".into()));
        }

        Ok(User {
            id,
            username,
            email,
            role: self.role,
            credential: self.credential,
            phone: self.phone,
            location: self.location,
            created_at: now,
        })
    }
}

/// Minimal `local@domain.tld` shape check.
#[must_use]
pub fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

// ============================================================================
// Reporting
// ============================================================================

/// Booking counts per approval status.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalCounts {
    /// Pending bookings
    pub pending: u64,
    /// Approved bookings
    pub approved: u64,
    /// Rejected bookings
    pub rejected: u64,
}

/// Booking counts per payment status.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentCounts {
    /// Unpaid bookings
    pub unpaid: u64,
    /// Paid bookings
    pub paid: u64,
    /// Refunded bookings
    pub refunded: u64,
}

/// Read-only aggregate for the admin dashboard.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSummary {
    /// Total venues
    pub venues: u64,
    /// Venues accepting bookings
    pub active_venues: u64,
    /// Bookings by approval status
    pub bookings: ApprovalCounts,
    /// Bookings by payment status
    pub payments: PaymentCounts,
    /// Sum of `total_cost` over paid bookings
    pub revenue: i64,
}

impl DashboardSummary {
    /// Folds one booking into the counters.
    pub fn count_booking(&mut self, booking: &Booking) {
        match booking.status {
            BookingStatus::Pending => self.bookings.pending += 1,
            BookingStatus::Approved => self.bookings.approved += 1,
            BookingStatus::Rejected => self.bookings.rejected += 1,
        }
        match booking.payment_status {
            PaymentStatus::Unpaid => self.payments.unpaid += 1,
            PaymentStatus::Paid => {
                self.payments.paid += 1;
                self.revenue = self.revenue.saturating_add(booking.total_cost);
            }
            PaymentStatus::Refunded => self.payments.refunded += 1,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    #[test]
    fn test_range_rejects_empty_and_reversed() {
        assert!(matches!(
            DateRange::new(day(3), day(3)),
            Err(BookingError::InvalidRange { .. })
        ));
        assert!(matches!(
            DateRange::new(day(4), day(2)),
            Err(BookingError::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_overlap_is_boundary_exclusive() {
        let a = DateRange::new(day(1), day(3)).unwrap();
        let b = DateRange::new(day(2), day(4)).unwrap();
        let c = DateRange::new(day(3), day(5)).unwrap();

        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
        assert!(b.overlaps(&c));
        assert_eq!(a.days(), 2);
    }

    #[test]
    fn test_range_deserialize_validates() {
        let ok: DateRange =
            serde_json::from_str(r#"{"start_date":"2024-06-01","end_date":"2024-06-02"}"#).unwrap();
        assert_eq!(ok.days(), 1);

        let bad = serde_json::from_str::<DateRange>(
            r#"{"start_date":"2024-06-02","end_date":"2024-06-01"}"#,
        );
        assert!(bad.is_err());
    }

    #[test]
    fn test_status_transitions() {
        assert!(BookingStatus::Pending.can_transition_to(BookingStatus::Approved));
        assert!(BookingStatus::Pending.can_transition_to(BookingStatus::Rejected));
        assert!(!BookingStatus::Approved.can_transition_to(BookingStatus::Rejected));
        assert!(!BookingStatus::Rejected.can_transition_to(BookingStatus::Approved));
        assert!(!BookingStatus::Pending.can_transition_to(BookingStatus::Pending));

        assert!(PaymentStatus::Unpaid.can_transition_to(PaymentStatus::Paid));
        assert!(PaymentStatus::Paid.can_transition_to(PaymentStatus::Refunded));
        assert!(!PaymentStatus::Unpaid.can_transition_to(PaymentStatus::Refunded));
        assert!(!PaymentStatus::Refunded.can_transition_to(PaymentStatus::Paid));
    }

    #[test]
    fn test_status_round_trip_through_str() {
        for status in [BookingStatus::Pending, BookingStatus::Approved, BookingStatus::Rejected] {
            assert_eq!(status.as_str().parse::<BookingStatus>().unwrap(), status);
        }
        assert_eq!("Admin".parse::<Role>().unwrap(), Role::Admin);
        assert!("owner".parse::<Role>().is_err());
    }

    #[test]
    fn test_new_venue_validation() {
        let venue = NewVenue {
            name: "  Karen Villa Gardens ".into(),
            location: "Karen, Nairobi".into(),
            description: String::new(),
            capacity: 200,
            price_per_day: 45_000,
            category: "Garden".into(),
            image_urls: vec![],
            is_active: true,
        };
        let built = venue
            .clone()
            .into_venue(VenueId::new(), UserId::new(), Utc::now())
            .unwrap();
        assert_eq!(built.name, "Karen Villa Gardens");

        let zero = NewVenue { capacity: 0, ..venue };
        assert!(matches!(
            zero.into_venue(VenueId::new(), UserId::new(), Utc::now()),
            Err(BookingError::Validation(_))
        ));
    }

    #[test]
    fn test_new_user_validation() {
        let user = NewUser {
            username: "amina".into(),
            email: "Amina@Example.com".into(),
            role: Role::Client,
            credential: Credential::Password { hash: "$argon2id$...".into() },
            phone: None,
            location: None,
        };
        let built = user.clone().into_user(UserId::new(), Utc::now()).unwrap();
        assert_eq!(built.email, "amina@example.com");

        let bad = NewUser { email: "not-an-email".into(), ..user };
        assert!(bad.into_user(UserId::new(), Utc::now()).is_err());
    }

    #[test]
    fn test_summary_revenue_saturates() {
        let paid = Booking {
            id: BookingId::new(),
            venue_id: VenueId::new(),
            user_id: UserId::new(),
            dates: DateRange::new(day(1), day(2)).unwrap(),
            guest_count: 1,
            status: BookingStatus::Approved,
            payment_status: PaymentStatus::Paid,
            contact: ContactInfo {
                email: "guest@example.com".into(),
                phone: None,
            },
            total_cost: i64::MAX,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let mut summary = DashboardSummary::default();
        summary.count_booking(&paid);
        summary.count_booking(&paid);

        assert_eq!(summary.payments.paid, 2);
        assert_eq!(summary.bookings.approved, 2);
        assert_eq!(summary.revenue, i64::MAX);
    }

    proptest! {
        #[test]
        fn prop_overlap_is_symmetric(a in 0i64..60, la in 1i64..10, b in 0i64..60, lb in 1i64..10) {
            let at = |offset: i64| day(1) + chrono::Duration::days(offset);
            let r1 = DateRange::new(at(a), at(a + la)).unwrap();
            let r2 = DateRange::new(at(b), at(b + lb)).unwrap();
            prop_assert_eq!(r1.overlaps(&r2), r2.overlaps(&r1));
            prop_assert!(r1.overlaps(&r1));
        }
    }
}
