//! Row decoding.

use crate::storage;
use sqlx::Row;
use sqlx::postgres::PgRow;
use venue_booking_core::{
    Booking, BookingError, BookingId, BookingStatus, ContactInfo, Credential, DateRange,
    PaymentStatus, Result, Role, SavedVenue, User, UserId, Venue, VenueId,
};

pub(crate) const VENUE_COLUMNS: &str = "id, name, location, description, capacity, \
     price_per_day, category, owner_id, image_urls, is_active, created_at, updated_at";

pub(crate) const BOOKING_COLUMNS: &str = "id, venue_id, user_id, start_date, end_date, \
     guest_count, status, payment_status, contact_email, contact_phone, total_cost, \
     created_at, updated_at";

pub(crate) const USER_COLUMNS: &str = "id, username, email, role, password_hash, \
     oauth_provider, oauth_subject, phone, location, created_at";

fn get<'r, T>(row: &'r PgRow, column: &'static str) -> Result<T>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get(column).map_err(storage(column))
}

fn unsigned(row: &PgRow, column: &'static str) -> Result<u32> {
    let value: i32 = get(row, column)?;
    u32::try_from(value)
        .map_err(|_| BookingError::Storage(format!("{column}: negative value {value}")))
}

/// Converts a domain count to a database integer.
pub(crate) fn to_db_int(value: u32, column: &'static str) -> Result<i32> {
    i32::try_from(value)
        .map_err(|_| BookingError::Validation(format!("{column} is too large: {value}")))
}

pub(crate) fn venue(row: &PgRow) -> Result<Venue> {
    Ok(Venue {
        id: VenueId::from_uuid(get(row, "id")?),
        name: get(row, "name")?,
        location: get(row, "location")?,
        description: get(row, "description")?,
        capacity: unsigned(row, "capacity")?,
        price_per_day: get(row, "price_per_day")?,
        category: get(row, "category")?,
        owner_id: UserId::from_uuid(get(row, "owner_id")?),
        image_urls: get(row, "image_urls")?,
        is_active: get(row, "is_active")?,
        created_at: get(row, "created_at")?,
        updated_at: get(row, "updated_at")?,
    })
}

pub(crate) fn booking(row: &PgRow) -> Result<Booking> {
    let status: String = get(row, "status")?;
    let payment_status: String = get(row, "payment_status")?;
    Ok(Booking {
        id: BookingId::from_uuid(get(row, "id")?),
        venue_id: VenueId::from_uuid(get(row, "venue_id")?),
        user_id: UserId::from_uuid(get(row, "user_id")?),
        dates: DateRange::new(get(row, "start_date")?, get(row, "end_date")?)?,
        guest_count: unsigned(row, "guest_count")?,
        status: status.parse::<BookingStatus>()?,
        payment_status: payment_status.parse::<PaymentStatus>()?,
        contact: ContactInfo {
            email: get(row, "contact_email")?,
            phone: get(row, "contact_phone")?,
        },
        total_cost: get(row, "total_cost")?,
        created_at: get(row, "created_at")?,
        updated_at: get(row, "updated_at")?,
    })
}

pub(crate) fn saved_venue(row: &PgRow) -> Result<SavedVenue> {
    Ok(SavedVenue {
        user_id: UserId::from_uuid(get(row, "user_id")?),
        venue_id: VenueId::from_uuid(get(row, "venue_id")?),
        saved_at: get(row, "saved_at")?,
    })
}

pub(crate) fn user(row: &PgRow) -> Result<User> {
    let role: String = get(row, "role")?;
    let password_hash: Option<String> = get(row, "password_hash")?;
    let oauth_provider: Option<String> = get(row, "oauth_provider")?;
    let oauth_subject: Option<String> = get(row, "oauth_subject")?;

    let credential = match (password_hash, oauth_provider, oauth_subject) {
        (Some(hash), None, None) => Credential::Password { hash },
        (None, Some(provider), Some(subject)) => Credential::OAuth { provider, subject },
        _ => {
            return Err(BookingError::Storage(
                "user row has an inconsistent credential reference".into(),
            ));
        }
    };

    Ok(User {
        id: UserId::from_uuid(get(row, "id")?),
        username: get(row, "username")?,
        email: get(row, "email")?,
        role: role.parse::<Role>()?,
        credential,
        phone: get(row, "phone")?,
        location: get(row, "location")?,
        created_at: get(row, "created_at")?,
    })
}
