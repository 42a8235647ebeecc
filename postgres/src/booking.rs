//! Bookings.
//!
//! Every command runs in one transaction:
//!
//! 1. resolve the venue (from the request, or from the target booking)
//! 2. `SELECT ... FOR UPDATE` the venue row, serialising writers per venue
//! 3. load the bookings that can affect the decision
//! 4. `VenueSchedule::handle` the command
//! 5. persist the event and commit
//!
//! Any error drops the transaction, which rolls it back.

use crate::rows::{self, BOOKING_COLUMNS, VENUE_COLUMNS, to_db_int};
use crate::{PostgresStore, is_exclusion_violation, storage};
use async_trait::async_trait;
use sqlx::{Postgres, Transaction};
use venue_booking_core::providers::BookingRepository;
use venue_booking_core::{
    Booking, BookingCommand, BookingEnvironment, BookingError, BookingEvent, BookingFilter,
    BookingId, DateRange, Result, Venue, VenueId, VenueSchedule,
};

type Tx = Transaction<'static, Postgres>;

async fn lock_venue(tx: &mut Tx, id: VenueId) -> Result<Venue> {
    let sql = format!("SELECT {VENUE_COLUMNS} FROM venues WHERE id = $1 FOR UPDATE");
    let row = sqlx::query(&sql)
        .bind(id.as_uuid())
        .fetch_optional(&mut **tx)
        .await
        .map_err(storage("Failed to lock venue"))?
        .ok_or_else(|| BookingError::not_found("Venue", id))?;
    rows::venue(&row)
}

async fn find_booking(tx: &mut Tx, id: BookingId) -> Result<Booking> {
    let sql = format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1");
    let row = sqlx::query(&sql)
        .bind(id.as_uuid())
        .fetch_optional(&mut **tx)
        .await
        .map_err(storage("Failed to get booking"))?
        .ok_or_else(|| BookingError::not_found("Booking", id))?;
    rows::booking(&row)
}

/// Non-rejected bookings of `venue_id` overlapping `range`, plus `include`.
async fn load_window(
    tx: &mut Tx,
    venue_id: VenueId,
    range: &DateRange,
    include: Option<BookingId>,
) -> Result<Vec<Booking>> {
    let sql = format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings \
         WHERE venue_id = $1 \
           AND ((status <> 'rejected' AND start_date < $3 AND $2 < end_date) OR id = $4) \
         ORDER BY start_date, id"
    );
    let rows = sqlx::query(&sql)
        .bind(venue_id.as_uuid())
        .bind(range.start())
        .bind(range.end())
        .bind(include.map(|id| *id.as_uuid()))
        .fetch_all(&mut **tx)
        .await
        .map_err(storage("Failed to load bookings"))?;
    rows.iter().map(rows::booking).collect()
}

async fn persist(tx: &mut Tx, event: &BookingEvent, dates: &DateRange) -> Result<()> {
    let result = match event {
        BookingEvent::Requested { booking } => {
            sqlx::query(
                "INSERT INTO bookings (id, venue_id, user_id, start_date, end_date, guest_count, \
                     status, payment_status, contact_email, contact_phone, total_cost, \
                     created_at, updated_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
            )
            .bind(booking.id.as_uuid())
            .bind(booking.venue_id.as_uuid())
            .bind(booking.user_id.as_uuid())
            .bind(booking.dates.start())
            .bind(booking.dates.end())
            .bind(to_db_int(booking.guest_count, "guest_count")?)
            .bind(booking.status.as_str())
            .bind(booking.payment_status.as_str())
            .bind(&booking.contact.email)
            .bind(booking.contact.phone.as_deref())
            .bind(booking.total_cost)
            .bind(booking.created_at)
            .bind(booking.updated_at)
            .execute(&mut **tx)
            .await
        }
        BookingEvent::StatusChanged {
            booking_id, to, at, ..
        } => {
            sqlx::query("UPDATE bookings SET status = $2, updated_at = $3 WHERE id = $1")
                .bind(booking_id.as_uuid())
                .bind(to.as_str())
                .bind(at)
                .execute(&mut **tx)
                .await
        }
        BookingEvent::PaymentChanged {
            booking_id, to, at, ..
        } => {
            sqlx::query("UPDATE bookings SET payment_status = $2, updated_at = $3 WHERE id = $1")
                .bind(booking_id.as_uuid())
                .bind(to.as_str())
                .bind(at)
                .execute(&mut **tx)
                .await
        }
    };

    result.map(|_| ()).map_err(|e| {
        if is_exclusion_violation(&e) {
            tracing::warn!(
                booking_id = %event.booking_id(),
                "Exclusion constraint rejected approval"
            );
            BookingError::Conflict {
                existing: "unknown".into(),
                start: dates.start(),
                end: dates.end(),
            }
        } else {
            storage("Failed to persist booking")(e)
        }
    })
}

#[async_trait]
impl BookingRepository for PostgresStore {
    #[tracing::instrument(skip(self, command, env), fields(booking_id = %command.booking_id()))]
    async fn execute(&self, command: BookingCommand, env: &BookingEnvironment) -> Result<Booking> {
        let booking_id = command.booking_id();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(storage("Failed to begin transaction"))?;

        let (venue_id, window, include) = match &command {
            BookingCommand::Request { request, .. } => (request.venue_id, request.dates()?, None),
            _ => {
                let target = find_booking(&mut tx, booking_id).await?;
                (target.venue_id, target.dates, Some(booking_id))
            }
        };

        let venue = lock_venue(&mut tx, venue_id).await?;
        let bookings = load_window(&mut tx, venue_id, &window, include).await?;
        let mut schedule = VenueSchedule::new(venue, bookings);

        let event = schedule.handle(command, env)?;
        persist(&mut tx, &event, &window).await?;
        tx.commit()
            .await
            .map_err(storage("Failed to commit booking"))?;

        schedule.apply(&event);
        tracing::debug!(venue_id = %venue_id, "Booking command committed");
        schedule
            .into_booking(booking_id)
            .ok_or_else(|| BookingError::not_found("Booking", booking_id))
    }

    async fn get(&self, id: BookingId) -> Result<Booking> {
        let sql = format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(storage("Failed to get booking"))?
            .ok_or_else(|| BookingError::not_found("Booking", id))?;
        rows::booking(&row)
    }

    async fn list(&self, filter: &BookingFilter) -> Result<Vec<Booking>> {
        let sql = format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings \
             WHERE ($1::UUID IS NULL OR venue_id = $1) \
               AND ($2::UUID IS NULL OR user_id = $2) \
               AND ($3::TEXT IS NULL OR status = $3) \
             ORDER BY created_at DESC, id"
        );
        let rows = sqlx::query(&sql)
            .bind(filter.venue_id.map(|id| *id.as_uuid()))
            .bind(filter.user_id.map(|id| *id.as_uuid()))
            .bind(filter.status.map(|s| s.as_str()))
            .fetch_all(&self.pool)
            .await
            .map_err(storage("Failed to list bookings"))?;
        rows.iter().map(rows::booking).collect()
    }

    async fn schedule(&self, venue_id: VenueId, range: &DateRange) -> Result<VenueSchedule> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(storage("Failed to begin transaction"))?;

        let sql = format!("SELECT {VENUE_COLUMNS} FROM venues WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(venue_id.as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(storage("Failed to get venue"))?
            .ok_or_else(|| BookingError::not_found("Venue", venue_id))?;
        let venue = rows::venue(&row)?;
        let bookings = load_window(&mut tx, venue_id, range, None).await?;

        tx.commit()
            .await
            .map_err(storage("Failed to commit read"))?;
        Ok(VenueSchedule::new(venue, bookings))
    }
}
