//! `PostgreSQL` repositories for the venue booking platform.
//!
//! [`PostgresStore`] implements every repository trait from
//! `venue-booking-core` over a single `sqlx` connection pool:
//!
//! - Venue catalog and bookmarks
//! - Bookings, with the overlap check and the write in one transaction
//!   that holds a row lock on the venue
//! - Users and the admin dashboard summary
//!
//! An exclusion constraint on approved date ranges backs the no-double-booking
//! invariant at the storage level.
//!
//! # Example
//!
//! ```no_run
//! use venue_booking_postgres::PostgresStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = sqlx::PgPool::connect("postgres://localhost/venues").await?;
//! let store = PostgresStore::new(pool);
//! store.migrate().await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod booking;
mod report;
mod rows;
mod saved;
mod user;
mod venue;

use async_trait::async_trait;
use sqlx::PgPool;
use venue_booking_core::providers::StoreHealth;
use venue_booking_core::{BookingError, Result};

/// `PostgreSQL`-backed store for venues, bookings, bookmarks and users.
#[derive(Clone, Debug)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a store over an existing connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run the embedded database migrations.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Storage`] if a migration fails.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| BookingError::Storage(format!("Migration failed: {e}")))?;
        tracing::info!("Database migrations complete");
        Ok(())
    }
}

#[async_trait]
impl StoreHealth for PostgresStore {
    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(storage("Health check failed"))?;
        Ok(())
    }
}

/// SQLSTATE for `exclusion_violation`.
const EXCLUSION_VIOLATION: &str = "23P01";

/// Maps a database error to [`BookingError::Storage`] with context.
pub(crate) fn storage(context: &'static str) -> impl FnOnce(sqlx::Error) -> BookingError {
    move |e| BookingError::Storage(format!("{context}: {e}"))
}

/// Constraint name of a violated unique, foreign-key or exclusion constraint.
pub(crate) fn violated_constraint(e: &sqlx::Error) -> Option<String> {
    match e {
        sqlx::Error::Database(db) => db.constraint().map(str::to_string),
        _ => None,
    }
}

/// Whether `e` is an exclusion-constraint violation.
pub(crate) fn is_exclusion_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.code().as_deref() == Some(EXCLUSION_VIOLATION))
}

/// Whether `e` is a foreign-key violation.
pub(crate) fn is_foreign_key_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_foreign_key_violation())
}

/// Whether `e` is a unique-constraint violation.
pub(crate) fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}
