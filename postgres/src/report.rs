//! Admin dashboard aggregates.

use crate::{PostgresStore, storage};
use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::PgRow;
use venue_booking_core::providers::ReportRepository;
use venue_booking_core::{
    ApprovalCounts, BookingError, DashboardSummary, PaymentCounts, Result,
};

fn count(row: &PgRow, column: &'static str) -> Result<u64> {
    let value: i64 = row.try_get(column).map_err(storage(column))?;
    u64::try_from(value).map_err(|_| BookingError::Storage(format!("{column}: negative count")))
}

#[async_trait]
impl ReportRepository for PostgresStore {
    #[tracing::instrument(skip(self))]
    async fn summary(&self) -> Result<DashboardSummary> {
        let row = sqlx::query(
            r"
            SELECT
                (SELECT COUNT(*) FROM venues) AS venues,
                (SELECT COUNT(*) FROM venues WHERE is_active) AS active_venues,
                COUNT(*) FILTER (WHERE status = 'pending') AS pending,
                COUNT(*) FILTER (WHERE status = 'approved') AS approved,
                COUNT(*) FILTER (WHERE status = 'rejected') AS rejected,
                COUNT(*) FILTER (WHERE payment_status = 'unpaid') AS unpaid,
                COUNT(*) FILTER (WHERE payment_status = 'paid') AS paid,
                COUNT(*) FILTER (WHERE payment_status = 'refunded') AS refunded,
                LEAST(
                    COALESCE(SUM(total_cost) FILTER (WHERE payment_status = 'paid'), 0),
                    9223372036854775807
                )::BIGINT AS revenue
            FROM bookings
            ",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(storage("Failed to compute summary"))?;

        Ok(DashboardSummary {
            venues: count(&row, "venues")?,
            active_venues: count(&row, "active_venues")?,
            bookings: ApprovalCounts {
                pending: count(&row, "pending")?,
                approved: count(&row, "approved")?,
                rejected: count(&row, "rejected")?,
            },
            payments: PaymentCounts {
                unpaid: count(&row, "unpaid")?,
                paid: count(&row, "paid")?,
                refunded: count(&row, "refunded")?,
            },
            revenue: row.try_get("revenue").map_err(storage("revenue"))?,
        })
    }
}
