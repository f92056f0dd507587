//! Payout repository implementation

use chrono::{DateTime, Utc};
use filo_core::models::Payout;
use filo_core::traits::PayoutRepository;
use filo_core::AppResult;
use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::error::map_db_err;

/// PostgreSQL implementation of PayoutRepository
pub struct PgPayoutRepository {
    pool: PgPool,
}

impl PgPayoutRepository {
    /// Create a new payout repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PayoutRepository for PgPayoutRepository {
    #[instrument(skip(self))]
    async fn list_by_service_center(
        &self,
        service_center_id: i32,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<Payout>, i64)> {
        debug!("Listing payouts for service center {}", service_center_id);

        let total: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM payouts WHERE service_center_id = $1")
                .bind(service_center_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| map_db_err("Failed to count payouts", e))?;

        let rows = sqlx::query_as::<sqlx::Postgres, PayoutRow>(
            r#"
            SELECT id, reference, service_center_id, amount, notes, paid_at
            FROM payouts
            WHERE service_center_id = $1
            ORDER BY paid_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(service_center_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_err("Failed to fetch payouts", e))?;

        Ok((rows.into_iter().map(Into::into).collect(), total.0))
    }
}

/// Helper struct for mapping payout rows
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct PayoutRow {
    pub id: i64,
    pub reference: Uuid,
    pub service_center_id: i32,
    pub amount: Decimal,
    pub notes: Option<String>,
    pub paid_at: DateTime<Utc>,
}

impl From<PayoutRow> for Payout {
    fn from(row: PayoutRow) -> Self {
        Self {
            id: row.id,
            reference: row.reference,
            service_center_id: row.service_center_id,
            amount: row.amount,
            notes: row.notes,
            paid_at: row.paid_at,
        }
    }
}
