//! Credit transaction ledger repository implementation
//!
//! The ledger is append-only; appends happen inside the coordinator's
//! transaction, so this repository only serves dashboard reads.

use chrono::{DateTime, Utc};
use filo_core::models::{CreditEntryType, CreditTransaction, ServiceType, SpendSource};
use filo_core::traits::LedgerRepository;
use filo_core::AppResult;
use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{debug, instrument};

use crate::error::map_db_err;

/// PostgreSQL implementation of LedgerRepository
pub struct PgLedgerRepository {
    pool: PgPool,
}

impl PgLedgerRepository {
    /// Create a new ledger repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LedgerRepository for PgLedgerRepository {
    #[instrument(skip(self))]
    async fn list_filtered(
        &self,
        company_id: Option<i32>,
        vehicle_id: Option<i32>,
        entry_type: Option<CreditEntryType>,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<CreditTransaction>, i64)> {
        debug!(
            "Listing ledger entries: company={:?}, vehicle={:?}, type={:?}",
            company_id, vehicle_id, entry_type
        );

        let entry_type_str = entry_type.map(|t| t.to_string());

        let total: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM credit_transactions
            WHERE ($1::INT IS NULL OR company_id = $1)
              AND ($2::INT IS NULL OR vehicle_id = $2)
              AND ($3::TEXT IS NULL OR entry_type = $3)
            "#,
        )
        .bind(company_id)
        .bind(vehicle_id)
        .bind(&entry_type_str)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_err("Failed to count ledger entries", e))?;

        let rows = sqlx::query_as::<sqlx::Postgres, LedgerRow>(
            r#"
            SELECT id, entry_type, amount, company_id, vehicle_id,
                   service_center_id, service_type, spend_source, created_at
            FROM credit_transactions
            WHERE ($1::INT IS NULL OR company_id = $1)
              AND ($2::INT IS NULL OR vehicle_id = $2)
              AND ($3::TEXT IS NULL OR entry_type = $3)
            ORDER BY created_at DESC, id DESC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(company_id)
        .bind(vehicle_id)
        .bind(&entry_type_str)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_err("Failed to fetch ledger entries", e))?;

        Ok((rows.into_iter().map(Into::into).collect(), total.0))
    }
}

/// Helper struct for mapping ledger rows
#[derive(Debug, sqlx::FromRow)]
struct LedgerRow {
    id: i64,
    entry_type: String,
    amount: Decimal,
    company_id: Option<i32>,
    vehicle_id: Option<i32>,
    service_center_id: Option<i32>,
    service_type: Option<String>,
    spend_source: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<LedgerRow> for CreditTransaction {
    fn from(row: LedgerRow) -> Self {
        Self {
            id: row.id,
            entry_type: CreditEntryType::from_str(&row.entry_type)
                .unwrap_or(CreditEntryType::Spend),
            amount: row.amount,
            company_id: row.company_id,
            vehicle_id: row.vehicle_id,
            service_center_id: row.service_center_id,
            service_type: row.service_type.as_deref().and_then(ServiceType::from_str),
            spend_source: row.spend_source.as_deref().and_then(SpendSource::from_str),
            created_at: row.created_at,
        }
    }
}
