//! Service transaction repository implementation

use chrono::{DateTime, Utc};
use filo_core::models::{ServiceTransaction, ServiceType, TransactionStatus};
use filo_core::traits::TransactionRepository;
use filo_core::AppResult;
use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{debug, instrument};

use crate::error::map_db_err;

/// PostgreSQL implementation of TransactionRepository
pub struct PgTransactionRepository {
    pool: PgPool,
}

impl PgTransactionRepository {
    /// Create a new transaction repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionRepository for PgTransactionRepository {
    #[instrument(skip(self))]
    async fn list_filtered(
        &self,
        service_center_id: Option<i32>,
        vehicle_id: Option<i32>,
        service_type: Option<ServiceType>,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<ServiceTransaction>, i64)> {
        debug!(
            "Listing transactions: center={:?}, vehicle={:?}, type={:?}",
            service_center_id, vehicle_id, service_type
        );

        let service_type_str = service_type.map(|t| t.to_string());

        let total: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM service_transactions
            WHERE ($1::INT IS NULL OR service_center_id = $1)
              AND ($2::INT IS NULL OR vehicle_id = $2)
              AND ($3::TEXT IS NULL OR service_type = $3)
            "#,
        )
        .bind(service_center_id)
        .bind(vehicle_id)
        .bind(&service_type_str)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_err("Failed to count transactions", e))?;

        let rows = sqlx::query_as::<sqlx::Postgres, TransactionRow>(
            r#"
            SELECT id, vehicle_id, service_center_id, service_type,
                   amount, status, transaction_date
            FROM service_transactions
            WHERE ($1::INT IS NULL OR service_center_id = $1)
              AND ($2::INT IS NULL OR vehicle_id = $2)
              AND ($3::TEXT IS NULL OR service_type = $3)
            ORDER BY transaction_date DESC, id DESC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(service_center_id)
        .bind(vehicle_id)
        .bind(&service_type_str)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_err("Failed to fetch transactions", e))?;

        Ok((rows.into_iter().map(Into::into).collect(), total.0))
    }
}

/// Helper struct for mapping transaction rows
#[derive(Debug, sqlx::FromRow)]
struct TransactionRow {
    id: i64,
    vehicle_id: i32,
    service_center_id: i32,
    service_type: String,
    amount: Decimal,
    status: String,
    transaction_date: DateTime<Utc>,
}

impl From<TransactionRow> for ServiceTransaction {
    fn from(row: TransactionRow) -> Self {
        Self {
            id: row.id,
            vehicle_id: row.vehicle_id,
            service_center_id: row.service_center_id,
            service_type: ServiceType::from_str(&row.service_type).unwrap_or(ServiceType::Wash),
            amount: row.amount,
            status: TransactionStatus::from_str(&row.status)
                .unwrap_or(TransactionStatus::Completed),
            transaction_date: row.transaction_date,
        }
    }
}
