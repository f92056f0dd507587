//! Agreement repository implementation

use chrono::{DateTime, Utc};
use filo_core::models::Agreement;
use filo_core::traits::AgreementRepository;
use filo_core::AppResult;
use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{debug, instrument};

use crate::error::map_db_err;

/// PostgreSQL implementation of AgreementRepository
pub struct PgAgreementRepository {
    pool: PgPool,
}

impl PgAgreementRepository {
    /// Create a new agreement repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AgreementRepository for PgAgreementRepository {
    /// Select the authoritative active agreement at `now`.
    ///
    /// The schema does not enforce at most one active agreement per pair;
    /// ordering by `created_at DESC, id DESC` makes the pick deterministic
    /// when duplicates exist.
    #[instrument(skip(self))]
    async fn find_active(
        &self,
        company_id: i32,
        service_center_id: i32,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Agreement>> {
        debug!(
            "Resolving agreement for company {} at service center {}",
            company_id, service_center_id
        );

        let result = sqlx::query_as::<sqlx::Postgres, AgreementRow>(
            r#"
            SELECT id, company_id, service_center_id, discount_rate_percent,
                   monthly_limit, starts_at, ends_at, is_active, created_at
            FROM agreements
            WHERE company_id = $1
              AND service_center_id = $2
              AND is_active = TRUE
              AND starts_at <= $3
              AND (ends_at IS NULL OR ends_at >= $3)
            ORDER BY created_at DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(company_id)
        .bind(service_center_id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_err("Failed to resolve agreement", e))?;

        Ok(result.map(Into::into))
    }
}

/// Helper struct for mapping agreement rows
#[derive(Debug, sqlx::FromRow)]
struct AgreementRow {
    id: i32,
    company_id: i32,
    service_center_id: i32,
    discount_rate_percent: Decimal,
    monthly_limit: Decimal,
    starts_at: DateTime<Utc>,
    ends_at: Option<DateTime<Utc>>,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl From<AgreementRow> for Agreement {
    fn from(row: AgreementRow) -> Self {
        Self {
            id: row.id,
            company_id: row.company_id,
            service_center_id: row.service_center_id,
            discount_rate_percent: row.discount_rate_percent,
            monthly_limit: row.monthly_limit,
            starts_at: row.starts_at,
            ends_at: row.ends_at,
            is_active: row.is_active,
            created_at: row.created_at,
        }
    }
}
