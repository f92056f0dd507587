//! QR code repository implementation

use chrono::{DateTime, Utc};
use filo_core::models::{QrCode, ServiceType};
use filo_core::traits::QrCodeRepository;
use filo_core::AppResult;
use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{debug, instrument};

use crate::error::map_db_err;

/// PostgreSQL implementation of QrCodeRepository
pub struct PgQrCodeRepository {
    pool: PgPool,
}

impl PgQrCodeRepository {
    /// Create a new QR code repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QrCodeRepository for PgQrCodeRepository {
    #[instrument(skip(self))]
    async fn find_by_code(&self, code: &str) -> AppResult<Option<QrCode>> {
        debug!("Finding QR code: {}", code);

        let result = sqlx::query_as::<sqlx::Postgres, QrCodeRow>(
            r#"
            SELECT id, service_center_id, code, service_type, amount, is_active, created_at
            FROM qr_codes
            WHERE code = $1
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_err("Failed to find QR code", e))?;

        Ok(result.map(Into::into))
    }
}

/// Helper struct for mapping QR code rows
#[derive(Debug, sqlx::FromRow)]
struct QrCodeRow {
    id: i32,
    service_center_id: i32,
    code: String,
    service_type: String,
    amount: Decimal,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl From<QrCodeRow> for QrCode {
    fn from(row: QrCodeRow) -> Self {
        Self {
            id: row.id,
            service_center_id: row.service_center_id,
            code: row.code,
            service_type: ServiceType::from_str(&row.service_type).unwrap_or(ServiceType::Wash),
            amount: row.amount,
            is_active: row.is_active,
            created_at: row.created_at,
        }
    }
}
