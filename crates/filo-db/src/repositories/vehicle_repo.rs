//! Vehicle repository implementation

use filo_core::models::Vehicle;
use filo_core::traits::VehicleRepository;
use filo_core::AppResult;
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument};

use crate::balances::VehicleRow;
use crate::error::map_db_err;

/// PostgreSQL implementation of VehicleRepository
pub struct PgVehicleRepository {
    pool: PgPool,
}

impl PgVehicleRepository {
    /// Create a new vehicle repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VehicleRepository for PgVehicleRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Vehicle>> {
        debug!("Finding vehicle by id: {}", id);

        let result = sqlx::query_as::<sqlx::Postgres, VehicleRow>(
            r#"
            SELECT id, company_id, plate, credit_balance, created_at, updated_at
            FROM vehicles
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_err("Failed to find vehicle", e))?;

        Ok(result.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn find_by_plate(&self, plate: &str) -> AppResult<Option<Vehicle>> {
        let normalized = Vehicle::normalize_plate(plate);
        debug!("Finding vehicle by plate: {}", normalized);

        let result = sqlx::query_as::<sqlx::Postgres, VehicleRow>(
            r#"
            SELECT id, company_id, plate, credit_balance, created_at, updated_at
            FROM vehicles
            WHERE plate = $1
            "#,
        )
        .bind(&normalized)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_err("Failed to find vehicle by plate", e))?;

        Ok(result.map(Into::into))
    }
}
