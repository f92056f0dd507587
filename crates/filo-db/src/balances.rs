//! Balance store
//!
//! Atomic credit/debit primitives over the three balance pools: company
//! credit, vehicle credit, and per-vehicle service rights. All operations
//! run on a caller-supplied connection and never open a transaction of
//! their own — the ledger coordinator owns the atomic unit.
//!
//! Debits are guarded (`WHERE balance >= amount`) so the database itself
//! rejects any mutation that would drive a balance negative, even if a
//! caller skipped its own precondition check.

use chrono::{DateTime, Utc};
use filo_core::models::{Company, ServiceCenter, ServiceType, Vehicle, VehicleServiceRight};
use filo_core::{AppError, AppResult};
use rust_decimal::Decimal;
use sqlx::PgConnection;

use crate::error::map_db_err;

/// Row-lock and guarded-mutation primitives for balance columns
pub struct BalanceStore;

impl BalanceStore {
    fn ensure_positive(amount: Decimal) -> AppResult<()> {
        if amount <= Decimal::ZERO {
            return Err(AppError::InvalidInput(format!(
                "Amount must be positive, got {}",
                amount
            )));
        }
        Ok(())
    }

    /// Lock a company row for the remainder of the transaction
    pub async fn lock_company(conn: &mut PgConnection, id: i32) -> AppResult<Option<Company>> {
        let row = sqlx::query_as::<sqlx::Postgres, CompanyRow>(
            r#"
            SELECT id, name, credit_balance, is_active, created_at, updated_at
            FROM companies
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| map_db_err("Failed to lock company", e))?;

        Ok(row.map(Into::into))
    }

    /// Lock a vehicle row for the remainder of the transaction.
    ///
    /// This lock is what serializes concurrent spends against the same
    /// vehicle: quota check, pool selection, and the balance mutation all
    /// happen while it is held.
    pub async fn lock_vehicle(conn: &mut PgConnection, id: i32) -> AppResult<Option<Vehicle>> {
        let row = sqlx::query_as::<sqlx::Postgres, VehicleRow>(
            r#"
            SELECT id, company_id, plate, credit_balance, created_at, updated_at
            FROM vehicles
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| map_db_err("Failed to lock vehicle", e))?;

        Ok(row.map(Into::into))
    }

    /// Lock a service center row for the remainder of the transaction.
    ///
    /// Payouts hold this lock while the owed amount is recomputed, so two
    /// concurrent payouts for the same center serialize and the second one
    /// sees the first one's payout record.
    pub async fn lock_service_center(
        conn: &mut PgConnection,
        id: i32,
    ) -> AppResult<Option<ServiceCenter>> {
        let row = sqlx::query_as::<sqlx::Postgres, ServiceCenterRow>(
            r#"
            SELECT id, name, is_active, created_at, updated_at
            FROM service_centers
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| map_db_err("Failed to lock service center", e))?;

        Ok(row.map(Into::into))
    }

    /// Lock the service right for a (vehicle, service type) pair, if one exists
    pub async fn lock_service_right(
        conn: &mut PgConnection,
        vehicle_id: i32,
        service_type: ServiceType,
    ) -> AppResult<Option<VehicleServiceRight>> {
        let row = sqlx::query_as::<sqlx::Postgres, ServiceRightRow>(
            r#"
            SELECT id, vehicle_id, service_type, points, quantity, created_at, updated_at
            FROM vehicle_service_rights
            WHERE vehicle_id = $1 AND service_type = $2
            FOR UPDATE
            "#,
        )
        .bind(vehicle_id)
        .bind(service_type.to_string())
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| map_db_err("Failed to lock service right", e))?;

        Ok(row.map(Into::into))
    }

    /// Credit a company balance, returning the new balance
    pub async fn credit_company(
        conn: &mut PgConnection,
        id: i32,
        amount: Decimal,
    ) -> AppResult<Decimal> {
        Self::ensure_positive(amount)?;

        let row: Option<(Decimal,)> = sqlx::query_as(
            r#"
            UPDATE companies
            SET credit_balance = credit_balance + $2,
                updated_at = NOW()
            WHERE id = $1
            RETURNING credit_balance
            "#,
        )
        .bind(id)
        .bind(amount)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| map_db_err("Failed to credit company balance", e))?;

        row.map(|(balance,)| balance)
            .ok_or(AppError::CompanyNotFound(id))
    }

    /// Credit a vehicle balance, returning the new balance
    pub async fn credit_vehicle(
        conn: &mut PgConnection,
        id: i32,
        amount: Decimal,
    ) -> AppResult<Decimal> {
        Self::ensure_positive(amount)?;

        let row: Option<(Decimal,)> = sqlx::query_as(
            r#"
            UPDATE vehicles
            SET credit_balance = credit_balance + $2,
                updated_at = NOW()
            WHERE id = $1
            RETURNING credit_balance
            "#,
        )
        .bind(id)
        .bind(amount)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| map_db_err("Failed to credit vehicle balance", e))?;

        row.map(|(balance,)| balance)
            .ok_or(AppError::VehicleNotFound(id))
    }

    /// Debit a company balance, returning the new balance.
    ///
    /// Fails with `InsufficientBalance` when the result would go negative.
    pub async fn debit_company(
        conn: &mut PgConnection,
        id: i32,
        amount: Decimal,
    ) -> AppResult<Decimal> {
        Self::ensure_positive(amount)?;

        let row: Option<(Decimal,)> = sqlx::query_as(
            r#"
            UPDATE companies
            SET credit_balance = credit_balance - $2,
                updated_at = NOW()
            WHERE id = $1 AND credit_balance >= $2
            RETURNING credit_balance
            "#,
        )
        .bind(id)
        .bind(amount)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| map_db_err("Failed to debit company balance", e))?;

        match row {
            Some((balance,)) => Ok(balance),
            None => Err(Self::debit_failure(
                &mut *conn,
                "companies",
                id,
                amount,
                AppError::CompanyNotFound(id),
            )
            .await),
        }
    }

    /// Debit a vehicle balance, returning the new balance.
    ///
    /// Fails with `InsufficientBalance` when the result would go negative.
    pub async fn debit_vehicle(
        conn: &mut PgConnection,
        id: i32,
        amount: Decimal,
    ) -> AppResult<Decimal> {
        Self::ensure_positive(amount)?;

        let row: Option<(Decimal,)> = sqlx::query_as(
            r#"
            UPDATE vehicles
            SET credit_balance = credit_balance - $2,
                updated_at = NOW()
            WHERE id = $1 AND credit_balance >= $2
            RETURNING credit_balance
            "#,
        )
        .bind(id)
        .bind(amount)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| map_db_err("Failed to debit vehicle balance", e))?;

        match row {
            Some((balance,)) => Ok(balance),
            None => Err(Self::debit_failure(
                &mut *conn,
                "vehicles",
                id,
                amount,
                AppError::VehicleNotFound(id),
            )
            .await),
        }
    }

    /// Debit a service right's point pool, returning the remaining points.
    ///
    /// Fails with `InsufficientBalance` when the pool cannot cover `amount`.
    pub async fn debit_right_points(
        conn: &mut PgConnection,
        right_id: i32,
        amount: Decimal,
    ) -> AppResult<Decimal> {
        Self::ensure_positive(amount)?;

        let row: Option<(Decimal,)> = sqlx::query_as(
            r#"
            UPDATE vehicle_service_rights
            SET points = points - $2,
                updated_at = NOW()
            WHERE id = $1 AND points >= $2
            RETURNING points
            "#,
        )
        .bind(right_id)
        .bind(amount)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| map_db_err("Failed to debit service right points", e))?;

        match row {
            Some((points,)) => Ok(points),
            None => {
                let available: Option<(Decimal,)> =
                    sqlx::query_as("SELECT points FROM vehicle_service_rights WHERE id = $1")
                        .bind(right_id)
                        .fetch_optional(&mut *conn)
                        .await
                        .map_err(|e| map_db_err("Failed to read service right points", e))?;

                match available {
                    Some((points,)) => Err(AppError::InsufficientBalance {
                        required: amount.to_string(),
                        available: points.to_string(),
                    }),
                    None => Err(AppError::NotFound(format!(
                        "Service right {} not found",
                        right_id
                    ))),
                }
            }
        }
    }

    /// Consume exactly one unit from a service right's quantity pool,
    /// returning the remaining quantity.
    ///
    /// The requested spend amount is deliberately not compared against a
    /// monetary value here; a quantity right is a flat-rate entitlement.
    pub async fn consume_right_quantity(
        conn: &mut PgConnection,
        right_id: i32,
    ) -> AppResult<i32> {
        let row: Option<(i32,)> = sqlx::query_as(
            r#"
            UPDATE vehicle_service_rights
            SET quantity = quantity - 1,
                updated_at = NOW()
            WHERE id = $1 AND quantity >= 1
            RETURNING quantity
            "#,
        )
        .bind(right_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| map_db_err("Failed to consume service right quantity", e))?;

        row.map(|(quantity,)| quantity)
            .ok_or(AppError::InsufficientFunds)
    }

    /// Build the error for a guarded balance debit that matched no row:
    /// either the row is gone or the balance cannot cover the amount.
    async fn debit_failure(
        conn: &mut PgConnection,
        table: &str,
        id: i32,
        required: Decimal,
        missing: AppError,
    ) -> AppError {
        let query = format!("SELECT credit_balance FROM {} WHERE id = $1", table);
        let available: Result<Option<(Decimal,)>, sqlx::Error> =
            sqlx::query_as(&query).bind(id).fetch_optional(conn).await;

        match available {
            Ok(Some((balance,))) => AppError::InsufficientBalance {
                required: required.to_string(),
                available: balance.to_string(),
            },
            Ok(None) => missing,
            Err(e) => map_db_err("Failed to read balance after debit failure", e),
        }
    }
}

/// Helper struct for mapping company rows
#[derive(Debug, sqlx::FromRow)]
struct CompanyRow {
    id: i32,
    name: String,
    credit_balance: Decimal,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CompanyRow> for Company {
    fn from(row: CompanyRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            credit_balance: row.credit_balance,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Helper struct for mapping service center rows
#[derive(Debug, sqlx::FromRow)]
struct ServiceCenterRow {
    id: i32,
    name: String,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ServiceCenterRow> for ServiceCenter {
    fn from(row: ServiceCenterRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Helper struct for mapping vehicle rows
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct VehicleRow {
    pub id: i32,
    pub company_id: i32,
    pub plate: String,
    pub credit_balance: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<VehicleRow> for Vehicle {
    fn from(row: VehicleRow) -> Self {
        Self {
            id: row.id,
            company_id: row.company_id,
            plate: row.plate,
            credit_balance: row.credit_balance,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Helper struct for mapping service right rows
#[derive(Debug, sqlx::FromRow)]
struct ServiceRightRow {
    id: i32,
    vehicle_id: i32,
    service_type: String,
    points: Decimal,
    quantity: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ServiceRightRow> for VehicleServiceRight {
    fn from(row: ServiceRightRow) -> Self {
        Self {
            id: row.id,
            vehicle_id: row.vehicle_id,
            service_type: ServiceType::from_str(&row.service_type).unwrap_or(ServiceType::Wash),
            points: row.points,
            quantity: row.quantity,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
