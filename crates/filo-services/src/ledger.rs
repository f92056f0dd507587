//! Ledger transaction coordinator
//!
//! Executes every balance movement as one atomic unit: lock the implicated
//! rows, re-validate preconditions under the lock, mutate balances through
//! the balance store, append the immutable ledger entry (and the service
//! transaction for spends), then commit. Any failure rolls the whole unit
//! back; no partial state is ever visible.

use chrono::{DateTime, NaiveDate, Utc};
use filo_core::models::{
    Agreement, CreditEntryType, QrCode, ServiceTransaction, ServiceType, SpendSource,
    TransactionStatus,
};
use filo_core::{AppError, AppResult};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use tracing::{error, info, instrument};

use filo_db::{map_db_err, BalanceStore};

use crate::policy::SpendPolicyEngine;

/// Result of loading company credit
#[derive(Debug, Clone)]
pub struct CreditLoadOutcome {
    pub company_id: i32,
    pub amount: Decimal,
    pub new_balance: Decimal,
    pub entry_id: i64,
}

/// Result of allocating company credit to a vehicle
#[derive(Debug, Clone)]
pub struct AllocationOutcome {
    pub company_id: i32,
    pub vehicle_id: i32,
    pub amount: Decimal,
    pub company_balance: Decimal,
    pub vehicle_balance: Decimal,
    pub entry_id: i64,
}

/// Result of a policy-driven service-center spend
#[derive(Debug, Clone)]
pub struct SpendOutcome {
    pub source: SpendSource,
    pub charged: Decimal,
    pub entry_id: i64,
    pub transaction: ServiceTransaction,
}

/// Result of a QR payment
#[derive(Debug, Clone)]
pub struct QrPaymentOutcome {
    pub list_price: Decimal,
    pub discount_rate_percent: Decimal,
    pub charged: Decimal,
    pub entry_id: i64,
    pub transaction: ServiceTransaction,
}

/// Atomic coordinator for all balance movements
pub struct LedgerService {
    pool: PgPool,
    policy: SpendPolicyEngine,
}

impl LedgerService {
    /// Create a new ledger service
    pub fn new(pool: PgPool, policy: SpendPolicyEngine) -> Self {
        Self { pool, policy }
    }

    /// Credit a company's central balance with externally settled funds.
    ///
    /// The card settlement itself happens outside this core; by the time
    /// this is called the funds are already collected.
    #[instrument(skip(self))]
    pub async fn load_company_credit(
        &self,
        company_id: i32,
        amount: Decimal,
    ) -> AppResult<CreditLoadOutcome> {
        info!("Loading {} credit onto company {}", amount, company_id);

        let mut tx = self.pool.begin().await.map_err(|e| {
            error!("Failed to start transaction: {}", e);
            AppError::Transaction(format!("Failed to start transaction: {}", e))
        })?;

        BalanceStore::lock_company(&mut tx, company_id)
            .await?
            .ok_or(AppError::CompanyNotFound(company_id))?;

        let new_balance = BalanceStore::credit_company(&mut tx, company_id, amount).await?;

        let (entry_id, _) = append_entry(
            &mut tx,
            CreditEntryType::Load,
            amount,
            Some(company_id),
            None,
            None,
            None,
            None,
        )
        .await?;

        tx.commit().await.map_err(|e| {
            error!("Failed to commit transaction: {}", e);
            AppError::Transaction(format!("Failed to commit transaction: {}", e))
        })?;

        info!(
            "Loaded {} onto company {}: new balance {}",
            amount, company_id, new_balance
        );

        Ok(CreditLoadOutcome {
            company_id,
            amount,
            new_balance,
            entry_id,
        })
    }

    /// Move credit from a company's central balance to one of its vehicles.
    ///
    /// The company balance is re-checked under the row lock; a caller-side
    /// check alone would leave a race window between check and debit.
    #[instrument(skip(self))]
    pub async fn allocate_to_vehicle(
        &self,
        company_id: i32,
        vehicle_id: i32,
        amount: Decimal,
    ) -> AppResult<AllocationOutcome> {
        info!(
            "Allocating {} from company {} to vehicle {}",
            amount, company_id, vehicle_id
        );

        let mut tx = self.pool.begin().await.map_err(|e| {
            error!("Failed to start transaction: {}", e);
            AppError::Transaction(format!("Failed to start transaction: {}", e))
        })?;

        // Lock order: company first, then vehicle, matching every other
        // path that touches both.
        let company = BalanceStore::lock_company(&mut tx, company_id)
            .await?
            .ok_or(AppError::CompanyNotFound(company_id))?;

        let vehicle = BalanceStore::lock_vehicle(&mut tx, vehicle_id)
            .await?
            .ok_or(AppError::VehicleNotFound(vehicle_id))?;

        if !vehicle.belongs_to(company_id) {
            return Err(AppError::Validation(format!(
                "Vehicle {} does not belong to company {}",
                vehicle_id, company_id
            )));
        }

        // Checked before the balance so an inactive company is not
        // misreported as insufficient funds
        if !company.is_active {
            return Err(AppError::Validation(format!(
                "Company {} is not active",
                company_id
            )));
        }

        if !company.can_allocate(amount) {
            return Err(AppError::InsufficientBalance {
                required: amount.to_string(),
                available: company.credit_balance.to_string(),
            });
        }

        let company_balance = BalanceStore::debit_company(&mut tx, company_id, amount).await?;
        let vehicle_balance = BalanceStore::credit_vehicle(&mut tx, vehicle_id, amount).await?;

        let (entry_id, _) = append_entry(
            &mut tx,
            CreditEntryType::Allocate,
            amount,
            Some(company_id),
            Some(vehicle_id),
            None,
            None,
            None,
        )
        .await?;

        tx.commit().await.map_err(|e| {
            error!("Failed to commit transaction: {}", e);
            AppError::Transaction(format!("Failed to commit transaction: {}", e))
        })?;

        info!(
            "Allocated {} to vehicle {}: company balance {}, vehicle balance {}",
            amount, vehicle_id, company_balance, vehicle_balance
        );

        Ok(AllocationOutcome {
            company_id,
            vehicle_id,
            amount,
            company_balance,
            vehicle_balance,
            entry_id,
        })
    }

    /// Execute a direct service-center spend through the policy engine.
    ///
    /// The vehicle row lock is taken before the quota check so that two
    /// concurrent requests for the same vehicle serialize; the second one
    /// sees the first one's ledger entry and fails the quota.
    #[instrument(skip(self))]
    pub async fn spend_via_service_center(
        &self,
        vehicle_id: i32,
        service_center_id: i32,
        service_type: ServiceType,
        amount: Decimal,
        on_date: NaiveDate,
    ) -> AppResult<SpendOutcome> {
        info!(
            "Spend of {} for {} on vehicle {} at service center {}",
            amount, service_type, vehicle_id, service_center_id
        );

        let mut tx = self.pool.begin().await.map_err(|e| {
            error!("Failed to start transaction: {}", e);
            AppError::Transaction(format!("Failed to start transaction: {}", e))
        })?;

        let vehicle = BalanceStore::lock_vehicle(&mut tx, vehicle_id)
            .await?
            .ok_or(AppError::VehicleNotFound(vehicle_id))?;

        ensure_service_center_active(&mut tx, service_center_id).await?;

        let (source, right) = self
            .policy
            .decide(&mut tx, &vehicle, service_type, amount, on_date)
            .await?;

        match source {
            SpendSource::RightPoints => {
                // decide() only returns this source when the locked right exists
                let right = right.ok_or_else(|| {
                    AppError::Internal("Point source selected without a service right".to_string())
                })?;
                BalanceStore::debit_right_points(&mut tx, right.id, amount).await?;
            }
            SpendSource::RightQuantity => {
                let right = right.ok_or_else(|| {
                    AppError::Internal(
                        "Quantity source selected without a service right".to_string(),
                    )
                })?;
                BalanceStore::consume_right_quantity(&mut tx, right.id).await?;
            }
            SpendSource::CreditBalance => {
                BalanceStore::debit_vehicle(&mut tx, vehicle_id, amount).await?;
            }
        }

        let (entry_id, _) = append_entry(
            &mut tx,
            CreditEntryType::Spend,
            amount,
            Some(vehicle.company_id),
            Some(vehicle_id),
            Some(service_center_id),
            Some(service_type),
            Some(source),
        )
        .await?;

        let transaction = append_service_transaction(
            &mut tx,
            vehicle_id,
            service_center_id,
            service_type,
            amount,
        )
        .await?;

        tx.commit().await.map_err(|e| {
            error!("Failed to commit transaction: {}", e);
            AppError::Transaction(format!("Failed to commit transaction: {}", e))
        })?;

        info!(
            "Spend committed: vehicle {}, source {}, amount {}",
            vehicle_id, source, amount
        );

        Ok(SpendOutcome {
            source,
            charged: amount,
            entry_id,
            transaction,
        })
    }

    /// Execute a QR payment: the agreement-discounted list price is
    /// charged against the vehicle's general balance.
    ///
    /// QR payments do not go through the policy engine: prepaid rights and
    /// the daily quota apply only to direct service-center spends.
    ///
    /// A 100% discount yields a zero charge; the payment still completes
    /// and both records are appended with amount 0, but no debit runs.
    #[instrument(skip(self, qr, agreement))]
    pub async fn pay_by_qr(
        &self,
        vehicle_id: i32,
        qr: &QrCode,
        agreement: &Agreement,
    ) -> AppResult<QrPaymentOutcome> {
        let charged = agreement.discounted_price(qr.amount);

        info!(
            "QR payment on vehicle {}: list {}, discount {}%, charging {}",
            vehicle_id, qr.amount, agreement.discount_rate_percent, charged
        );

        let mut tx = self.pool.begin().await.map_err(|e| {
            error!("Failed to start transaction: {}", e);
            AppError::Transaction(format!("Failed to start transaction: {}", e))
        })?;

        let vehicle = BalanceStore::lock_vehicle(&mut tx, vehicle_id)
            .await?
            .ok_or(AppError::VehicleNotFound(vehicle_id))?;

        if !vehicle.can_cover(charged) {
            return Err(AppError::InsufficientBalance {
                required: charged.to_string(),
                available: vehicle.credit_balance.to_string(),
            });
        }

        if !charged.is_zero() {
            BalanceStore::debit_vehicle(&mut tx, vehicle_id, charged).await?;
        }

        let (entry_id, _) = append_entry(
            &mut tx,
            CreditEntryType::Spend,
            charged,
            Some(vehicle.company_id),
            Some(vehicle_id),
            Some(qr.service_center_id),
            Some(qr.service_type),
            Some(SpendSource::CreditBalance),
        )
        .await?;

        let transaction = append_service_transaction(
            &mut tx,
            vehicle_id,
            qr.service_center_id,
            qr.service_type,
            charged,
        )
        .await?;

        tx.commit().await.map_err(|e| {
            error!("Failed to commit transaction: {}", e);
            AppError::Transaction(format!("Failed to commit transaction: {}", e))
        })?;

        info!(
            "QR payment committed: vehicle {}, charged {}",
            vehicle_id, charged
        );

        Ok(QrPaymentOutcome {
            list_price: qr.amount,
            discount_rate_percent: agreement.discount_rate_percent,
            charged,
            entry_id,
            transaction,
        })
    }
}

/// Fail unless the service center exists and is active
async fn ensure_service_center_active(
    conn: &mut PgConnection,
    service_center_id: i32,
) -> AppResult<()> {
    let row: Option<(bool,)> =
        sqlx::query_as("SELECT is_active FROM service_centers WHERE id = $1")
            .bind(service_center_id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| map_db_err("Failed to check service center", e))?;

    match row {
        Some((true,)) => Ok(()),
        Some((false,)) => Err(AppError::Validation(format!(
            "Service center {} is not active",
            service_center_id
        ))),
        None => Err(AppError::ServiceCenterNotFound(service_center_id)),
    }
}

/// Append one immutable ledger entry, returning its id and timestamp
#[allow(clippy::too_many_arguments)]
async fn append_entry(
    conn: &mut PgConnection,
    entry_type: CreditEntryType,
    amount: Decimal,
    company_id: Option<i32>,
    vehicle_id: Option<i32>,
    service_center_id: Option<i32>,
    service_type: Option<ServiceType>,
    spend_source: Option<SpendSource>,
) -> AppResult<(i64, DateTime<Utc>)> {
    let row: (i64, DateTime<Utc>) = sqlx::query_as(
        r#"
        INSERT INTO credit_transactions (
            entry_type, amount, company_id, vehicle_id,
            service_center_id, service_type, spend_source
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id, created_at
        "#,
    )
    .bind(entry_type.to_string())
    .bind(amount)
    .bind(company_id)
    .bind(vehicle_id)
    .bind(service_center_id)
    .bind(service_type.map(|t| t.to_string()))
    .bind(spend_source.map(|s| s.to_string()))
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| map_db_err("Failed to append ledger entry", e))?;

    Ok(row)
}

/// Append one completed service transaction, the service center's
/// recognized revenue for this spend
async fn append_service_transaction(
    conn: &mut PgConnection,
    vehicle_id: i32,
    service_center_id: i32,
    service_type: ServiceType,
    amount: Decimal,
) -> AppResult<ServiceTransaction> {
    let row: (i64, DateTime<Utc>) = sqlx::query_as(
        r#"
        INSERT INTO service_transactions (
            vehicle_id, service_center_id, service_type, amount, status
        )
        VALUES ($1, $2, $3, $4, 'completed')
        RETURNING id, transaction_date
        "#,
    )
    .bind(vehicle_id)
    .bind(service_center_id)
    .bind(service_type.to_string())
    .bind(amount)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| map_db_err("Failed to append service transaction", e))?;

    Ok(ServiceTransaction {
        id: row.0,
        vehicle_id,
        service_center_id,
        service_type,
        amount,
        status: TransactionStatus::Completed,
        transaction_date: row.1,
    })
}
