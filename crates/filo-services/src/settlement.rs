//! Settlement reconciler
//!
//! Computes what the platform owes each service center and settles it.
//! The owed amount is never stored: it is derived on demand as the sum of
//! completed service transactions minus the sum of payouts, clamped at
//! zero. Paying appends a payout record for the full owed amount while the
//! service center row lock is held, so the derived amount drops to zero
//! atomically with the payment.

use chrono::{DateTime, Utc};
use filo_core::models::Payout;
use filo_core::{AppError, AppResult};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use tracing::{error, info, instrument};
use uuid::Uuid;

use filo_db::{map_db_err, BalanceStore};

/// Point-in-time settlement view for a service center
#[derive(Debug, Clone, PartialEq)]
pub struct SettlementStatement {
    pub service_center_id: i32,
    /// Lifetime revenue from completed service transactions
    pub earned: Decimal,
    /// Lifetime total already paid out
    pub paid_out: Decimal,
    /// Currently owed, never negative
    pub owed: Decimal,
}

/// Derived settlement amounts and payout execution
pub struct SettlementService {
    pool: PgPool,
}

impl SettlementService {
    /// Create a new settlement service
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Compute the current settlement statement for a service center
    #[instrument(skip(self))]
    pub async fn statement(&self, service_center_id: i32) -> AppResult<SettlementStatement> {
        let mut conn = self.pool.acquire().await.map_err(|e| {
            error!("Failed to acquire connection: {}", e);
            AppError::Pool(e.to_string())
        })?;

        ensure_service_center_exists(&mut conn, service_center_id).await?;

        let (earned, paid_out) = settlement_sums(&mut conn, service_center_id).await?;

        Ok(SettlementStatement {
            service_center_id,
            earned,
            paid_out,
            owed: net_owed(earned, paid_out),
        })
    }

    /// Pay out everything currently owed to a service center.
    ///
    /// The owed amount is recomputed under the service center row lock;
    /// a second concurrent payout waits on the lock, recomputes, finds
    /// zero owed and fails with `NothingOwed` instead of paying twice.
    #[instrument(skip(self))]
    pub async fn pay_owed(
        &self,
        service_center_id: i32,
        notes: Option<String>,
    ) -> AppResult<Payout> {
        info!("Settling service center {}", service_center_id);

        let mut tx = self.pool.begin().await.map_err(|e| {
            error!("Failed to start transaction: {}", e);
            AppError::Transaction(format!("Failed to start transaction: {}", e))
        })?;

        BalanceStore::lock_service_center(&mut tx, service_center_id)
            .await?
            .ok_or(AppError::ServiceCenterNotFound(service_center_id))?;

        let (earned, paid_out) = settlement_sums(&mut tx, service_center_id).await?;
        let owed = net_owed(earned, paid_out);

        if owed.is_zero() {
            return Err(AppError::NothingOwed(service_center_id));
        }

        let payout = append_payout(&mut tx, service_center_id, owed, notes).await?;

        tx.commit().await.map_err(|e| {
            error!("Failed to commit transaction: {}", e);
            AppError::Transaction(format!("Failed to commit transaction: {}", e))
        })?;

        info!(
            "Paid out {} to service center {} (reference {})",
            payout.amount, service_center_id, payout.reference
        );

        Ok(payout)
    }
}

/// Currently owed amount: lifetime earnings minus lifetime payouts,
/// clamped at zero. Overpayment never produces a negative debt.
pub fn net_owed(earned: Decimal, paid_out: Decimal) -> Decimal {
    (earned - paid_out).max(Decimal::ZERO)
}

async fn ensure_service_center_exists(
    conn: &mut PgConnection,
    service_center_id: i32,
) -> AppResult<()> {
    let row: Option<(i32,)> = sqlx::query_as("SELECT id FROM service_centers WHERE id = $1")
        .bind(service_center_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| map_db_err("Failed to look up service center", e))?;

    row.map(|_| ())
        .ok_or(AppError::ServiceCenterNotFound(service_center_id))
}

/// Sum completed earnings and total payouts in one round trip
async fn settlement_sums(
    conn: &mut PgConnection,
    service_center_id: i32,
) -> AppResult<(Decimal, Decimal)> {
    let row: (Option<Decimal>, Option<Decimal>) = sqlx::query_as(
        r#"
        SELECT
            (SELECT SUM(amount) FROM service_transactions
             WHERE service_center_id = $1 AND status = 'completed'),
            (SELECT SUM(amount) FROM payouts
             WHERE service_center_id = $1)
        "#,
    )
    .bind(service_center_id)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| map_db_err("Failed to compute settlement sums", e))?;

    Ok((
        row.0.unwrap_or(Decimal::ZERO),
        row.1.unwrap_or(Decimal::ZERO),
    ))
}

async fn append_payout(
    conn: &mut PgConnection,
    service_center_id: i32,
    amount: Decimal,
    notes: Option<String>,
) -> AppResult<Payout> {
    let reference = Uuid::new_v4();

    let row: (i64, DateTime<Utc>) = sqlx::query_as(
        r#"
        INSERT INTO payouts (reference, service_center_id, amount, notes)
        VALUES ($1, $2, $3, $4)
        RETURNING id, paid_at
        "#,
    )
    .bind(reference)
    .bind(service_center_id)
    .bind(amount)
    .bind(&notes)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| map_db_err("Failed to record payout", e))?;

    Ok(Payout {
        id: row.0,
        reference,
        service_center_id,
        amount,
        notes,
        paid_at: row.1,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_net_owed_positive() {
        assert_eq!(net_owed(dec!(1000), dec!(400)), dec!(600));
    }

    #[test]
    fn test_net_owed_fully_settled() {
        assert_eq!(net_owed(dec!(1000), dec!(1000)), Decimal::ZERO);
    }

    #[test]
    fn test_net_owed_clamps_overpayment() {
        // Historical overpayment reads as zero owed, not negative debt
        assert_eq!(net_owed(dec!(400), dec!(1000)), Decimal::ZERO);
    }

    #[test]
    fn test_net_owed_no_history() {
        assert_eq!(net_owed(Decimal::ZERO, Decimal::ZERO), Decimal::ZERO);
    }
}
