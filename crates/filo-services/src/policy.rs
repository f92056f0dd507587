//! Spend policy engine
//!
//! Decides whether a direct service-center spend is allowed and which
//! balance pool pays for it. Two rules apply, in order:
//!
//! 1. Daily quota: one spend per vehicle per service type per calendar
//!    day. The count runs inside the coordinator's transaction, after the
//!    vehicle row lock, so concurrent requests serialize instead of both
//!    passing the check.
//! 2. Pool priority: prepaid service-right points first, then the right's
//!    usage-count pool, then the vehicle's general credit balance.
//!    Pre-paid, service-specific entitlements are consumed before
//!    cash-like balance.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use filo_core::models::{ServiceType, SpendSource, Vehicle, VehicleServiceRight};
use filo_core::{AppError, AppResult};
use rust_decimal::Decimal;
use sqlx::PgConnection;
use tracing::{debug, instrument, warn};

use filo_db::{map_db_err, BalanceStore};

use crate::constants::DAILY_SPEND_LIMIT;

/// Spend admission and pool selection
#[derive(Debug, Clone)]
pub struct SpendPolicyEngine {
    daily_spend_limit: i64,
}

impl Default for SpendPolicyEngine {
    fn default() -> Self {
        Self {
            daily_spend_limit: DAILY_SPEND_LIMIT,
        }
    }
}

impl SpendPolicyEngine {
    /// Create an engine with a custom daily limit
    pub fn new(daily_spend_limit: i64) -> Self {
        Self { daily_spend_limit }
    }

    /// Decide the spend source for a request, enforcing the daily quota.
    ///
    /// Must be called inside the coordinator's transaction while the
    /// vehicle row lock is held. Returns the chosen source together with
    /// the locked service right when one was involved in the decision.
    #[instrument(skip(self, conn, vehicle))]
    pub async fn decide(
        &self,
        conn: &mut PgConnection,
        vehicle: &Vehicle,
        service_type: ServiceType,
        amount: Decimal,
        on_date: NaiveDate,
    ) -> AppResult<(SpendSource, Option<VehicleServiceRight>)> {
        self.check_daily_quota(conn, vehicle.id, service_type, on_date)
            .await?;

        let right = BalanceStore::lock_service_right(conn, vehicle.id, service_type).await?;

        match select_source(right.as_ref(), vehicle.credit_balance, amount) {
            Some(source) => {
                debug!(
                    vehicle_id = vehicle.id,
                    %service_type,
                    %amount,
                    %source,
                    "Spend source selected"
                );
                Ok((source, right))
            }
            None => {
                warn!(
                    vehicle_id = vehicle.id,
                    %service_type,
                    %amount,
                    "No balance pool covers the requested spend"
                );
                Err(AppError::InsufficientFunds)
            }
        }
    }

    /// Enforce the per-day spend cap for a (vehicle, service type) pair
    #[instrument(skip(self, conn))]
    pub async fn check_daily_quota(
        &self,
        conn: &mut PgConnection,
        vehicle_id: i32,
        service_type: ServiceType,
        on_date: NaiveDate,
    ) -> AppResult<()> {
        let count = count_spends_on_day(conn, vehicle_id, service_type, on_date).await?;

        if count >= self.daily_spend_limit {
            warn!(
                vehicle_id,
                %service_type,
                count,
                "Daily spend limit reached"
            );
            return Err(AppError::DailyLimitExceeded);
        }

        Ok(())
    }
}

/// Count ledger spends for a (vehicle, service type) pair on a calendar day
pub async fn count_spends_on_day(
    conn: &mut PgConnection,
    vehicle_id: i32,
    service_type: ServiceType,
    on_date: NaiveDate,
) -> AppResult<i64> {
    let (day_start, day_end) = day_bounds(on_date);

    let count: (i64,) = sqlx::query_as(
        r#"
        SELECT COUNT(*)
        FROM credit_transactions
        WHERE entry_type = 'spend'
          AND vehicle_id = $1
          AND service_type = $2
          AND created_at >= $3
          AND created_at < $4
        "#,
    )
    .bind(vehicle_id)
    .bind(service_type.to_string())
    .bind(day_start)
    .bind(day_end)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| map_db_err("Failed to count daily spends", e))?;

    Ok(count.0)
}

/// Calendar-day window for the daily quota: `[00:00, next 00:00)` on the
/// service clock (UTC).
pub fn day_bounds(on_date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = on_date
        .and_hms_opt(0, 0, 0)
        .unwrap_or_default()
        .and_utc();
    (start, start + Duration::days(1))
}

/// Pick the balance pool for a spend, in strict priority order.
///
/// A quantity right is consumed one unit at a time regardless of the
/// requested amount; the amount is only compared against monetary pools.
pub fn select_source(
    right: Option<&VehicleServiceRight>,
    vehicle_balance: Decimal,
    amount: Decimal,
) -> Option<SpendSource> {
    if let Some(right) = right {
        if right.has_points_for(amount) {
            return Some(SpendSource::RightPoints);
        }
        if right.has_quantity() {
            return Some(SpendSource::RightQuantity);
        }
    }

    if vehicle_balance >= amount {
        return Some(SpendSource::CreditBalance);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn right(points: Decimal, quantity: i32) -> VehicleServiceRight {
        VehicleServiceRight {
            points,
            quantity,
            ..Default::default()
        }
    }

    #[test]
    fn test_points_take_priority() {
        // points = 100, quantity = 0, balance = 500, spend 50 -> points
        let r = right(dec!(100), 0);
        assert_eq!(
            select_source(Some(&r), dec!(500), dec!(50)),
            Some(SpendSource::RightPoints)
        );
    }

    #[test]
    fn test_quantity_before_balance() {
        // points cannot cover, but one unit remains
        let r = right(dec!(10), 3);
        assert_eq!(
            select_source(Some(&r), dec!(500), dec!(50)),
            Some(SpendSource::RightQuantity)
        );
    }

    #[test]
    fn test_quantity_ignores_amount() {
        // quantity pool admits any amount as long as a unit remains
        let r = right(dec!(0), 1);
        assert_eq!(
            select_source(Some(&r), dec!(0), dec!(9999)),
            Some(SpendSource::RightQuantity)
        );
    }

    #[test]
    fn test_falls_back_to_general_balance() {
        let r = right(dec!(10), 0);
        assert_eq!(
            select_source(Some(&r), dec!(500), dec!(50)),
            Some(SpendSource::CreditBalance)
        );

        // No right at all
        assert_eq!(
            select_source(None, dec!(50), dec!(50)),
            Some(SpendSource::CreditBalance)
        );
    }

    #[test]
    fn test_no_pool_covers() {
        let r = right(dec!(10), 0);
        assert_eq!(select_source(Some(&r), dec!(20), dec!(50)), None);
        assert_eq!(select_source(None, dec!(0), dec!(1)), None);
    }

    #[test]
    fn test_exact_point_balance_is_sufficient() {
        let r = right(dec!(50), 0);
        assert_eq!(
            select_source(Some(&r), dec!(0), dec!(50)),
            Some(SpendSource::RightPoints)
        );
    }

    #[test]
    fn test_engine_limit_comes_from_config() {
        let cfg = filo_core::config::LedgerConfig::default();
        let engine = SpendPolicyEngine::new(cfg.daily_spend_limit);
        assert_eq!(engine.daily_spend_limit, 1);
        assert_eq!(engine.daily_spend_limit, SpendPolicyEngine::default().daily_spend_limit);
    }

    #[test]
    fn test_day_bounds_cover_one_day() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let (start, end) = day_bounds(date);

        assert_eq!(start.to_rfc3339(), "2024-03-15T00:00:00+00:00");
        assert_eq!(end - start, Duration::days(1));
    }
}
