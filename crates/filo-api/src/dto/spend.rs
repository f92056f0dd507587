//! Spend DTOs
//!
//! Request and response types for direct service-center spends and the
//! service transaction listing.

use chrono::{DateTime, Utc};
use filo_core::models::ServiceTransaction;
use filo_services::SpendOutcome;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Direct spend request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SpendRequest {
    /// Paying vehicle
    #[validate(range(min = 1))]
    pub vehicle_id: i32,

    /// Performing service center
    #[validate(range(min = 1))]
    pub service_center_id: i32,

    /// One of `wash`, `tire`, `maintenance`, `fuel`
    #[validate(length(min = 1))]
    pub service_type: String,

    /// Service price
    pub amount: Decimal,
}

/// Spend response
#[derive(Debug, Clone, Serialize)]
pub struct SpendResponse {
    /// Balance pool the spend was drawn from
    pub spend_source: String,
    pub charged: Decimal,
    pub entry_id: i64,
    pub transaction_id: i64,
}

impl From<SpendOutcome> for SpendResponse {
    fn from(o: SpendOutcome) -> Self {
        Self {
            spend_source: o.source.to_string(),
            charged: o.charged,
            entry_id: o.entry_id,
            transaction_id: o.transaction.id,
        }
    }
}

/// Service transaction listing filters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionFilterParams {
    pub service_center_id: Option<i32>,
    pub vehicle_id: Option<i32>,
    /// One of `wash`, `tire`, `maintenance`, `fuel`
    pub service_type: Option<String>,
}

/// Single service transaction
#[derive(Debug, Clone, Serialize)]
pub struct TransactionResponse {
    pub id: i64,
    pub vehicle_id: i32,
    pub service_center_id: i32,
    pub service_type: String,
    pub amount: Decimal,
    pub status: String,
    pub transaction_date: DateTime<Utc>,
}

impl From<ServiceTransaction> for TransactionResponse {
    fn from(t: ServiceTransaction) -> Self {
        Self {
            id: t.id,
            vehicle_id: t.vehicle_id,
            service_center_id: t.service_center_id,
            service_type: t.service_type.to_string(),
            amount: t.amount,
            status: t.status.to_string(),
            transaction_date: t.transaction_date,
        }
    }
}
