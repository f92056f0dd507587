//! Credit DTOs
//!
//! Request and response types for credit loading, allocation, and the
//! ledger listing.

use chrono::{DateTime, Utc};
use filo_core::models::CreditTransaction;
use filo_services::{AllocationOutcome, CreditLoadOutcome};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Credit load request
///
/// The card charge is settled by the payment provider before this endpoint
/// is called; amount positivity is validated in the handler.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoadCreditRequest {
    /// Target company
    #[validate(range(min = 1))]
    pub company_id: i32,

    /// Amount to load
    pub amount: Decimal,
}

/// Credit allocation request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AllocateCreditRequest {
    /// Source company
    #[validate(range(min = 1))]
    pub company_id: i32,

    /// Target vehicle, must belong to the company
    #[validate(range(min = 1))]
    pub vehicle_id: i32,

    /// Amount to move
    pub amount: Decimal,
}

/// Credit load response
#[derive(Debug, Clone, Serialize)]
pub struct LoadCreditResponse {
    pub company_id: i32,
    pub amount: Decimal,
    pub new_balance: Decimal,
    pub entry_id: i64,
}

impl From<CreditLoadOutcome> for LoadCreditResponse {
    fn from(o: CreditLoadOutcome) -> Self {
        Self {
            company_id: o.company_id,
            amount: o.amount,
            new_balance: o.new_balance,
            entry_id: o.entry_id,
        }
    }
}

/// Credit allocation response
#[derive(Debug, Clone, Serialize)]
pub struct AllocateCreditResponse {
    pub company_id: i32,
    pub vehicle_id: i32,
    pub amount: Decimal,
    pub company_balance: Decimal,
    pub vehicle_balance: Decimal,
    pub entry_id: i64,
}

impl From<AllocationOutcome> for AllocateCreditResponse {
    fn from(o: AllocationOutcome) -> Self {
        Self {
            company_id: o.company_id,
            vehicle_id: o.vehicle_id,
            amount: o.amount,
            company_balance: o.company_balance,
            vehicle_balance: o.vehicle_balance,
            entry_id: o.entry_id,
        }
    }
}

/// Ledger listing filters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LedgerFilterParams {
    pub company_id: Option<i32>,
    pub vehicle_id: Option<i32>,
    /// One of `load`, `allocate`, `spend`
    pub entry_type: Option<String>,
}

/// Single ledger entry
#[derive(Debug, Clone, Serialize)]
pub struct LedgerEntryResponse {
    pub id: i64,
    pub entry_type: String,
    pub amount: Decimal,
    pub company_id: Option<i32>,
    pub vehicle_id: Option<i32>,
    pub service_center_id: Option<i32>,
    pub service_type: Option<String>,
    pub spend_source: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<CreditTransaction> for LedgerEntryResponse {
    fn from(t: CreditTransaction) -> Self {
        Self {
            id: t.id,
            entry_type: t.entry_type.to_string(),
            amount: t.amount,
            company_id: t.company_id,
            vehicle_id: t.vehicle_id,
            service_center_id: t.service_center_id,
            service_type: t.service_type.map(|s| s.to_string()),
            spend_source: t.spend_source.map(|s| s.to_string()),
            created_at: t.created_at,
        }
    }
}
