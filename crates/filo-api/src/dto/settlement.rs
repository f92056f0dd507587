//! Settlement DTOs

use chrono::{DateTime, Utc};
use filo_core::models::Payout;
use filo_services::SettlementStatement;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Settlement payout request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PayoutRequest {
    /// Free-form settlement notes handed to accounting
    pub notes: Option<String>,
}

/// Point-in-time settlement view
#[derive(Debug, Clone, Serialize)]
pub struct SettlementResponse {
    pub service_center_id: i32,
    pub earned: Decimal,
    pub paid_out: Decimal,
    pub owed: Decimal,
}

impl From<SettlementStatement> for SettlementResponse {
    fn from(s: SettlementStatement) -> Self {
        Self {
            service_center_id: s.service_center_id,
            earned: s.earned,
            paid_out: s.paid_out,
            owed: s.owed,
        }
    }
}

/// Single payout record
#[derive(Debug, Clone, Serialize)]
pub struct PayoutResponse {
    pub id: i64,
    pub reference: String,
    pub service_center_id: i32,
    pub amount: Decimal,
    pub notes: Option<String>,
    pub paid_at: DateTime<Utc>,
}

impl From<Payout> for PayoutResponse {
    fn from(p: Payout) -> Self {
        Self {
            id: p.id,
            reference: p.reference.to_string(),
            service_center_id: p.service_center_id,
            amount: p.amount,
            notes: p.notes,
            paid_at: p.paid_at,
        }
    }
}
