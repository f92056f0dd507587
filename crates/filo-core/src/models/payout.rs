//! Payout model
//!
//! Append-only settlement records. A payout zeroes a service center's owed
//! amount by appending an event, never by overwriting a cached total.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Immutable settlement record for a service center
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payout {
    /// Unique identifier
    pub id: i64,

    /// External reference handed to accounting
    pub reference: Uuid,

    /// Settled service center
    pub service_center_id: i32,

    /// Paid amount; always the full owed amount at payout time
    pub amount: Decimal,

    /// Free-form settlement notes
    pub notes: Option<String>,

    /// Settlement timestamp
    pub paid_at: DateTime<Utc>,
}
