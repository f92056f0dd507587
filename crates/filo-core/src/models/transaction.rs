//! Service transaction model
//!
//! Append-only revenue records for service centers. Completed transactions
//! are one of the two event streams the settlement reconciler derives the
//! owed amount from.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ServiceType;

/// Service transaction status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// Revenue recognized; counts toward settlement
    #[default]
    Completed,
    /// Recorded but not yet recognized
    Pending,
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionStatus::Completed => write!(f, "completed"),
            TransactionStatus::Pending => write!(f, "pending"),
        }
    }
}

impl TransactionStatus {
    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "completed" => Some(TransactionStatus::Completed),
            "pending" => Some(TransactionStatus::Pending),
            _ => None,
        }
    }
}

/// Immutable service revenue record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceTransaction {
    /// Unique identifier
    pub id: i64,

    /// Vehicle the service was performed on
    pub vehicle_id: i32,

    /// Service center that performed the service
    pub service_center_id: i32,

    /// Performed service type
    pub service_type: ServiceType,

    /// Recognized amount
    pub amount: Decimal,

    /// Recognition status
    pub status: TransactionStatus,

    /// When the service happened
    pub transaction_date: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        assert_eq!(
            TransactionStatus::from_str("completed"),
            Some(TransactionStatus::Completed)
        );
        assert_eq!(
            TransactionStatus::from_str("PENDING"),
            Some(TransactionStatus::Pending)
        );
        assert_eq!(TransactionStatus::from_str("voided"), None);
    }
}
