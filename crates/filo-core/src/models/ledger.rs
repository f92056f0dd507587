//! Credit transaction ledger models
//!
//! The ledger is the system's source of truth for balance movements.
//! Entries are appended exactly once and never updated or deleted; the
//! balance columns on companies, vehicles, and service rights are cached
//! projections maintained in the same atomic unit as the append.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ServiceType;

/// Kind of balance movement a ledger entry records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreditEntryType {
    /// External funds credited to a company balance
    Load,
    /// Company balance moved to a vehicle balance
    Allocate,
    /// Vehicle-side value consumed at a service center
    Spend,
}

impl fmt::Display for CreditEntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CreditEntryType::Load => write!(f, "load"),
            CreditEntryType::Allocate => write!(f, "allocate"),
            CreditEntryType::Spend => write!(f, "spend"),
        }
    }
}

impl CreditEntryType {
    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "load" => Some(CreditEntryType::Load),
            "allocate" => Some(CreditEntryType::Allocate),
            "spend" => Some(CreditEntryType::Spend),
            _ => None,
        }
    }
}

/// Balance pool a spend was drawn from
///
/// Pools are tried in strict priority order: service-right points first,
/// then service-right quantity, then the vehicle's general balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpendSource {
    /// Prepaid point pool of the matching service right
    RightPoints,
    /// Usage-count pool of the matching service right
    RightQuantity,
    /// Vehicle general credit balance
    CreditBalance,
}

impl fmt::Display for SpendSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpendSource::RightPoints => write!(f, "right_points"),
            SpendSource::RightQuantity => write!(f, "right_quantity"),
            SpendSource::CreditBalance => write!(f, "credit_balance"),
        }
    }
}

impl SpendSource {
    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "right_points" => Some(SpendSource::RightPoints),
            "right_quantity" => Some(SpendSource::RightQuantity),
            "credit_balance" => Some(SpendSource::CreditBalance),
            _ => None,
        }
    }
}

/// Immutable ledger entry describing one balance movement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditTransaction {
    /// Unique identifier
    pub id: i64,

    /// Movement kind
    pub entry_type: CreditEntryType,

    /// Moved amount, never negative; zero only for fully discounted
    /// QR payments
    pub amount: Decimal,

    /// Company side of the movement, when involved
    pub company_id: Option<i32>,

    /// Vehicle side of the movement, when involved
    pub vehicle_id: Option<i32>,

    /// Service center side of the movement, when involved
    pub service_center_id: Option<i32>,

    /// Service type for spends
    pub service_type: Option<ServiceType>,

    /// Pool the value was drawn from, for spends
    pub spend_source: Option<SpendSource>,

    /// Append timestamp; also drives the daily-quota window
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_type_round_trip() {
        for t in [
            CreditEntryType::Load,
            CreditEntryType::Allocate,
            CreditEntryType::Spend,
        ] {
            assert_eq!(CreditEntryType::from_str(&t.to_string()), Some(t));
        }
        assert_eq!(CreditEntryType::from_str("refund"), None);
    }

    #[test]
    fn test_spend_source_round_trip() {
        for s in [
            SpendSource::RightPoints,
            SpendSource::RightQuantity,
            SpendSource::CreditBalance,
        ] {
            assert_eq!(SpendSource::from_str(&s.to_string()), Some(s));
        }
        assert_eq!(SpendSource::from_str("company_balance"), None);
    }
}
