//! Company model
//!
//! A company owns a fleet of vehicles and funds them from its central
//! credit balance. The balance is a transactionally-maintained projection
//! of the credit transaction ledger and must never go negative.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Company entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    /// Unique identifier
    pub id: i32,

    /// Company display name
    pub name: String,

    /// Central credit balance, >= 0 at all times
    pub credit_balance: Decimal,

    /// Whether the company may operate
    pub is_active: bool,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Company {
    /// Check whether the company can fund an allocation of `amount`
    pub fn can_allocate(&self, amount: Decimal) -> bool {
        self.is_active && self.credit_balance >= amount
    }
}

impl Default for Company {
    fn default() -> Self {
        Self {
            id: 0,
            name: String::new(),
            credit_balance: Decimal::ZERO,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_can_allocate() {
        let company = Company {
            credit_balance: dec!(100.00),
            ..Default::default()
        };

        assert!(company.can_allocate(dec!(50.00)));
        assert!(company.can_allocate(dec!(100.00)));
        assert!(!company.can_allocate(dec!(100.01)));
    }

    #[test]
    fn test_inactive_company_cannot_allocate() {
        let company = Company {
            credit_balance: dec!(100.00),
            is_active: false,
            ..Default::default()
        };

        assert!(!company.can_allocate(dec!(1.00)));
    }
}
