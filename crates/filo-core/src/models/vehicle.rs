//! Vehicle model
//!
//! A vehicle belongs to exactly one company at a time and carries its own
//! general credit balance, funded by allocations from the company.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Vehicle entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    /// Unique identifier
    pub id: i32,

    /// Owning company
    pub company_id: i32,

    /// License plate, unique across the fleet
    pub plate: String,

    /// General credit balance, >= 0 at all times
    pub credit_balance: Decimal,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Vehicle {
    /// Check whether the general balance covers `amount`
    #[inline]
    pub fn can_cover(&self, amount: Decimal) -> bool {
        self.credit_balance >= amount
    }

    /// Check ownership by a company
    #[inline]
    pub fn belongs_to(&self, company_id: i32) -> bool {
        self.company_id == company_id
    }

    /// Normalize a license plate for storage and lookup: uppercase,
    /// whitespace stripped.
    pub fn normalize_plate(plate: &str) -> String {
        plate
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_uppercase()
    }
}

impl Default for Vehicle {
    fn default() -> Self {
        Self {
            id: 0,
            company_id: 0,
            plate: String::new(),
            credit_balance: Decimal::ZERO,
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
    fn test_can_cover() {
        let vehicle = Vehicle {
            credit_balance: dec!(250.00),
            ..Default::default()
        };

        assert!(vehicle.can_cover(dec!(250.00)));
        assert!(!vehicle.can_cover(dec!(250.01)));
    }

    #[test]
    fn test_normalize_plate() {
        assert_eq!(Vehicle::normalize_plate("34 abc 123"), "34ABC123");
        assert_eq!(Vehicle::normalize_plate(" 06 TK 42 "), "06TK42");
        assert_eq!(Vehicle::normalize_plate("34XYZ99"), "34XYZ99");
    }

    #[test]
    fn test_belongs_to() {
        let vehicle = Vehicle {
            company_id: 7,
            ..Default::default()
        };

        assert!(vehicle.belongs_to(7));
        assert!(!vehicle.belongs_to(8));
    }
}
