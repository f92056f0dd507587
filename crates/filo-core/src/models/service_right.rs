//! Vehicle service right model
//!
//! A per-vehicle, per-service-type prepaid allowance. The allowance is
//! expressed as either a money-like point pool or a unit count; a vehicle
//! has at most one right per (vehicle, service type) pair.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ServiceType;

/// Prepaid service allowance for a vehicle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleServiceRight {
    /// Unique identifier
    pub id: i32,

    /// Owning vehicle
    pub vehicle_id: i32,

    /// Service type this right applies to
    pub service_type: ServiceType,

    /// Money-like point pool, >= 0
    pub points: Decimal,

    /// Usage-count pool, >= 0
    pub quantity: i32,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl VehicleServiceRight {
    /// Whether the point pool covers `amount`
    #[inline]
    pub fn has_points_for(&self, amount: Decimal) -> bool {
        self.points >= amount
    }

    /// Whether at least one usage unit remains
    #[inline]
    pub fn has_quantity(&self) -> bool {
        self.quantity > 0
    }
}

impl Default for VehicleServiceRight {
    fn default() -> Self {
        Self {
            id: 0,
            vehicle_id: 0,
            service_type: ServiceType::Wash,
            points: Decimal::ZERO,
            quantity: 0,
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
    fn test_point_pool_check() {
        let right = VehicleServiceRight {
            points: dec!(100.00),
            ..Default::default()
        };

        assert!(right.has_points_for(dec!(100.00)));
        assert!(!right.has_points_for(dec!(100.01)));
    }

    #[test]
    fn test_quantity_check() {
        let right = VehicleServiceRight {
            quantity: 1,
            ..Default::default()
        };
        assert!(right.has_quantity());

        let exhausted = VehicleServiceRight::default();
        assert!(!exhausted.has_quantity());
    }
}
