//! QR code model
//!
//! A scannable code registered by a service center, binding a service type
//! to a fixed list price. Scanning an active code starts a QR payment
//! against the vehicle's general balance.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ServiceType;

/// QR code registry entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QrCode {
    /// Unique identifier
    pub id: i32,

    /// Owning service center
    pub service_center_id: i32,

    /// Scannable code, unique
    pub code: String,

    /// Service the code sells
    pub service_type: ServiceType,

    /// Fixed list price before agreement discount
    pub amount: Decimal,

    /// Inactive codes cannot be paid
    pub is_active: bool,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Default for QrCode {
    fn default() -> Self {
        Self {
            id: 0,
            service_center_id: 0,
            code: String::new(),
            service_type: ServiceType::Wash,
            amount: Decimal::ZERO,
            is_active: true,
            created_at: Utc::now(),
        }
    }
}
