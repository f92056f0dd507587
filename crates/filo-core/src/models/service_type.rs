//! Service type enumeration
//!
//! Every spend, QR code, and prepaid right is scoped to exactly one
//! service type.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of service a service center provides to fleet vehicles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceType {
    /// Vehicle wash
    Wash,
    /// Tire change or repair
    Tire,
    /// Periodic maintenance
    Maintenance,
    /// Fuel purchase
    Fuel,
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceType::Wash => write!(f, "wash"),
            ServiceType::Tire => write!(f, "tire"),
            ServiceType::Maintenance => write!(f, "maintenance"),
            ServiceType::Fuel => write!(f, "fuel"),
        }
    }
}

impl ServiceType {
    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "wash" => Some(ServiceType::Wash),
            "tire" => Some(ServiceType::Tire),
            "maintenance" => Some(ServiceType::Maintenance),
            "fuel" => Some(ServiceType::Fuel),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        for st in [
            ServiceType::Wash,
            ServiceType::Tire,
            ServiceType::Maintenance,
            ServiceType::Fuel,
        ] {
            assert_eq!(ServiceType::from_str(&st.to_string()), Some(st));
        }
    }

    #[test]
    fn test_unknown_type() {
        assert_eq!(ServiceType::from_str("towing"), None);
        assert_eq!(ServiceType::from_str(""), None);
    }
}
