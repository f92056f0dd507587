//! Service center model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Service center entity
///
/// Service centers perform services against vehicle balances and accrue
/// revenue through completed service transactions. Their settlement amount
/// is always derived from the transaction and payout streams, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceCenter {
    /// Unique identifier
    pub id: i32,

    /// Service center display name
    pub name: String,

    /// Whether the center may accept payments
    pub is_active: bool,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Default for ServiceCenter {
    fn default() -> Self {
        Self {
            id: 0,
            name: String::new(),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}
