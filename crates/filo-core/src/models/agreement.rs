//! Agreement model
//!
//! A time-boxed contract between a company and a service center fixing a
//! discount rate and a monthly spend ceiling. QR payments are priced
//! through the active agreement's discount.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Agreement entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agreement {
    /// Unique identifier
    pub id: i32,

    /// Contracting company
    pub company_id: i32,

    /// Contracted service center
    pub service_center_id: i32,

    /// Discount applied to list prices, 0-100
    pub discount_rate_percent: Decimal,

    /// Monthly spend ceiling under this agreement
    pub monthly_limit: Decimal,

    /// First day the agreement is in force
    pub starts_at: DateTime<Utc>,

    /// Last day the agreement is in force, open-ended when unset
    pub ends_at: Option<DateTime<Utc>>,

    /// Administrative kill switch
    pub is_active: bool,

    /// Creation timestamp, used as the tie-break when duplicates exist
    pub created_at: DateTime<Utc>,
}

impl Agreement {
    /// Whether the agreement is authoritative at `now`
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active
            && self.starts_at <= now
            && self.ends_at.map_or(true, |end| end >= now)
    }

    /// Apply the agreement discount to a list price.
    ///
    /// Rounds half-up to two fractional digits; the same rounding is used
    /// everywhere a discounted amount is charged or recorded.
    pub fn discounted_price(&self, list_price: Decimal) -> Decimal {
        let factor = (Decimal::ONE_HUNDRED - self.discount_rate_percent) / Decimal::ONE_HUNDRED;
        (list_price * factor).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }
}

impl Default for Agreement {
    fn default() -> Self {
        Self {
            id: 0,
            company_id: 0,
            service_center_id: 0,
            discount_rate_percent: Decimal::ZERO,
            monthly_limit: Decimal::ZERO,
            starts_at: Utc::now(),
            ends_at: None,
            is_active: true,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    #[test]
    fn test_discounted_price() {
        let agreement = Agreement {
            discount_rate_percent: dec!(15),
            ..Default::default()
        };

        // 300 at 15% off must charge exactly 255.00
        assert_eq!(agreement.discounted_price(dec!(300)), dec!(255.00));
    }

    #[test]
    fn test_discounted_price_rounds_half_up() {
        let agreement = Agreement {
            discount_rate_percent: dec!(12.5),
            ..Default::default()
        };

        // 100.10 * 0.875 = 87.5875 -> 87.59
        assert_eq!(agreement.discounted_price(dec!(100.10)), dec!(87.59));

        // 0.10 * 0.875 = 0.0875 -> 0.09 (midpoint rounds away from zero)
        assert_eq!(agreement.discounted_price(dec!(0.10)), dec!(0.09));
    }

    #[test]
    fn test_zero_discount_keeps_list_price() {
        let agreement = Agreement::default();
        assert_eq!(agreement.discounted_price(dec!(42.00)), dec!(42.00));
    }

    #[test]
    fn test_full_discount_charges_nothing() {
        // 100% is within the allowed rate range; the charge is zero and
        // the payment path must complete without a debit
        let agreement = Agreement {
            discount_rate_percent: dec!(100),
            ..Default::default()
        };

        assert_eq!(agreement.discounted_price(dec!(300)), dec!(0.00));
        assert!(agreement.discounted_price(dec!(300)).is_zero());
    }

    #[test]
    fn test_validity_window() {
        let now = Utc::now();
        let agreement = Agreement {
            starts_at: now - Duration::days(30),
            ends_at: Some(now + Duration::days(30)),
            ..Default::default()
        };

        assert!(agreement.is_valid_at(now));
        assert!(!agreement.is_valid_at(now + Duration::days(31)));
        assert!(!agreement.is_valid_at(now - Duration::days(31)));
    }

    #[test]
    fn test_open_ended_agreement() {
        let now = Utc::now();
        let agreement = Agreement {
            starts_at: now - Duration::days(1),
            ends_at: None,
            ..Default::default()
        };

        assert!(agreement.is_valid_at(now + Duration::days(365)));
    }

    #[test]
    fn test_inactive_agreement_is_never_valid() {
        let now = Utc::now();
        let agreement = Agreement {
            starts_at: now - Duration::days(1),
            is_active: false,
            ..Default::default()
        };

        assert!(!agreement.is_valid_at(now));
    }
}
