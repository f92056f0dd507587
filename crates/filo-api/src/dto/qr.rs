//! QR payment DTOs

use filo_services::{QrPaymentOutcome, QrPreview};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// QR payment request
///
/// The vehicle is identified either by id or by license plate; exactly one
/// must be present.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct QrPayRequest {
    /// Scanned code value
    #[validate(length(min = 1, max = 100, message = "QR code is required"))]
    pub code: String,

    /// Paying vehicle id
    pub vehicle_id: Option<i32>,

    /// Paying vehicle license plate
    pub plate: Option<String>,
}

/// Vehicle identification for a QR preview
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QrPreviewParams {
    pub vehicle_id: Option<i32>,
    pub plate: Option<String>,
}

/// Pre-payment quote
#[derive(Debug, Clone, Serialize)]
pub struct QrPreviewResponse {
    pub code: String,
    pub service_center_id: i32,
    pub service_type: String,
    pub list_price: Decimal,
    pub discount_rate_percent: Decimal,
    /// Amount that would be charged to the vehicle balance
    pub charged: Decimal,
}

impl From<QrPreview> for QrPreviewResponse {
    fn from(p: QrPreview) -> Self {
        Self {
            code: p.code,
            service_center_id: p.service_center_id,
            service_type: p.service_type.to_string(),
            list_price: p.list_price,
            discount_rate_percent: p.discount_rate_percent,
            charged: p.charged,
        }
    }
}

/// QR payment response
#[derive(Debug, Clone, Serialize)]
pub struct QrPayResponse {
    pub list_price: Decimal,
    pub discount_rate_percent: Decimal,
    pub charged: Decimal,
    pub entry_id: i64,
    pub transaction_id: i64,
}

impl From<QrPaymentOutcome> for QrPayResponse {
    fn from(o: QrPaymentOutcome) -> Self {
        Self {
            list_price: o.list_price,
            discount_rate_percent: o.discount_rate_percent,
            charged: o.charged,
            entry_id: o.entry_id,
            transaction_id: o.transaction.id,
        }
    }
}
