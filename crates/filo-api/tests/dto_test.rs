//! DTO tests for the ledger API
//!
//! Deserialization, validation, and model-to-response conversion checks
//! that run without a database.

#[cfg(test)]
mod tests {
    use filo_api::dto::credit::{LedgerEntryResponse, LoadCreditRequest};
    use filo_api::dto::qr::QrPayRequest;
    use filo_api::dto::settlement::PayoutResponse;
    use filo_api::dto::spend::SpendRequest;
    use filo_api::PaginationParams;
    use filo_core::models::{
        CreditEntryType, CreditTransaction, Payout, ServiceType, SpendSource,
    };
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use uuid::Uuid;
    use validator::Validate;

    #[test]
    fn test_load_request_deserialization() {
        let req: LoadCreditRequest =
            serde_json::from_str(r#"{"company_id": 7, "amount": "1500.00"}"#).unwrap();
        assert_eq!(req.company_id, 7);
        assert_eq!(req.amount, dec!(1500.00));
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_load_request_rejects_zero_company() {
        let req: LoadCreditRequest =
            serde_json::from_str(r#"{"company_id": 0, "amount": "100"}"#).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_spend_request_deserialization() {
        let req: SpendRequest = serde_json::from_str(
            r#"{"vehicle_id": 3, "service_center_id": 9, "service_type": "wash", "amount": "120.50"}"#,
        )
        .unwrap();
        assert!(req.validate().is_ok());
        assert_eq!(ServiceType::from_str(&req.service_type), Some(ServiceType::Wash));
    }

    #[test]
    fn test_qr_pay_request_requires_code() {
        let req: QrPayRequest =
            serde_json::from_str(r#"{"code": "", "vehicle_id": 1}"#).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_pagination_accepts_string_values() {
        let params: PaginationParams =
            serde_json::from_str(r#"{"page": "4", "per_page": "25"}"#).unwrap();
        assert_eq!(params.offset(), 75);
        assert_eq!(params.limit(), 25);
    }

    #[test]
    fn test_ledger_entry_response_conversion() {
        let entry = CreditTransaction {
            id: 42,
            entry_type: CreditEntryType::Spend,
            amount: dec!(75.00),
            company_id: Some(1),
            vehicle_id: Some(2),
            service_center_id: Some(3),
            service_type: Some(ServiceType::Tire),
            spend_source: Some(SpendSource::RightPoints),
            created_at: Utc::now(),
        };

        let response = LedgerEntryResponse::from(entry);
        assert_eq!(response.entry_type, "spend");
        assert_eq!(response.service_type.as_deref(), Some("tire"));
        assert_eq!(response.spend_source.as_deref(), Some("right_points"));
    }

    #[test]
    fn test_payout_response_conversion() {
        let reference = Uuid::new_v4();
        let payout = Payout {
            id: 5,
            reference,
            service_center_id: 9,
            amount: dec!(840.25),
            notes: Some("July settlement".to_string()),
            paid_at: Utc::now(),
        };

        let response = PayoutResponse::from(payout);
        assert_eq!(response.reference, reference.to_string());
        assert_eq!(response.amount, dec!(840.25));

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"service_center_id\":9"));
    }
}
