//! Unified error handling for the Filo ledger
//!
//! All failure conditions of the credit and settlement core are expressed as
//! variants of a single error type with automatic HTTP response mapping.
//! Business outcomes (insufficient funds, quota exceeded, no agreement, ...)
//! are expected results and map to 4xx codes; only infrastructure failures
//! map to 500.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

/// Main application error type
///
/// All errors in the application should be converted to this type.
/// It implements `ResponseError` for automatic HTTP response generation.
#[derive(Error, Debug)]
pub enum AppError {
    // ==================== Database Errors ====================
    #[error("Database error: {0}")]
    Database(String),

    #[error("Database pool error: {0}")]
    Pool(String),

    #[error("Transaction failed: {0}")]
    Transaction(String),

    /// A row lock or serialization conflict was detected by the database.
    /// Retrying is the caller's decision, never done inside the core.
    #[error("Concurrent modification detected, retry the operation")]
    ConcurrentModification,

    // ==================== Ledger Business Errors ====================
    #[error("Insufficient balance: required {required}, available {available}")]
    InsufficientBalance { required: String, available: String },

    /// No balance pool (service right points, quantity, or general credit)
    /// can cover the requested spend.
    #[error("Insufficient funds: no balance pool covers the requested amount")]
    InsufficientFunds,

    #[error("Daily limit exceeded: service already used today for this vehicle")]
    DailyLimitExceeded,

    #[error("No active agreement between company {company_id} and service center {service_center_id}")]
    NoAgreement {
        company_id: i32,
        service_center_id: i32,
    },

    #[error("Invalid QR code: {0}")]
    InvalidQrCode(String),

    #[error("Nothing owed to service center {0}")]
    NothingOwed(i32),

    // ==================== Resource Errors ====================
    #[error("Company not found: {0}")]
    CompanyNotFound(i32),

    #[error("Vehicle not found: {0}")]
    VehicleNotFound(i32),

    #[error("Service center not found: {0}")]
    ServiceCenterNotFound(i32),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    // ==================== Validation Errors ====================
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // ==================== Internal Errors ====================
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AppError {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            AppError::Validation(_) | AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,

            // 402 Payment Required
            AppError::InsufficientBalance { .. } | AppError::InsufficientFunds => {
                StatusCode::PAYMENT_REQUIRED
            }

            // 403 Forbidden - company is not authorized at this service center
            AppError::NoAgreement { .. } => StatusCode::FORBIDDEN,

            // 404 Not Found
            AppError::CompanyNotFound(_)
            | AppError::VehicleNotFound(_)
            | AppError::ServiceCenterNotFound(_)
            | AppError::InvalidQrCode(_)
            | AppError::NotFound(_) => StatusCode::NOT_FOUND,

            // 409 Conflict
            AppError::Conflict(_)
            | AppError::AlreadyExists(_)
            | AppError::NothingOwed(_)
            | AppError::ConcurrentModification => StatusCode::CONFLICT,

            // 429 Too Many Requests
            AppError::DailyLimitExceeded => StatusCode::TOO_MANY_REQUESTS,

            // 500 Internal Server Error
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "database_error",
            AppError::Pool(_) => "pool_error",
            AppError::Transaction(_) => "transaction_error",
            AppError::ConcurrentModification => "concurrent_modification",
            AppError::InsufficientBalance { .. } => "insufficient_balance",
            AppError::InsufficientFunds => "insufficient_funds",
            AppError::DailyLimitExceeded => "daily_limit_exceeded",
            AppError::NoAgreement { .. } => "no_agreement",
            AppError::InvalidQrCode(_) => "invalid_qr_code",
            AppError::NothingOwed(_) => "nothing_owed",
            AppError::CompanyNotFound(_) => "company_not_found",
            AppError::VehicleNotFound(_) => "vehicle_not_found",
            AppError::ServiceCenterNotFound(_) => "service_center_not_found",
            AppError::NotFound(_) => "not_found",
            AppError::Conflict(_) => "conflict",
            AppError::AlreadyExists(_) => "already_exists",
            AppError::Validation(_) => "validation_error",
            AppError::InvalidInput(_) => "invalid_input",
            AppError::Internal(_) => "internal_error",
            AppError::Config(_) => "config_error",
            AppError::Serialization(_) => "serialization_error",
        }
    }

    /// Whether this is an expected business outcome rather than an
    /// infrastructure failure. Expected outcomes are logged at warn level
    /// and never treated as server errors.
    pub fn is_expected(&self) -> bool {
        !matches!(
            self,
            AppError::Database(_)
                | AppError::Pool(_)
                | AppError::Transaction(_)
                | AppError::Internal(_)
                | AppError::Config(_)
                | AppError::Serialization(_)
        )
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        AppError::status_code(self)
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let body = json!({
            "error": self.error_code(),
            "message": self.to_string(),
            "status": status.as_u16(),
        });

        HttpResponse::build(status).json(body)
    }
}

// ==================== From implementations ====================

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}
