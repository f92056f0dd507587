//! Business logic services for the Filo credit ledger
//!
//! This crate contains the services that orchestrate value movements
//! between companies, vehicles, and service centers.
//!
//! # Architecture
//!
//! Services are designed to be composable and testable:
//! - Each service owns its dependencies (pool, repositories)
//! - Services are wrapped in Arc for safe sharing across async tasks
//! - All operations are instrumented with tracing
//! - Comprehensive error handling with AppError
//!
//! # Services
//!
//! - `AgreementResolver` - Active agreement lookup and discount pricing
//! - `SpendPolicyEngine` - Daily quota enforcement and pool selection
//! - `LedgerService` - Atomic balance mutations with ledger appends
//! - `SettlementService` - Derived settlement amounts and payouts
//! - `QrPaymentService` - QR code resolution and discounted payments

pub mod agreement;
pub mod ledger;
pub mod policy;
pub mod qr;
pub mod settlement;

pub use agreement::AgreementResolver;
pub use ledger::{
    AllocationOutcome, CreditLoadOutcome, LedgerService, QrPaymentOutcome, SpendOutcome,
};
pub use policy::SpendPolicyEngine;
pub use qr::{QrPaymentService, QrPreview, VehicleRef};
pub use settlement::{SettlementService, SettlementStatement};

/// Business logic constants
pub mod constants {
    /// Spends allowed per vehicle per service type per calendar day.
    /// One use per day, hard cap, no override.
    pub const DAILY_SPEND_LIMIT: i64 = 1;
}
