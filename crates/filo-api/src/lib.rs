//! HTTP API layer for the Filo credit ledger
//!
//! Request handlers and DTOs for credit loading, allocation, spends, QR
//! payments, and settlement.

#![forbid(unsafe_code)]

pub mod dto;
pub mod handlers;

// Re-export DTOs (common types)
pub use dto::{ApiResponse, PaginationParams};

// Re-export handler configuration functions
pub use handlers::{
    configure_credits, configure_qr_payments, configure_settlements, configure_spends,
};
