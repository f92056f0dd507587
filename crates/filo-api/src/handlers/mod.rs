//! HTTP request handlers

pub mod credit;
pub mod qr;
pub mod settlement;
pub mod spend;

pub use credit::configure as configure_credits;
pub use qr::configure as configure_qr_payments;
pub use settlement::configure as configure_settlements;
pub use spend::configure as configure_spends;
