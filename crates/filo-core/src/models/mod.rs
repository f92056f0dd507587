//! Domain models for the Filo credit and settlement ledger
//!
//! This module contains all the core domain models used throughout the
//! application. Balances are cached projections of the append-only ledger;
//! every mutation path must update both inside one atomic unit.

pub mod agreement;
pub mod company;
pub mod ledger;
pub mod payout;
pub mod qr_code;
pub mod service_center;
pub mod service_right;
pub mod service_type;
pub mod transaction;
pub mod vehicle;

pub use agreement::Agreement;
pub use company::Company;
pub use ledger::{CreditEntryType, CreditTransaction, SpendSource};
pub use payout::Payout;
pub use qr_code::QrCode;
pub use service_center::ServiceCenter;
pub use service_right::VehicleServiceRight;
pub use service_type::ServiceType;
pub use transaction::{ServiceTransaction, TransactionStatus};
pub use vehicle::Vehicle;
