//! Repository implementations
//!
//! Concrete implementations of the repository traits defined in filo-core,
//! using sqlx for PostgreSQL access. These cover pool-scoped reads; all
//! balance mutations go through `BalanceStore` inside the coordinator's
//! transaction.

pub mod agreement_repo;
pub mod ledger_repo;
pub mod payout_repo;
pub mod qr_repo;
pub mod transaction_repo;
pub mod vehicle_repo;

pub use agreement_repo::PgAgreementRepository;
pub use ledger_repo::PgLedgerRepository;
pub use payout_repo::PgPayoutRepository;
pub use qr_repo::PgQrCodeRepository;
pub use transaction_repo::PgTransactionRepository;
pub use vehicle_repo::PgVehicleRepository;
