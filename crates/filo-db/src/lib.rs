//! Filo Ledger Database Layer
//!
//! This crate provides PostgreSQL database access for the credit and
//! settlement ledger. It includes:
//!
//! - Connection pool management with sqlx
//! - The balance store: row locks and guarded credit/debit mutations that
//!   always run inside a caller-owned transaction
//! - Repository implementations for the append-only ledger streams
//! - Mapping of serialization/deadlock conflicts to typed errors

pub mod balances;
pub mod error;
pub mod pool;
pub mod repositories;

pub use balances::BalanceStore;
pub use error::map_db_err;
pub use pool::create_pool;
pub use repositories::*;

// Re-export commonly used types
pub use filo_core::{AppError, AppResult};
pub use sqlx::{PgConnection, PgPool, Postgres, Transaction};
