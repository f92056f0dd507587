//! Database error mapping
//!
//! Translates sqlx errors into the application taxonomy. Serialization and
//! deadlock conflicts become `ConcurrentModification` so callers can decide
//! whether to retry; everything else is an infrastructure failure.

use filo_core::AppError;
use tracing::error;

/// SQLSTATE for serialization failures
const SQLSTATE_SERIALIZATION_FAILURE: &str = "40001";

/// SQLSTATE for deadlock detection
const SQLSTATE_DEADLOCK_DETECTED: &str = "40P01";

/// SQLSTATE for unique constraint violations
const SQLSTATE_UNIQUE_VIOLATION: &str = "23505";

/// Map a sqlx error into an `AppError`, attaching `context` to
/// infrastructure failures.
pub fn map_db_err(context: &str, e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        match db_err.code().as_deref() {
            Some(SQLSTATE_SERIALIZATION_FAILURE) | Some(SQLSTATE_DEADLOCK_DETECTED) => {
                return AppError::ConcurrentModification;
            }
            Some(SQLSTATE_UNIQUE_VIOLATION) => {
                return AppError::AlreadyExists(context.to_string());
            }
            _ => {}
        }
    }

    error!("{}: {}", context, e);
    AppError::Database(format!("{}: {}", context, e))
}
