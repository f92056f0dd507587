//! Data transfer objects

pub mod common;
pub mod credit;
pub mod qr;
pub mod settlement;
pub mod spend;

pub use common::{ApiResponse, PaginationParams};
