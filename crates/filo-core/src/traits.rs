//! Common traits for repositories
//!
//! Abstractions over database access used by the service layer. Each trait
//! declares only the operations the ledger core actually performs; the
//! generic CRUD surface of the surrounding fleet application lives outside
//! this core.

use crate::error::AppError;
use crate::models::{
    Agreement, CreditEntryType, CreditTransaction, Payout, QrCode, ServiceTransaction,
    ServiceType, Vehicle,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Vehicle lookups outside the coordinator's atomic unit
#[async_trait]
pub trait VehicleRepository: Send + Sync {
    /// Find vehicle by ID
    async fn find_by_id(&self, id: i32) -> Result<Option<Vehicle>, AppError>;

    /// Find vehicle by normalized license plate
    async fn find_by_plate(&self, plate: &str) -> Result<Option<Vehicle>, AppError>;
}

/// Agreement lookups
#[async_trait]
pub trait AgreementRepository: Send + Sync {
    /// Find the authoritative active agreement for a (company, service
    /// center) pair at `now`.
    ///
    /// Uniqueness of active agreements is not enforced by the schema; when
    /// duplicates exist the most recently created one wins
    /// (`created_at DESC, id DESC`).
    async fn find_active(
        &self,
        company_id: i32,
        service_center_id: i32,
        now: DateTime<Utc>,
    ) -> Result<Option<Agreement>, AppError>;
}

/// QR code registry lookups
#[async_trait]
pub trait QrCodeRepository: Send + Sync {
    /// Find a QR code by its scanned code value, active or not
    async fn find_by_code(&self, code: &str) -> Result<Option<QrCode>, AppError>;
}

/// Read access to the append-only credit transaction ledger
#[async_trait]
pub trait LedgerRepository: Send + Sync {
    /// List ledger entries, newest first, with optional filters
    async fn list_filtered(
        &self,
        company_id: Option<i32>,
        vehicle_id: Option<i32>,
        entry_type: Option<CreditEntryType>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<CreditTransaction>, i64), AppError>;
}

/// Read access to the append-only service transaction stream
#[async_trait]
pub trait TransactionRepository: Send + Sync {
    /// List service transactions, newest first, with optional filters
    async fn list_filtered(
        &self,
        service_center_id: Option<i32>,
        vehicle_id: Option<i32>,
        service_type: Option<ServiceType>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<ServiceTransaction>, i64), AppError>;
}

/// Read access to the append-only payout stream
#[async_trait]
pub trait PayoutRepository: Send + Sync {
    /// List payouts for a service center, newest first
    async fn list_by_service_center(
        &self,
        service_center_id: i32,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Payout>, i64), AppError>;
}

/// Pagination parameters
#[derive(Debug, Clone, Default)]
pub struct Pagination {
    pub page: i64,
    pub per_page: i64,
}

impl Pagination {
    pub fn new(page: i64, per_page: i64) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, 1000),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.per_page
    }

    pub fn limit(&self) -> i64 {
        self.per_page
    }
}

/// Paginated response wrapper
#[derive(Debug, Clone, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

/// Pagination metadata
#[derive(Debug, Clone, Serialize)]
pub struct PaginationMeta {
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

impl PaginationMeta {
    pub fn new(total: i64, page: i64, per_page: i64) -> Self {
        let total_pages = if per_page > 0 {
            (total + per_page - 1) / per_page
        } else {
            0
        };

        Self {
            total,
            page,
            per_page,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination() {
        let p = Pagination::new(1, 10);
        assert_eq!(p.offset(), 0);
        assert_eq!(p.limit(), 10);

        let p = Pagination::new(3, 20);
        assert_eq!(p.offset(), 40);
        assert_eq!(p.limit(), 20);
    }

    #[test]
    fn test_pagination_bounds() {
        let p = Pagination::new(0, 10); // page 0 becomes 1
        assert_eq!(p.page, 1);

        let p = Pagination::new(1, 2000); // per_page capped at 1000
        assert_eq!(p.per_page, 1000);
    }

    #[test]
    fn test_pagination_meta() {
        let meta = PaginationMeta::new(95, 1, 10);
        assert_eq!(meta.total_pages, 10);

        let meta = PaginationMeta::new(101, 1, 10);
        assert_eq!(meta.total_pages, 11);
    }
}
