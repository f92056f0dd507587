//! Credit handlers
//!
//! HTTP handlers for credit loading, allocation, and the ledger listing.

use crate::dto::credit::{
    AllocateCreditRequest, AllocateCreditResponse, LedgerEntryResponse, LedgerFilterParams,
    LoadCreditRequest, LoadCreditResponse,
};
use crate::dto::{ApiResponse, PaginationParams};
use actix_web::{web, HttpResponse};
use filo_core::models::CreditEntryType;
use filo_core::traits::LedgerRepository;
use filo_core::AppError;
use filo_db::PgLedgerRepository;
use filo_services::{LedgerService, SpendPolicyEngine};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{debug, instrument, warn};
use validator::Validate;

fn validate_amount(amount: Decimal) -> Result<(), AppError> {
    if amount <= Decimal::ZERO {
        return Err(AppError::Validation(format!(
            "Amount must be positive, got {}",
            amount
        )));
    }
    Ok(())
}

/// Load credit onto a company balance
///
/// POST /api/v1/credits/load
#[instrument(skip(pool, policy, req))]
pub async fn load_credit(
    pool: web::Data<PgPool>,
    policy: web::Data<SpendPolicyEngine>,
    req: web::Json<LoadCreditRequest>,
) -> Result<HttpResponse, AppError> {
    req.validate().map_err(|e| {
        warn!("Credit load validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;
    validate_amount(req.amount)?;

    debug!(company_id = req.company_id, amount = %req.amount, "Loading credit");

    let ledger = LedgerService::new(pool.get_ref().clone(), policy.get_ref().clone());
    let outcome = ledger.load_company_credit(req.company_id, req.amount).await?;

    Ok(HttpResponse::Created().json(ApiResponse::success(LoadCreditResponse::from(outcome))))
}

/// Allocate company credit to a vehicle
///
/// POST /api/v1/credits/allocate
#[instrument(skip(pool, policy, req))]
pub async fn allocate_credit(
    pool: web::Data<PgPool>,
    policy: web::Data<SpendPolicyEngine>,
    req: web::Json<AllocateCreditRequest>,
) -> Result<HttpResponse, AppError> {
    req.validate().map_err(|e| {
        warn!("Credit allocation validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;
    validate_amount(req.amount)?;

    debug!(
        company_id = req.company_id,
        vehicle_id = req.vehicle_id,
        amount = %req.amount,
        "Allocating credit"
    );

    let ledger = LedgerService::new(pool.get_ref().clone(), policy.get_ref().clone());
    let outcome = ledger
        .allocate_to_vehicle(req.company_id, req.vehicle_id, req.amount)
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::success(AllocateCreditResponse::from(outcome))))
}

/// List ledger entries with pagination and filters
///
/// GET /api/v1/credits/ledger
#[instrument(skip(pool))]
pub async fn list_ledger(
    pool: web::Data<PgPool>,
    query: web::Query<PaginationParams>,
    filters: web::Query<LedgerFilterParams>,
) -> Result<HttpResponse, AppError> {
    query.validate().map_err(|e| {
        warn!("Pagination validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let entry_type = filters
        .entry_type
        .as_deref()
        .map(|s| {
            CreditEntryType::from_str(s)
                .ok_or_else(|| AppError::Validation(format!("Unknown entry type '{}'", s)))
        })
        .transpose()?;

    debug!(
        page = query.page,
        per_page = query.per_page,
        "Listing ledger entries"
    );

    let repo = PgLedgerRepository::new(pool.get_ref().clone());
    let (entries, total) = repo
        .list_filtered(
            filters.company_id,
            filters.vehicle_id,
            entry_type,
            query.limit(),
            query.offset(),
        )
        .await?;

    let data: Vec<LedgerEntryResponse> = entries.into_iter().map(Into::into).collect();

    Ok(HttpResponse::Ok().json(query.paginate(data, total)))
}

/// Configure credit routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/credits")
            .route("/load", web::post().to(load_credit))
            .route("/allocate", web::post().to(allocate_credit))
            .route("/ledger", web::get().to(list_ledger)),
    );
}
