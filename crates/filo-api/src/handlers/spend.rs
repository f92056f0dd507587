//! Spend handlers
//!
//! HTTP handlers for direct service-center spends and the service
//! transaction listing.

use crate::dto::spend::{
    SpendRequest, SpendResponse, TransactionFilterParams, TransactionResponse,
};
use crate::dto::{ApiResponse, PaginationParams};
use actix_web::{web, HttpResponse};
use chrono::Utc;
use filo_core::models::ServiceType;
use filo_core::traits::TransactionRepository;
use filo_core::AppError;
use filo_db::PgTransactionRepository;
use filo_services::{LedgerService, SpendPolicyEngine};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{debug, instrument, warn};
use validator::Validate;

/// Execute a direct spend at a service center
///
/// POST /api/v1/spends
#[instrument(skip(pool, policy, req))]
pub async fn spend(
    pool: web::Data<PgPool>,
    policy: web::Data<SpendPolicyEngine>,
    req: web::Json<SpendRequest>,
) -> Result<HttpResponse, AppError> {
    req.validate().map_err(|e| {
        warn!("Spend validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    if req.amount <= Decimal::ZERO {
        return Err(AppError::Validation(format!(
            "Amount must be positive, got {}",
            req.amount
        )));
    }

    let service_type = ServiceType::from_str(&req.service_type).ok_or_else(|| {
        AppError::Validation(format!("Unknown service type '{}'", req.service_type))
    })?;

    debug!(
        vehicle_id = req.vehicle_id,
        service_center_id = req.service_center_id,
        %service_type,
        amount = %req.amount,
        "Executing spend"
    );

    let ledger = LedgerService::new(pool.get_ref().clone(), policy.get_ref().clone());
    let outcome = ledger
        .spend_via_service_center(
            req.vehicle_id,
            req.service_center_id,
            service_type,
            req.amount,
            Utc::now().date_naive(),
        )
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::success(SpendResponse::from(outcome))))
}

/// List service transactions with pagination and filters
///
/// GET /api/v1/transactions
#[instrument(skip(pool))]
pub async fn list_transactions(
    pool: web::Data<PgPool>,
    query: web::Query<PaginationParams>,
    filters: web::Query<TransactionFilterParams>,
) -> Result<HttpResponse, AppError> {
    query.validate().map_err(|e| {
        warn!("Pagination validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let service_type = filters
        .service_type
        .as_deref()
        .map(|s| {
            ServiceType::from_str(s)
                .ok_or_else(|| AppError::Validation(format!("Unknown service type '{}'", s)))
        })
        .transpose()?;

    debug!(
        page = query.page,
        per_page = query.per_page,
        "Listing service transactions"
    );

    let repo = PgTransactionRepository::new(pool.get_ref().clone());
    let (transactions, total) = repo
        .list_filtered(
            filters.service_center_id,
            filters.vehicle_id,
            service_type,
            query.limit(),
            query.offset(),
        )
        .await?;

    let data: Vec<TransactionResponse> = transactions.into_iter().map(Into::into).collect();

    Ok(HttpResponse::Ok().json(query.paginate(data, total)))
}

/// Configure spend routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/spends", web::post().to(spend))
        .route("/transactions", web::get().to(list_transactions));
}
