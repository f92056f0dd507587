//! Settlement handlers
//!
//! HTTP handlers for the settlement statement, payout execution, and
//! payout history.

use crate::dto::settlement::{PayoutRequest, PayoutResponse, SettlementResponse};
use crate::dto::{ApiResponse, PaginationParams};
use actix_web::{web, HttpResponse};
use filo_core::traits::PayoutRepository;
use filo_core::AppError;
use filo_db::PgPayoutRepository;
use filo_services::SettlementService;
use sqlx::PgPool;
use tracing::{debug, instrument, warn};
use validator::Validate;

/// Get the current settlement statement for a service center
///
/// GET /api/v1/service-centers/{id}/settlement
#[instrument(skip(pool))]
pub async fn get_settlement(
    pool: web::Data<PgPool>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let service_center_id = path.into_inner();

    debug!(service_center_id, "Computing settlement statement");

    let statement = SettlementService::new(pool.get_ref().clone())
        .statement(service_center_id)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(SettlementResponse::from(statement))))
}

/// Pay out everything currently owed to a service center
///
/// POST /api/v1/service-centers/{id}/payouts
#[instrument(skip(pool, req))]
pub async fn pay_settlement(
    pool: web::Data<PgPool>,
    path: web::Path<i32>,
    req: web::Json<PayoutRequest>,
) -> Result<HttpResponse, AppError> {
    let service_center_id = path.into_inner();

    debug!(service_center_id, "Executing settlement payout");

    let payout = SettlementService::new(pool.get_ref().clone())
        .pay_owed(service_center_id, req.into_inner().notes)
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::success(PayoutResponse::from(payout))))
}

/// List payouts for a service center
///
/// GET /api/v1/service-centers/{id}/payouts
#[instrument(skip(pool))]
pub async fn list_payouts(
    pool: web::Data<PgPool>,
    path: web::Path<i32>,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse, AppError> {
    query.validate().map_err(|e| {
        warn!("Pagination validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let service_center_id = path.into_inner();

    debug!(service_center_id, "Listing payouts");

    let repo = PgPayoutRepository::new(pool.get_ref().clone());
    let (payouts, total) = repo
        .list_by_service_center(service_center_id, query.limit(), query.offset())
        .await?;

    let data: Vec<PayoutResponse> = payouts.into_iter().map(Into::into).collect();

    Ok(HttpResponse::Ok().json(query.paginate(data, total)))
}

/// Configure settlement routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/service-centers")
            .route("/{id}/settlement", web::get().to(get_settlement))
            .route("/{id}/payouts", web::post().to(pay_settlement))
            .route("/{id}/payouts", web::get().to(list_payouts)),
    );
}
