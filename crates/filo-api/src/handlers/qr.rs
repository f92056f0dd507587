//! QR payment handlers

use crate::dto::qr::{QrPayRequest, QrPayResponse, QrPreviewParams, QrPreviewResponse};
use crate::dto::ApiResponse;
use actix_web::{web, HttpResponse};
use filo_core::AppError;
use filo_db::{PgAgreementRepository, PgQrCodeRepository, PgVehicleRepository};
use filo_services::{
    AgreementResolver, LedgerService, QrPaymentService, SpendPolicyEngine, VehicleRef,
};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{debug, instrument, warn};
use validator::Validate;

type PgQrPaymentService =
    QrPaymentService<PgQrCodeRepository, PgVehicleRepository, PgAgreementRepository>;

fn qr_service(pool: &PgPool, policy: &SpendPolicyEngine) -> PgQrPaymentService {
    let agreements = AgreementResolver::new(Arc::new(PgAgreementRepository::new(pool.clone())));
    let ledger = Arc::new(LedgerService::new(pool.clone(), policy.clone()));

    QrPaymentService::new(
        Arc::new(PgQrCodeRepository::new(pool.clone())),
        Arc::new(PgVehicleRepository::new(pool.clone())),
        agreements,
        ledger,
    )
}

fn vehicle_ref(vehicle_id: Option<i32>, plate: Option<String>) -> Result<VehicleRef, AppError> {
    match (vehicle_id, plate) {
        (Some(id), None) => Ok(VehicleRef::Id(id)),
        (None, Some(plate)) => Ok(VehicleRef::Plate(plate)),
        _ => Err(AppError::Validation(
            "Provide exactly one of vehicle_id or plate".to_string(),
        )),
    }
}

/// Pay a scanned QR code from a vehicle balance
///
/// POST /api/v1/payments/qr
#[instrument(skip(pool, policy, req))]
pub async fn pay_by_qr(
    pool: web::Data<PgPool>,
    policy: web::Data<SpendPolicyEngine>,
    req: web::Json<QrPayRequest>,
) -> Result<HttpResponse, AppError> {
    req.validate().map_err(|e| {
        warn!("QR payment validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let vehicle = vehicle_ref(req.vehicle_id, req.plate.clone())?;

    debug!("Executing QR payment");

    let outcome = qr_service(pool.get_ref(), policy.get_ref()).pay(&req.code, vehicle).await?;

    Ok(HttpResponse::Created().json(ApiResponse::success(QrPayResponse::from(outcome))))
}

/// Quote a scanned QR code for a vehicle without charging
///
/// GET /api/v1/payments/qr/{code}
#[instrument(skip(pool, policy))]
pub async fn preview_qr(
    pool: web::Data<PgPool>,
    policy: web::Data<SpendPolicyEngine>,
    path: web::Path<String>,
    query: web::Query<QrPreviewParams>,
) -> Result<HttpResponse, AppError> {
    let code = path.into_inner();
    let vehicle = vehicle_ref(query.vehicle_id, query.plate.clone())?;

    debug!("Previewing QR code");

    let preview = qr_service(pool.get_ref(), policy.get_ref()).preview(&code, vehicle).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(QrPreviewResponse::from(preview))))
}

/// Configure QR payment routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/payments/qr")
            .route("", web::post().to(pay_by_qr))
            .route("/{code}", web::get().to(preview_qr)),
    );
}
