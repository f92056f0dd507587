//! QR payment adapter
//!
//! Entry point for QR-initiated payments. Resolves a scanned code against
//! the registry, finds the paying vehicle, requires an active agreement
//! between the vehicle's company and the code's service center, and hands
//! the discounted charge to the ledger coordinator.
//!
//! Inactive or unknown codes are indistinguishable to the caller: both
//! fail with `InvalidQrCode`, so a revoked code leaks nothing about its
//! history.

use chrono::Utc;
use filo_core::models::{QrCode, ServiceType, Vehicle};
use filo_core::traits::{AgreementRepository, QrCodeRepository, VehicleRepository};
use filo_core::{AppError, AppResult};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{instrument, warn};

use crate::agreement::AgreementResolver;
use crate::ledger::{LedgerService, QrPaymentOutcome};

/// How the paying vehicle is identified at the point of sale
#[derive(Debug, Clone)]
pub enum VehicleRef {
    Id(i32),
    Plate(String),
}

/// Pre-payment quote for a scanned code
#[derive(Debug, Clone)]
pub struct QrPreview {
    pub code: String,
    pub service_center_id: i32,
    pub service_type: ServiceType,
    pub list_price: Decimal,
    pub discount_rate_percent: Decimal,
    pub charged: Decimal,
}

/// QR code resolution and discounted payment
pub struct QrPaymentService<Q, V, A>
where
    Q: QrCodeRepository,
    V: VehicleRepository,
    A: AgreementRepository,
{
    qr_repo: Arc<Q>,
    vehicle_repo: Arc<V>,
    agreements: AgreementResolver<A>,
    ledger: Arc<LedgerService>,
}

impl<Q, V, A> QrPaymentService<Q, V, A>
where
    Q: QrCodeRepository,
    V: VehicleRepository,
    A: AgreementRepository,
{
    /// Create a new QR payment service
    pub fn new(
        qr_repo: Arc<Q>,
        vehicle_repo: Arc<V>,
        agreements: AgreementResolver<A>,
        ledger: Arc<LedgerService>,
    ) -> Self {
        Self {
            qr_repo,
            vehicle_repo,
            agreements,
            ledger,
        }
    }

    /// Quote a scanned code for a vehicle without charging anything
    #[instrument(skip(self))]
    pub async fn preview(&self, code: &str, vehicle: VehicleRef) -> AppResult<QrPreview> {
        let qr = self.resolve_active(code).await?;
        let vehicle = self.find_vehicle(vehicle).await?;

        let agreement = self
            .agreements
            .require(vehicle.company_id, qr.service_center_id, Utc::now())
            .await?;

        let charged = agreement.discounted_price(qr.amount);

        Ok(QrPreview {
            code: qr.code,
            service_center_id: qr.service_center_id,
            service_type: qr.service_type,
            list_price: qr.amount,
            discount_rate_percent: agreement.discount_rate_percent,
            charged,
        })
    }

    /// Execute a QR payment end to end
    #[instrument(skip(self))]
    pub async fn pay(&self, code: &str, vehicle: VehicleRef) -> AppResult<QrPaymentOutcome> {
        let qr = self.resolve_active(code).await?;
        let vehicle = self.find_vehicle(vehicle).await?;

        let agreement = self
            .agreements
            .require(vehicle.company_id, qr.service_center_id, Utc::now())
            .await?;

        self.ledger.pay_by_qr(vehicle.id, &qr, &agreement).await
    }

    /// Resolve a code that is present in the registry and active
    async fn resolve_active(&self, code: &str) -> AppResult<QrCode> {
        match self.qr_repo.find_by_code(code).await? {
            Some(qr) if qr.is_active => Ok(qr),
            Some(_) => {
                warn!("Rejected inactive QR code");
                Err(AppError::InvalidQrCode(code.to_string()))
            }
            None => Err(AppError::InvalidQrCode(code.to_string())),
        }
    }

    async fn find_vehicle(&self, vehicle: VehicleRef) -> AppResult<Vehicle> {
        match vehicle {
            VehicleRef::Id(id) => self
                .vehicle_repo
                .find_by_id(id)
                .await?
                .ok_or(AppError::VehicleNotFound(id)),
            VehicleRef::Plate(plate) => {
                let plate = Vehicle::normalize_plate(&plate);
                self.vehicle_repo
                    .find_by_plate(&plate)
                    .await?
                    .ok_or_else(|| AppError::NotFound(format!("Vehicle with plate {}", plate)))
            }
        }
    }
}
