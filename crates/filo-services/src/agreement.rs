//! Agreement resolver service
//!
//! Resolves the authoritative contractual relationship between a company
//! and a service center at a point in time. A missing agreement means the
//! company is not authorized to buy services at that center.

use chrono::{DateTime, Utc};
use filo_core::models::Agreement;
use filo_core::traits::AgreementRepository;
use filo_core::{AppError, AppResult};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Agreement resolution service
pub struct AgreementResolver<A: AgreementRepository> {
    agreement_repo: Arc<A>,
}

impl<A: AgreementRepository> AgreementResolver<A> {
    /// Create a new agreement resolver
    pub fn new(agreement_repo: Arc<A>) -> Self {
        Self { agreement_repo }
    }

    /// Find the active agreement for a (company, service center) pair at
    /// `now`, if any. Duplicate active agreements resolve to the most
    /// recently created one.
    #[instrument(skip(self))]
    pub async fn resolve(
        &self,
        company_id: i32,
        service_center_id: i32,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Agreement>> {
        let agreement = self
            .agreement_repo
            .find_active(company_id, service_center_id, now)
            .await?;

        if let Some(ref a) = agreement {
            debug!(
                agreement_id = a.id,
                discount = %a.discount_rate_percent,
                "Agreement resolved"
            );
        }

        Ok(agreement)
    }

    /// Resolve or fail with `NoAgreement`
    #[instrument(skip(self))]
    pub async fn require(
        &self,
        company_id: i32,
        service_center_id: i32,
        now: DateTime<Utc>,
    ) -> AppResult<Agreement> {
        self.resolve(company_id, service_center_id, now)
            .await?
            .ok_or_else(|| {
                warn!(
                    "No active agreement between company {} and service center {}",
                    company_id, service_center_id
                );
                AppError::NoAgreement {
                    company_id,
                    service_center_id,
                }
            })
    }
}
