//! End-to-end ledger flow tests against a live database.
//!
//! All tests are ignored by default; run with a migrated database and
//! `cargo test -- --ignored`. Each test seeds its own rows and works only
//! on those, so tests can run against a shared database.

use chrono::Utc;
use filo_core::AppError;
use filo_db::{
    create_pool, PgAgreementRepository, PgQrCodeRepository, PgVehicleRepository,
};
use filo_services::{
    AgreementResolver, LedgerService, QrPaymentService, SettlementService, SpendPolicyEngine,
    VehicleRef,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sqlx::PgPool;
use std::sync::Arc;

async fn test_pool() -> PgPool {
    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "postgresql://localhost/filo_ledger".to_string());

    create_pool(&database_url, Some(5))
        .await
        .expect("test database must be reachable")
}

async fn seed_company(pool: &PgPool, balance: Decimal) -> i32 {
    let (id,): (i32,) = sqlx::query_as(
        "INSERT INTO companies (name, credit_balance) VALUES ($1, $2) RETURNING id",
    )
    .bind(format!("test-co-{}", Utc::now().timestamp_nanos_opt().unwrap_or(0)))
    .bind(balance)
    .fetch_one(pool)
    .await
    .expect("seed company");
    id
}

async fn seed_vehicle(pool: &PgPool, company_id: i32, balance: Decimal) -> i32 {
    let (id,): (i32,) = sqlx::query_as(
        "INSERT INTO vehicles (company_id, plate, credit_balance) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(company_id)
    .bind(format!("34T{}", Utc::now().timestamp_nanos_opt().unwrap_or(0) % 1_000_000))
    .bind(balance)
    .fetch_one(pool)
    .await
    .expect("seed vehicle");
    id
}

async fn seed_inactive_company(pool: &PgPool, balance: Decimal) -> i32 {
    let (id,): (i32,) = sqlx::query_as(
        "INSERT INTO companies (name, credit_balance, is_active) VALUES ($1, $2, FALSE) RETURNING id",
    )
    .bind(format!("test-co-{}", Utc::now().timestamp_nanos_opt().unwrap_or(0)))
    .bind(balance)
    .fetch_one(pool)
    .await
    .expect("seed inactive company");
    id
}

async fn seed_agreement(pool: &PgPool, company_id: i32, service_center_id: i32, rate: Decimal) {
    sqlx::query(
        "INSERT INTO agreements (company_id, service_center_id, discount_rate_percent, starts_at)
         VALUES ($1, $2, $3, NOW() - INTERVAL '1 day')",
    )
    .bind(company_id)
    .bind(service_center_id)
    .bind(rate)
    .execute(pool)
    .await
    .expect("seed agreement");
}

async fn seed_qr_code(pool: &PgPool, service_center_id: i32, amount: Decimal, active: bool) -> String {
    let code = format!("QR-{}", Utc::now().timestamp_nanos_opt().unwrap_or(0));
    sqlx::query(
        "INSERT INTO qr_codes (service_center_id, code, service_type, amount, is_active)
         VALUES ($1, $2, 'wash', $3, $4)",
    )
    .bind(service_center_id)
    .bind(&code)
    .bind(amount)
    .bind(active)
    .execute(pool)
    .await
    .expect("seed qr code");
    code
}

fn qr_service(
    pool: &PgPool,
) -> QrPaymentService<PgQrCodeRepository, PgVehicleRepository, PgAgreementRepository> {
    QrPaymentService::new(
        Arc::new(PgQrCodeRepository::new(pool.clone())),
        Arc::new(PgVehicleRepository::new(pool.clone())),
        AgreementResolver::new(Arc::new(PgAgreementRepository::new(pool.clone()))),
        Arc::new(LedgerService::new(pool.clone(), SpendPolicyEngine::default())),
    )
}

async fn vehicle_balance(pool: &PgPool, vehicle_id: i32) -> Decimal {
    let (balance,): (Decimal,) =
        sqlx::query_as("SELECT credit_balance FROM vehicles WHERE id = $1")
            .bind(vehicle_id)
            .fetch_one(pool)
            .await
            .unwrap();
    balance
}

async fn seed_service_center(pool: &PgPool) -> i32 {
    let (id,): (i32,) =
        sqlx::query_as("INSERT INTO service_centers (name) VALUES ($1) RETURNING id")
            .bind(format!("test-sc-{}", Utc::now().timestamp_nanos_opt().unwrap_or(0)))
            .fetch_one(pool)
            .await
            .expect("seed service center");
    id
}

#[tokio::test]
#[ignore] // Requires database
async fn test_load_then_allocate() {
    let pool = test_pool().await;
    let ledger = LedgerService::new(pool.clone(), SpendPolicyEngine::default());

    let company_id = seed_company(&pool, dec!(0)).await;
    let vehicle_id = seed_vehicle(&pool, company_id, dec!(0)).await;

    let load = ledger
        .load_company_credit(company_id, dec!(1000))
        .await
        .expect("load");
    assert_eq!(load.new_balance, dec!(1000));

    let alloc = ledger
        .allocate_to_vehicle(company_id, vehicle_id, dec!(300))
        .await
        .expect("allocate");
    assert_eq!(alloc.company_balance, dec!(700));
    assert_eq!(alloc.vehicle_balance, dec!(300));
}

#[tokio::test]
#[ignore] // Requires database
async fn test_allocate_rejects_foreign_vehicle() {
    let pool = test_pool().await;
    let ledger = LedgerService::new(pool.clone(), SpendPolicyEngine::default());

    let company_a = seed_company(&pool, dec!(500)).await;
    let company_b = seed_company(&pool, dec!(500)).await;
    let vehicle_b = seed_vehicle(&pool, company_b, dec!(0)).await;

    let err = ledger
        .allocate_to_vehicle(company_a, vehicle_b, dec!(100))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
#[ignore] // Requires database
async fn test_allocate_insufficient_company_balance() {
    let pool = test_pool().await;
    let ledger = LedgerService::new(pool.clone(), SpendPolicyEngine::default());

    let company_id = seed_company(&pool, dec!(50)).await;
    let vehicle_id = seed_vehicle(&pool, company_id, dec!(0)).await;

    let err = ledger
        .allocate_to_vehicle(company_id, vehicle_id, dec!(100))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InsufficientBalance { .. }));

    // Nothing moved
    let (balance,): (Decimal,) =
        sqlx::query_as("SELECT credit_balance FROM companies WHERE id = $1")
            .bind(company_id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(balance, dec!(50));
}

#[tokio::test]
#[ignore] // Requires database
async fn test_spend_enforces_daily_quota() {
    use filo_core::models::ServiceType;

    let pool = test_pool().await;
    let ledger = LedgerService::new(pool.clone(), SpendPolicyEngine::default());

    let company_id = seed_company(&pool, dec!(0)).await;
    let vehicle_id = seed_vehicle(&pool, company_id, dec!(500)).await;
    let center_id = seed_service_center(&pool).await;
    let today = Utc::now().date_naive();

    let first = ledger
        .spend_via_service_center(vehicle_id, center_id, ServiceType::Wash, dec!(100), today)
        .await
        .expect("first spend");
    assert_eq!(first.charged, dec!(100));

    let err = ledger
        .spend_via_service_center(vehicle_id, center_id, ServiceType::Wash, dec!(100), today)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::DailyLimitExceeded));

    // A different service type is a separate quota bucket
    ledger
        .spend_via_service_center(vehicle_id, center_id, ServiceType::Tire, dec!(100), today)
        .await
        .expect("different service type same day");
}

#[tokio::test]
#[ignore] // Requires database
async fn test_spend_then_settle() {
    use filo_core::models::ServiceType;

    let pool = test_pool().await;
    let ledger = LedgerService::new(pool.clone(), SpendPolicyEngine::default());
    let settlement = SettlementService::new(pool.clone());

    let company_id = seed_company(&pool, dec!(0)).await;
    let vehicle_id = seed_vehicle(&pool, company_id, dec!(500)).await;
    let center_id = seed_service_center(&pool).await;

    ledger
        .spend_via_service_center(
            vehicle_id,
            center_id,
            ServiceType::Maintenance,
            dec!(250),
            Utc::now().date_naive(),
        )
        .await
        .expect("spend");

    let statement = settlement.statement(center_id).await.expect("statement");
    assert_eq!(statement.earned, dec!(250));
    assert_eq!(statement.owed, dec!(250));

    let payout = settlement.pay_owed(center_id, None).await.expect("payout");
    assert_eq!(payout.amount, dec!(250));

    let after = settlement.statement(center_id).await.expect("statement");
    assert_eq!(after.owed, Decimal::ZERO);

    // Second payout finds nothing owed
    let err = settlement.pay_owed(center_id, None).await.unwrap_err();
    assert!(matches!(err, AppError::NothingOwed(_)));
}

#[tokio::test]
#[ignore] // Requires database
async fn test_spend_prefers_right_points() {
    use filo_core::models::{ServiceType, SpendSource};

    let pool = test_pool().await;
    let ledger = LedgerService::new(pool.clone(), SpendPolicyEngine::default());

    let company_id = seed_company(&pool, dec!(0)).await;
    let vehicle_id = seed_vehicle(&pool, company_id, dec!(500)).await;
    let center_id = seed_service_center(&pool).await;

    sqlx::query(
        "INSERT INTO vehicle_service_rights (vehicle_id, service_type, points, quantity)
         VALUES ($1, 'wash', 200, 0)",
    )
    .bind(vehicle_id)
    .execute(&pool)
    .await
    .expect("seed right");

    let outcome = ledger
        .spend_via_service_center(
            vehicle_id,
            center_id,
            ServiceType::Wash,
            dec!(150),
            Utc::now().date_naive(),
        )
        .await
        .expect("spend");
    assert_eq!(outcome.source, SpendSource::RightPoints);

    // Vehicle balance untouched, points drained
    let (balance,): (Decimal,) =
        sqlx::query_as("SELECT credit_balance FROM vehicles WHERE id = $1")
            .bind(vehicle_id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(balance, dec!(500));

    let (points,): (Decimal,) =
        sqlx::query_as("SELECT points FROM vehicle_service_rights WHERE vehicle_id = $1")
            .bind(vehicle_id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(points, dec!(50));
}

#[tokio::test]
#[ignore] // Requires database
async fn test_allocate_rejects_inactive_company() {
    let pool = test_pool().await;
    let ledger = LedgerService::new(pool.clone(), SpendPolicyEngine::default());

    // Funds are sufficient; only the active flag blocks the allocation
    let company_id = seed_inactive_company(&pool, dec!(500)).await;
    let vehicle_id = seed_vehicle(&pool, company_id, dec!(0)).await;

    let err = ledger
        .allocate_to_vehicle(company_id, vehicle_id, dec!(100))
        .await
        .unwrap_err();
    assert!(
        matches!(err, AppError::Validation(_)),
        "inactive company must fail validation, got {:?}",
        err
    );
}

#[tokio::test]
#[ignore] // Requires database
async fn test_concurrent_spends_one_winner() {
    let pool = test_pool().await;

    let company_id = seed_company(&pool, dec!(0)).await;
    let vehicle_id = seed_vehicle(&pool, company_id, dec!(10000)).await;
    let center_id = seed_service_center(&pool).await;
    let today = Utc::now().date_naive();

    let mut handles = Vec::new();
    for _ in 0..10 {
        let pool = pool.clone();
        handles.push(tokio::spawn(async move {
            let ledger = LedgerService::new(pool, SpendPolicyEngine::default());
            ledger
                .spend_via_service_center(
                    vehicle_id,
                    center_id,
                    filo_core::models::ServiceType::Wash,
                    dec!(100),
                    today,
                )
                .await
        }));
    }

    let mut succeeded = 0;
    let mut limited = 0;
    for handle in handles {
        match handle.await.expect("task panicked") {
            Ok(_) => succeeded += 1,
            Err(AppError::DailyLimitExceeded) => limited += 1,
            Err(e) => panic!("unexpected error: {:?}", e),
        }
    }

    assert_eq!(succeeded, 1);
    assert_eq!(limited, 9);

    // Exactly one amount left the vehicle balance
    assert_eq!(vehicle_balance(&pool, vehicle_id).await, dec!(9900));
}

#[tokio::test]
#[ignore] // Requires database
async fn test_qr_payment_applies_discount() {
    let pool = test_pool().await;

    let company_id = seed_company(&pool, dec!(0)).await;
    let vehicle_id = seed_vehicle(&pool, company_id, dec!(500)).await;
    let center_id = seed_service_center(&pool).await;
    seed_agreement(&pool, company_id, center_id, dec!(15)).await;
    let code = seed_qr_code(&pool, center_id, dec!(300), true).await;

    let outcome = qr_service(&pool)
        .pay(&code, VehicleRef::Id(vehicle_id))
        .await
        .expect("qr payment");

    // 300 at 15% off charges exactly 255.00
    assert_eq!(outcome.charged, dec!(255.00));
    assert_eq!(outcome.list_price, dec!(300));
    assert_eq!(outcome.transaction.amount, dec!(255.00));
    assert_eq!(vehicle_balance(&pool, vehicle_id).await, dec!(245.00));
}

#[tokio::test]
#[ignore] // Requires database
async fn test_qr_payment_rejects_unknown_and_inactive_codes() {
    let pool = test_pool().await;

    let company_id = seed_company(&pool, dec!(0)).await;
    let vehicle_id = seed_vehicle(&pool, company_id, dec!(500)).await;
    let center_id = seed_service_center(&pool).await;
    seed_agreement(&pool, company_id, center_id, dec!(10)).await;

    let err = qr_service(&pool)
        .pay("QR-DOES-NOT-EXIST", VehicleRef::Id(vehicle_id))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidQrCode(_)));

    // A revoked code fails identically to an unknown one
    let inactive = seed_qr_code(&pool, center_id, dec!(100), false).await;
    let err = qr_service(&pool)
        .pay(&inactive, VehicleRef::Id(vehicle_id))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidQrCode(_)));

    assert_eq!(vehicle_balance(&pool, vehicle_id).await, dec!(500));
}

#[tokio::test]
#[ignore] // Requires database
async fn test_qr_payment_requires_agreement() {
    let pool = test_pool().await;

    let company_id = seed_company(&pool, dec!(0)).await;
    let vehicle_id = seed_vehicle(&pool, company_id, dec!(500)).await;
    let center_id = seed_service_center(&pool).await;
    let code = seed_qr_code(&pool, center_id, dec!(100), true).await;

    let err = qr_service(&pool)
        .pay(&code, VehicleRef::Id(vehicle_id))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NoAgreement { .. }));

    // Nothing moved and nothing was recorded
    assert_eq!(vehicle_balance(&pool, vehicle_id).await, dec!(500));
    let (count,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM service_transactions WHERE vehicle_id = $1",
    )
    .bind(vehicle_id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
#[ignore] // Requires database
async fn test_qr_payment_full_discount_is_free() {
    let pool = test_pool().await;

    let company_id = seed_company(&pool, dec!(0)).await;
    let vehicle_id = seed_vehicle(&pool, company_id, dec!(500)).await;
    let center_id = seed_service_center(&pool).await;
    seed_agreement(&pool, company_id, center_id, dec!(100)).await;
    let code = seed_qr_code(&pool, center_id, dec!(300), true).await;

    let outcome = qr_service(&pool)
        .pay(&code, VehicleRef::Id(vehicle_id))
        .await
        .expect("fully discounted payment must complete");

    assert_eq!(outcome.charged, dec!(0.00));
    assert_eq!(outcome.transaction.amount, dec!(0.00));

    // Balance untouched, but both audit records exist
    assert_eq!(vehicle_balance(&pool, vehicle_id).await, dec!(500));
    let (amount,): (Decimal,) = sqlx::query_as(
        "SELECT amount FROM credit_transactions WHERE vehicle_id = $1 AND entry_type = 'spend'",
    )
    .bind(vehicle_id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(amount, Decimal::ZERO);
}
