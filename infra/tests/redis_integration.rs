//! Integration tests for the Redis verification record store
//!
//! These tests require a running Redis instance to execute.
//! Run with: cargo test -p vm_infra --test redis_integration -- --ignored

use chrono::{Duration, SubsecRound, Utc};
use uuid::Uuid;

use vm_core::domain::entities::VerificationRecord;
use vm_core::domain::value_objects::EmailAddress;
use vm_core::repositories::VerificationRecordStore;
use vm_infra::cache::{CacheConfig, RedisClient, RedisVerificationStore};

async fn store() -> RedisVerificationStore {
    let _ = dotenvy::dotenv();
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let config = CacheConfig::new(
        std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string()),
    )
    .with_prefix(format!("test:{}", Uuid::new_v4()));

    let client = RedisClient::new(config).await.expect("Failed to connect to Redis");
    RedisVerificationStore::new(client, std::time::Duration::from_secs(60))
}

fn record(email: &EmailAddress, code: &str) -> VerificationRecord {
    let now = Utc::now().trunc_subsecs(3);
    VerificationRecord::mint(email.clone(), code.to_string(), now, Duration::minutes(5))
}

fn unique_email() -> EmailAddress {
    EmailAddress::parse(&format!("{}@example.com", Uuid::new_v4().simple())).unwrap()
}

#[tokio::test]
#[ignore] // Requires Redis server
async fn test_upsert_find_delete() {
    let store = store().await;
    let email = unique_email();
    let minted = record(&email, "482913");

    assert!(store.find_by_email(&email).await.unwrap().is_none());

    store.upsert(&minted).await.unwrap();
    assert_eq!(store.find_by_email(&email).await.unwrap(), Some(minted));

    assert!(store.delete(&email).await.unwrap());
    assert!(!store.delete(&email).await.unwrap());
    assert!(store.find_by_email(&email).await.unwrap().is_none());
}

#[tokio::test]
#[ignore] // Requires Redis server
async fn test_conditional_writes() {
    let store = store().await;
    let email = unique_email();
    let first = record(&email, "111111");

    // Insert-if-absent succeeds once
    assert!(store.upsert_if(&first, None).await.unwrap());
    assert!(!store.upsert_if(&first, None).await.unwrap());

    let second = VerificationRecord::mint(
        email.clone(),
        "222222".to_string(),
        first.created_at() + Duration::minutes(6),
        Duration::minutes(5),
    );

    // Stale expectation is refused
    let stale = first.created_at() - Duration::seconds(1);
    assert!(!store.upsert_if(&second, Some(stale)).await.unwrap());
    assert!(store.upsert_if(&second, Some(first.created_at())).await.unwrap());
    assert_eq!(store.find_by_email(&email).await.unwrap(), Some(second.clone()));

    assert!(!store.delete_if(&email, first.created_at()).await.unwrap());
    assert!(store.delete_if(&email, second.created_at()).await.unwrap());
    assert!(store.find_by_email(&email).await.unwrap().is_none());
}

#[tokio::test]
#[ignore] // Requires Redis server
async fn test_records_expire() {
    let _ = dotenvy::dotenv();
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let config = CacheConfig::new(
        std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string()),
    );
    let client = RedisClient::new(config).await.unwrap();
    assert!(client.health_check().await.unwrap());

    let store = RedisVerificationStore::new(client, std::time::Duration::from_millis(500));
    let email = unique_email();
    store.upsert(&record(&email, "333333")).await.unwrap();

    tokio::time::sleep(tokio::time::Duration::from_secs(1)).await;
    assert!(store.find_by_email(&email).await.unwrap().is_none());
}
