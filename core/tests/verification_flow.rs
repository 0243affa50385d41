//! End-to-end walk through the verification lifecycle with a controlled clock

use chrono::{Duration, TimeZone, Utc};
use std::sync::Arc;

use vm_core::mock::{ManualClock, RecordingNotifier, SequenceCodeGenerator};
use vm_core::{
    DispatchOutcome, DomainError, InMemoryIdentityRepository, InMemoryVerificationStore,
    PendingRegistration, VerificationError, VerificationService, VerificationServiceConfig,
};

const EMAIL: &str = "a@x.com";

#[tokio::test]
async fn test_issue_limit_reissue_and_submit() {
    let clock = ManualClock::new(Utc.timestamp_opt(1_700_000_000, 0).unwrap());
    let notifier = Arc::new(RecordingNotifier::new());
    let identities = Arc::new(InMemoryIdentityRepository::new());
    let service = VerificationService::new(
        Arc::new(InMemoryVerificationStore::new()),
        identities.clone(),
        notifier.clone(),
        VerificationServiceConfig::default(),
    )
    .with_clock(Arc::new(clock.clone()))
    .with_code_generator(Arc::new(SequenceCodeGenerator::new(vec!["314159", "271828"])));

    // t=0
    let first = service.request_code(EMAIL).await.unwrap();
    assert_eq!(first.outcome, DispatchOutcome::Issued);
    assert_eq!(first.expires_in, Duration::seconds(300));
    let c1 = notifier.last_code_for(EMAIL).unwrap();

    // t=60
    clock.advance(Duration::seconds(60));
    match service.request_code(EMAIL).await {
        Err(DomainError::Verification(VerificationError::RateLimited {
            retry_after_minutes,
            ..
        })) => assert_eq!(retry_after_minutes, 4),
        other => panic!("Expected rate limit, got {:?}", other),
    }

    // t=310
    clock.advance(Duration::seconds(250));
    let second = service.request_code(EMAIL).await.unwrap();
    assert_eq!(second.outcome, DispatchOutcome::Issued);
    let c2 = notifier.last_code_for(EMAIL).unwrap();
    assert_ne!(c1, c2);

    // t=311
    clock.advance(Duration::seconds(1));
    let stale = service
        .submit_code(EMAIL, &c1, PendingRegistration::new("Ada", "pw").unwrap())
        .await;
    assert!(matches!(
        stale,
        Err(DomainError::Verification(VerificationError::InvalidCode))
    ));

    let verified = service
        .submit_code(EMAIL, &c2, PendingRegistration::new("Ada", "pw").unwrap())
        .await
        .unwrap();
    assert_eq!(verified.email.as_str(), EMAIL);
    assert_eq!(identities.count().await, 1);
}
