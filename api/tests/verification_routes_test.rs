//! End-to-end tests of the verification routes against in-memory stores,
//! a manual clock and a recording notifier.

use actix_web::{http::header, http::StatusCode, test, web};
use chrono::{Duration, TimeZone, Utc};
use serde_json::json;
use std::sync::Arc;

use vm_api::dto::{DispatchResponse, VerifiedResponse};
use vm_api::{create_app, AppState, SharedVerificationService};
use vm_core::mock::{ManualClock, RecordingNotifier, SequenceCodeGenerator};
use vm_core::{
    EmailAddress, IdentityRepository, InMemoryIdentityRepository, InMemoryVerificationStore,
    Notifier, NotifyError, VerificationRecordStore, VerificationService, VerificationServiceConfig,
};
use vm_shared::config::{Environment, RecordRetention, ServerConfig};

const EMAIL: &str = "alice@example.com";

struct TestContext {
    state: web::Data<AppState>,
    clock: ManualClock,
    notifier: RecordingNotifier,
    identities: InMemoryIdentityRepository,
}

impl TestContext {
    fn new() -> Self {
        Self::with_config(VerificationServiceConfig::default())
    }

    fn with_config(config: VerificationServiceConfig) -> Self {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap());
        let notifier = RecordingNotifier::new();
        let identities = InMemoryIdentityRepository::new();

        let service: SharedVerificationService = VerificationService::new(
            Arc::new(InMemoryVerificationStore::new()) as Arc<dyn VerificationRecordStore>,
            Arc::new(identities.clone()) as Arc<dyn IdentityRepository>,
            Arc::new(notifier.clone()) as Arc<dyn Notifier>,
            config,
        )
        .with_clock(Arc::new(clock.clone()))
        .with_code_generator(Arc::new(SequenceCodeGenerator::new(["482913", "731052"])));

        Self {
            state: web::Data::new(AppState::new(Arc::new(service))),
            clock,
            notifier,
            identities,
        }
    }
}

macro_rules! init_app {
    ($ctx:expr) => {
        test::init_service(create_app(
            $ctx.state.clone(),
            &ServerConfig::default(),
            Environment::Development,
        ))
        .await
    };
}

fn request_code(email: &str) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/api/v1/verification/request-code")
        .set_json(json!({ "email": email }))
}

fn submit_code(email: &str, code: &str) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/api/v1/verification/submit-code")
        .set_json(json!({
            "email": email,
            "code": code,
            "name": "Alice",
            "credential": "correct horse battery staple",
        }))
}

#[actix_web::test]
async fn test_request_code_issues_and_delivers() {
    let ctx = TestContext::new();
    let app = init_app!(ctx);

    let resp = test::call_service(&app, request_code(EMAIL).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "issued");
    assert_eq!(body["expires_in_seconds"], 300);
    assert_eq!(body["retry_after_seconds"], 300);
    // The code only ever travels through the notifier
    assert!(!body.to_string().contains("482913"));

    assert_eq!(ctx.notifier.last_code_for(EMAIL).as_deref(), Some("482913"));
}

#[actix_web::test]
async fn test_second_request_is_rate_limited() {
    let ctx = TestContext::new();
    let app = init_app!(ctx);

    test::call_service(&app, request_code(EMAIL).to_request()).await;
    ctx.clock.advance(Duration::seconds(60));

    let resp = test::call_service(&app, request_code(EMAIL).to_request()).await;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(resp.headers().get(header::RETRY_AFTER).unwrap(), "240");

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "RATE_LIMIT_EXCEEDED");
    assert_eq!(body["details"]["retry_after_minutes"], 4);
    assert_eq!(ctx.notifier.delivery_count(), 1);
}

#[actix_web::test]
async fn test_email_case_shares_one_record() {
    let ctx = TestContext::new();
    let app = init_app!(ctx);

    test::call_service(&app, request_code(EMAIL).to_request()).await;
    let resp = test::call_service(&app, request_code("  Alice@Example.COM ").to_request()).await;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[actix_web::test]
async fn test_submit_code_registers_identity_once() {
    let ctx = TestContext::new();
    let app = init_app!(ctx);

    test::call_service(&app, request_code(EMAIL).to_request()).await;
    ctx.clock.advance(Duration::seconds(30));

    let resp = test::call_service(&app, submit_code(EMAIL, "482913").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let verified: VerifiedResponse = test::read_body_json(resp).await;
    assert_eq!(verified.email, EMAIL);

    let identity = ctx
        .identities
        .find_by_email(&EmailAddress::parse(EMAIL).unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(identity.id.to_string(), verified.identity_id);
    assert_eq!(identity.display_name, "Alice");

    // The record was consumed, so a replay matches nothing
    let replay = test::call_service(&app, submit_code(EMAIL, "482913").to_request()).await;
    assert_eq!(replay.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = test::read_body_json(replay).await;
    assert_eq!(body["error"], "VERIFICATION_CODE_INVALID");
}

#[actix_web::test]
async fn test_wrong_code_is_invalid() {
    let ctx = TestContext::new();
    let app = init_app!(ctx);

    test::call_service(&app, request_code(EMAIL).to_request()).await;

    let resp = test::call_service(&app, submit_code(EMAIL, "000000").to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "VERIFICATION_CODE_INVALID");
    assert_eq!(ctx.identities.count().await, 0);
}

#[actix_web::test]
async fn test_expired_code_then_fresh_code() {
    let ctx = TestContext::new();
    let app = init_app!(ctx);

    test::call_service(&app, request_code(EMAIL).to_request()).await;
    ctx.clock.advance(Duration::seconds(310));

    let resp = test::call_service(&app, submit_code(EMAIL, "482913").to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "VERIFICATION_CODE_EXPIRED");

    // Rate-limit window has passed, so a new code is minted
    let resp = test::call_service(&app, request_code(EMAIL).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let dispatch: DispatchResponse = test::read_body_json(resp).await;
    assert_eq!(dispatch.status, "issued");
    assert_eq!(ctx.notifier.last_code_for(EMAIL).as_deref(), Some("731052"));

    ctx.clock.advance(Duration::seconds(1));
    let resp = test::call_service(&app, submit_code(EMAIL, "731052").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_retained_record_replay_is_conflict() {
    let ctx = TestContext::with_config(VerificationServiceConfig {
        retention: RecordRetention::Retain,
        ..Default::default()
    });
    let app = init_app!(ctx);

    test::call_service(&app, request_code(EMAIL).to_request()).await;

    let first = test::call_service(&app, submit_code(EMAIL, "482913").to_request()).await;
    assert_eq!(first.status(), StatusCode::OK);

    let replay = test::call_service(&app, submit_code(EMAIL, "482913").to_request()).await;
    assert_eq!(replay.status(), StatusCode::CONFLICT);
    let body: serde_json::Value = test::read_body_json(replay).await;
    assert_eq!(body["error"], "IDENTITY_EXISTS");
}

#[actix_web::test]
async fn test_delivery_failure_keeps_record() {
    let ctx = TestContext::new();
    ctx.notifier
        .fail_with(Some(NotifyError::Unavailable("provider down".to_string())));
    let app = init_app!(ctx);

    let resp = test::call_service(&app, request_code(EMAIL).to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "DELIVERY_FAILED");
    assert!(!body["message"].as_str().unwrap().contains("provider down"));

    // The minted record stays, so the window is enforced
    ctx.notifier.fail_with(None);
    let resp = test::call_service(&app, request_code(EMAIL).to_request()).await;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);

    // and the code that failed to send still verifies
    let resp = test::call_service(&app, submit_code(EMAIL, "482913").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_resend_without_record_issues() {
    let ctx = TestContext::new();
    let app = init_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/v1/verification/resend-code")
        .set_json(json!({ "email": EMAIL }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let dispatch: DispatchResponse = test::read_body_json(resp).await;
    assert_eq!(dispatch.status, "issued");
    assert_eq!(ctx.notifier.delivery_count(), 1);
}

#[actix_web::test]
async fn test_invalid_input_is_rejected() {
    let ctx = TestContext::new();
    let app = init_app!(ctx);

    let resp = test::call_service(&app, request_code("not-an-email").to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "EMAIL_INVALID");

    let resp = test::call_service(&app, request_code("").to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "VALIDATION_ERROR");

    // Code format is checked before any lookup
    let resp = test::call_service(&app, submit_code(EMAIL, "12ab56").to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "VALIDATION_ERROR");

    let malformed = test::TestRequest::post()
        .uri("/api/v1/verification/request-code")
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload("{\"email\":")
        .to_request();
    let resp = test::call_service(&app, malformed).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "VALIDATION_ERROR");

    assert_eq!(ctx.notifier.delivery_count(), 0);
}

#[actix_web::test]
async fn test_health_and_not_found() {
    let ctx = TestContext::new();
    let app = init_app!(ctx);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "healthy");
    assert!(body["version"].is_string());

    let resp =
        test::call_service(&app, test::TestRequest::get().uri("/api/v1/nope").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
