//! Integration tests for booking HTTP endpoints.
//!
//! Drives the full API router with in-memory stores, a fixed clock and a
//! mock token validator.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use boxercise::adapters::auth::MockSessionValidator;
use boxercise::adapters::http::{api_router, BookingAppState, MembershipAppState, PaymentAppState};
use boxercise::adapters::memory::{
    InMemoryBookingStore, InMemoryMembershipStore, InMemoryOrderStore, InMemoryPurchaseStore,
};
use boxercise::adapters::razorpay::MockPaymentGateway;
use boxercise::adapters::FixedClock;
use boxercise::domain::booking::BookingPolicy;
use boxercise::domain::foundation::Timestamp;
use boxercise::domain::membership::PlanCatalog;
use boxercise::domain::payment::{Currency, SignatureVerifier};

// =============================================================================
// Test Infrastructure
// =============================================================================

const MEMBER: &str = "member-token";
const OTHER: &str = "other-token";

fn at(s: &str) -> Timestamp {
    Timestamp::parse_rfc3339("at", s).unwrap()
}

struct TestApp {
    router: Router,
    clock: Arc<FixedClock>,
}

fn test_app() -> TestApp {
    let clock = Arc::new(FixedClock::new(at("2025-06-01T06:00:00Z")));
    let memberships = Arc::new(InMemoryMembershipStore::new());

    let booking = BookingAppState {
        repository: Arc::new(InMemoryBookingStore::new()),
        clock: clock.clone(),
        policy: BookingPolicy::default(),
    };
    let payment = PaymentAppState {
        gateway: Arc::new(MockPaymentGateway::new()),
        orders: Arc::new(InMemoryOrderStore::new()),
        purchases: Arc::new(InMemoryPurchaseStore::new()),
        memberships: memberships.clone(),
        catalog: Arc::new(PlanCatalog::standard()),
        clock: clock.clone(),
        checkout_verifier: SignatureVerifier::new("key_secret"),
        webhook_verifier: SignatureVerifier::new("webhook_secret"),
        default_currency: Currency::new("INR").unwrap(),
        expose_signature_debug: false,
    };
    let membership = MembershipAppState {
        memberships,
        clock: clock.clone(),
    };
    let auth = Arc::new(
        MockSessionValidator::new()
            .with_test_user(MEMBER, "member-1")
            .with_test_user(OTHER, "member-2"),
    );

    TestApp {
        router: api_router(booking, payment, membership, auth),
        clock,
    }
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn post_json(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

fn booking_body(trainer: &str, session_at: &str) -> Value {
    json!({
        "category": "boxing_fitness",
        "planId": "lite",
        "trainerId": trainer,
        "sessionAt": session_at,
    })
}

async fn book(app: &TestApp, token: &str, trainer: &str, session_at: &str) -> (StatusCode, Value) {
    send(
        &app.router,
        post_json("/bookings", Some(token), booking_body(trainer, session_at)),
    )
    .await
}

// =============================================================================
// Propose
// =============================================================================

#[tokio::test]
async fn propose_creates_an_upcoming_booking() {
    let app = test_app();

    let (status, body) = book(&app, MEMBER, "trainer-1", "2025-06-02T10:00:00Z").await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "upcoming");
    assert_eq!(body["userId"], "member-1");
    assert_eq!(body["trainerId"], "trainer-1");
    assert_eq!(body["category"], "boxing_fitness");
}

#[tokio::test]
async fn propose_truncates_session_time_to_the_minute() {
    let app = test_app();

    let (status, body) = book(&app, MEMBER, "trainer-1", "2025-06-02T10:00:42Z").await;

    assert_eq!(status, StatusCode::CREATED);
    let session_at = body["sessionAt"].as_str().unwrap();
    assert_eq!(at(session_at), at("2025-06-02T10:00:00Z"));
}

#[tokio::test]
async fn propose_inside_lead_time_is_rejected() {
    let app = test_app();

    let (status, body) = book(&app, MEMBER, "trainer-1", "2025-06-01T09:00:00Z").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["ok"], false);
    assert_eq!(body["code"], "LEAD_TIME");
}

#[tokio::test]
async fn propose_exactly_at_lead_time_is_accepted() {
    let app = test_app();

    let (status, _) = book(&app, MEMBER, "trainer-1", "2025-06-01T14:00:00Z").await;

    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn second_booking_inside_conflict_window_is_rejected() {
    let app = test_app();
    book(&app, MEMBER, "trainer-1", "2025-06-02T10:00:00Z").await;

    let (status, body) = book(&app, OTHER, "trainer-1", "2025-06-02T10:30:00Z").await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "SLOT_TAKEN");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn simultaneous_proposals_create_one_booking() {
    let app = test_app();

    let (first, second) = tokio::join!(
        book(&app, MEMBER, "trainer-1", "2025-06-02T10:00:00Z"),
        book(&app, OTHER, "trainer-1", "2025-06-02T10:10:00Z"),
    );

    let mut statuses = [first.0, second.0];
    statuses.sort_by_key(|s| s.as_u16());
    assert_eq!(statuses, [StatusCode::CREATED, StatusCode::CONFLICT]);
}

#[tokio::test]
async fn booking_one_window_apart_is_accepted() {
    let app = test_app();
    book(&app, MEMBER, "trainer-1", "2025-06-02T10:00:00Z").await;

    let (status, _) = book(&app, OTHER, "trainer-1", "2025-06-02T10:45:00Z").await;

    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn other_trainers_do_not_conflict() {
    let app = test_app();
    book(&app, MEMBER, "trainer-1", "2025-06-02T10:00:00Z").await;

    let (status, _) = book(&app, MEMBER, "trainer-2", "2025-06-02T10:00:00Z").await;

    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn cancelled_booking_frees_the_slot() {
    let app = test_app();
    let (_, created) = book(&app, MEMBER, "trainer-1", "2025-06-02T10:00:00Z").await;
    let id = created["id"].as_str().unwrap();
    send(
        &app.router,
        post_json(&format!("/bookings/{}/cancel", id), Some(MEMBER), json!({})),
    )
    .await;

    let (status, _) = book(&app, OTHER, "trainer-1", "2025-06-02T10:00:00Z").await;

    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn missing_field_is_a_validation_error() {
    let app = test_app();
    let body = json!({
        "category": "boxing_fitness",
        "planId": "lite",
        "sessionAt": "2025-06-02T10:00:00Z",
    });

    let (status, body) = send(&app.router, post_json("/bookings", Some(MEMBER), body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_FAILED");
}

#[tokio::test]
async fn unknown_category_is_a_validation_error() {
    let app = test_app();
    let mut body = booking_body("trainer-1", "2025-06-02T10:00:00Z");
    body["category"] = json!("underwater_basket_weaving");

    let (status, _) = send(&app.router, post_json("/bookings", Some(MEMBER), body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let app = test_app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/bookings")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {}", MEMBER))
        .body(Body::from("{not json"))
        .unwrap();

    let (status, body) = send(&app.router, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["ok"], false);
}

#[tokio::test]
async fn propose_without_token_is_unauthorized() {
    let app = test_app();

    let (status, _) = send(
        &app.router,
        post_json("/bookings", None, booking_body("trainer-1", "2025-06-02T10:00:00Z")),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn propose_with_unknown_token_is_unauthorized() {
    let app = test_app();

    let (status, _) = book(&app, "forged", "trainer-1", "2025-06-02T10:00:00Z").await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// =============================================================================
// List
// =============================================================================

#[tokio::test]
async fn list_returns_only_the_callers_bookings() {
    let app = test_app();
    book(&app, MEMBER, "trainer-1", "2025-06-03T10:00:00Z").await;
    book(&app, MEMBER, "trainer-2", "2025-06-02T10:00:00Z").await;
    book(&app, OTHER, "trainer-3", "2025-06-02T12:00:00Z").await;

    let (status, body) = send(&app.router, get("/bookings", MEMBER)).await;

    assert_eq!(status, StatusCode::OK);
    let bookings = body["bookings"].as_array().unwrap();
    assert_eq!(bookings.len(), 2);
    assert!(bookings.iter().all(|b| b["userId"] == "member-1"));
}

// =============================================================================
// Cancel
// =============================================================================

#[tokio::test]
async fn cancel_with_notice_is_penalty_free() {
    let app = test_app();
    let (_, created) = book(&app, MEMBER, "trainer-1", "2025-06-02T10:00:00Z").await;
    let id = created["id"].as_str().unwrap();

    let (status, body) = send(
        &app.router,
        post_json(&format!("/bookings/{}/cancel", id), Some(MEMBER), json!({})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "cancelled");
    assert_eq!(body["booking"]["status"], "cancelled");
}

#[tokio::test]
async fn late_cancel_consumes_the_session() {
    let app = test_app();
    let (_, created) = book(&app, MEMBER, "trainer-1", "2025-06-02T10:00:00Z").await;
    let id = created["id"].as_str().unwrap();
    app.clock.set(at("2025-06-02T04:00:00Z"));

    let (status, body) = send(
        &app.router,
        post_json(&format!("/bookings/{}/cancel", id), Some(MEMBER), json!({})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "used");
    assert_eq!(body["booking"]["status"], "used");
}

#[tokio::test]
async fn second_cancel_reports_already_finalized() {
    let app = test_app();
    let (_, created) = book(&app, MEMBER, "trainer-1", "2025-06-02T10:00:00Z").await;
    let uri = format!("/bookings/{}/cancel", created["id"].as_str().unwrap());
    send(&app.router, post_json(&uri, Some(MEMBER), json!({}))).await;

    let (status, body) = send(&app.router, post_json(&uri, Some(MEMBER), json!({}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "already_finalized");
    assert_eq!(body["booking"]["status"], "cancelled");
}

#[tokio::test]
async fn cancelling_someone_elses_booking_is_not_found() {
    let app = test_app();
    let (_, created) = book(&app, MEMBER, "trainer-1", "2025-06-02T10:00:00Z").await;
    let uri = format!("/bookings/{}/cancel", created["id"].as_str().unwrap());

    let (status, _) = send(&app.router, post_json(&uri, Some(OTHER), json!({}))).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn cancelling_an_unparseable_id_is_not_found() {
    let app = test_app();

    let (status, _) = send(
        &app.router,
        post_json("/bookings/not-a-uuid/cancel", Some(MEMBER), json!({})),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn health_is_open() {
    let app = test_app();
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(&app.router, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}
