//! Router tests that never reach a live database.
//!
//! The state holds a disconnected `DatabaseConnection`, so any request that
//! passes authentication and the role guard surfaces as a transient failure.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header::AUTHORIZATION, header::CONTENT_TYPE},
};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use jsonwebtoken::{EncodingKey, Header, encode};
use mealcard_api::{AppState, create_router};
use mealcard_shared::config::{AnalyticsConfig, LedgerConfig};
use mealcard_shared::{Claims, JwtConfig, JwtService, Role};
use rstest::rstest;
use sea_orm::DatabaseConnection;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

const SECRET: &str = "router-test-secret";

fn jwt_service() -> JwtService {
    JwtService::new(JwtConfig {
        secret: SECRET.to_string(),
        token_expires_minutes: 15,
    })
}

fn app() -> Router {
    let state = AppState::new(
        DatabaseConnection::Disconnected,
        jwt_service(),
        LedgerConfig::default(),
        AnalyticsConfig::default(),
    );
    create_router(state)
}

fn token(role: Role) -> String {
    jwt_service().issue_token(Uuid::new_v4(), role).unwrap()
}

fn raw_token(role: &str, expires_in: Duration) -> String {
    let now = Utc::now();
    let claims = Claims {
        sub: Uuid::new_v4(),
        role: role.to_string(),
        iat: now.timestamp(),
        exp: (now + expires_in).timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

async fn send(method: &str, uri: &str, bearer: Option<&str>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    dispatch(request, bearer, Body::empty()).await
}

async fn send_json(uri: &str, bearer: &str, payload: &Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, "application/json");
    dispatch(request, Some(bearer), Body::from(payload.to_string())).await
}

async fn dispatch(
    mut builder: axum::http::request::Builder,
    bearer: Option<&str>,
    body: Body,
) -> (StatusCode, Value) {
    if let Some(token) = bearer {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let response = app().oneshot(builder.body(body).unwrap()).await.unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn test_health_is_public() {
    let (status, body) = send("GET", "/api/v1/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "mealcard");
}

#[tokio::test]
async fn test_readiness_reports_unreachable_database() {
    let (status, body) = send("GET", "/api/v1/health/ready", None).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["database"], "unreachable");
}

#[rstest]
#[case("GET", "/api/v1/menu")]
#[case("GET", "/api/v1/student/card")]
#[case("GET", "/api/v1/manager/analytics")]
#[case("GET", "/api/v1/admin/dashboard")]
#[tokio::test]
async fn test_missing_token_is_unauthorized(#[case] method: &str, #[case] uri: &str) {
    let (status, body) = send(method, uri, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "MISSING_TOKEN");
}

#[tokio::test]
async fn test_forged_token_is_unauthorized() {
    let (status, body) = send("GET", "/api/v1/menu", Some("not.a.token")).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "INVALID_TOKEN");
}

#[tokio::test]
async fn test_expired_token_is_unauthorized() {
    let expired = raw_token("student", Duration::hours(-2));
    let (status, body) = send("GET", "/api/v1/student/card", Some(&expired)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "TOKEN_EXPIRED");
}

#[rstest]
#[case(Role::Student, "GET", "/api/v1/manager/recharge-requests")]
#[case(Role::Student, "GET", "/api/v1/manager/analytics")]
#[case(Role::Cashier, "POST", "/api/v1/manager/recharge-requests/0192f1a0-0000-7000-8000-000000000000/approve")]
#[case(Role::Manager, "GET", "/api/v1/cashier/cards/CARD1")]
#[case(Role::Student, "GET", "/api/v1/cashier/cards/CARD1")]
#[case(Role::Manager, "GET", "/api/v1/student/card")]
#[case(Role::Cashier, "GET", "/api/v1/admin/dashboard")]
#[case(Role::Manager, "GET", "/api/v1/admin/menu")]
#[case(Role::Cashier, "POST", "/api/v1/admin/cards/bulk")]
#[tokio::test]
async fn test_wrong_role_is_forbidden(#[case] role: Role, #[case] method: &str, #[case] uri: &str) {
    let (status, body) = send(method, uri, Some(&token(role))).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "FORBIDDEN");
}

#[tokio::test]
async fn test_unknown_role_is_invalid_input() {
    let token = raw_token("owner", Duration::minutes(5));
    let (status, body) = send("GET", "/api/v1/student/card", Some(&token)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
}

#[rstest]
#[case(Role::Cashier, "/api/v1/cashier/cards/CARD1")]
#[case(Role::Admin, "/api/v1/cashier/cards/CARD1")]
#[case(Role::Manager, "/api/v1/manager/recharge-requests")]
#[case(Role::Student, "/api/v1/menu")]
#[tokio::test]
async fn test_unreachable_store_is_retryable(#[case] role: Role, #[case] uri: &str) {
    let (status, body) = send("GET", uri, Some(&token(role))).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["retryable"], true);
}

#[tokio::test]
async fn test_unknown_status_filter_is_rejected_before_store_access() {
    let (status, body) = send(
        "GET",
        "/api/v1/manager/recharge-requests?status=cancelled",
        Some(&token(Role::Manager)),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_half_open_analytics_query_is_rejected() {
    let (status, _) = send(
        "GET",
        "/api/v1/manager/analytics?from=2026-10-01T00:00:00Z",
        Some(&token(Role::Manager)),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_inverted_analytics_window_is_rejected() {
    let (status, body) = send(
        "GET",
        "/api/v1/manager/analytics?from=2026-10-02T00:00:00Z&to=2026-10-01T00:00:00Z",
        Some(&token(Role::Manager)),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_WINDOW");
}

#[tokio::test]
async fn test_empty_bulk_provisioning_is_rejected() {
    let (status, body) = send_json(
        "/api/v1/admin/cards/bulk",
        &token(Role::Admin),
        &json!({ "student_ids": [] }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_bulk_provisioning_reports_each_failure() {
    let students = [Uuid::now_v7(), Uuid::now_v7()];
    let (status, body) = send_json(
        "/api/v1/admin/cards/bulk",
        &token(Role::Admin),
        &json!({ "student_ids": students }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"].as_array().unwrap().len(), 0);
    let errors = body["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 2);
    for (error, student) in errors.iter().zip(students) {
        assert_eq!(error["student_id"], student.to_string());
        assert_eq!(error["error"], "STORE_UNAVAILABLE");
    }
}
