#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use bidtrack_api::auth::jwt::{generate_access_token, JwtConfig};
use bidtrack_api::config::ServerConfig;
use bidtrack_api::router::build_app_router;
use bidtrack_api::state::AppState;
use bidtrack_core::roles::{ROLE_ADMIN, ROLE_USER};

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const USER_EMAIL: &str = "user@example.com";

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default),
/// a 30-second request timeout and a small import limit so oversized bodies
/// are cheap to produce.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        max_import_bytes: 64 * 1024,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 15,
        },
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool.
///
/// Goes through [`build_app_router`] so integration tests exercise the same
/// middleware stack (CORS, request ID, timeout, tracing, panic recovery)
/// that production uses.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

pub fn admin_token() -> String {
    generate_access_token(1, ADMIN_EMAIL, ROLE_ADMIN, &test_config().jwt).unwrap()
}

pub fn user_token() -> String {
    generate_access_token(2, USER_EMAIL, ROLE_USER, &test_config().jwt).unwrap()
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    content_type: Option<&str>,
    body: Body,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    if let Some(content_type) = content_type {
        builder = builder.header("content-type", content_type);
    }
    app.oneshot(builder.body(body).unwrap()).await.unwrap()
}

/// Unauthenticated GET.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None, Body::empty()).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None, Body::empty()).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(
        app,
        Method::POST,
        uri,
        Some(token),
        Some("application/json"),
        Body::from(body.to_string()),
    )
    .await
}

/// POST a raw body labelled as JSON, for bodies `serde_json` cannot build.
pub async fn post_raw_json_auth(app: Router, uri: &str, body: &str, token: &str) -> Response<Body> {
    send(
        app,
        Method::POST,
        uri,
        Some(token),
        Some("application/json"),
        Body::from(body.to_string()),
    )
    .await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(
        app,
        Method::PUT,
        uri,
        Some(token),
        Some("application/json"),
        Body::from(body.to_string()),
    )
    .await
}

pub async fn post_text_auth(app: Router, uri: &str, body: String, token: &str) -> Response<Body> {
    post_bytes_auth(app, uri, body.into_bytes(), token).await
}

/// POST a `text/csv` body that need not be valid UTF-8.
pub async fn post_bytes_auth(app: Router, uri: &str, body: Vec<u8>, token: &str) -> Response<Body> {
    send(
        app,
        Method::POST,
        uri,
        Some(token),
        Some("text/csv"),
        Body::from(body),
    )
    .await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None, Body::empty()).await
}

/// Collect the response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Collect the response body as UTF-8 text.
pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A valid single-tender create/update body.
pub fn bid_body(client: &str) -> serde_json::Value {
    serde_json::json!({
        "client_name": client,
        "bid_name": "Facilities management",
        "status": "pending",
        "opportunity_type": "single_tender",
        "itt_submission_deadline_at": "2026-04-15",
        "itt_submission_time": "12:00",
        "tcv_gbp": 1_200_000,
        "initial_term_months": "36",
        "extension_term_months": 12,
        "tcv_term_basis": "initial_only",
        "folder_url": "https://drive.example.com/bids/acme",
    })
}

/// Create a bid through the API as the admin and return its id.
pub async fn create_bid(app: Router, client: &str) -> i64 {
    let response = post_json_auth(app, "/api/v1/bids", bid_body(client), &admin_token()).await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}
