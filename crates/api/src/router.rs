//! The full HTTP application: routes plus the middleware every request
//! passes through. `main.rs` and the integration tests both build it here.

use std::time::Duration;

use axum::http::header::{AUTHORIZATION, CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::{HeaderName, HeaderValue, Method, StatusCode};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::ServerConfig;
use crate::routes;
use crate::state::AppState;

const REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Methods used by the bid and admin routes.
const BID_METHODS: [Method; 4] = [Method::GET, Method::POST, Method::PUT, Method::DELETE];

/// Build the application [`Router`].
///
/// Requests pass, outermost first: CORS, request id assignment, tracing,
/// request id echo, timeout, panic recovery. `/health` sits beside
/// `/api/v1` so probes need no token.
pub fn build_app_router(state: AppState, config: &ServerConfig) -> Router {
    let stack = ServiceBuilder::new()
        .layer(build_cors_layer(config))
        .map_response(|res: axum::response::Response<_>| res.map(axum::body::Body::new))
        .layer(SetRequestIdLayer::new(REQUEST_ID, MakeRequestUuid))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(PropagateRequestIdLayer::new(REQUEST_ID))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.request_timeout_secs),
        ))
        .layer(CatchPanicLayer::new());

    routes::health::router()
        .nest("/api/v1", routes::api_routes(config))
        .layer(stack)
        .with_state(state)
}

/// CORS for the bid UI origins.
///
/// Browsers may read `Content-Disposition`, so CSV exports download under
/// their generated filename, and `x-request-id`. An unparsable origin
/// panics at startup.
fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin)
                .unwrap_or_else(|e| panic!("Invalid CORS origin '{origin}': {e}"))
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(BID_METHODS)
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .expose_headers([CONTENT_DISPOSITION, REQUEST_ID])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}
