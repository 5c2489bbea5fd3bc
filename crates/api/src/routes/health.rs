use axum::extract::State;
use axum::http::StatusCode;
use axum::{routing::get, Json, Router};
use bidtrack_db::SchemaStatus;
use serde::Serialize;

use crate::state::AppState;

/// Body of `GET /health`.
#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok` when the bid schema is reachable and fully migrated.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// Absent when the bid tables could not be read.
    pub schema: Option<SchemaStatus>,
}

/// GET /health
///
/// Answers 503 unless the bid and audit tables are readable and no shipped
/// migration is pending.
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let schema = match bidtrack_db::schema_status(&state.pool).await {
        Ok(schema) => Some(schema),
        Err(e) => {
            tracing::warn!(error = %e, "Bid schema unavailable");
            None
        }
    };

    let db_healthy = match schema {
        Some(_) => true,
        None => bidtrack_db::health_check(&state.pool).await.is_ok(),
    };

    let (code, status) = match &schema {
        Some(s) if s.is_current() => (StatusCode::OK, "ok"),
        _ => (StatusCode::SERVICE_UNAVAILABLE, "degraded"),
    };

    (
        code,
        Json(HealthResponse {
            status,
            version: env!("CARGO_PKG_VERSION"),
            db_healthy,
            schema,
        }),
    )
}

/// Mounted at the root, outside `/api/v1`, and needs no token.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
