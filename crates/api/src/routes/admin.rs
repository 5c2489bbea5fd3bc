//! Route definitions for bid administration under `/admin/bids`.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::handlers::bid_admin;
use crate::state::AppState;

/// Routes mounted at `/admin/bids`. Every handler requires the admin role.
///
/// ```text
/// POST   /import          -> import_csv (text/csv body, size-limited)
/// GET    /export          -> export_bids
/// GET    /export-audit    -> export_audit
/// POST   /reset           -> reset
/// ```
pub fn router(max_import_bytes: usize) -> Router<AppState> {
    Router::new()
        .route(
            "/import",
            post(bid_admin::import_csv).layer(DefaultBodyLimit::max(max_import_bytes)),
        )
        .route("/export", get(bid_admin::export_bids))
        .route("/export-audit", get(bid_admin::export_audit))
        .route("/reset", post(bid_admin::reset))
}
