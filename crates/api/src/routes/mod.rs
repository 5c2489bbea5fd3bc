pub mod admin;
pub mod bids;
pub mod health;

use axum::Router;

use crate::config::ServerConfig;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Every route requires the admin role.
///
/// ```text
/// /bids                          list, create
/// /bids/options                  enumeration values and labels
/// /bids/{id}                     get, update, delete
/// /bids/{id}/audit               audit history
///
/// /admin/bids/import             CSV import
/// /admin/bids/export             bid CSV export
/// /admin/bids/export-audit       audit CSV export
/// /admin/bids/reset              delete all bids and audit data
/// ```
pub fn api_routes(config: &ServerConfig) -> Router<AppState> {
    Router::new()
        .nest("/bids", bids::router())
        .nest("/admin/bids", admin::router(config.max_import_bytes))
}
