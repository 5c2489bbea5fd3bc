//! Route definitions for the `/bids` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::bids;
use crate::state::AppState;

/// Routes mounted at `/bids`. Every handler requires the admin role.
///
/// ```text
/// GET    /              -> list (?status=&q=&sort=client&dir=asc|desc)
/// POST   /              -> create
/// GET    /options       -> options
/// GET    /{id}          -> get_by_id
/// PUT    /{id}          -> update
/// DELETE /{id}          -> delete
/// GET    /{id}/audit    -> audit_history
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(bids::list).post(bids::create))
        .route("/options", get(bids::options))
        .route(
            "/{id}",
            get(bids::get_by_id).put(bids::update).delete(bids::delete),
        )
        .route("/{id}/audit", get(bids::audit_history))
}
