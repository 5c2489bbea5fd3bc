//! Bulk administration of bids: CSV import, CSV exports and full reset.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use bidtrack_core::error::CoreError;
use bidtrack_core::export::{
    render_audit_export, render_bid_export, ExportBid, AUDIT_EXPORT_FILENAME,
    BID_EXPORT_FILENAME, CSV_CONTENT_TYPE,
};
use bidtrack_core::import::plan_import;
use bidtrack_db::models::audit::AuditEventWithChanges;
use bidtrack_db::models::bid::{Bid, ResetCounts};
use bidtrack_db::repositories::{AuditRepo, BidRepo};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::extract::JsonBody;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Phrase that must be submitted verbatim to reset all bid data.
pub const RESET_CONFIRMATION: &str = "DELETE ALL BIDS";

/// Result of a CSV import.
#[derive(Debug, Serialize)]
pub struct ImportResult {
    pub inserted: u64,
    pub skipped: usize,
}

/// Body of `POST /admin/bids/reset`.
#[derive(Debug, Deserialize)]
pub struct ResetRequest {
    #[serde(default)]
    pub confirm: String,
}

/// POST /api/v1/admin/bids/import
///
/// The request body is the CSV document itself, decoded as UTF-8 with
/// invalid sequences replaced. Rows that fail validation are counted as
/// skipped; a missing header rejects the whole file.
pub async fn import_csv(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<DataResponse<ImportResult>>> {
    let plan = plan_import(&String::from_utf8_lossy(&body))?;
    let inserted = BidRepo::bulk_insert(&state.pool, &plan.rows).await?;

    tracing::info!(
        inserted,
        skipped = plan.skipped,
        actor = %admin.email,
        "Bid import finished"
    );

    Ok(Json(DataResponse {
        data: ImportResult {
            inserted,
            skipped: plan.skipped,
        },
    }))
}

/// GET /api/v1/admin/bids/export
pub async fn export_bids(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let bids = BidRepo::list_all(&state.pool).await?;
    let fields = bids
        .iter()
        .map(Bid::to_fields)
        .collect::<Result<Vec<_>, _>>()?;

    let csv = render_bid_export(bids.iter().zip(&fields).map(|(bid, fields)| ExportBid {
        id: bid.id,
        fields,
        created_at: bid.created_at,
        updated_at: bid.updated_at,
    }));

    Ok(csv_attachment(BID_EXPORT_FILENAME, csv))
}

/// GET /api/v1/admin/bids/export-audit
pub async fn export_audit(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let events = AuditRepo::list_all(&state.pool).await?;
    let rows: Vec<_> = events.iter().map(AuditEventWithChanges::as_export).collect();
    let csv = render_audit_export(rows.iter());

    Ok(csv_attachment(AUDIT_EXPORT_FILENAME, csv))
}

/// POST /api/v1/admin/bids/reset
///
/// Deletes every audit event and every bid. Refused unless the body carries
/// the exact [`RESET_CONFIRMATION`] phrase.
pub async fn reset(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    JsonBody(request): JsonBody<ResetRequest>,
) -> AppResult<Json<DataResponse<ResetCounts>>> {
    if request.confirm != RESET_CONFIRMATION {
        return Err(CoreError::Validation(format!(
            "Type \"{RESET_CONFIRMATION}\" to confirm."
        ))
        .into());
    }

    let counts = BidRepo::reset_all(&state.pool).await?;
    tracing::warn!(actor = %admin.email, "Bid data reset by admin");

    Ok(Json(DataResponse { data: counts }))
}

fn csv_attachment(filename: &str, body: String) -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, CSV_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
}
