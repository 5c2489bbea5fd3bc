//! Handlers for the `/bids` resource.
//!
//! Create and update bodies are normalized into [`BidFields`] before any
//! other work. Updates and deletes are audited inside the repository
//! transaction, attributed to the authenticated admin's email. Every route
//! here requires the `admin` role.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use bidtrack_core::audit::FieldChange;
use bidtrack_core::bid::{
    format_currency_gbp, BidStage, BidStatus, OpportunityType, TcvTermBasis,
};
use bidtrack_core::bid_fields::BidFields;
use bidtrack_core::bid_input::BidInput;
use bidtrack_core::error::CoreError;
use bidtrack_core::types::DbId;
use bidtrack_db::models::audit::AuditEventWithChanges;
use bidtrack_db::models::bid::{Bid, BidFilter, BidListQuery};
use bidtrack_db::repositories::{AuditRepo, BidRepo};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::extract::JsonBody;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// A stored bid plus display labels for its enumerations and amounts.
#[derive(Debug, Serialize)]
pub struct BidView {
    #[serde(flatten)]
    pub bid: Bid,
    pub status_label: &'static str,
    pub opportunity_type_label: &'static str,
    pub current_stage_label: Option<&'static str>,
    pub tcv_term_basis_label: Option<&'static str>,
    /// e.g. `"£1,200,000"`, or `"—"` when absent.
    pub tcv_display: String,
    pub annual_value_display: String,
}

impl BidView {
    fn from_bid(bid: Bid) -> Result<Self, CoreError> {
        let fields = bid.to_fields()?;
        Ok(Self {
            status_label: fields.status.label(),
            opportunity_type_label: fields.opportunity_type.label(),
            current_stage_label: fields.current_stage.map(BidStage::label),
            tcv_term_basis_label: fields.tcv_term_basis.map(TcvTermBasis::label),
            tcv_display: format_currency_gbp(fields.tcv_gbp),
            annual_value_display: format_currency_gbp(fields.annual_value_gbp),
            bid,
        })
    }
}

/// Result of `PUT /bids/{id}`.
#[derive(Debug, Serialize)]
pub struct UpdateBidResponse {
    pub bid: BidView,
    /// Number of recorded field changes. Zero means nothing was written.
    pub changed: usize,
    pub changes: Vec<FieldChange>,
    pub audit_event_id: Option<DbId>,
}

/// One selectable value of an enumeration.
#[derive(Debug, Serialize)]
pub struct OptionItem {
    pub value: &'static str,
    pub label: &'static str,
}

/// Every enumeration a bid form needs.
#[derive(Debug, Serialize)]
pub struct BidOptions {
    pub statuses: Vec<OptionItem>,
    pub opportunity_types: Vec<OptionItem>,
    /// Opportunity types that require a current stage.
    pub two_stage_opportunity_types: Vec<&'static str>,
    pub stages: Vec<OptionItem>,
    pub tcv_term_bases: Vec<OptionItem>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/bids
pub async fn list(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<BidListQuery>,
) -> AppResult<Json<DataResponse<Vec<BidView>>>> {
    let filter = BidFilter::from(&params);
    let bids = BidRepo::list(&state.pool, &filter).await?;
    let views = bids
        .into_iter()
        .map(BidView::from_bid)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(DataResponse { data: views }))
}

/// POST /api/v1/bids
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    JsonBody(input): JsonBody<BidInput>,
) -> AppResult<(StatusCode, Json<DataResponse<BidView>>)> {
    let fields = input.normalize()?;
    let bid = BidRepo::create(&state.pool, &fields).await?;
    tracing::info!(bid_id = bid.id, actor = %admin.email, "Bid created");
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: BidView::from_bid(bid)?,
        }),
    ))
}

/// GET /api/v1/bids/{id}
pub async fn get_by_id(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<BidView>>> {
    let bid = BidRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| bid_not_found(id))?;
    Ok(Json(DataResponse {
        data: BidView::from_bid(bid)?,
    }))
}

/// PUT /api/v1/bids/{id}
///
/// Replaces every field of the bid. Only differing fields are recorded;
/// an identical submission is answered with `changed: 0` and writes nothing.
pub async fn update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    JsonBody(input): JsonBody<BidInput>,
) -> AppResult<Json<DataResponse<UpdateBidResponse>>> {
    let fields: BidFields = input.normalize()?;
    let outcome = BidRepo::update_with_audit(&state.pool, id, &fields, &admin.email)
        .await?
        .ok_or_else(|| bid_not_found(id))?;

    Ok(Json(DataResponse {
        data: UpdateBidResponse {
            changed: outcome.changes.len(),
            changes: outcome.changes,
            audit_event_id: outcome.audit_event_id,
            bid: BidView::from_bid(outcome.bid)?,
        },
    }))
}

/// DELETE /api/v1/bids/{id}
pub async fn delete(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    BidRepo::delete_with_audit(&state.pool, id, &admin.email)
        .await?
        .ok_or_else(|| bid_not_found(id))?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/bids/{id}/audit
///
/// History stays readable after the bid itself has been deleted. An id that
/// never existed yields an empty list.
pub async fn audit_history(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<AuditEventWithChanges>>>> {
    let events = AuditRepo::list_for_bid(&state.pool, id).await?;
    Ok(Json(DataResponse { data: events }))
}

/// GET /api/v1/bids/options
pub async fn options(_admin: RequireAdmin) -> Json<DataResponse<BidOptions>> {
    Json(DataResponse {
        data: BidOptions {
            statuses: BidStatus::ALL
                .iter()
                .map(|s| OptionItem {
                    value: s.as_str(),
                    label: s.label(),
                })
                .collect(),
            opportunity_types: OpportunityType::ALL
                .iter()
                .map(|o| OptionItem {
                    value: o.as_str(),
                    label: o.label(),
                })
                .collect(),
            two_stage_opportunity_types: OpportunityType::ALL
                .iter()
                .filter(|o| o.is_two_stage())
                .map(|o| o.as_str())
                .collect(),
            stages: BidStage::ALL
                .iter()
                .map(|s| OptionItem {
                    value: s.as_str(),
                    label: s.label(),
                })
                .collect(),
            tcv_term_bases: TcvTermBasis::ALL
                .iter()
                .map(|b| OptionItem {
                    value: b.as_str(),
                    label: b.label(),
                })
                .collect(),
        },
    })
}

fn bid_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Bid", id })
}
