//! Bid entity model and listing/query types.

use bidtrack_core::audit::FieldChange;
use bidtrack_core::bid::{BidStage, BidStatus, OpportunityType, TcvTermBasis};
use bidtrack_core::bid_fields::BidFields;
use bidtrack_core::error::CoreError;
use bidtrack_core::types::{Date, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A row from the `bids` table. Enumerations are stored as their snake_case
/// value; use [`Bid::to_fields`] for the typed view.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Bid {
    pub id: DbId,
    pub client_name: String,
    pub bid_name: String,
    pub status: String,
    pub opportunity_type: String,
    pub current_stage: Option<String>,
    pub next_stage_date: Option<Date>,
    pub psq_received_at: Option<Date>,
    pub psq_clarification_deadline_at: Option<Date>,
    pub psq_submission_deadline_at: Option<Date>,
    pub psq_submission_time: Option<String>,
    pub itt_received_at: Option<Date>,
    pub itt_clarification_deadline_at: Option<Date>,
    pub itt_submission_deadline_at: Option<Date>,
    pub itt_submission_time: Option<String>,
    pub tcv_gbp: Option<i64>,
    pub initial_term_months: Option<i32>,
    pub extension_term_months: Option<i32>,
    pub tcv_term_basis: Option<String>,
    pub annual_value_gbp: Option<i64>,
    pub portal_url: Option<String>,
    pub folder_url: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Bid {
    /// Typed field set for diffing and export.
    ///
    /// A stored enumeration value this build does not know is an
    /// [`CoreError::Internal`], never a validation failure of the caller.
    pub fn to_fields(&self) -> Result<BidFields, CoreError> {
        Ok(BidFields {
            client_name: self.client_name.clone(),
            bid_name: self.bid_name.clone(),
            status: self.stored("status", BidStatus::from_str_db(&self.status))?,
            opportunity_type: self.stored(
                "opportunity_type",
                OpportunityType::from_str_db(&self.opportunity_type),
            )?,
            current_stage: self
                .current_stage
                .as_deref()
                .map(|s| self.stored("current_stage", BidStage::from_str_db(s)))
                .transpose()?,
            next_stage_date: self.next_stage_date,
            psq_received_at: self.psq_received_at,
            psq_clarification_deadline_at: self.psq_clarification_deadline_at,
            psq_submission_deadline_at: self.psq_submission_deadline_at,
            psq_submission_time: self.psq_submission_time.clone(),
            itt_received_at: self.itt_received_at,
            itt_clarification_deadline_at: self.itt_clarification_deadline_at,
            itt_submission_deadline_at: self.itt_submission_deadline_at,
            itt_submission_time: self.itt_submission_time.clone(),
            tcv_gbp: self.tcv_gbp,
            initial_term_months: self.initial_term_months,
            extension_term_months: self.extension_term_months,
            tcv_term_basis: self
                .tcv_term_basis
                .as_deref()
                .map(|s| self.stored("tcv_term_basis", TcvTermBasis::from_str_db(s)))
                .transpose()?,
            annual_value_gbp: self.annual_value_gbp,
            portal_url: self.portal_url.clone(),
            folder_url: self.folder_url.clone(),
        })
    }

    fn stored<T>(&self, column: &str, parsed: Result<T, CoreError>) -> Result<T, CoreError> {
        parsed.map_err(|e| {
            CoreError::Internal(format!("bid {} has unreadable {column}: {e}", self.id))
        })
    }
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

/// Raw query-string parameters for the bid list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BidListQuery {
    /// Exact status value; unknown values are ignored.
    pub status: Option<String>,
    /// Case-insensitive substring of the client name.
    pub q: Option<String>,
    /// `client` sorts by client name; anything else sorts by creation time.
    pub sort: Option<String>,
    /// `asc` or `desc` (default) for the client sort.
    pub dir: Option<String>,
}

/// Ordering of the bid list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BidSort {
    /// Newest first.
    #[default]
    Newest,
    ClientAsc,
    ClientDesc,
}

impl BidSort {
    /// SQL `ORDER BY` body. Ties always fall back to newest first.
    pub fn order_by(self) -> &'static str {
        match self {
            Self::Newest => "created_at DESC, id DESC",
            Self::ClientAsc => "client_name ASC, created_at DESC, id DESC",
            Self::ClientDesc => "client_name DESC, created_at DESC, id DESC",
        }
    }
}

/// Validated list filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BidFilter {
    pub status: Option<BidStatus>,
    pub client_query: Option<String>,
    pub sort: BidSort,
}

impl From<&BidListQuery> for BidFilter {
    fn from(query: &BidListQuery) -> Self {
        let status = query
            .status
            .as_deref()
            .and_then(|s| BidStatus::from_str_db(s).ok());
        let client_query = query
            .q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_string);
        let sort = match (query.sort.as_deref(), query.dir.as_deref()) {
            (Some("client"), Some("asc")) => BidSort::ClientAsc,
            (Some("client"), _) => BidSort::ClientDesc,
            _ => BidSort::Newest,
        };

        Self {
            status,
            client_query,
            sort,
        }
    }
}

// ---------------------------------------------------------------------------
// Mutation results
// ---------------------------------------------------------------------------

/// Result of an audited update.
#[derive(Debug, Clone, Serialize)]
pub struct BidUpdate {
    /// The bid as stored after the call.
    pub bid: Bid,
    /// Recorded changes. Empty means nothing was written.
    pub changes: Vec<FieldChange>,
    /// Audit event id, when one was written.
    pub audit_event_id: Option<DbId>,
}

/// Rows removed by a full reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResetCounts {
    pub bids_deleted: u64,
    pub audit_events_deleted: u64,
}
