//! The normalized field set of a bid.
//!
//! [`BidFields`] is what every write path produces after validation and what
//! the audit diff and the CSV export read. Identity and timestamps belong to
//! the persistence layer and are not part of it.

use serde::Serialize;

use crate::bid::{BidStage, BidStatus, OpportunityType, TcvTermBasis};
use crate::types::Date;

/// A validated, stage-normalized bid.
///
/// Invariant: when `opportunity_type` is not two-stage, `current_stage`,
/// `next_stage_date` and every `psq_*` field are `None`.
///
/// The commercial fields are optional because bulk-imported rows may omit
/// them. Manual create/update always fills `tcv_gbp`, `initial_term_months`,
/// `tcv_term_basis` and `annual_value_gbp`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BidFields {
    pub client_name: String,
    pub bid_name: String,
    pub status: BidStatus,
    pub opportunity_type: OpportunityType,
    pub current_stage: Option<BidStage>,
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
    pub tcv_term_basis: Option<TcvTermBasis>,
    pub annual_value_gbp: Option<i64>,
    pub portal_url: Option<String>,
    pub folder_url: String,
}

impl BidFields {
    /// Clear everything that only applies to two-stage opportunities.
    pub fn suppress_stage_fields(&mut self) {
        if self.opportunity_type.is_two_stage() {
            return;
        }
        self.current_stage = None;
        self.next_stage_date = None;
        self.psq_received_at = None;
        self.psq_clarification_deadline_at = None;
        self.psq_submission_deadline_at = None;
        self.psq_submission_time = None;
    }
}

// ---------------------------------------------------------------------------
// Comparable string forms
// ---------------------------------------------------------------------------

/// `YYYY-MM-DD`, or empty when absent.
pub fn date_string(value: Option<Date>) -> String {
    value
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Decimal string, or empty when absent.
pub fn number_string<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// The text itself, or empty when absent.
pub fn text_string(value: Option<&str>) -> String {
    value.unwrap_or_default().to_string()
}
