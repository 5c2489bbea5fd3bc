//! Shared fixtures for repository integration tests.

use bidtrack_core::bid::{BidStatus, OpportunityType, TcvTermBasis};
use bidtrack_core::bid_fields::BidFields;
use bidtrack_core::types::Date;

/// A valid single-tender bid for `client`.
pub fn bid_fields(client: &str) -> BidFields {
    BidFields {
        client_name: client.to_string(),
        bid_name: "Facilities management".to_string(),
        status: BidStatus::Pending,
        opportunity_type: OpportunityType::SingleTender,
        current_stage: None,
        next_stage_date: None,
        psq_received_at: None,
        psq_clarification_deadline_at: None,
        psq_submission_deadline_at: None,
        psq_submission_time: None,
        itt_received_at: Date::from_ymd_opt(2026, 3, 1),
        itt_clarification_deadline_at: None,
        itt_submission_deadline_at: Date::from_ymd_opt(2026, 4, 15),
        itt_submission_time: Some("12:00".to_string()),
        tcv_gbp: Some(1_200_000),
        initial_term_months: Some(36),
        extension_term_months: Some(12),
        tcv_term_basis: Some(TcvTermBasis::InitialOnly),
        annual_value_gbp: Some(400_000),
        portal_url: None,
        folder_url: "https://drive.example.com/bids/acme".to_string(),
    }
}
