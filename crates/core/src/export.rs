//! CSV export of bids and of the audit trail.

use chrono::SecondsFormat;

use crate::bid_fields::{date_string, number_string, text_string, BidFields};
use crate::csv::serialize_csv;
use crate::import::IMPORT_HEADERS;
use crate::types::{DbId, Timestamp};

/// Download filename of the bid export.
pub const BID_EXPORT_FILENAME: &str = "bids-export.csv";

/// Download filename of the audit export.
pub const AUDIT_EXPORT_FILENAME: &str = "bids-audit-export.csv";

/// Content type served with both exports.
pub const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

/// Bid export columns. Identical to the import header row so an export can
/// be re-imported unchanged.
pub const BID_EXPORT_HEADERS: [&str; 24] = IMPORT_HEADERS;

pub const AUDIT_EXPORT_HEADERS: [&str; 7] = [
    "bidLabel",
    "action",
    "actor",
    "eventCreatedAt",
    "field",
    "fromValue",
    "toValue",
];

/// ISO-8601 UTC with millisecond precision, e.g. `2026-01-05T10:00:00.000Z`.
pub fn format_timestamp(value: Timestamp) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// A persisted bid as the export sees it.
#[derive(Debug, Clone, Copy)]
pub struct ExportBid<'a> {
    pub id: DbId,
    pub fields: &'a BidFields,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// One export record in [`BID_EXPORT_HEADERS`] order.
pub fn bid_export_row(bid: ExportBid<'_>) -> Vec<String> {
    let f = bid.fields;
    vec![
        bid.id.to_string(),
        f.client_name.clone(),
        f.bid_name.clone(),
        f.status.as_str().to_string(),
        f.opportunity_type.as_str().to_string(),
        text_string(f.current_stage.map(|s| s.as_str())),
        date_string(f.next_stage_date),
        date_string(f.psq_received_at),
        date_string(f.psq_clarification_deadline_at),
        date_string(f.psq_submission_deadline_at),
        text_string(f.psq_submission_time.as_deref()),
        date_string(f.itt_received_at),
        date_string(f.itt_clarification_deadline_at),
        date_string(f.itt_submission_deadline_at),
        text_string(f.itt_submission_time.as_deref()),
        number_string(f.tcv_gbp),
        number_string(f.initial_term_months),
        number_string(f.extension_term_months),
        text_string(f.tcv_term_basis.map(|b| b.as_str())),
        number_string(f.annual_value_gbp),
        text_string(f.portal_url.as_deref()),
        f.folder_url.clone(),
        format_timestamp(bid.created_at),
        format_timestamp(bid.updated_at),
    ]
}

/// Render the full bid export document.
pub fn render_bid_export<'a>(bids: impl IntoIterator<Item = ExportBid<'a>>) -> String {
    serialize_csv(&BID_EXPORT_HEADERS, bids.into_iter().map(bid_export_row))
}

/// An audit event and its changes as the export sees them.
#[derive(Debug, Clone)]
pub struct ExportAuditEvent<'a> {
    pub bid_label: &'a str,
    pub action: &'a str,
    pub actor: &'a str,
    pub created_at: Timestamp,
    /// `(field, from_value, to_value)` triples.
    pub changes: Vec<(&'a str, &'a str, &'a str)>,
}

/// One record per change. An event without changes still yields one record
/// with empty field and values.
pub fn audit_export_rows(event: &ExportAuditEvent<'_>) -> Vec<Vec<String>> {
    let created_at = format_timestamp(event.created_at);
    let record = |field: &str, from: &str, to: &str| -> Vec<String> {
        vec![
            event.bid_label.to_string(),
            event.action.to_string(),
            event.actor.to_string(),
            created_at.clone(),
            field.to_string(),
            from.to_string(),
            to.to_string(),
        ]
    };

    if event.changes.is_empty() {
        return vec![record("", "", "")];
    }
    event
        .changes
        .iter()
        .map(|(field, from, to)| record(*field, *from, *to))
        .collect()
}

/// Render the full audit export document.
pub fn render_audit_export<'a>(events: impl IntoIterator<Item = &'a ExportAuditEvent<'a>>) -> String {
    serialize_csv(
        &AUDIT_EXPORT_HEADERS,
        events.into_iter().flat_map(audit_export_rows),
    )
}
