//! Audit trail vocabulary and the field-level bid diff.
//!
//! Every tracked field is listed once in [`TRACKED_FIELDS`] together with the
//! function that renders it as a comparable string. Diffs are produced in that
//! order so audit history reads the same way every time.

use serde::Serialize;

use crate::bid_fields::{date_string, number_string, text_string, BidFields};

/// Action tag for an edited bid.
pub const ACTION_UPDATE: &str = "update";

/// Action tag for a removed bid.
pub const ACTION_DELETE: &str = "delete";

/// `to_value` recorded for every field of a deleted bid.
pub const DELETED_MARKER: &str = "[deleted]";

/// One changed field. Both sides are already serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldChange {
    pub field: &'static str,
    pub from_value: String,
    pub to_value: String,
}

/// Human-readable label stored on every audit event.
pub fn bid_label(client_name: &str, bid_name: &str) -> String {
    format!("{client_name} · {bid_name}")
}

// ---------------------------------------------------------------------------
// Tracked fields
// ---------------------------------------------------------------------------

type FieldSerializer = fn(&BidFields) -> String;

/// Audited bid fields in diff order: (field key, display label, serializer).
pub const TRACKED_FIELDS: &[(&str, &str, FieldSerializer)] = &[
    ("clientName", "Client name", |b| b.client_name.clone()),
    ("bidName", "Bid name", |b| b.bid_name.clone()),
    ("status", "Status", |b| b.status.as_str().to_string()),
    ("portalUrl", "Portal URL", |b| text_string(b.portal_url.as_deref())),
    ("opportunityType", "Opportunity type", |b| {
        b.opportunity_type.as_str().to_string()
    }),
    ("currentStage", "Current stage", |b| {
        text_string(b.current_stage.map(|s| s.as_str()))
    }),
    ("nextStageDate", "Next stage date", |b| date_string(b.next_stage_date)),
    ("psqReceivedAt", "PSQ received", |b| date_string(b.psq_received_at)),
    ("psqClarificationDeadlineAt", "PSQ clarification deadline", |b| {
        date_string(b.psq_clarification_deadline_at)
    }),
    ("psqSubmissionDeadlineAt", "PSQ submission deadline", |b| {
        date_string(b.psq_submission_deadline_at)
    }),
    ("psqSubmissionTime", "PSQ submission time", |b| {
        text_string(b.psq_submission_time.as_deref())
    }),
    ("ittReceivedAt", "ITT received", |b| date_string(b.itt_received_at)),
    ("ittClarificationDeadlineAt", "ITT clarification deadline", |b| {
        date_string(b.itt_clarification_deadline_at)
    }),
    ("ittSubmissionDeadlineAt", "ITT submission deadline", |b| {
        date_string(b.itt_submission_deadline_at)
    }),
    ("ittSubmissionTime", "ITT submission time", |b| {
        text_string(b.itt_submission_time.as_deref())
    }),
    ("tcvGbp", "Total contract value", |b| number_string(b.tcv_gbp)),
    ("initialTermMonths", "Initial term (months)", |b| {
        number_string(b.initial_term_months)
    }),
    ("extensionTermMonths", "Extension term (months)", |b| {
        number_string(b.extension_term_months)
    }),
    ("tcvTermBasis", "TCV term basis", |b| {
        text_string(b.tcv_term_basis.map(|basis| basis.as_str()))
    }),
    ("annualValueGbp", "Annual value", |b| number_string(b.annual_value_gbp)),
    ("folderUrl", "Folder URL", |b| b.folder_url.clone()),
];

/// Fields captured when a bid is deleted, in recording order.
pub const DELETED_FIELDS: [&str; 5] = ["clientName", "bidName", "status", "folderUrl", "portalUrl"];

/// Display label for an audited field key. Unknown keys are returned as-is.
pub fn field_label(field: &str) -> &str {
    TRACKED_FIELDS
        .iter()
        .find(|(key, _, _)| *key == field)
        .map(|(_, label, _)| *label)
        .unwrap_or(field)
}

fn serialize_field(field: &str, fields: &BidFields) -> String {
    TRACKED_FIELDS
        .iter()
        .find(|(key, _, _)| *key == field)
        .map(|(_, _, serialize)| serialize(fields))
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Diffing
// ---------------------------------------------------------------------------

/// Compare two field sets. A change is recorded only when the serialized
/// values differ.
pub fn diff_bid_fields(before: &BidFields, after: &BidFields) -> Vec<FieldChange> {
    TRACKED_FIELDS
        .iter()
        .filter_map(|(field, _, serialize)| {
            let from_value = serialize(before);
            let to_value = serialize(after);
            (from_value != to_value).then_some(FieldChange {
                field: *field,
                from_value,
                to_value,
            })
        })
        .collect()
}

/// Changes recorded for a deleted bid: every field in [`DELETED_FIELDS`]
/// moves from its current value to [`DELETED_MARKER`].
pub fn deletion_changes(current: &BidFields) -> Vec<FieldChange> {
    DELETED_FIELDS
        .iter()
        .map(|field| FieldChange {
            field: *field,
            from_value: serialize_field(field, current),
            to_value: DELETED_MARKER.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bid::{BidStatus, TcvTermBasis};
    use crate::bid_fields::fixtures::sample_fields;
    use crate::types::Date;

    #[test]
    fn identical_fields_produce_no_changes() {
        let fields = sample_fields();
        assert!(diff_bid_fields(&fields, &fields.clone()).is_empty());
    }

    #[test]
    fn status_change_produces_single_entry() {
        let before = sample_fields();
        let mut after = before.clone();
        after.status = BidStatus::Won;

        let changes = diff_bid_fields(&before, &after);

        assert_eq!(
            changes,
            vec![FieldChange {
                field: "status",
                from_value: "pending".to_string(),
                to_value: "won".to_string(),
            }]
        );
    }

    #[test]
    fn changes_follow_tracked_order() {
        let before = sample_fields();
        let mut after = before.clone();
        after.folder_url = "https://drive.example.com/bids/other".to_string();
        after.client_name = "Beta Trust".to_string();
        after.itt_submission_deadline_at = None;

        let fields: Vec<_> = diff_bid_fields(&before, &after)
            .into_iter()
            .map(|c| c.field)
            .collect();

        assert_eq!(fields, vec!["clientName", "ittSubmissionDeadlineAt", "folderUrl"]);
    }

    #[test]
    fn absent_values_serialize_as_empty() {
        let before = sample_fields();
        let mut after = before.clone();
        after.extension_term_months = None;
        after.tcv_term_basis = Some(TcvTermBasis::InitialPlusExtension);
        after.next_stage_date = Date::from_ymd_opt(2026, 7, 1);

        let changes = diff_bid_fields(&before, &after);

        let extension = changes
            .iter()
            .find(|c| c.field == "extensionTermMonths")
            .unwrap();
        assert_eq!(extension.from_value, "12");
        assert_eq!(extension.to_value, "");

        let next = changes.iter().find(|c| c.field == "nextStageDate").unwrap();
        assert_eq!(next.from_value, "");
        assert_eq!(next.to_value, "2026-07-01");
    }

    #[test]
    fn deletion_records_fixed_fields() {
        let mut current = sample_fields();
        current.portal_url = Some("https://portal.example.com/t/1".to_string());

        let changes = deletion_changes(&current);

        assert_eq!(changes.len(), 5);
        assert_eq!(
            changes.iter().map(|c| c.field).collect::<Vec<_>>(),
            DELETED_FIELDS.to_vec()
        );
        assert!(changes.iter().all(|c| c.to_value == DELETED_MARKER));
        assert_eq!(changes[0].from_value, "Acme Council");
        assert_eq!(changes[2].from_value, "pending");
        assert_eq!(changes[4].from_value, "https://portal.example.com/t/1");
    }

    #[test]
    fn deletion_without_portal_records_empty_from() {
        let changes = deletion_changes(&sample_fields());
        assert_eq!(changes[4].field, "portalUrl");
        assert_eq!(changes[4].from_value, "");
    }

    #[test]
    fn labels() {
        assert_eq!(bid_label("Acme", "FM"), "Acme · FM");
        assert_eq!(field_label("clientName"), "Client name");
        assert_eq!(field_label("tcvGbp"), "Total contract value");
        assert_eq!(field_label("mystery"), "mystery");
    }
}
