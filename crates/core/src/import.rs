//! Bulk bid import from CSV.
//!
//! [`plan_import`] is pure: it parses the document, checks the header row and
//! turns every data row into either a [`BidFields`] value or a skip. The
//! caller persists the surviving rows in one insert.
//!
//! Row handling is deliberately more forgiving than manual entry. Status
//! accepts human-typed aliases and malformed dates, times and numbers are
//! treated as absent instead of failing the row.

use crate::bid::{compute_annual_value_gbp, BidStage, BidStatus, OpportunityType, TcvTermBasis};
use crate::bid_fields::BidFields;
use crate::bid_input::{is_absolute_url, parse_date_lenient, parse_time_lenient, parse_whole_number};
use crate::csv::{parse_csv, CsvTable};
use crate::error::CoreError;

/// Header row shared by the bid import and the bid export, in column order.
///
/// `id`, `createdAt` and `updatedAt` are accepted on import but ignored.
pub const IMPORT_HEADERS: [&str; 24] = [
    "id",
    "clientName",
    "bidName",
    "status",
    "opportunityType",
    "currentStage",
    "nextStageDate",
    "psqReceivedAt",
    "psqClarificationDeadlineAt",
    "psqSubmissionDeadlineAt",
    "psqSubmissionTime",
    "ittReceivedAt",
    "ittClarificationDeadlineAt",
    "ittSubmissionDeadlineAt",
    "ittSubmissionTime",
    "tcvGbp",
    "initialTermMonths",
    "extensionTermMonths",
    "tcvTermBasis",
    "annualValueGbp",
    "portalUrl",
    "folderUrl",
    "createdAt",
    "updatedAt",
];

/// Outcome of planning an import: rows to insert and how many were skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportPlan {
    pub rows: Vec<BidFields>,
    pub skipped: usize,
}

/// Parse and validate a CSV document for import.
///
/// Fails only when expected headers are missing; individual bad rows are
/// counted in [`ImportPlan::skipped`].
pub fn plan_import(text: &str) -> Result<ImportPlan, CoreError> {
    let table = parse_csv(text);

    let missing: Vec<&str> = IMPORT_HEADERS
        .iter()
        .copied()
        .filter(|header| table.column(header).is_none())
        .collect();
    if !missing.is_empty() {
        return Err(CoreError::Validation(format!(
            "Missing headers: {}",
            missing.join(", ")
        )));
    }

    let mut plan = ImportPlan::default();
    for record in &table.rows {
        match import_row(&Row { table: &table, record }) {
            Some(fields) => plan.rows.push(fields),
            None => plan.skipped += 1,
        }
    }

    Ok(plan)
}

/// One data record addressed by header name.
struct Row<'a> {
    table: &'a CsvTable,
    record: &'a [String],
}

impl Row<'_> {
    /// Trimmed cell value, empty when the column or cell is absent.
    fn get(&self, header: &str) -> &str {
        self.table
            .column(header)
            .and_then(|index| self.record.get(index))
            .map(|cell| cell.trim())
            .unwrap_or_default()
    }

    fn int(&self, header: &str) -> Option<i64> {
        let raw = self.get(header);
        if raw.is_empty() {
            return None;
        }
        parse_whole_number(raw)
    }

    fn months(&self, header: &str) -> Option<i32> {
        self.int(header).and_then(|value| i32::try_from(value).ok())
    }
}

/// Normalize one record, or `None` when it must be skipped.
fn import_row(row: &Row<'_>) -> Option<BidFields> {
    let client_name = row.get("clientName");
    let bid_name = row.get("bidName");
    let status_raw = row.get("status");
    let folder_url = row.get("folderUrl");
    let portal_url = row.get("portalUrl");

    if client_name.is_empty() || bid_name.is_empty() || status_raw.is_empty() || folder_url.is_empty()
    {
        return None;
    }

    let status = BidStatus::from_alias(status_raw)?;

    let opportunity_type = match row.get("opportunityType") {
        "" => OpportunityType::SingleTender,
        raw => OpportunityType::from_str_db(raw).ok()?,
    };

    let current_stage = if opportunity_type.is_two_stage() {
        Some(BidStage::from_str_db(row.get("currentStage")).ok()?)
    } else {
        None
    };

    let tcv_term_basis = match row.get("tcvTermBasis") {
        "" => None,
        raw => Some(TcvTermBasis::from_str_db(raw).ok()?),
    };

    if !is_absolute_url(folder_url) {
        return None;
    }
    if !portal_url.is_empty() && !is_absolute_url(portal_url) {
        return None;
    }

    let tcv_gbp = row.int("tcvGbp");
    let initial_term_months = row.months("initialTermMonths");
    let extension_term_months = row.months("extensionTermMonths");

    let computed = match (tcv_gbp, initial_term_months, tcv_term_basis) {
        (Some(tcv), Some(initial), Some(basis)) => {
            compute_annual_value_gbp(tcv, initial, extension_term_months, basis)
        }
        _ => None,
    };
    let annual_value_gbp = row.int("annualValueGbp").or(computed);

    let mut fields = BidFields {
        client_name: client_name.to_string(),
        bid_name: bid_name.to_string(),
        status,
        opportunity_type,
        current_stage,
        next_stage_date: parse_date_lenient(row.get("nextStageDate")),
        psq_received_at: parse_date_lenient(row.get("psqReceivedAt")),
        psq_clarification_deadline_at: parse_date_lenient(row.get("psqClarificationDeadlineAt")),
        psq_submission_deadline_at: parse_date_lenient(row.get("psqSubmissionDeadlineAt")),
        psq_submission_time: parse_time_lenient(row.get("psqSubmissionTime")),
        itt_received_at: parse_date_lenient(row.get("ittReceivedAt")),
        itt_clarification_deadline_at: parse_date_lenient(row.get("ittClarificationDeadlineAt")),
        itt_submission_deadline_at: parse_date_lenient(row.get("ittSubmissionDeadlineAt")),
        itt_submission_time: parse_time_lenient(row.get("ittSubmissionTime")),
        tcv_gbp,
        initial_term_months,
        extension_term_months,
        tcv_term_basis,
        annual_value_gbp,
        portal_url: (!portal_url.is_empty()).then(|| portal_url.to_string()),
        folder_url: folder_url.to_string(),
    };
    fields.suppress_stage_fields();

    Some(fields)
}
