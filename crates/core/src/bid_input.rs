//! Boundary validation for manually entered bids.
//!
//! [`BidInput`] mirrors what a client submits: loosely typed, every field
//! optional. [`BidInput::normalize`] turns it into a [`BidFields`] value or
//! fails with [`CoreError::Validation`] before anything touches the database.
//!
//! The `parse_*_lenient` helpers are the forgiving counterparts used by the
//! CSV importer, where malformed optional values are dropped instead of
//! rejected.

use std::sync::LazyLock;

use regex::Regex;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use validator::ValidateUrl;

use crate::bid::{compute_annual_value_gbp, BidStage, BidStatus, OpportunityType, TcvTermBasis};
use crate::bid_fields::BidFields;
use crate::error::CoreError;
use crate::types::Date;

/// Strict 24-hour `HH:MM` shape. Range is checked separately.
static SUBMISSION_TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{2}):(\d{2})$").expect("valid regex"));

// ---------------------------------------------------------------------------
// Input DTO
// ---------------------------------------------------------------------------

/// Create/update payload for a bid, exactly as submitted.
///
/// Numeric fields accept either a JSON number or a string so that form-style
/// clients and JSON clients can share the endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BidInput {
    pub client_name: Option<String>,
    pub bid_name: Option<String>,
    pub status: Option<String>,
    pub opportunity_type: Option<String>,
    pub current_stage: Option<String>,
    pub next_stage_date: Option<String>,
    pub psq_received_at: Option<String>,
    pub psq_clarification_deadline_at: Option<String>,
    pub psq_submission_deadline_at: Option<String>,
    pub psq_submission_time: Option<String>,
    pub itt_received_at: Option<String>,
    pub itt_clarification_deadline_at: Option<String>,
    pub itt_submission_deadline_at: Option<String>,
    pub itt_submission_time: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub tcv_gbp: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub initial_term_months: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub extension_term_months: Option<String>,
    pub tcv_term_basis: Option<String>,
    pub portal_url: Option<String>,
    pub folder_url: Option<String>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(D::Error::custom(format!(
            "expected a string or number, got {other}"
        ))),
    }
}

fn trimmed(value: &Option<String>) -> &str {
    value.as_deref().map(str::trim).unwrap_or_default()
}

impl BidInput {
    /// Validate and normalize into a storable field set.
    ///
    /// Rules, in the order they are checked:
    /// - every date must be `YYYY-MM-DD` and every submission time `HH:MM`
    /// - contract value and initial term are required whole numbers; the
    ///   extension term is an optional whole number
    /// - client name, bid name and folder URL are required
    /// - status, opportunity type and TCV basis must be known values; a
    ///   two-stage opportunity needs a current stage
    /// - folder URL and, if given, portal URL must be absolute URLs
    /// - contract value > 0, initial term >= 1, extension term >= 0
    ///
    /// Stage-only fields are cleared for non two-stage opportunities and the
    /// annual value is always recomputed.
    pub fn normalize(&self) -> Result<BidFields, CoreError> {
        let next_stage_date = parse_date_strict(trimmed(&self.next_stage_date))?;
        let psq_received_at = parse_date_strict(trimmed(&self.psq_received_at))?;
        let psq_clarification_deadline_at =
            parse_date_strict(trimmed(&self.psq_clarification_deadline_at))?;
        let psq_submission_deadline_at =
            parse_date_strict(trimmed(&self.psq_submission_deadline_at))?;
        let psq_submission_time = parse_time_strict(trimmed(&self.psq_submission_time))?;
        let itt_received_at = parse_date_strict(trimmed(&self.itt_received_at))?;
        let itt_clarification_deadline_at =
            parse_date_strict(trimmed(&self.itt_clarification_deadline_at))?;
        let itt_submission_deadline_at =
            parse_date_strict(trimmed(&self.itt_submission_deadline_at))?;
        let itt_submission_time = parse_time_strict(trimmed(&self.itt_submission_time))?;

        let tcv_gbp = parse_required_whole(trimmed(&self.tcv_gbp), "Total contract value")?;
        let initial_term_months = to_months(
            parse_required_whole(trimmed(&self.initial_term_months), "Initial term")?,
            "Initial term",
        )?;
        let extension_term_months =
            match parse_optional_whole(trimmed(&self.extension_term_months), "Extension term")? {
                Some(months) => Some(to_months(months, "Extension term")?),
                None => None,
            };

        let client_name = trimmed(&self.client_name);
        let bid_name = trimmed(&self.bid_name);
        let folder_url = trimmed(&self.folder_url);
        let portal_url = trimmed(&self.portal_url);

        if client_name.is_empty() || bid_name.is_empty() || folder_url.is_empty() {
            return Err(CoreError::Validation("All fields are required.".to_string()));
        }

        let status = BidStatus::from_str_db(trimmed(&self.status))?;
        let opportunity_type = OpportunityType::from_str_db(trimmed(&self.opportunity_type))?;
        let current_stage = if opportunity_type.is_two_stage() {
            Some(BidStage::from_str_db(trimmed(&self.current_stage))?)
        } else {
            None
        };
        let tcv_term_basis = TcvTermBasis::from_str_db(trimmed(&self.tcv_term_basis))?;

        if !is_absolute_url(folder_url) {
            return Err(CoreError::Validation(
                "Folder URL must be a valid URL.".to_string(),
            ));
        }
        if !portal_url.is_empty() && !is_absolute_url(portal_url) {
            return Err(CoreError::Validation(
                "Portal URL must be a valid URL.".to_string(),
            ));
        }

        if tcv_gbp <= 0 {
            return Err(CoreError::Validation(
                "Total contract value must be greater than zero.".to_string(),
            ));
        }
        if initial_term_months < 1 {
            return Err(CoreError::Validation(
                "Initial term must be at least one month.".to_string(),
            ));
        }
        if extension_term_months.is_some_and(|months| months < 0) {
            return Err(CoreError::Validation(
                "Extension term must be zero or greater.".to_string(),
            ));
        }

        let annual_value_gbp = compute_annual_value_gbp(
            tcv_gbp,
            initial_term_months,
            extension_term_months,
            tcv_term_basis,
        )
        .ok_or_else(|| CoreError::Validation("Unable to calculate annual value.".to_string()))?;

        let mut fields = BidFields {
            client_name: client_name.to_string(),
            bid_name: bid_name.to_string(),
            status,
            opportunity_type,
            current_stage,
            next_stage_date,
            psq_received_at,
            psq_clarification_deadline_at,
            psq_submission_deadline_at,
            psq_submission_time,
            itt_received_at,
            itt_clarification_deadline_at,
            itt_submission_deadline_at,
            itt_submission_time,
            tcv_gbp: Some(tcv_gbp),
            initial_term_months: Some(initial_term_months),
            extension_term_months,
            tcv_term_basis: Some(tcv_term_basis),
            annual_value_gbp: Some(annual_value_gbp),
            portal_url: (!portal_url.is_empty()).then(|| portal_url.to_string()),
            folder_url: folder_url.to_string(),
        };
        fields.suppress_stage_fields();

        Ok(fields)
    }
}

// ---------------------------------------------------------------------------
// Field parsers
// ---------------------------------------------------------------------------

/// `true` when `value` parses as an absolute URL (scheme required).
pub fn is_absolute_url(value: &str) -> bool {
    value.to_string().validate_url()
}

/// Parse an optional `YYYY-MM-DD` date. Empty input is `None`.
pub fn parse_date_strict(raw: &str) -> Result<Option<Date>, CoreError> {
    if raw.is_empty() {
        return Ok(None);
    }
    Date::parse_from_str(raw, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| CoreError::Validation("Invalid date provided.".to_string()))
}

/// Parse an optional date, accepting the shapes spreadsheets tend to emit.
///
/// Anything unrecognised is treated as absent.
pub fn parse_date_lenient(raw: &str) -> Option<Date> {
    if raw.is_empty() {
        return None;
    }
    if let Ok(date) = Date::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(timestamp) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Some(timestamp.date_naive());
    }
    if let Ok(timestamp) = chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(timestamp.date());
    }
    Date::parse_from_str(raw, "%Y/%m/%d").ok()
}

/// Check an `HH:MM` time, returning a description of the problem.
fn check_time(raw: &str) -> Result<(), &'static str> {
    let captures = SUBMISSION_TIME_RE
        .captures(raw)
        .ok_or("Submission time must be HH:MM.")?;

    let hours: u32 = captures[1].parse().map_err(|_| "Submission time must be HH:MM.")?;
    let minutes: u32 = captures[2].parse().map_err(|_| "Submission time must be HH:MM.")?;

    if hours > 23 || minutes > 59 {
        return Err("Submission time must be a valid 24-hour time.");
    }
    Ok(())
}

/// Parse an optional submission time. The value is kept verbatim.
pub fn parse_time_strict(raw: &str) -> Result<Option<String>, CoreError> {
    if raw.is_empty() {
        return Ok(None);
    }
    check_time(raw)
        .map(|()| Some(raw.to_string()))
        .map_err(|msg| CoreError::Validation(msg.to_string()))
}

/// Like [`parse_time_strict`] but malformed values become `None`.
pub fn parse_time_lenient(raw: &str) -> Option<String> {
    if raw.is_empty() {
        return None;
    }
    check_time(raw).ok().map(|()| raw.to_string())
}

/// Parse a whole number, accepting integral decimals such as `"12.0"`.
pub fn parse_whole_number(raw: &str) -> Option<i64> {
    if let Ok(value) = raw.parse::<i64>() {
        return Some(value);
    }
    let value = raw.parse::<f64>().ok()?;
    if !value.is_finite() || value.fract() != 0.0 || value.abs() > i64::MAX as f64 {
        return None;
    }
    Some(value as i64)
}

fn parse_required_whole(raw: &str, label: &str) -> Result<i64, CoreError> {
    if raw.is_empty() {
        return Err(CoreError::Validation(format!("{label} is required.")));
    }
    parse_whole_number(raw)
        .ok_or_else(|| CoreError::Validation(format!("{label} must be a whole number.")))
}

fn parse_optional_whole(raw: &str, label: &str) -> Result<Option<i64>, CoreError> {
    if raw.is_empty() {
        return Ok(None);
    }
    parse_whole_number(raw)
        .map(Some)
        .ok_or_else(|| CoreError::Validation(format!("{label} must be a whole number.")))
}

fn to_months(value: i64, label: &str) -> Result<i32, CoreError> {
    i32::try_from(value)
        .map_err(|_| CoreError::Validation(format!("{label} must be a whole number.")))
}
