//! Bid vocabulary: statuses, opportunity types, stages, TCV term basis, the
//! annual value formula and GBP formatting.
//!
//! Every enumeration stores its snake_case value in the database and exposes
//! a human label for display.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Bid status
// ---------------------------------------------------------------------------

/// Workflow status of a bid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BidStatus {
    Pending,
    Pipeline,
    InProgress,
    Bid,
    NoBid,
    Submitted,
    Won,
    Lost,
    Dropped,
    Abandoned,
}

impl BidStatus {
    pub const ALL: [Self; 10] = [
        Self::Pending,
        Self::Pipeline,
        Self::InProgress,
        Self::Bid,
        Self::NoBid,
        Self::Submitted,
        Self::Won,
        Self::Lost,
        Self::Dropped,
        Self::Abandoned,
    ];

    /// Convert to a database-compatible string.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Pipeline => "pipeline",
            Self::InProgress => "in_progress",
            Self::Bid => "bid",
            Self::NoBid => "no_bid",
            Self::Submitted => "submitted",
            Self::Won => "won",
            Self::Lost => "lost",
            Self::Dropped => "dropped",
            Self::Abandoned => "abandoned",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Pipeline => "Pipeline",
            Self::InProgress => "In progress",
            Self::Bid => "Bid",
            Self::NoBid => "No bid",
            Self::Submitted => "Submitted",
            Self::Won => "Won",
            Self::Lost => "Lost",
            Self::Dropped => "Dropped",
            Self::Abandoned => "Abandoned",
        }
    }

    /// Parse an exact status value (as stored or submitted by a form).
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| CoreError::Validation("Invalid status.".to_string()))
    }

    /// Resolve a human-typed status such as `"No Bid"`, `"no-bid"` or
    /// `"IN_PROGRESS"`.
    ///
    /// Matching is case-insensitive, treats runs of `-` and `_` as a space and
    /// collapses whitespace. Unknown aliases return `None`.
    pub fn from_alias(raw: &str) -> Option<Self> {
        let lowered = raw.trim().to_lowercase();
        let spaced: String = lowered
            .chars()
            .map(|c| if c == '-' || c == '_' { ' ' } else { c })
            .collect();
        let key = spaced.split_whitespace().collect::<Vec<_>>().join(" ");

        match key.as_str() {
            "pending" => Some(Self::Pending),
            "pipeline" => Some(Self::Pipeline),
            "in progress" => Some(Self::InProgress),
            "bid" => Some(Self::Bid),
            "no bid" => Some(Self::NoBid),
            "submitted" => Some(Self::Submitted),
            "won" => Some(Self::Won),
            "lost" => Some(Self::Lost),
            "dropped" => Some(Self::Dropped),
            "abandoned" => Some(Self::Abandoned),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Opportunity type
// ---------------------------------------------------------------------------

/// Shape of the tender process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpportunityType {
    SingleTender,
    CombinedPsqItt,
    TwoStagePsqItt,
}

impl OpportunityType {
    pub const ALL: [Self; 3] = [
        Self::SingleTender,
        Self::CombinedPsqItt,
        Self::TwoStagePsqItt,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::SingleTender => "single_tender",
            Self::CombinedPsqItt => "combined_psq_itt",
            Self::TwoStagePsqItt => "two_stage_psq_itt",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::SingleTender => "Single Tender",
            Self::CombinedPsqItt => "Combined PSQ/ITT",
            Self::TwoStagePsqItt => "Two Stage PSQ/ITT",
        }
    }

    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| CoreError::Validation("Invalid opportunity type.".to_string()))
    }

    /// Only two-stage opportunities track a current stage and PSQ dates.
    pub fn is_two_stage(self) -> bool {
        self == Self::TwoStagePsqItt
    }
}

// ---------------------------------------------------------------------------
// Bid stage
// ---------------------------------------------------------------------------

/// Current stage of a two-stage opportunity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BidStage {
    Psq,
    Itt,
}

impl BidStage {
    pub const ALL: [Self; 2] = [Self::Psq, Self::Itt];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Psq => "psq",
            Self::Itt => "itt",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Psq => "PSQ",
            Self::Itt => "ITT",
        }
    }

    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        Self::ALL
            .into_iter()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| {
                CoreError::Validation("Current stage is required for two stage bids.".to_string())
            })
    }
}

// ---------------------------------------------------------------------------
// TCV term basis
// ---------------------------------------------------------------------------

/// Which contract months the total contract value is spread over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TcvTermBasis {
    InitialOnly,
    InitialPlusExtension,
}

impl TcvTermBasis {
    pub const ALL: [Self; 2] = [Self::InitialOnly, Self::InitialPlusExtension];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::InitialOnly => "initial_only",
            Self::InitialPlusExtension => "initial_plus_extension",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::InitialOnly => "Initial term only",
            Self::InitialPlusExtension => "Initial + extension",
        }
    }

    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        Self::ALL
            .into_iter()
            .find(|basis| basis.as_str() == s)
            .ok_or_else(|| CoreError::Validation("Invalid TCV term basis.".to_string()))
    }
}

// ---------------------------------------------------------------------------
// Annual value
// ---------------------------------------------------------------------------

/// Compute the annualised contract value in whole pounds.
///
/// `round(tcv * 12 / months)` where `months` is the initial term, plus the
/// extension term when the basis is [`TcvTermBasis::InitialPlusExtension`].
/// A missing extension counts as zero. Returns `None` when the effective term
/// is not positive or the result is not representable.
pub fn compute_annual_value_gbp(
    tcv_gbp: i64,
    initial_term_months: i32,
    extension_term_months: Option<i32>,
    basis: TcvTermBasis,
) -> Option<i64> {
    let extension = i64::from(extension_term_months.unwrap_or(0));
    let total_months = match basis {
        TcvTermBasis::InitialPlusExtension => i64::from(initial_term_months) + extension,
        TcvTermBasis::InitialOnly => i64::from(initial_term_months),
    };

    if total_months <= 0 {
        return None;
    }

    let annual = (tcv_gbp as f64) * 12.0 / (total_months as f64);
    // Halves round towards positive infinity.
    let rounded = (annual + 0.5).floor();

    if !rounded.is_finite() || rounded.abs() > i64::MAX as f64 {
        return None;
    }

    Some(rounded as i64)
}

// ---------------------------------------------------------------------------
// Currency formatting
// ---------------------------------------------------------------------------

/// Placeholder shown when a monetary value is absent.
pub const MISSING_VALUE: &str = "—";

/// Format whole pounds the en-GB way, e.g. `£1,200,000` or `-£950`.
pub fn format_currency_gbp(value: Option<i64>) -> String {
    let Some(value) = value else {
        return MISSING_VALUE.to_string();
    };

    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if value < 0 {
        format!("-£{grouped}")
    } else {
        format!("£{grouped}")
    }
}
