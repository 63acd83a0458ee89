//! Compliance verdicts and the record handed to persistence.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::field_map::value_text;
use crate::parse::{ParseResult, parse_as};

/// Overall accept/reject decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum OverallStatus {
    Accepted,
    Rejected,
    /// The evaluator's answer was missing or unrecognised.
    Unknown,
}

impl OverallStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accepted => "Accepted",
            Self::Rejected => "Rejected",
            Self::Unknown => "Unknown",
        }
    }
}

impl From<String> for OverallStatus {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "accepted" => Self::Accepted,
            "rejected" => Self::Rejected,
            _ => Self::Unknown,
        }
    }
}

/// A well-formed compliance verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceVerdict {
    pub overall_status: OverallStatus,
    pub ucp_compliance_issues: Vec<String>,
    pub recommendation: String,
}

/// Verdict as the reasoning step returns it. Issues may come back as
/// objects rather than strings; they are flattened to text.
#[derive(Deserialize)]
struct ModelVerdict {
    overall_status: OverallStatus,
    #[serde(default)]
    ucp_compliance_issues: Vec<Value>,
    #[serde(default)]
    recommendation: Option<Value>,
}

impl From<ModelVerdict> for ComplianceVerdict {
    fn from(v: ModelVerdict) -> Self {
        Self {
            overall_status: v.overall_status,
            ucp_compliance_issues: v.ucp_compliance_issues.iter().map(value_text).collect(),
            recommendation: v
                .recommendation
                .filter(|r| !r.is_null())
                .map(|r| value_text(&r))
                .unwrap_or_default(),
        }
    }
}

/// Result of a compliance evaluation.
///
/// Serialises untagged: a verdict as its three fields, an unparsed
/// response as `{"raw_output": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ComplianceOutcome {
    Verdict(ComplianceVerdict),
    Unparsed { raw_output: String },
}

impl ComplianceOutcome {
    /// Parse an evaluator response, keeping the raw text when it has the wrong shape.
    pub fn from_response(text: &str) -> Self {
        match parse_as::<ModelVerdict>(text) {
            ParseResult::Parsed(v) => Self::Verdict(v.into()),
            ParseResult::Unparsed(raw) => Self::Unparsed { raw_output: raw },
        }
    }

    pub fn overall_status(&self) -> OverallStatus {
        match self {
            Self::Verdict(v) => v.overall_status,
            Self::Unparsed { .. } => OverallStatus::Unknown,
        }
    }

    /// Only an explicit `Accepted` counts as accepted.
    pub fn is_accepted(&self) -> bool {
        self.overall_status() == OverallStatus::Accepted
    }

    /// One-line human summary.
    pub fn summary(&self) -> String {
        match self {
            Self::Verdict(v) => format!(
                "{}: {} UCP issue(s). {}",
                v.overall_status.as_str(),
                v.ucp_compliance_issues.len(),
                v.recommendation
            )
            .trim_end()
            .to_string(),
            Self::Unparsed { .. } => "Unknown: compliance response could not be parsed".into(),
        }
    }
}

/// What the persistence layer stores for one compliance check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationRecord {
    pub valid: bool,
    pub status: String,
    pub summary: String,
    /// The outcome serialised as JSON text.
    pub raw: String,
    /// ISO 8601 timestamp string.
    pub checked_at: String,
}

impl ValidationRecord {
    pub fn from_outcome(outcome: &ComplianceOutcome, checked_at: impl Into<String>) -> Self {
        let raw = match outcome {
            ComplianceOutcome::Unparsed { raw_output } => raw_output.clone(),
            verdict => serde_json::to_string(verdict).unwrap_or_default(),
        };
        Self {
            valid: outcome.is_accepted(),
            status: outcome.overall_status().as_str().to_string(),
            summary: outcome.summary(),
            raw,
            checked_at: checked_at.into(),
        }
    }
}
