//! Discrepancy tables: per-field comparison of LC terms against one
//! supporting document.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::field_map::{FieldMap, comparison_key, is_truthy};
use crate::parse::{ParseResult, ShapeError, parse_json};

/// Comparison outcome for a single field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RowStatus {
    /// Both sides present and equal after trimming and case folding.
    Match,
    /// Both sides present but different.
    Mismatch,
    /// At least one side absent or empty.
    Missing,
}

impl RowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Match => "match",
            Self::Mismatch => "mismatch",
            Self::Missing => "missing",
        }
    }

    /// Recognise a status label, tolerating decoration such as `"✅ Match"`.
    ///
    /// Only letters are kept and the remainder must be exactly one of the
    /// three status words, so negated labels like `"No match"` are rejected.
    pub fn from_label(label: &str) -> Option<Self> {
        let word: String = label
            .chars()
            .filter(|c| c.is_alphabetic())
            .flat_map(char::to_lowercase)
            .collect();
        match word.as_str() {
            "match" => Some(Self::Match),
            "mismatch" => Some(Self::Mismatch),
            "missing" => Some(Self::Missing),
            _ => None,
        }
    }
}

/// One LC field compared against the same field in a supporting document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub field: String,
    pub lc_value: Value,
    pub document_value: Value,
    pub status: RowStatus,
    /// Free-text discrepancy description, when the reasoning step supplied one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue: Option<String>,
}

/// All comparison rows for one supporting document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscrepancyTable {
    pub file: String,
    pub table: Vec<ComparisonRow>,
}

impl DiscrepancyTable {
    /// Rows whose status is not [`RowStatus::Match`].
    pub fn discrepancies(&self) -> impl Iterator<Item = &ComparisonRow> {
        self.table.iter().filter(|r| r.status != RowStatus::Match)
    }
}

/// Rule-based classification of a value pair.
///
/// `Missing` wins over everything: if either side is falsy the row is
/// missing. Otherwise values match on trimmed, case-insensitive text.
pub fn classify(lc_value: &Value, document_value: &Value) -> RowStatus {
    if !is_truthy(lc_value) || !is_truthy(document_value) {
        RowStatus::Missing
    } else if comparison_key(lc_value) == comparison_key(document_value) {
        RowStatus::Match
    } else {
        RowStatus::Mismatch
    }
}

/// Deterministic comparison: one row per LC field, in LC key order.
///
/// Fields absent from the document compare against the empty string.
pub fn compare_fields(lc_fields: &FieldMap, document: &FieldMap) -> Vec<ComparisonRow> {
    lc_fields
        .iter()
        .map(|(field, lc_value)| {
            let document_value = document
                .get(field)
                .cloned()
                .unwrap_or_else(|| Value::String(String::new()));
            ComparisonRow {
                field: field.clone(),
                status: classify(lc_value, &document_value),
                lc_value: lc_value.clone(),
                document_value,
                issue: None,
            }
        })
        .collect()
}

/// Row shape as returned by the reasoning step.
///
/// Accepts both snake_case keys and the title-case keys used in the
/// comparison prompt.
#[derive(Deserialize)]
struct ModelRow {
    #[serde(alias = "Field")]
    field: String,
    #[serde(default, alias = "LC Value")]
    lc_value: Value,
    #[serde(default, alias = "Document Value")]
    document_value: Value,
    #[serde(alias = "Status")]
    status: String,
    #[serde(default, alias = "Issue", alias = "discrepancy", alias = "Discrepancy")]
    issue: Option<String>,
}

impl TryFrom<ModelRow> for ComparisonRow {
    type Error = ShapeError;

    fn try_from(row: ModelRow) -> Result<Self, Self::Error> {
        let status =
            RowStatus::from_label(&row.status).ok_or(ShapeError::UnknownStatus(row.status))?;
        Ok(Self {
            field: row.field,
            lc_value: row.lc_value,
            document_value: row.document_value,
            status,
            issue: row.issue.filter(|s| !s.trim().is_empty()),
        })
    }
}

fn try_parse_rows(text: &str) -> Result<Vec<ComparisonRow>, ShapeError> {
    let Value::Array(items) = parse_json(text)? else {
        return Err(ShapeError::NotAnArray);
    };
    items
        .into_iter()
        .map(|item| {
            let row: ModelRow = serde_json::from_value(item)?;
            ComparisonRow::try_from(row)
        })
        .collect()
}

/// Parse a comparison response into rows.
///
/// Any shape problem, including a single row with an unknown status,
/// rejects the whole response so the caller can fall back.
pub fn parse_rows(text: &str) -> ParseResult<Vec<ComparisonRow>> {
    match try_parse_rows(text) {
        Ok(rows) => ParseResult::Parsed(rows),
        Err(e) => {
            tracing::debug!(reason = %e, "comparison rows not parsed");
            ParseResult::Unparsed(text.to_string())
        }
    }
}
