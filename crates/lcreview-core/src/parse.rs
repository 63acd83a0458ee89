//! Best-effort parsing of reasoning-step output.
//!
//! Model responses carry no structural guarantee. Every call site gets a
//! [`ParseResult`] back and must handle both variants; nothing here panics
//! or returns a fault for malformed text.

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::field_map::{FieldMap, raw_output_map};

/// Outcome of parsing a model response into an expected shape.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseResult<T> {
    Parsed(T),
    /// The original response text, kept for operator inspection.
    Unparsed(String),
}

impl<T> ParseResult<T> {
    pub fn is_parsed(&self) -> bool {
        matches!(self, Self::Parsed(_))
    }
}

impl ParseResult<FieldMap> {
    /// Collapse into a field map, substituting `{raw_output: ...}` when unparsed.
    pub fn into_field_map(self) -> FieldMap {
        match self {
            Self::Parsed(map) => map,
            Self::Unparsed(raw) => raw_output_map(raw),
        }
    }
}

/// Why a response did not have the expected shape.
#[derive(Debug, Error)]
pub enum ShapeError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected a JSON object")]
    NotAnObject,
    #[error("expected a JSON array")]
    NotAnArray,
    #[error("unrecognised row status: {0:?}")]
    UnknownStatus(String),
}

/// Remove Markdown code fences (```` ```json ```` / ```` ``` ````) and surrounding whitespace.
pub fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}

/// Parse fenced or bare JSON text into a [`Value`].
pub fn parse_json(text: &str) -> Result<Value, ShapeError> {
    Ok(serde_json::from_str(&strip_code_fences(text))?)
}

/// Parse text as a JSON object into a [`FieldMap`].
pub fn parse_field_map(text: &str) -> ParseResult<FieldMap> {
    match parse_json(text) {
        Ok(Value::Object(map)) => ParseResult::Parsed(map),
        Ok(_) => {
            tracing::debug!(reason = %ShapeError::NotAnObject, "field map not parsed");
            ParseResult::Unparsed(text.to_string())
        }
        Err(e) => {
            tracing::debug!(reason = %e, "field map not parsed");
            ParseResult::Unparsed(text.to_string())
        }
    }
}

/// Parse text into any deserialisable shape.
pub fn parse_as<T: DeserializeOwned>(text: &str) -> ParseResult<T> {
    match serde_json::from_str::<T>(&strip_code_fences(text)) {
        Ok(v) => ParseResult::Parsed(v),
        Err(e) => {
            tracing::debug!(reason = %e, "response not parsed");
            ParseResult::Unparsed(text.to_string())
        }
    }
}
