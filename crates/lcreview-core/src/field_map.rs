//! Field maps: the structured output of a field-extraction call.
//!
//! A [`FieldMap`] is an ordered JSON object. Key order is whatever the
//! extractor produced and is preserved through comparison, so discrepancy
//! rows come out in the same order as the LC's own fields.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Ordered mapping of field name → arbitrary JSON value.
pub type FieldMap = Map<String, Value>;

/// Key under which unparseable reasoning output is preserved.
pub const RAW_OUTPUT_KEY: &str = "raw_output";

/// A supporting document after field extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportingDocument {
    pub file_name: String,
    pub data: FieldMap,
}

impl SupportingDocument {
    pub fn new(file_name: impl Into<String>, data: FieldMap) -> Self {
        Self {
            file_name: file_name.into(),
            data,
        }
    }
}

/// Build the fallback field map `{raw_output: <text>}`.
pub fn raw_output_map(raw: impl Into<String>) -> FieldMap {
    let mut map = FieldMap::new();
    map.insert(RAW_OUTPUT_KEY.to_string(), Value::String(raw.into()));
    map
}

/// Truthiness of a JSON value.
///
/// Null, `false`, the empty string, empty arrays/objects and numeric zero
/// are falsy; everything else is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Render a value as display text: strings unquoted, everything else as JSON.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Normalised comparison key: display text, trimmed and lowercased.
pub fn comparison_key(value: &Value) -> String {
    value_text(value).trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn falsy_values() {
        for v in [
            json!(null),
            json!(false),
            json!(""),
            json!(0),
            json!(0.0),
            json!([]),
            json!({}),
        ] {
            assert!(!is_truthy(&v), "{v} should be falsy");
        }
    }

    #[test]
    fn truthy_values() {
        for v in [
            json!(" "),
            json!("0"),
            json!(1),
            json!(-2.5),
            json!(true),
            json!(["a"]),
            json!({"a": 1}),
        ] {
            assert!(is_truthy(&v), "{v} should be truthy");
        }
    }

    #[test]
    fn value_text_unquotes_strings_only() {
        assert_eq!(value_text(&json!("ABC Corp")), "ABC Corp");
        assert_eq!(value_text(&json!(1000)), "1000");
        assert_eq!(value_text(&json!({"currency": "USD"})), r#"{"currency":"USD"}"#);
    }

    #[test]
    fn comparison_key_trims_and_lowercases() {
        assert_eq!(comparison_key(&json!("  ABC Corp ")), "abc corp");
    }

    #[test]
    fn raw_output_map_has_single_key() {
        let map = raw_output_map("not json");
        assert_eq!(map.len(), 1);
        assert_eq!(map[RAW_OUTPUT_KEY], json!("not json"));
    }

    #[test]
    fn field_map_preserves_insertion_order() {
        let map: FieldMap = serde_json::from_str(r#"{"z": 1, "a": 2, "m": 3}"#).unwrap();
        let keys: Vec<_> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }
}
