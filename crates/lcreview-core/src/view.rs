//! Compliance view: the subset of LC terms the compliance prompt needs.
//!
//! Projection is total. Extractor output is free-form, so every lookup
//! tolerates absent keys and unexpected value types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::field_map::{FieldMap, value_text};

/// Literal whose presence in additional conditions marks the LC as UCP 600 governed.
pub const UCP_600_MARKER: &str = "UCP 600";

/// Fixed-shape projection of LC terms for compliance reasoning.
///
/// Every key is always serialised; absent terms appear as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceView {
    pub lc_number: Option<Value>,
    /// `"<currency> <in_figures>"`.
    pub amount: Option<String>,
    pub expiry_date: Option<Value>,
    pub latest_shipment_date: Option<Value>,
    pub payment_terms: Option<Value>,
    /// Short names: each entry's text before its first comma.
    pub documents_required: Vec<String>,
    pub partial_shipments: Option<Value>,
    pub transshipments: Option<Value>,
    pub ucp_applicable: bool,
}

/// Project LC fields into a [`ComplianceView`].
pub fn project(lc_fields: &FieldMap) -> ComplianceView {
    let shipment = lc_fields.get("shipment_details");

    ComplianceView {
        lc_number: present(lc_fields.get("letter_of_credit_number")),
        amount: format_amount(lc_fields.get("amount")),
        expiry_date: present(lc_fields.get("expiry_date")),
        latest_shipment_date: present(lc_fields.get("latest_date_of_shipment")),
        payment_terms: present(lc_fields.get("availability")),
        documents_required: document_short_names(lc_fields.get("documents_required")),
        partial_shipments: present(shipment.and_then(|s| s.get("partial_shipments"))),
        transshipments: present(shipment.and_then(|s| s.get("transshipments"))),
        ucp_applicable: conditions_text(lc_fields.get("additional_conditions"))
            .contains(UCP_600_MARKER),
    }
}

fn present(value: Option<&Value>) -> Option<Value> {
    value.filter(|v| !v.is_null()).cloned()
}

/// `{currency, in_figures}` → `"USD 1000"`. A bare string or number amount
/// is kept as-is; anything else yields `None`.
fn format_amount(amount: Option<&Value>) -> Option<String> {
    match amount? {
        Value::Object(obj) => {
            let currency = obj.get("currency").filter(|v| !v.is_null())?;
            let figures = obj.get("in_figures").filter(|v| !v.is_null())?;
            Some(format!("{} {}", value_text(currency), value_text(figures)))
        }
        other if other.is_string() || other.is_number() => Some(value_text(other)),
        _ => None,
    }
}

fn document_short_names(documents: Option<&Value>) -> Vec<String> {
    let Some(Value::Array(entries)) = documents else {
        return Vec::new();
    };
    entries
        .iter()
        .filter_map(Value::as_str)
        .map(|entry| entry.split(',').next().unwrap_or(entry).to_string())
        .collect()
}

fn conditions_text(conditions: Option<&Value>) -> String {
    match conditions {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(" "),
        Some(Value::String(s)) => s.clone(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(v: Value) -> FieldMap {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn empty_fields_project_every_key() {
        let view = project(&FieldMap::new());
        let json = serde_json::to_value(&view).unwrap();
        let obj = json.as_object().unwrap();
        for key in [
            "lc_number",
            "amount",
            "expiry_date",
            "latest_shipment_date",
            "payment_terms",
            "documents_required",
            "partial_shipments",
            "transshipments",
            "ucp_applicable",
        ] {
            assert!(obj.contains_key(key), "missing key {key}");
        }
        assert_eq!(obj["amount"], Value::Null);
        assert_eq!(obj["ucp_applicable"], json!(false));
    }

    #[test]
    fn full_projection() {
        let lc = fields(json!({
            "letter_of_credit_number": "LC-2024-001",
            "amount": {"currency": "USD", "in_figures": "150,000.00"},
            "expiry_date": "2024-12-31",
            "latest_date_of_shipment": "2024-11-30",
            "availability": "By payment at sight",
            "documents_required": [
                "Commercial invoice, signed, in 3 originals",
                "Full set of clean on board bills of lading",
            ],
            "shipment_details": {"partial_shipments": "Allowed", "transshipments": "Not allowed"},
            "additional_conditions": ["Documents must be in English", "Subject to UCP 600"],
        }));

        let view = project(&lc);
        assert_eq!(view.lc_number, Some(json!("LC-2024-001")));
        assert_eq!(view.amount.as_deref(), Some("USD 150,000.00"));
        assert_eq!(view.latest_shipment_date, Some(json!("2024-11-30")));
        assert_eq!(view.payment_terms, Some(json!("By payment at sight")));
        assert_eq!(
            view.documents_required,
            vec!["Commercial invoice", "Full set of clean on board bills of lading"]
        );
        assert_eq!(view.partial_shipments, Some(json!("Allowed")));
        assert_eq!(view.transshipments, Some(json!("Not allowed")));
        assert!(view.ucp_applicable);
    }

    #[test]
    fn ucp_reference_detection() {
        let view = project(&fields(json!({"additional_conditions": ["Subject to UCP 600 rules"]})));
        assert!(view.ucp_applicable);

        let view = project(&fields(json!({"additional_conditions": ["Subject to local law"]})));
        assert!(!view.ucp_applicable);
    }

    #[test]
    fn ucp_marker_is_case_sensitive_literal() {
        let view = project(&fields(json!({"additional_conditions": ["subject to ucp600"]})));
        assert!(!view.ucp_applicable);
    }

    #[test]
    fn malformed_subfields_do_not_fail() {
        let lc = fields(json!({
            "amount": {"currency": "USD"},
            "documents_required": "Invoice, 3 copies",
            "shipment_details": "partial allowed",
            "additional_conditions": 42,
        }));
        let view = project(&lc);
        assert_eq!(view.amount, None);
        assert!(view.documents_required.is_empty());
        assert_eq!(view.partial_shipments, None);
        assert!(!view.ucp_applicable);
    }

    #[test]
    fn bare_amount_kept_verbatim() {
        let view = project(&fields(json!({"amount": "1000 USD"})));
        assert_eq!(view.amount.as_deref(), Some("1000 USD"));
    }

    #[test]
    fn short_name_without_comma_is_whole_entry() {
        let view = project(&fields(json!({"documents_required": ["Packing list", 7]})));
        assert_eq!(view.documents_required, vec!["Packing list"]);
    }

    #[test]
    fn short_name_keeps_surrounding_whitespace() {
        let lc = fields(json!({"documents_required": [" Packing list , 2 copies", ", signed"]}));
        let view = project(&lc);
        assert_eq!(view.documents_required, vec![" Packing list ", ""]);
    }
}
