//! Prompt templates for each reasoning step.

use lcreview_core::{ComplianceView, FieldMap};
use serde_json::Value;

// ── Field extraction ──

pub fn credit_extraction(lc_text: &str) -> String {
    format!(
        "You are an expert in trade finance documents and extract only structured fields.\n\
         \n\
         Extract the most important fields from the following Letter of Credit (LC) document \
         and return ONLY a valid JSON object. No markdown fences, no explanation.\n\
         Use these keys where the document provides them: letter_of_credit_number, \
         amount (object with currency and in_figures), expiry_date, latest_date_of_shipment, \
         availability, documents_required (array of strings), shipment_details (object with \
         partial_shipments and transshipments), additional_conditions (array of strings), \
         applicant, beneficiary, port_of_loading, port_of_discharge.\n\
         \n\
         Document:\n\
         {lc_text}"
    )
}

pub fn document_extraction(doc_text: &str) -> String {
    format!(
        "You are an expert in trade finance and logistics documents.\n\
         \n\
         Extract key structured fields from the following document. \
         Return only a valid JSON object. No markdown fences, no explanation.\n\
         \n\
         {doc_text}"
    )
}

// ── Discrepancy comparison ──

pub fn comparison(file_name: &str, lc_fields: &FieldMap, doc_fields: &FieldMap) -> String {
    format!(
        "You are an expert trade finance compliance officer.\n\
         \n\
         Compare LC data against supporting document: {file_name}\n\
         Flag each LC field as a match, mismatch, or missing in the document.\n\
         \n\
         LC Data: {lc}\n\
         Document Data: {doc}\n\
         \n\
         Return ONLY a JSON array of rows, one per LC field, in LC field order:\n\
         [{{\"Field\":\"...\",\"LC Value\":\"...\",\"Document Value\":\"...\",\
         \"Status\":\"Match|Mismatch|Missing\",\"Issue\":\"short description or null\"}}, ...]",
        lc = to_json(lc_fields),
        doc = to_json(doc_fields),
    )
}

// ── Compliance evaluation ──

pub fn compliance(ucp_context: &str, view: &ComplianceView, discrepancies: &[String]) -> String {
    format!(
        "You are a trade finance compliance expert checking LC compliance with UCP 600.\n\
         \n\
         UCP context (summary):\n\
         {ucp_context}\n\
         \n\
         LC (compliance view):\n\
         {view}\n\
         \n\
         Discrepancies:\n\
         {discrepancies}\n\
         \n\
         Return ONLY JSON:\n\
         {{\"overall_status\":\"Accepted|Rejected\",\"ucp_compliance_issues\":[...],\
         \"recommendation\":\"string\"}}",
        view = serde_json::to_string(view).unwrap_or_default(),
        discrepancies = serde_json::to_string(discrepancies).unwrap_or_default(),
    )
}

// ── Question answering ──

pub fn question(question: &str, lc_context: &str, ucp_context: &str) -> String {
    format!(
        "Answer the user's question about a letter of credit using the LC and UCP 600 \
         content below. Answer in plain text.\n\
         \n\
         User question:\n\
         {question}\n\
         \n\
         LC context:\n\
         {lc_context}\n\
         \n\
         UCP context:\n\
         {ucp_context}"
    )
}

fn to_json(fields: &FieldMap) -> String {
    Value::Object(fields.clone()).to_string()
}
