//! Vertical card display for review results.
//!
//! Field maps print as grouped `key value` lines; discrepancy tables as
//! one block per document; verdicts as a status card.

use lcreview_ai::ReviewReport;
use lcreview_core::field_map::value_text;
use lcreview_core::summary::issue_text;
use lcreview_core::{
    ComplianceOutcome, DiscrepancyTable, FieldMap, ReviewLimits, RowStatus, ValidationRecord,
    project, summarize,
};
use serde_json::Value;

const MAX_LIST_ITEMS: usize = 10;
const MAX_VALUE_CHARS: usize = 80;

// ── Public API ──

pub fn print_fields(title: &str, fields: &FieldMap) {
    println!("=== {title} ===");
    println!();
    for (key, value) in fields {
        print_value(key, value, 1);
    }
    println!();
}

pub fn print_tables(tables: &[DiscrepancyTable]) {
    for table in tables {
        let open = table.discrepancies().count();
        println!("{} ({} field(s), {} discrepancy)", table.file, table.table.len(), open);
        for row in &table.table {
            println!(
                "  {} {:<26} {}",
                status_marker(row.status),
                row.field,
                match row.status {
                    RowStatus::Match => clip(&value_text(&row.lc_value)),
                    _ => clip(&issue_text(row)),
                }
            );
        }
        println!();
    }
}

pub fn print_outcome(outcome: &ComplianceOutcome) {
    println!("Compliance");
    println!("  {:<26} {}", "status", outcome.overall_status().as_str());
    match outcome {
        ComplianceOutcome::Verdict(v) => {
            if !v.recommendation.is_empty() {
                println!("  {:<26} {}", "recommendation", v.recommendation);
            }
            print_list("ucp_compliance_issues", &v.ucp_compliance_issues);
        }
        ComplianceOutcome::Unparsed { raw_output } => {
            println!("  {:<26} {}", "raw_output", clip(raw_output));
        }
    }
    println!();
}

pub fn print_record(record: &ValidationRecord) {
    println!("Validation Record");
    println!("  {:<26} {}", "valid", if record.valid { "yes" } else { "no" });
    println!("  {:<26} {}", "status", record.status);
    println!("  {:<26} {}", "summary", record.summary);
    println!("  {:<26} {}", "checked_at", record.checked_at);
    println!();
}

/// Full review: LC headline, per-document tables, verdict, record.
pub fn print_report(report: &ReviewReport, record: &ValidationRecord, limits: &ReviewLimits) {
    let view = project(&report.lc_fields);
    let lc_number = view
        .lc_number
        .as_ref()
        .map(value_text)
        .unwrap_or_else(|| "(unnumbered)".into());
    println!("=== LC {lc_number} ===");
    if let Some(amount) = &view.amount {
        println!("{amount}");
    }
    println!();

    println!("Compliance View");
    print_opt("expiry_date", view.expiry_date.as_ref());
    print_opt("latest_shipment_date", view.latest_shipment_date.as_ref());
    print_opt("payment_terms", view.payment_terms.as_ref());
    print_opt("partial_shipments", view.partial_shipments.as_ref());
    print_opt("transshipments", view.transshipments.as_ref());
    print_list("documents_required", &view.documents_required);
    println!(
        "  {:<26} {}",
        "ucp_applicable",
        if view.ucp_applicable { "yes" } else { "no" }
    );
    println!();

    print_tables(&report.tables);

    let summary = summarize(&report.tables, limits.max_discrepancies);
    if !summary.is_empty() {
        println!("Discrepancy Summary ({})", summary.len());
        for line in &summary {
            println!("  - {}", clip(line));
        }
        println!();
    }

    print_outcome(&report.outcome);
    print_record(record);
}

// ── Value rendering ──

fn print_value(key: &str, value: &Value, depth: usize) {
    let indent = "  ".repeat(depth);
    match value {
        Value::Object(map) if !map.is_empty() => {
            println!("{indent}{key}:");
            for (k, v) in map {
                print_value(k, v, depth + 1);
            }
        }
        Value::Array(items) if items.iter().all(|i| !i.is_object()) => {
            let texts: Vec<String> = items.iter().map(value_text).collect();
            print_list_at(&indent, key, &texts);
        }
        Value::Array(items) => {
            println!("{indent}{key} ({}):", items.len());
            for (i, item) in items.iter().take(MAX_LIST_ITEMS).enumerate() {
                print_value(&format!("[{i}]"), item, depth + 1);
            }
        }
        other => println!("{indent}{:<26} {}", key, clip(&value_text(other))),
    }
}

fn print_opt(key: &str, value: Option<&Value>) {
    if let Some(v) = value {
        println!("  {:<26} {}", key, clip(&value_text(v)));
    }
}

fn print_list(key: &str, items: &[String]) {
    print_list_at("  ", key, items);
}

fn print_list_at(indent: &str, key: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    println!("{indent}{key} ({}):", items.len());
    for item in items.iter().take(MAX_LIST_ITEMS) {
        println!("{indent}  - {}", clip(item));
    }
    if items.len() > MAX_LIST_ITEMS {
        println!("{indent}  ... and {} more", items.len() - MAX_LIST_ITEMS);
    }
}

fn status_marker(status: RowStatus) -> &'static str {
    match status {
        RowStatus::Match => "ok ",
        RowStatus::Mismatch => "!! ",
        RowStatus::Missing => "-- ",
    }
}

fn clip(text: &str) -> String {
    let one_line = text.replace('\n', " ");
    if one_line.chars().count() <= MAX_VALUE_CHARS {
        return one_line;
    }
    let cut: String = one_line.chars().take(MAX_VALUE_CHARS - 3).collect();
    format!("{cut}...")
}
