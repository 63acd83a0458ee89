//! Discrepancy summarisation for the compliance prompt.

use crate::discrepancy::{ComparisonRow, DiscrepancyTable, RowStatus};
use crate::field_map::value_text;

/// Describe a non-matching row.
///
/// Uses the row's explicit issue text when present, otherwise synthesises
/// one from the field name, status and both values.
pub fn issue_text(row: &ComparisonRow) -> String {
    if let Some(issue) = &row.issue {
        return issue.clone();
    }
    format!(
        "{} {} (LC: {}, document: {})",
        row.field,
        row.status.as_str(),
        value_text(&row.lc_value),
        value_text(&row.document_value),
    )
}

/// Flatten tables into `"<file>: <issue>"` lines for every non-Match row.
///
/// Walks tables then rows in order and stops as soon as `cap` entries have
/// been emitted, possibly mid-table.
pub fn summarize(tables: &[DiscrepancyTable], cap: usize) -> Vec<String> {
    tables
        .iter()
        .flat_map(|t| {
            t.table
                .iter()
                .filter(|r| r.status != RowStatus::Match)
                .map(move |r| format!("{}: {}", t.file, issue_text(r)))
        })
        .take(cap)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discrepancy::compare_fields;
    use crate::field_map::FieldMap;
    use serde_json::json;

    fn row(field: &str, status: RowStatus) -> ComparisonRow {
        ComparisonRow {
            field: field.into(),
            lc_value: json!("a"),
            document_value: json!("b"),
            status,
            issue: None,
        }
    }

    fn table(file: &str, rows: Vec<ComparisonRow>) -> DiscrepancyTable {
        DiscrepancyTable {
            file: file.into(),
            table: rows,
        }
    }

    #[test]
    fn only_non_matching_rows() {
        let tables = vec![table(
            "invoice.pdf",
            vec![
                row("amount", RowStatus::Match),
                row("beneficiary", RowStatus::Mismatch),
                row("port", RowStatus::Missing),
            ],
        )];
        let summary = summarize(&tables, 10);
        assert_eq!(
            summary,
            vec![
                "invoice.pdf: beneficiary mismatch (LC: a, document: b)",
                "invoice.pdf: port missing (LC: a, document: b)",
            ]
        );
    }

    #[test]
    fn explicit_issue_preferred() {
        let mut r = row("amount", RowStatus::Mismatch);
        r.issue = Some("amount exceeds LC".into());
        let summary = summarize(&[table("bl.pdf", vec![r])], 10);
        assert_eq!(summary, vec!["bl.pdf: amount exceeds LC"]);
    }

    #[test]
    fn hard_cap_across_tables_in_order() {
        let tables: Vec<_> = (0..3)
            .map(|t| {
                table(
                    &format!("doc{t}.pdf"),
                    (0..5)
                        .map(|i| row(&format!("f{i}"), RowStatus::Mismatch))
                        .collect(),
                )
            })
            .collect();

        let summary = summarize(&tables, 10);
        assert_eq!(summary.len(), 10);
        assert!(summary[0].starts_with("doc0.pdf: f0 "));
        assert!(summary[4].starts_with("doc0.pdf: f4 "));
        assert!(summary[5].starts_with("doc1.pdf: f0 "));
        assert!(summary[9].starts_with("doc1.pdf: f4 "));
    }

    #[test]
    fn cap_stops_mid_table() {
        let tables = vec![table(
            "doc.pdf",
            (0..4).map(|i| row(&format!("f{i}"), RowStatus::Missing)).collect(),
        )];
        let summary = summarize(&tables, 3);
        assert_eq!(summary.len(), 3);
        assert!(summary[2].starts_with("doc.pdf: f2 "));
    }

    #[test]
    fn end_to_end_single_mismatch() {
        let lc: FieldMap = json!({"amount": "1000 USD", "beneficiary": "Acme"})
            .as_object()
            .cloned()
            .unwrap();
        let doc: FieldMap = json!({"amount": "1000 USD", "beneficiary": "Acme Ltd"})
            .as_object()
            .cloned()
            .unwrap();

        let rows = compare_fields(&lc, &doc);
        assert_eq!(rows[0].field, "amount");
        assert_eq!(rows[0].status, RowStatus::Match);
        assert_eq!(rows[1].field, "beneficiary");
        assert_eq!(rows[1].status, RowStatus::Mismatch);

        let summary = summarize(&[table("invoice.pdf", rows)], 10);
        assert_eq!(summary.len(), 1);
        assert!(summary[0].starts_with("invoice.pdf: beneficiary mismatch"));
    }
}
