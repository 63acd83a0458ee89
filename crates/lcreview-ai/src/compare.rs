//! Discrepancy comparison between LC terms and supporting documents.

use std::sync::Arc;

use lcreview_core::discrepancy::parse_rows;
use lcreview_core::{
    ComparisonRow, DiscrepancyTable, FieldMap, ParseResult, RowStatus, SupportingDocument,
    compare_fields,
};
use tracing::{info, warn};

use crate::prompts;
use crate::reasoner::Reasoner;

/// Produces one [`DiscrepancyTable`] per supporting document.
///
/// With a reasoner, each document is first compared by the model; any
/// call failure or malformed answer falls back to the rule-based rows.
/// Without one, only the rule-based comparison runs.
pub struct DiscrepancyComparator {
    reasoner: Option<Arc<dyn Reasoner>>,
}

impl DiscrepancyComparator {
    pub fn new(reasoner: Arc<dyn Reasoner>) -> Self {
        Self {
            reasoner: Some(reasoner),
        }
    }

    pub fn rule_based() -> Self {
        Self { reasoner: None }
    }

    /// Compare every document, preserving input order.
    pub async fn compare(
        &self,
        lc_fields: &FieldMap,
        documents: &[SupportingDocument],
    ) -> Vec<DiscrepancyTable> {
        let mut tables = Vec::with_capacity(documents.len());
        for doc in documents {
            tables.push(self.compare_one(lc_fields, doc).await);
        }
        tables
    }

    pub async fn compare_one(
        &self,
        lc_fields: &FieldMap,
        doc: &SupportingDocument,
    ) -> DiscrepancyTable {
        let table = match &self.reasoner {
            Some(reasoner) => self.model_rows(reasoner.as_ref(), lc_fields, doc).await,
            None => compare_fields(lc_fields, &doc.data),
        };
        let discrepancies = table.iter().filter(|r| r.status != RowStatus::Match).count();
        info!(
            file = %doc.file_name,
            rows = table.len(),
            discrepancies,
            "compared document"
        );
        DiscrepancyTable {
            file: doc.file_name.clone(),
            table,
        }
    }

    async fn model_rows(
        &self,
        reasoner: &dyn Reasoner,
        lc_fields: &FieldMap,
        doc: &SupportingDocument,
    ) -> Vec<ComparisonRow> {
        let prompt = prompts::comparison(&doc.file_name, lc_fields, &doc.data);
        match reasoner.invoke(&prompt).await {
            Ok(response) => match parse_rows(&response) {
                ParseResult::Parsed(rows) => rows,
                ParseResult::Unparsed(_) => {
                    warn!(
                        file = %doc.file_name,
                        "comparison response malformed, using rule-based rows"
                    );
                    compare_fields(lc_fields, &doc.data)
                }
            },
            Err(e) => {
                warn!(
                    file = %doc.file_name,
                    error = %e,
                    "comparison call failed, using rule-based rows"
                );
                compare_fields(lc_fields, &doc.data)
            }
        }
    }
}
