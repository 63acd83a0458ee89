//! End-to-end LC review: text, fields, discrepancies, verdict.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use lcreview_core::{
    Attachment, ComplianceOutcome, DiscrepancyTable, FieldMap, ReviewLimits, SupportingDocument,
    ValidationRecord, supporting_documents,
};
use serde::Serialize;
use tracing::info;

use crate::compare::DiscrepancyComparator;
use crate::compliance::ComplianceEvaluator;
use crate::context::ContextProvider;
use crate::extract::FieldExtractor;
use crate::reasoner::Reasoner;

/// Source of plain text for a stored document.
///
/// Infallible: unreadable files yield an error sentinel string, which then
/// flows through extraction like any other text.
#[async_trait]
pub trait TextSource: Send + Sync {
    async fn extract_text(&self, path: &Path) -> String;
}

/// Everything one review produced.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewReport {
    pub lc_fields: FieldMap,
    pub documents: Vec<SupportingDocument>,
    pub tables: Vec<DiscrepancyTable>,
    pub outcome: ComplianceOutcome,
}

impl ReviewReport {
    pub fn validation_record(&self, checked_at: impl Into<String>) -> ValidationRecord {
        ValidationRecord::from_outcome(&self.outcome, checked_at)
    }
}

pub struct ReviewPipeline {
    extractor: FieldExtractor,
    comparator: DiscrepancyComparator,
    evaluator: ComplianceEvaluator,
    text: Arc<dyn TextSource>,
    context: Option<Arc<dyn ContextProvider>>,
}

impl ReviewPipeline {
    /// One reasoner for every step, model-backed comparison, no UCP context.
    pub fn new(reasoner: Arc<dyn Reasoner>, text: Arc<dyn TextSource>) -> Self {
        Self {
            extractor: FieldExtractor::new(reasoner.clone()),
            comparator: DiscrepancyComparator::new(reasoner.clone()),
            evaluator: ComplianceEvaluator::new(reasoner),
            text,
            context: None,
        }
    }

    pub fn with_limits(mut self, limits: ReviewLimits) -> Self {
        self.evaluator = self.evaluator.with_limits(limits);
        self
    }

    pub fn with_context(mut self, provider: Arc<dyn ContextProvider>) -> Self {
        self.context = Some(provider);
        self
    }

    /// Use a separate reasoner (typically with a tighter token budget) for
    /// the compliance step.
    pub fn with_compliance_reasoner(mut self, reasoner: Arc<dyn Reasoner>) -> Self {
        let limits = *self.evaluator.limits();
        self.evaluator = ComplianceEvaluator::new(reasoner).with_limits(limits);
        self
    }

    pub fn rule_based_comparison(mut self) -> Self {
        self.comparator = DiscrepancyComparator::rule_based();
        self
    }

    /// LC fields from the credit's file. Unparseable output becomes `{raw_output}`.
    pub async fn extract_credit(&self, lc_path: &Path) -> FieldMap {
        let text = self.text.extract_text(lc_path).await;
        self.extractor.extract_credit(&text).await.into_field_map()
    }

    /// Extract every supporting attachment, in order, skipping the credit itself.
    pub async fn extract_supporting(&self, attachments: &[Attachment]) -> Vec<SupportingDocument> {
        let mut documents = Vec::new();
        for attachment in supporting_documents(attachments) {
            documents.push(self.extract_attachment(attachment).await);
        }
        documents
    }

    /// Extract and compare each supporting attachment in turn.
    pub async fn discrepancies(
        &self,
        lc_fields: &FieldMap,
        attachments: &[Attachment],
    ) -> (Vec<SupportingDocument>, Vec<DiscrepancyTable>) {
        let mut documents = Vec::new();
        let mut tables = Vec::new();
        for attachment in supporting_documents(attachments) {
            let doc = self.extract_attachment(attachment).await;
            tables.push(self.comparator.compare_one(lc_fields, &doc).await);
            documents.push(doc);
        }
        (documents, tables)
    }

    pub async fn compliance(
        &self,
        lc_fields: &FieldMap,
        tables: &[DiscrepancyTable],
    ) -> ComplianceOutcome {
        self.evaluator
            .evaluate(lc_fields, tables, self.context.as_deref())
            .await
    }

    /// Review already-extracted LC fields against the attachments.
    pub async fn review(&self, lc_fields: FieldMap, attachments: &[Attachment]) -> ReviewReport {
        let (documents, tables) = self.discrepancies(&lc_fields, attachments).await;
        let outcome = self.compliance(&lc_fields, &tables).await;
        info!(
            documents = documents.len(),
            status = outcome.overall_status().as_str(),
            "review complete"
        );
        ReviewReport {
            lc_fields,
            documents,
            tables,
            outcome,
        }
    }

    /// Full review starting from the credit's own file.
    pub async fn review_credit(&self, lc_path: &Path, attachments: &[Attachment]) -> ReviewReport {
        let lc_fields = self.extract_credit(lc_path).await;
        self.review(lc_fields, attachments).await
    }

    async fn extract_attachment(&self, attachment: &Attachment) -> SupportingDocument {
        let text = self.text.extract_text(&attachment.path).await;
        let data = self
            .extractor
            .extract_document(&text)
            .await
            .into_field_map();
        SupportingDocument::new(attachment.file_name.clone(), data)
    }
}
