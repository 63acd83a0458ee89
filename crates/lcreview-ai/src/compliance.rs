//! UCP 600 compliance evaluation.

use std::sync::Arc;

use lcreview_core::{
    ComplianceOutcome, DiscrepancyTable, FieldMap, ReviewLimits, project, summarize,
};
use tracing::{info, warn};

use crate::context::{ContextProvider, compliance_context};
use crate::prompts;
use crate::reasoner::Reasoner;

/// Asks the reasoning step for an overall verdict on an LC, given its
/// discrepancy tables and the best-matching UCP passage.
pub struct ComplianceEvaluator {
    reasoner: Arc<dyn Reasoner>,
    limits: ReviewLimits,
}

impl ComplianceEvaluator {
    pub fn new(reasoner: Arc<dyn Reasoner>) -> Self {
        Self {
            reasoner,
            limits: ReviewLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: ReviewLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn limits(&self) -> &ReviewLimits {
        &self.limits
    }

    /// Never fails: a malformed answer or failed call yields
    /// [`ComplianceOutcome::Unparsed`].
    pub async fn evaluate(
        &self,
        lc_fields: &FieldMap,
        tables: &[DiscrepancyTable],
        context: Option<&dyn ContextProvider>,
    ) -> ComplianceOutcome {
        let view = project(lc_fields);
        let discrepancies = summarize(tables, self.limits.max_discrepancies);
        let ucp_context = compliance_context(context, &self.limits).await;

        let prompt = prompts::compliance(&ucp_context, &view, &discrepancies);
        let outcome = match self.reasoner.invoke(&prompt).await {
            Ok(response) => ComplianceOutcome::from_response(&response),
            Err(e) => {
                warn!(error = %e, "compliance call failed");
                ComplianceOutcome::Unparsed {
                    raw_output: e.to_string(),
                }
            }
        };

        info!(
            lc = ?view.lc_number,
            discrepancies = discrepancies.len(),
            context_chars = ucp_context.chars().count(),
            status = outcome.overall_status().as_str(),
            "compliance evaluated"
        );
        outcome
    }
}
