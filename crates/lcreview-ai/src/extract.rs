//! Field extraction from document text.

use std::sync::Arc;

use lcreview_core::parse::parse_field_map;
use lcreview_core::{FieldMap, ParseResult};
use tracing::{info, warn};

use crate::prompts;
use crate::reasoner::Reasoner;

/// Turns raw document text into a [`FieldMap`] via the reasoning step.
pub struct FieldExtractor {
    reasoner: Arc<dyn Reasoner>,
}

impl FieldExtractor {
    pub fn new(reasoner: Arc<dyn Reasoner>) -> Self {
        Self { reasoner }
    }

    /// Extract LC terms.
    pub async fn extract_credit(&self, lc_text: &str) -> ParseResult<FieldMap> {
        self.extract("credit", &prompts::credit_extraction(lc_text))
            .await
    }

    /// Extract a supporting document's fields.
    pub async fn extract_document(&self, doc_text: &str) -> ParseResult<FieldMap> {
        self.extract("document", &prompts::document_extraction(doc_text))
            .await
    }

    async fn extract(&self, kind: &str, prompt: &str) -> ParseResult<FieldMap> {
        match self.reasoner.invoke(prompt).await {
            Ok(response) => {
                let result = parse_field_map(&response);
                match &result {
                    ParseResult::Parsed(map) => {
                        info!(kind, fields = map.len(), "extracted fields")
                    }
                    ParseResult::Unparsed(raw) => {
                        warn!(kind, chars = raw.len(), "extraction response was not a JSON object")
                    }
                }
                result
            }
            Err(e) => {
                warn!(kind, error = %e, "extraction call failed");
                ParseResult::Unparsed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reasoner::ReasonerError;
    use crate::testing::ScriptedReasoner;
    use lcreview_core::RAW_OUTPUT_KEY;
    use serde_json::json;

    #[tokio::test]
    async fn parses_fenced_credit_fields() {
        let reasoner = Arc::new(ScriptedReasoner::replies(&[
            "```json\n{\"letter_of_credit_number\": \"LC-1\", \
             \"amount\": {\"currency\": \"USD\", \"in_figures\": 1000}}\n```",
        ]));
        let extractor = FieldExtractor::new(reasoner.clone());

        let result = extractor.extract_credit("IRREVOCABLE DOCUMENTARY CREDIT").await;
        let ParseResult::Parsed(map) = result else {
            panic!("expected parsed fields");
        };
        assert_eq!(map["letter_of_credit_number"], json!("LC-1"));
        assert!(reasoner.prompts()[0].contains("IRREVOCABLE DOCUMENTARY CREDIT"));
    }

    #[tokio::test]
    async fn prose_becomes_raw_output() {
        let reasoner = Arc::new(ScriptedReasoner::replies(&["I could not find any fields."]));
        let extractor = FieldExtractor::new(reasoner);

        let map = extractor
            .extract_document("ERROR_READING_PDF: bad xref")
            .await
            .into_field_map();
        assert_eq!(map[RAW_OUTPUT_KEY], json!("I could not find any fields."));
    }

    #[tokio::test]
    async fn call_failure_is_unparsed_not_fatal() {
        let reasoner = Arc::new(ScriptedReasoner::new(vec![Err(ReasonerError::EmptyResponse)]));
        let extractor = FieldExtractor::new(reasoner);

        let result = extractor.extract_document("COMMERCIAL INVOICE").await;
        assert_eq!(
            result,
            ParseResult::Unparsed("response contained no completion".into())
        );
    }
}
