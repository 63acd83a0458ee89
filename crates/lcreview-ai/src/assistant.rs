//! Free-text questions about an LC and UCP 600.

use std::sync::Arc;

use lcreview_core::FieldMap;
use serde_json::Value;
use tracing::info;

use crate::context::{ContextProvider, question_context};
use crate::prompts;
use crate::reasoner::{Reasoner, ReasonerError};

/// Passages retrieved per question.
pub const QUESTION_TOP_K: usize = 3;

pub struct UcpAssistant {
    reasoner: Arc<dyn Reasoner>,
}

impl UcpAssistant {
    pub fn new(reasoner: Arc<dyn Reasoner>) -> Self {
        Self { reasoner }
    }

    /// Answer `question` using the LC's fields (if any) and the passages
    /// most similar to the question. Unlike the review steps, a failed
    /// call is returned to the caller.
    pub async fn answer(
        &self,
        question: &str,
        lc_fields: Option<&FieldMap>,
        context: Option<&dyn ContextProvider>,
    ) -> Result<String, ReasonerError> {
        let lc_context = lc_fields
            .map(|f| Value::Object(f.clone()).to_string())
            .unwrap_or_default();
        let ucp_context = question_context(context, question, QUESTION_TOP_K).await;

        let answer = self
            .reasoner
            .invoke(&prompts::question(question, &lc_context, &ucp_context))
            .await?;
        info!(
            question_chars = question.len(),
            answer_chars = answer.len(),
            "question answered"
        );
        Ok(answer.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FixedContext, ScriptedReasoner};
    use serde_json::json;

    #[tokio::test]
    async fn answers_with_lc_and_top_passages() {
        let reasoner =
            Arc::new(ScriptedReasoner::replies(&["  Yes, unless the credit prohibits it.\n"]));
        let context = FixedContext::passages(&["Art. 20", "Art. 19", "Art. 23", "Art. 31"]);
        let lc = json!({"shipment_details": {"transshipments": "allowed"}})
            .as_object()
            .cloned()
            .unwrap();

        let answer = UcpAssistant::new(reasoner.clone())
            .answer("Is transshipment allowed?", Some(&lc), Some(&context))
            .await
            .unwrap();

        assert_eq!(answer, "Yes, unless the credit prohibits it.");
        let prompt = &reasoner.prompts()[0];
        assert!(prompt.contains(r#"{"shipment_details":{"transshipments":"allowed"}}"#));
        assert!(prompt.contains("Art. 20\n\nArt. 19\n\nArt. 23"));
        assert!(!prompt.contains("Art. 31"));

        let queries = context.queries.lock().unwrap().clone();
        assert_eq!(queries, vec![("Is transshipment allowed?".to_string(), QUESTION_TOP_K)]);
    }

    #[tokio::test]
    async fn call_failure_is_returned() {
        let reasoner = Arc::new(ScriptedReasoner::new(vec![Err(ReasonerError::Server {
            status: 401,
            body: "invalid api key".into(),
        })]));
        let err = UcpAssistant::new(reasoner)
            .answer("What is a complying presentation?", None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ReasonerError::Server { status: 401, .. }));
    }
}
