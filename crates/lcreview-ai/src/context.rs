//! UCP context retrieval.
//!
//! The rulebook index is an external collaborator. Its failures are typed
//! and handled here: compliance checks proceed without context rather
//! than fail.

use async_trait::async_trait;
use lcreview_core::ReviewLimits;
use lcreview_core::limits::truncate_chars;
use thiserror::Error;
use tracing::{debug, warn};

/// Fixed retrieval query used for every compliance evaluation.
pub const UCP_COMPLIANCE_QUERY: &str =
    "UCP 600 rules for expiry date, shipment date, bill of lading, and document compliance";

#[derive(Error, Debug)]
pub enum ContextError {
    #[error("UCP index unavailable: {0}")]
    Unavailable(String),
    #[error("similarity search failed: {0}")]
    Search(String),
}

/// Read-only similarity search over a rulebook.
#[async_trait]
pub trait ContextProvider: Send + Sync {
    /// Up to `k` passages most relevant to `query`, best first.
    async fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<String>, ContextError>;
}

/// Best-matching passage for [`UCP_COMPLIANCE_QUERY`], truncated to the
/// configured length. Empty when there is no provider, no hit, or an error.
pub async fn compliance_context(
    provider: Option<&dyn ContextProvider>,
    limits: &ReviewLimits,
) -> String {
    let Some(provider) = provider else {
        debug!("no UCP context provider configured");
        return String::new();
    };
    match provider
        .similarity_search(UCP_COMPLIANCE_QUERY, limits.ucp_top_k)
        .await
    {
        Ok(passages) => passages
            .first()
            .map(|p| truncate_chars(p, limits.ucp_context_chars).to_string())
            .unwrap_or_default(),
        Err(e) => {
            warn!(error = %e, "UCP context unavailable, evaluating without it");
            String::new()
        }
    }
}

/// Top `k` passages for a free-text question, joined by blank lines.
/// Empty on error.
pub async fn question_context(
    provider: Option<&dyn ContextProvider>,
    question: &str,
    k: usize,
) -> String {
    let Some(provider) = provider else {
        return String::new();
    };
    match provider.similarity_search(question, k).await {
        Ok(passages) => passages.join("\n\n"),
        Err(e) => {
            warn!(error = %e, "UCP context unavailable for question");
            String::new()
        }
    }
}
