//! Reasoning layer for LC review: the chat-completions client, field
//! extraction, discrepancy comparison, compliance evaluation, and the
//! pipeline that sequences them. ONNX embeddings for the UCP index live
//! behind the `onnx` feature.

pub mod assistant;
pub mod chat;
pub mod compare;
pub mod compliance;
pub mod context;
#[cfg(feature = "onnx")]
mod embedder;
pub mod extract;
pub mod pipeline;
pub mod prompts;
pub mod reasoner;
pub mod resilient;
#[cfg(test)]
mod testing;

pub use assistant::{QUESTION_TOP_K, UcpAssistant};
pub use chat::{ChatClient, ChatConfig};
pub use compare::DiscrepancyComparator;
pub use compliance::ComplianceEvaluator;
pub use context::{ContextError, ContextProvider, UCP_COMPLIANCE_QUERY};
#[cfg(feature = "onnx")]
pub use embedder::Embedder;
pub use extract::FieldExtractor;
pub use pipeline::{ReviewPipeline, ReviewReport, TextSource};
pub use reasoner::{Reasoner, ReasonerError};
pub use resilient::{DEFAULT_TIMEOUT, Resilient};
