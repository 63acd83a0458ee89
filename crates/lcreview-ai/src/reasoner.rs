//! The reasoning step: prompt in, free text out.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReasonerError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("response contained no completion")]
    EmptyResponse,
    #[error("no reply within {0:?}")]
    Timeout(Duration),
}

impl ReasonerError {
    /// Failures worth one more attempt: timeouts, transport errors,
    /// rate limiting, and server-side errors.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Self::Server { status, .. } => *status == 429 || *status >= 500,
            Self::Timeout(_) => true,
            Self::Json(_) | Self::EmptyResponse => false,
        }
    }
}

/// A generative text model.
///
/// Responses carry no structural guarantee; callers parse them and fall
/// back on their own.
#[async_trait]
pub trait Reasoner: Send + Sync {
    async fn invoke(&self, prompt: &str) -> Result<String, ReasonerError>;
}

#[async_trait]
impl<R: Reasoner + ?Sized> Reasoner for Arc<R> {
    async fn invoke(&self, prompt: &str) -> Result<String, ReasonerError> {
        (**self).invoke(prompt).await
    }
}
