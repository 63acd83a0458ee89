//! Scripted collaborators for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::context::{ContextError, ContextProvider};
use crate::reasoner::{Reasoner, ReasonerError};

/// Replays canned responses in order and records every prompt.
///
/// Once the script runs out, every call returns `EmptyResponse`.
pub struct ScriptedReasoner {
    script: Mutex<VecDeque<Result<String, ReasonerError>>>,
    prompts: Mutex<Vec<String>>,
    calls: AtomicUsize,
    first_delay: Option<Duration>,
}

impl ScriptedReasoner {
    pub fn new(script: Vec<Result<String, ReasonerError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            first_delay: None,
        }
    }

    /// Answer with each of `texts` in turn.
    pub fn replies(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| Ok(t.to_string())).collect())
    }

    pub fn with_first_delay(mut self, delay: Duration) -> Self {
        self.first_delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Reasoner for ScriptedReasoner {
    async fn invoke(&self, prompt: &str) -> Result<String, ReasonerError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        let next = self.script.lock().unwrap().pop_front();
        if call == 0
            && let Some(delay) = self.first_delay
        {
            tokio::time::sleep(delay).await;
        }
        next.unwrap_or(Err(ReasonerError::EmptyResponse))
    }
}

/// Context provider returning fixed passages, or failing.
pub struct FixedContext {
    pub passages: Result<Vec<String>, String>,
    pub queries: Mutex<Vec<(String, usize)>>,
}

impl FixedContext {
    pub fn passages(passages: &[&str]) -> Self {
        Self {
            passages: Ok(passages.iter().map(|p| p.to_string()).collect()),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            passages: Err(message.to_string()),
            queries: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ContextProvider for FixedContext {
    async fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<String>, ContextError> {
        self.queries.lock().unwrap().push((query.to_string(), k));
        match &self.passages {
            Ok(p) => Ok(p.iter().take(k).cloned().collect()),
            Err(m) => Err(ContextError::Unavailable(m.clone())),
        }
    }
}
