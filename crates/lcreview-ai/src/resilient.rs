//! Timeout and retry around a [`Reasoner`].

use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use crate::reasoner::{Reasoner, ReasonerError};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Bounds each call with a timeout and retries transient failures.
///
/// Defaults to a single retry. Non-transient errors are returned at once.
pub struct Resilient<R> {
    inner: R,
    timeout: Duration,
    retries: u32,
}

impl<R: Reasoner> Resilient<R> {
    pub fn new(inner: R, timeout: Duration) -> Self {
        Self {
            inner,
            timeout,
            retries: 1,
        }
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }
}

#[async_trait]
impl<R: Reasoner> Reasoner for Resilient<R> {
    async fn invoke(&self, prompt: &str) -> Result<String, ReasonerError> {
        let mut attempt = 0;
        loop {
            let result = match tokio::time::timeout(self.timeout, self.inner.invoke(prompt)).await {
                Ok(r) => r,
                Err(_) => Err(ReasonerError::Timeout(self.timeout)),
            };
            match result {
                Err(e) if e.is_transient() && attempt < self.retries => {
                    attempt += 1;
                    warn!(error = %e, attempt, "reasoning call failed, retrying");
                }
                other => return other,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedReasoner;

    fn server(status: u16) -> ReasonerError {
        ReasonerError::Server {
            status,
            body: String::new(),
        }
    }

    #[tokio::test]
    async fn retries_once_on_transient() {
        let inner = ScriptedReasoner::new(vec![Err(server(503)), Ok("ok".into())]);
        let r = Resilient::new(inner, Duration::from_secs(5));
        assert_eq!(r.invoke("p").await.unwrap(), "ok");
        assert_eq!(r.inner.calls(), 2);
    }

    #[tokio::test]
    async fn gives_up_after_retry_budget() {
        let inner =
            ScriptedReasoner::new(vec![Err(server(503)), Err(server(502)), Ok("late".into())]);
        let r = Resilient::new(inner, Duration::from_secs(5));
        let err = r.invoke("p").await.unwrap_err();
        assert!(matches!(err, ReasonerError::Server { status: 502, .. }));
        assert_eq!(r.inner.calls(), 2);
    }

    #[tokio::test]
    async fn permanent_errors_not_retried() {
        let inner = ScriptedReasoner::new(vec![Err(server(401)), Ok("unused".into())]);
        let r = Resilient::new(inner, Duration::from_secs(5));
        assert!(r.invoke("p").await.is_err());
        assert_eq!(r.inner.calls(), 1);
    }

    #[tokio::test]
    async fn slow_call_times_out_then_retries() {
        let inner = ScriptedReasoner::new(vec![Ok("slow".into()), Ok("fast".into())])
            .with_first_delay(Duration::from_secs(5));
        let r = Resilient::new(inner, Duration::from_millis(50));
        assert_eq!(r.invoke("p").await.unwrap(), "fast");
    }

    #[tokio::test]
    async fn zero_retries() {
        let inner = ScriptedReasoner::new(vec![Err(server(500)), Ok("unused".into())]);
        let r = Resilient::new(inner, Duration::from_secs(5)).with_retries(0);
        assert!(r.invoke("p").await.is_err());
        assert_eq!(r.inner.calls(), 1);
    }
}
