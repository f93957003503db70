use std::time::Duration;

use kagami_config::translator::TranslatorConfig;
use kagami_core::{JobState, JobTicket};

use crate::backend::{ResponseEnvelope, TranslationBackend};
use crate::error::TranslateError;
use crate::request::TranslationRequest;

/// Fixed list of delays; one delay is consumed per retry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    backoffs: Vec<Duration>,
}

impl RetryPolicy {
    pub fn new(backoffs: Vec<Duration>) -> Self {
        Self { backoffs }
    }

    pub fn from_config(config: &TranslatorConfig) -> Self {
        Self::new(config.backoff_ms.iter().map(|ms| Duration::from_millis(*ms)).collect())
    }

    pub fn max_attempts(&self) -> usize {
        self.backoffs.len() + 1
    }

    /// Send `request`, retrying transport and 5xx failures.
    ///
    /// Liveness of `ticket` is checked before every attempt and cancellation
    /// interrupts both the request and the backoff sleep.
    pub async fn send(
        &self,
        backend: &dyn TranslationBackend,
        request: &TranslationRequest,
        ticket: &JobTicket,
    ) -> Result<ResponseEnvelope, TranslateError> {
        let mut attempt = 0;
        loop {
            if !ticket.is_live() {
                tracing::debug!("[RETRY] {} no longer live, not sending", ticket.id());
                return Err(TranslateError::Canceled);
            }
            attempt += 1;
            if attempt == 1 {
                ticket.set_state(JobState::InFlight);
            }

            let result = tokio::select! {
                _ = ticket.cancelled() => return Err(TranslateError::Canceled),
                result = backend.send(request) => result,
            };

            let err = match result {
                Ok(envelope) => return Ok(envelope),
                Err(err) => err,
            };
            let Some(delay) = self.backoffs.get(attempt - 1).copied().filter(|_| err.is_retryable()) else {
                return Err(err);
            };

            tracing::warn!(
                "[RETRY] {} attempt {}/{} failed ({}), retrying in {:?}",
                ticket.id(),
                attempt,
                self.max_attempts(),
                err.short(),
                delay
            );
            ticket.set_state(JobState::Retrying { attempt: attempt as u32 + 1 });
            tokio::select! {
                _ = ticket.cancelled() => return Err(TranslateError::Canceled),
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }
}
