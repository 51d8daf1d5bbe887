use std::time::Duration;

use selfcare_domain::constants::{
    PAYMENT_JOB_BACKOFF_SECS, PAYMENT_JOB_MAX_ATTEMPTS, SYNC_JOB_BACKOFF_SECS,
    SYNC_JOB_MAX_ATTEMPTS,
};
use selfcare_domain::{ErpError, Result};

/// What to do after an attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum RetryDecision {
    /// The attempt succeeded.
    Done,
    /// Run again after the delay.
    Retry(Duration),
    /// Stop for good; the error is what the failure sink receives.
    GiveUp(ErpError),
}

/// Attempt budget plus backoff schedule.
///
/// The Nth retry waits the Nth schedule entry; past the end of the schedule
/// the last entry is reused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    schedule: Vec<Duration>,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, schedule: Vec<Duration>) -> Self {
        Self { max_attempts: max_attempts.max(1), schedule }
    }

    /// 5 attempts, waiting 60s/300s/900s/1800s/3600s.
    pub fn payment() -> Self {
        Self::from_secs(PAYMENT_JOB_MAX_ATTEMPTS, &PAYMENT_JOB_BACKOFF_SECS)
    }

    /// 3 attempts, waiting 60s/300s/900s.
    pub fn sync() -> Self {
        Self::from_secs(SYNC_JOB_MAX_ATTEMPTS, &SYNC_JOB_BACKOFF_SECS)
    }

    pub fn from_secs(max_attempts: u32, schedule: &[u64]) -> Self {
        Self::new(max_attempts, schedule.iter().copied().map(Duration::from_secs).collect())
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn schedule(&self) -> &[Duration] {
        &self.schedule
    }

    /// Wait before retry number `retry` (1-based).
    pub fn delay_for_retry(&self, retry: u32) -> Duration {
        let index = (retry.max(1) - 1) as usize;
        self.schedule
            .get(index)
            .or_else(|| self.schedule.last())
            .copied()
            .unwrap_or(Duration::ZERO)
    }

    /// Decide the follow-up to attempt number `attempt` (1-based).
    ///
    /// Only adapter errors are retried. Running out of attempts wraps the
    /// last error in `ErpError::AttemptsExhausted`.
    pub fn decide(&self, attempt: u32, outcome: &Result<()>) -> RetryDecision {
        match outcome {
            Ok(()) => RetryDecision::Done,
            Err(e) if !e.is_retryable() => RetryDecision::GiveUp(e.clone()),
            Err(e) if attempt >= self.max_attempts => {
                RetryDecision::GiveUp(ErpError::AttemptsExhausted {
                    attempts: attempt,
                    last_error: Box::new(e.clone()),
                })
            }
            Err(_) => RetryDecision::Retry(self.delay_for_retry(attempt)),
        }
    }
}
