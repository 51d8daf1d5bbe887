use std::time::Duration;

use chrono::{DateTime, Utc};
use selfcare_domain::{impl_domain_status_conversions, ErpError, Result};
use serde::{Deserialize, Serialize};

use super::{ErpJob, JobId, JobKind, RetryDecision, RetryPolicy};

/// Lifecycle of a job.
///
/// `Pending → Running → {Succeeded | Retrying → Running | FailedPermanently}`,
/// plus `Cancelled` from `Pending` or `Retrying`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Pending,
    Running,
    Retrying,
    Succeeded,
    FailedPermanently,
    Cancelled,
}

impl_domain_status_conversions!(JobState {
    Pending => "pending",
    Running => "running",
    Retrying => "retrying",
    Succeeded => "succeeded",
    FailedPermanently => "failed_permanently",
    Cancelled => "cancelled",
});

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::FailedPermanently | Self::Cancelled)
    }

    /// Cancellation only lands between attempts.
    pub fn is_cancellable(self) -> bool {
        matches!(self, Self::Pending | Self::Retrying)
    }
}

/// Observable record of one job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSnapshot {
    pub id: JobId,
    pub kind: JobKind,
    pub customer_id: String,
    pub state: JobState,
    /// Attempts started so far.
    pub attempts: u32,
    /// Schedule entry recorded after each retryable failure, including the
    /// one that exhausted the budget.
    pub backoff_trail: Vec<Duration>,
    pub last_error: Option<ErpError>,
    pub enqueued_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JobSnapshot {
    pub fn new(id: JobId, job: &ErpJob, now: DateTime<Utc>) -> Self {
        Self {
            id,
            kind: job.kind(),
            customer_id: job.customer_id().to_string(),
            state: JobState::Pending,
            attempts: 0,
            backoff_trail: Vec::new(),
            last_error: None,
            enqueued_at: now,
            updated_at: now,
        }
    }

    /// Enter `Running` and count the attempt. Returns the attempt number.
    pub fn begin_attempt(&mut self, now: DateTime<Utc>) -> u32 {
        self.attempts += 1;
        self.state = JobState::Running;
        self.updated_at = now;
        self.attempts
    }

    /// Apply the outcome of the current attempt and return the decision.
    pub fn settle(
        &mut self,
        policy: &RetryPolicy,
        outcome: &Result<()>,
        now: DateTime<Utc>,
    ) -> RetryDecision {
        let decision = policy.decide(self.attempts, outcome);
        if let Err(e) = outcome {
            if e.is_retryable() {
                self.backoff_trail.push(policy.delay_for_retry(self.attempts));
            }
            self.last_error = Some(e.clone());
        }
        self.state = match &decision {
            RetryDecision::Done => JobState::Succeeded,
            RetryDecision::Retry(_) => JobState::Retrying,
            RetryDecision::GiveUp(_) => JobState::FailedPermanently,
        };
        self.updated_at = now;
        decision
    }

    /// Mark cancelled. Returns false when the job is running or finished.
    pub fn cancel(&mut self, now: DateTime<Utc>) -> bool {
        if !self.state.is_cancellable() {
            return false;
        }
        self.state = JobState::Cancelled;
        self.updated_at = now;
        true
    }
}

#[cfg(test)]
mod tests {
    use selfcare_domain::{AdapterErrorKind, InvoiceFilters};

    use super::*;

    fn snapshot() -> JobSnapshot {
        let job = ErpJob::SyncInvoices {
            customer_id: "CUST-1".into(),
            filters: InvoiceFilters::new(),
        };
        JobSnapshot::new(JobId::new(), &job, Utc::now())
    }

    #[test]
    fn always_failing_payment_records_full_schedule() {
        let policy = RetryPolicy::payment();
        let mut job = snapshot();
        let transient = Err(ErpError::adapter(AdapterErrorKind::NetworkTimeout, "timed out"));

        loop {
            job.begin_attempt(Utc::now());
            match job.settle(&policy, &transient, Utc::now()) {
                RetryDecision::Retry(_) => assert_eq!(job.state, JobState::Retrying),
                RetryDecision::GiveUp(_) => break,
                RetryDecision::Done => panic!("cannot succeed"),
            }
        }

        assert_eq!(job.attempts, 5);
        assert_eq!(job.state, JobState::FailedPermanently);
        let secs: Vec<u64> = job.backoff_trail.iter().map(Duration::as_secs).collect();
        assert_eq!(secs, [60, 300, 900, 1800, 3600]);
    }

    #[test]
    fn malformed_payload_fails_after_one_attempt() {
        let policy = RetryPolicy::payment();
        let mut job = snapshot();
        job.begin_attempt(Utc::now());
        let decision = job.settle(&policy, &Err(ErpError::malformed("bad")), Utc::now());

        assert!(matches!(decision, RetryDecision::GiveUp(ErpError::MalformedPayload { .. })));
        assert_eq!(job.attempts, 1);
        assert_eq!(job.state, JobState::FailedPermanently);
        assert!(job.backoff_trail.is_empty());
    }

    #[test]
    fn cancel_only_between_attempts() {
        let mut job = snapshot();
        job.begin_attempt(Utc::now());
        assert!(!job.cancel(Utc::now()));

        job.settle(
            &RetryPolicy::sync(),
            &Err(ErpError::adapter(AdapterErrorKind::NetworkOffline, "down")),
            Utc::now(),
        );
        assert!(job.cancel(Utc::now()));
        assert_eq!(job.state, JobState::Cancelled);
        assert!(job.state.is_terminal());
    }
}
