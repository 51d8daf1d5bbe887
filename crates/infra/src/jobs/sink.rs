use std::time::Duration;

use parking_lot::Mutex;
use selfcare_core::{ErpJob, JobId};
use selfcare_domain::ErpError;
use serde::Serialize;
use tracing::error;

/// A job that ended in `FailedPermanently`, with everything needed to
/// reconcile it by hand.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedJob {
    pub id: JobId,
    pub job: ErpJob,
    pub attempts: u32,
    pub backoff_trail: Vec<Duration>,
    /// Either the non-retryable error or `AttemptsExhausted`.
    pub error: ErpError,
}

/// Receiver of permanently failed jobs.
///
/// Called once per failed job, from a queue worker. Implementations must not
/// block for long.
pub trait FailureSink: Send + Sync {
    fn job_failed(&self, failure: &FailedJob);
}

/// Reports failures as `error!` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingFailureSink;

impl FailureSink for TracingFailureSink {
    fn job_failed(&self, failure: &FailedJob) {
        match &failure.job {
            ErpJob::CreatePayment { user_id, payment } => error!(
                job_id = %failure.id,
                kind = %failure.job.kind(),
                user_id = %user_id,
                customer_id = %payment.customer_id,
                invoice_id = %payment.invoice_id,
                amount = %payment.amount,
                reference = %payment.reference,
                attempts = failure.attempts,
                error_type = failure.error.label(),
                error = %failure.error,
                "Payment job failed permanently; manual reconciliation required"
            ),
            job => error!(
                job_id = %failure.id,
                kind = %job.kind(),
                customer_id = %job.customer_id(),
                attempts = failure.attempts,
                error_type = failure.error.label(),
                error = %failure.error,
                "ERP job failed permanently"
            ),
        }
    }
}

/// Keeps failed jobs in memory.
#[derive(Debug, Default)]
pub struct RecordingFailureSink {
    failures: Mutex<Vec<FailedJob>>,
}

impl RecordingFailureSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failures(&self) -> Vec<FailedJob> {
        self.failures.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.failures.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.lock().is_empty()
    }
}

impl FailureSink for RecordingFailureSink {
    fn job_failed(&self, failure: &FailedJob) {
        self.failures.lock().push(failure.clone());
    }
}
