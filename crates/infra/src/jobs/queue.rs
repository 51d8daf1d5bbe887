//! Worker pool for ERP jobs.
//!
//! Jobs are submitted fire-and-forget and picked up by a fixed number of
//! tokio workers sharing one channel. Each attempt is bounded by the attempt
//! timeout; an expired attempt counts as a transient adapter failure. A job
//! that must retry is handed to a timer task which puts it back on the channel
//! at its deadline, so no worker ever sleeps through a backoff.
//!
//! Every job has a [`JobSnapshot`] published through a `watch` channel. That
//! is what [`JobQueue::status`], [`JobQueue::wait_for_terminal`] and
//! [`JobQueue::cancel`] operate on. Cancellation is honoured between attempts
//! only; an attempt already running completes.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use rust_decimal::Decimal;
//! use selfcare_domain::{ErpConfig, PaymentMethod};
//! use selfcare_infra::jobs::{JobQueue, JobQueueOptions, JobRunner, TracingFailureSink};
//! use selfcare_infra::registry::ProviderRegistry;
//! use selfcare_infra::services::{ErpReadCache, ErpService};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = Arc::new(ProviderRegistry::new(ErpConfig::default()));
//! let runner = JobRunner::new(ErpService::new(registry, ErpReadCache::default()));
//! let mut queue =
//!     JobQueue::new(runner, Arc::new(TracingFailureSink), JobQueueOptions::default());
//!
//! queue.start().await?;
//! let id = queue.enqueue_payment_creation(
//!     "user-1",
//!     "CUST-1",
//!     "INV-9",
//!     Decimal::new(4500, 2),
//!     PaymentMethod::Card,
//!     "PAY-REF-1",
//! )?;
//! let finished = queue.wait_for_terminal(id).await;
//! queue.stop().await?;
//! # let _ = finished;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use dashmap::DashMap;
use rust_decimal::Decimal;
use selfcare_core::{ErpJob, JobId, JobSnapshot, JobState, RetryDecision, RetryPolicy};
use selfcare_domain::constants::{
    DEFAULT_ATTEMPT_TIMEOUT_SECS, DEFAULT_JOB_WORKERS, DEFAULT_JOIN_TIMEOUT_SECS,
};
use selfcare_domain::{
    AdapterErrorKind, ErpError, InvoiceFilters, JobQueueConfig, Payment, PaymentMethod, Result,
};
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use super::runner::JobRunner;
use super::sink::{FailedJob, FailureSink};

/// Queue sizing and timeouts.
#[derive(Debug, Clone)]
pub struct JobQueueOptions {
    /// Number of concurrent workers
    pub workers: usize,
    /// Upper bound for a single attempt
    pub attempt_timeout: Duration,
    /// Join timeout when stopping
    pub join_timeout: Duration,
}

impl Default for JobQueueOptions {
    fn default() -> Self {
        Self {
            workers: DEFAULT_JOB_WORKERS,
            attempt_timeout: Duration::from_secs(DEFAULT_ATTEMPT_TIMEOUT_SECS),
            join_timeout: Duration::from_secs(DEFAULT_JOIN_TIMEOUT_SECS),
        }
    }
}

impl From<&JobQueueConfig> for JobQueueOptions {
    fn from(config: &JobQueueConfig) -> Self {
        Self {
            workers: config.workers,
            attempt_timeout: Duration::from_secs(config.attempt_timeout_secs),
            ..Self::default()
        }
    }
}

struct TrackedJob {
    job: ErpJob,
    policy: RetryPolicy,
    state: watch::Sender<JobSnapshot>,
}

/// State shared by the queue handle, its workers and retry timers.
struct Shared {
    runner: JobRunner,
    sink: Arc<dyn FailureSink>,
    jobs: DashMap<JobId, Arc<TrackedJob>>,
    sender: mpsc::UnboundedSender<JobId>,
    attempt_timeout: Duration,
}

/// Retrying job queue with explicit lifecycle management.
///
/// Finished jobs stay tracked, so their snapshots remain available to
/// [`JobQueue::status`], until [`JobQueue::remove_finished`] drops them.
/// Long-running embedders should call it periodically; the queue never
/// evicts on its own.
pub struct JobQueue {
    shared: Arc<Shared>,
    receiver: Arc<Mutex<mpsc::UnboundedReceiver<JobId>>>,
    options: JobQueueOptions,
    cancellation: CancellationToken,
    task_handles: Vec<JoinHandle<()>>,
}

impl JobQueue {
    /// Create a stopped queue. Jobs enqueued before [`JobQueue::start`] wait
    /// in the channel.
    pub fn new(runner: JobRunner, sink: Arc<dyn FailureSink>, options: JobQueueOptions) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            shared: Arc::new(Shared {
                runner,
                sink,
                jobs: DashMap::new(),
                sender,
                attempt_timeout: options.attempt_timeout,
            }),
            receiver: Arc::new(Mutex::new(receiver)),
            options,
            cancellation: CancellationToken::new(),
            task_handles: Vec::new(),
        }
    }

    /// Spawn the worker tasks.
    #[instrument(skip(self))]
    pub async fn start(&mut self) -> std::result::Result<(), String> {
        if self.is_running() {
            return Err("Job queue already running".to_string());
        }

        // Create fresh cancellation token
        self.cancellation = CancellationToken::new();

        let workers = self.options.workers.max(1);
        for worker in 0..workers {
            let shared = Arc::clone(&self.shared);
            let receiver = Arc::clone(&self.receiver);
            let cancel = self.cancellation.clone();
            self.task_handles.push(tokio::spawn(async move {
                worker_loop(worker, shared, receiver, cancel).await;
            }));
        }

        info!(workers, "Job queue started");
        Ok(())
    }

    /// Stop the workers and wait for them to finish.
    ///
    /// Jobs waiting in the channel, and retry timers still pending, are kept
    /// and resume on the next [`JobQueue::start`].
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> std::result::Result<(), String> {
        if !self.is_running() {
            return Err("Job queue not running".to_string());
        }

        info!("Stopping job queue");
        self.cancellation.cancel();

        let mut outcome = Ok(());
        for handle in self.task_handles.drain(..) {
            match tokio::time::timeout(self.options.join_timeout, handle).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    warn!("Job worker panicked: {}", e);
                    outcome = Err("Job worker panicked".to_string());
                }
                Err(_) => {
                    warn!("Job worker did not complete within timeout");
                    outcome = Err("Job worker timeout".to_string());
                }
            }
        }

        self.cancellation = CancellationToken::new();
        info!("Job queue stopped");
        outcome
    }

    pub fn is_running(&self) -> bool {
        !self.task_handles.is_empty()
    }

    /// Submit a job. Never blocks.
    pub fn enqueue(&self, job: ErpJob) -> JobId {
        let id = JobId::new();
        let kind = job.kind();
        let snapshot = JobSnapshot::new(id, &job, Utc::now());
        let (state, _) = watch::channel(snapshot);
        let policy = job.retry_policy();
        self.shared.jobs.insert(id, Arc::new(TrackedJob { job, policy, state }));

        // The queue owns the receiver, so the channel cannot be closed here.
        if self.shared.sender.send(id).is_err() {
            warn!(job_id = %id, "Job channel closed; job will not run");
        }
        info!(job_id = %id, %kind, "Enqueued ERP job");
        id
    }

    /// Submit a payment for creation in the ERP.
    ///
    /// `reference` is the idempotency token passed unchanged on every
    /// attempt.
    ///
    /// # Errors
    /// `ErpError::MalformedPayload` when an identifier or the reference is
    /// blank, or the amount is not positive. Nothing is queued in that case.
    pub fn enqueue_payment_creation(
        &self,
        user_id: &str,
        customer_id: &str,
        invoice_id: &str,
        amount: Decimal,
        method: PaymentMethod,
        reference: &str,
    ) -> Result<JobId> {
        for (field, value) in
            [("customer_id", customer_id), ("invoice_id", invoice_id), ("reference", reference)]
        {
            if value.trim().is_empty() {
                return Err(ErpError::malformed(format!("payment {field} is required")));
            }
        }
        if amount <= Decimal::ZERO {
            return Err(ErpError::malformed(format!("payment amount must be positive, got {amount}")));
        }

        let payment = Payment::new(
            customer_id,
            invoice_id,
            amount,
            method,
            reference,
            Utc::now().date_naive(),
        );
        Ok(self.enqueue(ErpJob::CreatePayment { user_id: user_id.to_string(), payment }))
    }

    pub fn enqueue_customer_sync(&self, customer_id: &str) -> JobId {
        self.enqueue(ErpJob::SyncCustomer { customer_id: customer_id.to_string() })
    }

    pub fn enqueue_invoice_sync(&self, customer_id: &str, filters: InvoiceFilters) -> JobId {
        self.enqueue(ErpJob::SyncInvoices { customer_id: customer_id.to_string(), filters })
    }

    /// Current snapshot of a job, if the queue knows it.
    pub fn status(&self, id: JobId) -> Option<JobSnapshot> {
        self.shared.jobs.get(&id).map(|tracked| tracked.state.borrow().clone())
    }

    /// Follow a job's snapshots as they change.
    pub fn subscribe(&self, id: JobId) -> Option<watch::Receiver<JobSnapshot>> {
        self.shared.jobs.get(&id).map(|tracked| tracked.state.subscribe())
    }

    /// Wait until the job is `Succeeded`, `FailedPermanently` or `Cancelled`.
    ///
    /// Returns `None` for unknown jobs, or when the job is removed before
    /// finishing.
    pub async fn wait_for_terminal(&self, id: JobId) -> Option<JobSnapshot> {
        let mut receiver = self.subscribe(id)?;
        let snapshot = receiver.wait_for(|snapshot| snapshot.state.is_terminal()).await.ok()?.clone();
        Some(snapshot)
    }

    /// Cancel a job that is pending or waiting for a retry.
    ///
    /// Returns false when the job is unknown, running, or already finished.
    pub fn cancel(&self, id: JobId) -> bool {
        let Some(tracked) = self.shared.jobs.get(&id).map(|entry| Arc::clone(entry.value())) else {
            return false;
        };
        let cancelled = tracked.state.send_if_modified(|snapshot| snapshot.cancel(Utc::now()));
        if cancelled {
            info!(job_id = %id, "Cancelled ERP job");
        }
        cancelled
    }

    /// Forget every finished job. Returns how many were dropped.
    pub fn remove_finished(&self) -> usize {
        let before = self.shared.jobs.len();
        self.shared.jobs.retain(|_, tracked| !tracked.state.borrow().state.is_terminal());
        before - self.shared.jobs.len()
    }

    /// Number of jobs the queue is tracking, finished ones included.
    pub fn job_count(&self) -> usize {
        self.shared.jobs.len()
    }
}

impl Drop for JobQueue {
    fn drop(&mut self) {
        if self.is_running() {
            warn!("JobQueue dropped while running; cancelling workers");
            self.cancellation.cancel();
        }
    }
}

async fn worker_loop(
    worker: usize,
    shared: Arc<Shared>,
    receiver: Arc<Mutex<mpsc::UnboundedReceiver<JobId>>>,
    cancel: CancellationToken,
) {
    loop {
        let next = tokio::select! {
            _ = cancel.cancelled() => {
                debug!(worker, "Job worker cancelled");
                break;
            }
            next = async { receiver.lock().await.recv().await } => next,
        };
        match next {
            Some(id) => shared.process(id).await,
            None => break,
        }
    }
}

impl Shared {
    /// Run one attempt of `id` and act on the retry decision.
    async fn process(self: &Arc<Self>, id: JobId) {
        let Some(tracked) = self.jobs.get(&id).map(|entry| Arc::clone(entry.value())) else {
            debug!(job_id = %id, "Dequeued job that is no longer tracked");
            return;
        };

        let mut attempt = 0;
        let started = tracked.state.send_if_modified(|snapshot| {
            if !snapshot.state.is_cancellable() {
                return false;
            }
            attempt = snapshot.begin_attempt(Utc::now());
            true
        });
        if !started {
            debug!(job_id = %id, "Skipping job that is no longer runnable");
            return;
        }

        let kind = tracked.job.kind();
        debug!(job_id = %id, %kind, attempt, "Running ERP job");
        let outcome =
            match tokio::time::timeout(self.attempt_timeout, self.runner.run(&tracked.job)).await {
                Ok(outcome) => outcome,
                Err(_) => Err(ErpError::adapter(
                    AdapterErrorKind::NetworkTimeout,
                    format!("attempt exceeded {}s", self.attempt_timeout.as_secs()),
                )),
            };

        // Nothing else writes a running job's snapshot, so settling a copy
        // and publishing it afterwards loses no update.
        let mut settled = tracked.state.borrow().clone();
        let decision = settled.settle(&tracked.policy, &outcome, Utc::now());

        // The failure sink sees a permanent failure before any waiter does.
        if let RetryDecision::GiveUp(error) = &decision {
            self.sink.job_failed(&FailedJob {
                id,
                job: tracked.job.clone(),
                attempts: settled.attempts,
                backoff_trail: settled.backoff_trail.clone(),
                error: error.clone(),
            });
        }
        tracked.state.send_replace(settled);

        match decision {
            RetryDecision::Done => info!(job_id = %id, %kind, attempt, "ERP job succeeded"),
            RetryDecision::Retry(delay) => {
                warn!(
                    job_id = %id,
                    %kind,
                    attempt,
                    retry_in_secs = delay.as_secs(),
                    error = ?outcome.as_ref().err(),
                    "ERP job attempt failed; retry scheduled"
                );
                self.schedule_retry(id, delay);
            }
            RetryDecision::GiveUp(error) => {
                debug!(job_id = %id, %kind, attempt, error = %error, "ERP job failed permanently");
            }
        }
    }

    fn schedule_retry(self: &Arc<Self>, id: JobId, delay: Duration) {
        let shared = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            shared.resubmit(id);
        });
    }

    fn resubmit(&self, id: JobId) {
        let waiting = self
            .jobs
            .get(&id)
            .is_some_and(|tracked| tracked.state.borrow().state == JobState::Retrying);
        if !waiting {
            debug!(job_id = %id, "Retry timer fired for a job that is no longer waiting");
            return;
        }
        if self.sender.send(id).is_err() {
            warn!(job_id = %id, "Job channel closed; retry dropped");
        }
    }
}
