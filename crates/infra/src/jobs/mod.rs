//! Background execution of ERP jobs.
//!
//! [`JobQueue`] owns the worker pool and the per-job state machine,
//! [`JobRunner`] performs a single attempt, and a [`FailureSink`] receives
//! every job that ends in `FailedPermanently`.

mod queue;
mod runner;
mod sink;

pub use queue::{JobQueue, JobQueueOptions};
pub use runner::JobRunner;
pub use sink::{FailedJob, FailureSink, RecordingFailureSink, TracingFailureSink};
