//! Background ERP jobs
//!
//! The pure half of the job subsystem: what a job is, how it moves through
//! its states, and when it is retried. Scheduling and execution live in
//! `selfcare-infra`.

mod job;
mod policy;
mod state;

pub use job::{ErpJob, JobId, JobKind};
pub use policy::{RetryDecision, RetryPolicy};
pub use state::{JobSnapshot, JobState};
