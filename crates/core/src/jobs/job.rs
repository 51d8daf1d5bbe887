use std::fmt;

use selfcare_domain::{impl_domain_status_conversions, InvoiceFilters, Payment};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::RetryPolicy;

/// Identifier handed back when a job is enqueued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Job category, used for logging and policy selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    PaymentCreation,
    CustomerSync,
    InvoiceSync,
}

impl_domain_status_conversions!(JobKind {
    PaymentCreation => "payment_creation",
    CustomerSync => "customer_sync",
    InvoiceSync => "invoice_sync",
});

/// A unit of work against the ERP.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ErpJob {
    /// Submit a payment; on success the customer's invoice listings are
    /// dropped from the read cache.
    CreatePayment { user_id: String, payment: Payment },
    /// Ask the ERP to refresh a customer, then re-read it into the cache.
    SyncCustomer { customer_id: String },
    /// Re-read a customer's invoice listing into the cache.
    SyncInvoices { customer_id: String, filters: InvoiceFilters },
}

impl ErpJob {
    pub fn kind(&self) -> JobKind {
        match self {
            Self::CreatePayment { .. } => JobKind::PaymentCreation,
            Self::SyncCustomer { .. } => JobKind::CustomerSync,
            Self::SyncInvoices { .. } => JobKind::InvoiceSync,
        }
    }

    /// Customer the job concerns.
    pub fn customer_id(&self) -> &str {
        match self {
            Self::CreatePayment { payment, .. } => &payment.customer_id,
            Self::SyncCustomer { customer_id } | Self::SyncInvoices { customer_id, .. } => {
                customer_id
            }
        }
    }

    /// Retry budget for this kind of job.
    pub fn retry_policy(&self) -> RetryPolicy {
        match self.kind() {
            JobKind::PaymentCreation => RetryPolicy::payment(),
            JobKind::CustomerSync | JobKind::InvoiceSync => RetryPolicy::sync(),
        }
    }
}
