//! ERP adapter port
//!
//! One trait covers every capability the portal needs from an ERP. The live
//! ERPNext client and the in-memory mock both implement it, and callers only
//! ever hold an `Arc<dyn ErpAdapter>`.

use async_trait::async_trait;
use rust_decimal::Decimal;
use selfcare_domain::{
    Customer, InvoiceFilters, Invoice, Payment, PaymentStatus, ProviderKind, Result,
};

/// Capability set of an ERP backend.
///
/// Transport failures surface as `ErpError::Adapter` and bad response shapes
/// as `ErpError::MalformedPayload`, so the job runner can tell a retryable
/// failure from a permanent one. Implementations must be safe to call from
/// several workers at once.
#[async_trait]
pub trait ErpAdapter: Send + Sync {
    /// Which provider this adapter talks to.
    fn provider(&self) -> ProviderKind;

    /// Establish (or verify) credentials with the ERP.
    async fn authenticate(&self) -> Result<bool>;

    /// Whether the last authentication attempt succeeded.
    fn is_authenticated(&self) -> bool;

    /// Look up one customer; `None` when the ERP has no such record.
    async fn get_customer(&self, customer_id: &str) -> Result<Option<Customer>>;

    /// Current outstanding balance as computed by the ERP.
    async fn get_customer_balance(&self, customer_id: &str) -> Result<Decimal>;

    /// Free-text customer search over id and name.
    async fn search_customers(&self, query: &str) -> Result<Vec<Customer>>;

    async fn get_customer_invoices(
        &self,
        customer_id: &str,
        filters: &InvoiceFilters,
    ) -> Result<Vec<Invoice>>;

    async fn get_invoice(&self, invoice_id: &str) -> Result<Option<Invoice>>;

    /// Rendered invoice document; `None` when the ERP has no such invoice.
    async fn get_invoice_pdf(&self, invoice_id: &str) -> Result<Option<Vec<u8>>>;

    /// Submit a payment. The ERP de-duplicates on `payment.reference`.
    async fn create_payment(&self, payment: &Payment) -> Result<bool>;

    async fn get_payment_status(&self, payment_id: &str) -> Result<Option<PaymentStatus>>;

    /// Payments recorded against a customer, newest first.
    async fn get_payment_history(&self, customer_id: &str) -> Result<Vec<Payment>>;

    /// Ask the ERP to refresh derived customer data.
    async fn sync_customer_data(&self, customer_id: &str) -> Result<bool>;
}
