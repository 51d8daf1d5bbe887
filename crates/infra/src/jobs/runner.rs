use selfcare_core::ErpJob;
use selfcare_domain::{AdapterErrorKind, ErpError, InvoiceFilters, Payment, Result};
use tracing::{debug, info, warn};

use crate::services::ErpService;

/// Runs one attempt of a job against the default provider.
///
/// Knows nothing about retries: the outcome goes back to the queue, which
/// consults the job's retry policy.
#[derive(Clone)]
pub struct JobRunner {
    service: ErpService,
}

impl JobRunner {
    pub fn new(service: ErpService) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &ErpService {
        &self.service
    }

    pub async fn run(&self, job: &ErpJob) -> Result<()> {
        match job {
            ErpJob::CreatePayment { user_id, payment } => self.create_payment(user_id, payment).await,
            ErpJob::SyncCustomer { customer_id } => self.sync_customer(customer_id).await,
            ErpJob::SyncInvoices { customer_id, filters } => {
                self.sync_invoices(customer_id, filters).await
            }
        }
    }

    async fn create_payment(&self, user_id: &str, payment: &Payment) -> Result<()> {
        let adapter = self.service.registry().driver(None)?;
        if !adapter.create_payment(payment).await? {
            return Err(ErpError::adapter(
                AdapterErrorKind::Unknown,
                format!("payment {} was not acknowledged", payment.reference),
            ));
        }

        let removed = self.service.cache().invalidate_invoices(&payment.customer_id);
        info!(
            user_id,
            customer_id = %payment.customer_id,
            invoice_id = %payment.invoice_id,
            reference = %payment.reference,
            amount = %payment.amount,
            invalidated = removed,
            "Payment recorded in ERP"
        );
        Ok(())
    }

    async fn sync_customer(&self, customer_id: &str) -> Result<()> {
        let adapter = self.service.registry().driver(None)?;
        if adapter.sync_customer_data(customer_id).await? {
            self.service.refresh_customer(customer_id).await?;
            debug!(customer_id, "Customer synchronised");
        } else {
            self.service.cache().invalidate_customer(customer_id);
            warn!(customer_id, "ERP has no record of customer; evicted from cache");
        }
        Ok(())
    }

    async fn sync_invoices(&self, customer_id: &str, filters: &InvoiceFilters) -> Result<()> {
        let invoices = self.service.refresh_invoices(customer_id, filters).await?;
        debug!(customer_id, count = invoices.len(), "Invoices synchronised");
        Ok(())
    }
}
