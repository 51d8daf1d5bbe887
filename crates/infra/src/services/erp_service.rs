//! Read facade over the configured ERP provider.
//!
//! Resolves the adapter through the [`ProviderRegistry`] on every call, so a
//! registry reset takes effect immediately, and fronts the two hot reads with
//! the shared [`ErpReadCache`].
//!
//! # Caching Strategy
//!
//! - **Read-through**: `get_customer` and `get_customer_invoices` check the
//!   cache first, call the adapter on miss, and populate the cache
//! - **Misses are not negative results**: a customer the ERP does not know is
//!   never cached
//! - **Invalidation on write**: a successful payment drops the customer's
//!   invoice listings (see the job runner); the customer entry is left to
//!   expire
//! - **Refresh**: sync jobs call `refresh_*`, which bypass the cache read and
//!   overwrite the entry
//!
//! Every other adapter read is passed through uncached.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use selfcare_domain::{ErpConfig, InvoiceFilters};
//! use selfcare_infra::registry::ProviderRegistry;
//! use selfcare_infra::services::{ErpReadCache, ErpService};
//!
//! # async fn example() -> selfcare_domain::Result<()> {
//! let registry = Arc::new(ProviderRegistry::new(ErpConfig::default()));
//! let service = ErpService::new(registry, ErpReadCache::default());
//!
//! let unpaid = InvoiceFilters::new().with("status", "unpaid");
//! let invoices = service.get_customer_invoices("CUST-1", &unpaid).await?;
//! # let _ = invoices;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use rust_decimal::Decimal;
use selfcare_core::ErpAdapter;
use selfcare_domain::{Customer, Invoice, InvoiceFilters, Payment, PaymentStatus, Result};
use tracing::{debug, instrument};

use super::read_cache::ErpReadCache;
use crate::registry::ProviderRegistry;

/// Cached read access to the default ERP provider.
#[derive(Clone)]
pub struct ErpService {
    registry: Arc<ProviderRegistry>,
    cache: ErpReadCache,
}

impl ErpService {
    pub fn new(registry: Arc<ProviderRegistry>, cache: ErpReadCache) -> Self {
        Self { registry, cache }
    }

    pub fn registry(&self) -> &Arc<ProviderRegistry> {
        &self.registry
    }

    pub fn cache(&self) -> &ErpReadCache {
        &self.cache
    }

    fn adapter(&self) -> Result<Arc<dyn ErpAdapter>> {
        self.registry.driver(None)
    }

    /// Look up a customer (cached).
    ///
    /// Returns `Ok(None)` when the ERP has no such customer.
    #[instrument(skip(self))]
    pub async fn get_customer(&self, customer_id: &str) -> Result<Option<Customer>> {
        if let Some(customer) = self.cache.customer(customer_id) {
            debug!(customer_id, "Customer served from cache");
            return Ok(Some(customer));
        }
        self.refresh_customer(customer_id).await
    }

    /// List a customer's invoices (cached per filter set).
    #[instrument(skip(self, filters))]
    pub async fn get_customer_invoices(
        &self,
        customer_id: &str,
        filters: &InvoiceFilters,
    ) -> Result<Vec<Invoice>> {
        if let Some(invoices) = self.cache.invoices(customer_id, filters) {
            debug!(customer_id, count = invoices.len(), "Invoices served from cache");
            return Ok(invoices);
        }
        self.refresh_invoices(customer_id, filters).await
    }

    /// Fetch a customer from the ERP and overwrite the cache entry.
    ///
    /// A customer that no longer exists is evicted.
    #[instrument(skip(self))]
    pub async fn refresh_customer(&self, customer_id: &str) -> Result<Option<Customer>> {
        let customer = self.adapter()?.get_customer(customer_id).await?;
        match &customer {
            Some(customer) => self.cache.put_customer(customer),
            None => {
                self.cache.invalidate_customer(customer_id);
            }
        }
        Ok(customer)
    }

    /// Fetch invoices from the ERP and overwrite the cache entry.
    ///
    /// The result is not cached if the customer's listings were invalidated
    /// while the fetch was in flight; the caller still gets it.
    #[instrument(skip(self, filters))]
    pub async fn refresh_invoices(
        &self,
        customer_id: &str,
        filters: &InvoiceFilters,
    ) -> Result<Vec<Invoice>> {
        let generation = self.cache.invoice_generation(customer_id);
        let invoices = self.adapter()?.get_customer_invoices(customer_id, filters).await?;
        self.cache.put_invoices_if_current(customer_id, filters, &invoices, generation);
        Ok(invoices)
    }

    pub async fn get_customer_balance(&self, customer_id: &str) -> Result<Decimal> {
        self.adapter()?.get_customer_balance(customer_id).await
    }

    pub async fn search_customers(&self, query: &str) -> Result<Vec<Customer>> {
        self.adapter()?.search_customers(query).await
    }

    pub async fn get_invoice(&self, invoice_id: &str) -> Result<Option<Invoice>> {
        self.adapter()?.get_invoice(invoice_id).await
    }

    pub async fn get_invoice_pdf(&self, invoice_id: &str) -> Result<Option<Vec<u8>>> {
        self.adapter()?.get_invoice_pdf(invoice_id).await
    }

    pub async fn get_payment_status(&self, payment_id: &str) -> Result<Option<PaymentStatus>> {
        self.adapter()?.get_payment_status(payment_id).await
    }

    pub async fn get_payment_history(&self, customer_id: &str) -> Result<Vec<Payment>> {
        self.adapter()?.get_payment_history(customer_id).await
    }
}
