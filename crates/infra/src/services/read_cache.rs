//! Short-lived cache for ERP reads.
//!
//! Holds customer lookups under `customer:<id>` and invoice listings under
//! `invoices:<id>:<filter hash>`. Expiry is passive. A TTL of zero turns the
//! cache into a no-op; nothing downstream may depend on it for correctness.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use selfcare_common::cache::{CacheStats, TtlCache};
use selfcare_common::time::{Clock, SystemClock};
use selfcare_core::cache_keys::{customer_key, invoices_key, invoices_prefix};
use selfcare_domain::{CacheConfig, Customer, Invoice, InvoiceFilters};
use tracing::debug;

/// A cached read result.
#[derive(Debug, Clone, PartialEq)]
pub enum CachedRecord {
    Customer(Customer),
    Invoices(Vec<Invoice>),
}

/// Read-through cache shared by the service and the job runner.
///
/// Clones share storage. Each customer carries an invoice generation that
/// [`ErpReadCache::invalidate_invoices`] bumps; a listing fetched under an
/// older generation is never stored.
#[derive(Clone)]
pub struct ErpReadCache {
    store: TtlCache<String, CachedRecord, Arc<dyn Clock>>,
    invoice_generations: Arc<DashMap<String, u64>>,
    ttl: Duration,
}

impl ErpReadCache {
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(Duration::from_secs(config.ttl_secs))
    }

    /// Cache driven by a custom clock (useful for testing).
    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self { store: TtlCache::with_clock(clock), invoice_generations: Arc::default(), ttl }
    }

    /// Cache that never stores anything.
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Raw lookup; a miss means "not fetched yet", never an error.
    pub fn get(&self, key: &str) -> Option<CachedRecord> {
        self.store.get(&key.to_string())
    }

    /// Raw store with an explicit TTL; last write wins.
    pub fn put(&self, key: impl Into<String>, record: CachedRecord, ttl: Duration) {
        self.store.put(key.into(), record, ttl);
    }

    pub fn customer(&self, customer_id: &str) -> Option<Customer> {
        match self.get(&customer_key(customer_id))? {
            CachedRecord::Customer(customer) => Some(customer),
            CachedRecord::Invoices(_) => None,
        }
    }

    pub fn put_customer(&self, customer: &Customer) {
        self.put(customer_key(&customer.id), CachedRecord::Customer(customer.clone()), self.ttl);
    }

    pub fn invoices(&self, customer_id: &str, filters: &InvoiceFilters) -> Option<Vec<Invoice>> {
        match self.get(&invoices_key(customer_id, filters))? {
            CachedRecord::Invoices(invoices) => Some(invoices),
            CachedRecord::Customer(_) => None,
        }
    }

    pub fn put_invoices(&self, customer_id: &str, filters: &InvoiceFilters, invoices: &[Invoice]) {
        self.put(
            invoices_key(customer_id, filters),
            CachedRecord::Invoices(invoices.to_vec()),
            self.ttl,
        );
    }

    /// Current invoice generation of a customer; capture it before fetching.
    pub fn invoice_generation(&self, customer_id: &str) -> u64 {
        self.invoice_generations.get(customer_id).map_or(0, |g| *g)
    }

    /// Store a listing only if no invalidation happened since `generation`
    /// was read. Returns whether the listing was stored.
    pub fn put_invoices_if_current(
        &self,
        customer_id: &str,
        filters: &InvoiceFilters,
        invoices: &[Invoice],
        generation: u64,
    ) -> bool {
        // The entry guard serialises against `invalidate_invoices`.
        let current = self.invoice_generations.entry(customer_id.to_string()).or_insert(0);
        if *current != generation {
            debug!(customer_id, generation, current = *current, "Discarded stale invoice listing");
            return false;
        }
        self.put_invoices(customer_id, filters, invoices);
        true
    }

    pub fn invalidate(&self, key: &str) -> bool {
        self.store.remove(&key.to_string()).is_some()
    }

    pub fn invalidate_prefix(&self, prefix: &str) -> usize {
        self.store.remove_prefix(prefix)
    }

    pub fn invalidate_customer(&self, customer_id: &str) -> bool {
        self.invalidate(&customer_key(customer_id))
    }

    /// Drop every invoice listing of a customer, whatever its filters, and
    /// bump its invoice generation.
    pub fn invalidate_invoices(&self, customer_id: &str) -> usize {
        let mut generation = self.invoice_generations.entry(customer_id.to_string()).or_insert(0);
        *generation += 1;
        let removed = self.invalidate_prefix(&invoices_prefix(customer_id));
        drop(generation);
        debug!(customer_id, removed, "Invalidated cached invoice listings");
        removed
    }

    /// Drop every entry. Generations are bumped so in-flight listings are
    /// not stored afterwards.
    pub fn clear(&self) {
        for mut generation in self.invoice_generations.iter_mut() {
            *generation += 1;
        }
        self.store.clear();
    }

    pub fn stats(&self) -> CacheStats {
        self.store.stats()
    }
}

impl Default for ErpReadCache {
    fn default() -> Self {
        Self::from_config(&CacheConfig::default())
    }
}
