#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use selfcare_core::ErpAdapter;
use selfcare_domain::{
    Customer, ErpConfig, Invoice, InvoiceFilters, Payment, PaymentStatus, ProviderKind, Result,
};
use selfcare_infra::jobs::{JobQueue, JobQueueOptions, JobRunner, RecordingFailureSink};
use selfcare_infra::registry::ProviderRegistry;
use selfcare_infra::services::{ErpReadCache, ErpService};
use selfcare_infra::MockErpAdapter;
use tokio::sync::oneshot;

/// A started queue wired to a seeded mock ERP.
pub struct TestStack {
    pub mock: Arc<MockErpAdapter>,
    pub service: ErpService,
    pub sink: Arc<RecordingFailureSink>,
    pub queue: JobQueue,
}

impl TestStack {
    pub async fn start() -> Self {
        let mock = Arc::new(MockErpAdapter::seeded());
        Self::start_with(Arc::clone(&mock), mock).await
    }

    /// Serve `adapter` as the mock provider; `mock` is the ledger behind it.
    pub async fn start_with(mock: Arc<MockErpAdapter>, adapter: Arc<dyn ErpAdapter>) -> Self {
        let registry = ProviderRegistry::builder(ErpConfig::default())
            .with_adapter(ProviderKind::Mock, adapter)
            .build();
        let service = ErpService::new(Arc::new(registry), ErpReadCache::default());
        let sink = Arc::new(RecordingFailureSink::new());
        let mut queue = JobQueue::new(
            JobRunner::new(service.clone()),
            sink.clone(),
            JobQueueOptions::default(),
        );
        queue.start().await.expect("queue should start");

        Self { mock, service, sink, queue }
    }
}

/// Wraps the mock and holds the first invoice listing after it has been read
/// from the ledger, until the test releases it.
pub struct GatedAdapter {
    inner: Arc<MockErpAdapter>,
    gate: Mutex<Option<(oneshot::Sender<()>, oneshot::Receiver<()>)>>,
}

impl GatedAdapter {
    /// Returns the adapter, a receiver that fires once the listing is held,
    /// and the sender that releases it.
    pub fn new(
        inner: Arc<MockErpAdapter>,
    ) -> (Arc<Self>, oneshot::Receiver<()>, oneshot::Sender<()>) {
        let (entered_tx, entered_rx) = oneshot::channel();
        let (release_tx, release_rx) = oneshot::channel();
        let adapter = Arc::new(Self { inner, gate: Mutex::new(Some((entered_tx, release_rx))) });
        (adapter, entered_rx, release_tx)
    }
}

#[async_trait]
impl ErpAdapter for GatedAdapter {
    fn provider(&self) -> ProviderKind {
        self.inner.provider()
    }

    async fn authenticate(&self) -> Result<bool> {
        self.inner.authenticate().await
    }

    fn is_authenticated(&self) -> bool {
        self.inner.is_authenticated()
    }

    async fn get_customer(&self, customer_id: &str) -> Result<Option<Customer>> {
        self.inner.get_customer(customer_id).await
    }

    async fn get_customer_balance(&self, customer_id: &str) -> Result<Decimal> {
        self.inner.get_customer_balance(customer_id).await
    }

    async fn search_customers(&self, query: &str) -> Result<Vec<Customer>> {
        self.inner.search_customers(query).await
    }

    async fn get_customer_invoices(
        &self,
        customer_id: &str,
        filters: &InvoiceFilters,
    ) -> Result<Vec<Invoice>> {
        let invoices = self.inner.get_customer_invoices(customer_id, filters).await?;
        let gate = self.gate.lock().take();
        if let Some((entered, release)) = gate {
            let _ = entered.send(());
            let _ = release.await;
        }
        Ok(invoices)
    }

    async fn get_invoice(&self, invoice_id: &str) -> Result<Option<Invoice>> {
        self.inner.get_invoice(invoice_id).await
    }

    async fn get_invoice_pdf(&self, invoice_id: &str) -> Result<Option<Vec<u8>>> {
        self.inner.get_invoice_pdf(invoice_id).await
    }

    async fn create_payment(&self, payment: &Payment) -> Result<bool> {
        self.inner.create_payment(payment).await
    }

    async fn get_payment_status(&self, payment_id: &str) -> Result<Option<PaymentStatus>> {
        self.inner.get_payment_status(payment_id).await
    }

    async fn get_payment_history(&self, customer_id: &str) -> Result<Vec<Payment>> {
        self.inner.get_payment_history(customer_id).await
    }

    async fn sync_customer_data(&self, customer_id: &str) -> Result<bool> {
        self.inner.sync_customer_data(customer_id).await
    }
}
