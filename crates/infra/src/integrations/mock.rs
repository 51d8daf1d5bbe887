//! Deterministic in-memory ERP
//!
//! Serves fixtures instead of talking to a server. Used for local development
//! without ERP connectivity and as the test double for the job runner: any
//! operation can be told to fail, and every call is counted.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::{Mutex, RwLock};
use rust_decimal::Decimal;
use selfcare_core::normalize::invoice_status;
use selfcare_core::ErpAdapter;
use selfcare_domain::constants::DEFAULT_SEARCH_LIMIT;
use selfcare_domain::{
    AdapterErrorKind, Consumption, Customer, CustomerStatus, ErpError, Invoice, InvoiceFilters,
    InvoiceStatus, Payment, PaymentStatus, ProviderKind, Result,
};
use serde_json::json;
use tracing::debug;

/// Adapter operations, for failure injection and call counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOperation {
    Authenticate,
    GetCustomer,
    GetCustomerBalance,
    SearchCustomers,
    GetCustomerInvoices,
    GetInvoice,
    GetInvoicePdf,
    CreatePayment,
    GetPaymentStatus,
    GetPaymentHistory,
    SyncCustomerData,
}

/// Failure the mock raises instead of answering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    /// `ErpError::Adapter` with a server-unavailable kind.
    Transient,
    /// `ErpError::MalformedPayload`.
    Malformed,
    /// `ErpError::Rejected` with HTTP 417.
    Rejected,
}

impl MockFailure {
    fn to_error(self, operation: MockOperation) -> ErpError {
        match self {
            Self::Transient => ErpError::adapter(
                AdapterErrorKind::ServerUnavailable,
                format!("mock ERP unavailable during {operation:?}"),
            ),
            Self::Malformed => ErpError::malformed(format!("mock ERP sent garbage for {operation:?}")),
            Self::Rejected => ErpError::Rejected {
                status: 417,
                message: format!("mock ERP refused {operation:?}"),
            },
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct FailurePlan {
    failure: MockFailure,
    /// `None` fails forever.
    remaining: Option<u32>,
}

#[derive(Debug, Default)]
struct Ledger {
    customers: HashMap<String, Customer>,
    invoices: Vec<Invoice>,
    payments: Vec<Payment>,
}

/// In-memory ERP adapter.
#[derive(Debug, Default)]
pub struct MockErpAdapter {
    ledger: RwLock<Ledger>,
    failures: Mutex<HashMap<MockOperation, FailurePlan>>,
    calls: Mutex<HashMap<MockOperation, u32>>,
    authenticated: AtomicBool,
    next_payment: AtomicU64,
}

impl MockErpAdapter {
    /// Empty ERP.
    pub fn new() -> Self {
        Self::default()
    }

    /// ERP preloaded with a small, fixed data set: customers `CUST-1` and
    /// `CUST-2`, and invoices `INV-7`, `INV-8`, `INV-9`.
    pub fn seeded() -> Self {
        let adapter = Self::new();
        for customer in [
            fixture_customer("CUST-1", "Ada Lovelace", "Main St 1, 1000 Town", Some("HM-1001"), 14500),
            fixture_customer("CUST-2", "Charles Babbage", "Engine Rd 2, 2000 City", None, 0),
        ] {
            adapter.insert_customer(customer);
        }
        for invoice in [
            fixture_invoice("INV-7", "CUST-1", (2024, 1, 5), 10000, 10000, InvoiceStatus::Paid),
            fixture_invoice("INV-8", "CUST-1", (2024, 2, 5), 10000, 0, InvoiceStatus::Unpaid),
            fixture_invoice("INV-9", "CUST-1", (2024, 3, 5), 4500, 0, InvoiceStatus::Unpaid),
            fixture_invoice("INV-20", "CUST-2", (2024, 3, 5), 5000, 5000, InvoiceStatus::Paid),
        ] {
            adapter.insert_invoice(invoice);
        }
        adapter
    }

    #[must_use]
    pub fn with_customer(self, customer: Customer) -> Self {
        self.insert_customer(customer);
        self
    }

    #[must_use]
    pub fn with_invoice(self, invoice: Invoice) -> Self {
        self.insert_invoice(invoice);
        self
    }

    pub fn insert_customer(&self, customer: Customer) {
        self.ledger.write().customers.insert(customer.id.clone(), customer);
    }

    pub fn insert_invoice(&self, invoice: Invoice) {
        let mut ledger = self.ledger.write();
        ledger.invoices.retain(|existing| existing.id != invoice.id);
        ledger.invoices.push(invoice);
    }

    /// Fail the next `times` calls of `operation`.
    pub fn fail_next(&self, operation: MockOperation, failure: MockFailure, times: u32) {
        self.failures.lock().insert(operation, FailurePlan { failure, remaining: Some(times) });
    }

    /// Fail every call of `operation` until [`clear_failures`](Self::clear_failures).
    pub fn fail_always(&self, operation: MockOperation, failure: MockFailure) {
        self.failures.lock().insert(operation, FailurePlan { failure, remaining: None });
    }

    pub fn clear_failures(&self) {
        self.failures.lock().clear();
    }

    /// How many times `operation` has been called, failed calls included.
    pub fn calls(&self, operation: MockOperation) -> u32 {
        self.calls.lock().get(&operation).copied().unwrap_or(0)
    }

    /// Payments accepted so far.
    pub fn recorded_payments(&self) -> Vec<Payment> {
        self.ledger.read().payments.clone()
    }

    /// Count the call and raise any injected failure.
    fn enter(&self, operation: MockOperation) -> Result<()> {
        *self.calls.lock().entry(operation).or_insert(0) += 1;

        let mut failures = self.failures.lock();
        let Some(plan) = failures.get_mut(&operation) else {
            return Ok(());
        };
        let failure = plan.failure;
        match plan.remaining.as_mut() {
            None => {}
            Some(0) => {
                failures.remove(&operation);
                return Ok(());
            }
            Some(remaining) => {
                *remaining -= 1;
                if *remaining == 0 {
                    failures.remove(&operation);
                }
            }
        }
        debug!(?operation, ?failure, "Mock ERP injecting failure");
        Err(failure.to_error(operation))
    }
}

#[async_trait]
impl ErpAdapter for MockErpAdapter {
    fn provider(&self) -> ProviderKind {
        ProviderKind::Mock
    }

    async fn authenticate(&self) -> Result<bool> {
        self.enter(MockOperation::Authenticate)?;
        self.authenticated.store(true, Ordering::Relaxed);
        Ok(true)
    }

    fn is_authenticated(&self) -> bool {
        self.authenticated.load(Ordering::Relaxed)
    }

    async fn get_customer(&self, customer_id: &str) -> Result<Option<Customer>> {
        self.enter(MockOperation::GetCustomer)?;
        Ok(self.ledger.read().customers.get(customer_id).cloned())
    }

    async fn get_customer_balance(&self, customer_id: &str) -> Result<Decimal> {
        self.enter(MockOperation::GetCustomerBalance)?;
        Ok(self
            .ledger
            .read()
            .customers
            .get(customer_id)
            .map_or(Decimal::ZERO, |customer| customer.balance))
    }

    async fn search_customers(&self, query: &str) -> Result<Vec<Customer>> {
        self.enter(MockOperation::SearchCustomers)?;
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }
        let ledger = self.ledger.read();
        let mut matches: Vec<Customer> = ledger
            .customers
            .values()
            .filter(|c| {
                c.id.to_lowercase().contains(&needle) || c.name.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.id.cmp(&b.id));
        matches.truncate(DEFAULT_SEARCH_LIMIT);
        Ok(matches)
    }

    async fn get_customer_invoices(
        &self,
        customer_id: &str,
        filters: &InvoiceFilters,
    ) -> Result<Vec<Invoice>> {
        self.enter(MockOperation::GetCustomerInvoices)?;
        let wanted = filters.status().map(invoice_status);
        let ledger = self.ledger.read();
        let mut invoices: Vec<Invoice> = ledger
            .invoices
            .iter()
            .filter(|i| i.customer_id == customer_id)
            .filter(|i| wanted.map_or(true, |status| i.status == status))
            .cloned()
            .collect();
        // Newest first, as the live ERP orders them.
        invoices.sort_by(|a, b| b.issue_date.cmp(&a.issue_date));
        if let Some(limit) = filters.limit() {
            invoices.truncate(limit);
        }
        Ok(invoices)
    }

    async fn get_invoice(&self, invoice_id: &str) -> Result<Option<Invoice>> {
        self.enter(MockOperation::GetInvoice)?;
        Ok(self.ledger.read().invoices.iter().find(|i| i.id == invoice_id).cloned())
    }

    async fn get_invoice_pdf(&self, invoice_id: &str) -> Result<Option<Vec<u8>>> {
        self.enter(MockOperation::GetInvoicePdf)?;
        let ledger = self.ledger.read();
        Ok(ledger.invoices.iter().find(|i| i.id == invoice_id).map(render_pdf))
    }

    async fn create_payment(&self, payment: &Payment) -> Result<bool> {
        self.enter(MockOperation::CreatePayment)?;
        if payment.amount <= Decimal::ZERO {
            return Err(ErpError::Rejected {
                status: 417,
                message: format!("payment amount must be positive, got {}", payment.amount),
            });
        }

        let mut ledger = self.ledger.write();
        if ledger.payments.iter().any(|p| p.reference == payment.reference) {
            debug!(reference = %payment.reference, "Mock ERP ignoring duplicate payment reference");
            return Ok(true);
        }
        let Some(invoice) = ledger.invoices.iter_mut().find(|i| i.id == payment.invoice_id) else {
            return Err(ErpError::Rejected {
                status: 404,
                message: format!("invoice {} does not exist", payment.invoice_id),
            });
        };

        invoice.paid += payment.amount;
        invoice.outstanding = (invoice.outstanding - payment.amount).max(Decimal::ZERO);
        if invoice.outstanding.is_zero() {
            invoice.status = InvoiceStatus::Paid;
        }
        if let Some(customer) = ledger.customers.get_mut(&payment.customer_id) {
            customer.balance -= payment.amount;
        }

        let sequence = self.next_payment.fetch_add(1, Ordering::Relaxed) + 1;
        let mut recorded = payment.clone();
        recorded.erp_id = Some(format!("PAY-MOCK-{sequence:05}"));
        ledger.payments.push(recorded);
        Ok(true)
    }

    async fn get_payment_status(&self, payment_id: &str) -> Result<Option<PaymentStatus>> {
        self.enter(MockOperation::GetPaymentStatus)?;
        let ledger = self.ledger.read();
        Ok(ledger
            .payments
            .iter()
            .find(|p| p.erp_id.as_deref() == Some(payment_id))
            .map(|_| PaymentStatus::Completed))
    }

    async fn get_payment_history(&self, customer_id: &str) -> Result<Vec<Payment>> {
        self.enter(MockOperation::GetPaymentHistory)?;
        let ledger = self.ledger.read();
        Ok(ledger.payments.iter().rev().filter(|p| p.customer_id == customer_id).cloned().collect())
    }

    async fn sync_customer_data(&self, customer_id: &str) -> Result<bool> {
        self.enter(MockOperation::SyncCustomerData)?;
        Ok(self.ledger.read().customers.contains_key(customer_id))
    }
}

fn fixture_customer(
    id: &str,
    name: &str,
    address: &str,
    heatmeter_id: Option<&str>,
    balance_cents: i64,
) -> Customer {
    Customer {
        id: id.to_string(),
        name: name.to_string(),
        address: address.to_string(),
        heatmeter_id: heatmeter_id.map(str::to_string),
        balance: Decimal::new(balance_cents, 2),
        status: CustomerStatus::Active,
        metadata: json!({"source": "mock", "name": id, "customer_name": name}),
    }
}

fn fixture_invoice(
    id: &str,
    customer_id: &str,
    (year, month, day): (i32, u32, u32),
    amount_cents: i64,
    paid_cents: i64,
    status: InvoiceStatus,
) -> Invoice {
    let issue_date = NaiveDate::from_ymd_opt(year, month, day);
    let amount = Decimal::new(amount_cents, 2);
    let paid = Decimal::new(paid_cents, 2);
    Invoice {
        id: id.to_string(),
        customer_id: customer_id.to_string(),
        issue_date,
        due_date: issue_date.and_then(|d| d.checked_add_days(chrono::Days::new(30))),
        amount,
        paid,
        outstanding: amount - paid,
        status,
        consumption: Consumption {
            energy_kwh: Decimal::new(1250, 0),
            volume_m3: Decimal::new(18, 0),
            thermal_energy_kwh: None,
        },
        meter_reading_date: issue_date,
        line_items: vec![json!({"item_code": "HEAT", "amount": amount})],
        raw: json!({"source": "mock", "name": id, "customer": customer_id}),
    }
}

/// Minimal single-page PDF naming the invoice.
fn render_pdf(invoice: &Invoice) -> Vec<u8> {
    format!(
        "%PDF-1.4\n1 0 obj << /Type /Catalog >> endobj\n% Invoice {} for {}: {}\n%%EOF\n",
        invoice.id, invoice.customer_id, invoice.amount
    )
    .into_bytes()
}
