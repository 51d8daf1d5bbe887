use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use rust_decimal::Decimal;
use selfcare_core::normalize::{
    normalize_customer, normalize_invoice, normalize_payment, normalize_rows, payment_status,
};
use selfcare_core::ErpAdapter;
use selfcare_domain::constants::DEFAULT_SEARCH_LIMIT;
use selfcare_domain::{
    AdapterErrorKind, Customer, ErpConfig, ErpError, Invoice, InvoiceFilters, Payment,
    PaymentStatus, ProviderKind, Result,
};
use serde_json::{json, Value};
use tracing::{debug, info, instrument, warn};

use super::filters::{customer_search_conditions, invoice_conditions, requested_status};
use crate::errors::{classify_status, InfraError};
use crate::http::HttpClient;

const CUSTOMER: &str = "Customer";
const SALES_INVOICE: &str = "Sales Invoice";
const PAYMENT_ENTRY: &str = "Payment Entry";

const LOGGED_USER_METHOD: &str = "frappe.auth.get_logged_user";
const BALANCE_METHOD: &str = "erpnext.accounts.utils.get_balance_on";
const PDF_METHOD: &str = "frappe.utils.print_format.download_pdf";

const MAX_ERROR_DETAIL: usize = 200;

/// Live adapter for an ERPNext instance.
///
/// Credentials are sent as `Authorization: token <key>:<secret>` on every
/// request, so there is no session to refresh; `authenticate` only verifies
/// them.
pub struct ErpNextAdapter {
    base_url: String,
    http: HttpClient,
    company: Option<String>,
    authenticated: AtomicBool,
}

impl ErpNextAdapter {
    /// Build the adapter from configuration. No request is made.
    ///
    /// # Errors
    /// `ErpError::Config` when the base URL or credentials are missing.
    pub fn new(config: &ErpConfig) -> Result<Self> {
        let base_url = non_blank(config.base_url.as_deref())
            .ok_or_else(|| ErpError::config("ERPNext base URL is not configured"))?
            .trim_end_matches('/')
            .to_string();
        let (Some(key), Some(secret)) =
            (non_blank(config.api_key.as_deref()), non_blank(config.api_secret.as_deref()))
        else {
            return Err(ErpError::config("ERPNext API key and secret are not configured"));
        };

        let mut auth = HeaderValue::from_str(&format!("token {key}:{secret}"))
            .map_err(|_| ErpError::config("ERPNext credentials contain invalid characters"))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = HttpClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .user_agent(concat!("selfcare-erp/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            base_url,
            http,
            company: config.company.clone(),
            authenticated: AtomicBool::new(false),
        })
    }

    fn resource_url(&self, doctype: &str, name: Option<&str>) -> String {
        let mut url = format!("{}/api/resource/{}", self.base_url, urlencoding::encode(doctype));
        if let Some(name) = name {
            url.push('/');
            url.push_str(&urlencoding::encode(name));
        }
        url
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/api/method/{method}", self.base_url)
    }

    /// Send a request; `Ok(None)` on 404, an error for any other failure.
    async fn execute(&self, request: RequestBuilder) -> Result<Option<Response>> {
        let response = self.http.send(request).await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
                self.authenticated.store(false, Ordering::Relaxed);
            }
            let detail = error_detail(response).await;
            return Err(classify_status(status, &detail));
        }

        self.authenticated.store(true, Ordering::Relaxed);
        Ok(Some(response))
    }

    async fn execute_json(&self, request: RequestBuilder) -> Result<Option<Value>> {
        let Some(response) = self.execute(request).await? else {
            return Ok(None);
        };
        let body = response.bytes().await.map_err(|e| ErpError::from(InfraError::from(e)))?;
        serde_json::from_slice(&body)
            .map(Some)
            .map_err(|e| ErpError::malformed(format!("ERPNext returned invalid JSON: {e}")))
    }

    async fn get_document(&self, doctype: &str, name: &str) -> Result<Option<Value>> {
        let url = self.resource_url(doctype, Some(name));
        match self.execute_json(self.http.request(Method::GET, url)).await? {
            Some(body) => envelope(body, "data").map(Some),
            None => Ok(None),
        }
    }

    async fn list_documents(&self, doctype: &str, query: &[(&str, String)]) -> Result<Vec<Value>> {
        let url = self.resource_url(doctype, None);
        let request = self.http.request(Method::GET, url).query(query);
        let Some(body) = self.execute_json(request).await? else {
            return Ok(Vec::new());
        };
        match envelope(body, "data")? {
            Value::Array(rows) => Ok(rows),
            other => Err(ErpError::malformed(format!("{doctype} listing is not an array: {other}"))),
        }
    }

    async fn call_method(&self, method: &str, query: &[(&str, String)]) -> Result<Option<Value>> {
        let request = self.http.request(Method::GET, self.method_url(method)).query(query);
        match self.execute_json(request).await? {
            Some(body) => envelope(body, "message").map(Some),
            None => Ok(None),
        }
    }

    /// Name of a live payment entry already carrying `reference`.
    async fn find_payment_by_reference(&self, reference: &str) -> Result<Option<String>> {
        let rows = self
            .list_documents(
                PAYMENT_ENTRY,
                &[
                    (
                        "filters",
                        json!([["reference_no", "=", reference], ["docstatus", "<", 2]])
                            .to_string(),
                    ),
                    ("fields", json!(["name"]).to_string()),
                    ("limit_page_length", "1".to_string()),
                ],
            )
            .await?;
        Ok(rows.first().and_then(|row| row.get("name")).and_then(Value::as_str).map(str::to_string))
    }

    fn payment_entry_body(&self, payment: &Payment) -> Value {
        let date = payment.payment_date.map(|d| d.format("%Y-%m-%d").to_string());
        let mut body = json!({
            "payment_type": "Receive",
            "party_type": "Customer",
            "party": payment.customer_id,
            "paid_amount": payment.amount,
            "received_amount": payment.amount,
            "reference_no": payment.reference,
            "reference_date": date,
            "posting_date": date,
            "references": [{
                "reference_doctype": SALES_INVOICE,
                "reference_name": payment.invoice_id,
                "allocated_amount": payment.amount,
            }],
            "docstatus": 1,
        });
        let method = payment.method.label();
        if !method.is_empty() {
            body["mode_of_payment"] = json!(method);
        }
        if let Some(company) = &self.company {
            body["company"] = json!(company);
        }
        body
    }
}

#[async_trait]
impl ErpAdapter for ErpNextAdapter {
    fn provider(&self) -> ProviderKind {
        ProviderKind::ErpNext
    }

    #[instrument(skip(self))]
    async fn authenticate(&self) -> Result<bool> {
        let request = self.http.request(Method::GET, self.method_url(LOGGED_USER_METHOD));
        match self.execute_json(request).await {
            Ok(Some(body)) => {
                let user = body.get("message").and_then(Value::as_str).unwrap_or_default();
                info!(user, "Authenticated with ERPNext");
                Ok(true)
            }
            Ok(None) => Err(ErpError::config("ERPNext login endpoint not found; check the base URL")),
            Err(e) if e.adapter_kind() == Some(AdapterErrorKind::Authentication) => {
                warn!(error = %e, "ERPNext rejected the configured credentials");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    fn is_authenticated(&self) -> bool {
        self.authenticated.load(Ordering::Relaxed)
    }

    #[instrument(skip(self))]
    async fn get_customer(&self, customer_id: &str) -> Result<Option<Customer>> {
        self.get_document(CUSTOMER, customer_id).await?.as_ref().map(normalize_customer).transpose()
    }

    #[instrument(skip(self))]
    async fn get_customer_balance(&self, customer_id: &str) -> Result<Decimal> {
        let mut query =
            vec![("party_type", CUSTOMER.to_string()), ("party", customer_id.to_string())];
        if let Some(company) = &self.company {
            query.push(("company", company.clone()));
        }
        match self.call_method(BALANCE_METHOD, &query).await? {
            Some(value) => parse_amount(&value),
            None => Err(ErpError::config("ERPNext balance method not available")),
        }
    }

    #[instrument(skip(self))]
    async fn search_customers(&self, query: &str) -> Result<Vec<Customer>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let rows = self
            .list_documents(
                CUSTOMER,
                &[
                    ("or_filters", customer_search_conditions(query).to_string()),
                    ("fields", json!(["*"]).to_string()),
                    ("limit_page_length", DEFAULT_SEARCH_LIMIT.to_string()),
                ],
            )
            .await?;
        Ok(normalize_rows(&rows, normalize_customer))
    }

    #[instrument(skip(self, filters))]
    async fn get_customer_invoices(
        &self,
        customer_id: &str,
        filters: &InvoiceFilters,
    ) -> Result<Vec<Invoice>> {
        let rows = self
            .list_documents(
                SALES_INVOICE,
                &[
                    ("filters", invoice_conditions(customer_id, filters).to_string()),
                    ("fields", json!(["*"]).to_string()),
                    ("order_by", "posting_date desc".to_string()),
                    // Frappe treats 0 as "no limit".
                    ("limit_page_length", filters.limit().unwrap_or(0).to_string()),
                ],
            )
            .await?;

        let mut invoices = normalize_rows(&rows, normalize_invoice);
        if let Some(status) = requested_status(filters) {
            invoices.retain(|invoice| invoice.status == status);
        }
        debug!(customer_id, count = invoices.len(), "Fetched invoices from ERPNext");
        Ok(invoices)
    }

    #[instrument(skip(self))]
    async fn get_invoice(&self, invoice_id: &str) -> Result<Option<Invoice>> {
        self.get_document(SALES_INVOICE, invoice_id)
            .await?
            .as_ref()
            .map(normalize_invoice)
            .transpose()
    }

    #[instrument(skip(self))]
    async fn get_invoice_pdf(&self, invoice_id: &str) -> Result<Option<Vec<u8>>> {
        let request = self
            .http
            .request(Method::GET, self.method_url(PDF_METHOD))
            .query(&[("doctype", SALES_INVOICE), ("name", invoice_id)]);
        let Some(response) = self.execute(request).await? else {
            return Ok(None);
        };
        let bytes = response.bytes().await.map_err(|e| ErpError::from(InfraError::from(e)))?;
        Ok(Some(bytes.to_vec()))
    }

    #[instrument(
        skip(self, payment),
        fields(
            customer_id = %payment.customer_id,
            invoice_id = %payment.invoice_id,
            reference = %payment.reference
        )
    )]
    async fn create_payment(&self, payment: &Payment) -> Result<bool> {
        if let Some(existing) = self.find_payment_by_reference(&payment.reference).await? {
            info!(erp_id = %existing, "Payment already recorded in ERPNext");
            return Ok(true);
        }

        let request = self
            .http
            .request(Method::POST, self.resource_url(PAYMENT_ENTRY, None))
            .json(&self.payment_entry_body(payment));
        let created = match self.execute_json(request).await? {
            Some(body) => envelope(body, "data")?,
            None => return Err(ErpError::config("ERPNext Payment Entry resource not found")),
        };

        let erp_id = created.get("name").and_then(Value::as_str).unwrap_or_default();
        info!(erp_id, "Created ERPNext payment entry");
        Ok(true)
    }

    #[instrument(skip(self))]
    async fn get_payment_status(&self, payment_id: &str) -> Result<Option<PaymentStatus>> {
        Ok(self.get_document(PAYMENT_ENTRY, payment_id).await?.map(|doc| payment_status(&doc)))
    }

    #[instrument(skip(self))]
    async fn get_payment_history(&self, customer_id: &str) -> Result<Vec<Payment>> {
        // List rows omit the `references` child table, so each entry is
        // fetched in full to learn which invoice it settles.
        let rows = self
            .list_documents(
                PAYMENT_ENTRY,
                &[
                    (
                        "filters",
                        json!([["party_type", "=", CUSTOMER], ["party", "=", customer_id]])
                            .to_string(),
                    ),
                    ("fields", json!(["name"]).to_string()),
                    ("order_by", "posting_date desc".to_string()),
                    ("limit_page_length", DEFAULT_SEARCH_LIMIT.to_string()),
                ],
            )
            .await?;

        let mut documents = Vec::with_capacity(rows.len());
        for name in rows.iter().filter_map(|row| row.get("name").and_then(Value::as_str)) {
            if let Some(document) = self.get_document(PAYMENT_ENTRY, name).await? {
                documents.push(document);
            }
        }
        Ok(normalize_rows(&documents, normalize_payment))
    }

    #[instrument(skip(self))]
    async fn sync_customer_data(&self, customer_id: &str) -> Result<bool> {
        let found = self.get_document(CUSTOMER, customer_id).await?.is_some();
        if !found {
            warn!(customer_id, "Customer not found in ERPNext during sync");
        }
        Ok(found)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Frappe wraps resources in `data` and method results in `message`.
fn envelope(mut body: Value, field: &str) -> Result<Value> {
    match body.get_mut(field).map(Value::take) {
        Some(value) => Ok(value),
        None => Err(ErpError::malformed(format!("ERPNext response has no `{field}` field"))),
    }
}

fn parse_amount(value: &Value) -> Result<Decimal> {
    let parsed = match value {
        Value::Number(n) => n.to_string().parse::<Decimal>().ok(),
        Value::String(s) => s.trim().parse::<Decimal>().ok(),
        Value::Null => Some(Decimal::ZERO),
        _ => None,
    };
    parsed.ok_or_else(|| ErpError::malformed(format!("ERPNext balance is not a number: {value}")))
}

/// Best-effort human message from a Frappe error body.
async fn error_detail(response: Response) -> String {
    let text = response.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<Value>(&text)
        .ok()
        .and_then(|body| {
            ["exception", "message", "exc_type"]
                .iter()
                .find_map(|key| body.get(*key).and_then(Value::as_str).map(str::to_string))
        })
        .unwrap_or(text);
    detail.chars().take(MAX_ERROR_DETAIL).collect()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use selfcare_domain::{InvoiceStatus, PaymentMethod};
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn config(server: &MockServer) -> ErpConfig {
        ErpConfig {
            provider: ProviderKind::ErpNext,
            base_url: Some(format!("{}/", server.uri())),
            api_key: Some("key".into()),
            api_secret: Some("secret".into()),
            company: Some("Heat Co".into()),
            timeout_secs: 5,
        }
    }

    fn adapter(server: &MockServer) -> ErpNextAdapter {
        ErpNextAdapter::new(&config(server)).expect("adapter")
    }

    #[test]
    fn missing_credentials_is_config_error() {
        let config = ErpConfig {
            provider: ProviderKind::ErpNext,
            base_url: Some("https://erp.example.com".into()),
            ..ErpConfig::default()
        };
        assert!(matches!(ErpNextAdapter::new(&config), Err(ErpError::Config { .. })));
    }

    #[tokio::test]
    async fn authenticate_sends_token_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/method/frappe.auth.get_logged_user"))
            .and(header("authorization", "token key:secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "portal@example.com"})))
            .expect(1)
            .mount(&server)
            .await;

        let adapter = adapter(&server);
        assert!(!adapter.is_authenticated());
        assert!(adapter.authenticate().await.unwrap());
        assert!(adapter.is_authenticated());
    }

    #[tokio::test]
    async fn rejected_credentials_authenticate_false() {
        let server = MockServer::start().await;
        Mock::given(path("/api/method/frappe.auth.get_logged_user"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"exc_type": "AuthenticationError"})))
            .mount(&server)
            .await;

        let adapter = adapter(&server);
        assert!(!adapter.authenticate().await.unwrap());
        assert!(!adapter.is_authenticated());
    }

    #[tokio::test]
    async fn get_customer_normalizes_document() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/resource/Customer/CUST-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"name": "CUST-1", "customer_name": "Ada", "disabled": 0}
            })))
            .mount(&server)
            .await;

        let customer = adapter(&server).get_customer("CUST-1").await.unwrap().unwrap();
        assert_eq!(customer.id, "CUST-1");
        assert_eq!(customer.name, "Ada");
    }

    #[tokio::test]
    async fn missing_customer_is_none() {
        let server = MockServer::start().await;
        Mock::given(path("/api/resource/Customer/NOPE"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        assert!(adapter(&server).get_customer("NOPE").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn server_error_is_retryable_adapter_error() {
        let server = MockServer::start().await;
        Mock::given(path("/api/resource/Customer/CUST-1"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = adapter(&server).get_customer("CUST-1").await.unwrap_err();
        assert_eq!(err.adapter_kind(), Some(AdapterErrorKind::ServerUnavailable));
    }

    #[tokio::test]
    async fn non_json_body_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(path("/api/resource/Sales%20Invoice/INV-1"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
            .mount(&server)
            .await;

        let err = adapter(&server).get_invoice("INV-1").await.unwrap_err();
        assert!(matches!(err, ErpError::MalformedPayload { .. }));
    }

    #[tokio::test]
    async fn invoice_listing_pushes_filters_and_skips_bad_rows() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/resource/Sales%20Invoice"))
            .and(query_param("limit_page_length", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [
                    {"name": "INV-1", "customer": "CUST-1", "status": "Overdue", "grand_total": 80},
                    {"grand_total": 5},
                    {"name": "INV-2", "customer": "CUST-1", "status": "Unpaid", "grand_total": 20},
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let filters = InvoiceFilters::new().with("status", "unpaid").with("limit", 10);
        let invoices = adapter(&server).get_customer_invoices("CUST-1", &filters).await.unwrap();
        assert_eq!(invoices.len(), 2);
        assert!(invoices.iter().all(|i| i.status == InvoiceStatus::Unpaid));

        let requests = server.received_requests().await.unwrap();
        let sent: String = requests[0]
            .url
            .query_pairs()
            .find(|(k, _)| k == "filters")
            .map(|(_, v)| v.into_owned())
            .unwrap();
        assert!(sent.contains("Partly Paid"));
    }

    #[tokio::test]
    async fn balance_uses_company_and_parses_message() {
        let server = MockServer::start().await;
        Mock::given(path("/api/method/erpnext.accounts.utils.get_balance_on"))
            .and(query_param("party", "CUST-1"))
            .and(query_param("company", "Heat Co"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": 123.45})))
            .mount(&server)
            .await;

        let balance = adapter(&server).get_customer_balance("CUST-1").await.unwrap();
        assert_eq!(balance, Decimal::new(12345, 2));
    }

    #[tokio::test]
    async fn create_payment_posts_entry() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/resource/Payment%20Entry"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/resource/Payment%20Entry"))
            .and(body_partial_json(json!({
                "party": "CUST-1",
                "reference_no": "PAY-REF-1",
                "mode_of_payment": "Card",
                "company": "Heat Co",
                "references": [{"reference_name": "INV-9"}],
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"name": "ACC-PAY-1"}})))
            .expect(1)
            .mount(&server)
            .await;

        let payment = Payment::new(
            "CUST-1",
            "INV-9",
            Decimal::new(4500, 2),
            PaymentMethod::Card,
            "PAY-REF-1",
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        );
        assert!(adapter(&server).create_payment(&payment).await.unwrap());
    }

    #[tokio::test]
    async fn create_payment_skips_known_reference() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/resource/Payment%20Entry"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [{"name": "ACC-PAY-1"}]})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let payment = Payment::new(
            "CUST-1",
            "INV-9",
            Decimal::new(4500, 2),
            PaymentMethod::Card,
            "PAY-REF-1",
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        );
        assert!(adapter(&server).create_payment(&payment).await.unwrap());
    }

    #[tokio::test]
    async fn validation_failure_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/resource/Payment%20Entry"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(417)
                    .set_body_json(json!({"exception": "ValidationError: Allocated amount exceeds outstanding"})),
            )
            .mount(&server)
            .await;

        let payment = Payment::new(
            "CUST-1",
            "INV-9",
            Decimal::new(999_999, 0),
            PaymentMethod::Cash,
            "PAY-REF-2",
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        );
        match adapter(&server).create_payment(&payment).await {
            Err(ErpError::Rejected { status, message }) => {
                assert_eq!(status, 417);
                assert!(message.contains("Allocated amount"));
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn payment_status_from_docstatus() {
        let server = MockServer::start().await;
        Mock::given(path("/api/resource/Payment%20Entry/ACC-PAY-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"name": "ACC-PAY-1", "docstatus": 1}})))
            .mount(&server)
            .await;

        let status = adapter(&server).get_payment_status("ACC-PAY-1").await.unwrap();
        assert_eq!(status, Some(PaymentStatus::Completed));
    }

    #[tokio::test]
    async fn invoice_pdf_returns_bytes() {
        let server = MockServer::start().await;
        Mock::given(path("/api/method/frappe.utils.print_format.download_pdf"))
            .and(query_param("name", "INV-9"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-1.4".to_vec()))
            .mount(&server)
            .await;

        let pdf = adapter(&server).get_invoice_pdf("INV-9").await.unwrap().unwrap();
        assert!(pdf.starts_with(b"%PDF"));
    }
}
