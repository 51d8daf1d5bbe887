//! Translation of portal filters into Frappe list filters.

use selfcare_core::normalize::invoice_status;
use selfcare_domain::{InvoiceFilters, InvoiceStatus};
use serde_json::{json, Value};

/// ERPNext invoice statuses that normalize to `status`.
pub(super) fn erpnext_statuses(status: InvoiceStatus) -> &'static [&'static str] {
    match status {
        InvoiceStatus::Draft => &["Draft"],
        InvoiceStatus::Unpaid => &["Unpaid", "Overdue", "Partly Paid"],
        InvoiceStatus::Paid => &["Paid"],
        InvoiceStatus::Cancelled => &["Cancelled"],
        InvoiceStatus::Unknown => &[],
    }
}

/// Requested status in portal terms, if any.
pub(super) fn requested_status(filters: &InvoiceFilters) -> Option<InvoiceStatus> {
    filters.status().map(invoice_status)
}

/// `filters` parameter for a customer's `Sales Invoice` listing.
pub(super) fn invoice_conditions(customer_id: &str, filters: &InvoiceFilters) -> Value {
    let mut conditions = vec![json!(["customer", "=", customer_id])];

    if let Some(status) = requested_status(filters) {
        let statuses = erpnext_statuses(status);
        if !statuses.is_empty() {
            conditions.push(json!(["status", "in", statuses]));
        }
    }
    if let Some(from) = filters.from_date() {
        conditions.push(json!(["posting_date", ">=", from]));
    }
    if let Some(to) = filters.to_date() {
        conditions.push(json!(["posting_date", "<=", to]));
    }

    Value::Array(conditions)
}

/// `or_filters` parameter matching a customer by id or display name.
pub(super) fn customer_search_conditions(query: &str) -> Value {
    let pattern = format!("%{query}%");
    json!([["name", "like", pattern], ["customer_name", "like", pattern]])
}
