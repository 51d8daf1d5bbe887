//! Status vocabularies.
//!
//! Every provider maps into these tables; new providers must not add
//! statuses of their own.

use selfcare_domain::{InvoiceStatus, PaymentStatus};
use serde_json::Value;

/// Map a provider invoice status onto the portal vocabulary.
pub fn invoice_status(raw: &str) -> InvoiceStatus {
    match raw.trim().to_lowercase().as_str() {
        "draft" => InvoiceStatus::Draft,
        "unpaid" | "overdue" | "partly paid" => InvoiceStatus::Unpaid,
        "paid" => InvoiceStatus::Paid,
        "cancelled" | "canceled" => InvoiceStatus::Cancelled,
        _ => InvoiceStatus::Unknown,
    }
}

/// Payment status from a raw payment document.
///
/// ERPNext reports document state as `docstatus` (0 draft, 1 submitted,
/// 2 cancelled); other providers send a textual `status`.
pub fn payment_status(raw: &Value) -> PaymentStatus {
    if let Some(docstatus) = raw.get("docstatus").and_then(Value::as_i64) {
        return match docstatus {
            0 => PaymentStatus::Pending,
            1 => PaymentStatus::Completed,
            2 => PaymentStatus::Cancelled,
            _ => PaymentStatus::Unknown,
        };
    }
    match raw.get("status").and_then(Value::as_str).map(|s| s.trim().to_lowercase()) {
        Some(s) => match s.as_str() {
            "pending" | "draft" | "processing" => PaymentStatus::Pending,
            "completed" | "complete" | "submitted" | "paid" | "succeeded" => {
                PaymentStatus::Completed
            }
            "cancelled" | "canceled" | "failed" | "reversed" => PaymentStatus::Cancelled,
            _ => PaymentStatus::Unknown,
        },
        None => PaymentStatus::Unknown,
    }
}
