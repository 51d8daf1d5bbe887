//! Raw ERP payload normalization
//!
//! Pure functions mapping provider wire formats (ERPNext field names as well
//! as generic maps) onto the domain records. Missing optional fields fall back
//! to defaults; only a missing required identifier, or a value of the wrong
//! shape, fails with `ErpError::MalformedPayload`. The raw payload is always
//! kept on the record.

mod customer;
mod fields;
mod invoice;
mod payment;
mod status;

use selfcare_domain::Result;
use serde_json::Value;

pub use customer::normalize_customer;
pub use invoice::normalize_invoice;
pub use payment::normalize_payment;
pub use status::{invoice_status, payment_status};

/// Normalize every row of a listing, skipping rows that fail.
///
/// Failures are logged and dropped.
pub fn normalize_rows<T>(rows: &[Value], normalize: fn(&Value) -> Result<T>) -> Vec<T> {
    rows.iter()
        .enumerate()
        .filter_map(|(index, row)| match normalize(row) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(index, error = %e, "Skipping malformed ERP row");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn malformed_rows_are_skipped() {
        let rows = vec![
            json!({"name": "INV-1", "customer": "CUST-1"}),
            json!({"grand_total": 10}),
            json!({"name": "INV-2", "customer": "CUST-1"}),
        ];
        let invoices = normalize_rows(&rows, normalize_invoice);
        let ids: Vec<_> = invoices.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["INV-1", "INV-2"]);
    }
}
