//! Read-cache key derivation
//!
//! Keys are `customer:<id>` and `invoices:<id>:<filter hash>`. The filter hash
//! is taken over the canonical JSON of the filter map, so equivalent filter
//! sets land on the same entry whatever order they were built in.

use selfcare_domain::constants::{CUSTOMER_CACHE_PREFIX, INVOICES_CACHE_PREFIX};
use selfcare_domain::InvoiceFilters;

/// Key for a single customer lookup.
pub fn customer_key(customer_id: &str) -> String {
    format!("{CUSTOMER_CACHE_PREFIX}:{customer_id}")
}

/// Key for one invoice listing of a customer.
pub fn invoices_key(customer_id: &str, filters: &InvoiceFilters) -> String {
    format!("{}{}", invoices_prefix(customer_id), filter_hash(filters))
}

/// Prefix shared by every invoice listing of a customer.
pub fn invoices_prefix(customer_id: &str) -> String {
    format!("{INVOICES_CACHE_PREFIX}:{customer_id}:")
}

/// Hex-encoded BLAKE3 digest (128 bits) of the canonical filter JSON.
pub fn filter_hash(filters: &InvoiceFilters) -> String {
    let digest = blake3::hash(filters.canonical_json().as_bytes());
    hex::encode(&digest.as_bytes()[..16])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_order_does_not_change_key() {
        let a = InvoiceFilters::new().with("status", "unpaid").with("limit", 10);
        let b = InvoiceFilters::new().with("limit", 10).with("status", "unpaid");
        assert_eq!(invoices_key("CUST-1", &a), invoices_key("CUST-1", &b));
    }

    #[test]
    fn different_filters_produce_different_keys() {
        let unpaid = InvoiceFilters::new().with("status", "unpaid");
        let paid = InvoiceFilters::new().with("status", "paid");
        assert_ne!(invoices_key("CUST-1", &unpaid), invoices_key("CUST-1", &paid));
        assert_ne!(
            invoices_key("CUST-1", &InvoiceFilters::new()),
            invoices_key("CUST-2", &InvoiceFilters::new())
        );
    }

    #[test]
    fn key_shapes() {
        assert_eq!(customer_key("CUST-1"), "customer:CUST-1");
        let key = invoices_key("CUST-1", &InvoiceFilters::new());
        assert!(key.starts_with(&invoices_prefix("CUST-1")));
        assert_eq!(key.len(), "invoices:CUST-1:".len() + 32);
    }
}
