use selfcare_domain::{Customer, CustomerStatus, Result};
use serde_json::Value;

use super::fields;

const ID_KEYS: &[&str] = &["id", "customer_id", "name"];
const NAME_KEYS: &[&str] = &["customer_name", "display_name", "name"];
const ADDRESS_KEYS: &[&str] = &["address", "primary_address", "address_display"];
const HEATMETER_KEYS: &[&str] = &["heatmeter_id", "custom_heatmeter_id", "heatmeter"];
const BALANCE_KEYS: &[&str] = &["balance", "outstanding_balance", "outstanding_amount"];

/// Normalize a raw customer payload.
///
/// ERPNext uses the document `name` as identifier and `customer_name` for
/// display; generic payloads carry `id` and `name`.
///
/// # Errors
/// `ErpError::MalformedPayload` when no identifier is present or the balance
/// is not numeric.
pub fn normalize_customer(raw: &Value) -> Result<Customer> {
    let id = fields::required_text(raw, ID_KEYS, "customer id")?;
    let name = fields::text(raw, NAME_KEYS).unwrap_or_else(|| id.clone());

    Ok(Customer {
        name,
        address: fields::text(raw, ADDRESS_KEYS).map(|a| flatten_address(&a)).unwrap_or_default(),
        heatmeter_id: fields::text(raw, HEATMETER_KEYS),
        balance: fields::decimal(raw, BALANCE_KEYS)?,
        status: customer_status(raw),
        metadata: raw.clone(),
        id,
    })
}

fn customer_status(raw: &Value) -> CustomerStatus {
    if fields::flag(raw, "disabled") {
        return CustomerStatus::Inactive;
    }
    fields::text(raw, &["status"])
        .and_then(|s| s.parse().ok())
        .unwrap_or_default()
}

/// ERPNext renders addresses as HTML fragments separated by `<br>`.
fn flatten_address(address: &str) -> String {
    address
        .lines()
        .flat_map(|line| line.split("<br>"))
        .flat_map(|line| line.split("<br/>"))
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}
