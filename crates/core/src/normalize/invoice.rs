use selfcare_domain::{Consumption, Invoice, InvoiceStatus, Result};
use serde_json::Value;

use super::{fields, status};

const ID_KEYS: &[&str] = &["id", "invoice_id", "name"];
const CUSTOMER_KEYS: &[&str] = &["customer", "customer_id"];
// Posting date first; providers that only send a due date still get an issue date.
const ISSUE_DATE_KEYS: &[&str] = &["posting_date", "issue_date", "date", "due_date"];
const DUE_DATE_KEYS: &[&str] =
    &["due_date", "payment_due_date", "posting_date", "issue_date", "date"];
const AMOUNT_KEYS: &[&str] = &["grand_total", "amount", "total"];
const PAID_KEYS: &[&str] = &["paid_amount", "paid"];
const OUTSTANDING_KEYS: &[&str] = &["outstanding_amount", "outstanding"];
const METER_READING_KEYS: &[&str] = &["meter_reading_date", "custom_meter_reading_date"];

/// Normalize a raw invoice payload.
///
/// `outstanding` is taken from the ERP as-is, even when it disagrees with
/// `amount - paid`.
///
/// # Errors
/// `ErpError::MalformedPayload` when the invoice or customer identifier is
/// missing, or an amount is not numeric.
pub fn normalize_invoice(raw: &Value) -> Result<Invoice> {
    let id = fields::required_text(raw, ID_KEYS, "invoice id")?;
    let customer_id = fields::required_text(raw, CUSTOMER_KEYS, "invoice customer")?;

    Ok(Invoice {
        id,
        customer_id,
        issue_date: fields::date(raw, ISSUE_DATE_KEYS),
        due_date: fields::date(raw, DUE_DATE_KEYS),
        amount: fields::decimal(raw, AMOUNT_KEYS)?,
        paid: fields::decimal(raw, PAID_KEYS)?,
        outstanding: fields::decimal(raw, OUTSTANDING_KEYS)?,
        status: fields::text(raw, &["status"])
            .map_or(InvoiceStatus::Unknown, |s| status::invoice_status(&s)),
        consumption: consumption(raw)?,
        meter_reading_date: fields::date(raw, METER_READING_KEYS),
        line_items: line_items(raw),
        raw: raw.clone(),
    })
}

/// Metered values live either in a nested `consumption` object or as
/// top-level (ERPNext custom) fields.
fn consumption(raw: &Value) -> Result<Consumption> {
    let source = raw.get("consumption").filter(|v| v.is_object()).unwrap_or(raw);
    Ok(Consumption {
        energy_kwh: fields::decimal(source, &["energy_kwh", "custom_energy_kwh"])?,
        volume_m3: fields::decimal(source, &["volume_m3", "custom_volume_m3"])?,
        thermal_energy_kwh: fields::optional_decimal(
            source,
            &["thermal_energy_kwh", "custom_thermal_energy_kwh"],
        )?,
    })
}

fn line_items(raw: &Value) -> Vec<Value> {
    ["items", "line_items"]
        .iter()
        .find_map(|key| raw.get(*key).and_then(Value::as_array))
        .cloned()
        .unwrap_or_default()
}
