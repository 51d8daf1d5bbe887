use selfcare_domain::{Payment, PaymentMethod, Result};
use serde_json::Value;

use super::fields;

const CUSTOMER_KEYS: &[&str] = &["party", "customer", "customer_id"];
const INVOICE_KEYS: &[&str] = &["invoice_id", "invoice", "reference_name"];
const AMOUNT_KEYS: &[&str] = &["paid_amount", "amount"];
const DATE_KEYS: &[&str] = &["posting_date", "payment_date", "reference_date"];
const REFERENCE_KEYS: &[&str] = &["reference_no", "reference"];
const METHOD_KEYS: &[&str] = &["mode_of_payment", "method", "payment_method"];
const ERP_ID_KEYS: &[&str] = &["erp_id", "name", "id"];

/// Normalize a raw payment payload.
///
/// ERPNext payment entries link their invoice through the first row of
/// `references`; generic payloads name it directly.
///
/// # Errors
/// `ErpError::MalformedPayload` when the customer or invoice reference is
/// missing, or the amount is not numeric.
pub fn normalize_payment(raw: &Value) -> Result<Payment> {
    let customer_id = fields::required_text(raw, CUSTOMER_KEYS, "payment customer")?;
    let invoice_id = match fields::text(raw, INVOICE_KEYS).or_else(|| referenced_invoice(raw)) {
        Some(id) => id,
        None => fields::required_text(raw, INVOICE_KEYS, "payment invoice")?,
    };

    Ok(Payment {
        customer_id,
        invoice_id,
        amount: fields::decimal(raw, AMOUNT_KEYS)?,
        payment_date: fields::date(raw, DATE_KEYS),
        reference: fields::text(raw, REFERENCE_KEYS).unwrap_or_default(),
        method: fields::text(raw, METHOD_KEYS)
            .map(|m| m.parse().unwrap_or(PaymentMethod::Other(m)))
            .unwrap_or_default(),
        erp_id: fields::text(raw, ERP_ID_KEYS),
        metadata: raw.clone(),
    })
}

fn referenced_invoice(raw: &Value) -> Option<String> {
    raw.get("references")?
        .as_array()?
        .iter()
        .find_map(|row| fields::text(row, &["reference_name"]))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use serde_json::json;

    use super::*;

    #[test]
    fn erpnext_payment_entry() {
        let raw = json!({
            "name": "ACC-PAY-2024-00001",
            "party": "CUST-1",
            "paid_amount": "45.00",
            "posting_date": "2024-03-01",
            "reference_no": "PAY-REF-1",
            "mode_of_payment": "Bank Transfer",
            "references": [{"reference_doctype": "Sales Invoice", "reference_name": "INV-9"}],
        });
        let payment = normalize_payment(&raw).unwrap();
        assert_eq!(payment.customer_id, "CUST-1");
        assert_eq!(payment.invoice_id, "INV-9");
        assert_eq!(payment.amount, Decimal::new(4500, 2));
        assert_eq!(payment.payment_date, NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(payment.reference, "PAY-REF-1");
        assert_eq!(payment.method, PaymentMethod::BankTransfer);
        assert_eq!(payment.erp_id.as_deref(), Some("ACC-PAY-2024-00001"));
    }

    #[test]
    fn minimal_generic_payment() {
        let payment = normalize_payment(&json!({"customer_id": "C", "invoice_id": "I"})).unwrap();
        assert_eq!(payment.amount, Decimal::ZERO);
        assert_eq!(payment.method, PaymentMethod::Unspecified);
        assert!(payment.erp_id.is_none());
        assert!(payment.payment_date.is_none());
    }

    #[test]
    fn unknown_method_is_kept_verbatim() {
        let raw = json!({"customer": "C", "invoice": "I", "method": "Cheque"});
        assert_eq!(
            normalize_payment(&raw).unwrap().method,
            PaymentMethod::Other("Cheque".to_string())
        );
    }

    #[test]
    fn missing_invoice_is_malformed() {
        assert!(normalize_payment(&json!({"party": "C", "references": []})).is_err());
    }
}
