//! ERP payment record.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::impl_domain_status_conversions;

/// How the customer paid.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PaymentMethod {
    Card,
    BankTransfer,
    Cash,
    /// A provider-specific method name, kept verbatim.
    Other(String),
    #[default]
    Unspecified,
}

impl PaymentMethod {
    /// Human-readable label, as ERP "mode of payment" values are spelled.
    pub fn label(&self) -> &str {
        match self {
            Self::Card => "Card",
            Self::BankTransfer => "Bank Transfer",
            Self::Cash => "Cash",
            Self::Other(name) => name,
            Self::Unspecified => "",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PaymentMethod {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let method = match trimmed.to_lowercase().as_str() {
            "" => Self::Unspecified,
            "card" | "credit card" | "debit card" => Self::Card,
            "bank transfer" | "bank_transfer" | "wire transfer" | "bank draft" => Self::BankTransfer,
            "cash" => Self::Cash,
            _ => Self::Other(trimmed.to_string()),
        };
        Ok(method)
    }
}

/// Settlement state of a payment inside the ERP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Recorded but not yet submitted/posted.
    Pending,
    Completed,
    Cancelled,
    Unknown,
}

impl_domain_status_conversions!(PaymentStatus {
    Pending => "pending",
    Completed => "completed",
    Cancelled => "cancelled",
    Unknown => "unknown",
});

/// Payment against one invoice.
///
/// `reference` is the caller-supplied idempotency token the ERP uses to
/// de-duplicate; it must stay identical across retries of the same payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub customer_id: String,
    pub invoice_id: String,
    pub amount: Decimal,
    pub payment_date: Option<NaiveDate>,
    pub reference: String,
    pub method: PaymentMethod,
    /// ERP identifier, absent until the ERP acknowledges creation.
    pub erp_id: Option<String>,
    pub metadata: Value,
}

impl Payment {
    /// A payment the portal is about to submit.
    pub fn new(
        customer_id: impl Into<String>,
        invoice_id: impl Into<String>,
        amount: Decimal,
        method: PaymentMethod,
        reference: impl Into<String>,
        payment_date: NaiveDate,
    ) -> Self {
        Self {
            customer_id: customer_id.into(),
            invoice_id: invoice_id.into(),
            amount,
            payment_date: Some(payment_date),
            reference: reference.into(),
            method,
            erp_id: None,
            metadata: Value::Object(serde_json::Map::new()),
        }
    }

    /// Attach audit metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = metadata;
        self
    }

    /// Whether the ERP has acknowledged this payment.
    pub fn is_acknowledged(&self) -> bool {
        self.erp_id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_parsing_recognises_common_labels() {
        assert_eq!("card".parse::<PaymentMethod>().unwrap(), PaymentMethod::Card);
        assert_eq!("Bank Transfer".parse::<PaymentMethod>().unwrap(), PaymentMethod::BankTransfer);
        assert_eq!("CASH".parse::<PaymentMethod>().unwrap(), PaymentMethod::Cash);
        assert_eq!("".parse::<PaymentMethod>().unwrap(), PaymentMethod::Unspecified);
        assert_eq!(
            "Cheque".parse::<PaymentMethod>().unwrap(),
            PaymentMethod::Other("Cheque".to_string())
        );
    }

    #[test]
    fn method_label_round_trips_through_parse() {
        for method in [PaymentMethod::Card, PaymentMethod::BankTransfer, PaymentMethod::Cash] {
            assert_eq!(method.label().parse::<PaymentMethod>().unwrap(), method);
        }
    }

    #[test]
    fn new_payment_is_unacknowledged() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let payment = Payment::new(
            "CUST-1",
            "INV-9",
            Decimal::new(4500, 2),
            PaymentMethod::Card,
            "PAY-REF-1",
            date,
        );
        assert!(!payment.is_acknowledged());
        assert_eq!(payment.payment_date, Some(date));
        assert_eq!(payment.reference, "PAY-REF-1");
    }
}
