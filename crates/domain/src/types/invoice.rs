//! ERP invoice record.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::impl_domain_status_conversions;

/// Portal-facing invoice status.
///
/// Providers map their own vocabularies into this set; nothing outside it is
/// ever produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Draft,
    Unpaid,
    Paid,
    Cancelled,
    #[default]
    Unknown,
}

impl_domain_status_conversions!(InvoiceStatus {
    Draft => "draft",
    Unpaid => "unpaid",
    Paid => "paid",
    Cancelled => "cancelled",
    Unknown => "unknown",
});

/// Metered consumption billed on an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Consumption {
    pub energy_kwh: Decimal,
    pub volume_m3: Decimal,
    pub thermal_energy_kwh: Option<Decimal>,
}

/// Invoice as reported by the ERP.
///
/// `outstanding` is the ERP's own figure. It usually equals `amount - paid`
/// but credits and write-offs can make it differ, and it is never recomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: String,
    /// Owning customer (a reference; the customer belongs to the ERP).
    pub customer_id: String,
    pub issue_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub amount: Decimal,
    pub paid: Decimal,
    pub outstanding: Decimal,
    pub status: InvoiceStatus,
    pub consumption: Consumption,
    pub meter_reading_date: Option<NaiveDate>,
    /// Provider line items, in ERP order.
    pub line_items: Vec<Value>,
    /// Original provider payload.
    pub raw: Value,
}

impl Invoice {
    /// Whether the invoice still expects money from the customer.
    pub fn is_open(&self) -> bool {
        self.status == InvoiceStatus::Unpaid
    }

    /// Whether the due date has passed on `today` while still open.
    pub fn is_overdue_on(&self, today: NaiveDate) -> bool {
        self.is_open() && self.due_date.is_some_and(|due| due < today)
    }
}
