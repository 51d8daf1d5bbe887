//! ERP customer record.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::impl_domain_status_conversions;

/// Whether the ERP still considers the customer active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomerStatus {
    #[default]
    Active,
    Inactive,
}

impl_domain_status_conversions!(CustomerStatus {
    Active => "active",
    Inactive => "inactive",
});

/// Customer as owned by the ERP.
///
/// `balance` is in the portal's base currency. It is non-negative unless the
/// ERP reports a credit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    /// ERP-assigned identifier; immutable.
    pub id: String,
    pub name: String,
    /// Postal address, empty when the ERP has none on file.
    pub address: String,
    pub heatmeter_id: Option<String>,
    pub balance: Decimal,
    pub status: CustomerStatus,
    /// Original provider payload, kept for audit and debugging.
    pub metadata: Value,
}

impl Customer {
    /// Whether the customer may use the portal.
    pub fn is_active(&self) -> bool {
        self.status == CustomerStatus::Active
    }

    /// Whether the ERP reports the customer in credit.
    pub fn has_credit(&self) -> bool {
        self.balance.is_sign_negative() && !self.balance.is_zero()
    }
}
