//! ERPNext (Frappe) REST integration
//!
//! Token-authenticated access to the Frappe resource and method APIs:
//! - `Customer`, `Sales Invoice` and `Payment Entry` documents via
//!   `/api/resource/<doctype>`
//! - balances via `erpnext.accounts.utils.get_balance_on`
//! - invoice documents via `frappe.utils.print_format.download_pdf`

mod client;
mod filters;

pub use client::ErpNextAdapter;
