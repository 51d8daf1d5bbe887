//! Normalized, provider-agnostic records.
//!
//! Every record is a value object: built fresh from an ERP response or cache
//! hit and never mutated afterwards.

pub mod customer;
pub mod filters;
pub mod invoice;
pub mod payment;
pub mod provider;

pub use customer::{Customer, CustomerStatus};
pub use filters::InvoiceFilters;
pub use invoice::{Consumption, Invoice, InvoiceStatus};
pub use payment::{Payment, PaymentMethod, PaymentStatus};
pub use provider::ProviderKind;
