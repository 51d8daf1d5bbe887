//! ERP backends implementing [`selfcare_core::ErpAdapter`].

pub mod erpnext;
pub mod mock;

pub use erpnext::ErpNextAdapter;
pub use mock::{MockErpAdapter, MockFailure, MockOperation};
