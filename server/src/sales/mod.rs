//! Sales module
//!
//! [`SalesManager`] owns the business rules around carts and the sale
//! lifecycle. Handlers stay thin and call into it.

pub mod manager;

pub use manager::{CartLine, CartView, ReportQuery, SalesManager, SalesReport};
