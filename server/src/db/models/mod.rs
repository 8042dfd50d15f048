//! Database models

pub mod product;
pub mod sale;
pub mod serde_helpers;
pub mod user;

pub use product::{Product, ProductCreate, ProductId, ProductUpdate};
pub use sale::{Sale, SaleId, SaleLine, SaleModality, SaleState};
pub use user::{User, UserCreate, UserId, UserRole};
