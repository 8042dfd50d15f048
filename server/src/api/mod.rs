//! HTTP API
//!
//! Each resource ships its own router; `core::server::build_app` merges
//! them. All `/api/` routes run behind the auth middleware; admin-only
//! routers layer `require_admin` on top.

pub mod auth;
pub mod carrito;
pub mod health;
pub mod productos;
pub mod ventas;
