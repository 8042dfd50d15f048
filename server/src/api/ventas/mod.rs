//! Sales API
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /api/ventas/{id} | GET | owner or admin |
//! | /api/ventas/{id}/completar | POST | owner or admin |
//! | /api/ventas/{id}/cancelar | POST | owner or admin |
//! | /api/ventas/reporte | GET | admin |

mod handler;

use axum::{Router, middleware, routing::get, routing::post};

use crate::auth::require_admin;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/ventas", sale_routes())
}

fn sale_routes() -> Router<ServerState> {
    // "/reporte" must be registered alongside "/{id}" so axum prefers
    // the static segment
    Router::new()
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/completar", post(handler::complete))
        .route("/{id}/cancelar", post(handler::cancel))
        .merge(admin_routes())
}

fn admin_routes() -> Router<ServerState> {
    Router::new()
        .route("/reporte", get(handler::report))
        .layer(middleware::from_fn(require_admin))
}
