//! Product API
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /api/productos | GET | token |
//! | /api/productos/{id} | GET | token |
//! | /api/productos | POST | admin |
//! | /api/productos/{id} | PUT | admin |
//! | /api/productos/{id} | DELETE | admin (soft delete) |
//! | /api/productos/{id}/restaurar | POST | admin |
//! | /api/productos/{id}/imagen | GET | token |
//! | /api/productos/{id}/imagen | POST | admin (multipart) |

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::require_admin;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/productos", read_routes().merge(manage_routes()))
}

fn read_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/imagen", get(handler::get_image))
}

fn manage_routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::create))
        .route(
            "/{id}",
            axum::routing::put(handler::update).delete(handler::soft_delete),
        )
        .route("/{id}/restaurar", post(handler::restore))
        .route("/{id}/imagen", post(handler::upload_image))
        .layer(middleware::from_fn(require_admin))
}
