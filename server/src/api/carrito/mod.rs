//! Cart API
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /api/carrito | GET | token |
//! | /api/carrito | POST | token (add item) |
//! | /api/carrito | DELETE | token (empty cart) |
//! | /api/carrito/{producto_id} | DELETE | token (remove item) |
//! | /api/carrito/checkout | POST | token |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/carrito", cart_routes())
}

fn cart_routes() -> Router<ServerState> {
    Router::new()
        .route(
            "/",
            get(handler::get_cart)
                .post(handler::add_item)
                .delete(handler::clear),
        )
        .route("/{producto_id}", axum::routing::delete(handler::remove_item))
        .route("/checkout", post(handler::checkout))
}
