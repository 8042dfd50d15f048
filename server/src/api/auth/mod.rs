//! Authentication API
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /api/auth/registro | POST | none |
//! | /api/auth/login | POST | none |
//! | /api/auth/refresh | POST | none (refresh token in body) |
//! | /api/auth/logout | POST | access token |
//! | /api/auth/me | GET | access token |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/auth", auth_routes())
}

fn auth_routes() -> Router<ServerState> {
    Router::new()
        .route("/registro", post(handler::registro))
        .route("/login", post(handler::login))
        .route("/refresh", post(handler::refresh))
        .route("/logout", post(handler::logout))
        .route("/me", get(handler::me))
}
