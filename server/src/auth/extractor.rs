//! Axum extractor for the authenticated user
//!
//! Handlers take `CurrentUser` as an argument. The auth middleware has
//! already validated the token and stashed the user in the request
//! extensions; the fallback path re-validates the header for routes
//! mounted outside the middleware.

use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;

use shared::error::AppError;

use crate::auth::jwt::{CurrentUser, JwtService, TOKEN_TYPE_ACCESS};
use crate::core::ServerState;

impl FromRequestParts<ServerState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }

        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(JwtService::extract_from_header)
            .ok_or_else(AppError::not_authenticated)?;

        let claims = state
            .get_jwt_service()
            .validate_token(token, TOKEN_TYPE_ACCESS)
            .map_err(|_| AppError::invalid_token())?;

        let user = CurrentUser::from(claims);
        parts.extensions.insert(user.clone());
        Ok(user)
    }
}
