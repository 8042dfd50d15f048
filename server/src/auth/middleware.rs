//! Authentication middleware
//!
//! `require_auth` guards every `/api/` route except the public auth
//! endpoints. `require_admin` layers on top of specific routers and
//! relies on the `CurrentUser` the outer middleware injected.

use axum::body::Body;
use axum::extract::State;
use axum::http::{Method, Request, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use shared::error::{AppError, ErrorCode};

use crate::auth::jwt::{CurrentUser, TOKEN_TYPE_ACCESS};
use crate::core::ServerState;
use crate::security_log;

/// Routes under /api/ that never require a token
const PUBLIC_PATHS: &[&str] = &["/api/auth/login", "/api/auth/registro", "/api/auth/refresh"];

fn is_public(path: &str) -> bool {
    PUBLIC_PATHS.contains(&path)
}

/// Require a valid access token for protected API routes
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    // CORS preflight never carries credentials
    if req.method() == Method::OPTIONS {
        return next.run(req).await;
    }

    let path = req.uri().path();
    if !path.starts_with("/api/") || is_public(path) {
        return next.run(req).await;
    }

    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(crate::auth::jwt::JwtService::extract_from_header);

    let Some(token) = token else {
        security_log!("Missing bearer token for {}", path);
        return AppError::not_authenticated().into_response();
    };

    let claims = match state
        .get_jwt_service()
        .validate_token(token, TOKEN_TYPE_ACCESS)
    {
        Ok(claims) => claims,
        Err(e) => {
            security_log!("Rejected access token for {}: {}", path, e);
            return map_access_token_error(e).into_response();
        }
    };

    req.extensions_mut().insert(CurrentUser::from(claims));
    next.run(req).await
}

/// Require the admin role; must run inside `require_auth`
pub async fn require_admin(req: Request<Body>, next: Next) -> Response {
    match req.extensions().get::<CurrentUser>() {
        Some(user) if user.is_admin() => next.run(req).await,
        Some(user) => {
            security_log!(
                "User '{}' denied admin access to {}",
                user.username,
                req.uri().path()
            );
            AppError::new(ErrorCode::AdminRequired).into_response()
        }
        None => AppError::not_authenticated().into_response(),
    }
}

fn map_access_token_error(err: crate::auth::jwt::JwtError) -> AppError {
    match err {
        crate::auth::jwt::JwtError::ExpiredToken => AppError::token_expired(),
        _ => AppError::invalid_token(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_paths() {
        assert!(is_public("/api/auth/login"));
        assert!(is_public("/api/auth/registro"));
        assert!(is_public("/api/auth/refresh"));
        assert!(!is_public("/api/auth/logout"));
        assert!(!is_public("/api/productos"));
    }
}
