//! Token Service
//!
//! Issues access/refresh pairs and enforces refresh revocation through
//! the persistent denylist. Refresh tokens rotate: every successful
//! refresh revokes the presented token's jti before a new pair goes out.

use std::sync::Arc;

use shared::client::TokenPair;
use shared::error::{AppError, AppResult, ErrorCode};

use crate::auth::jwt::{Claims, JwtError, JwtService, TOKEN_TYPE_REFRESH};
use crate::cache::TokenDenylist;
use crate::db::models::User;
use crate::security_log;

#[derive(Clone)]
pub struct TokenService {
    jwt: Arc<JwtService>,
    denylist: TokenDenylist,
}

impl TokenService {
    pub fn new(jwt: Arc<JwtService>, denylist: TokenDenylist) -> Self {
        Self { jwt, denylist }
    }

    /// Issue a fresh access/refresh pair for a user
    pub fn issue(&self, user: &User) -> AppResult<TokenPair> {
        let id = user.id_string();
        if id.is_empty() {
            return Err(AppError::internal("Cannot issue tokens for an unsaved user"));
        }
        let role = user.role.as_str();

        let access_token = self
            .jwt
            .generate_access_token(&id, &user.username, role)
            .map_err(|e| AppError::internal(format!("Token generation failed: {e}")))?;
        let refresh_token = self
            .jwt
            .generate_refresh_token(&id, &user.username, role)
            .map_err(|e| AppError::internal(format!("Token generation failed: {e}")))?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            expires_in: self.jwt.access_expires_in(),
        })
    }

    /// Validate a refresh token and check it against the denylist
    pub fn verify_refresh(&self, token: &str) -> AppResult<Claims> {
        let claims = self
            .jwt
            .validate_token(token, TOKEN_TYPE_REFRESH)
            .map_err(map_jwt_error)?;

        if self.denylist.is_revoked(&claims.jti)? {
            security_log!(
                "Revoked refresh token presented for user '{}'",
                claims.username
            );
            return Err(AppError::new(ErrorCode::TokenRevoked));
        }

        Ok(claims)
    }

    /// Revoke a refresh token's jti until its natural expiry
    ///
    /// Expired tokens are accepted here so logout always succeeds.
    pub fn revoke(&self, token: &str) -> AppResult<()> {
        let claims = self
            .jwt
            .validate_ignore_expiry(token, TOKEN_TYPE_REFRESH)
            .map_err(map_jwt_error)?;
        self.denylist.revoke(&claims.jti, claims.exp)?;
        Ok(())
    }
}

fn map_jwt_error(err: JwtError) -> AppError {
    match err {
        JwtError::ExpiredToken => AppError::token_expired(),
        _ => AppError::invalid_token(),
    }
}
