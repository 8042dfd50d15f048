//! Authentication module
//!
//! - [`JwtService`] - token signing and validation
//! - [`TokenService`] - refresh token lifecycle (issue, rotate, revoke)
//! - [`CurrentUser`] - authenticated user context
//! - [`require_auth`] / [`require_admin`] - axum middleware

pub mod extractor;
pub mod jwt;
pub mod middleware;
pub mod service;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService, TOKEN_TYPE_ACCESS, TOKEN_TYPE_REFRESH};
pub use middleware::{require_admin, require_auth};
pub use service::TokenService;
