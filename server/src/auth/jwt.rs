//! JWT token service
//!
//! Generates and validates the access/refresh token pair. Access tokens
//! are short-lived and carry the user identity; refresh tokens are
//! long-lived, carry a `jti` and can be revoked via the denylist.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use ring::rand::{SecureRandom, SystemRandom};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Token type claim for access tokens
pub const TOKEN_TYPE_ACCESS: &str = "access";

/// Token type claim for refresh tokens
pub const TOKEN_TYPE_REFRESH: &str = "refresh";

/// JWT configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Signing secret (at least 32 bytes)
    pub secret: String,
    /// Access token lifetime (minutes)
    pub access_minutes: i64,
    /// Refresh token lifetime (days)
    pub refresh_days: i64,
    /// Token issuer
    pub issuer: String,
    /// Token audience
    pub audience: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        let secret = match load_jwt_secret() {
            Ok(key) => String::from_utf8(key).unwrap_or_else(|_| {
                tracing::error!("JWT secret contains invalid UTF-8 characters");
                generate_secure_printable_jwt_secret()
            }),
            Err(e) => {
                #[cfg(debug_assertions)]
                {
                    tracing::warn!("JWT configuration error: {}, generating temporary key", e);
                    generate_secure_printable_jwt_secret()
                }
                #[cfg(not(debug_assertions))]
                {
                    panic!("FATAL: JWT_SECRET configuration failed: {}", e);
                }
            }
        };

        Self {
            secret,
            access_minutes: std::env::var("JWT_ACCESS_MINUTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(15),
            refresh_days: std::env::var("JWT_REFRESH_DAYS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(7),
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "farmacia-server".to_string()),
            audience: std::env::var("JWT_AUDIENCE")
                .unwrap_or_else(|_| "farmacia-clients".to_string()),
        }
    }
}

impl JwtConfig {
    /// Fixed-secret config for tests
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            secret: "test-secret-test-secret-test-secret-1234".to_string(),
            access_minutes: 15,
            refresh_days: 7,
            issuer: "farmacia-server".to_string(),
            audience: "farmacia-clients".to_string(),
        }
    }
}

/// JWT claims stored in both token types
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID (subject)
    pub sub: String,
    /// Username
    pub username: String,
    /// Role name ("admin" | "customer")
    pub role: String,
    /// Token type ("access" | "refresh")
    pub token_type: String,
    /// Token ID, revocable for refresh tokens
    pub jti: String,
    /// Expiry timestamp
    pub exp: i64,
    /// Issued-at timestamp
    pub iat: i64,
    /// Issuer
    pub iss: String,
    /// Audience
    pub aud: String,
}

/// JWT errors
#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token expired")]
    ExpiredToken,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Wrong token type: expected {expected}, got {got}")]
    WrongTokenType { expected: String, got: String },

    #[error("Token generation failed: {0}")]
    GenerationFailed(String),

    #[error("Key generation failed: {0}")]
    KeyGenerationFailed(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Generate a secure random JWT secret
pub fn generate_secure_jwt_secret() -> Result<Vec<u8>, JwtError> {
    let rng = SystemRandom::new();
    let mut key = vec![0u8; 32];

    rng.fill(&mut key).map_err(|_| {
        JwtError::KeyGenerationFailed("Failed to generate secure random key".to_string())
    })?;

    Ok(key)
}

/// Generate a printable secure JWT secret (development environments)
pub fn generate_secure_printable_jwt_secret() -> String {
    let allowed_chars =
        "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*()-_=+[]{}|;:,.<>?";

    let rng = SystemRandom::new();
    let mut key = String::new();

    for _ in 0..64 {
        let mut byte = [0u8; 1];
        if rng.fill(&mut byte).is_err() {
            return "FarmaciaDevelopmentSecureKey2024!ReplaceInProd".to_string();
        }
        let idx = (byte[0] as usize) % allowed_chars.len();
        if let Some(c) = allowed_chars.chars().nth(idx) {
            key.push(c);
        }
    }

    key
}

/// Load the JWT secret from the environment
fn load_jwt_secret() -> Result<Vec<u8>, JwtError> {
    match std::env::var("JWT_SECRET") {
        Ok(secret) => {
            if secret.len() < 32 {
                return Err(JwtError::ConfigError(
                    "JWT_SECRET must be at least 32 characters long".to_string(),
                ));
            }
            Ok(secret.into_bytes())
        }
        Err(_) => {
            #[cfg(debug_assertions)]
            {
                tracing::warn!(
                    "JWT_SECRET not set! Generating secure temporary key for development."
                );
                Ok(generate_secure_printable_jwt_secret().into_bytes())
            }
            #[cfg(not(debug_assertions))]
            {
                Err(JwtError::ConfigError(
                    "JWT_SECRET environment variable must be set in production!".to_string(),
                ))
            }
        }
    }
}

/// JWT token service
#[derive(Debug, Clone)]
pub struct JwtService {
    pub config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    /// Create with the default configuration
    pub fn new() -> Self {
        Self::with_config(JwtConfig::default())
    }

    /// Create with a specific configuration
    pub fn with_config(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    fn generate(
        &self,
        user_id: &str,
        username: &str,
        role: &str,
        token_type: &str,
        lifetime: Duration,
    ) -> Result<String, JwtError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            username: username.to_string(),
            role: role.to_string(),
            token_type: token_type.to_string(),
            jti: Uuid::new_v4().to_string(),
            exp: (now + lifetime).timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::GenerationFailed(e.to_string()))
    }

    /// Generate a short-lived access token
    pub fn generate_access_token(
        &self,
        user_id: &str,
        username: &str,
        role: &str,
    ) -> Result<String, JwtError> {
        self.generate(
            user_id,
            username,
            role,
            TOKEN_TYPE_ACCESS,
            Duration::minutes(self.config.access_minutes),
        )
    }

    /// Generate a long-lived refresh token with a fresh jti
    pub fn generate_refresh_token(
        &self,
        user_id: &str,
        username: &str,
        role: &str,
    ) -> Result<String, JwtError> {
        self.generate(
            user_id,
            username,
            role,
            TOKEN_TYPE_REFRESH,
            Duration::days(self.config.refresh_days),
        )
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[&self.config.audience]);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_required_spec_claims(&["sub", "exp", "iat", "iss", "aud"]);
        validation
    }

    fn decode_with(&self, token: &str, validation: &Validation) -> Result<Claims, JwtError> {
        let token_data =
            decode::<Claims>(token, &self.decoding_key, validation).map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
                ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                ErrorKind::InvalidToken => JwtError::InvalidToken(e.to_string()),
                _ => JwtError::InvalidToken(format!("Token validation failed: {}", e)),
            })?;
        Ok(token_data.claims)
    }

    /// Validate a token and check its type claim
    pub fn validate_token(&self, token: &str, expected_type: &str) -> Result<Claims, JwtError> {
        let claims = self.decode_with(token, &self.validation())?;
        if claims.token_type != expected_type {
            return Err(JwtError::WrongTokenType {
                expected: expected_type.to_string(),
                got: claims.token_type,
            });
        }
        Ok(claims)
    }

    /// Validate signature and type but accept expired tokens
    ///
    /// Used by logout: revoking an already-expired refresh token is a no-op
    /// but must not fail.
    pub fn validate_ignore_expiry(
        &self,
        token: &str,
        expected_type: &str,
    ) -> Result<Claims, JwtError> {
        let mut validation = self.validation();
        validation.validate_exp = false;
        let claims = self.decode_with(token, &validation)?;
        if claims.token_type != expected_type {
            return Err(JwtError::WrongTokenType {
                expected: expected_type.to_string(),
                got: claims.token_type,
            });
        }
        Ok(claims)
    }

    /// Extract the bearer token from an Authorization header
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header.strip_prefix("Bearer ")
    }

    /// Access token lifetime in seconds, for the login response
    pub fn access_expires_in(&self) -> i64 {
        self.config.access_minutes * 60
    }
}

impl Default for JwtService {
    fn default() -> Self {
        Self::new()
    }
}

/// Current user context, parsed from access token claims
///
/// Created by the auth middleware and injected into request extensions.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// User ID
    pub id: String,
    /// Username
    pub username: String,
    /// Role name
    pub role: String,
}

impl From<Claims> for CurrentUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            username: claims.username,
            role: claims.role,
        }
    }
}

impl CurrentUser {
    /// Whether this user holds the admin role
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_service() -> JwtService {
        JwtService::with_config(JwtConfig::for_tests())
    }

    #[test]
    fn test_access_token_round_trip() {
        let service = test_service();

        let token = service
            .generate_access_token("user:abc", "maria", "customer")
            .expect("Failed to generate token");

        let claims = service
            .validate_token(&token, TOKEN_TYPE_ACCESS)
            .expect("Failed to validate token");

        assert_eq!(claims.sub, "user:abc");
        assert_eq!(claims.username, "maria");
        assert_eq!(claims.role, "customer");
        assert_eq!(claims.token_type, TOKEN_TYPE_ACCESS);
        assert!(!claims.jti.is_empty());
    }

    #[test]
    fn test_refresh_token_rejected_as_access() {
        let service = test_service();

        let refresh = service
            .generate_refresh_token("user:abc", "maria", "customer")
            .expect("Failed to generate refresh token");

        let err = service
            .validate_token(&refresh, TOKEN_TYPE_ACCESS)
            .unwrap_err();
        assert!(matches!(err, JwtError::WrongTokenType { .. }));
    }

    #[test]
    fn test_refresh_tokens_get_distinct_jti() {
        let service = test_service();

        let t1 = service
            .generate_refresh_token("user:abc", "maria", "customer")
            .expect("token 1");
        let t2 = service
            .generate_refresh_token("user:abc", "maria", "customer")
            .expect("token 2");

        let c1 = service.validate_token(&t1, TOKEN_TYPE_REFRESH).expect("c1");
        let c2 = service.validate_token(&t2, TOKEN_TYPE_REFRESH).expect("c2");
        assert_ne!(c1.jti, c2.jti);
    }

    #[test]
    fn test_tampered_token_rejected() {
        let service = test_service();
        let other = JwtService::with_config(JwtConfig {
            secret: "another-secret-another-secret-another-00".to_string(),
            ..JwtConfig::for_tests()
        });

        let token = other
            .generate_access_token("user:abc", "maria", "customer")
            .expect("token");

        assert!(service.validate_token(&token, TOKEN_TYPE_ACCESS).is_err());
    }

    #[test]
    fn test_current_user_roles() {
        let admin = CurrentUser {
            id: "user:1".to_string(),
            username: "admin".to_string(),
            role: "admin".to_string(),
        };
        let customer = CurrentUser {
            id: "user:2".to_string(),
            username: "maria".to_string(),
            role: "customer".to_string(),
        };

        assert!(admin.is_admin());
        assert!(!customer.is_admin());
    }

    #[test]
    fn test_secure_key_generation() {
        let key1 = generate_secure_jwt_secret().expect("key 1");
        let key2 = generate_secure_jwt_secret().expect("key 2");

        assert_ne!(key1, key2);
        assert_eq!(key1.len(), 32);
        assert_eq!(key2.len(), 32);
    }
}
