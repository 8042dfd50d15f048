//! Startup and runtime errors
//!
//! [`ServerError`] covers failures before the HTTP layer is serving;
//! request-level errors use [`crate::AppError`].

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cache store error: {0}")]
    Cache(#[from] crate::cache::CacheError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Result type for bootstrap code
pub type Result<T> = std::result::Result<T, ServerError>;
