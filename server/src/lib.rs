//! Pharmacy point-of-sale backend
//!
//! # Module structure
//!
//! ```text
//! server/src/
//! ├── core/          # Config, state, server bootstrap
//! ├── auth/          # JWT access/refresh tokens, middleware
//! ├── db/            # Embedded SurrealDB: models + repositories
//! ├── cache/         # redb volatile store: carts, token denylist
//! ├── sales/         # Sale lifecycle: checkout, complete, cancel, report
//! ├── api/           # HTTP routes and handlers
//! └── utils/         # Errors, logging, validation, retry
//! ```

pub mod api;
pub mod auth;
pub mod cache;
pub mod core;
pub mod db;
pub mod sales;
pub mod storage;
pub mod utils;

// Re-export common types
pub use auth::{CurrentUser, JwtService, TokenService};
pub use cache::CacheStorage;
pub use core::{Config, Server, ServerState};
pub use sales::SalesManager;
pub use utils::{AppError, AppResult};

// Re-export unified error types from shared
pub use utils::{ApiResponse, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// Security event logging, separated by target for log filtering
#[macro_export]
macro_rules! security_log {
    ($($arg:tt)*) => {
        tracing::warn!(target: "security", $($arg)*)
    };
}

/// Load .env, ensure the work directory exists and initialize logging
pub fn setup_environment() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let config = Config::from_env();
    config.ensure_work_dir_structure()?;

    let logs_dir = config.logs_dir();
    init_logger_with_file(
        std::env::var("LOG_LEVEL").ok().as_deref(),
        logs_dir.to_str(),
    );

    Ok(())
}
