use std::path::{Path, PathBuf};

use crate::auth::JwtConfig;

/// Server configuration
///
/// # Environment variables
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | WORK_DIR | /var/lib/farmacia | Work directory (database, cache, logs) |
/// | HTTP_PORT | 3000 | HTTP service port |
/// | ENVIRONMENT | development | Runtime environment |
/// | CART_TTL_SECS | 86400 | Cart lifetime in seconds |
/// | SHUTDOWN_TIMEOUT_MS | 10000 | Graceful shutdown window |
///
/// JWT settings are read by [`JwtConfig`] (`JWT_SECRET`,
/// `JWT_ACCESS_MINUTES`, `JWT_REFRESH_DAYS`, `JWT_ISSUER`, `JWT_AUDIENCE`).
#[derive(Debug, Clone)]
pub struct Config {
    /// Work directory holding database, cache and log files
    pub work_dir: String,
    /// HTTP API service port
    pub http_port: u16,
    /// JWT configuration
    pub jwt: JwtConfig,
    /// Runtime environment: development | staging | production
    pub environment: String,
    /// Cart lifetime in seconds
    pub cart_ttl_secs: i64,
    /// Graceful shutdown window (milliseconds)
    pub shutdown_timeout_ms: u64,
}

impl Config {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/farmacia".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            jwt: JwtConfig::default(),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            cart_ttl_secs: std::env::var("CART_TTL_SECS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(86400),
            shutdown_timeout_ms: std::env::var("SHUTDOWN_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(10000),
        }
    }

    /// Override work dir and port, for tests
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    /// Directory holding the SurrealDB database files
    pub fn database_dir(&self) -> PathBuf {
        Path::new(&self.work_dir).join("database")
    }

    /// Directory holding the redb cache file
    pub fn cache_dir(&self) -> PathBuf {
        Path::new(&self.work_dir).join("cache")
    }

    /// Directory holding rolling log files
    pub fn logs_dir(&self) -> PathBuf {
        Path::new(&self.work_dir).join("logs")
    }

    /// Directory holding product image files
    pub fn images_dir(&self) -> PathBuf {
        Path::new(&self.work_dir).join("imagenes")
    }

    /// Create the work directory structure if missing
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.database_dir())?;
        std::fs::create_dir_all(self.cache_dir())?;
        std::fs::create_dir_all(self.logs_dir())?;
        std::fs::create_dir_all(self.images_dir())?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
