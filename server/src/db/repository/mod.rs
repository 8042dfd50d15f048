//! Repository Module
//!
//! CRUD operations over the embedded SurrealDB tables.

pub mod product;
pub mod sale;
pub mod user;

pub use product::ProductRepository;
pub use sale::{SaleFilter, SaleRepository};
pub use user::UserRepository;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use thiserror::Error;

use crate::utils::{AppError, ErrorCode};

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::with_message(ErrorCode::NotFound, msg),
            RepoError::Duplicate(msg) => AppError::with_message(ErrorCode::AlreadyExists, msg),
            RepoError::Validation(msg) => AppError::validation(msg),
            RepoError::Database(msg) => AppError::database(msg),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Base repository with database reference
///
/// ID convention: "table:id" strings everywhere, parsed into
/// `surrealdb::RecordId` at the repository boundary.
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }

    /// Parse a "table:id" string, rejecting ids for a different table
    ///
    /// Malformed and wrong-table ids read as not found: such a record
    /// cannot exist in the target table.
    pub fn parse_id(
        &self,
        id: &str,
        table: &str,
    ) -> RepoResult<surrealdb::RecordId> {
        let record: surrealdb::RecordId = id
            .parse()
            .map_err(|_| RepoError::NotFound(format!("Invalid ID: {}", id)))?;
        if record.table() != table {
            return Err(RepoError::NotFound(format!("Invalid {} ID: {}", table, id)));
        }
        Ok(record)
    }
}
