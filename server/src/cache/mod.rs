//! redb-based volatile store
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `carts` | user id | `CartRecord` (JSON) | Per-user cart with TTL |
//! | `token_denylist` | SHA-256(jti) hex | expiry timestamp | Revoked refresh tokens |
//!
//! Entries carry their own expiry and are enforced (and purged) on read,
//! so the store needs no background sweeper.
//!
//! # Durability
//!
//! redb commits are durable as soon as `commit()` returns. Losing this
//! file costs only carts and revocations, never sales or stock.

pub mod cart;
pub mod denylist;

use std::path::Path;
use std::sync::Arc;

use redb::{Database, TableDefinition};
use thiserror::Error;

pub use cart::{CartRecord, CartStore};
pub use denylist::TokenDenylist;

/// Table for carts: key = user id, value = JSON-serialized CartRecord
pub(crate) const CARTS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("carts");

/// Table for revoked refresh tokens: key = SHA-256(jti) hex, value = expiry timestamp
pub(crate) const DENYLIST_TABLE: TableDefinition<&str, i64> =
    TableDefinition::new("token_denylist");

/// Cache storage errors
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type CacheResult<T> = Result<T, CacheError>;

impl From<CacheError> for shared::error::AppError {
    fn from(err: CacheError) -> Self {
        shared::error::AppError::cache(err.to_string())
    }
}

/// Volatile cache backed by a single redb file
#[derive(Clone)]
pub struct CacheStorage {
    db: Arc<Database>,
}

impl CacheStorage {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> CacheResult<Self> {
        let db = Database::create(path)?;

        // Create tables up front so reads never hit a missing table
        let write_txn = db.begin_write()?;
        {
            write_txn.open_table(CARTS_TABLE)?;
            write_txn.open_table(DENYLIST_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Cart store bound to the given TTL
    pub fn cart_store(&self, ttl_secs: i64) -> CartStore {
        CartStore::new(self.db.clone(), ttl_secs)
    }

    /// Refresh-token denylist
    pub fn token_denylist(&self) -> TokenDenylist {
        TokenDenylist::new(self.db.clone())
    }
}
