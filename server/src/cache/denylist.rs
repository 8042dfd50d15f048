//! Revoked refresh token denylist
//!
//! Keys are SHA-256 digests of the token `jti` so raw token ids never
//! touch disk. Each entry carries the token's natural expiry; entries
//! past it read as not-revoked and are pruned opportunistically.

use std::sync::Arc;

use chrono::Utc;
use redb::{Database, ReadableDatabase, ReadableTable};
use sha2::{Digest, Sha256};

use super::{CacheResult, DENYLIST_TABLE};

/// Refresh token denylist backed by redb
#[derive(Clone)]
pub struct TokenDenylist {
    db: Arc<Database>,
}

impl TokenDenylist {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    fn key_for(jti: &str) -> String {
        hex::encode(Sha256::digest(jti.as_bytes()))
    }

    /// Mark a jti as revoked until the token's natural expiry
    pub fn revoke(&self, jti: &str, expires_at: i64) -> CacheResult<()> {
        let key = Self::key_for(jti);
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(DENYLIST_TABLE)?;
            table.insert(key.as_str(), expires_at)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Whether a jti is currently revoked
    pub fn is_revoked(&self, jti: &str) -> CacheResult<bool> {
        let key = Self::key_for(jti);
        let now = Utc::now().timestamp();

        let expires_at = {
            let read_txn = self.db.begin_read()?;
            let table = read_txn.open_table(DENYLIST_TABLE)?;
            table.get(key.as_str())?.map(|v| v.value())
        };

        match expires_at {
            Some(exp) if exp > now => Ok(true),
            Some(_) => {
                // Token expired on its own, entry no longer needed
                let write_txn = self.db.begin_write()?;
                {
                    let mut table = write_txn.open_table(DENYLIST_TABLE)?;
                    table.remove(key.as_str())?;
                }
                write_txn.commit()?;
                Ok(false)
            }
            None => Ok(false),
        }
    }

    /// Drop every entry whose expiry has passed
    pub fn prune(&self) -> CacheResult<usize> {
        let now = Utc::now().timestamp();
        let write_txn = self.db.begin_write()?;
        let pruned;
        {
            let mut table = write_txn.open_table(DENYLIST_TABLE)?;
            let expired: Vec<String> = table
                .iter()?
                .filter_map(|entry| entry.ok())
                .filter(|(_, exp)| exp.value() <= now)
                .map(|(key, _)| key.value().to_string())
                .collect();
            pruned = expired.len();
            for key in expired {
                table.remove(key.as_str())?;
            }
        }
        write_txn.commit()?;
        Ok(pruned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheStorage;
    use tempfile::NamedTempFile;

    fn test_denylist() -> (TokenDenylist, NamedTempFile) {
        let file = NamedTempFile::new().expect("temp file");
        let storage = CacheStorage::open(file.path()).expect("open cache");
        (storage.token_denylist(), file)
    }

    #[test]
    fn test_revoke_and_check() {
        let (denylist, _file) = test_denylist();
        let future = Utc::now().timestamp() + 3600;

        assert!(!denylist.is_revoked("jti-1").unwrap());
        denylist.revoke("jti-1", future).unwrap();
        assert!(denylist.is_revoked("jti-1").unwrap());
        assert!(!denylist.is_revoked("jti-2").unwrap());
    }

    #[test]
    fn test_expired_entry_reads_not_revoked() {
        let (denylist, _file) = test_denylist();
        let past = Utc::now().timestamp() - 10;

        denylist.revoke("jti-1", past).unwrap();
        assert!(!denylist.is_revoked("jti-1").unwrap());
    }

    #[test]
    fn test_prune_removes_only_expired() {
        let (denylist, _file) = test_denylist();
        let now = Utc::now().timestamp();

        denylist.revoke("old", now - 10).unwrap();
        denylist.revoke("live", now + 3600).unwrap();

        assert_eq!(denylist.prune().unwrap(), 1);
        assert!(denylist.is_revoked("live").unwrap());
    }
}
