//! Per-user cart storage
//!
//! Pure storage: quantities keyed by product id plus an expiry stamp.
//! Stock and product checks live in the sales manager, which owns the
//! business rules. Every write refreshes the TTL; an expired cart reads
//! back as empty and is purged in the same transaction.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use redb::{Database, ReadableDatabase};
use serde::{Deserialize, Serialize};

use super::{CARTS_TABLE, CacheResult};

/// Stored cart: product id → quantity, with absolute expiry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartRecord {
    pub items: BTreeMap<String, i64>,
    pub expires_at: i64,
}

impl CartRecord {
    fn new(ttl_secs: i64) -> Self {
        Self {
            items: BTreeMap::new(),
            expires_at: Utc::now().timestamp() + ttl_secs,
        }
    }

    fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now().timestamp()
    }
}

/// Cart store backed by redb
#[derive(Clone)]
pub struct CartStore {
    db: Arc<Database>,
    ttl_secs: i64,
}

impl CartStore {
    pub fn new(db: Arc<Database>, ttl_secs: i64) -> Self {
        Self { db, ttl_secs }
    }

    fn read_record(&self, user_id: &str) -> CacheResult<Option<CartRecord>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(CARTS_TABLE)?;
        let Some(raw) = table.get(user_id)? else {
            return Ok(None);
        };
        let record: CartRecord = serde_json::from_slice(raw.value())?;
        Ok(Some(record))
    }

    fn write_record(&self, user_id: &str, record: &CartRecord) -> CacheResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(CARTS_TABLE)?;
            if record.items.is_empty() {
                table.remove(user_id)?;
            } else {
                let raw = serde_json::to_vec(record)?;
                table.insert(user_id, raw.as_slice())?;
            }
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Live (non-expired) cart for a user; expired carts are purged and read as absent
    pub fn load(&self, user_id: &str) -> CacheResult<Option<CartRecord>> {
        match self.read_record(user_id)? {
            Some(record) if record.is_expired() => {
                self.clear(user_id)?;
                Ok(None)
            }
            other => Ok(other),
        }
    }

    /// Current item quantities for a user (empty map when absent or expired)
    pub fn items(&self, user_id: &str) -> CacheResult<BTreeMap<String, i64>> {
        Ok(self.load(user_id)?.map(|r| r.items).unwrap_or_default())
    }

    /// Current quantity of one product in the cart
    pub fn quantity_of(&self, user_id: &str, product_id: &str) -> CacheResult<i64> {
        Ok(self
            .items(user_id)?
            .get(product_id)
            .copied()
            .unwrap_or(0))
    }

    /// Add quantity to a product entry, returning the new quantity.
    /// Refreshes the cart TTL. Saturates rather than wrapping; the
    /// manager rejects any quantity the stock cannot cover anyway.
    pub fn add_item(&self, user_id: &str, product_id: &str, quantity: i64) -> CacheResult<i64> {
        let mut record = self
            .load(user_id)?
            .unwrap_or_else(|| CartRecord::new(self.ttl_secs));
        let entry = record.items.entry(product_id.to_string()).or_insert(0);
        *entry = entry.saturating_add(quantity);
        let new_qty = *entry;
        record.expires_at = Utc::now().timestamp() + self.ttl_secs;
        self.write_record(user_id, &record)?;
        Ok(new_qty)
    }

    /// Decrement (or drop, when `quantity` is None or the result is <= 0)
    /// a product entry. Returns false when nothing was removed: the
    /// product was not in the cart, or the quantity was not positive.
    pub fn remove_item(
        &self,
        user_id: &str,
        product_id: &str,
        quantity: Option<i64>,
    ) -> CacheResult<bool> {
        // A non-positive decrement would grow the entry
        if quantity.is_some_and(|q| q <= 0) {
            return Ok(false);
        }
        let Some(mut record) = self.load(user_id)? else {
            return Ok(false);
        };
        let Some(current) = record.items.get(product_id).copied() else {
            return Ok(false);
        };

        match quantity {
            Some(q) if current - q > 0 => {
                record.items.insert(product_id.to_string(), current - q);
            }
            _ => {
                record.items.remove(product_id);
            }
        }
        record.expires_at = Utc::now().timestamp() + self.ttl_secs;
        self.write_record(user_id, &record)?;
        Ok(true)
    }

    /// Drop entries whose products have vanished or been soft-deleted
    pub fn remove_entries(&self, user_id: &str, product_ids: &[String]) -> CacheResult<()> {
        let Some(mut record) = self.load(user_id)? else {
            return Ok(());
        };
        for id in product_ids {
            record.items.remove(id);
        }
        self.write_record(user_id, &record)?;
        Ok(())
    }

    /// Empty the cart
    pub fn clear(&self, user_id: &str) -> CacheResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(CARTS_TABLE)?;
            table.remove(user_id)?;
        }
        write_txn.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheStorage;
    use tempfile::NamedTempFile;

    fn test_store(ttl_secs: i64) -> (CartStore, NamedTempFile) {
        let file = NamedTempFile::new().expect("temp file");
        let storage = CacheStorage::open(file.path()).expect("open cache");
        (storage.cart_store(ttl_secs), file)
    }

    #[test]
    fn test_add_accumulates() {
        let (store, _file) = test_store(3600);

        assert_eq!(store.add_item("user:1", "product:a", 2).unwrap(), 2);
        assert_eq!(store.add_item("user:1", "product:a", 3).unwrap(), 5);

        let items = store.items("user:1").unwrap();
        assert_eq!(items.get("product:a"), Some(&5));
    }

    #[test]
    fn test_carts_are_per_user() {
        let (store, _file) = test_store(3600);

        store.add_item("user:1", "product:a", 1).unwrap();
        store.add_item("user:2", "product:a", 4).unwrap();

        assert_eq!(store.quantity_of("user:1", "product:a").unwrap(), 1);
        assert_eq!(store.quantity_of("user:2", "product:a").unwrap(), 4);
    }

    #[test]
    fn test_remove_partial_and_full() {
        let (store, _file) = test_store(3600);
        store.add_item("user:1", "product:a", 5).unwrap();

        assert!(store.remove_item("user:1", "product:a", Some(2)).unwrap());
        assert_eq!(store.quantity_of("user:1", "product:a").unwrap(), 3);

        assert!(store.remove_item("user:1", "product:a", None).unwrap());
        assert_eq!(store.quantity_of("user:1", "product:a").unwrap(), 0);
    }

    #[test]
    fn test_remove_below_zero_drops_entry() {
        let (store, _file) = test_store(3600);
        store.add_item("user:1", "product:a", 2).unwrap();

        assert!(store.remove_item("user:1", "product:a", Some(10)).unwrap());
        assert!(store.items("user:1").unwrap().is_empty());
    }

    #[test]
    fn test_remove_nonpositive_quantity_changes_nothing() {
        let (store, _file) = test_store(3600);
        store.add_item("user:1", "product:a", 2).unwrap();

        assert!(!store.remove_item("user:1", "product:a", Some(-5)).unwrap());
        assert!(!store.remove_item("user:1", "product:a", Some(0)).unwrap());
        assert_eq!(store.quantity_of("user:1", "product:a").unwrap(), 2);
    }

    #[test]
    fn test_add_saturates_instead_of_wrapping() {
        let (store, _file) = test_store(3600);
        store.add_item("user:1", "product:a", 1).unwrap();

        let qty = store.add_item("user:1", "product:a", i64::MAX).unwrap();
        assert_eq!(qty, i64::MAX);
    }

    #[test]
    fn test_remove_absent_product() {
        let (store, _file) = test_store(3600);
        assert!(!store.remove_item("user:1", "product:a", None).unwrap());
    }

    #[test]
    fn test_clear() {
        let (store, _file) = test_store(3600);
        store.add_item("user:1", "product:a", 2).unwrap();
        store.add_item("user:1", "product:b", 1).unwrap();

        store.clear("user:1").unwrap();
        assert!(store.items("user:1").unwrap().is_empty());
    }

    #[test]
    fn test_expired_cart_reads_empty() {
        let (store, _file) = test_store(-1);
        store.add_item("user:1", "product:a", 2).unwrap();

        assert!(store.load("user:1").unwrap().is_none());
        assert!(store.items("user:1").unwrap().is_empty());
    }
}
