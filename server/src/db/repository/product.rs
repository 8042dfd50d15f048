//! Product Repository

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{Product, ProductCreate, ProductUpdate};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

#[derive(Clone)]
pub struct ProductRepository {
    base: BaseRepository,
}

impl ProductRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// A page of products not soft-deleted, ordered by name
    pub async fn find_all(&self, limit: i64, offset: i64) -> RepoResult<Vec<Product>> {
        let products: Vec<Product> = self
            .base
            .db()
            .query(
                "SELECT * FROM product WHERE is_deleted = false \
                 ORDER BY name LIMIT $limit START $offset",
            )
            .bind(("limit", limit))
            .bind(("offset", offset))
            .await?
            .take(0)?;
        Ok(products)
    }

    /// A page of soft-deleted products only, ordered by name
    pub async fn find_deleted(&self, limit: i64, offset: i64) -> RepoResult<Vec<Product>> {
        let products: Vec<Product> = self
            .base
            .db()
            .query(
                "SELECT * FROM product WHERE is_deleted = true \
                 ORDER BY name LIMIT $limit START $offset",
            )
            .bind(("limit", limit))
            .bind(("offset", offset))
            .await?
            .take(0)?;
        Ok(products)
    }

    /// Find product by id, deleted or not
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Product>> {
        let record = self.base.parse_id(id, "product")?;
        let product: Option<Product> = self.base.db().select(record).await?;
        Ok(product)
    }

    /// Find a live (not soft-deleted) product by id
    pub async fn find_live_by_id(&self, id: &str) -> RepoResult<Option<Product>> {
        Ok(self.find_by_id(id).await?.filter(|p| !p.is_deleted))
    }

    /// Find product by barcode
    pub async fn find_by_barcode(&self, barcode: &str) -> RepoResult<Option<Product>> {
        let barcode_owned = barcode.to_string();
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM product WHERE barcode = $barcode LIMIT 1")
            .bind(("barcode", barcode_owned))
            .await?;
        let products: Vec<Product> = result.take(0)?;
        Ok(products.into_iter().next())
    }

    /// Create a new product
    pub async fn create(&self, data: ProductCreate) -> RepoResult<Product> {
        if let Some(ref barcode) = data.barcode
            && self.find_by_barcode(barcode).await?.is_some()
        {
            return Err(RepoError::Duplicate(format!(
                "Barcode '{}' already exists",
                barcode
            )));
        }
        if data.unit_price.is_sign_negative() {
            return Err(RepoError::Validation(
                "unit_price must not be negative".to_string(),
            ));
        }
        if data.stock < 0 {
            return Err(RepoError::Validation(
                "stock must not be negative".to_string(),
            ));
        }

        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE product SET
                    name = $name,
                    description = $description,
                    barcode = $barcode,
                    unit_price = <decimal> $unit_price,
                    stock = $stock,
                    image = $image,
                    is_deleted = false,
                    created_at = time::now(),
                    updated_at = time::now()
                RETURN AFTER"#,
            )
            .bind(("name", data.name))
            .bind(("description", data.description))
            .bind(("barcode", data.barcode))
            .bind(("unit_price", data.unit_price))
            .bind(("stock", data.stock))
            .bind(("image", data.image))
            .await?;

        let created: Option<Product> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create product".to_string()))
    }

    /// Update a product (barcode is immutable and not part of the payload)
    pub async fn update(&self, id: &str, data: ProductUpdate) -> RepoResult<Product> {
        let record = self.base.parse_id(id, "product")?;
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Product {} not found", id)))?;
        if existing.is_deleted {
            return Err(RepoError::Validation(format!(
                "Product {} is deleted",
                id
            )));
        }

        if let Some(price) = data.unit_price
            && price.is_sign_negative()
        {
            return Err(RepoError::Validation(
                "unit_price must not be negative".to_string(),
            ));
        }
        if let Some(stock) = data.stock
            && stock < 0
        {
            return Err(RepoError::Validation(
                "stock must not be negative".to_string(),
            ));
        }

        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE $record SET
                    name = $name OR name,
                    description = IF $has_description THEN $description ELSE description END,
                    unit_price = IF $has_price THEN <decimal> $unit_price ELSE unit_price END,
                    stock = IF $has_stock THEN $stock ELSE stock END,
                    image = IF $has_image THEN $image ELSE image END,
                    updated_at = time::now()
                RETURN AFTER"#,
            )
            .bind(("record", record))
            .bind(("name", data.name))
            .bind(("has_description", data.description.is_some()))
            .bind(("description", data.description))
            .bind(("has_price", data.unit_price.is_some()))
            .bind(("unit_price", data.unit_price))
            .bind(("has_stock", data.stock.is_some()))
            .bind(("stock", data.stock))
            .bind(("has_image", data.image.is_some()))
            .bind(("image", data.image))
            .await?;

        result
            .take::<Option<Product>>(0)?
            .ok_or_else(|| RepoError::NotFound(format!("Product {} not found", id)))
    }

    /// Soft delete: hides the product, never removes the row
    pub async fn soft_delete(&self, id: &str) -> RepoResult<Product> {
        let record = self.base.parse_id(id, "product")?;
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Product {} not found", id)))?;
        if existing.is_deleted {
            return Err(RepoError::Validation(format!(
                "Product {} is already deleted",
                id
            )));
        }

        let mut result = self
            .base
            .db()
            .query("UPDATE $record SET is_deleted = true, updated_at = time::now() RETURN AFTER")
            .bind(("record", record))
            .await?;
        result
            .take::<Option<Product>>(0)?
            .ok_or_else(|| RepoError::NotFound(format!("Product {} not found", id)))
    }

    /// Restore a soft-deleted product
    pub async fn restore(&self, id: &str) -> RepoResult<Product> {
        let record = self.base.parse_id(id, "product")?;
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Product {} not found", id)))?;
        if !existing.is_deleted {
            return Err(RepoError::Validation(format!(
                "Product {} is not deleted",
                id
            )));
        }

        let mut result = self
            .base
            .db()
            .query("UPDATE $record SET is_deleted = false, updated_at = time::now() RETURN AFTER")
            .bind(("record", record))
            .await?;
        result
            .take::<Option<Product>>(0)?
            .ok_or_else(|| RepoError::NotFound(format!("Product {} not found", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use surrealdb::engine::local::Mem;

    async fn test_repo() -> ProductRepository {
        let db = Surreal::new::<Mem>(()).await.expect("mem db");
        db.use_ns("farmacia").use_db("farmacia").await.expect("ns");
        crate::db::schema::initialize(&db).await.expect("schema");
        ProductRepository::new(db)
    }

    fn payload(name: &str, barcode: Option<&str>) -> ProductCreate {
        ProductCreate {
            name: name.to_string(),
            description: Some("test".to_string()),
            barcode: barcode.map(str::to_string),
            unit_price: Decimal::new(1250, 2),
            stock: 20,
            image: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let repo = test_repo().await;

        let created = repo
            .create(payload("Aspirina 100mg", Some("7790001")))
            .await
            .expect("create");
        assert!(!created.is_deleted);
        assert_eq!(created.unit_price, Decimal::new(1250, 2));

        let found = repo
            .find_by_id(&created.id_string())
            .await
            .expect("find")
            .expect("some");
        assert_eq!(found.name, "Aspirina 100mg");

        let by_barcode = repo
            .find_by_barcode("7790001")
            .await
            .expect("find")
            .expect("some");
        assert_eq!(by_barcode.id_string(), created.id_string());
    }

    #[tokio::test]
    async fn test_duplicate_barcode_rejected() {
        let repo = test_repo().await;
        repo.create(payload("Producto A", Some("111")))
            .await
            .expect("first");

        let err = repo
            .create(payload("Producto B", Some("111")))
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));

        // Missing barcodes never collide
        repo.create(payload("Producto C", None)).await.expect("no barcode");
        repo.create(payload("Producto D", None)).await.expect("no barcode");
    }

    #[tokio::test]
    async fn test_negative_values_rejected() {
        let repo = test_repo().await;

        let mut bad = payload("Producto", None);
        bad.unit_price = Decimal::new(-100, 2);
        assert!(matches!(
            repo.create(bad).await.unwrap_err(),
            RepoError::Validation(_)
        ));

        let mut bad = payload("Producto", None);
        bad.stock = -1;
        assert!(matches!(
            repo.create(bad).await.unwrap_err(),
            RepoError::Validation(_)
        ));
    }

    #[tokio::test]
    async fn test_partial_update() {
        let repo = test_repo().await;
        let created = repo.create(payload("Gasas esteriles", None)).await.expect("create");

        let updated = repo
            .update(
                &created.id_string(),
                ProductUpdate {
                    name: None,
                    description: None,
                    unit_price: Some(Decimal::new(999, 2)),
                    stock: None,
                    image: None,
                },
            )
            .await
            .expect("update");

        // Untouched fields survive
        assert_eq!(updated.name, "Gasas esteriles");
        assert_eq!(updated.description.as_deref(), Some("test"));
        assert_eq!(updated.unit_price, Decimal::new(999, 2));
        assert_eq!(updated.stock, 20);
    }

    #[tokio::test]
    async fn test_soft_delete_and_restore() {
        let repo = test_repo().await;
        let created = repo.create(payload("Curitas", None)).await.expect("create");
        let id = created.id_string();

        let deleted = repo.soft_delete(&id).await.expect("delete");
        assert!(deleted.is_deleted);

        // Hidden from the default listing, gone for live lookups
        assert!(repo.find_all(10, 0).await.expect("list").is_empty());
        assert!(repo.find_live_by_id(&id).await.expect("live").is_none());
        assert!(repo.find_by_id(&id).await.expect("find").is_some());
        assert_eq!(repo.find_deleted(10, 0).await.expect("deleted").len(), 1);

        // Deleted products reject updates and double deletes
        assert!(matches!(
            repo.soft_delete(&id).await.unwrap_err(),
            RepoError::Validation(_)
        ));

        let restored = repo.restore(&id).await.expect("restore");
        assert!(!restored.is_deleted);
        assert_eq!(repo.find_all(10, 0).await.expect("list").len(), 1);

        assert!(matches!(
            repo.restore(&id).await.unwrap_err(),
            RepoError::Validation(_)
        ));
    }

    #[tokio::test]
    async fn test_listing_pages_by_name() {
        let repo = test_repo().await;
        for name in ["Aspirina", "Bencina", "Curitas", "Dalsy"] {
            repo.create(payload(name, None)).await.expect("create");
        }

        let first = repo.find_all(2, 0).await.expect("first page");
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].name, "Aspirina");
        assert_eq!(first[1].name, "Bencina");

        let second = repo.find_all(2, 2).await.expect("second page");
        assert_eq!(second.len(), 2);
        assert_eq!(second[0].name, "Curitas");

        let past_end = repo.find_all(2, 10).await.expect("past end");
        assert!(past_end.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_and_malformed_ids() {
        let repo = test_repo().await;

        assert!(repo.find_by_id("product:nope").await.expect("find").is_none());
        assert!(matches!(
            repo.soft_delete("product:nope").await.unwrap_err(),
            RepoError::NotFound(_)
        ));
        assert!(matches!(
            repo.find_by_id("user:abc").await.unwrap_err(),
            RepoError::NotFound(_)
        ));
    }
}
