//! Schema definition
//!
//! Applied at startup; every statement is idempotent (`IF NOT EXISTS` /
//! `OVERWRITE`-free), so restarting against an existing database is safe.
//!
//! Barcode uniqueness is enforced in the repository, not by a unique
//! index: most products carry no barcode and absent values must not
//! collide.

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

/// Define tables, fields and unique indexes
pub async fn initialize(db: &Surreal<Db>) -> surrealdb::Result<()> {
    db.query(
        r#"
        DEFINE TABLE IF NOT EXISTS user SCHEMALESS;
        DEFINE INDEX IF NOT EXISTS user_username ON TABLE user COLUMNS username UNIQUE;
        DEFINE INDEX IF NOT EXISTS user_email ON TABLE user COLUMNS email UNIQUE;

        DEFINE TABLE IF NOT EXISTS product SCHEMALESS;
        DEFINE INDEX IF NOT EXISTS product_barcode ON TABLE product COLUMNS barcode;

        DEFINE TABLE IF NOT EXISTS sale SCHEMALESS;
        DEFINE INDEX IF NOT EXISTS sale_date ON TABLE sale COLUMNS date;
        "#,
    )
    .await?
    .check()?;
    Ok(())
}
