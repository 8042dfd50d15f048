//! Sale Repository
//!
//! The pending → completed transition runs as a single SurrealDB
//! transaction: state check, per-line stock decrement and state update
//! either all commit or none do. Shortfalls and bad states surface as
//! THROW markers that the sales manager maps to API errors.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{Sale, SaleLine, SaleModality, SaleState};

/// THROW marker: sale does not exist
pub const THROW_SALE_NOT_FOUND: &str = "sale_not_found";

/// THROW marker: sale is not in the pending state
pub const THROW_SALE_NOT_PENDING: &str = "sale_not_pending";

/// THROW marker: a stock decrement went negative
pub const THROW_INSUFFICIENT_STOCK: &str = "insufficient_stock";

/// Filters for the sales report
#[derive(Debug, Clone, Default)]
pub struct SaleFilter {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub modality: Option<SaleModality>,
    pub state: Option<SaleState>,
    pub buyer: Option<String>,
}

#[derive(Clone)]
pub struct SaleRepository {
    base: BaseRepository,
}

impl SaleRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find sale by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Sale>> {
        let record = self.base.parse_id(id, "sale")?;
        let sale: Option<Sale> = self.base.db().select(record).await?;
        Ok(sale)
    }

    /// Create a pending sale with frozen line prices
    pub async fn create_pending(
        &self,
        modality: SaleModality,
        buyer: Option<String>,
        seller: Option<String>,
        items: Vec<SaleLine>,
        total: Decimal,
    ) -> RepoResult<Sale> {
        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE sale CONTENT {
                    modality: $modality,
                    state: 'pendiente',
                    buyer: $buyer,
                    seller: $seller,
                    items: $items,
                    total: <decimal> $total,
                    date: time::now(),
                    updated_at: time::now()
                } RETURN AFTER"#,
            )
            .bind(("modality", modality))
            .bind(("buyer", buyer))
            .bind(("seller", seller))
            .bind(("items", items))
            .bind(("total", total))
            .await?;

        let created: Option<Sale> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create sale".to_string()))
    }

    /// Complete a pending sale, decrementing stock atomically
    ///
    /// One transaction: any shortfall or state mismatch THROWs, which
    /// aborts the whole thing and leaves the sale pending and stock
    /// untouched. The markers come back inside the database error text
    /// and are recognized by the sales manager.
    pub async fn complete(&self, id: &str) -> RepoResult<Sale> {
        let record = self.base.parse_id(id, "sale")?;

        self.base
            .db()
            .query(
                r#"
                BEGIN TRANSACTION;
                LET $sale = (SELECT * FROM ONLY $record);
                IF $sale = NONE { THROW 'sale_not_found' };
                IF $sale.state != 'pendiente' { THROW 'sale_not_pending' };
                FOR $line IN $sale.items {
                    LET $updated = (UPDATE ONLY type::thing($line.product)
                        SET stock -= $line.quantity RETURN AFTER);
                    IF $updated.stock < 0 { THROW 'insufficient_stock' };
                };
                UPDATE $record SET state = 'completada', updated_at = time::now();
                COMMIT TRANSACTION;
                "#,
            )
            .bind(("record", record))
            .await?
            .check()?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Sale {} not found", id)))
    }

    /// Cancel a pending sale; stock is never touched
    pub async fn cancel(&self, id: &str) -> RepoResult<Sale> {
        let record = self.base.parse_id(id, "sale")?;

        self.base
            .db()
            .query(
                r#"
                BEGIN TRANSACTION;
                LET $sale = (SELECT * FROM ONLY $record);
                IF $sale = NONE { THROW 'sale_not_found' };
                IF $sale.state != 'pendiente' { THROW 'sale_not_pending' };
                UPDATE $record SET state = 'cancelada', updated_at = time::now();
                COMMIT TRANSACTION;
                "#,
            )
            .bind(("record", record))
            .await?
            .check()?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Sale {} not found", id)))
    }

    /// All sales matching the filter, newest first
    pub async fn find_filtered(&self, filter: &SaleFilter) -> RepoResult<Vec<Sale>> {
        let mut conditions: Vec<&str> = Vec::new();
        if filter.start.is_some() {
            conditions.push("date >= <datetime> $start");
        }
        if filter.end.is_some() {
            conditions.push("date <= <datetime> $end");
        }
        if filter.modality.is_some() {
            conditions.push("modality = $modality");
        }
        if filter.state.is_some() {
            conditions.push("state = $state");
        }
        if filter.buyer.is_some() {
            conditions.push("buyer = $buyer");
        }

        let mut sql = "SELECT * FROM sale".to_string();
        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }
        sql.push_str(" ORDER BY date DESC");

        let mut query = self.base.db().query(sql);
        if let Some(start) = filter.start {
            query = query.bind(("start", start));
        }
        if let Some(end) = filter.end {
            query = query.bind(("end", end));
        }
        if let Some(modality) = filter.modality {
            query = query.bind(("modality", modality));
        }
        if let Some(state) = filter.state {
            query = query.bind(("state", state));
        }
        if let Some(ref buyer) = filter.buyer {
            query = query.bind(("buyer", buyer.clone()));
        }

        let sales: Vec<Sale> = query.await?.take(0)?;
        Ok(sales)
    }
}
