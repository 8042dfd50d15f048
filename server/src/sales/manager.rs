//! Sales manager
//!
//! Carts live in the volatile store and never touch stock. Stock is
//! validated twice: a fast check at checkout so obviously doomed sales
//! are rejected early, and an atomic re-check inside the completion
//! transaction, which is the one that counts.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use shared::error::{AppError, AppResult, ErrorCode};

use crate::cache::CartStore;
use crate::db::models::{Product, Sale, SaleLine, SaleModality, SaleState};
use crate::db::repository::sale::{
    THROW_INSUFFICIENT_STOCK, THROW_SALE_NOT_FOUND, THROW_SALE_NOT_PENDING,
};
use crate::db::repository::{ProductRepository, RepoError, SaleFilter, SaleRepository};
use crate::utils::retry_transient;

/// One cart line, enriched with current product data
#[derive(Debug, Clone, Serialize)]
pub struct CartLine {
    pub product_id: String,
    pub name: String,
    pub quantity: i64,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
}

/// Cart as returned to clients
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub items: Vec<CartLine>,
    /// Total units across all lines
    pub item_count: i64,
    pub total: Decimal,
}

impl CartView {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Query parameters accepted by the sales report
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportQuery {
    pub desde: Option<chrono::DateTime<chrono::Utc>>,
    pub hasta: Option<chrono::DateTime<chrono::Utc>>,
    pub modalidad: Option<SaleModality>,
    pub estado: Option<SaleState>,
    pub offset: Option<usize>,
    pub limit: Option<usize>,
}

/// Sales report: aggregates over the whole filtered set plus a page of sales
#[derive(Debug, Clone, Serialize)]
pub struct SalesReport {
    pub total_sales: usize,
    pub total_items: i64,
    pub total_revenue: Decimal,
    pub sales: Vec<Sale>,
}

#[derive(Clone)]
pub struct SalesManager {
    products: ProductRepository,
    sales: SaleRepository,
    carts: CartStore,
}

impl SalesManager {
    pub fn new(db: Surreal<Db>, carts: CartStore) -> Self {
        Self {
            products: ProductRepository::new(db.clone()),
            sales: SaleRepository::new(db),
            carts,
        }
    }

    /// Add quantity of a product to the user's cart
    ///
    /// The resulting cart quantity must not exceed current stock.
    pub async fn add_to_cart(
        &self,
        user_id: &str,
        product_id: &str,
        quantity: i64,
    ) -> AppResult<CartView> {
        if quantity <= 0 {
            return Err(AppError::new(ErrorCode::InvalidQuantity)
                .with_detail("cantidad", serde_json::json!(quantity)));
        }

        let product = retry_transient("load product", || {
            self.products.find_live_by_id(product_id)
        })
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound))?;

        // checked_add: an overflowing total can never fit in stock
        let in_cart = self.carts.quantity_of(user_id, product_id)?;
        if !in_cart
            .checked_add(quantity)
            .is_some_and(|total| total <= product.stock)
        {
            return Err(AppError::insufficient_stock(product_id, product.stock));
        }

        self.carts.add_item(user_id, product_id, quantity)?;
        self.get_cart(user_id).await
    }

    /// Remove quantity (or the whole line, when `quantity` is None)
    pub async fn remove_from_cart(
        &self,
        user_id: &str,
        product_id: &str,
        quantity: Option<i64>,
    ) -> AppResult<CartView> {
        if let Some(q) = quantity
            && q <= 0
        {
            return Err(AppError::new(ErrorCode::InvalidQuantity)
                .with_detail("cantidad", serde_json::json!(q)));
        }
        if !self.carts.remove_item(user_id, product_id, quantity)? {
            return Err(AppError::new(ErrorCode::CartItemNotFound));
        }
        self.get_cart(user_id).await
    }

    /// Cart enriched with current names and prices
    ///
    /// Lines whose products have vanished or been soft-deleted since
    /// they were added are silently pruned.
    pub async fn get_cart(&self, user_id: &str) -> AppResult<CartView> {
        let items = self.carts.items(user_id)?;

        let mut lines = Vec::with_capacity(items.len());
        let mut stale: Vec<String> = Vec::new();

        for (product_id, quantity) in &items {
            let product = retry_transient("load cart product", || {
                self.products.find_live_by_id(product_id)
            })
            .await?;

            match product {
                Some(product) => {
                    let subtotal = product.unit_price * Decimal::from(*quantity);
                    lines.push(CartLine {
                        product_id: product_id.clone(),
                        name: product.name,
                        quantity: *quantity,
                        unit_price: product.unit_price,
                        subtotal,
                    });
                }
                None => stale.push(product_id.clone()),
            }
        }

        if !stale.is_empty() {
            self.carts.remove_entries(user_id, &stale)?;
        }

        let total = lines.iter().map(|l| l.subtotal).sum();
        let item_count = lines.iter().map(|l| l.quantity).sum();
        Ok(CartView {
            items: lines,
            item_count,
            total,
        })
    }

    /// Empty the user's cart
    pub fn clear_cart(&self, user_id: &str) -> AppResult<()> {
        self.carts.clear(user_id)?;
        Ok(())
    }

    /// Turn the cart into a pending sale
    ///
    /// Prices and names freeze into the sale lines here. Stock is
    /// validated but not decremented; completion does that atomically.
    /// Virtual sales record the user as buyer, physical ones as seller.
    pub async fn checkout(&self, user_id: &str, modality: SaleModality) -> AppResult<Sale> {
        let items = self.carts.items(user_id)?;
        if items.is_empty() {
            return Err(AppError::empty_cart());
        }

        let mut lines = Vec::with_capacity(items.len());
        let mut stale: Vec<String> = Vec::new();

        for (product_id, quantity) in &items {
            let product = retry_transient("load checkout product", || {
                self.products.find_live_by_id(product_id)
            })
            .await?;

            let Some(product) = product else {
                stale.push(product_id.clone());
                continue;
            };
            if *quantity > product.stock {
                return Err(AppError::insufficient_stock(product_id, product.stock));
            }
            lines.push(build_line(&product, *quantity)?);
        }

        if !stale.is_empty() {
            self.carts.remove_entries(user_id, &stale)?;
        }
        if lines.is_empty() {
            return Err(AppError::empty_cart());
        }

        let total = lines.iter().map(|l| l.subtotal).sum();
        let (buyer, seller) = match modality {
            SaleModality::Virtual => (Some(user_id.to_string()), None),
            SaleModality::Fisica => (None, Some(user_id.to_string())),
        };

        let sale = self
            .sales
            .create_pending(modality, buyer, seller, lines, total)
            .await?;

        self.carts.clear(user_id)?;
        Ok(sale)
    }

    /// Complete a pending sale, decrementing stock
    pub async fn complete(&self, sale_id: &str) -> AppResult<Sale> {
        self.sales.complete(sale_id).await.map_err(map_sale_error)
    }

    /// Cancel a pending sale; stock is untouched
    pub async fn cancel(&self, sale_id: &str) -> AppResult<Sale> {
        self.sales.cancel(sale_id).await.map_err(map_sale_error)
    }

    /// Fetch one sale; ownership checks belong to the caller
    pub async fn get(&self, sale_id: &str) -> AppResult<Sale> {
        retry_transient("load sale", || self.sales.find_by_id(sale_id))
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::SaleNotFound))
    }

    /// Date-ranged sales report with aggregates over the full filtered set
    pub async fn report(&self, query: &ReportQuery) -> AppResult<SalesReport> {
        let filter = SaleFilter {
            start: query.desde,
            end: query.hasta,
            modality: query.modalidad,
            state: query.estado,
            buyer: None,
        };

        let sales = retry_transient("sales report", || self.sales.find_filtered(&filter)).await?;

        let total_sales = sales.len();
        let total_items = sales.iter().map(Sale::item_count).sum();
        let total_revenue = sales.iter().map(|s| s.total).sum();

        let offset = query.offset.unwrap_or(0);
        let page: Vec<Sale> = match query.limit {
            Some(limit) => sales.into_iter().skip(offset).take(limit).collect(),
            None => sales.into_iter().skip(offset).collect(),
        };

        Ok(SalesReport {
            total_sales,
            total_items,
            total_revenue,
            sales: page,
        })
    }
}

fn build_line(product: &Product, quantity: i64) -> AppResult<SaleLine> {
    let id = product
        .id
        .clone()
        .ok_or_else(|| AppError::internal("Product record without id"))?;
    let subtotal = product.unit_price * Decimal::from(quantity);
    Ok(SaleLine {
        product: id,
        product_name: product.name.clone(),
        quantity,
        unit_price: product.unit_price,
        subtotal,
    })
}

/// Map completion/cancellation THROW markers onto API error codes
fn map_sale_error(err: RepoError) -> AppError {
    if matches!(err, RepoError::NotFound(_)) {
        return AppError::new(ErrorCode::SaleNotFound);
    }
    if let RepoError::Database(msg) = &err {
        if msg.contains(THROW_INSUFFICIENT_STOCK) {
            return AppError::new(ErrorCode::InsufficientStock);
        }
        if msg.contains(THROW_SALE_NOT_PENDING) {
            return AppError::new(ErrorCode::SaleNotPending);
        }
        if msg.contains(THROW_SALE_NOT_FOUND) {
            return AppError::new(ErrorCode::SaleNotFound);
        }
    }
    err.into()
}
