//! Sale handlers
//!
//! A sale belongs to its buyer (virtual) or its seller (physical).
//! Owners and admins may read, complete or cancel it; reporting is
//! admin work behind the router layer. A sale outside a customer's
//! own set reads as nonexistent.

use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::Sale;
use crate::sales::{ReportQuery, SalesReport};
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode, ok, ok_with_message};

/// Whether the user is recorded on the sale as buyer or seller
fn owns_sale(sale: &Sale, user: &CurrentUser) -> bool {
    let held_by = |record: &Option<surrealdb::RecordId>| {
        record.as_ref().is_some_and(|id| id.to_string() == user.id)
    };
    held_by(&sale.buyer) || held_by(&sale.seller)
}

fn ensure_sale_access(sale: &Sale, user: &CurrentUser) -> AppResult<()> {
    if user.is_admin() || owns_sale(sale, user) {
        Ok(())
    } else {
        Err(AppError::new(ErrorCode::SaleNotFound))
    }
}

/// GET /api/ventas/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Sale>>> {
    let sale = state.sales_manager().get(&id).await?;
    ensure_sale_access(&sale, &current_user)?;
    Ok(ok(sale))
}

/// POST /api/ventas/{id}/completar
pub async fn complete(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Sale>>> {
    let manager = state.sales_manager();
    let sale = manager.get(&id).await?;
    ensure_sale_access(&sale, &current_user)?;

    let sale = manager.complete(&id).await?;
    tracing::info!(
        sale = %sale.id_string(),
        user = %current_user.username,
        "Sale completed"
    );
    Ok(ok_with_message(sale, "Venta completada"))
}

/// POST /api/ventas/{id}/cancelar
pub async fn cancel(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Sale>>> {
    let manager = state.sales_manager();
    let sale = manager.get(&id).await?;
    ensure_sale_access(&sale, &current_user)?;

    let sale = manager.cancel(&id).await?;
    tracing::info!(
        sale = %sale.id_string(),
        user = %current_user.username,
        "Sale cancelled"
    );
    Ok(ok_with_message(sale, "Venta cancelada"))
}

/// GET /api/ventas/reporte
pub async fn report(
    State(state): State<ServerState>,
    Query(query): Query<ReportQuery>,
) -> AppResult<Json<ApiResponse<SalesReport>>> {
    let report = state.sales_manager().report(&query).await?;
    Ok(ok(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{ProductCreate, SaleModality, SaleState};
    use crate::db::repository::ProductRepository;
    use rust_decimal::Decimal;
    use tempfile::{NamedTempFile, TempDir, tempdir};

    fn user(id: &str, username: &str, role: &str) -> CurrentUser {
        CurrentUser {
            id: id.to_string(),
            username: username.to_string(),
            role: role.to_string(),
        }
    }

    async fn state_with_sale(
        modality: SaleModality,
        user_id: &str,
    ) -> (ServerState, Sale, (NamedTempFile, TempDir)) {
        let cache = NamedTempFile::new().expect("temp file");
        let images = tempdir().expect("tempdir");
        let state = ServerState::for_tests(cache.path(), images.path()).await;

        let products = ProductRepository::new(state.get_db());
        let product = products
            .create(ProductCreate {
                name: "Ibuprofeno 600mg".to_string(),
                description: None,
                barcode: None,
                unit_price: "4.20".parse::<Decimal>().expect("decimal"),
                stock: 10,
                image: None,
            })
            .await
            .expect("create product");

        let manager = state.sales_manager();
        manager
            .add_to_cart(user_id, &product.id_string(), 2)
            .await
            .expect("add");
        let sale = manager.checkout(user_id, modality).await.expect("checkout");
        (state, sale, (cache, images))
    }

    #[tokio::test]
    async fn test_buyer_completes_own_virtual_sale() {
        let (state, sale, _guards) = state_with_sale(SaleModality::Virtual, "user:maria").await;
        let buyer = user("user:maria", "maria", "customer");

        let response = complete(State(state), buyer, Path(sale.id_string()))
            .await
            .expect("complete");
        let sale = response.0.data.expect("data");
        assert_eq!(sale.state, SaleState::Completada);
    }

    #[tokio::test]
    async fn test_seller_cancels_own_physical_sale() {
        let (state, sale, _guards) = state_with_sale(SaleModality::Fisica, "user:mostrador").await;
        let seller = user("user:mostrador", "mostrador", "customer");

        let response = cancel(State(state), seller, Path(sale.id_string()))
            .await
            .expect("cancel");
        let sale = response.0.data.expect("data");
        assert_eq!(sale.state, SaleState::Cancelada);
    }

    #[tokio::test]
    async fn test_stranger_cannot_touch_anothers_sale() {
        let (state, sale, _guards) = state_with_sale(SaleModality::Virtual, "user:maria").await;
        let stranger = user("user:pedro", "pedro", "customer");
        let id = sale.id_string();

        let err = get_by_id(State(state.clone()), stranger.clone(), Path(id.clone()))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::SaleNotFound);

        let err = complete(State(state.clone()), stranger.clone(), Path(id.clone()))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::SaleNotFound);

        let err = cancel(State(state.clone()), stranger, Path(id.clone()))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::SaleNotFound);

        // Untouched: still pending for the real owner
        let sale = state.sales_manager().get(&id).await.expect("get");
        assert_eq!(sale.state, SaleState::Pendiente);
    }

    #[tokio::test]
    async fn test_admin_completes_any_sale() {
        let (state, sale, _guards) = state_with_sale(SaleModality::Virtual, "user:maria").await;
        let admin = user("user:root", "root", "admin");

        let response = complete(State(state), admin, Path(sale.id_string()))
            .await
            .expect("complete");
        assert_eq!(response.0.data.expect("data").state, SaleState::Completada);
    }
}
