//! Cart handlers
//!
//! Carts are keyed by the authenticated user; there is no cart id on
//! the wire. All business rules live in the sales manager.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Sale, SaleModality};
use crate::sales::CartView;
use crate::utils::{ApiResponse, AppResult, ok, ok_with_message};

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub producto_id: String,
    pub cantidad: i64,
}

#[derive(Debug, Deserialize)]
pub struct RemoveItemQuery {
    /// Quantity to remove; the whole line when absent
    pub cantidad: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub modalidad: SaleModality,
}

/// GET /api/carrito
pub async fn get_cart(
    State(state): State<ServerState>,
    current_user: CurrentUser,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let cart = state.sales_manager().get_cart(&current_user.id).await?;
    Ok(ok(cart))
}

/// POST /api/carrito
pub async fn add_item(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Json(req): Json<AddItemRequest>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let cart = state
        .sales_manager()
        .add_to_cart(&current_user.id, &req.producto_id, req.cantidad)
        .await?;
    Ok(ok(cart))
}

/// DELETE /api/carrito/{producto_id}
pub async fn remove_item(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(producto_id): Path<String>,
    Query(query): Query<RemoveItemQuery>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let cart = state
        .sales_manager()
        .remove_from_cart(&current_user.id, &producto_id, query.cantidad)
        .await?;
    Ok(ok(cart))
}

/// DELETE /api/carrito
pub async fn clear(
    State(state): State<ServerState>,
    current_user: CurrentUser,
) -> AppResult<Json<ApiResponse<()>>> {
    state.sales_manager().clear_cart(&current_user.id)?;
    Ok(ok_with_message((), "Carrito vaciado"))
}

/// POST /api/carrito/checkout
///
/// Turns the cart into a pending sale. Stock is only reserved when an
/// admin completes the sale.
pub async fn checkout(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Json(req): Json<CheckoutRequest>,
) -> AppResult<Json<ApiResponse<Sale>>> {
    let sale = state
        .sales_manager()
        .checkout(&current_user.id, req.modalidad)
        .await?;

    tracing::info!(
        sale = %sale.id_string(),
        user = %current_user.username,
        modality = %req.modalidad.as_str(),
        "Sale created from cart"
    );
    Ok(ok_with_message(sale, "Venta creada"))
}
