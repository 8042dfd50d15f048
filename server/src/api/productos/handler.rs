//! Product handlers
//!
//! Read routes are open to any authenticated user; the catalog is what
//! customers browse. Everything that mutates goes through the admin
//! layer in the router.

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Product, ProductCreate, ProductUpdate};
use crate::db::repository::{ProductRepository, RepoError};
use crate::utils::{
    ApiResponse, AppError, AppResult, ErrorCode, MAX_DESCRIPTION_LEN, MAX_NAME_LEN, ok,
    ok_with_message, retry_transient, validate_optional_text, validate_required_text,
};

/// Default page size for the product listing
const DEFAULT_PAGE_SIZE: i64 = 10;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Page size, defaults to 10
    pub limite: Option<i64>,
    /// Results to skip
    pub offset: Option<i64>,
    /// List only soft-deleted products (admin only)
    #[serde(default)]
    pub incluir_eliminados: bool,
}

/// GET /api/productos
///
/// `incluir_eliminados=true` flips the listing to the deleted-only
/// view; it does not mix live and deleted products.
pub async fn list(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<ApiResponse<Vec<Product>>>> {
    let repo = ProductRepository::new(state.get_db());
    let limite = query.limite.unwrap_or(DEFAULT_PAGE_SIZE).max(0);
    let offset = query.offset.unwrap_or(0).max(0);

    let products = if query.incluir_eliminados {
        if !current_user.is_admin() {
            return Err(AppError::new(ErrorCode::AdminRequired));
        }
        retry_transient("list deleted products", || repo.find_deleted(limite, offset)).await?
    } else {
        retry_transient("list products", || repo.find_all(limite, offset)).await?
    };

    Ok(ok(products))
}

/// GET /api/productos/{id}
///
/// Soft-deleted products look nonexistent to customers but stay
/// visible to admins.
pub async fn get_by_id(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let repo = ProductRepository::new(state.get_db());
    let product = retry_transient("load product", || repo.find_by_id(&id))
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound))?;

    if product.is_deleted && !current_user.is_admin() {
        return Err(AppError::new(ErrorCode::ProductNotFound));
    }
    Ok(ok(product))
}

/// POST /api/productos
pub async fn create(
    State(state): State<ServerState>,
    Json(data): Json<ProductCreate>,
) -> AppResult<Json<ApiResponse<Product>>> {
    validate_payload(&data.name, data.description.as_deref())?;
    if data.unit_price.is_sign_negative() {
        return Err(AppError::new(ErrorCode::InvalidPrice));
    }
    if data.stock < 0 {
        return Err(AppError::new(ErrorCode::ValueOutOfRange)
            .with_detail("field", serde_json::json!("stock")));
    }

    let repo = ProductRepository::new(state.get_db());
    let product = repo.create(data).await.map_err(|e| match e {
        RepoError::Duplicate(_) => AppError::new(ErrorCode::BarcodeExists),
        other => other.into(),
    })?;

    tracing::info!(product = %product.id_string(), name = %product.name, "Product created");
    Ok(ok_with_message(product, "Producto creado"))
}

/// PUT /api/productos/{id}
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(data): Json<ProductUpdate>,
) -> AppResult<Json<ApiResponse<Product>>> {
    if let Some(ref name) = data.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    validate_optional_text(data.description.as_deref(), "description", MAX_DESCRIPTION_LEN)?;
    if let Some(price) = data.unit_price
        && price.is_sign_negative()
    {
        return Err(AppError::new(ErrorCode::InvalidPrice));
    }
    if let Some(stock) = data.stock
        && stock < 0
    {
        return Err(AppError::new(ErrorCode::ValueOutOfRange)
            .with_detail("field", serde_json::json!("stock")));
    }

    let repo = ProductRepository::new(state.get_db());
    let product = repo.update(&id, data).await.map_err(|e| match e {
        RepoError::NotFound(_) => AppError::new(ErrorCode::ProductNotFound),
        // The only validation left after the checks above
        RepoError::Validation(_) => AppError::new(ErrorCode::ProductDeleted),
        other => other.into(),
    })?;

    Ok(ok(product))
}

/// DELETE /api/productos/{id} - soft delete
pub async fn soft_delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let repo = ProductRepository::new(state.get_db());
    let product = repo.soft_delete(&id).await.map_err(|e| match e {
        RepoError::NotFound(_) => AppError::new(ErrorCode::ProductNotFound),
        RepoError::Validation(_) => AppError::new(ErrorCode::ProductDeleted),
        other => other.into(),
    })?;

    tracing::info!(product = %product.id_string(), "Product soft-deleted");
    Ok(ok_with_message(product, "Producto eliminado"))
}

/// POST /api/productos/{id}/restaurar
pub async fn restore(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let repo = ProductRepository::new(state.get_db());
    let product = repo.restore(&id).await.map_err(|e| match e {
        RepoError::NotFound(_) => AppError::new(ErrorCode::ProductNotFound),
        RepoError::Validation(_) => AppError::new(ErrorCode::ProductNotDeleted),
        other => other.into(),
    })?;

    tracing::info!(product = %product.id_string(), "Product restored");
    Ok(ok_with_message(product, "Producto restaurado"))
}

/// GET /api/productos/{id}/imagen
///
/// Raw JPEG bytes. Follows the same visibility rule as product reads:
/// a soft-deleted product's image looks nonexistent to customers.
pub async fn get_image(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let repo = ProductRepository::new(state.get_db());
    let product = retry_transient("load product", || repo.find_by_id(&id))
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound))?;
    if product.is_deleted && !current_user.is_admin() {
        return Err(AppError::new(ErrorCode::ProductNotFound));
    }

    let name = product
        .image
        .ok_or_else(|| AppError::new(ErrorCode::ImageNotFound))?;
    let bytes = state
        .image_store()
        .load(&name)
        .map_err(|e| AppError::internal(e.to_string()))?
        .ok_or_else(|| AppError::new(ErrorCode::ImageNotFound))?;

    Ok(([(http::header::CONTENT_TYPE, "image/jpeg")], bytes).into_response())
}

/// POST /api/productos/{id}/imagen
///
/// Multipart upload, field `imagen`. Replaces the previous image file
/// when the product already had one.
pub async fn upload_image(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> AppResult<Json<ApiResponse<Product>>> {
    let repo = ProductRepository::new(state.get_db());
    let product = retry_transient("load product", || repo.find_by_id(&id))
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound))?;
    if product.is_deleted {
        return Err(AppError::new(ErrorCode::ProductDeleted));
    }

    let mut bytes = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| AppError::new(ErrorCode::InvalidImage))?
    {
        if field.name() == Some("imagen") {
            bytes = Some(
                field
                    .bytes()
                    .await
                    .map_err(|_| AppError::new(ErrorCode::InvalidImage))?,
            );
        }
    }
    let bytes = bytes
        .filter(|b| !b.is_empty())
        .ok_or_else(|| AppError::new(ErrorCode::InvalidImage))?;

    let store = state.image_store();
    let name = store
        .save(&bytes)
        .map_err(|e| AppError::internal(e.to_string()))?;

    let updated = repo
        .update(
            &id,
            ProductUpdate {
                name: None,
                description: None,
                unit_price: None,
                stock: None,
                image: Some(name),
            },
        )
        .await
        .map_err(|e| match e {
            RepoError::NotFound(_) => AppError::new(ErrorCode::ProductNotFound),
            RepoError::Validation(_) => AppError::new(ErrorCode::ProductDeleted),
            other => other.into(),
        })?;

    // Old file only goes once the row points at the new one
    if let Some(old) = product.image {
        let _ = store.delete(&old);
    }

    tracing::info!(product = %updated.id_string(), "Product image updated");
    Ok(ok_with_message(updated, "Imagen actualizada"))
}

fn validate_payload(name: &str, description: Option<&str>) -> AppResult<()> {
    validate_required_text(name, "name", MAX_NAME_LEN)?;
    validate_optional_text(description, "description", MAX_DESCRIPTION_LEN)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use tempfile::{NamedTempFile, TempDir, tempdir};

    fn customer() -> CurrentUser {
        CurrentUser {
            id: "user:maria".to_string(),
            username: "maria".to_string(),
            role: "customer".to_string(),
        }
    }

    fn admin() -> CurrentUser {
        CurrentUser {
            id: "user:root".to_string(),
            username: "root".to_string(),
            role: "admin".to_string(),
        }
    }

    fn list_query(limite: Option<i64>, offset: Option<i64>, eliminados: bool) -> Query<ListQuery> {
        Query(ListQuery {
            limite,
            offset,
            incluir_eliminados: eliminados,
        })
    }

    async fn test_state() -> (ServerState, (NamedTempFile, TempDir)) {
        let cache = NamedTempFile::new().expect("temp file");
        let images = tempdir().expect("tempdir");
        let state = ServerState::for_tests(cache.path(), images.path()).await;
        (state, (cache, images))
    }

    async fn seed(state: &ServerState, name: &str) -> Product {
        ProductRepository::new(state.get_db())
            .create(ProductCreate {
                name: name.to_string(),
                description: None,
                barcode: None,
                unit_price: "3.10".parse::<Decimal>().expect("decimal"),
                stock: 5,
                image: None,
            })
            .await
            .expect("create product")
    }

    #[tokio::test]
    async fn test_listing_separates_live_and_deleted() {
        let (state, _guards) = test_state().await;
        let live = seed(&state, "Paracetamol").await;
        let gone = seed(&state, "Retirado").await;
        ProductRepository::new(state.get_db())
            .soft_delete(&gone.id_string())
            .await
            .expect("soft delete");

        let response = list(State(state.clone()), customer(), list_query(None, None, false))
            .await
            .expect("list");
        let products = response.0.data.expect("data");
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].id_string(), live.id_string());

        let err = list(State(state.clone()), customer(), list_query(None, None, true))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::AdminRequired);

        // Deleted view returns only deleted products, never a mix
        let response = list(State(state), admin(), list_query(None, None, true))
            .await
            .expect("deleted list");
        let products = response.0.data.expect("data");
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].id_string(), gone.id_string());
    }

    #[tokio::test]
    async fn test_listing_paginates() {
        let (state, _guards) = test_state().await;
        for name in ["Aspirina", "Bencina", "Curitas"] {
            seed(&state, name).await;
        }

        let response = list(State(state.clone()), customer(), list_query(Some(2), None, false))
            .await
            .expect("first page");
        assert_eq!(response.0.data.expect("data").len(), 2);

        let response = list(State(state), customer(), list_query(Some(2), Some(2), false))
            .await
            .expect("second page");
        let products = response.0.data.expect("data");
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].name, "Curitas");
    }

    #[tokio::test]
    async fn test_get_image_serves_stored_bytes() {
        let (state, _guards) = test_state().await;
        let product = seed(&state, "Crema hidratante").await;
        let id = product.id_string();

        // No image yet
        let err = get_image(State(state.clone()), customer(), Path(id.clone()))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ImageNotFound);

        let name = state.image_store().save(b"jpeg bytes").expect("save");
        let repo = ProductRepository::new(state.get_db());
        repo.update(
            &id,
            ProductUpdate {
                name: None,
                description: None,
                unit_price: None,
                stock: None,
                image: Some(name),
            },
        )
        .await
        .expect("attach image");

        let response = get_image(State(state.clone()), customer(), Path(id.clone()))
            .await
            .expect("image");
        assert_eq!(
            response
                .headers()
                .get(http::header::CONTENT_TYPE)
                .expect("content type"),
            "image/jpeg"
        );
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        assert_eq!(&body[..], b"jpeg bytes");

        // Soft-deleted products hide their image from customers
        repo.soft_delete(&id).await.expect("soft delete");
        let err = get_image(State(state.clone()), customer(), Path(id.clone()))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ProductNotFound);
        assert!(get_image(State(state), admin(), Path(id)).await.is_ok());
    }
}
