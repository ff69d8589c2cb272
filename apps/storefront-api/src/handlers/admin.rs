//! Admin product maintenance. The only writer of products outside seeding.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::info;

use gebeya_core::{Product, ProductInput};

use crate::auth::AdminUser;
use crate::error::ApiResult;
use crate::AppState;

/// `GET /admin/products`
///
/// The admin dashboard list: every product, deactivated ones included,
/// newest first.
pub async fn list_products(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
) -> ApiResult<Json<Vec<Product>>> {
    let products = state.db.products().list_all().await?;
    Ok(Json(products))
}

/// `POST /admin/products`
pub async fn create_product(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    body: Result<Json<ProductInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    let Json(input) = body?;
    let product = state.db.products().insert(&input).await?;

    info!(admin_id = admin.user_id, product_id = product.id, "Product created");
    Ok((StatusCode::CREATED, Json(product)))
}

/// `PUT /admin/products/{id}`
pub async fn update_product(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<ProductInput>, JsonRejection>,
) -> ApiResult<Json<Product>> {
    let Path(id) = id?;
    let Json(input) = body?;
    let product = state.db.products().update(id, &input).await?;

    info!(admin_id = admin.user_id, product_id = id, "Product updated");
    Ok(Json(product))
}

/// `DELETE /admin/products/{id}`
///
/// Deactivates the product; order history keeps referring to it.
pub async fn delete_product(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path(id) = id?;
    state.db.products().soft_delete(id).await?;

    info!(admin_id = admin.user_id, product_id = id, "Product deleted");
    Ok(StatusCode::NO_CONTENT)
}
