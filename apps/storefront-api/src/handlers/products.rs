//! Public catalog routes: home page, listing, suggestions, product page.

use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use gebeya_core::catalog::{CatalogParams, HomePage, Page, ProductDetails};
use gebeya_core::Product;

use crate::error::ApiResult;
use crate::AppState;

/// `GET /products/suggestions` query string.
#[derive(Debug, Default, Deserialize)]
pub struct SuggestionParams {
    #[serde(default)]
    pub q: String,
}

/// `GET /`
pub async fn home(State(state): State<AppState>) -> ApiResult<Json<HomePage>> {
    let home = state.db.products().home_page().await?;
    Ok(Json(home))
}

/// `GET /products`
pub async fn list(
    State(state): State<AppState>,
    params: Result<Query<CatalogParams>, QueryRejection>,
) -> ApiResult<Json<Page<Product>>> {
    let Query(params) = params?;
    let query = params.into_query(state.config.default_page_size)?;

    let page = state.db.products().query(&query).await?;
    Ok(Json(page))
}

/// `GET /products/suggestions?q=`
pub async fn suggestions(
    State(state): State<AppState>,
    params: Result<Query<SuggestionParams>, QueryRejection>,
) -> ApiResult<Json<Vec<String>>> {
    let Query(params) = params?;
    let names = state.db.products().suggestions(&params.q).await?;
    Ok(Json(names))
}

/// `GET /products/{id}`
pub async fn details(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<ProductDetails>> {
    let Path(id) = id?;
    let details = state.db.products().details(id).await?;
    Ok(Json(details))
}
