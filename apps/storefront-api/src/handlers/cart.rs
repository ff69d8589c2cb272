//! Cart routes. Every route acts on the caller's own cart.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use gebeya_core::CartView;

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::AppState;

/// `POST /cart` body.
#[derive(Debug, Clone, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AddToCartRequest {
    pub product_id: i64,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

fn default_quantity() -> i64 {
    1
}

/// `PUT /cart/{itemId}` body.
#[derive(Debug, Clone, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UpdateCartItemRequest {
    pub quantity: i64,
}

/// `GET /cart/count` response.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct CartCount {
    pub count: i64,
}

/// `GET /cart`
pub async fn view(State(state): State<AppState>, user: AuthUser) -> ApiResult<Json<CartView>> {
    let cart = state.db.carts().view(user.user_id).await?;
    Ok(Json(cart))
}

/// `POST /cart`, returning the updated cart.
pub async fn add(
    State(state): State<AppState>,
    user: AuthUser,
    body: Result<Json<AddToCartRequest>, JsonRejection>,
) -> ApiResult<Json<CartView>> {
    let Json(request) = body?;
    let carts = state.db.carts();

    carts
        .add_item(user.user_id, request.product_id, request.quantity)
        .await?;

    Ok(Json(carts.view(user.user_id).await?))
}

/// `PUT /cart/{itemId}`
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    item_id: Result<Path<i64>, PathRejection>,
    body: Result<Json<UpdateCartItemRequest>, JsonRejection>,
) -> ApiResult<Json<CartView>> {
    let Path(item_id) = item_id?;
    let Json(request) = body?;
    let carts = state.db.carts();

    carts
        .update_item(user.user_id, item_id, request.quantity)
        .await?;

    Ok(Json(carts.view(user.user_id).await?))
}

/// `DELETE /cart/{itemId}`
pub async fn remove(
    State(state): State<AppState>,
    user: AuthUser,
    item_id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<CartView>> {
    let Path(item_id) = item_id?;
    let carts = state.db.carts();

    carts.remove_item(user.user_id, item_id).await?;

    Ok(Json(carts.view(user.user_id).await?))
}

/// `DELETE /cart`
pub async fn clear(State(state): State<AppState>, user: AuthUser) -> ApiResult<StatusCode> {
    state.db.carts().clear(user.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /cart/count`
pub async fn count(State(state): State<AppState>, user: AuthUser) -> ApiResult<Json<CartCount>> {
    let count = state.db.carts().count(user.user_id).await?;
    Ok(Json(CartCount { count }))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::handlers::test_support::TestApp;

    #[tokio::test]
    async fn test_cart_requires_token() {
        let app = TestApp::new().await;

        let (status, body) = app.get("/cart", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "UNAUTHORIZED");

        let (status, _) = app.get("/cart", Some("not-a-jwt")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_token_for_deleted_user_is_rejected() {
        let app = TestApp::new().await;
        let token = app.state.jwt.generate_access_token(4242, false).unwrap();

        let (status, _) = app.get("/cart", Some(&token)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_add_merge_update_remove() {
        let app = TestApp::new().await;
        let (_, token) = app.user("ada@example.com", false).await;
        let lipstick = app.product("Velvet Lipstick", "makeup", 1000).await;
        let cream = app.product("Night Cream", "skincare", 500).await;

        let add = |product_id: i64, quantity: i64| json!({ "productId": product_id, "quantity": quantity });

        app.send(Method::POST, "/cart", Some(&token), Some(add(lipstick.id, 1)))
            .await;
        let (status, body) = app
            .send(Method::POST, "/cart", Some(&token), Some(add(lipstick.id, 1)))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["items"].as_array().unwrap().len(), 1);
        assert_eq!(body["items"][0]["quantity"], 2);

        // quantity defaults to 1
        let (_, body) = app
            .send(Method::POST, "/cart", Some(&token), Some(json!({ "productId": cream.id })))
            .await;
        assert_eq!(body["summary"]["subtotalCents"], 2500);
        assert_eq!(body["summary"]["taxCents"], 250);
        assert_eq!(body["summary"]["totalCents"], 2750);

        let (_, body) = app.get("/cart/count", Some(&token)).await;
        assert_eq!(body["count"], 3);

        let line_id = body_line_id(&app, &token, 0).await;
        let (status, body) = app
            .send(
                Method::PUT,
                &format!("/cart/{}", line_id),
                Some(&token),
                Some(json!({ "quantity": 5 })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["items"][0]["quantity"], 5);

        let (status, body) = app
            .send(Method::DELETE, &format!("/cart/{}", line_id), Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["items"].as_array().unwrap().len(), 1);

        let (status, body) = app.send(Method::DELETE, "/cart", Some(&token), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(body.is_null());

        let (_, body) = app.get("/cart/count", Some(&token)).await;
        assert_eq!(body["count"], 0);
    }

    async fn body_line_id(app: &TestApp, token: &str, index: usize) -> i64 {
        let (_, body) = app.get("/cart", Some(token)).await;
        body["items"][index]["id"].as_i64().unwrap()
    }

    #[tokio::test]
    async fn test_add_errors() {
        let app = TestApp::new().await;
        let (_, token) = app.user("ada@example.com", false).await;
        let lipstick = app.product("Velvet Lipstick", "makeup", 1000).await;

        let (status, body) = app
            .send(Method::POST, "/cart", Some(&token), Some(json!({ "productId": 9999 })))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");

        let (status, body) = app
            .send(
                Method::POST,
                "/cart",
                Some(&token),
                Some(json!({ "productId": lipstick.id, "quantity": 0 })),
            )
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["fields"]["quantity"].is_string());

        let (status, body) = app
            .send(Method::POST, "/cart", Some(&token), Some(json!({ "quantity": 1 })))
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_other_users_line_is_not_found() {
        let app = TestApp::new().await;
        let (_, ada) = app.user("ada@example.com", false).await;
        let (_, bob) = app.user("bob@example.com", false).await;
        let lipstick = app.product("Velvet Lipstick", "makeup", 1000).await;

        app.send(
            Method::POST,
            "/cart",
            Some(&ada),
            Some(json!({ "productId": lipstick.id })),
        )
        .await;
        let line_id = body_line_id(&app, &ada, 0).await;

        let (status, _) = app
            .send(
                Method::PUT,
                &format!("/cart/{}", line_id),
                Some(&bob),
                Some(json!({ "quantity": 3 })),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, body) = app.get("/cart", Some(&ada)).await;
        assert_eq!(body["items"][0]["quantity"], 1);
    }
}
