//! Order routes: checkout, order history, order detail.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::info;

use gebeya_core::{CheckoutRequest, OrderDetails};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// `POST /orders`
///
/// Turns the caller's cart into an order. On success the cart is empty and
/// the response is the confirmation view.
pub async fn place(
    State(state): State<AppState>,
    user: AuthUser,
    body: Result<Json<CheckoutRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<OrderDetails>)> {
    let Json(checkout) = body?;

    let details = state
        .db
        .orders()
        .place_from_cart(user.user_id, &checkout)
        .await
        .map_err(ApiError::order_placement)?;

    info!(
        user_id = user.user_id,
        order_number = %details.order.order_number,
        "Checkout completed"
    );

    Ok((StatusCode::CREATED, Json(details)))
}

/// `GET /orders`, newest first.
pub async fn list(State(state): State<AppState>, user: AuthUser) -> ApiResult<Json<Vec<OrderDetails>>> {
    let orders = state.db.orders().list_for_user(user.user_id).await?;
    Ok(Json(orders))
}

/// `GET /orders/{id}` and `GET /orders/{id}/confirmation`
pub async fn details(
    State(state): State<AppState>,
    user: AuthUser,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<OrderDetails>> {
    let Path(id) = id?;
    let order = state.db.orders().get_for_user(id, user.user_id).await?;
    Ok(Json(order))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::{json, Value};

    use crate::handlers::test_support::TestApp;

    fn checkout() -> Value {
        json!({
            "fullName": "Ada Lovelace",
            "email": "ada@example.com",
            "phoneNumber": "+251 911 000000",
            "address": "Bole Road 12",
            "city": "Addis Ababa",
            "state": "Addis Ababa",
            "zipCode": "1000",
            "cardNumber": "4242 4242 4242 4242",
            "expiryDate": "12/30",
            "cvv": "123",
            "nameOnCard": "Ada Lovelace"
        })
    }

    async fn fill_cart(app: &TestApp, token: &str) {
        let lipstick = app.product("Velvet Lipstick", "makeup", 1000).await;
        let cream = app.product("Night Cream", "skincare", 500).await;
        app.send(
            Method::POST,
            "/cart",
            Some(token),
            Some(json!({ "productId": lipstick.id, "quantity": 2 })),
        )
        .await;
        app.send(
            Method::POST,
            "/cart",
            Some(token),
            Some(json!({ "productId": cream.id, "quantity": 1 })),
        )
        .await;
    }

    #[tokio::test]
    async fn test_place_order() {
        let app = TestApp::new().await;
        let (_, token) = app.user("ada@example.com", false).await;
        fill_cart(&app, &token).await;

        let (status, body) = app
            .send(Method::POST, "/orders", Some(&token), Some(checkout()))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["subtotalCents"], 2500);
        assert_eq!(body["taxCents"], 250);
        assert_eq!(body["totalCents"], 2750);
        assert_eq!(body["paymentStatus"], "paid");
        assert_eq!(body["orderStatus"], "processing");
        assert_eq!(body["cardLastFour"], "4242");
        assert!(body.get("cardNumber").is_none());
        assert_eq!(body["items"].as_array().unwrap().len(), 2);

        let (_, cart) = app.get("/cart", Some(&token)).await;
        assert!(cart["items"].as_array().unwrap().is_empty());

        let id = body["id"].as_i64().unwrap();
        let (status, confirmation) = app
            .get(&format!("/orders/{}/confirmation", id), Some(&token))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(confirmation["orderNumber"], body["orderNumber"]);

        let (_, orders) = app.get("/orders", Some(&token)).await;
        assert_eq!(orders.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_cart_is_conflict() {
        let app = TestApp::new().await;
        let (_, token) = app.user("ada@example.com", false).await;

        let (status, body) = app
            .send(Method::POST, "/orders", Some(&token), Some(checkout()))
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "EMPTY_CART");

        let (_, orders) = app.get("/orders", Some(&token)).await;
        assert!(orders.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_checkout_reports_every_field() {
        let app = TestApp::new().await;
        let (_, token) = app.user("ada@example.com", false).await;
        fill_cart(&app, &token).await;

        let mut body = checkout();
        body["email"] = json!("not-an-email");
        body["cvv"] = json!("12");

        let (status, body) = app.send(Method::POST, "/orders", Some(&token), Some(body)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["fields"]["email"].is_string());
        assert!(body["fields"]["cvv"].is_string());

        let (_, count) = app.get("/cart/count", Some(&token)).await;
        assert_eq!(count["count"], 3);
    }

    #[tokio::test]
    async fn test_storage_failure_hides_details_and_keeps_cart() {
        let app = TestApp::new().await;
        let (_, token) = app.user("ada@example.com", false).await;
        fill_cart(&app, &token).await;

        sqlx::query(
            "CREATE TRIGGER reject_order_items BEFORE INSERT ON order_items \
             BEGIN SELECT RAISE(ABORT, 'boom'); END",
        )
        .execute(app.state.db.pool())
        .await
        .unwrap();

        let (status, body) = app
            .send(Method::POST, "/orders", Some(&token), Some(checkout()))
            .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], "ORDER_PLACEMENT_FAILED");
        let message = body["message"].as_str().unwrap();
        assert!(!message.contains("boom"), "{}", message);
        assert!(!message.contains("order_items"), "{}", message);

        let (_, count) = app.get("/cart/count", Some(&token)).await;
        assert_eq!(count["count"], 3);
        let (_, orders) = app.get("/orders", Some(&token)).await;
        assert!(orders.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_other_users_order_is_forbidden() {
        let app = TestApp::new().await;
        let (_, ada) = app.user("ada@example.com", false).await;
        let (_, bob) = app.user("bob@example.com", false).await;
        fill_cart(&app, &ada).await;

        let (_, order) = app.send(Method::POST, "/orders", Some(&ada), Some(checkout())).await;
        let id = order["id"].as_i64().unwrap();

        let (status, body) = app.get(&format!("/orders/{}", id), Some(&bob)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["code"], "FORBIDDEN");

        let (status, _) = app.get("/orders/9999", Some(&bob)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = app.get(&format!("/orders/{}", id), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
