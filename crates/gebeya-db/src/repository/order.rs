//! # Order Repository
//!
//! Turns a cart into an order in one transaction, and reads order history.
//!
//! ## Placement Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  place_from_cart(user, checkout)                                       │
//! │       │                                                                 │
//! │       ▼  validate_checkout (no transaction yet)                         │
//! │  BEGIN                                                                 │
//! │   1. UPDATE users SET last_checkout_at   ← takes the write lock        │
//! │   2. SELECT cart lines + current prices                                │
//! │        └── empty? ROLLBACK → EmptyCart                                 │
//! │   3. summarize_cart (10% tax, half-up)                                 │
//! │   4. INSERT orders                                                     │
//! │   5. INSERT order_items  (name + unit price snapshot)                  │
//! │   6. DELETE cart_items                                                 │
//! │  COMMIT                                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Any error between BEGIN and COMMIT drops the transaction, which rolls it
//! back: there is never an order without its items, nor a cleared cart
//! without its order.
//!
//! Because step 1 writes, a second checkout for the same user waits on
//! SQLite's lock until the first commits, then reads the emptied cart and
//! fails with `EmptyCart`. A cart is ordered at most once.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::collections::HashMap;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::cart::fetch_lines;
use gebeya_core::pricing::summarize_cart;
use gebeya_core::validation::validate_checkout;
use gebeya_core::{
    CheckoutRequest, CoreError, Order, OrderDetails, OrderItem, OrderStatus, PaymentStatus,
};

/// Payment method recorded on every placed order.
pub const PAYMENT_METHOD_CARD: &str = "credit_card";

const ORDER_COLUMNS: &str = "id, order_number, user_id, full_name, email, phone_number, \
     address, city, state, zip_code, payment_method, card_last_four, \
     subtotal_cents, tax_cents, total_cents, payment_status, order_status, created_at";

const ITEM_COLUMNS: &str = "id, order_id, product_id, product_name, quantity, \
     unit_price_cents, line_total_cents, created_at";

#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Places an order for everything in the user's cart.
    ///
    /// ## Snapshot Pattern
    /// Product name and unit price are copied into each order item. Later
    /// product edits never change a placed order.
    ///
    /// ## Errors
    /// * `CoreError::InvalidFields` - shipping or payment fields rejected
    /// * `CoreError::EmptyCart` - nothing to order (nothing is written)
    /// * `DbError::NotFound` - unknown user
    pub async fn place_from_cart(
        &self,
        user_id: i64,
        checkout: &CheckoutRequest,
    ) -> DbResult<OrderDetails> {
        validate_checkout(checkout)?;

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let claimed = sqlx::query("UPDATE users SET last_checkout_at = ?1 WHERE id = ?2")
            .bind(now)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        if claimed.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(DbError::not_found("User", user_id));
        }

        let lines = fetch_lines(&mut *tx, user_id).await?;
        if lines.is_empty() {
            tx.rollback().await?;
            debug!(user_id, "Checkout with empty cart");
            return Err(CoreError::EmptyCart.into());
        }

        let summary = summarize_cart(&lines)?;
        let shipping = &checkout.shipping;

        let mut order = Order {
            id: 0,
            order_number: generate_order_number(now),
            user_id,
            full_name: shipping.full_name.trim().to_string(),
            email: shipping.email.trim().to_string(),
            phone_number: shipping.phone_number.trim().to_string(),
            address: shipping.address.trim().to_string(),
            city: shipping.city.trim().to_string(),
            state: shipping.state.trim().to_string(),
            zip_code: shipping.zip_code.trim().to_string(),
            payment_method: PAYMENT_METHOD_CARD.to_string(),
            card_last_four: checkout.payment.card_last_four(),
            subtotal_cents: summary.subtotal_cents,
            tax_cents: summary.tax_cents,
            total_cents: summary.total_cents,
            payment_status: PaymentStatus::Paid,
            order_status: OrderStatus::Processing,
            created_at: now,
        };

        let inserted = sqlx::query(
            r#"
            INSERT INTO orders (
                order_number, user_id, full_name, email, phone_number,
                address, city, state, zip_code,
                payment_method, card_last_four,
                subtotal_cents, tax_cents, total_cents,
                payment_status, order_status, created_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5,
                ?6, ?7, ?8, ?9,
                ?10, ?11,
                ?12, ?13, ?14,
                ?15, ?16, ?17
            )
            "#,
        )
        .bind(&order.order_number)
        .bind(order.user_id)
        .bind(&order.full_name)
        .bind(&order.email)
        .bind(&order.phone_number)
        .bind(&order.address)
        .bind(&order.city)
        .bind(&order.state)
        .bind(&order.zip_code)
        .bind(&order.payment_method)
        .bind(&order.card_last_four)
        .bind(order.subtotal_cents)
        .bind(order.tax_cents)
        .bind(order.total_cents)
        .bind(order.payment_status)
        .bind(order.order_status)
        .bind(order.created_at)
        .execute(&mut *tx)
        .await?;
        order.id = inserted.last_insert_rowid();

        let mut items = Vec::with_capacity(lines.len());
        for line in &lines {
            let line_total = line
                .unit_price()
                .checked_mul_quantity(line.quantity)
                .ok_or_else(|| CoreError::InvalidLineItem {
                    reason: format!("line total overflows for product {}", line.product_id),
                })?;

            let result = sqlx::query(
                r#"
                INSERT INTO order_items (
                    order_id, product_id, product_name, quantity,
                    unit_price_cents, line_total_cents, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(order.id)
            .bind(line.product_id)
            .bind(&line.name)
            .bind(line.quantity)
            .bind(line.unit_price_cents)
            .bind(line_total.cents())
            .bind(now)
            .execute(&mut *tx)
            .await?;

            items.push(OrderItem {
                id: result.last_insert_rowid(),
                order_id: order.id,
                product_id: line.product_id,
                product_name: line.name.clone(),
                quantity: line.quantity,
                unit_price_cents: line.unit_price_cents,
                line_total_cents: line_total.cents(),
                created_at: now,
            });
        }

        sqlx::query("DELETE FROM cart_items WHERE user_id = ?1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            order_id = order.id,
            order_number = %order.order_number,
            user_id,
            items = items.len(),
            total_cents = order.total_cents,
            "Order placed"
        );

        Ok(OrderDetails { order, items })
    }

    /// Gets one of the user's orders with its items.
    ///
    /// ## Errors
    /// * `CoreError::OrderNotFound` - no such order
    /// * `CoreError::Forbidden` - the order belongs to someone else
    pub async fn get_for_user(&self, order_id: i64, user_id: i64) -> DbResult<OrderDetails> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {} FROM orders WHERE id = ?1",
            ORDER_COLUMNS
        ))
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(CoreError::OrderNotFound(order_id))?;

        if order.user_id != user_id {
            return Err(CoreError::Forbidden { order_id }.into());
        }

        let items = sqlx::query_as::<_, OrderItem>(&format!(
            "SELECT {} FROM order_items WHERE order_id = ?1 ORDER BY id",
            ITEM_COLUMNS
        ))
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(OrderDetails { order, items })
    }

    /// The user's orders, newest first, each with its items.
    pub async fn list_for_user(&self, user_id: i64) -> DbResult<Vec<OrderDetails>> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {} FROM orders WHERE user_id = ?1 ORDER BY id DESC",
            ORDER_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let items = sqlx::query_as::<_, OrderItem>(&format!(
            r#"
            SELECT {} FROM order_items
            WHERE order_id IN (SELECT id FROM orders WHERE user_id = ?1)
            ORDER BY order_id, id
            "#,
            ITEM_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut by_order: HashMap<i64, Vec<OrderItem>> = HashMap::new();
        for item in items {
            by_order.entry(item.order_id).or_default().push(item);
        }

        Ok(orders
            .into_iter()
            .map(|order| {
                let items = by_order.remove(&order.id).unwrap_or_default();
                OrderDetails { order, items }
            })
            .collect())
    }

    /// Number of orders the user has placed.
    pub async fn count_for_user(&self, user_id: i64) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE user_id = ?1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Generates a human-readable order number.
///
/// ## Format
/// `GB-YYYYMMDD-XXXXXXXX`, e.g. `GB-20260115-3F9A0C1B`. The suffix is
/// random, so numbers do not reveal order volume.
pub fn generate_order_number(placed_at: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string()[..8].to_uppercase();
    format!("GB-{}-{}", placed_at.format("%Y%m%d"), suffix)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::test_support::{product, test_db, user};
    use chrono::TimeZone;
    use gebeya_core::{PaymentInfo, ShippingInfo};

    fn checkout() -> CheckoutRequest {
        CheckoutRequest {
            shipping: ShippingInfo {
                full_name: "Selam Tesfaye".to_string(),
                email: "selam@example.com".to_string(),
                phone_number: "+251911223344".to_string(),
                address: "Bole Road 12".to_string(),
                city: "Addis Ababa".to_string(),
                state: "Addis Ababa".to_string(),
                zip_code: "1000".to_string(),
            },
            payment: PaymentInfo {
                card_number: "4111 1111 1111 4242".to_string(),
                expiry_date: "12/30".to_string(),
                cvv: "123".to_string(),
                name_on_card: "Selam Tesfaye".to_string(),
            },
        }
    }

    async fn order_rows(db: &Database) -> (i64, i64) {
        let orders: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(db.pool())
            .await
            .unwrap();
        let items: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM order_items")
            .fetch_one(db.pool())
            .await
            .unwrap();
        (orders, items)
    }

    #[test]
    fn test_order_number_format() {
        let at = Utc.with_ymd_and_hms(2026, 1, 15, 9, 30, 0).unwrap();
        let number = generate_order_number(at);

        assert!(number.starts_with("GB-20260115-"));
        let suffix = &number["GB-20260115-".len()..];
        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
        assert_ne!(number, generate_order_number(at));
    }

    #[tokio::test]
    async fn test_place_order_prices_and_clears_cart() {
        let db = test_db().await;
        let shopper = user(&db, "buyer@example.com").await;
        let a = db.products().insert(&product("Lip Gloss", "makeup", 1000)).await.unwrap();
        let b = db.products().insert(&product("Face Mask", "skincare", 500)).await.unwrap();
        db.carts().add_item(shopper, a.id, 2).await.unwrap();
        db.carts().add_item(shopper, b.id, 1).await.unwrap();

        let placed = db.orders().place_from_cart(shopper, &checkout()).await.unwrap();

        assert_eq!(placed.order.subtotal_cents, 2500);
        assert_eq!(placed.order.tax_cents, 250);
        assert_eq!(placed.order.total_cents, 2750);
        assert_eq!(placed.order.payment_status, PaymentStatus::Paid);
        assert_eq!(placed.order.order_status, OrderStatus::Processing);
        assert_eq!(placed.order.card_last_four, "4242");
        assert_eq!(placed.items.len(), 2);
        assert_eq!(placed.items[0].line_total_cents, 2000);

        assert!(db.carts().list_items(shopper).await.unwrap().is_empty());

        let stored = db.orders().get_for_user(placed.order.id, shopper).await.unwrap();
        assert_eq!(stored.order.order_number, placed.order.order_number);
        assert_eq!(stored.order.total_cents, 2750);
        assert_eq!(stored.items.len(), 2);
        let item_sum: i64 = stored.items.iter().map(|i| i.line_total_cents).sum();
        assert_eq!(item_sum, stored.order.subtotal_cents);
    }

    #[tokio::test]
    async fn test_empty_cart_writes_nothing() {
        let db = test_db().await;
        let shopper = user(&db, "empty@example.com").await;

        let err = db.orders().place_from_cart(shopper, &checkout()).await.unwrap_err();
        assert!(matches!(err.as_domain(), Some(CoreError::EmptyCart)));
        assert_eq!(order_rows(&db).await, (0, 0));
    }

    #[tokio::test]
    async fn test_invalid_checkout_keeps_cart() {
        let db = test_db().await;
        let shopper = user(&db, "invalid@example.com").await;
        let p = db.products().insert(&product("Blush", "makeup", 900)).await.unwrap();
        db.carts().add_item(shopper, p.id, 1).await.unwrap();

        let mut request = checkout();
        request.shipping.email = "not-an-email".to_string();
        request.payment.cvv = "1".to_string();

        let err = db.orders().place_from_cart(shopper, &request).await.unwrap_err();
        match err.as_domain() {
            Some(CoreError::InvalidFields(fields)) => {
                assert!(fields.contains("email"));
                assert!(fields.contains("cvv"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(db.carts().count(shopper).await.unwrap(), 1);
        assert_eq!(order_rows(&db).await, (0, 0));
    }

    #[tokio::test]
    async fn test_failed_item_insert_rolls_back_checkout() {
        let db = test_db().await;
        let shopper = user(&db, "rollback@example.com").await;
        let a = db.products().insert(&product("Toner", "skincare", 1200)).await.unwrap();
        let b = db.products().insert(&product("Kohl", "makeup", 600)).await.unwrap();
        db.carts().add_item(shopper, a.id, 1).await.unwrap();
        db.carts().add_item(shopper, b.id, 3).await.unwrap();

        sqlx::query(
            "CREATE TRIGGER reject_order_items BEFORE INSERT ON order_items \
             BEGIN SELECT RAISE(ABORT, 'boom'); END",
        )
        .execute(db.pool())
        .await
        .unwrap();

        let err = db.orders().place_from_cart(shopper, &checkout()).await.unwrap_err();
        assert!(err.as_domain().is_none(), "{:?}", err);
        assert!(matches!(&err, DbError::QueryFailed(msg) if msg == "boom"), "{:?}", err);

        assert_eq!(order_rows(&db).await, (0, 0));
        let lines = db.carts().list_items(shopper).await.unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(db.carts().count(shopper).await.unwrap(), 4);

        let last_checkout: Option<String> =
            sqlx::query_scalar("SELECT last_checkout_at FROM users WHERE id = ?1")
                .bind(shopper)
                .fetch_one(db.pool())
                .await
                .unwrap();
        assert_eq!(last_checkout, None);
    }

    #[tokio::test]
    async fn test_unknown_user() {
        let db = test_db().await;
        let err = db.orders().place_from_cart(999, &checkout()).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_order_snapshot_survives_price_change() {
        let db = test_db().await;
        let shopper = user(&db, "snapshot@example.com").await;
        let p = db.products().insert(&product("Perfume", "fragrance", 4500)).await.unwrap();
        db.carts().add_item(shopper, p.id, 1).await.unwrap();
        let placed = db.orders().place_from_cart(shopper, &checkout()).await.unwrap();

        db.products()
            .update(p.id, &product("Perfume Deluxe", "fragrance", 9900))
            .await
            .unwrap();

        let stored = db.orders().get_for_user(placed.order.id, shopper).await.unwrap();
        assert_eq!(stored.items[0].unit_price_cents, 4500);
        assert_eq!(stored.items[0].product_name, "Perfume");
        assert_eq!(stored.order.subtotal_cents, 4500);
    }

    #[tokio::test]
    async fn test_other_users_order_is_forbidden() {
        let db = test_db().await;
        let owner = user(&db, "owner@example.com").await;
        let intruder = user(&db, "intruder@example.com").await;
        let p = db.products().insert(&product("Brush", "tools", 1200)).await.unwrap();
        db.carts().add_item(owner, p.id, 1).await.unwrap();
        let placed = db.orders().place_from_cart(owner, &checkout()).await.unwrap();

        let err = db.orders().get_for_user(placed.order.id, intruder).await.unwrap_err();
        assert!(matches!(err.as_domain(), Some(CoreError::Forbidden { .. })));

        let err = db.orders().get_for_user(placed.order.id + 100, owner).await.unwrap_err();
        assert!(matches!(err.as_domain(), Some(CoreError::OrderNotFound(_))));
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let db = test_db().await;
        let shopper = user(&db, "history@example.com").await;
        let p = db.products().insert(&product("Shampoo", "hair", 700)).await.unwrap();

        let mut placed = Vec::new();
        for qty in 1..=3 {
            db.carts().add_item(shopper, p.id, qty).await.unwrap();
            placed.push(db.orders().place_from_cart(shopper, &checkout()).await.unwrap());
        }

        let orders = db.orders().list_for_user(shopper).await.unwrap();
        let ids: Vec<i64> = orders.iter().map(|o| o.order.id).collect();
        let expected: Vec<i64> = placed.iter().rev().map(|o| o.order.id).collect();
        assert_eq!(ids, expected);
        assert_eq!(orders[0].items[0].quantity, 3);
        assert_eq!(db.orders().count_for_user(shopper).await.unwrap(), 3);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_checkout_orders_cart_once() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(DbConfig::new(dir.path().join("race.db")).max_connections(4))
            .await
            .unwrap();
        let shopper = user(&db, "race@example.com").await;
        let p = db.products().insert(&product("Palette", "makeup", 3000)).await.unwrap();
        db.carts().add_item(shopper, p.id, 2).await.unwrap();

        let first = {
            let db = db.clone();
            tokio::spawn(async move { db.orders().place_from_cart(shopper, &checkout()).await })
        };
        let second = {
            let db = db.clone();
            tokio::spawn(async move { db.orders().place_from_cart(shopper, &checkout()).await })
        };

        let results = [first.await.unwrap(), second.await.unwrap()];
        let succeeded = results.iter().filter(|r| r.is_ok()).count();
        let empty = results
            .iter()
            .filter(|r| matches!(r, Err(e) if matches!(e.as_domain(), Some(CoreError::EmptyCart))))
            .count();

        assert_eq!(succeeded, 1);
        assert_eq!(empty, 1);
        assert_eq!(order_rows(&db).await, (1, 1));
        db.close().await;
    }
}
