//! # Cart Repository
//!
//! One cart per user, one line per product.
//!
//! ## Add-to-Cart Merge
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  add_item(user 7, product 42, qty 3)                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN                                                                 │
//! │  INSERT ... SELECT FROM products WHERE id = 42 AND is_active = 1       │
//! │    ON CONFLICT (user_id, product_id)                                   │
//! │    DO UPDATE SET quantity = quantity + 3                               │
//! │       │                                                                 │
//! │       ├── 0 rows → product missing or deleted → ROLLBACK               │
//! │       ├── line quantity > 999  → ROLLBACK                              │
//! │       ├── distinct lines > 100 → ROLLBACK                              │
//! │       ▼                                                                 │
//! │  COMMIT                                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The upsert is the first statement, so the transaction holds SQLite's
//! write lock before it reads anything. Two concurrent adds of the same
//! product always end with the summed quantity on a single line.
//!
//! Cart lines read the product's *current* price. Prices are frozen only
//! when an order is placed.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use gebeya_core::pricing::summarize_cart;
use gebeya_core::validation::validate_quantity;
use gebeya_core::{CartLine, CartView, CoreError, MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

#[derive(Debug, Clone)]
pub struct CartRepository {
    pool: SqlitePool,
}

impl CartRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CartRepository { pool }
    }

    /// The user's cart lines in the order they were first added.
    pub async fn list_items(&self, user_id: i64) -> DbResult<Vec<CartLine>> {
        let mut conn = self.pool.acquire().await?;
        fetch_lines(&mut *conn, user_id).await
    }

    /// Cart lines priced by the pricing engine.
    pub async fn view(&self, user_id: i64) -> DbResult<CartView> {
        let items = self.list_items(user_id).await?;
        let summary = summarize_cart(&items)?;
        Ok(CartView { items, summary })
    }

    /// Adds `quantity` of a product, merging into an existing line.
    ///
    /// ## Returns
    /// The line after the merge.
    ///
    /// ## Errors
    /// * `CoreError::Validation` - quantity outside 1..=999
    /// * `CoreError::ProductNotFound` - unknown or deleted product
    /// * `CoreError::QuantityTooLarge` - merged quantity over 999
    /// * `CoreError::CartTooLarge` - a 101st distinct product
    pub async fn add_item(&self, user_id: i64, product_id: i64, quantity: i64) -> DbResult<CartLine> {
        validate_quantity(quantity)?;

        debug!(user_id, product_id, quantity, "Adding to cart");

        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO cart_items (user_id, product_id, quantity, created_at, updated_at)
            SELECT ?1, id, ?3, ?4, ?4 FROM products WHERE id = ?2 AND is_active = 1
            ON CONFLICT (user_id, product_id) DO UPDATE SET
                quantity = quantity + excluded.quantity,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(user_id)
        .bind(product_id)
        .bind(quantity)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(CoreError::ProductNotFound(product_id).into());
        }

        let (line_quantity, distinct): (i64, i64) = sqlx::query_as(
            r#"
            SELECT
                (SELECT quantity FROM cart_items WHERE user_id = ?1 AND product_id = ?2),
                (SELECT COUNT(*) FROM cart_items WHERE user_id = ?1)
            "#,
        )
        .bind(user_id)
        .bind(product_id)
        .fetch_one(&mut *tx)
        .await?;

        if line_quantity > MAX_ITEM_QUANTITY {
            tx.rollback().await?;
            return Err(CoreError::QuantityTooLarge {
                requested: line_quantity,
                max: MAX_ITEM_QUANTITY,
            }
            .into());
        }

        if distinct as usize > MAX_CART_ITEMS {
            tx.rollback().await?;
            return Err(CoreError::CartTooLarge { max: MAX_CART_ITEMS }.into());
        }

        let line = fetch_line(&mut *tx, user_id, product_id).await?;
        tx.commit().await?;

        Ok(line)
    }

    /// Sets the quantity of one of the user's lines.
    ///
    /// A line owned by someone else is reported as `CartItemNotFound`.
    pub async fn update_item(&self, user_id: i64, item_id: i64, quantity: i64) -> DbResult<CartLine> {
        validate_quantity(quantity)?;

        debug!(user_id, item_id, quantity, "Updating cart item");

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE cart_items
            SET quantity = ?3, updated_at = ?4
            WHERE id = ?1 AND user_id = ?2
            "#,
        )
        .bind(item_id)
        .bind(user_id)
        .bind(quantity)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(CoreError::CartItemNotFound(item_id).into());
        }

        let product_id: i64 = sqlx::query_scalar("SELECT product_id FROM cart_items WHERE id = ?1")
            .bind(item_id)
            .fetch_one(&mut *tx)
            .await?;
        let line = fetch_line(&mut *tx, user_id, product_id).await?;
        tx.commit().await?;

        Ok(line)
    }

    /// Removes one of the user's lines.
    pub async fn remove_item(&self, user_id: i64, item_id: i64) -> DbResult<()> {
        debug!(user_id, item_id, "Removing cart item");

        let result = sqlx::query("DELETE FROM cart_items WHERE id = ?1 AND user_id = ?2")
            .bind(item_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::CartItemNotFound(item_id).into());
        }

        Ok(())
    }

    /// Empties the cart. Returns the number of lines removed.
    pub async fn clear(&self, user_id: i64) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM cart_items WHERE user_id = ?1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        debug!(user_id, removed = result.rows_affected(), "Cleared cart");
        Ok(result.rows_affected())
    }

    /// Total units in the cart, for the header badge.
    pub async fn count(&self, user_id: i64) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COALESCE(SUM(quantity), 0) FROM cart_items WHERE user_id = ?1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}

const LINE_SELECT: &str = r#"
    SELECT
        c.id, c.product_id, p.name, p.brand, p.image_url,
        p.price_cents AS unit_price_cents, c.quantity, c.created_at AS added_at
    FROM cart_items c
    JOIN products p ON p.id = c.product_id
"#;

/// Reads the user's lines on an existing connection, so checkout can
/// price the cart inside its own transaction.
pub(crate) async fn fetch_lines(conn: &mut SqliteConnection, user_id: i64) -> DbResult<Vec<CartLine>> {
    let lines = sqlx::query_as::<_, CartLine>(&format!(
        "{} WHERE c.user_id = ?1 ORDER BY c.id",
        LINE_SELECT
    ))
    .bind(user_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(lines)
}

async fn fetch_line(conn: &mut SqliteConnection, user_id: i64, product_id: i64) -> DbResult<CartLine> {
    let line = sqlx::query_as::<_, CartLine>(&format!(
        "{} WHERE c.user_id = ?1 AND c.product_id = ?2",
        LINE_SELECT
    ))
    .bind(user_id)
    .bind(product_id)
    .fetch_one(&mut *conn)
    .await?;

    Ok(line)
}

// =============================================================================
// Unit Tests
// =============================================================================
