//! # Product Repository
//!
//! Catalog queries and the admin product CRUD.
//!
//! ## Key Operations
//! - Filtered, sorted, paginated listing
//! - Product page with related products
//! - Home page sections and search suggestions
//! - Admin create / update / soft delete
//!
//! ## Listing Query
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CatalogQuery { filters, sort, page }                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  WHERE is_active = 1                                                   │
//! │    AND (name_lc LIKE '%lip%' OR brand_lc LIKE ... )          search    │
//! │    AND category_lc LIKE '%skincare%'                         category  │
//! │    AND type_lc LIKE '%serum%'                                type      │
//! │    AND price_cents <= 2500                                   maxPrice  │
//! │    AND is_deal = 1                                           dealsOnly │
//! │       │                                                                 │
//! │       ├──► SELECT COUNT(*)                       → totalCount          │
//! │       └──► SELECT ... ORDER BY <sort>, id DESC                         │
//! │                     LIMIT pageSize OFFSET (page-1)*pageSize → items    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Filter text is matched literally: `%`, `_` and `\` are escaped before
//! they reach LIKE. The `*_lc` columns hold [`fold_case`] copies of the
//! text, written on every insert and update. The trailing `id DESC` keeps pages stable when sort
//! keys tie.

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use gebeya_core::catalog::{
    fold_case, CatalogQuery, HomePage, HomeSection, Page, ProductDetails, ProductFilters,
    SortKey, SUGGESTION_LIMIT,
};
use gebeya_core::validation::validate_product_input;
use gebeya_core::{CoreError, Product, ProductInput, RELATED_PRODUCTS_LIMIT};

const PRODUCT_COLUMNS: &str = "id, name, brand, category, product_type, image_url, \
     price_cents, original_price_cents, discount_percentage, is_deal, stars, num_reviews, \
     is_active, created_at, updated_at";

/// Repository for catalog reads and admin product writes.
///
/// ## Usage
/// ```rust,ignore
/// let page = db.products().query(&query).await?;
/// let details = db.products().details(42).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    // =========================================================================
    // Catalog Reads
    // =========================================================================

    /// Runs a validated catalog query.
    ///
    /// A page past the end returns no items with the real `totalCount`.
    pub async fn query(&self, query: &CatalogQuery) -> DbResult<Page<Product>> {
        debug!(
            search = ?query.filters.search,
            category = ?query.filters.category,
            sort = query.sort.as_str(),
            page = query.page.page(),
            "Querying products"
        );

        let mut count_query = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM products");
        push_filters(&mut count_query, &query.filters);
        let total_count: i64 = count_query
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let items = self.fetch_items(query).await?;

        Ok(Page::new(items, total_count, query.page))
    }

    /// The items of one page, without the count.
    async fn fetch_items(&self, query: &CatalogQuery) -> DbResult<Vec<Product>> {
        let mut builder = QueryBuilder::<Sqlite>::new(format!("SELECT {} FROM products", PRODUCT_COLUMNS));
        push_filters(&mut builder, &query.filters);
        builder.push(" ORDER BY ");
        builder.push(order_by(query.sort));
        builder.push(" LIMIT ");
        builder.push_bind(query.page.page_size());
        builder.push(" OFFSET ");
        builder.push_bind(query.page.offset());

        let items = builder
            .build_query_as::<Product>()
            .fetch_all(&self.pool)
            .await?;

        Ok(items)
    }

    /// Fills the five home page sections.
    pub async fn home_page(&self) -> DbResult<HomePage> {
        let mut home = HomePage::default();
        for section in HomeSection::ALL {
            let products = self.fetch_items(&section.query()).await?;
            home.set(section, products);
        }
        Ok(home)
    }

    /// Gets an active product by id.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {} FROM products WHERE id = ?1 AND is_active = 1",
            PRODUCT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// The product page: the product and up to [`RELATED_PRODUCTS_LIMIT`]
    /// popular products of the same category.
    ///
    /// ## Returns
    /// * `Err(CoreError::ProductNotFound)` - unknown or deleted product
    pub async fn details(&self, id: i64) -> DbResult<ProductDetails> {
        let product = self
            .get_by_id(id)
            .await?
            .ok_or(CoreError::ProductNotFound(id))?;

        let related = sqlx::query_as::<_, Product>(&format!(
            r#"
            SELECT {} FROM products
            WHERE is_active = 1 AND category = ?1 AND id != ?2
            ORDER BY {}
            LIMIT ?3
            "#,
            PRODUCT_COLUMNS,
            order_by(SortKey::Popular)
        ))
        .bind(&product.category)
        .bind(product.id)
        .bind(RELATED_PRODUCTS_LIMIT)
        .fetch_all(&self.pool)
        .await?;

        Ok(ProductDetails { product, related })
    }

    /// Product names matching `term` the way the `search` filter does,
    /// most popular first. Blank terms suggest nothing.
    pub async fn suggestions(&self, term: &str) -> DbResult<Vec<String>> {
        let filters = ProductFilters::search(term);
        if filters.search.is_none() {
            return Ok(Vec::new());
        }

        let mut builder = QueryBuilder::<Sqlite>::new("SELECT name FROM products");
        push_filters(&mut builder, &filters);
        builder.push(" ORDER BY ");
        builder.push(order_by(SortKey::Popular));
        builder.push(" LIMIT ");
        builder.push_bind(SUGGESTION_LIMIT);

        let names = builder
            .build_query_scalar::<String>()
            .fetch_all(&self.pool)
            .await?;

        Ok(names)
    }

    /// Counts active products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    // =========================================================================
    // Admin Reads
    // =========================================================================

    /// Every product, soft-deleted ones included, newest first.
    pub async fn list_all(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {} FROM products ORDER BY id DESC",
            PRODUCT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    // =========================================================================
    // Admin Writes
    // =========================================================================

    /// Validates and inserts a product.
    ///
    /// Deal prices are derived from `originalPriceCents` and
    /// `discountPercentage`; any submitted `priceCents` is ignored for deals.
    pub async fn insert(&self, input: &ProductInput) -> DbResult<Product> {
        validate_product_input(input)?;
        let input = input.clone().normalized();
        let now = Utc::now();

        debug!(name = %input.name, price_cents = input.price_cents, "Inserting product");

        let result = sqlx::query(
            r#"
            INSERT INTO products (
                name, brand, category, product_type, image_url,
                price_cents, original_price_cents, discount_percentage, is_deal,
                stars, num_reviews, is_active, created_at, updated_at,
                name_lc, brand_lc, category_lc, type_lc
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5,
                ?6, ?7, ?8, ?9,
                ?10, ?11, 1, ?12, ?12,
                ?13, ?14, ?15, ?16
            )
            "#,
        )
        .bind(&input.name)
        .bind(&input.brand)
        .bind(&input.category)
        .bind(&input.product_type)
        .bind(&input.image_url)
        .bind(input.price_cents)
        .bind(input.original_price_cents)
        .bind(input.discount_percentage)
        .bind(input.is_deal)
        .bind(input.stars)
        .bind(input.num_reviews)
        .bind(now)
        .bind(fold_case(&input.name))
        .bind(fold_case(&input.brand))
        .bind(fold_case(&input.category))
        .bind(fold_case(&input.product_type))
        .execute(&self.pool)
        .await?;

        Ok(Product {
            id: result.last_insert_rowid(),
            name: input.name,
            brand: input.brand,
            category: input.category,
            product_type: input.product_type,
            image_url: input.image_url,
            price_cents: input.price_cents,
            original_price_cents: input.original_price_cents,
            discount_percentage: input.discount_percentage,
            is_deal: input.is_deal,
            stars: input.stars,
            num_reviews: input.num_reviews,
            is_active: true,
            created_at: now,
            updated_at: now,
        })
    }

    /// Replaces every editable field of an active product.
    ///
    /// Placed orders keep the name and price they snapshotted; carts see
    /// the new price on their next read.
    pub async fn update(&self, id: i64, input: &ProductInput) -> DbResult<Product> {
        validate_product_input(input)?;
        let input = input.clone().normalized();

        debug!(id, price_cents = input.price_cents, "Updating product");

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                brand = ?3,
                category = ?4,
                product_type = ?5,
                image_url = ?6,
                price_cents = ?7,
                original_price_cents = ?8,
                discount_percentage = ?9,
                is_deal = ?10,
                stars = ?11,
                num_reviews = ?12,
                updated_at = ?13,
                name_lc = ?14,
                brand_lc = ?15,
                category_lc = ?16,
                type_lc = ?17
            WHERE id = ?1 AND is_active = 1
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.brand)
        .bind(&input.category)
        .bind(&input.product_type)
        .bind(&input.image_url)
        .bind(input.price_cents)
        .bind(input.original_price_cents)
        .bind(input.discount_percentage)
        .bind(input.is_deal)
        .bind(input.stars)
        .bind(input.num_reviews)
        .bind(Utc::now())
        .bind(fold_case(&input.name))
        .bind(fold_case(&input.brand))
        .bind(fold_case(&input.category))
        .bind(fold_case(&input.product_type))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::ProductNotFound(id).into());
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Soft-deletes a product by setting is_active = false.
    ///
    /// Order items keep referencing it. Cart lines holding it stay until
    /// the shopper removes them or checks out.
    pub async fn soft_delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Soft-deleting product");

        let result = sqlx::query(
            r#"
            UPDATE products
            SET is_active = 0, updated_at = ?2
            WHERE id = ?1 AND is_active = 1
            "#,
        )
        .bind(id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::ProductNotFound(id).into());
        }

        Ok(())
    }
}

// =============================================================================
// SQL Helpers
// =============================================================================

/// Appends the WHERE clause for `filters`. Text filters are already
/// lowercased by [`ProductFilters`].
fn push_filters(builder: &mut QueryBuilder<'_, Sqlite>, filters: &ProductFilters) {
    builder.push(" WHERE is_active = 1");

    if let Some(term) = &filters.search {
        let pattern = like_pattern(term);
        builder.push(" AND (");
        for (i, column) in ["name_lc", "brand_lc", "category_lc", "type_lc"].iter().enumerate() {
            if i > 0 {
                builder.push(" OR ");
            }
            builder.push(format!("{} LIKE ", column));
            builder.push_bind(pattern.clone());
            builder.push(r" ESCAPE '\'");
        }
        builder.push(")");
    }

    if let Some(category) = &filters.category {
        builder.push(" AND category_lc LIKE ");
        builder.push_bind(like_pattern(category));
        builder.push(r" ESCAPE '\'");
    }

    if let Some(product_type) = &filters.product_type {
        builder.push(" AND type_lc LIKE ");
        builder.push_bind(like_pattern(product_type));
        builder.push(r" ESCAPE '\'");
    }

    if let Some(max_price) = filters.max_price_cents {
        builder.push(" AND price_cents <= ");
        builder.push_bind(max_price);
    }

    if filters.deals_only {
        builder.push(" AND is_deal = 1");
    }
}

fn order_by(sort: SortKey) -> &'static str {
    match sort {
        SortKey::Newest => "id DESC",
        SortKey::Popular => "stars DESC, num_reviews DESC, id DESC",
        SortKey::PriceLow => "price_cents ASC, id DESC",
        SortKey::PriceHigh => "price_cents DESC, id DESC",
    }
}

/// `%term%` with LIKE metacharacters escaped.
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

// =============================================================================
// Unit Tests
// =============================================================================
