//! # Product Repository
//!
//! Catalog operations for products.
//!
//! ## Stock Ownership
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Column            Written by                                          │
//! │  ───────────────   ────────────────────────────────────────────────    │
//! │  name, description ProductRepository::insert / update                  │
//! │  image_url         ProductRepository::insert / update                  │
//! │  category_id       ProductRepository::insert / update                  │
//! │  stock             InventoryService only (starts at 0 on insert)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Keeping `stock` out of every statement here is what makes "stock only
//! changes through a committed inventory transaction" hold.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use stockroom_core::{Product, ProductRequest};

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
///
/// let product = repo.insert(&request).await?;   // stock = 0
/// let product = repo.get_by_id(product.id).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists all products, newest first.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, description, image_url, category_id, stock,
                   created_at, updated_at
            FROM products
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Lists the products of one category, newest first.
    pub async fn list_by_category(&self, category_id: i64) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, description, image_url, category_id, stock,
                   created_at, updated_at
            FROM products
            WHERE category_id = ?1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(category_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Gets a product by ID.
    ///
    /// ## Returns
    /// * `Ok(Some(product))` - Product found, with its last committed stock
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, description, image_url, category_id, stock,
                   created_at, updated_at
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Inserts a new product with zero stock.
    ///
    /// ## Errors
    /// * `DbError::ForeignKeyViolation` - `category_id` does not exist
    pub async fn insert(&self, input: &ProductRequest) -> DbResult<Product> {
        debug!(name = %input.name, category_id = input.category_id, "Inserting product");

        let now = Utc::now();
        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (
                name, description, image_url, category_id, stock,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, 0, ?5, ?5)
            RETURNING id, name, description, image_url, category_id, stock,
                      created_at, updated_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(&input.image_url)
        .bind(input.category_id)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(product)
    }

    /// Updates catalog fields. Stock is left untouched.
    ///
    /// ## Errors
    /// * `DbError::NotFound` - No product with this id
    /// * `DbError::ForeignKeyViolation` - `category_id` does not exist
    pub async fn update(&self, id: i64, input: &ProductRequest) -> DbResult<Product> {
        debug!(id, name = %input.name, "Updating product");

        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET name = ?2, description = ?3, image_url = ?4, category_id = ?5,
                updated_at = ?6
            WHERE id = ?1
            RETURNING id, name, description, image_url, category_id, stock,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(&input.image_url)
        .bind(input.category_id)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        product.ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Deletes a product.
    ///
    /// ## Errors
    /// * `DbError::NotFound` - No product with this id
    /// * `DbError::ForeignKeyViolation` - The product has transaction history
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts total products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
