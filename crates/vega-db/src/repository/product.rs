//! # Product Repository
//!
//! Catalog lookups for the scan router plus stock maintenance.
//!
//! ## Lookup Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ScanEvent ──► find_by_barcode(payload)                                 │
//! │                     │                                                   │
//! │        ┌────────────┴────────────┐                                      │
//! │        ▼                         ▼                                      │
//! │  Some(product)             None                                         │
//! │  (exact match on           (router records the payload in the          │
//! │   active products)          unknown_barcodes log)                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The conditional stock decrement used by the commit transaction also lives
//! here, because it is the only stock writer in the system.

use chrono::Utc;
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use vega_core::Product;

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Looks up an active product by exact barcode match.
    ///
    /// This is the hot path of the scan router: every accepted scan lands
    /// here. The barcode column carries a unique index, so the lookup is a
    /// point read.
    pub async fn find_by_barcode(&self, barcode: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, barcode, price_cents, cost_cents, stock,
                   is_active, created_at, updated_at
            FROM products
            WHERE barcode = ?1 AND is_active = 1
            "#,
        )
        .bind(barcode)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a product by ID.
    pub async fn find_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, barcode, price_cents, cost_cents, stock,
                   is_active, created_at, updated_at
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Lists active products for the product panel, ordered by name.
    pub async fn list_active(&self, limit: i64) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, barcode, price_cents, cost_cents, stock,
                   is_active, created_at, updated_at
            FROM products
            WHERE is_active = 1
            ORDER BY name
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Counts all products (active and inactive).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Inserts a new product and returns it.
    pub async fn insert(
        &self,
        name: &str,
        barcode: Option<&str>,
        price_cents: i64,
        cost_cents: Option<i64>,
        stock: i64,
    ) -> DbResult<Product> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        debug!(id = %id, name = %name, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, barcode, price_cents, cost_cents, stock,
                is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1, ?7, ?7)
            "#,
        )
        .bind(&id)
        .bind(name)
        .bind(barcode)
        .bind(price_cents)
        .bind(cost_cents)
        .bind(stock)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(Product {
            id,
            name: name.to_string(),
            barcode: barcode.map(str::to_string),
            price_cents,
            cost_cents,
            stock,
            is_active: true,
            created_at: now,
            updated_at: now,
        })
    }

    /// Restocks a product by `delta` units.
    pub async fn adjust_stock(&self, id: &str, delta: i64) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products
            SET stock = stock + ?2, updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(delta)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Conditionally decrements stock inside a commit transaction.
    ///
    /// The `stock >= ?` guard makes the decrement atomic with its own
    /// precondition: if the units were sold by a concurrent commit since the
    /// cart was validated, zero rows match and the caller rolls the whole
    /// transaction back.
    pub(crate) async fn decrement_stock_tx(
        tx: &mut Transaction<'_, Sqlite>,
        product_id: &str,
        quantity: i64,
    ) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products
            SET stock = stock - ?2, updated_at = ?3
            WHERE id = ?1 AND stock >= ?2
            "#,
        )
        .bind(product_id)
        .bind(quantity)
        .bind(now)
        .execute(&mut **tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::InsufficientStock {
                product_id: product_id.to_string(),
                requested: quantity,
            });
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_find_by_barcode() {
        let db = test_db().await;
        let repo = db.products();

        repo.insert("Cola 330ml", Some("8901234567890"), 250, Some(180), 24)
            .await
            .unwrap();

        let found = repo.find_by_barcode("8901234567890").await.unwrap();
        assert_eq!(found.unwrap().name, "Cola 330ml");

        let missing = repo.find_by_barcode("0000000000000").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_barcode_rejected() {
        let db = test_db().await;
        let repo = db.products();

        repo.insert("Cola", Some("111"), 250, None, 5).await.unwrap();
        let err = repo.insert("Other", Some("111"), 100, None, 5).await.unwrap_err();

        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_adjust_stock() {
        let db = test_db().await;
        let repo = db.products();

        let p = repo.insert("Cola", Some("111"), 250, None, 5).await.unwrap();
        repo.adjust_stock(&p.id, 10).await.unwrap();

        let found = repo.find_by_id(&p.id).await.unwrap().unwrap();
        assert_eq!(found.stock, 15);

        assert!(matches!(
            repo.adjust_stock("missing", 1).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_list_active_ordered() {
        let db = test_db().await;
        let repo = db.products();

        repo.insert("Zinger", None, 500, None, 5).await.unwrap();
        repo.insert("Apple", None, 100, None, 5).await.unwrap();

        let products = repo.list_active(10).await.unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].name, "Apple");
    }
}
