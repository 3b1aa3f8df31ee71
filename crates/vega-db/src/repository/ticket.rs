//! # Ticket Repository
//!
//! The persistence half of the sale-commit protocol, plus ticket history.
//!
//! ## Commit Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    commit(draft), one transaction                       │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    │                                                                    │
//! │    ├── 1. Allocate ticket number                                        │
//! │    │      UPDATE ticket_counter SET value = value + 1 RETURNING value   │
//! │    │      (the row lock serializes concurrent commits; a rolled-back    │
//! │    │       commit never burns a number)                                 │
//! │    │                                                                    │
//! │    ├── 2. INSERT ticket (lines frozen as a JSON column)                 │
//! │    │                                                                    │
//! │    ├── 3. Per line: conditional stock decrement                         │
//! │    │      UPDATE products SET stock = stock - ?                         │
//! │    │      WHERE id = ? AND stock >= ?                                   │
//! │    │      └── 0 rows ──► InsufficientStock ──► whole tx rolls back      │
//! │    │                                                                    │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Either the ticket exists AND every line's stock moved, or neither
//! happened. There is no partially committed sale to reconcile.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::DbResult;
use crate::repository::product::ProductRepository;
use vega_core::{format_ticket_number, Ticket, TicketDraft, TicketLine};

/// Repository for ticket database operations.
#[derive(Debug, Clone)]
pub struct TicketRepository {
    pool: SqlitePool,
}

/// Raw row shape: `lines` comes back as JSON text and is decoded separately.
#[derive(sqlx::FromRow)]
struct TicketRow {
    id: String,
    ticket_number: String,
    lines: String,
    total_cents: i64,
    discount_cents: i64,
    payment_cents: i64,
    change_cents: i64,
    customer: String,
    cashier_id: String,
    created_at: DateTime<Utc>,
}

impl TicketRow {
    fn into_ticket(self) -> DbResult<Ticket> {
        let lines: Vec<TicketLine> = serde_json::from_str(&self.lines)?;
        Ok(Ticket {
            id: self.id,
            ticket_number: self.ticket_number,
            lines,
            total_cents: self.total_cents,
            discount_cents: self.discount_cents,
            payment_cents: self.payment_cents,
            change_cents: self.change_cents,
            customer: self.customer,
            cashier_id: self.cashier_id,
            created_at: self.created_at,
        })
    }
}

impl TicketRepository {
    /// Creates a new TicketRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TicketRepository { pool }
    }

    /// Commits a validated draft: allocates the ticket number, inserts the
    /// ticket, and decrements stock for every line, all in one transaction.
    ///
    /// ## Errors
    /// [`DbError::InsufficientStock`](crate::DbError::InsufficientStock) when
    /// a line's units were sold by a concurrent commit since the cart was
    /// validated. On any error the transaction is dropped and SQLite rolls
    /// everything back, including the counter increment.
    pub async fn commit(&self, draft: &TicketDraft) -> DbResult<Ticket> {
        let mut tx = self.pool.begin().await?;

        // Counter row is seeded by the initial migration; the UPDATE holds
        // the write lock until commit, serializing number allocation.
        let counter: i64 = sqlx::query_scalar(
            "UPDATE ticket_counter SET value = value + 1 WHERE id = 1 RETURNING value",
        )
        .fetch_one(&mut *tx)
        .await?;

        let ticket_number = format_ticket_number(counter);
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let lines_json = serde_json::to_string(&draft.lines)?;

        debug!(id = %id, ticket_number = %ticket_number, "Inserting ticket");

        sqlx::query(
            r#"
            INSERT INTO tickets (
                id, ticket_number, lines,
                total_cents, discount_cents, payment_cents, change_cents,
                customer, cashier_id, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&id)
        .bind(&ticket_number)
        .bind(&lines_json)
        .bind(draft.total_cents)
        .bind(draft.discount_cents)
        .bind(draft.payment_cents)
        .bind(draft.change_cents)
        .bind(&draft.customer)
        .bind(&draft.cashier_id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        for line in &draft.lines {
            ProductRepository::decrement_stock_tx(&mut tx, &line.product_id, line.quantity)
                .await?;
        }

        tx.commit().await?;

        info!(
            ticket_number = %ticket_number,
            total_cents = draft.total_cents,
            lines = draft.lines.len(),
            "Sale committed"
        );

        Ok(Ticket {
            id,
            ticket_number,
            lines: draft.lines.clone(),
            total_cents: draft.total_cents,
            discount_cents: draft.discount_cents,
            payment_cents: draft.payment_cents,
            change_cents: draft.change_cents,
            customer: draft.customer.clone(),
            cashier_id: draft.cashier_id.clone(),
            created_at: now,
        })
    }

    /// Gets a ticket by its business number.
    pub async fn get_by_number(&self, ticket_number: &str) -> DbResult<Option<Ticket>> {
        let row = sqlx::query_as::<_, TicketRow>(
            r#"
            SELECT id, ticket_number, lines,
                   total_cents, discount_cents, payment_cents, change_cents,
                   customer, cashier_id, created_at
            FROM tickets
            WHERE ticket_number = ?1
            "#,
        )
        .bind(ticket_number)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TicketRow::into_ticket).transpose()
    }

    /// Lists the most recent tickets, newest first.
    pub async fn list_recent(&self, limit: i64) -> DbResult<Vec<Ticket>> {
        let rows = sqlx::query_as::<_, TicketRow>(
            r#"
            SELECT id, ticket_number, lines,
                   total_cents, discount_cents, payment_cents, change_cents,
                   customer, cashier_id, created_at
            FROM tickets
            ORDER BY created_at DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TicketRow::into_ticket).collect()
    }

    /// Peeks at the next ticket number without allocating it.
    ///
    /// For display only; the number actually used is allocated inside the
    /// commit transaction.
    pub async fn next_ticket_number(&self) -> DbResult<String> {
        let counter: i64 = sqlx::query_scalar("SELECT value FROM ticket_counter WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(format_ticket_number(counter + 1))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};
    use vega_core::{Cart, Product};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seeded_product(db: &Database, barcode: &str, price: i64, stock: i64) -> Product {
        db.products()
            .insert(&format!("Item {barcode}"), Some(barcode), price, None, stock)
            .await
            .unwrap()
    }

    fn paid_draft(product: &Product, qty: i64, payment: i64) -> TicketDraft {
        let mut cart = Cart::new();
        cart.add_item(product, qty).unwrap();
        cart.set_payment(payment).unwrap();
        TicketDraft::from_cart(&cart, "cashier-1").unwrap()
    }

    #[tokio::test]
    async fn test_commit_persists_ticket_and_decrements_stock() {
        let db = test_db().await;
        let product = seeded_product(&db, "111", 250, 10).await;

        let draft = paid_draft(&product, 2, 500);
        let ticket = db.tickets().commit(&draft).await.unwrap();

        assert_eq!(ticket.ticket_number, "TKT000001");
        assert_eq!(ticket.total_cents, 500);
        assert_eq!(ticket.lines.len(), 1);

        // Stock moved by exactly the sold quantity.
        let after = db.products().find_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(after.stock, 8);

        // Ticket round-trips through the JSON lines column.
        let fetched = db
            .tickets()
            .get_by_number("TKT000001")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched.lines, ticket.lines);
        assert_eq!(fetched.change_cents, 0);
    }

    #[tokio::test]
    async fn test_ticket_numbers_are_sequential() {
        let db = test_db().await;
        let product = seeded_product(&db, "111", 100, 50).await;

        assert_eq!(db.tickets().next_ticket_number().await.unwrap(), "TKT000001");

        let first = db.tickets().commit(&paid_draft(&product, 1, 100)).await.unwrap();
        let second = db.tickets().commit(&paid_draft(&product, 1, 100)).await.unwrap();

        assert_eq!(first.ticket_number, "TKT000001");
        assert_eq!(second.ticket_number, "TKT000002");
    }

    #[tokio::test]
    async fn test_insufficient_stock_rolls_back_everything() {
        let db = test_db().await;
        let product = seeded_product(&db, "111", 250, 5).await;

        // Draft was validated when stock was 5; simulate a concurrent sale
        // draining it before the commit runs.
        let draft = paid_draft(&product, 3, 750);
        db.products().adjust_stock(&product.id, -4).await.unwrap();

        let err = db.tickets().commit(&draft).await.unwrap_err();
        assert!(matches!(err, DbError::InsufficientStock { requested: 3, .. }));

        // No ticket, no stock movement, no burned counter value.
        assert!(db.tickets().get_by_number("TKT000001").await.unwrap().is_none());
        let after = db.products().find_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(after.stock, 1);
        assert_eq!(db.tickets().next_ticket_number().await.unwrap(), "TKT000001");
    }

    #[tokio::test]
    async fn test_partial_stock_failure_rolls_back_earlier_lines() {
        let db = test_db().await;
        let ok = seeded_product(&db, "111", 100, 10).await;
        let scarce = seeded_product(&db, "222", 200, 1).await;

        let mut cart = Cart::new();
        cart.add_item(&ok, 2).unwrap();
        cart.add_item(&scarce, 1).unwrap();
        cart.set_payment(1000).unwrap();
        let draft = TicketDraft::from_cart(&cart, "cashier-1").unwrap();

        db.products().adjust_stock(&scarce.id, -1).await.unwrap();

        assert!(db.tickets().commit(&draft).await.is_err());

        // The first line's decrement was undone with the rest.
        let after = db.products().find_by_id(&ok.id).await.unwrap().unwrap();
        assert_eq!(after.stock, 10);
    }

    #[tokio::test]
    async fn test_list_recent_newest_first() {
        let db = test_db().await;
        let product = seeded_product(&db, "111", 100, 50).await;

        db.tickets().commit(&paid_draft(&product, 1, 100)).await.unwrap();
        db.tickets().commit(&paid_draft(&product, 2, 200)).await.unwrap();

        let recent = db.tickets().list_recent(10).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].ticket_number, "TKT000002");
    }
}
