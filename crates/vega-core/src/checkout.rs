//! # Checkout
//!
//! The validation half of the sale-commit protocol.
//!
//! A [`TicketDraft`] is built from the cart by [`TicketDraft::from_cart`],
//! which runs every pure check (non-empty cart, sufficient payment) before
//! any storage is touched. The persistence half lives in the database layer,
//! which turns a draft into a committed [`Ticket`](crate::types::Ticket)
//! inside a single transaction.
//!
//! ## Commit Phases
//! ```text
//!   Idle ──► Validating ──► Persisting ──► Committed
//!                │               │
//!                └───────────────┴──────► RolledBack
//! ```
//! On RolledBack the cart is left exactly as it was, so the cashier can fix
//! the problem (take payment, drop a line) and retry.

use serde::{Deserialize, Serialize};

use crate::cart::Cart;
use crate::error::{CoreError, CoreResult};
use crate::types::TicketLine;

// =============================================================================
// Commit Phase
// =============================================================================

/// Observable state of a commit attempt, reported to the event sink so the
/// surface can show progress and disable the pay button while in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitPhase {
    /// No commit in flight.
    Idle,
    /// Pure checks against the cart are running.
    Validating,
    /// The storage transaction is executing.
    Persisting,
    /// The ticket is durable and the cart has been cleared.
    Committed,
    /// Validation or persistence failed; the cart is untouched.
    RolledBack,
}

impl CommitPhase {
    /// Whether a new commit may be started from this phase.
    pub const fn can_start(&self) -> bool {
        !matches!(self, CommitPhase::Validating | CommitPhase::Persisting)
    }
}

// =============================================================================
// Ticket Draft
// =============================================================================

/// A validated, not-yet-persisted ticket.
///
/// Holds everything the storage transaction needs: frozen line snapshots and
/// the settled amounts. Constructing one proves the pure checks passed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketDraft {
    pub lines: Vec<TicketLine>,
    pub total_cents: i64,
    pub discount_cents: i64,
    pub payment_cents: i64,
    pub change_cents: i64,
    pub customer: String,
    pub cashier_id: String,
}

impl TicketDraft {
    /// Validates the cart and freezes it into a draft.
    ///
    /// Fails with [`CoreError::EmptyCart`] on an empty cart and
    /// [`CoreError::InsufficientPayment`] when the tendered amount does not
    /// cover the raw (signed) total. The cart is not consumed so a failed
    /// commit leaves it available for correction.
    pub fn from_cart(cart: &Cart, cashier_id: &str) -> CoreResult<Self> {
        if cart.is_empty() {
            return Err(CoreError::EmptyCart);
        }

        let total = cart.total_cents();
        let payment = cart.payment_cents();
        if payment < total {
            return Err(CoreError::InsufficientPayment {
                required_cents: total,
                offered_cents: payment,
            });
        }

        let lines = cart
            .lines()
            .iter()
            .map(|line| TicketLine {
                product_id: line.product_id.clone(),
                name: line.name.clone(),
                unit_price_cents: line.unit_price_cents,
                quantity: line.quantity,
                line_total_cents: line.line_total_cents(),
            })
            .collect();

        Ok(TicketDraft {
            lines,
            total_cents: total,
            discount_cents: cart.discount_cents(),
            payment_cents: payment,
            change_cents: payment - total,
            customer: cart.customer().to_string(),
            cashier_id: cashier_id.to_string(),
        })
    }
}

/// Formats a counter value as a business ticket number, e.g. `TKT000042`.
pub fn format_ticket_number(counter: i64) -> String {
    format!("TKT{counter:06}")
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Product;
    use chrono::Utc;

    fn product(id: &str, price_cents: i64, stock: i64) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {id}"),
            barcode: None,
            price_cents,
            cost_cents: None,
            stock,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty_cart_rejected() {
        let cart = Cart::new();
        assert!(matches!(
            TicketDraft::from_cart(&cart, "cashier-1"),
            Err(CoreError::EmptyCart)
        ));
    }

    #[test]
    fn test_insufficient_payment_rejected() {
        let mut cart = Cart::new();
        cart.add_item(&product("p1", 250, 10), 2).unwrap();
        cart.set_payment(400).unwrap();

        let err = TicketDraft::from_cart(&cart, "cashier-1").unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientPayment {
                required_cents: 500,
                offered_cents: 400,
            }
        ));
        // Cart still intact for correction.
        assert_eq!(cart.line_count(), 1);
    }

    #[test]
    fn test_draft_freezes_lines_and_change() {
        let mut cart = Cart::new();
        cart.add_item(&product("p1", 250, 10), 2).unwrap();
        cart.add_item(&product("p2", 150, 10), 1).unwrap();
        cart.set_discount(50).unwrap();
        cart.set_payment(1000).unwrap();

        let draft = TicketDraft::from_cart(&cart, "cashier-1").unwrap();
        assert_eq!(draft.lines.len(), 2);
        assert_eq!(draft.lines[0].line_total_cents, 500);
        assert_eq!(draft.total_cents, 600);
        assert_eq!(draft.discount_cents, 50);
        assert_eq!(draft.change_cents, 400);
        assert_eq!(draft.cashier_id, "cashier-1");
    }

    #[test]
    fn test_exact_payment_accepted() {
        let mut cart = Cart::new();
        cart.add_item(&product("p1", 250, 10), 2).unwrap();
        cart.set_payment(500).unwrap();

        let draft = TicketDraft::from_cart(&cart, "cashier-1").unwrap();
        assert_eq!(draft.change_cents, 0);
    }

    #[test]
    fn test_commit_phase_gating() {
        assert!(CommitPhase::Idle.can_start());
        assert!(CommitPhase::Committed.can_start());
        assert!(CommitPhase::RolledBack.can_start());
        assert!(!CommitPhase::Validating.can_start());
        assert!(!CommitPhase::Persisting.can_start());
    }

    #[test]
    fn test_ticket_number_format() {
        assert_eq!(format_ticket_number(42), "TKT000042");
        assert_eq!(format_ticket_number(1_234_567), "TKT1234567");
    }
}
