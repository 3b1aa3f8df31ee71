//! # Cart Engine
//!
//! In-memory mutable sale-in-progress. Single-writer: all mutations arrive
//! through the session loop, so the cart itself needs no interior locking.
//!
//! ## Invariants
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  • Every line has quantity >= 1 (quantity 0 removes the line)           │
//! │  • quantity never exceeds the stock snapshot taken at add/merge time    │
//! │  • At most one line per product (re-adds merge)                         │
//! │  • A rejected mutation leaves the cart exactly as it was                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Totals are plain sums over the lines; there is no cached total to drift
//! out of sync.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::Product;
use crate::validation::validate_amount;
use crate::{MAX_CART_LINES, MAX_LINE_QUANTITY, WALK_IN_CUSTOMER};

// =============================================================================
// Cart Line
// =============================================================================

/// One product entry in the cart.
///
/// `unit_price_cents` and `name` are snapshots from the product at add time;
/// `stock_at_add` is the stock level the quantity bound is checked against.
/// The snapshot is refreshed whenever a merge sees the product again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: String,
    pub name: String,
    pub unit_price_cents: i64,
    pub quantity: i64,
    pub stock_at_add: i64,
}

impl CartLine {
    /// Line total in cents (unit price × quantity).
    #[inline]
    pub fn line_total_cents(&self) -> i64 {
        self.unit_price_cents * self.quantity
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The sale in progress. Created empty, mutated by scan/UI operations,
/// drained by a successful commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
    discount_cents: i64,
    payment_cents: i64,
    customer: String,
}

impl Default for Cart {
    fn default() -> Self {
        Self::new()
    }
}

impl Cart {
    /// Creates an empty cart for the walk-in customer.
    pub fn new() -> Self {
        Cart {
            lines: Vec::new(),
            discount_cents: 0,
            payment_cents: 0,
            customer: WALK_IN_CUSTOMER.to_string(),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn discount_cents(&self) -> i64 {
        self.discount_cents
    }

    pub fn payment_cents(&self) -> i64 {
        self.payment_cents
    }

    pub fn customer(&self) -> &str {
        &self.customer
    }

    /// Sum of line totals, before discount.
    pub fn subtotal_cents(&self) -> i64 {
        self.lines.iter().map(CartLine::line_total_cents).sum()
    }

    /// Subtotal minus discount. Can be negative transiently if a line is
    /// removed after a discount was set; commit validation rejects that.
    pub fn total_cents(&self) -> i64 {
        self.subtotal_cents() - self.discount_cents
    }

    /// Total floored at zero, for display.
    pub fn display_total_cents(&self) -> i64 {
        self.total_cents().max(0)
    }

    /// Change due at the current payment, floored at zero.
    pub fn change_cents(&self) -> i64 {
        (self.payment_cents - self.total_cents()).max(0)
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Adds `quantity` units of `product`, merging into an existing line for
    /// the same product if present.
    ///
    /// The merged quantity is bounded by the product's current stock: the
    /// stock snapshot on the line is refreshed from `product` on every merge,
    /// so a restocked product immediately allows a larger quantity.
    pub fn add_item(&mut self, product: &Product, quantity: i64) -> CoreResult<()> {
        if quantity <= 0 || quantity > MAX_LINE_QUANTITY {
            return Err(CoreError::InvalidQuantity {
                requested: quantity,
            });
        }
        if product.stock <= 0 {
            return Err(CoreError::OutOfStock {
                name: product.name.clone(),
                available: 0,
                requested: quantity,
            });
        }

        if let Some(index) = self.find_line(&product.id) {
            let merged = self.lines[index].quantity + quantity;
            if merged > product.stock {
                return Err(CoreError::OutOfStock {
                    name: product.name.clone(),
                    available: product.stock,
                    requested: merged,
                });
            }
            let line = &mut self.lines[index];
            line.quantity = merged;
            line.stock_at_add = product.stock;
            return Ok(());
        }

        if quantity > product.stock {
            return Err(CoreError::OutOfStock {
                name: product.name.clone(),
                available: product.stock,
                requested: quantity,
            });
        }
        if self.lines.len() >= MAX_CART_LINES {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_LINES,
            });
        }

        self.lines.push(CartLine {
            product_id: product.id.clone(),
            name: product.name.clone(),
            unit_price_cents: product.price_cents,
            quantity,
            stock_at_add: product.stock,
        });
        Ok(())
    }

    /// Sets the quantity of the line at `index`.
    ///
    /// Zero (or negative) removes the line. A quantity above the line's
    /// stock snapshot is rejected and the prior quantity is retained.
    pub fn set_quantity(&mut self, index: usize, quantity: i64) -> CoreResult<()> {
        let Some(line) = self.lines.get_mut(index) else {
            return Ok(());
        };

        if quantity <= 0 {
            self.lines.remove(index);
            return Ok(());
        }
        if quantity > MAX_LINE_QUANTITY {
            return Err(CoreError::InvalidQuantity {
                requested: quantity,
            });
        }
        if quantity > line.stock_at_add {
            return Err(CoreError::OutOfStock {
                name: line.name.clone(),
                available: line.stock_at_add,
                requested: quantity,
            });
        }

        line.quantity = quantity;
        Ok(())
    }

    /// Removes the line at `index`. Out-of-range is a no-op.
    pub fn remove_line(&mut self, index: usize) {
        if index < self.lines.len() {
            self.lines.remove(index);
        }
    }

    /// Empties the cart and resets discount, payment, and customer.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.discount_cents = 0;
        self.payment_cents = 0;
        self.customer = WALK_IN_CUSTOMER.to_string();
    }

    /// Sets the whole-sale discount. Rejected if negative or above the
    /// current subtotal.
    pub fn set_discount(&mut self, discount_cents: i64) -> CoreResult<()> {
        let discount_cents = validate_amount("discount", discount_cents)?;
        let subtotal = self.subtotal_cents();
        if discount_cents > subtotal {
            return Err(CoreError::InvalidAmount {
                field: "discount",
                reason: format!("exceeds the subtotal of {} cents", subtotal),
            });
        }
        self.discount_cents = discount_cents;
        Ok(())
    }

    /// Records the amount tendered by the customer.
    pub fn set_payment(&mut self, payment_cents: i64) -> CoreResult<()> {
        self.payment_cents = validate_amount("payment", payment_cents)?;
        Ok(())
    }

    /// Sets the customer reference (empty resets to walk-in).
    pub fn set_customer(&mut self, customer: &str) {
        let trimmed = customer.trim();
        self.customer = if trimmed.is_empty() {
            WALK_IN_CUSTOMER.to_string()
        } else {
            trimmed.to_string()
        };
    }

    fn find_line(&self, product_id: &str) -> Option<usize> {
        self.lines.iter().position(|l| l.product_id == product_id)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn product(id: &str, name: &str, price_cents: i64, stock: i64) -> Product {
        Product {
            id: id.to_string(),
            name: name.to_string(),
            barcode: Some(format!("890{id}")),
            price_cents,
            cost_cents: None,
            stock,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_add_item_creates_line() {
        let mut cart = Cart::new();
        cart.add_item(&product("p1", "Cola", 250, 10), 2).unwrap();

        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.lines()[0].quantity, 2);
        assert_eq!(cart.subtotal_cents(), 500);
    }

    #[test]
    fn test_add_item_merges_same_product() {
        let mut cart = Cart::new();
        let cola = product("p1", "Cola", 250, 10);
        cart.add_item(&cola, 2).unwrap();
        cart.add_item(&cola, 3).unwrap();

        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.lines()[0].quantity, 5);
    }

    #[test]
    fn test_add_item_rejects_zero_stock() {
        let mut cart = Cart::new();
        let err = cart.add_item(&product("p1", "Cola", 250, 0), 1).unwrap_err();

        assert!(matches!(err, CoreError::OutOfStock { available: 0, .. }));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_merge_bounded_by_stock() {
        let mut cart = Cart::new();
        let cola = product("p1", "Cola", 250, 5);
        cart.add_item(&cola, 3).unwrap();

        let err = cart.add_item(&cola, 3).unwrap_err();
        assert!(matches!(
            err,
            CoreError::OutOfStock {
                available: 5,
                requested: 6,
                ..
            }
        ));
        // Rejected merge leaves the existing line untouched.
        assert_eq!(cart.lines()[0].quantity, 3);
    }

    #[test]
    fn test_merge_refreshes_stock_snapshot() {
        let mut cart = Cart::new();
        cart.add_item(&product("p1", "Cola", 250, 2), 2).unwrap();

        // Restocked since the first add: the merge sees the new level.
        cart.add_item(&product("p1", "Cola", 250, 10), 3).unwrap();
        assert_eq!(cart.lines()[0].quantity, 5);
        assert_eq!(cart.lines()[0].stock_at_add, 10);
    }

    #[test]
    fn test_add_item_rejects_invalid_quantity() {
        let mut cart = Cart::new();
        let cola = product("p1", "Cola", 250, 10);

        assert!(matches!(
            cart.add_item(&cola, 0),
            Err(CoreError::InvalidQuantity { requested: 0 })
        ));
        assert!(matches!(
            cart.add_item(&cola, MAX_LINE_QUANTITY + 1),
            Err(CoreError::InvalidQuantity { .. })
        ));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_cart_line_limit() {
        let mut cart = Cart::new();
        for i in 0..MAX_CART_LINES {
            let p = product(&format!("p{i}"), &format!("Item {i}"), 100, 5);
            cart.add_item(&p, 1).unwrap();
        }

        let extra = product("overflow", "Overflow", 100, 5);
        assert!(matches!(
            cart.add_item(&extra, 1),
            Err(CoreError::CartTooLarge { .. })
        ));
        assert_eq!(cart.line_count(), MAX_CART_LINES);
    }

    #[test]
    fn test_set_quantity_zero_removes_line() {
        let mut cart = Cart::new();
        cart.add_item(&product("p1", "Cola", 250, 10), 2).unwrap();
        cart.set_quantity(0, 0).unwrap();

        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_above_snapshot_retains_prior() {
        let mut cart = Cart::new();
        cart.add_item(&product("p1", "Cola", 250, 5), 2).unwrap();

        let err = cart.set_quantity(0, 6).unwrap_err();
        assert!(matches!(
            err,
            CoreError::OutOfStock {
                available: 5,
                requested: 6,
                ..
            }
        ));
        assert_eq!(cart.lines()[0].quantity, 2);
    }

    #[test]
    fn test_set_quantity_out_of_range_is_noop() {
        let mut cart = Cart::new();
        cart.add_item(&product("p1", "Cola", 250, 10), 2).unwrap();
        cart.set_quantity(7, 4).unwrap();

        assert_eq!(cart.lines()[0].quantity, 2);
    }

    #[test]
    fn test_remove_line() {
        let mut cart = Cart::new();
        cart.add_item(&product("p1", "Cola", 250, 10), 1).unwrap();
        cart.add_item(&product("p2", "Chips", 150, 10), 1).unwrap();

        cart.remove_line(0);
        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.lines()[0].product_id, "p2");

        // Out of range: no-op.
        cart.remove_line(9);
        assert_eq!(cart.line_count(), 1);
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut cart = Cart::new();
        cart.add_item(&product("p1", "Cola", 250, 10), 2).unwrap();
        cart.set_discount(100).unwrap();
        cart.set_payment(1000).unwrap();
        cart.set_customer("Alice");

        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.discount_cents(), 0);
        assert_eq!(cart.payment_cents(), 0);
        assert_eq!(cart.customer(), WALK_IN_CUSTOMER);
    }

    #[test]
    fn test_discount_bounds() {
        use crate::error::ValidationError;

        let mut cart = Cart::new();
        cart.add_item(&product("p1", "Cola", 250, 10), 2).unwrap();

        assert!(matches!(
            cart.set_discount(-1),
            Err(CoreError::Validation(ValidationError::Negative { .. }))
        ));
        assert!(cart.set_discount(501).is_err());
        assert_eq!(cart.discount_cents(), 0);

        cart.set_discount(500).unwrap();
        assert_eq!(cart.total_cents(), 0);
    }

    #[test]
    fn test_total_can_go_negative_but_display_floors() {
        let mut cart = Cart::new();
        cart.add_item(&product("p1", "Cola", 250, 10), 2).unwrap();
        cart.add_item(&product("p2", "Chips", 150, 10), 1).unwrap();
        cart.set_discount(600).unwrap();

        // Removing a line after the discount was set pushes the raw total
        // below zero; display stays floored.
        cart.remove_line(0);
        assert_eq!(cart.total_cents(), -450);
        assert_eq!(cart.display_total_cents(), 0);
    }

    #[test]
    fn test_payment_and_change() {
        let mut cart = Cart::new();
        cart.add_item(&product("p1", "Cola", 250, 10), 2).unwrap();

        assert!(cart.set_payment(-5).is_err());
        cart.set_payment(1000).unwrap();
        assert_eq!(cart.change_cents(), 500);
    }
}
