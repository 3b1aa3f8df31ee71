//! # Error Types
//!
//! Domain-specific error types for vega-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  vega-core errors (this file)                                           │
//! │  ├── CoreError        - Cart / checkout rule violations                 │
//! │  └── ValidationError  - Input validation failures                       │
//! │                                                                         │
//! │  vega-db errors (separate crate)                                        │
//! │  └── DbError          - Database operation failures                     │
//! │                                                                         │
//! │  vega-scan errors (separate crate)                                      │
//! │  └── CaptureError     - Camera device failures                          │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → SessionError → operator message    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product name, available units)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a specific, actionable operator message

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations during cart mutation or
/// commit validation. Every rejected operation leaves state unchanged.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Requested quantity exceeds the product's stock.
    ///
    /// ## When This Occurs
    /// - Adding a product whose stock is already exhausted
    /// - Merging into an existing line past the stock bound
    /// - Editing a line quantity above the stock known at add time
    ///
    /// The operator message names the shortfall ("only N units available").
    #[error("Only {available} units available for '{name}' (requested {requested})")]
    OutOfStock {
        name: String,
        available: i64,
        requested: i64,
    },

    /// Quantity is zero, negative, or above the per-line maximum.
    #[error("Invalid quantity: {requested}")]
    InvalidQuantity { requested: i64 },

    /// Discount or payment amount is not acceptable.
    #[error("Invalid {field}: {reason}")]
    InvalidAmount { field: &'static str, reason: String },

    /// Cart has exceeded maximum allowed lines.
    #[error("Cart cannot have more than {max} lines")]
    CartTooLarge { max: usize },

    /// Commit was requested on an empty cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// Payment does not cover the discounted total.
    ///
    /// The check uses the raw signed total so a discount mis-entry is
    /// visible instead of silently floored to zero.
    #[error("Insufficient payment: {offered_cents} offered, {required_cents} required")]
    InsufficientPayment {
        required_cents: i64,
        offered_cents: i64,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when operator input doesn't meet basic requirements, before
/// business rules run.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Invalid format (e.g., unparseable amount).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
