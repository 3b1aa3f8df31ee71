//! # vega-core: Pure Business Logic for Vega POS
//!
//! This crate is the **heart** of Vega POS. It contains all business logic
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Vega POS Data Flow                             │
//! │                                                                         │
//! │  Camera loop (vega-scan)          Wedge entry (terminal)                │
//! │        │                                │                               │
//! │        └────────── ScanEvent ───────────┘                               │
//! │                        │                                                │
//! │                        ▼                                                │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                ★ vega-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌────────────┐  │   │
//! │  │   │   types   │  │   money   │  │   cart    │  │  checkout  │  │   │
//! │  │   │  Product  │  │   Money   │  │   Cart    │  │TicketDraft │  │   │
//! │  │   │  Ticket   │  │  parsing  │  │ CartLine  │  │ validation │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CAMERA • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                        │                                                │
//! │                        ▼                                                │
//! │  vega-db: the Persisting phase (ticket insert + stock decrements)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: every function is deterministic - same input = same output
//! 2. **No I/O**: database, camera, and file system access is FORBIDDEN here
//! 3. **Integer Money**: all monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: all errors are typed, never strings or panics
//! 5. **No Partial Mutation**: every rejected cart operation leaves the cart
//!    exactly as it was

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod checkout;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartLine};
pub use checkout::{format_ticket_number, CommitPhase, TicketDraft};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum lines allowed in a single cart.
///
/// Prevents runaway carts and keeps transaction sizes reasonable.
pub const MAX_CART_LINES: usize = 100;

/// Maximum quantity of a single line in the cart.
///
/// Prevents accidental over-entry (e.g., typing 1000 instead of 10).
pub const MAX_LINE_QUANTITY: i64 = 999;

/// Maximum length of a barcode payload accepted by the router.
///
/// Matches the storage bound of the unknown-barcode table.
pub const MAX_PAYLOAD_LEN: usize = 255;

/// Default customer reference when no customer is selected.
pub const WALK_IN_CUSTOMER: &str = "Walk-in Customer";
