//! # Session Error Types
//!
//! The terminal-facing error type. Everything the session loop can fail
//! with collapses here so the display layer has one thing to format.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CoreError (cart/checkout)  ──┐                                         │
//! │  DbError (lookups/commit)   ──┼──► SessionError ──► status line         │
//! │  Config / IO                ──┘                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;
use vega_core::CoreError;
use vega_db::DbError;

/// Errors surfaced by the session loop.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Business-rule rejection (out of stock, empty cart, bad amount).
    /// The cart is unchanged; the message is shown to the cashier.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Database failure (lookup, commit transaction).
    #[error(transparent)]
    Db(#[from] DbError),

    /// Configuration load or validation failure.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A commit was requested while another is still in flight.
    #[error("A commit is already in progress")]
    CommitInFlight,
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;
