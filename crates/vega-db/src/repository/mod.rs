//! # Repository Implementations
//!
//! One repository per aggregate. Each wraps the shared `SqlitePool` and is
//! cheap to construct from a [`Database`](crate::Database) handle.
//!
//! - [`product`] - Catalog lookups and stock updates
//! - [`ticket`] - The sale-commit transaction and ticket history
//! - [`unknown_code`] - Log of scans that matched no product

pub mod product;
pub mod ticket;
pub mod unknown_code;
