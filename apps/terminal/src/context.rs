//! Shared handles for one terminal session.

use vega_db::Database;

/// Everything a session needs that outlives a single command.
///
/// Clone-cheap: the database handle wraps a pooled connection set, and the
/// identifiers are small strings copied at startup.
#[derive(Debug, Clone)]
pub struct AppContext {
    /// Database handle (lookups, commits, unknown-code log).
    pub db: Database,

    /// Cashier stamped on committed tickets.
    pub cashier_id: String,

    /// This register's device id, for logging.
    pub device_id: String,
}

impl AppContext {
    pub fn new(db: Database, cashier_id: impl Into<String>, device_id: impl Into<String>) -> Self {
        AppContext {
            db,
            cashier_id: cashier_id.into(),
            device_id: device_id.into(),
        }
    }
}
