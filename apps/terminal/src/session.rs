//! # Session Controller
//!
//! The single writer of the cart. Every mutation (scans from the capture
//! channel, wedge entries, quantity edits, the commit itself) arrives
//! through one serialized inbox, so cart state never needs a lock.
//!
//! ## Session Loop
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Session Loop                                    │
//! │                                                                         │
//! │  ┌──────────────┐     SessionCommand      ┌──────────────────────────┐ │
//! │  │ stdin reader │ ──────────────────────► │         Session          │ │
//! │  └──────────────┘         (mpsc)          │                          │ │
//! │                                           │  owns: Cart              │ │
//! │  ┌──────────────┐      ScanMessage        │        wedge debouncer   │ │
//! │  │capture worker│ ──────────────────────► │        ScanRouter        │ │
//! │  └──────────────┘         (mpsc)          │        CommitPhase       │ │
//! │                                           └────────────┬─────────────┘ │
//! │                        tokio::select! merges both      │               │
//! │                                                        ▼               │
//! │                                           EventSink (status, cart,     │
//! │                                                      committed ticket) │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Commit Flow
//! Validating and Persisting run inline in the loop: no new command is
//! consumed until the commit resolves, which is what makes "at most one
//! commit in flight" true by construction.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use vega_core::{Cart, CommitPhase, ScanEvent, TicketDraft};
use vega_scan::{ScanDebouncer, ScanMessage, Severity};

use crate::context::AppContext;
use crate::error::SessionError;
use crate::router::{RouterOutcome, ScanRouter};
use crate::sink::EventSink;

// =============================================================================
// Commands
// =============================================================================

/// A mutation request for the session loop.
#[derive(Debug, Clone)]
pub enum SessionCommand {
    /// A wedge/manual entry line (barcode keyed or scanned via USB wedge).
    Entry(String),

    /// Set the quantity of the cart line at `index` (0 removes).
    SetQuantity { index: usize, quantity: i64 },

    /// Remove the cart line at `index`.
    RemoveLine(usize),

    /// Set the whole-sale discount in cents.
    SetDiscount(i64),

    /// Record the tendered payment in cents.
    SetPayment(i64),

    /// Set the customer reference.
    SetCustomer(String),

    /// Run the sale-commit protocol on the current cart.
    Commit,

    /// Empty the cart and start over.
    Clear,

    /// End the session.
    Shutdown,
}

// =============================================================================
// Session
// =============================================================================

/// One cashier session at one register.
pub struct Session {
    context: AppContext,
    router: ScanRouter,
    cart: Cart,
    wedge_debouncer: ScanDebouncer,
    sink: Arc<dyn EventSink>,
    phase: CommitPhase,
}

impl Session {
    /// Creates a session with an empty cart.
    pub fn new(
        context: AppContext,
        wedge_debouncer: ScanDebouncer,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        let router = ScanRouter::new(context.db.clone());
        Session {
            context,
            router,
            cart: Cart::new(),
            wedge_debouncer,
            sink,
            phase: CommitPhase::Idle,
        }
    }

    /// Read access for tests and display.
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Current commit phase.
    pub fn phase(&self) -> CommitPhase {
        self.phase
    }

    /// Runs the session until shutdown.
    ///
    /// `scans` is the capture worker's channel when a camera is attached;
    /// `None` runs wedge-only. If the worker exits, its channel closes and
    /// the session keeps running on commands alone.
    pub async fn run(
        mut self,
        mut commands: mpsc::Receiver<SessionCommand>,
        mut scans: Option<mpsc::Receiver<ScanMessage>>,
    ) {
        info!(device_id = %self.context.device_id, "Session started");

        loop {
            tokio::select! {
                command = commands.recv() => {
                    match command {
                        Some(command) => {
                            if !self.handle_command(command).await {
                                break;
                            }
                        }
                        None => {
                            debug!("Command channel closed, ending session");
                            break;
                        }
                    }
                }
                message = next_scan(&mut scans) => {
                    match message {
                        Some(message) => self.handle_scan_message(message).await,
                        None => {
                            debug!("Scan channel closed, continuing wedge-only");
                            scans = None;
                        }
                    }
                }
            }
        }

        info!(device_id = %self.context.device_id, "Session ended");
    }

    // =========================================================================
    // Command Handling
    // =========================================================================

    /// Applies one command. Returns `false` on shutdown.
    pub async fn handle_command(&mut self, command: SessionCommand) -> bool {
        match command {
            SessionCommand::Entry(line) => self.manual_entry(&line).await,
            SessionCommand::SetQuantity { index, quantity } => {
                self.apply_cart_edit(|cart| cart.set_quantity(index, quantity));
            }
            SessionCommand::RemoveLine(index) => {
                self.cart.remove_line(index);
                self.sink.cart_changed(&self.cart);
            }
            SessionCommand::SetDiscount(cents) => {
                self.apply_cart_edit(|cart| cart.set_discount(cents));
            }
            SessionCommand::SetPayment(cents) => {
                self.apply_cart_edit(|cart| cart.set_payment(cents));
            }
            SessionCommand::SetCustomer(customer) => {
                self.cart.set_customer(&customer);
            }
            SessionCommand::Commit => self.commit().await,
            SessionCommand::Clear => self.clear(),
            SessionCommand::Shutdown => return false,
        }
        true
    }

    fn apply_cart_edit<F>(&mut self, edit: F)
    where
        F: FnOnce(&mut Cart) -> Result<(), vega_core::CoreError>,
    {
        match edit(&mut self.cart) {
            Ok(()) => self.sink.cart_changed(&self.cart),
            Err(e) => self.sink.status(&e.to_string(), Severity::Warning),
        }
    }

    // =========================================================================
    // Scan Handling
    // =========================================================================

    async fn handle_scan_message(&mut self, message: ScanMessage) {
        match message {
            ScanMessage::Scan(event) => self.handle_scan(event).await,
            ScanMessage::Status(status) => self.sink.status(&status.message, status.severity),
            ScanMessage::Preview(frame) => self.sink.preview(&frame),
        }
    }

    /// A wedge/manual entry: debounce locally, then route like any scan.
    pub async fn manual_entry(&mut self, line: &str) {
        let payload = line.trim();
        if payload.is_empty() {
            return;
        }
        if !self.wedge_debouncer.admit(payload, Instant::now()) {
            debug!(payload = %payload, "Wedge entry suppressed by debouncer");
            return;
        }

        self.handle_scan(ScanEvent::keyed(payload, Utc::now())).await;
    }

    /// Routes a scan and applies the outcome to the cart.
    pub async fn handle_scan(&mut self, event: ScanEvent) {
        let outcome = match self.router.route(&event).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "Scan routing failed");
                self.sink
                    .status(&format!("Lookup failed: {e}"), Severity::Error);
                return;
            }
        };

        match outcome {
            RouterOutcome::Resolved(product) => {
                let name = product.name.clone();
                match self.cart.add_item(&product, 1) {
                    Ok(()) => {
                        self.sink.status(&format!("Added {name}"), Severity::Success);
                        self.sink.cart_changed(&self.cart);
                    }
                    Err(e) => self.sink.status(&e.to_string(), Severity::Warning),
                }
            }
            RouterOutcome::UnknownCode(payload) => {
                self.sink
                    .status(&format!("Unknown barcode: {payload}"), Severity::Warning);
            }
            RouterOutcome::EmptyInput => {
                self.sink.status("Enter a barcode", Severity::Info);
            }
        }
    }

    // =========================================================================
    // Commit and Clear
    // =========================================================================

    /// Runs the sale-commit protocol on the current cart.
    ///
    /// On success the cart is cleared for the next customer; on any failure
    /// the cart is exactly as it was, and the reason goes to the sink.
    pub async fn commit(&mut self) {
        if !self.phase.can_start() {
            self.sink
                .status(&SessionError::CommitInFlight.to_string(), Severity::Warning);
            return;
        }

        self.phase = CommitPhase::Validating;
        let draft = match TicketDraft::from_cart(&self.cart, &self.context.cashier_id) {
            Ok(draft) => draft,
            Err(e) => {
                self.phase = CommitPhase::RolledBack;
                self.sink.status(&e.to_string(), Severity::Warning);
                return;
            }
        };

        self.phase = CommitPhase::Persisting;
        match self.context.db.tickets().commit(&draft).await {
            Ok(ticket) => {
                self.phase = CommitPhase::Committed;
                self.cart.clear();
                self.wedge_debouncer.reset();
                self.sink.sale_committed(&ticket);
                self.sink.cart_changed(&self.cart);
            }
            Err(e) => {
                self.phase = CommitPhase::RolledBack;
                warn!(error = %e, "Sale commit rolled back");
                self.sink
                    .status(&format!("Sale not committed: {e}"), Severity::Error);
            }
        }
    }

    /// Empties the cart without committing.
    pub fn clear(&mut self) {
        self.cart.clear();
        self.wedge_debouncer.reset();
        self.sink.cart_changed(&self.cart);
    }
}

/// Awaits the next scan message, or parks forever when no camera channel
/// is attached (the select! then only ever fires on commands).
async fn next_scan(rx: &mut Option<mpsc::Receiver<ScanMessage>>) -> Option<ScanMessage> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::RecordingSink;
    use std::time::Duration;
    use vega_db::{Database, DbConfig};

    async fn test_session() -> (Session, Arc<RecordingSink>, Database) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.products()
            .insert("Cola 330ml", Some("111"), 250, None, 5)
            .await
            .unwrap();
        db.products()
            .insert("Chips", Some("222"), 150, None, 8)
            .await
            .unwrap();

        let sink = Arc::new(RecordingSink::default());
        let context = AppContext::new(db.clone(), "cashier-1", "register-1");
        let session = Session::new(
            context,
            ScanDebouncer::new(Duration::from_millis(300)),
            sink.clone(),
        );
        (session, sink, db)
    }

    #[tokio::test]
    async fn test_scan_adds_to_cart() {
        let (mut session, sink, _db) = test_session().await;

        session.handle_scan(ScanEvent::keyed("111", Utc::now())).await;

        assert_eq!(session.cart().line_count(), 1);
        assert_eq!(session.cart().lines()[0].name, "Cola 330ml");

        let statuses = sink.statuses.lock().unwrap();
        assert!(statuses
            .iter()
            .any(|(m, s)| m == "Added Cola 330ml" && *s == Severity::Success));
    }

    #[tokio::test]
    async fn test_unknown_scan_leaves_cart_unchanged() {
        let (mut session, sink, db) = test_session().await;

        session.handle_scan(ScanEvent::keyed("999", Utc::now())).await;

        assert!(session.cart().is_empty());
        let statuses = sink.statuses.lock().unwrap();
        assert!(statuses
            .iter()
            .any(|(m, s)| m.contains("Unknown barcode") && *s == Severity::Warning));

        // And the payload landed in the review log.
        let logged = db.unknown_codes().list_unresolved(10).await.unwrap();
        assert_eq!(logged.len(), 1);
    }

    #[tokio::test]
    async fn test_blank_scan_prompts_without_touching_cart() {
        let (mut session, sink, db) = test_session().await;

        // A camera can hand over a whitespace-only decode; the cart stays
        // untouched and the operator gets a prompt, nothing more.
        session.handle_scan(ScanEvent::keyed("   ", Utc::now())).await;

        assert!(session.cart().is_empty());
        let statuses = sink.statuses.lock().unwrap();
        assert!(statuses
            .iter()
            .any(|(m, s)| m == "Enter a barcode" && *s == Severity::Info));

        // Not logged as an unknown code either.
        assert!(db.unknown_codes().list_unresolved(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rapid_wedge_entry_is_debounced() {
        let (mut session, _sink, _db) = test_session().await;

        // Double-trigger: same payload twice back to back.
        session.manual_entry("111").await;
        session.manual_entry("111").await;

        assert_eq!(session.cart().line_count(), 1);
        assert_eq!(session.cart().lines()[0].quantity, 1);
    }

    #[tokio::test]
    async fn test_commit_persists_and_clears_cart() {
        let (mut session, sink, db) = test_session().await;

        session.manual_entry("111").await;
        assert!(session.handle_command(SessionCommand::SetPayment(500)).await);
        session.commit().await;

        assert_eq!(session.phase(), CommitPhase::Committed);
        assert!(session.cart().is_empty());
        assert_eq!(*sink.committed.lock().unwrap(), vec!["TKT000001"]);

        // Stock moved.
        let ticket = db.tickets().get_by_number("TKT000001").await.unwrap().unwrap();
        assert_eq!(ticket.total_cents, 250);
        assert_eq!(ticket.cashier_id, "cashier-1");

        // Debouncer was reset: the next customer can buy the same item
        // immediately.
        session.manual_entry("111").await;
        assert_eq!(session.cart().line_count(), 1);
    }

    #[tokio::test]
    async fn test_empty_cart_commit_is_rejected() {
        let (mut session, sink, db) = test_session().await;

        session.commit().await;

        assert_eq!(session.phase(), CommitPhase::RolledBack);
        let statuses = sink.statuses.lock().unwrap();
        assert!(statuses.iter().any(|(m, _)| m.contains("empty")));
        assert!(db.tickets().get_by_number("TKT000001").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insufficient_payment_keeps_cart() {
        let (mut session, _sink, db) = test_session().await;

        session.manual_entry("111").await;
        assert!(session.handle_command(SessionCommand::SetPayment(100)).await);
        session.commit().await;

        assert_eq!(session.phase(), CommitPhase::RolledBack);
        assert_eq!(session.cart().line_count(), 1);
        assert!(db.tickets().get_by_number("TKT000001").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_discount_and_change() {
        let (mut session, _sink, db) = test_session().await;

        session.manual_entry("111").await;
        session.manual_entry("222").await;
        assert!(session.handle_command(SessionCommand::SetDiscount(50)).await);
        assert!(session.handle_command(SessionCommand::SetPayment(1000)).await);
        session.commit().await;

        let ticket = db.tickets().get_by_number("TKT000001").await.unwrap().unwrap();
        assert_eq!(ticket.total_cents, 350);
        assert_eq!(ticket.change_cents, 650);
        assert_eq!(ticket.lines.len(), 2);
    }

    #[tokio::test]
    async fn test_run_loop_processes_commands_and_shuts_down() {
        let (session, sink, _db) = test_session().await;
        let (tx, rx) = mpsc::channel(16);

        let task = tokio::spawn(session.run(rx, None));

        tx.send(SessionCommand::Entry("111".to_string())).await.unwrap();
        tx.send(SessionCommand::SetPayment(500)).await.unwrap();
        tx.send(SessionCommand::Commit).await.unwrap();
        tx.send(SessionCommand::Shutdown).await.unwrap();

        task.await.unwrap();
        assert_eq!(*sink.committed.lock().unwrap(), vec!["TKT000001"]);
    }
}
