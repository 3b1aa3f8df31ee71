//! # Event Sink
//!
//! The session reports what happened through a trait so the display layer
//! is pluggable: the headless binary prints lines, tests capture events in
//! a vec, a future GUI would forward them to its event system.

use std::sync::Mutex;

use vega_core::{Cart, Ticket};
use vega_scan::{Frame, Severity};

/// Receives session events for display.
pub trait EventSink: Send + Sync {
    /// A status line (scan resolved, item rejected, scanner lost, ...).
    fn status(&self, message: &str, severity: Severity);

    /// The cart changed; `cart` is the post-mutation state.
    fn cart_changed(&self, cart: &Cart);

    /// A sale committed; the ticket is durable.
    fn sale_committed(&self, ticket: &Ticket);

    /// A camera frame for the preview pane. Default: ignored.
    fn preview(&self, _frame: &Frame) {}
}

/// Sink that drops everything (tests that don't inspect events).
pub struct NoOpSink;

impl EventSink for NoOpSink {
    fn status(&self, _message: &str, _severity: Severity) {}
    fn cart_changed(&self, _cart: &Cart) {}
    fn sale_committed(&self, _ticket: &Ticket) {}
}

/// Sink for the headless binary: one line per event on stdout.
pub struct ConsoleSink;

impl EventSink for ConsoleSink {
    fn status(&self, message: &str, severity: Severity) {
        let tag = match severity {
            Severity::Info => " i ",
            Severity::Success => " ✓ ",
            Severity::Warning => " ! ",
            Severity::Error => " ✗ ",
        };
        println!("[{tag}] {message}");
    }

    fn cart_changed(&self, cart: &Cart) {
        for (index, line) in cart.lines().iter().enumerate() {
            println!(
                "  {:>2}. {:<30} x{:<3} {:>8}",
                index + 1,
                line.name,
                line.quantity,
                format_cents(line.line_total_cents()),
            );
        }
        println!(
            "      subtotal {}  discount {}  total {}",
            format_cents(cart.subtotal_cents()),
            format_cents(cart.discount_cents()),
            format_cents(cart.display_total_cents()),
        );
    }

    fn sale_committed(&self, ticket: &Ticket) {
        println!(
            "[ ✓ ] {} committed: total {} paid {} change {}",
            ticket.ticket_number,
            format_cents(ticket.total_cents),
            format_cents(ticket.payment_cents),
            format_cents(ticket.change_cents),
        );
    }
}

fn format_cents(cents: i64) -> String {
    format!("{}.{:02}", cents / 100, (cents % 100).abs())
}

/// Sink that records events for assertions.
#[derive(Default)]
pub struct RecordingSink {
    pub statuses: Mutex<Vec<(String, Severity)>>,
    pub committed: Mutex<Vec<String>>,
}

impl EventSink for RecordingSink {
    fn status(&self, message: &str, severity: Severity) {
        if let Ok(mut statuses) = self.statuses.lock() {
            statuses.push((message.to_string(), severity));
        }
    }

    fn cart_changed(&self, _cart: &Cart) {}

    fn sale_committed(&self, ticket: &Ticket) {
        if let Ok(mut committed) = self.committed.lock() {
            committed.push(ticket.ticket_number.clone());
        }
    }
}
