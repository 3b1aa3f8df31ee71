//! # Domain Types
//!
//! Core domain types for the scan-to-cart pipeline and sale-commit protocol.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐        │
//! │  │    Product      │   │    ScanEvent    │   │     Ticket      │        │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │        │
//! │  │  id (UUID)      │   │  payload        │   │  ticket_number  │        │
//! │  │  barcode        │   │  symbology      │   │  lines (frozen) │        │
//! │  │  price_cents    │   │  at             │   │  total_cents    │        │
//! │  │  stock          │   └─────────────────┘   │  change_cents   │        │
//! │  └─────────────────┘                         └─────────────────┘        │
//! │                                                                         │
//! │  DecodedCode is what the symbol decoder produces per detection;         │
//! │  ScanEvent is a DecodedCode that survived the debouncer.                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Symbology
// =============================================================================

/// The barcode format of a decoded symbol.
///
/// Covers the formats the register accepts; anything else decodes as
/// `Unknown` and is routed to the unknown-code log without a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Symbology {
    Ean13,
    Ean8,
    UpcA,
    UpcE,
    Code128,
    Code39,
    QrCode,
    /// Decoder reported a format outside the accepted set.
    Unknown,
}

impl Symbology {
    /// Parses a decoder-reported format label.
    ///
    /// Labels are matched case-insensitively with hyphens stripped, so
    /// "EAN-13", "ean13", and "EAN13" all resolve to [`Symbology::Ean13`].
    pub fn from_label(label: &str) -> Self {
        let normalized: String = label
            .chars()
            .filter(|c| *c != '-')
            .collect::<String>()
            .to_ascii_uppercase();

        match normalized.as_str() {
            "EAN13" => Symbology::Ean13,
            "EAN8" => Symbology::Ean8,
            "UPCA" => Symbology::UpcA,
            "UPCE" => Symbology::UpcE,
            "CODE128" => Symbology::Code128,
            "CODE39" => Symbology::Code39,
            "QRCODE" | "QR" => Symbology::QrCode,
            _ => Symbology::Unknown,
        }
    }

    /// Whether this format is in the accepted set.
    pub const fn is_known(&self) -> bool {
        !matches!(self, Symbology::Unknown)
    }

    /// Display label for status messages.
    pub const fn label(&self) -> &'static str {
        match self {
            Symbology::Ean13 => "EAN-13",
            Symbology::Ean8 => "EAN-8",
            Symbology::UpcA => "UPC-A",
            Symbology::UpcE => "UPC-E",
            Symbology::Code128 => "CODE128",
            Symbology::Code39 => "CODE39",
            Symbology::QrCode => "QR",
            Symbology::Unknown => "UNKNOWN",
        }
    }
}

// =============================================================================
// Decoded Code & Scan Event
// =============================================================================

/// One symbol detection within a frame. Ephemeral: produced by the decoder,
/// consumed by the debouncer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedCode {
    /// Decoded string content of the symbol (opaque UTF-8).
    pub payload: String,

    /// Barcode format the decoder reported.
    pub symbology: Symbology,
}

/// A decoded payload that passed the debouncer's suppression test.
///
/// Emitted at most once per debounce window for a given payload, and
/// consumed exactly once by the scan router.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanEvent {
    /// Decoded string content of the symbol.
    pub payload: String,

    /// Barcode format, when the input path knows it. Camera scans always
    /// carry a symbology; wedge/manual entry carries `None` because the
    /// keystrokes arrive without format information.
    pub symbology: Option<Symbology>,

    /// When the debouncer accepted the scan.
    pub at: DateTime<Utc>,
}

impl ScanEvent {
    /// Builds an event for a camera detection.
    pub fn from_decoded(code: &DecodedCode, at: DateTime<Utc>) -> Self {
        ScanEvent {
            payload: code.payload.clone(),
            symbology: Some(code.symbology),
            at,
        }
    }

    /// Builds an event for wedge/manual entry (no format information).
    pub fn keyed(payload: impl Into<String>, at: DateTime<Utc>) -> Self {
        ScanEvent {
            payload: payload.into(),
            symbology: None,
            at,
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
///
/// The pipeline reads `barcode` (exact-match lookup key), `price_cents`
/// (frozen into cart lines), and `stock` (the bound every cart mutation
/// must respect). The commit protocol is the only writer of `stock`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown to the cashier and on the ticket.
    pub name: String,

    /// Barcode payload (EAN-13, CODE128, ...). Optional: not every product
    /// is barcoded; those are added from the product panel instead.
    pub barcode: Option<String>,

    /// Sale price in cents.
    pub price_cents: i64,

    /// Purchase cost in cents (for margin reporting, not used by the pipeline).
    pub cost_cents: Option<i64>,

    /// Current stock level.
    pub stock: i64,

    /// Whether product is active (soft delete).
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Whether the product has any sellable stock.
    #[inline]
    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

// =============================================================================
// Ticket
// =============================================================================

/// A frozen line on a committed ticket.
///
/// Uses the snapshot pattern: name and unit price are copied from the cart
/// line at commit time so ticket history survives later product edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketLine {
    pub product_id: String,
    pub name: String,
    pub unit_price_cents: i64,
    pub quantity: i64,
    pub line_total_cents: i64,
}

/// An immutable record of a completed sale.
///
/// Produced by the commit protocol; once persisted it is never mutated by
/// this subsystem. `total_cents == Σ(line.line_total_cents) - discount`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Business identifier, unique and monotonic (e.g., `TKT000042`).
    pub ticket_number: String,

    /// Frozen snapshot of the cart lines at commit time.
    pub lines: Vec<TicketLine>,

    /// Total after discount, in cents.
    pub total_cents: i64,

    pub discount_cents: i64,
    pub payment_cents: i64,
    pub change_cents: i64,

    /// Customer reference (defaults to the walk-in customer).
    pub customer: String,

    /// Cashier who committed the sale.
    pub cashier_id: String,

    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbology_from_label_normalizes() {
        assert_eq!(Symbology::from_label("EAN13"), Symbology::Ean13);
        assert_eq!(Symbology::from_label("EAN-13"), Symbology::Ean13);
        assert_eq!(Symbology::from_label("ean13"), Symbology::Ean13);
        assert_eq!(Symbology::from_label("qrcode"), Symbology::QrCode);
        assert_eq!(Symbology::from_label("PDF417"), Symbology::Unknown);
    }

    #[test]
    fn test_symbology_known_set() {
        assert!(Symbology::Code128.is_known());
        assert!(!Symbology::Unknown.is_known());
    }

    #[test]
    fn test_keyed_event_has_no_symbology() {
        let event = ScanEvent::keyed("123456", Utc::now());
        assert_eq!(event.payload, "123456");
        assert!(event.symbology.is_none());
    }
}
