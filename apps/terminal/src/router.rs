//! # Scan Router
//!
//! Turns an accepted scan into a catalog outcome.
//!
//! ## Routing
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ScanEvent                                                              │
//! │     │                                                                   │
//! │     ├── blank payload ─────────────────────────────► EmptyInput         │
//! │     │                                                                   │
//! │     ├── camera scan with unrecognized symbology ──► UnknownCode         │
//! │     │    (no lookup; the decoder already told us                        │
//! │     │     the format isn't one we sell)                                 │
//! │     │                                                                   │
//! │     └── find_by_barcode(payload)                                        │
//! │            ├── Some(product) ─────────────────────► Resolved(product)   │
//! │            └── None ──────────────────────────────► UnknownCode         │
//! │                                                                         │
//! │  UnknownCode additionally records the payload in the unknown-barcode    │
//! │  log, fire-and-forget: a failed insert is a warn! line, never an error  │
//! │  back to the scan path.                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::{debug, warn};

use vega_core::{Product, ScanEvent};
use vega_db::Database;

use crate::error::SessionResult;

/// What became of a routed scan.
#[derive(Debug, Clone)]
pub enum RouterOutcome {
    /// Exact barcode match on an active product.
    Resolved(Product),

    /// No match; the payload was logged for back-office review.
    UnknownCode(String),

    /// Blank payload (empty wedge line, decoder glitch). Dropped silently.
    EmptyInput,
}

/// Routes scans against the catalog.
#[derive(Debug, Clone)]
pub struct ScanRouter {
    db: Database,
}

impl ScanRouter {
    pub fn new(db: Database) -> Self {
        ScanRouter { db }
    }

    /// Routes one scan event.
    ///
    /// Only a database failure on the LOOKUP is an error; a failure while
    /// logging an unknown code is swallowed (the sale must not stall on a
    /// bookkeeping write).
    pub async fn route(&self, event: &ScanEvent) -> SessionResult<RouterOutcome> {
        let payload = match vega_core::validation::validate_payload(&event.payload) {
            Ok(payload) => payload,
            Err(_) => return Ok(RouterOutcome::EmptyInput),
        };

        // Camera scans carry their symbology; a format we don't sell goes
        // straight to the unknown log without a lookup. Wedge entries
        // (symbology None) always get the lookup.
        if let Some(symbology) = event.symbology {
            if !symbology.is_known() {
                debug!(payload = %payload, "Unrecognized symbology, skipping lookup");
                self.record_unknown(payload, event).await;
                return Ok(RouterOutcome::UnknownCode(payload.to_string()));
            }
        }

        match self.db.products().find_by_barcode(payload).await? {
            Some(product) => {
                debug!(payload = %payload, product = %product.name, "Scan resolved");
                Ok(RouterOutcome::Resolved(product))
            }
            None => {
                self.record_unknown(payload, event).await;
                Ok(RouterOutcome::UnknownCode(payload.to_string()))
            }
        }
    }

    async fn record_unknown(&self, payload: &str, event: &ScanEvent) {
        if let Err(e) = self.db.unknown_codes().record(payload, event.at).await {
            warn!(payload = %payload, error = %e, "Failed to record unknown barcode");
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use vega_core::Symbology;
    use vega_db::DbConfig;

    async fn router_with_cola() -> ScanRouter {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.products()
            .insert("Cola 330ml", Some("8901234567890"), 250, None, 10)
            .await
            .unwrap();
        ScanRouter::new(db)
    }

    #[tokio::test]
    async fn test_known_barcode_resolves() {
        let router = router_with_cola().await;
        let event = ScanEvent::keyed("8901234567890", Utc::now());

        match router.route(&event).await.unwrap() {
            RouterOutcome::Resolved(product) => assert_eq!(product.name, "Cola 330ml"),
            other => panic!("expected Resolved, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_payload_is_trimmed_before_lookup() {
        let router = router_with_cola().await;
        let event = ScanEvent::keyed("  8901234567890\n", Utc::now());

        assert!(matches!(
            router.route(&event).await.unwrap(),
            RouterOutcome::Resolved(_)
        ));
    }

    #[tokio::test]
    async fn test_unknown_barcode_is_logged() {
        let router = router_with_cola().await;
        let event = ScanEvent::keyed("0000000000000", Utc::now());

        match router.route(&event).await.unwrap() {
            RouterOutcome::UnknownCode(payload) => assert_eq!(payload, "0000000000000"),
            other => panic!("expected UnknownCode, got {other:?}"),
        }

        let logged = router.db.unknown_codes().list_unresolved(10).await.unwrap();
        assert_eq!(logged.len(), 1);
        assert_eq!(logged[0].payload, "0000000000000");
    }

    #[tokio::test]
    async fn test_blank_payload_is_empty_input() {
        let router = router_with_cola().await;
        let event = ScanEvent::keyed("   ", Utc::now());

        assert!(matches!(
            router.route(&event).await.unwrap(),
            RouterOutcome::EmptyInput
        ));

        // Nothing gets logged for a blank payload.
        let logged = router.db.unknown_codes().list_unresolved(10).await.unwrap();
        assert!(logged.is_empty());
    }

    #[tokio::test]
    async fn test_unrecognized_symbology_skips_lookup() {
        let router = router_with_cola().await;
        // Payload matches a real product, but the decoder flagged the
        // format as unknown, so it must not resolve.
        let mut event = ScanEvent::keyed("8901234567890", Utc::now());
        event.symbology = Some(Symbology::Unknown);

        assert!(matches!(
            router.route(&event).await.unwrap(),
            RouterOutcome::UnknownCode(_)
        ));

        let logged = router.db.unknown_codes().list_unresolved(10).await.unwrap();
        assert_eq!(logged.len(), 1);
    }
}
