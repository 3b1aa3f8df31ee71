//! # Scan Debouncer
//!
//! A barcode held under the camera decodes on every frame, thirty times a
//! second. The debouncer collapses those repeats into one scan per window
//! so one item doesn't ring up thirty times.
//!
//! ## Suppression Rule
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  admit(payload, now)                                                    │
//! │       │                                                                 │
//! │       ├── payload != last payload ──────────────► admit (reset window)  │
//! │       │                                                                 │
//! │       ├── same payload, elapsed <  window ──────► suppress              │
//! │       │                                                                 │
//! │       └── same payload, elapsed >= window ──────► admit (reset window)  │
//! │                                                                         │
//! │  Only the LAST payload is tracked: alternating A,B,A,B admits every     │
//! │  scan, which is what a cashier alternating two items expects.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The camera path and the wedge path each own their own instance with
//! their own window; the two never suppress each other.

use std::time::{Duration, Instant};

/// Per-payload repeat suppression.
///
/// Pure state machine: the caller supplies `now`, so tests control time
/// without sleeping.
#[derive(Debug)]
pub struct ScanDebouncer {
    window: Duration,
    last_payload: Option<String>,
    last_admitted: Option<Instant>,
}

impl ScanDebouncer {
    /// Creates a debouncer with the given suppression window.
    pub fn new(window: Duration) -> Self {
        ScanDebouncer {
            window,
            last_payload: None,
            last_admitted: None,
        }
    }

    /// Returns the suppression window.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Decides whether a decoded payload becomes a scan event.
    ///
    /// Admitting resets the window; suppressed repeats do NOT extend it, so
    /// an item held under the camera re-scans every full window.
    pub fn admit(&mut self, payload: &str, now: Instant) -> bool {
        let is_repeat = self.last_payload.as_deref() == Some(payload)
            && self
                .last_admitted
                .is_some_and(|at| now.duration_since(at) < self.window);

        if is_repeat {
            return false;
        }

        self.last_payload = Some(payload.to_string());
        self.last_admitted = Some(now);
        true
    }

    /// Forgets the last payload so the next scan is always admitted.
    ///
    /// Called when the cart is cleared: re-scanning the same item for the
    /// next customer must not be suppressed.
    pub fn reset(&mut self) {
        self.last_payload = None;
        self.last_admitted = None;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
