//! # vega-scan: Scan Pipeline for Vega POS
//!
//! Turns camera frames into debounced scan events.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Scan Pipeline                                    │
//! │                                                                         │
//! │  CaptureSource (camera / mock)                                          │
//! │       │ read_frame()                                                    │
//! │       ▼                                                                 │
//! │  SymbolDecoder ──► Vec<DecodedCode>   (0, 1, or many per frame)         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ScanDebouncer ──► admit? ────────── no ──► dropped silently            │
//! │       │ yes                                                             │
//! │       ▼                                                                 │
//! │  mpsc::Sender<ScanMessage> ──► session loop (terminal app)              │
//! │                                                                         │
//! │  The whole loop runs on a spawn_blocking thread; the CaptureHandle      │
//! │  owns a watch channel for two-phase stop (signal, then join).           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`capture`] - Frame type and the `CaptureSource` trait
//! - [`decode`] - The `SymbolDecoder` trait
//! - [`debounce`] - Per-payload repeat suppression
//! - [`events`] - Messages emitted by the worker
//! - [`worker`] - The capture worker and its stop handle
//! - [`error`] - Capture error types

// =============================================================================
// Module Declarations
// =============================================================================

pub mod capture;
pub mod debounce;
pub mod decode;
pub mod error;
pub mod events;
pub mod worker;

// =============================================================================
// Re-exports
// =============================================================================

pub use capture::{CaptureSource, Frame};
pub use debounce::ScanDebouncer;
pub use decode::SymbolDecoder;
pub use error::{CaptureError, CaptureResult};
pub use events::{ScanMessage, Severity, StatusEvent};
pub use worker::{spawn_capture_worker, CaptureHandle, CaptureWorkerConfig};
