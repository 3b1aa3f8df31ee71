//! # Worker Events
//!
//! Everything the capture worker sends to the session loop travels through
//! one channel as a [`ScanMessage`], so ordering between scans and status
//! changes is preserved.

use serde::{Deserialize, Serialize};
use vega_core::ScanEvent;

use crate::capture::Frame;

/// Severity of a status event, mapped to display styling by the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

/// A human-readable status change from the worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEvent {
    pub message: String,
    pub severity: Severity,
}

impl StatusEvent {
    pub fn info(message: impl Into<String>) -> Self {
        StatusEvent {
            message: message.into(),
            severity: Severity::Info,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        StatusEvent {
            message: message.into(),
            severity: Severity::Error,
        }
    }
}

/// Message from the capture worker to the session loop.
#[derive(Debug, Clone)]
pub enum ScanMessage {
    /// A debounced scan, ready for routing.
    Scan(ScanEvent),

    /// Worker status change (started, device lost, stopped).
    Status(StatusEvent),

    /// Raw frame for the preview pane. Sent best-effort; a slow consumer
    /// drops previews rather than stalling the scan path.
    Preview(Frame),
}
