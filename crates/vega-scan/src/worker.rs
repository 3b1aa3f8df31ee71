//! # Capture Worker
//!
//! Runs the frame loop off the async runtime and feeds debounced scans to
//! the session loop.
//!
//! ## Worker Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Capture Worker Lifecycle                           │
//! │                                                                         │
//! │  spawn_capture_worker(source, decoder, config)                          │
//! │       │                                                                 │
//! │       ├──► (CaptureHandle, mpsc::Receiver<ScanMessage>)                 │
//! │       │                                                                 │
//! │       ▼ tokio::task::spawn_blocking                                     │
//! │  ┌───────────────────────────────────────────────────────────────────┐  │
//! │  │  open() ── err ──► Status(Error) ──► close() ──► exit             │  │
//! │  │    │ ok                                                           │  │
//! │  │    ▼                                                              │  │
//! │  │  Status(Info "Scanner started")                                   │  │
//! │  │    │                                                              │  │
//! │  │    ▼                                                              │  │
//! │  │  loop {                                                           │  │
//! │  │    stop requested? ──► break                                      │  │
//! │  │    read_frame()                                                   │  │
//! │  │      ├── Some(frame) ──► Preview (best-effort)                    │  │
//! │  │      │                   decode ──► debounce ──► Scan(event)      │  │
//! │  │      ├── None ──► yield, retry                                    │  │
//! │  │      └── Err  ──► Status(Error) ──► break                         │  │
//! │  │  }                                                                │  │
//! │  │    │                                                              │  │
//! │  │    ▼                                                              │  │
//! │  │  close()  (always, error path included)                           │  │
//! │  │  Status(Info "Scanner stopped")                                   │  │
//! │  └───────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  Shutdown is two-phase: handle.stop() flips the watch flag, then        │
//! │  handle.join().await waits for the thread to finish. Both idempotent.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use vega_core::ScanEvent;

use crate::capture::CaptureSource;
use crate::debounce::ScanDebouncer;
use crate::decode::SymbolDecoder;
use crate::events::{ScanMessage, StatusEvent};

// =============================================================================
// Configuration
// =============================================================================

/// Capture worker configuration.
#[derive(Debug, Clone)]
pub struct CaptureWorkerConfig {
    /// Device identifier, reported in status messages.
    pub device_id: u32,

    /// Debounce window for camera scans.
    /// Default: 800ms
    pub debounce_window: Duration,

    /// Capacity of the worker-to-session channel.
    /// Default: 64
    pub channel_capacity: usize,

    /// Whether to forward frames for the preview pane.
    /// Default: true
    pub emit_preview: bool,
}

impl Default for CaptureWorkerConfig {
    fn default() -> Self {
        CaptureWorkerConfig {
            device_id: 0,
            debounce_window: Duration::from_millis(800),
            channel_capacity: 64,
            emit_preview: true,
        }
    }
}

// =============================================================================
// Handle
// =============================================================================

/// Handle to a running capture worker.
pub struct CaptureHandle {
    stop_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl CaptureHandle {
    /// Signals the worker to stop after its current frame.
    ///
    /// Idempotent; returns immediately without waiting for the worker.
    pub fn stop(&self) {
        // Send only fails when the worker already exited, which is fine.
        let _ = self.stop_tx.send(true);
    }

    /// Signals stop and waits for the worker thread to finish.
    pub async fn join(self) {
        self.stop();
        if let Err(e) = self.join.await {
            warn!(error = %e, "Capture worker panicked");
        }
    }

    /// Whether the worker has exited.
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }
}

// =============================================================================
// Spawn
// =============================================================================

/// Spawns the capture worker on a blocking thread.
///
/// Returns the stop handle and the receiving end of the message channel.
/// Dropping the receiver also stops the worker: the next send fails and the
/// loop exits.
pub fn spawn_capture_worker(
    source: Box<dyn CaptureSource>,
    decoder: Box<dyn SymbolDecoder>,
    config: CaptureWorkerConfig,
) -> (CaptureHandle, mpsc::Receiver<ScanMessage>) {
    let (tx, rx) = mpsc::channel(config.channel_capacity);
    let (stop_tx, stop_rx) = watch::channel(false);

    info!(device_id = config.device_id, "Spawning capture worker");

    let join = tokio::task::spawn_blocking(move || {
        run_loop(source, decoder, config, stop_rx, tx);
    });

    (CaptureHandle { stop_tx, join }, rx)
}

// =============================================================================
// Frame Loop
// =============================================================================

fn run_loop(
    mut source: Box<dyn CaptureSource>,
    mut decoder: Box<dyn SymbolDecoder>,
    config: CaptureWorkerConfig,
    stop_rx: watch::Receiver<bool>,
    tx: mpsc::Sender<ScanMessage>,
) {
    if let Err(e) = source.open() {
        warn!(device_id = config.device_id, error = %e, "Capture device failed to open");
        let _ = tx.blocking_send(ScanMessage::Status(StatusEvent::error(format!(
            "Scanner unavailable: {e}"
        ))));
        // A source may have partially acquired the device before erroring.
        source.close();
        return;
    }

    let _ = tx.blocking_send(ScanMessage::Status(StatusEvent::info("Scanner started")));
    debug!(device_id = config.device_id, "Capture loop running");

    let mut debouncer = ScanDebouncer::new(config.debounce_window);

    loop {
        if *stop_rx.borrow() {
            debug!("Stop requested, leaving capture loop");
            break;
        }

        let frame = match source.read_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                std::thread::yield_now();
                continue;
            }
            Err(e) => {
                warn!(error = %e, "Frame read failed, stopping capture");
                let _ = tx.blocking_send(ScanMessage::Status(StatusEvent::error(format!(
                    "Scanner failed: {e}"
                ))));
                break;
            }
        };

        if config.emit_preview {
            // Best-effort: a slow consumer drops previews, never scans.
            let _ = tx.try_send(ScanMessage::Preview(frame.clone()));
        }

        let mut receiver_gone = false;
        for code in decoder.decode(&frame) {
            if !debouncer.admit(&code.payload, Instant::now()) {
                continue;
            }

            debug!(payload = %code.payload, symbology = code.symbology.label(), "Scan admitted");
            let event = ScanEvent::from_decoded(&code, Utc::now());
            if tx.blocking_send(ScanMessage::Scan(event)).is_err() {
                receiver_gone = true;
                break;
            }
        }
        if receiver_gone {
            debug!("Receiver dropped, leaving capture loop");
            break;
        }
    }

    source.close();
    let _ = tx.blocking_send(ScanMessage::Status(StatusEvent::info("Scanner stopped")));
    info!(device_id = config.device_id, "Capture worker exited");
}

// =============================================================================
// Unit Tests
// =============================================================================
