//! Capture error types.

use thiserror::Error;

/// Errors from a capture source.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// The device could not be opened.
    ///
    /// ## When This Occurs
    /// - Camera index doesn't exist
    /// - Device is held by another process
    /// - Driver failure
    #[error("Capture device {device_id} unavailable: {reason}")]
    DeviceUnavailable { device_id: u32, reason: String },

    /// A frame read failed after the device was opened.
    ///
    /// ## When This Occurs
    /// - Device was unplugged mid-session
    /// - Transient driver error
    #[error("Frame read failed: {0}")]
    ReadFailed(String),
}

/// Result type for capture operations.
pub type CaptureResult<T> = Result<T, CaptureError>;
