//! # Capture Source
//!
//! Abstraction over the device that produces frames. The worker only ever
//! talks to the trait, so tests drive the pipeline with a scripted mock and
//! a hardware-backed implementation can live in a platform crate.

use crate::error::CaptureResult;

/// One captured frame, 8-bit grayscale row-major.
///
/// Grayscale is all the decoder needs; a color source converts before
/// handing the frame over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    /// `width * height` bytes, row-major, top-left origin.
    pub pixels: Vec<u8>,
}

impl Frame {
    /// Creates a frame, truncating or zero-padding `pixels` to fit the
    /// stated dimensions.
    pub fn new(width: u32, height: u32, mut pixels: Vec<u8>) -> Self {
        pixels.resize((width as usize) * (height as usize), 0);
        Frame {
            width,
            height,
            pixels,
        }
    }

    /// An all-black frame, handy in tests.
    pub fn blank(width: u32, height: u32) -> Self {
        Frame::new(width, height, Vec::new())
    }
}

/// A device that produces frames for the capture worker.
///
/// ## Contract
/// - `open()` is called once before the first `read_frame()`
/// - `read_frame()` returning `Ok(None)` means no frame right now (the
///   worker yields and retries); `Err` means the device failed and the
///   worker stops after reporting it
/// - `close()` is idempotent and is always called before the worker exits,
///   including on the error path
pub trait CaptureSource: Send {
    /// Opens the device.
    fn open(&mut self) -> CaptureResult<()>;

    /// Reads the next frame, or `None` when no frame is available yet.
    fn read_frame(&mut self) -> CaptureResult<Option<Frame>>;

    /// Releases the device. Idempotent.
    fn close(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_pads_and_truncates() {
        let padded = Frame::new(2, 2, vec![1, 2]);
        assert_eq!(padded.pixels, vec![1, 2, 0, 0]);

        let truncated = Frame::new(1, 2, vec![1, 2, 3, 4]);
        assert_eq!(truncated.pixels, vec![1, 2]);
    }
}
