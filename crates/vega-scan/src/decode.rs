//! # Symbol Decoder
//!
//! Trait for extracting barcode symbols from a frame. Decoding is
//! infallible by contract: a frame with nothing recognizable yields an
//! empty vec, never an error, so a dirty lens cannot take the pipeline
//! down.

use vega_core::DecodedCode;

use crate::capture::Frame;

/// Extracts every recognizable symbol from a frame.
///
/// A frame may contain zero, one, or several symbols (two items held under
/// the camera at once); each detection is returned separately and debounced
/// independently downstream.
pub trait SymbolDecoder: Send {
    fn decode(&mut self, frame: &Frame) -> Vec<DecodedCode>;
}
