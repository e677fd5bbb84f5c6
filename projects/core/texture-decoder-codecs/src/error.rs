//! Errors reported by the surface decoders.

use thiserror::Error;

/// Reasons a surface decode was rejected.
///
/// All checks run before the first pixel is written, so on error `image` is untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The compressed input does not cover the block grid of the requested dimensions.
    #[error("Input too small: need {needed} bytes, but only {actual} bytes available.")]
    InputTooSmall { needed: usize, actual: usize },

    /// The destination holds fewer than `width * height` pixels.
    #[error("Output buffer too small: need {needed} pixels, but only {actual} pixels available.")]
    OutputTooSmall { needed: usize, actual: usize },

    /// ASTC footprint outside of the supported square sizes.
    #[error("Unsupported ASTC block size: {0}x{0}")]
    UnsupportedBlockSize(u8),
}
