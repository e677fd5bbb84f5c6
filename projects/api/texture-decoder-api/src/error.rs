//! Error types for the decode bridge.

use crate::crunch::{CrunchDialect, HeaderError};
use crate::format::FormatTag;
use texture_decoder_codecs::CodecError;
use texture_decoder_common::allocate::AllocateError;
use thiserror::Error;

/// Errors reported by [`crate::dispatch::decode`].
///
/// All of these are detected before the decoder writes its first pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// The [`crate::FormatParams`] shape does not belong to the format, or carries an
    /// unsupported value.
    #[error("Invalid format parameters for {0:?}.")]
    InvalidFormatParams(FormatTag),

    /// The compressed input is shorter than the block grid of the surface.
    #[error("Input too small: need {needed} bytes, but only {actual} bytes available.")]
    InputTooSmall {
        /// The required size in bytes
        needed: usize,
        /// The actual size in bytes
        actual: usize,
    },

    /// The output holds fewer than `width * height` pixels.
    #[error("Output buffer too small: need {needed} pixels, but only {actual} pixels available.")]
    OutputTooSmall {
        /// The required size in pixels
        needed: usize,
        /// The actual size in pixels
        actual: usize,
    },
}

impl From<CodecError> for DispatchError {
    fn from(error: CodecError) -> Self {
        match error {
            CodecError::InputTooSmall { needed, actual } => Self::InputTooSmall { needed, actual },
            CodecError::OutputTooSmall { needed, actual } => {
                Self::OutputTooSmall { needed, actual }
            }
            CodecError::UnsupportedBlockSize(_) => Self::InvalidFormatParams(FormatTag::Astc),
        }
    }
}

/// Errors produced while extracting a mip level from a crunch container.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnpackError {
    /// The container header failed validation; no unpacker was invoked.
    #[error("Invalid crunch header: {0}")]
    InvalidHeader(#[from] HeaderError),

    /// No unpacker is registered for the requested dialect.
    #[error("No crunch unpacker registered for the {0:?} dialect.")]
    MissingBackend(CrunchDialect),

    /// The unpacker rejected the stream.
    #[error("Crunch unpacker failed to extract level {level}.")]
    UnpackFailed {
        /// The requested mip level
        level: u32,
    },

    /// The unpacker reported success without producing a buffer.
    #[error("Crunch unpacker returned no data for level {level}.")]
    EmptyLevel {
        /// The requested mip level
        level: u32,
    },

    /// The unpacked level is shorter than the header promised.
    #[error("Unpacked level too small: need {needed} bytes, but only {actual} bytes available.")]
    LevelTooSmall {
        /// The size derived from the header in bytes
        needed: usize,
        /// The size returned by the unpacker in bytes
        actual: usize,
    },

    /// The stream is longer than a 32-bit unpacker can address.
    #[error("Crunch stream of {0} bytes is too large.")]
    StreamTooLarge(usize),

    /// Allocating the level buffer failed.
    #[error("Memory allocation failed: {0}")]
    AllocationFailed(#[from] AllocateError),
}

/// Errors returned by [`crate::TextureDecoder`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// One of the two buffers could not be pinned. The error channel was notified.
    #[error("Failed to get critical array access.")]
    PinFailure,

    /// The crunch container could not be unpacked.
    #[error("Crunch unpack failed: {0}")]
    UnpackFailure(#[from] UnpackError),

    /// See [`DispatchError::InvalidFormatParams`].
    #[error("Invalid format parameters for {0:?}.")]
    InvalidFormatParams(FormatTag),

    /// See [`DispatchError::InputTooSmall`].
    #[error("Input too small: need {needed} bytes, but only {actual} bytes available.")]
    InputTooSmall {
        /// The required size in bytes
        needed: usize,
        /// The actual size in bytes
        actual: usize,
    },

    /// See [`DispatchError::OutputTooSmall`].
    #[error("Output buffer too small: need {needed} pixels, but only {actual} pixels available.")]
    OutputTooSmall {
        /// The required size in pixels
        needed: usize,
        /// The actual size in pixels
        actual: usize,
    },
}

impl From<DispatchError> for DecodeError {
    fn from(error: DispatchError) -> Self {
        match error {
            DispatchError::InvalidFormatParams(tag) => Self::InvalidFormatParams(tag),
            DispatchError::InputTooSmall { needed, actual } => Self::InputTooSmall { needed, actual },
            DispatchError::OutputTooSmall { needed, actual } => {
                Self::OutputTooSmall { needed, actual }
            }
        }
    }
}
