#![doc = include_str!("../README.MD")]
#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

//! Safe bridge between caller owned buffers and the block decoders in
//! [`texture_decoder_codecs`].
//!
//! Every call follows the same shape:
//!
//! 1. Pin the compressed input and the decoded output ([`pinning`]).
//! 2. Optionally unpack mip level 0 out of a crunch container ([`crunch`]).
//! 3. Run exactly one block decoder, selected by [`FormatTag`] ([`dispatch`]).
//! 4. Release both buffers, committing the output only on success.
//!
//! # Examples
//!
//! ```
//! use texture_decoder_api::{FormatTag, SurfaceDesc, TextureDecoder};
//!
//! // One opaque white BC1 block.
//! let data = [0xFF, 0xFF, 0xFF, 0xFF, 0, 0, 0, 0];
//! let mut pixels = [0u32; 16];
//!
//! let decoder = TextureDecoder::new();
//! decoder.decode_slice(&data, &mut pixels, SurfaceDesc::new(FormatTag::Bc1, 4, 4))?;
//! assert!(pixels.iter().all(|&p| p == u32::MAX));
//! # Ok::<(), texture_decoder_api::DecodeError>(())
//! ```

extern crate alloc;

pub mod crunch;
pub mod decoder;
pub mod dispatch;
pub mod error;
pub mod format;
pub mod pinning;

#[cfg(feature = "c-exports")]
pub mod c_api;

#[cfg(test)]
pub(crate) mod test_prelude;

pub use crunch::{CrunchDialect, CrunchUnpacker, CrunchedFormat, UnpackedBlob};
pub use decoder::{CrunchedDesc, TextureDecoder, TextureDecoderBuilder};
pub use error::{DecodeError, DispatchError, UnpackError};
pub use format::{
    AstcBlockSize, FormatParams, FormatTag, SurfaceDesc, required_input_len, required_output_len,
};
pub use pinning::{ErrorChannel, PinFailure, PinnableBuffer, ReleaseMode};
