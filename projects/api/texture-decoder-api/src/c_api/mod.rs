//! # C API (FFI) Documentation
//!
//! *Note: The C API is only available when the `c-exports` feature is enabled.*
//!
//! The `c-exports` feature exposes one entry point per texture format, plus a decoder handle
//! that carries the crunch unpackers used by the crunched entry points.
//!
//! ## Example Usage
//!
//! ### Decoding a Surface
//!
//! ```c
//! #include <stdio.h>
//! #include <stdint.h>
//!
//! // One solid BC1 block
//! uint8_t bc1_data[8] = { 0x00, 0xF8, 0x00, 0xF8, 0x00, 0x00, 0x00, 0x00 };
//! uint32_t pixels[4 * 4];
//! TdecErrorCode code;
//!
//! if (tdec_decode_dxt1(bc1_data, sizeof(bc1_data), 4, 4, pixels, 16, NULL, &code)) {
//!     printf("Decoded, first pixel: %08x\n", pixels[0]);
//! } else {
//!     printf("Decode failed: %s\n", tdec_error_message(code));
//! }
//! ```
//!
//! ### Decoding a Crunched Container
//!
//! ```c
//! TdecDecoder* decoder = tdec_new_decoder();
//!
//! // Bind your crunch library; `my_unpack_level` allocates the level, `my_free_level` frees it
//! TdecCrunchUnpacker unpacker = { my_context, my_unpack_level, my_free_level };
//! tdec_decoder_set_crunch_unpacker(decoder, false, unpacker);
//!
//! int ok = tdec_decode_crunched_dxt1(
//!     decoder, crn_data, crn_len, width, height, pixels, width * height,
//!     false, NULL, &code);
//!
//! tdec_free_decoder(decoder);
//! ```
//!
//! ## Available Functions
//!
//! ### Surface Decoding
//!
//! - **`tdec_decode_dxt1`**, **`tdec_decode_dxt5`**, **`tdec_decode_bc4`**, **`tdec_decode_bc5`**,
//!   **`tdec_decode_bc6`**, **`tdec_decode_bc7`**
//! - **`tdec_decode_etc1`**, **`tdec_decode_etc2`**, **`tdec_decode_etc2a1`**, **`tdec_decode_etc2a8`**
//! - **`tdec_decode_eacr`**, **`tdec_decode_eacr_signed`**, **`tdec_decode_eacrg`**,
//!   **`tdec_decode_eacrg_signed`**
//! - **`tdec_decode_atc_rgb4`**, **`tdec_decode_atc_rgba8`**
//! - **`tdec_decode_pvrtc(..., is_2bpp, ...)`** - PVRTC 2bpp or 4bpp
//! - **`tdec_decode_astc(..., block_size, ...)`** - ASTC with square footprints
//!
//! ### Crunched Containers
//!
//! - **`tdec_new_decoder()`** / **`tdec_free_decoder(decoder)`**
//! - **`tdec_decoder_set_crunch_unpacker(decoder, use_unity_crunch, unpacker)`**
//! - **`tdec_decode_crunched_dxt1`**, **`tdec_decode_crunched_dxt5`**,
//!   **`tdec_decode_crunched_etc1`**, **`tdec_decode_crunched_etc2a8`**
//!
//! ## Error Handling
//!
//! Decode functions return `1` on success and `0` on failure. When the `error_code` pointer is
//! non-null it receives a [`TdecErrorCode`]; [`error::tdec_error_message`] turns it into text.
//!
//! A null `data` or `out` pointer is treated as a failed pin: the `raise_out_of_memory`
//! callback of the supplied [`TdecErrorChannel`] receives
//! `"Failed to get critical array access."` and the output is left untouched.

pub mod decode;
pub mod decoder;
pub mod error;
pub mod error_channel;
pub mod unpacker;

pub use decoder::TdecDecoder;
pub use error::{TdecErrorCode, TdecResult};
pub use error_channel::TdecErrorChannel;
pub use unpacker::TdecCrunchUnpacker;
