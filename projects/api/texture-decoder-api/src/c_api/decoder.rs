//! Decoder handle management for the C API.
//!
//! A [`TdecDecoder`] carries the crunch unpackers used by the `tdec_decode_crunched_*`
//! entry points. Once configured it is immutable and may be shared between threads.

use super::error::{TdecErrorCode, TdecResult};
use super::unpacker::TdecCrunchUnpacker;
use crate::crunch::CrunchDialect;
use crate::decoder::TextureDecoder;
use alloc::boxed::Box;

/// Opaque decoder handle.
///
/// This handle must be:
///
/// - Created with [`tdec_new_decoder()`]
/// - Configured with [`tdec_decoder_set_crunch_unpacker()`]
/// - Passed to the crunched decode operations
/// - Freed with [`tdec_free_decoder()`] when no longer needed
#[repr(C)]
pub struct TdecDecoder {
    // Private field to ensure it's opaque
    _private: [u8; 0],
}

/// Create a new decoder without crunch unpackers.
///
/// The returned handle must be freed with [`tdec_free_decoder()`] when no longer needed.
#[unsafe(no_mangle)]
pub extern "C" fn tdec_new_decoder() -> *mut TdecDecoder {
    Box::into_raw(Box::new(TextureDecoder::new())) as *mut TdecDecoder
}

/// Free a decoder.
///
/// # Safety
/// - `decoder` must be a valid pointer returned by [`tdec_new_decoder()`], or null
/// - `decoder` must not have been freed already
/// - After calling this function, `decoder` becomes invalid
#[unsafe(no_mangle)]
pub unsafe extern "C" fn tdec_free_decoder(decoder: *mut TdecDecoder) {
    if !decoder.is_null() {
        unsafe {
            drop(Box::from_raw(decoder as *mut TextureDecoder));
        }
    }
}

/// Register the crunch unpacker used for one container dialect.
///
/// # Parameters
/// - `decoder`: The decoder to configure
/// - `use_unity_crunch`: `true` to set the Unity crunch unpacker, `false` for upstream crunch
/// - `unpacker`: Function table; its context must stay valid until the decoder is freed
///
/// # Safety
/// - `decoder` must be a valid pointer returned by [`tdec_new_decoder()`]
/// - `decoder` must not be in use by a decode call on another thread
#[unsafe(no_mangle)]
pub unsafe extern "C" fn tdec_decoder_set_crunch_unpacker(
    decoder: *mut TdecDecoder,
    use_unity_crunch: bool,
    unpacker: TdecCrunchUnpacker,
) -> TdecResult {
    let Some(decoder) = (unsafe { get_decoder_mut(decoder) }) else {
        return TdecResult::from_error_code(TdecErrorCode::NullDecoderPointer);
    };

    decoder.set_unpacker(CrunchDialect::from_unity_flag(use_unity_crunch), unpacker);
    TdecResult::success()
}

/// # Safety
/// - `decoder` must be null or a valid pointer returned by [`tdec_new_decoder()`]
pub(crate) unsafe fn get_decoder<'a>(decoder: *const TdecDecoder) -> Option<&'a TextureDecoder> {
    unsafe { (decoder as *const TextureDecoder).as_ref() }
}

/// # Safety
/// - `decoder` must be null or a valid pointer returned by [`tdec_new_decoder()`]
unsafe fn get_decoder_mut<'a>(decoder: *mut TdecDecoder) -> Option<&'a mut TextureDecoder> {
    unsafe { (decoder as *mut TextureDecoder).as_mut() }
}
