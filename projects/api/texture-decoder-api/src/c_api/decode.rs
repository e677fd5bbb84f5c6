//! Per-format C entry points.
//!
//! Every entry point returns `1` when the output was fully written and `0` otherwise. The
//! precise reason is stored in `error_code` when it is non-null.
//!
//! # Safety
//!
//! For every function in this module:
//!
//! - `data` must be null or valid for reads of `data_len` bytes
//! - `out` must be null or valid for reads and writes of `out_len` pixels
//! - `data` and `out` must not overlap
//! - `error_channel` and `error_code` must be null or valid pointers
//! - a null `data` or `out` is a pin failure: the error channel is raised and `0` returned
//!
//! The crunched entry points additionally require `decoder` to be null or a valid pointer
//! returned by [`super::decoder::tdec_new_decoder()`].

use super::decoder::get_decoder;
use super::error::{TdecErrorCode, TdecResult};
use super::error_channel::TdecErrorChannel;
use crate::crunch::{CrunchDialect, CrunchedFormat};
use crate::decoder::{CrunchedDesc, TextureDecoder};
use crate::format::{AstcBlockSize, FormatParams, FormatTag, SurfaceDesc};
use crate::pinning::{RawBuffer, RawBufferMut};

/// Decoder used by the entry points that never unpack crunch containers.
static PLAIN_DECODER: TextureDecoder = TextureDecoder::new();

enum Request {
    Plain(SurfaceDesc),
    Crunched(CrunchedDesc),
}

unsafe fn write_error_code(error_code: *mut TdecErrorCode, code: TdecErrorCode) {
    if let Some(slot) = unsafe { error_code.as_mut() } {
        *slot = code;
    }
}

#[allow(clippy::too_many_arguments)]
unsafe fn run(
    decoder: &TextureDecoder,
    data: *const u8,
    data_len: usize,
    out: *mut u32,
    out_len: usize,
    request: Request,
    error_channel: *const TdecErrorChannel,
    error_code: *mut TdecErrorCode,
) -> i32 {
    let mut input = unsafe { RawBuffer::new(data, data_len) };
    let mut output = unsafe { RawBufferMut::new(out, out_len) };
    let mut channel = unsafe { error_channel.as_ref() }
        .copied()
        .unwrap_or(TdecErrorChannel::ignore());

    let result = match request {
        Request::Plain(desc) => decoder.decode(&mut input, &mut output, desc, &mut channel),
        Request::Crunched(desc) => {
            decoder.decode_crunched(&mut input, &mut output, desc, &mut channel)
        }
    };

    let result = TdecResult::from(result);
    unsafe { write_error_code(error_code, result.error_code) };
    result.status()
}

macro_rules! plain_entry_points {
    ($($(#[$doc:meta])* $name:ident => $format:ident;)*) => {$(
        $(#[$doc])*
        ///
        /// # Safety
        /// See the [module documentation](self).
        #[unsafe(no_mangle)]
        #[allow(clippy::too_many_arguments)]
        pub unsafe extern "C" fn $name(
            data: *const u8,
            data_len: usize,
            width: u32,
            height: u32,
            out: *mut u32,
            out_len: usize,
            error_channel: *const TdecErrorChannel,
            error_code: *mut TdecErrorCode,
        ) -> i32 {
            let desc = SurfaceDesc::new(FormatTag::$format, width, height);
            unsafe {
                run(
                    &PLAIN_DECODER,
                    data,
                    data_len,
                    out,
                    out_len,
                    Request::Plain(desc),
                    error_channel,
                    error_code,
                )
            }
        }
    )*};
}

plain_entry_points! {
    /// Decode a BC1 (DXT1) surface.
    tdec_decode_dxt1 => Bc1;
    /// Decode a BC3 (DXT5) surface.
    tdec_decode_dxt5 => Bc3;
    /// Decode a BC4 surface.
    tdec_decode_bc4 => Bc4;
    /// Decode a BC5 surface.
    tdec_decode_bc5 => Bc5;
    /// Decode a BC6H surface, tone mapped to 8 bits.
    tdec_decode_bc6 => Bc6;
    /// Decode a BC7 surface.
    tdec_decode_bc7 => Bc7;
    /// Decode an ETC1 surface.
    tdec_decode_etc1 => Etc1;
    /// Decode an ETC2 RGB surface.
    tdec_decode_etc2 => Etc2;
    /// Decode an ETC2 RGB surface with punch-through alpha.
    tdec_decode_etc2a1 => Etc2A1;
    /// Decode an ETC2 RGBA surface.
    tdec_decode_etc2a8 => Etc2A8;
    /// Decode an ATC RGB surface.
    tdec_decode_atc_rgb4 => AtcRgb4;
    /// Decode an ATC RGBA surface.
    tdec_decode_atc_rgba8 => AtcRgba8;
    /// Decode an EAC R11 surface.
    tdec_decode_eacr => EacR;
    /// Decode a signed EAC R11 surface.
    tdec_decode_eacr_signed => EacRSigned;
    /// Decode an EAC RG11 surface.
    tdec_decode_eacrg => EacRg;
    /// Decode a signed EAC RG11 surface.
    tdec_decode_eacrg_signed => EacRgSigned;
}

/// Decode a PVRTC surface; `is_2bpp` selects the 2bpp layout over 4bpp.
///
/// # Safety
/// See the [module documentation](self).
#[unsafe(no_mangle)]
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn tdec_decode_pvrtc(
    data: *const u8,
    data_len: usize,
    width: u32,
    height: u32,
    out: *mut u32,
    out_len: usize,
    is_2bpp: bool,
    error_channel: *const TdecErrorChannel,
    error_code: *mut TdecErrorCode,
) -> i32 {
    let desc = SurfaceDesc::new(FormatTag::Pvrtc, width, height)
        .with_params(FormatParams::Pvrtc { is_2bpp });
    unsafe {
        run(
            &PLAIN_DECODER,
            data,
            data_len,
            out,
            out_len,
            Request::Plain(desc),
            error_channel,
            error_code,
        )
    }
}

/// Decode an ASTC surface with square `block_size x block_size` footprints.
///
/// Block sizes other than 4, 5, 6, 8, 10 and 12 fail with
/// [`TdecErrorCode::InvalidFormatParams`] without touching either buffer.
///
/// # Safety
/// See the [module documentation](self).
#[unsafe(no_mangle)]
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn tdec_decode_astc(
    data: *const u8,
    data_len: usize,
    width: u32,
    height: u32,
    out: *mut u32,
    out_len: usize,
    block_size: u32,
    error_channel: *const TdecErrorChannel,
    error_code: *mut TdecErrorCode,
) -> i32 {
    let block_size = u8::try_from(block_size).ok().and_then(AstcBlockSize::new);
    let Some(block_size) = block_size else {
        unsafe { write_error_code(error_code, TdecErrorCode::InvalidFormatParams) };
        return 0;
    };

    let desc = SurfaceDesc::new(FormatTag::Astc, width, height)
        .with_params(FormatParams::Astc { block_size });
    unsafe {
        run(
            &PLAIN_DECODER,
            data,
            data_len,
            out,
            out_len,
            Request::Plain(desc),
            error_channel,
            error_code,
        )
    }
}

macro_rules! crunched_entry_points {
    ($($(#[$doc:meta])* $name:ident => $format:ident;)*) => {$(
        $(#[$doc])*
        ///
        /// `use_unity_crunch` selects the Unity crunch unpacker registered on `decoder`
        /// instead of the upstream one.
        ///
        /// # Safety
        /// See the [module documentation](self).
        #[unsafe(no_mangle)]
        #[allow(clippy::too_many_arguments)]
        pub unsafe extern "C" fn $name(
            decoder: *const super::decoder::TdecDecoder,
            data: *const u8,
            data_len: usize,
            width: u32,
            height: u32,
            out: *mut u32,
            out_len: usize,
            use_unity_crunch: bool,
            error_channel: *const TdecErrorChannel,
            error_code: *mut TdecErrorCode,
        ) -> i32 {
            let Some(decoder) = (unsafe { get_decoder(decoder) }) else {
                unsafe { write_error_code(error_code, TdecErrorCode::NullDecoderPointer) };
                return 0;
            };

            let desc = CrunchedDesc::new(
                CrunchedFormat::$format,
                CrunchDialect::from_unity_flag(use_unity_crunch),
                width,
                height,
            );
            unsafe {
                run(
                    decoder,
                    data,
                    data_len,
                    out,
                    out_len,
                    Request::Crunched(desc),
                    error_channel,
                    error_code,
                )
            }
        }
    )*};
}

crunched_entry_points! {
    /// Unpack mip level 0 of a crunched DXT1 container and decode it.
    tdec_decode_crunched_dxt1 => Dxt1;
    /// Unpack mip level 0 of a crunched DXT5 container and decode it.
    tdec_decode_crunched_dxt5 => Dxt5;
    /// Unpack mip level 0 of a crunched ETC1 container and decode it.
    tdec_decode_crunched_etc1 => Etc1;
    /// Unpack mip level 0 of a crunched ETC2A8 container and decode it.
    tdec_decode_crunched_etc2a8 => Etc2A8;
}
