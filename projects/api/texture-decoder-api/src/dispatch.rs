//! Table driven dispatch from [`FormatTag`] to a block decoder.

use crate::error::DispatchError;
use crate::format::{FormatParams, FormatTag, required_input_len, required_output_len};
use likely_stable::unlikely;
use texture_decoder_codecs::{CodecError, astc, atc, bc1, bc3, bc4, bc5, bc6h, bc7, etc, pvrtc};

/// One decode call: a compressed surface and the pixels it decodes into.
#[derive(Debug)]
pub struct DecodeRequest<'a> {
    /// Compressed block data.
    pub input: &'a [u8],
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Destination, at least `width * height` RGBA8888 pixels.
    pub output: &'a mut [u32],
    /// Block codec to run.
    pub format: FormatTag,
    /// Parameters matching `format`.
    pub params: FormatParams,
}

type DecodeFn = fn(&[u8], usize, usize, &mut [u32], FormatParams) -> Result<(), CodecError>;

/// Indexed by [`FormatTag`] discriminant.
static DECODERS: [DecodeFn; FormatTag::COUNT] = [
    |data, w, h, image, _| bc1::decode_bc1(data, w, h, image),
    |data, w, h, image, _| bc3::decode_bc3(data, w, h, image),
    |data, w, h, image, _| bc4::decode_bc4(data, w, h, image),
    |data, w, h, image, _| bc5::decode_bc5(data, w, h, image),
    |data, w, h, image, _| bc6h::decode_bc6h(data, w, h, image),
    |data, w, h, image, _| bc7::decode_bc7(data, w, h, image),
    |data, w, h, image, params| pvrtc::decode_pvrtc(data, w, h, image, params.is_2bpp()),
    |data, w, h, image, _| etc::decode_etc1(data, w, h, image),
    |data, w, h, image, _| etc::decode_etc2_rgb(data, w, h, image),
    |data, w, h, image, _| etc::decode_etc2_rgba1(data, w, h, image),
    |data, w, h, image, _| etc::decode_etc2_rgba8(data, w, h, image),
    |data, w, h, image, _| atc::decode_atc_rgb(data, w, h, image),
    |data, w, h, image, _| atc::decode_atc_rgba(data, w, h, image),
    decode_astc,
    |data, w, h, image, _| etc::decode_eac_r(data, w, h, image),
    |data, w, h, image, _| etc::decode_eac_r_signed(data, w, h, image),
    |data, w, h, image, _| etc::decode_eac_rg(data, w, h, image),
    |data, w, h, image, _| etc::decode_eac_rg_signed(data, w, h, image),
];

fn decode_astc(
    data: &[u8],
    width: usize,
    height: usize,
    image: &mut [u32],
    params: FormatParams,
) -> Result<(), CodecError> {
    match params.astc_block_size() {
        Some(block_size) => astc::decode_astc(data, width, height, image, block_size.get()),
        None => Err(CodecError::UnsupportedBlockSize(0)),
    }
}

/// Decodes `request.input` into `request.output` with the decoder for `request.format`.
///
/// The parameters, the input length and the output length are validated before the decoder
/// runs; on error the output is untouched. On success exactly `width * height` pixels are
/// written, in row-major order without padding.
pub fn decode(request: DecodeRequest<'_>) -> Result<(), DispatchError> {
    let DecodeRequest {
        input,
        width,
        height,
        output,
        format,
        params,
    } = request;
    let width = width as usize;
    let height = height as usize;

    let needed = required_input_len(format, params, width, height)?;
    if unlikely(input.len() < needed) {
        return Err(DispatchError::InputTooSmall {
            needed,
            actual: input.len(),
        });
    }

    let needed = required_output_len(width, height);
    if unlikely(output.len() < needed) {
        return Err(DispatchError::OutputTooSmall {
            needed,
            actual: output.len(),
        });
    }

    DECODERS[format as usize](input, width, height, output, params)?;
    Ok(())
}
