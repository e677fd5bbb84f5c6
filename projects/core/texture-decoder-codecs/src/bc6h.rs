//! BC6H (unsigned half float) decoding on top of [`bcdec_rs`], tone mapped to RGBA8 by
//! clamping to `[0, 1]`.
//! https://learn.microsoft.com/en-us/windows/win32/direct3d11/bc6h-format

use crate::error::CodecError;
use crate::surface::{decode_blocks, BlockLayout};
use texture_decoder_common::color_8888::Color8888;

#[inline]
fn to_unorm8(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0 + 0.5) as u8
}

/// Decodes a BC6H block into RGBA8 pixels with the given destination row stride.
///
/// Reserved modes decode to opaque black.
///
/// # Panics
///
/// If `src` is shorter than 16 bytes or `dst` cannot hold 4 rows of `stride` pixels.
#[inline]
pub fn decode_bc6h_block(src: &[u8], dst: &mut [u32], stride: usize) {
    let mut rgb = [0f32; 4 * 4 * 3];
    bcdec_rs::bc6h_float(&src[..16], &mut rgb, 4 * 3, false);

    for (y, row) in rgb.chunks_exact(4 * 3).enumerate() {
        for (x, pixel) in row.chunks_exact(3).enumerate() {
            dst[y * stride + x] =
                Color8888::opaque(to_unorm8(pixel[0]), to_unorm8(pixel[1]), to_unorm8(pixel[2]))
                    .to_packed();
        }
    }
}

/// Decodes an unsigned BC6H surface of `width * height` pixels into `image`.
pub fn decode_bc6h(
    data: &[u8],
    width: usize,
    height: usize,
    image: &mut [u32],
) -> Result<(), CodecError> {
    decode_blocks(
        BlockLayout::FOUR_BY_FOUR_16,
        data,
        width,
        height,
        image,
        decode_bc6h_block,
    )
}
