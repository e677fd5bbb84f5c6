//! BC3 (DXT5) decoding: a BC4 alpha block followed by a four colour BC1 block.

use crate::bc1::{bc1_palette, write_indexed_4x4};
use crate::bc4::decode_bc4_channel;
use crate::error::CodecError;
use crate::surface::{decode_blocks, BlockLayout};
use multiversion::multiversion;
use texture_decoder_common::color_565::Color565;
use texture_decoder_common::color_8888::Color8888;

/// Decodes a BC3 block into RGBA8 pixels
///
/// # Parameters
///
/// - `src`: The source BC3 block (16 bytes)
/// - `dst`: Destination buffer; row `y` of the block starts at `y * stride`
/// - `stride`: Number of pixels in a row of the destination image
///
/// # Panics
///
/// If `src` is shorter than 16 bytes or `dst` cannot hold 4 rows of `stride` pixels.
#[inline]
pub fn decode_bc3_block(src: &[u8], dst: &mut [u32], stride: usize) {
    let alpha = decode_bc4_channel(&src[0..8]);

    let c0 = Color565::from_le_slice(&src[8..10]);
    let c1 = Color565::from_le_slice(&src[10..12]);
    let indices = u32::from_le_bytes([src[12], src[13], src[14], src[15]]);
    let palette = bc1_palette(c0, c1, false).map(Color8888::to_packed);

    write_indexed_4x4(&palette, indices, dst, stride);
    for y in 0..4 {
        for x in 0..4 {
            let pixel = &mut dst[y * stride + x];
            *pixel = Color8888::from_packed(*pixel)
                .with_alpha(alpha[y * 4 + x])
                .to_packed();
        }
    }
}

/// Decodes a BC3 surface of `width * height` pixels into `image`.
#[multiversion(targets(
    // x86-64-v3 without lahfsahf
    "x86_64+avx+avx2+bmi1+bmi2+cmpxchg16b+f16c+fma+fxsr+lzcnt+movbe+popcnt+sse+sse2+sse3+sse4.1+sse4.2+ssse3+xsave",
    // x86-64-v2 without lahfsahf
    "x86_64+cmpxchg16b+fxsr+popcnt+sse+sse2+sse3+sse4.1+sse4.2+ssse3",
))]
pub fn decode_bc3(
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
        decode_bc3_block,
    )
}
