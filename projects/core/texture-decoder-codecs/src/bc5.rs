//! BC5 (ATI2) two channel decoding.

use crate::bc4::decode_bc4_channel;
use crate::error::CodecError;
use crate::surface::{decode_blocks, BlockLayout};
use multiversion::multiversion;
use texture_decoder_common::color_8888::Color8888;

/// Decodes a BC5 block; the first channel lands in red, the second in green.
///
/// # Panics
///
/// If `src` is shorter than 16 bytes or `dst` cannot hold 4 rows of `stride` pixels.
#[inline]
pub fn decode_bc5_block(src: &[u8], dst: &mut [u32], stride: usize) {
    let red = decode_bc4_channel(&src[0..8]);
    let green = decode_bc4_channel(&src[8..16]);
    for y in 0..4 {
        for x in 0..4 {
            let i = y * 4 + x;
            dst[y * stride + x] = Color8888::new(red[i], green[i], 0, 255).to_packed();
        }
    }
}

/// Decodes a BC5 surface of `width * height` pixels into `image`.
#[multiversion(targets(
    // x86-64-v3 without lahfsahf
    "x86_64+avx+avx2+bmi1+bmi2+cmpxchg16b+f16c+fma+fxsr+lzcnt+movbe+popcnt+sse+sse2+sse3+sse4.1+sse4.2+ssse3+xsave",
    // x86-64-v2 without lahfsahf
    "x86_64+cmpxchg16b+fxsr+popcnt+sse+sse2+sse3+sse4.1+sse4.2+ssse3",
))]
pub fn decode_bc5(
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
        decode_bc5_block,
    )
}
