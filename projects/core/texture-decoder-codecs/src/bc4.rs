//! BC4 (ATI1) single channel decoding.
//!
//! The 8 byte alpha block defined here is shared by BC3, BC5 and ATC RGBA.

use crate::error::CodecError;
use crate::surface::{decode_blocks, BlockLayout};
use multiversion::multiversion;
use texture_decoder_common::color_8888::Color8888;

/// Expands the two endpoints of a BC4 block into its 8 entry palette.
#[inline]
pub(crate) fn bc4_palette(e0: u8, e1: u8) -> [u8; 8] {
    let (a0, a1) = (e0 as u32, e1 as u32);
    let mut palette = [e0, e1, 0, 0, 0, 0, 0, 0];
    if e0 > e1 {
        for i in 1..7u32 {
            palette[i as usize + 1] = (((7 - i) * a0 + i * a1) / 7) as u8;
        }
    } else {
        for i in 1..5u32 {
            palette[i as usize + 1] = (((5 - i) * a0 + i * a1) / 5) as u8;
        }
        palette[6] = 0;
        palette[7] = 255;
    }
    palette
}

/// Decodes the 16 channel values of an 8 byte BC4 block in row-major order.
#[inline]
pub(crate) fn decode_bc4_channel(src: &[u8]) -> [u8; 16] {
    let palette = bc4_palette(src[0], src[1]);
    let indices = u64::from_le_bytes([src[2], src[3], src[4], src[5], src[6], src[7], 0, 0]);

    let mut values = [0u8; 16];
    for (i, value) in values.iter_mut().enumerate() {
        *value = palette[((indices >> (i * 3)) & 0x7) as usize];
    }
    values
}

/// Decodes a BC4 block; the channel lands in red, green and blue are 0, alpha is opaque.
///
/// # Panics
///
/// If `src` is shorter than 8 bytes or `dst` cannot hold 4 rows of `stride` pixels.
#[inline]
pub fn decode_bc4_block(src: &[u8], dst: &mut [u32], stride: usize) {
    let red = decode_bc4_channel(&src[0..8]);
    for y in 0..4 {
        for x in 0..4 {
            dst[y * stride + x] = Color8888::new(red[y * 4 + x], 0, 0, 255).to_packed();
        }
    }
}

/// Decodes a BC4 surface of `width * height` pixels into `image`.
#[multiversion(targets(
    // x86-64-v3 without lahfsahf
    "x86_64+avx+avx2+bmi1+bmi2+cmpxchg16b+f16c+fma+fxsr+lzcnt+movbe+popcnt+sse+sse2+sse3+sse4.1+sse4.2+ssse3+xsave",
    // x86-64-v2 without lahfsahf
    "x86_64+cmpxchg16b+fxsr+popcnt+sse+sse2+sse3+sse4.1+sse4.2+ssse3",
))]
pub fn decode_bc4(
    data: &[u8],
    width: usize,
    height: usize,
    image: &mut [u32],
) -> Result<(), CodecError> {
    decode_blocks(
        BlockLayout::FOUR_BY_FOUR_8,
        data,
        width,
        height,
        image,
        decode_bc4_block,
    )
}
