//! ATC (AMD/Qualcomm Adreno) decoding.
//!
//! The colour block resembles BC1 with a 555 first endpoint whose top bit picks the
//! interpolation method. ATC RGBA with interpolated alpha prepends a BC4 style alpha block.

use crate::bc1::write_indexed_4x4;
use crate::bc4::decode_bc4_channel;
use crate::error::CodecError;
use crate::surface::{decode_blocks, BlockLayout};
use texture_decoder_common::color_565::Color565;
use texture_decoder_common::color_8888::Color8888;

#[inline]
const fn expand5(value: u16) -> u32 {
    ((value << 3) | (value >> 2)) as u32
}

/// Palette of an 8 byte ATC colour block.
fn atc_palette(src: &[u8]) -> [Color8888; 4] {
    let c0 = u16::from_le_bytes([src[0], src[1]]);
    let c1 = Color565::from_le_slice(&src[2..4]).to_color_8888();

    let r0 = expand5((c0 >> 10) & 0x1F);
    let g0 = expand5((c0 >> 5) & 0x1F);
    let b0 = expand5(c0 & 0x1F);
    let (r1, g1, b1) = (c1.r as u32, c1.g as u32, c1.b as u32);

    if c0 & 0x8000 == 0 {
        [
            Color8888::opaque(r0 as u8, g0 as u8, b0 as u8),
            Color8888::opaque(
                ((5 * r0 + 3 * r1) / 8) as u8,
                ((5 * g0 + 3 * g1) / 8) as u8,
                ((5 * b0 + 3 * b1) / 8) as u8,
            ),
            Color8888::opaque(
                ((3 * r0 + 5 * r1) / 8) as u8,
                ((3 * g0 + 5 * g1) / 8) as u8,
                ((3 * b0 + 5 * b1) / 8) as u8,
            ),
            c1,
        ]
    } else {
        [
            Color8888::opaque(0, 0, 0),
            Color8888::opaque(
                r0.saturating_sub(r1 / 4) as u8,
                g0.saturating_sub(g1 / 4) as u8,
                b0.saturating_sub(b1 / 4) as u8,
            ),
            Color8888::opaque(r0 as u8, g0 as u8, b0 as u8),
            c1,
        ]
    }
}

/// Decodes an ATC RGB block into RGBA8 pixels with the given destination row stride.
///
/// # Panics
///
/// If `src` is shorter than 8 bytes or `dst` cannot hold 4 rows of `stride` pixels.
#[inline]
pub fn decode_atc_rgb_block(src: &[u8], dst: &mut [u32], stride: usize) {
    let palette = atc_palette(src).map(Color8888::to_packed);
    let indices = u32::from_le_bytes([src[4], src[5], src[6], src[7]]);
    write_indexed_4x4(&palette, indices, dst, stride);
}

/// Decodes an ATC RGBA (interpolated alpha) block.
///
/// # Panics
///
/// If `src` is shorter than 16 bytes or `dst` cannot hold 4 rows of `stride` pixels.
#[inline]
pub fn decode_atc_rgba_block(src: &[u8], dst: &mut [u32], stride: usize) {
    let alpha = decode_bc4_channel(&src[0..8]);
    decode_atc_rgb_block(&src[8..16], dst, stride);
    for y in 0..4 {
        for x in 0..4 {
            let pixel = &mut dst[y * stride + x];
            *pixel = Color8888::from_packed(*pixel)
                .with_alpha(alpha[y * 4 + x])
                .to_packed();
        }
    }
}

/// Decodes an ATC RGB surface of `width * height` pixels into `image`.
pub fn decode_atc_rgb(
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
        decode_atc_rgb_block,
    )
}

/// Decodes an ATC RGBA (interpolated alpha) surface of `width * height` pixels into `image`.
pub fn decode_atc_rgba(
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
        decode_atc_rgba_block,
    )
}
