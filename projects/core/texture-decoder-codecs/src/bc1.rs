//! BC1 (DXT1) decoding; based on etcpak
//! https://github.com/wolfpld/etcpak and MSDN
//! https://learn.microsoft.com/en-us/windows/win32/direct3d9/opaque-and-1-bit-alpha-textures

use crate::error::CodecError;
use crate::surface::{decode_blocks, BlockLayout};
use multiversion::multiversion;
use texture_decoder_common::color_565::Color565;
use texture_decoder_common::color_8888::Color8888;

/// Builds the 4 entry palette for a BC1 style colour block.
///
/// With `allow_punch_through` set, blocks where `c0 <= c1` use three colour mode and index 3
/// decodes to transparent black. BC3 and friends always use four colour mode.
#[inline]
pub(crate) fn bc1_palette(c0: Color565, c1: Color565, allow_punch_through: bool) -> [Color8888; 4] {
    let p0 = c0.to_color_8888();
    let p1 = c1.to_color_8888();
    let (r0, g0, b0) = (p0.r as u32, p0.g as u32, p0.b as u32);
    let (r1, g1, b1) = (p1.r as u32, p1.g as u32, p1.b as u32);

    if !allow_punch_through || c0.greater_than(&c1) {
        [
            p0,
            p1,
            Color8888::opaque(
                ((2 * r0 + r1) / 3) as u8,
                ((2 * g0 + g1) / 3) as u8,
                ((2 * b0 + b1) / 3) as u8,
            ),
            Color8888::opaque(
                ((r0 + 2 * r1) / 3) as u8,
                ((g0 + 2 * g1) / 3) as u8,
                ((b0 + 2 * b1) / 3) as u8,
            ),
        ]
    } else {
        [
            p0,
            p1,
            Color8888::opaque(
                ((r0 + r1) / 2) as u8,
                ((g0 + g1) / 2) as u8,
                ((b0 + b1) / 2) as u8,
            ),
            Color8888::TRANSPARENT_BLACK,
        ]
    }
}

/// Writes 16 pixels selected by 2-bit indices (pixel 0 in the lowest bits).
#[inline]
pub(crate) fn write_indexed_4x4(palette: &[u32; 4], indices: u32, dst: &mut [u32], stride: usize) {
    let mut index_pos = 0;
    for y in 0..4 {
        let row = &mut dst[y * stride..y * stride + 4];
        for pixel in row.iter_mut() {
            *pixel = palette[((indices >> index_pos) & 0x3) as usize];
            index_pos += 2;
        }
    }
}

/// Decodes a BC1 block into RGBA8 pixels
///
/// # Parameters
///
/// - `src`: The source BC1 block (8 bytes)
/// - `dst`: Destination buffer; row `y` of the block starts at `y * stride`
/// - `stride`: Number of pixels in a row of the destination image
///
/// # Example
///
/// ```
/// use texture_decoder_codecs::bc1::decode_bc1_block;
///
/// let mut pixels = [0u32; 16]; // 4x4 block of pixels
/// let bc1_block = [0u8; 8]; // Compressed BC1 block
///
/// decode_bc1_block(&bc1_block, &mut pixels, 4);
/// ```
///
/// # Panics
///
/// If `src` is shorter than 8 bytes or `dst` cannot hold 4 rows of `stride` pixels.
#[inline]
pub fn decode_bc1_block(src: &[u8], dst: &mut [u32], stride: usize) {
    let c0 = Color565::from_le_slice(&src[0..2]);
    let c1 = Color565::from_le_slice(&src[2..4]);
    let indices = u32::from_le_bytes([src[4], src[5], src[6], src[7]]);

    let palette = bc1_palette(c0, c1, true).map(Color8888::to_packed);
    write_indexed_4x4(&palette, indices, dst, stride);
}

/// Decodes a BC1 surface of `width * height` pixels into `image`.
#[multiversion(targets(
    // x86-64-v3 without lahfsahf
    "x86_64+avx+avx2+bmi1+bmi2+cmpxchg16b+f16c+fma+fxsr+lzcnt+movbe+popcnt+sse+sse2+sse3+sse4.1+sse4.2+ssse3+xsave",
    // x86-64-v2 without lahfsahf
    "x86_64+cmpxchg16b+fxsr+popcnt+sse+sse2+sse3+sse4.1+sse4.2+ssse3",
))]
pub fn decode_bc1(
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
        decode_bc1_block,
    )
}
