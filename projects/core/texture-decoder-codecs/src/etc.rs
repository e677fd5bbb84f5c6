//! ETC1, ETC2 and EAC decoding.
//!
//! Layout per the Khronos Data Format Specification, section "ETC2 Compressed Texture Image Formats".
//! Pixel indices in every ETC/EAC block are stored column-major: pixel `(x, y)` is entry `x * 4 + y`.

use crate::error::CodecError;
use crate::surface::{decode_blocks, BlockLayout};
use texture_decoder_common::color_8888::Color8888;

/// Intensity modifiers per table codeword, ordered by pixel index value.
const INTENSITY_MODIFIERS: [[i32; 4]; 8] = [
    [2, 8, -2, -8],
    [5, 17, -5, -17],
    [9, 29, -9, -29],
    [13, 42, -13, -42],
    [18, 60, -18, -60],
    [24, 80, -24, -80],
    [33, 106, -33, -106],
    [47, 183, -47, -183],
];

/// Paint colour distances for the T and H modes.
const DISTANCES: [i32; 8] = [3, 6, 11, 16, 23, 32, 41, 64];

#[rustfmt::skip]
const EAC_MODIFIERS: [[i32; 8]; 16] = [
    [-3, -6, -9, -15, 2, 5, 8, 14],
    [-3, -7, -10, -13, 2, 6, 9, 12],
    [-2, -5, -8, -13, 1, 4, 7, 12],
    [-2, -4, -6, -13, 1, 3, 5, 12],
    [-3, -6, -8, -12, 2, 5, 7, 11],
    [-3, -7, -9, -11, 2, 6, 8, 10],
    [-4, -7, -8, -11, 3, 6, 7, 10],
    [-3, -5, -8, -11, 2, 4, 7, 10],
    [-2, -6, -8, -10, 1, 5, 7, 9],
    [-2, -5, -8, -10, 1, 4, 7, 9],
    [-2, -4, -8, -10, 1, 3, 7, 9],
    [-2, -5, -7, -10, 1, 4, 6, 9],
    [-3, -4, -7, -10, 2, 3, 6, 9],
    [-1, -2, -3, -10, 0, 1, 2, 9],
    [-4, -6, -8, -9, 3, 5, 7, 8],
    [-3, -5, -7, -9, 2, 4, 6, 8],
];

#[inline]
const fn expand4(value: u8) -> i32 {
    (value as i32) * 17
}

#[inline]
const fn expand5(value: u8) -> i32 {
    ((value as i32) << 3) | ((value as i32) >> 2)
}

#[inline]
const fn expand6(value: u8) -> i32 {
    ((value as i32) << 2) | ((value as i32) >> 4)
}

#[inline]
const fn expand7(value: u8) -> i32 {
    ((value as i32) << 1) | ((value as i32) >> 6)
}

#[inline]
fn clamp_u8(value: i32) -> u8 {
    value.clamp(0, 255) as u8
}

#[inline]
fn offset(color: [i32; 3], amount: i32) -> Color8888 {
    Color8888::opaque(
        clamp_u8(color[0] + amount),
        clamp_u8(color[1] + amount),
        clamp_u8(color[2] + amount),
    )
}

/// 2-bit pixel index of `(x, y)`; the MSB plane sits in the upper 16 bits.
#[inline]
fn pixel_index(indices: u32, x: usize, y: usize) -> usize {
    let i = x * 4 + y;
    ((((indices >> (i + 16)) & 1) << 1) | ((indices >> i) & 1)) as usize
}

/// Which ETC dialect a colour block is read in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColorDialect {
    Etc1,
    Etc2,
    /// ETC2 with the differential bit reused as the "opaque" flag.
    Etc2PunchThrough,
}

/// Decodes an 8 byte ETC1/ETC2 colour block into 16 colours in row-major order.
fn unpack_color_block(src: &[u8], dialect: ColorDialect) -> [Color8888; 16] {
    let indices = u32::from_be_bytes([src[4], src[5], src[6], src[7]]);
    let diff_bit = src[3] & 0x2 != 0;
    let flip = src[3] & 0x1 != 0;
    let opaque = dialect != ColorDialect::Etc2PunchThrough || diff_bit;
    let differential = dialect == ColorDialect::Etc2PunchThrough || diff_bit;

    let (base1, base2) = if differential {
        let r = src[0] >> 3;
        let g = src[1] >> 3;
        let b = src[2] >> 3;
        let r2 = r as i32 + extend_delta(src[0]);
        let g2 = g as i32 + extend_delta(src[1]);
        let b2 = b as i32 + extend_delta(src[2]);

        if dialect != ColorDialect::Etc1 {
            if !(0..32).contains(&r2) {
                return unpack_t_mode(src, indices, opaque);
            }
            if !(0..32).contains(&g2) {
                return unpack_h_mode(src, indices, opaque);
            }
            if !(0..32).contains(&b2) {
                return unpack_planar(src);
            }
        }

        (
            [expand5(r), expand5(g), expand5(b)],
            [
                expand5((r2 & 0x1F) as u8),
                expand5((g2 & 0x1F) as u8),
                expand5((b2 & 0x1F) as u8),
            ],
        )
    } else {
        (
            [expand4(src[0] >> 4), expand4(src[1] >> 4), expand4(src[2] >> 4)],
            [expand4(src[0] & 0xF), expand4(src[1] & 0xF), expand4(src[2] & 0xF)],
        )
    };

    let tables = [
        &INTENSITY_MODIFIERS[(src[3] >> 5) as usize],
        &INTENSITY_MODIFIERS[((src[3] >> 2) & 0x7) as usize],
    ];

    let mut pixels = [Color8888::TRANSPARENT_BLACK; 16];
    for y in 0..4 {
        for x in 0..4 {
            let second = if flip { y >= 2 } else { x >= 2 };
            let (base, table) = if second {
                (base2, tables[1])
            } else {
                (base1, tables[0])
            };
            let index = pixel_index(indices, x, y);
            pixels[y * 4 + x] = match (opaque, index) {
                (false, 2) => Color8888::TRANSPARENT_BLACK,
                (false, 0) => offset(base, 0),
                _ => offset(base, table[index]),
            };
        }
    }
    pixels
}

/// Sign extends the 3-bit delta stored in the low bits of `byte`.
#[inline]
fn extend_delta(byte: u8) -> i32 {
    (((byte & 0x7) as i32) << 29) >> 29
}

/// Resolves paint colours for T and H mode blocks.
#[inline]
fn paint_pixels(indices: u32, paint: [Color8888; 4], opaque: bool) -> [Color8888; 16] {
    let mut pixels = [Color8888::TRANSPARENT_BLACK; 16];
    for y in 0..4 {
        for x in 0..4 {
            let index = pixel_index(indices, x, y);
            if opaque || index != 2 {
                pixels[y * 4 + x] = paint[index];
            }
        }
    }
    pixels
}

fn unpack_t_mode(src: &[u8], indices: u32, opaque: bool) -> [Color8888; 16] {
    let r1 = ((src[0] >> 1) & 0xC) | (src[0] & 0x3);
    let c1 = [expand4(r1), expand4(src[1] >> 4), expand4(src[1] & 0xF)];
    let c2 = [
        expand4(src[2] >> 4),
        expand4(src[2] & 0xF),
        expand4(src[3] >> 4),
    ];
    let distance = DISTANCES[(((src[3] >> 1) & 0x6) | (src[3] & 0x1)) as usize];

    let paint = [
        offset(c1, 0),
        offset(c2, distance),
        offset(c2, 0),
        offset(c2, -distance),
    ];
    paint_pixels(indices, paint, opaque)
}

fn unpack_h_mode(src: &[u8], indices: u32, opaque: bool) -> [Color8888; 16] {
    let r1 = (src[0] >> 3) & 0xF;
    let g1 = ((src[0] & 0x7) << 1) | ((src[1] >> 4) & 0x1);
    let b1 = (src[1] & 0x8) | ((src[1] & 0x3) << 1) | (src[2] >> 7);
    let r2 = (src[2] >> 3) & 0xF;
    let g2 = ((src[2] & 0x7) << 1) | (src[3] >> 7);
    let b2 = (src[3] >> 3) & 0xF;

    let packed1 = ((r1 as u32) << 8) | ((g1 as u32) << 4) | b1 as u32;
    let packed2 = ((r2 as u32) << 8) | ((g2 as u32) << 4) | b2 as u32;
    let distance_index = (src[3] & 0x4) | ((src[3] & 0x1) << 1) | (packed1 >= packed2) as u8;
    let distance = DISTANCES[distance_index as usize];

    let c1 = [expand4(r1), expand4(g1), expand4(b1)];
    let c2 = [expand4(r2), expand4(g2), expand4(b2)];
    let paint = [
        offset(c1, distance),
        offset(c1, -distance),
        offset(c2, distance),
        offset(c2, -distance),
    ];
    paint_pixels(indices, paint, opaque)
}

fn unpack_planar(src: &[u8]) -> [Color8888; 16] {
    let ro = (src[0] >> 1) & 0x3F;
    let go = ((src[0] & 0x1) << 6) | ((src[1] >> 1) & 0x3F);
    let bo = ((src[1] & 0x1) << 5) | (((src[2] >> 3) & 0x3) << 3) | ((src[2] & 0x3) << 1) | (src[3] >> 7);
    let rh = (((src[3] >> 2) & 0x1F) << 1) | (src[3] & 0x1);
    let gh = src[4] >> 1;
    let bh = ((src[4] & 0x1) << 5) | (src[5] >> 3);
    let rv = ((src[5] & 0x7) << 3) | (src[6] >> 5);
    let gv = ((src[6] & 0x1F) << 2) | (src[7] >> 6);
    let bv = src[7] & 0x3F;

    let origin = [expand6(ro), expand7(go), expand6(bo)];
    let horizontal = [expand6(rh), expand7(gh), expand6(bh)];
    let vertical = [expand6(rv), expand7(gv), expand6(bv)];

    let mut pixels = [Color8888::TRANSPARENT_BLACK; 16];
    for y in 0..4 {
        for x in 0..4 {
            let channel = |c: usize| {
                let (x, y) = (x as i32, y as i32);
                clamp_u8(
                    (x * (horizontal[c] - origin[c])
                        + y * (vertical[c] - origin[c])
                        + 4 * origin[c]
                        + 2)
                        >> 2,
                )
            };
            pixels[y * 4 + x] = Color8888::opaque(channel(0), channel(1), channel(2));
        }
    }
    pixels
}

/// Reads the 16 3-bit EAC indices of a block, row-major.
#[inline]
fn eac_indices(src: &[u8]) -> [usize; 16] {
    let bits = u64::from_be_bytes([0, 0, src[2], src[3], src[4], src[5], src[6], src[7]]);
    let mut indices = [0usize; 16];
    for x in 0..4 {
        for y in 0..4 {
            let i = x * 4 + y;
            indices[y * 4 + x] = ((bits >> (45 - 3 * i)) & 0x7) as usize;
        }
    }
    indices
}

/// Decodes an 8 byte ETC2 alpha block (EAC, 8-bit) into row-major alpha values.
fn unpack_eac_alpha(src: &[u8]) -> [u8; 16] {
    let base = src[0] as i32;
    let multiplier = (src[1] >> 4) as i32;
    let table = &EAC_MODIFIERS[(src[1] & 0xF) as usize];
    eac_indices(src).map(|index| clamp_u8(base + table[index] * multiplier))
}

/// Decodes an 8 byte EAC R11 block into row-major 8-bit values.
///
/// 11-bit results are narrowed by dropping the low three bits; signed blocks are biased by 1024 first.
fn unpack_eac_r11(src: &[u8], signed: bool) -> [u8; 16] {
    let multiplier = (src[1] >> 4) as i32;
    let table = &EAC_MODIFIERS[(src[1] & 0xF) as usize];
    let scale = |modifier: i32| {
        if multiplier == 0 {
            modifier
        } else {
            modifier * multiplier * 8
        }
    };

    if signed {
        let base = (src[0] as i8 as i32).max(-127) * 8;
        eac_indices(src).map(|index| {
            let value = (base + scale(table[index])).clamp(-1023, 1023);
            ((value + 1024) >> 3) as u8
        })
    } else {
        let base = src[0] as i32 * 8 + 4;
        eac_indices(src).map(|index| {
            let value = (base + scale(table[index])).clamp(0, 2047);
            (value >> 3) as u8
        })
    }
}

#[inline]
fn write_block(pixels: &[Color8888; 16], dst: &mut [u32], stride: usize) {
    for y in 0..4 {
        for x in 0..4 {
            dst[y * stride + x] = pixels[y * 4 + x].to_packed();
        }
    }
}

/// Decodes an ETC1 block into RGBA8 pixels with the given destination row stride.
///
/// # Panics
///
/// If `src` is shorter than 8 bytes or `dst` cannot hold 4 rows of `stride` pixels.
pub fn decode_etc1_block(src: &[u8], dst: &mut [u32], stride: usize) {
    write_block(&unpack_color_block(src, ColorDialect::Etc1), dst, stride);
}

/// Decodes an ETC2 RGB block.
pub fn decode_etc2_rgb_block(src: &[u8], dst: &mut [u32], stride: usize) {
    write_block(&unpack_color_block(src, ColorDialect::Etc2), dst, stride);
}

/// Decodes an ETC2 RGB block with punch-through alpha.
pub fn decode_etc2_rgba1_block(src: &[u8], dst: &mut [u32], stride: usize) {
    write_block(
        &unpack_color_block(src, ColorDialect::Etc2PunchThrough),
        dst,
        stride,
    );
}

/// Decodes an ETC2 RGBA8 block: an EAC alpha block followed by an ETC2 RGB block.
pub fn decode_etc2_rgba8_block(src: &[u8], dst: &mut [u32], stride: usize) {
    let alpha = unpack_eac_alpha(&src[0..8]);
    let mut pixels = unpack_color_block(&src[8..16], ColorDialect::Etc2);
    for (pixel, alpha) in pixels.iter_mut().zip(alpha) {
        *pixel = pixel.with_alpha(alpha);
    }
    write_block(&pixels, dst, stride);
}

fn write_eac(red: [u8; 16], green: Option<[u8; 16]>, dst: &mut [u32], stride: usize) {
    for y in 0..4 {
        for x in 0..4 {
            let i = y * 4 + x;
            let g = green.map_or(0, |green| green[i]);
            dst[y * stride + x] = Color8888::new(red[i], g, 0, 255).to_packed();
        }
    }
}

/// Decodes an unsigned EAC R11 block into the red channel.
pub fn decode_eac_r_block(src: &[u8], dst: &mut [u32], stride: usize) {
    write_eac(unpack_eac_r11(&src[0..8], false), None, dst, stride);
}

/// Decodes a signed EAC R11 block into the red channel.
pub fn decode_eac_r_signed_block(src: &[u8], dst: &mut [u32], stride: usize) {
    write_eac(unpack_eac_r11(&src[0..8], true), None, dst, stride);
}

/// Decodes an unsigned EAC RG11 block into the red and green channels.
pub fn decode_eac_rg_block(src: &[u8], dst: &mut [u32], stride: usize) {
    write_eac(
        unpack_eac_r11(&src[0..8], false),
        Some(unpack_eac_r11(&src[8..16], false)),
        dst,
        stride,
    );
}

/// Decodes a signed EAC RG11 block into the red and green channels.
pub fn decode_eac_rg_signed_block(src: &[u8], dst: &mut [u32], stride: usize) {
    write_eac(
        unpack_eac_r11(&src[0..8], true),
        Some(unpack_eac_r11(&src[8..16], true)),
        dst,
        stride,
    );
}

macro_rules! surface_decoder {
    ($(#[$meta:meta])* $name:ident, $block:ident, $layout:expr) => {
        $(#[$meta])*
        pub fn $name(
            data: &[u8],
            width: usize,
            height: usize,
            image: &mut [u32],
        ) -> Result<(), CodecError> {
            decode_blocks($layout, data, width, height, image, $block)
        }
    };
}

surface_decoder!(
    /// Decodes an ETC1 surface of `width * height` pixels into `image`.
    decode_etc1, decode_etc1_block, BlockLayout::FOUR_BY_FOUR_8
);
surface_decoder!(
    /// Decodes an ETC2 RGB surface of `width * height` pixels into `image`.
    decode_etc2_rgb, decode_etc2_rgb_block, BlockLayout::FOUR_BY_FOUR_8
);
surface_decoder!(
    /// Decodes an ETC2 RGB A1 (punch-through) surface of `width * height` pixels into `image`.
    decode_etc2_rgba1, decode_etc2_rgba1_block, BlockLayout::FOUR_BY_FOUR_8
);
surface_decoder!(
    /// Decodes an ETC2 RGBA8 surface of `width * height` pixels into `image`.
    decode_etc2_rgba8, decode_etc2_rgba8_block, BlockLayout::FOUR_BY_FOUR_16
);
surface_decoder!(
    /// Decodes an unsigned EAC R11 surface of `width * height` pixels into `image`.
    decode_eac_r, decode_eac_r_block, BlockLayout::FOUR_BY_FOUR_8
);
surface_decoder!(
    /// Decodes a signed EAC R11 surface of `width * height` pixels into `image`.
    decode_eac_r_signed, decode_eac_r_signed_block, BlockLayout::FOUR_BY_FOUR_8
);
surface_decoder!(
    /// Decodes an unsigned EAC RG11 surface of `width * height` pixels into `image`.
    decode_eac_rg, decode_eac_rg_block, BlockLayout::FOUR_BY_FOUR_16
);
surface_decoder!(
    /// Decodes a signed EAC RG11 surface of `width * height` pixels into `image`.
    decode_eac_rg_signed, decode_eac_rg_signed_block, BlockLayout::FOUR_BY_FOUR_16
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_prelude::*;

    /// Individual mode: R1 = 15, everything else 0, tables 0, no flip.
    const INDIVIDUAL: [u8; 8] = [0xF0, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];

    #[rstest]
    fn individual_mode_splits_left_and_right() {
        let pixels = decode_surface(decode_etc1, &INDIVIDUAL, 4, 4);
        for y in 0..4 {
            assert_eq!(pixels[y * 4], rgba(255, 2, 2, 255));
            assert_eq!(pixels[y * 4 + 1], rgba(255, 2, 2, 255));
            assert_eq!(pixels[y * 4 + 2], rgba(2, 2, 2, 255));
            assert_eq!(pixels[y * 4 + 3], rgba(2, 2, 2, 255));
        }
    }

    #[rstest]
    fn differential_mode_with_flip_splits_top_and_bottom() {
        // R = 16, dR = -1; diff and flip bits set.
        let block = [(16 << 3) | 0b111, 0, 0, 0x03, 0, 0, 0, 0];
        let pixels = decode_surface(decode_etc1, &block, 4, 4);
        assert!(pixels[..8].iter().all(|&p| p == rgba(134, 2, 2, 255)));
        assert!(pixels[8..].iter().all(|&p| p == rgba(125, 2, 2, 255)));
    }

    #[rstest]
    fn pixel_indices_are_column_major() {
        // LSB of entry 4 is pixel (1, 0): index 1 selects the large modifier.
        let mut block = INDIVIDUAL;
        block[7] = 0x10;
        let pixels = decode_surface(decode_etc1, &block, 4, 4);
        assert_eq!(pixels[1], rgba(255, 8, 8, 255));
        assert_eq!(pixels[4], rgba(255, 2, 2, 255));
    }

    /// R = 31, dR = +3 overflows, selecting T mode in ETC2.
    const T_MODE: [u8; 8] = [0b1111_1011, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00, 0x01];

    #[rstest]
    fn t_mode_paints_pixels() {
        let pixels = decode_surface(decode_etc2_rgb, &T_MODE, 4, 4);
        assert_eq!(pixels[0], rgba(3, 3, 3, 255));
        assert!(pixels[1..].iter().all(|&p| p == rgba(255, 0, 0, 255)));
    }

    #[rstest]
    fn etc1_never_enters_t_mode() {
        let pixels = decode_surface(decode_etc1, &T_MODE, 4, 4);
        assert_ne!(pixels[1], rgba(255, 0, 0, 255));
    }

    #[rstest]
    fn h_mode_paints_pixels() {
        // G = 31, dG = +3 overflows while R does not.
        let block = [0x00, 0xFB, 0x00, 0x02, 0x00, 0x00, 0x00, 0x00];
        let pixels = decode_surface(decode_etc2_rgb, &block, 4, 4);
        assert!(pixels.iter().all(|&p| p == rgba(6, 23, 244, 255)));
    }

    #[rstest]
    fn planar_mode_interpolates() {
        // B = 31, dB = +3 overflows while R and G do not.
        let block = [0x00, 0x00, 0b1111_1011, 0x02, 0x00, 0x00, 0x00, 0x00];
        let pixels = decode_surface(decode_etc2_rgb, &block, 4, 4);
        assert_eq!(pixels[0], rgba(0, 0, 121, 255));
        assert_eq!(pixels[1], rgba(0, 0, 91, 255));
        assert_eq!(pixels[15], rgba(0, 0, 0, 255));
    }

    #[rstest]
    fn punch_through_makes_index_two_transparent() {
        // Opaque flag cleared; pixel (0, 0) has MSB set and LSB clear.
        let mut block = T_MODE;
        block[3] = 0x00;
        block[5] = 0x01;
        block[7] = 0x00;
        let pixels = decode_surface(decode_etc2_rgba1, &block, 4, 4);
        assert_eq!(pixels[0], 0);
        assert_eq!(pixels[1], rgba(255, 0, 0, 255));
    }

    #[rstest]
    fn punch_through_differential_zeroes_small_modifier() {
        // Opaque flag cleared: index 0 applies no modifier.
        let block = [16 << 3, 16 << 3, 16 << 3, 0x00, 0, 0, 0, 0];
        let pixels = decode_surface(decode_etc2_rgba1, &block, 4, 4);
        assert!(pixels.iter().all(|&p| p == rgba(132, 132, 132, 255)));
    }

    #[rstest]
    fn eac_alpha_indices_are_column_major() {
        // mult 1, table 0; pixel (0, 0) index 7, pixel (0, 1) index 7.
        let alpha = [128, 0x10, 0b1111_1100, 0, 0, 0, 0, 0];
        let mut block = [0u8; 16];
        block[..8].copy_from_slice(&alpha);
        block[8..].copy_from_slice(&INDIVIDUAL);

        let pixels = decode_surface(decode_etc2_rgba8, &block, 4, 4);
        assert_eq!(Color8888::from_packed(pixels[0]).a, 142);
        assert_eq!(Color8888::from_packed(pixels[4]).a, 142);
        assert_eq!(Color8888::from_packed(pixels[1]).a, 125);
        assert_eq!(Color8888::from_packed(pixels[0]).r, 255);
    }

    #[rstest]
    fn eac_r11_unsigned() {
        let block = [128, 0x10, 0, 0, 0, 0, 0, 0];
        let pixels = decode_surface(decode_eac_r, &block, 4, 4);
        assert!(pixels.iter().all(|&p| p == rgba(125, 0, 0, 255)));
    }

    #[rstest]
    fn eac_r11_signed_is_biased() {
        // Base 0, mult 1, table 0, every index 4 (+2).
        let block = [0, 0x10, 0x92, 0x49, 0x24, 0x92, 0x49, 0x24];
        let pixels = decode_surface(decode_eac_r_signed, &block, 4, 4);
        assert!(pixels.iter().all(|&p| p == rgba(130, 0, 0, 255)));
    }

    #[rstest]
    fn eac_rg_fills_green() {
        let mut block = [0u8; 16];
        block[..8].copy_from_slice(&[128, 0x10, 0, 0, 0, 0, 0, 0]);
        block[8..].copy_from_slice(&[255, 0x00, 0, 0, 0, 0, 0, 0]);
        let pixels = decode_surface(decode_eac_rg, &block, 4, 4);
        // 255 * 8 + 4 - 3 = 2041
        assert!(pixels.iter().all(|&p| p == rgba(125, 255, 0, 255)));
    }

    #[rstest]
    fn rejects_short_input() {
        assert_rejects_short_input(decode_etc1, 8);
        assert_rejects_short_input(decode_etc2_rgb, 8);
        assert_rejects_short_input(decode_etc2_rgba1, 8);
        assert_rejects_short_input(decode_eac_r, 8);
        assert_rejects_short_input(decode_eac_r_signed, 8);
        assert_rejects_short_input(decode_etc2_rgba8, 16);
        assert_rejects_short_input(decode_eac_rg, 16);
        assert_rejects_short_input(decode_eac_rg_signed, 16);
    }
}
