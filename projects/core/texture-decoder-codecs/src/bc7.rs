//! BC7 decoding on top of [`bcdec_rs`].
//! https://learn.microsoft.com/en-us/windows/win32/direct3d11/bc7-format-mode-reference

use crate::error::CodecError;
use crate::surface::{decode_blocks, BlockLayout};

/// Decodes a BC7 block into RGBA8 pixels with the given destination row stride.
///
/// Reserved mode 8 (first byte zero) decodes to transparent black.
///
/// # Panics
///
/// If `src` is shorter than 16 bytes or `dst` cannot hold 4 rows of `stride` pixels.
#[inline]
pub fn decode_bc7_block(src: &[u8], dst: &mut [u32], stride: usize) {
    let mut rgba = [0u8; 4 * 4 * 4];
    bcdec_rs::bc7(&src[..16], &mut rgba, 4 * 4);

    for (y, row) in rgba.chunks_exact(4 * 4).enumerate() {
        for (x, pixel) in row.chunks_exact(4).enumerate() {
            dst[y * stride + x] = u32::from_ne_bytes([pixel[0], pixel[1], pixel[2], pixel[3]]);
        }
    }
}

/// Decodes a BC7 surface of `width * height` pixels into `image`.
pub fn decode_bc7(
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
        decode_bc7_block,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_prelude::*;

    /// Packs `(value, bit count)` fields into a block, lowest bits first.
    fn pack(fields: &[(u128, u32)]) -> [u8; 16] {
        let mut bits = 0u128;
        let mut pos = 0;
        for &(value, count) in fields {
            bits |= value << pos;
            pos += count;
        }
        assert!(pos <= 128);
        bits.to_le_bytes()
    }

    #[rstest]
    fn reserved_mode_is_transparent_black() {
        let pixels = decode_surface(decode_bc7, &[0u8; 16], 4, 4);
        assert!(pixels.iter().all(|&p| p == 0));
    }

    #[rstest]
    fn mode6_solid_colour() {
        // Mode 6: 7-bit RGBA endpoints + 1 p-bit each, 4-bit indices (anchor 3 bits).
        let block = pack(&[
            (1 << 6, 7),
            (0x7F | (0x7F << 7), 14), // R
            (0, 14),                  // G
            (0x40 | (0x40 << 7), 14), // B
            (0x7F | (0x7F << 7), 14), // A
            (1, 1),
            (1, 1),
        ]);
        let pixels = decode_surface(decode_bc7, &block, 4, 4);
        // p-bits are appended to every channel: G = 0b1, B = 0x40 << 1 | 1.
        assert!(pixels.iter().all(|&p| p == rgba(255, 1, 0x81, 255)));
    }

    #[rstest]
    fn mode6_interpolates_with_four_bit_weights() {
        let block = pack(&[
            (1 << 6, 7),
            (0x7F << 7, 14), // R: 0 -> 254 (+pbit)
            (0, 14),
            (0, 14),
            (0x7F | (0x7F << 7), 14),
            (0, 1),
            (1, 1),
            (0, 3),  // pixel 0 (anchor)
            (15, 4), // pixel 1
            (8, 4),  // pixel 2
        ]);
        let red: Vec<u8> = decode_surface(decode_bc7, &block, 4, 4)
            .iter()
            .map(|p| p.to_ne_bytes()[0])
            .collect();
        // (64 - 34) * 0 + 34 * 255, rounded, over 64.
        assert_eq!(red[..3], [0, 255, 135]);
    }

    #[rstest]
    fn mode5_rotation_swaps_alpha_into_red() {
        // Mode 5: rotation 1, colour 7 bits, alpha 8 bits, no p-bits.
        let block = pack(&[
            (1 << 5, 6),
            (1, 2),                   // rotation: swap R and A
            (0x7F | (0x7F << 7), 14), // R
            (0, 14),                  // G
            (0, 14),                  // B
            (0x10 | (0x10 << 8), 16), // A
        ]);
        let pixels = decode_surface(decode_bc7, &block, 4, 4);
        assert!(pixels.iter().all(|&p| p == rgba(0x10, 0, 0, 255)));
    }

    #[rstest]
    fn mode1_uses_partition_for_subsets() {
        // Mode 1, partition 13 (0xFF00): top two rows subset 0, bottom two rows subset 1.
        let block = pack(&[
            (1 << 1, 2),
            (13, 6),
            (0xFFF << 12, 24), // R: subset 1 endpoints full
            (0, 24),          // G
            (0x3F, 24),       // B: subset 0 first endpoint full
            (1, 1),
            (1, 1),
        ]);
        let pixels = decode_surface(decode_bc7, &block, 4, 4);
        // Shared p-bit of 1 turns zero endpoints into 2 after expansion.
        assert_eq!(pixels[0], rgba(2, 2, 255, 255));
        assert_eq!(pixels[15], rgba(255, 2, 2, 255));
    }

    #[rstest]
    fn respects_stride() {
        let block = pack(&[
            (1 << 6, 7),
            (0x7F | (0x7F << 7), 14),
            (0, 14),
            (0, 14),
            (0x7F | (0x7F << 7), 14),
            (1, 1),
            (1, 1),
        ]);
        let mut image = [SENTINEL; 8 * 4];
        decode_bc7_block(&block, &mut image, 8);
        for row in image.chunks_exact(8) {
            assert!(row[..4].iter().all(|&p| p == rgba(255, 1, 1, 255)));
            assert!(row[4..].iter().all(|&p| p == SENTINEL));
        }
    }

    #[rstest]
    fn rejects_short_input() {
        assert_rejects_short_input(decode_bc7, 16);
    }
}
