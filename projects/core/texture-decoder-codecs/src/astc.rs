//! ASTC (LDR) decoding for square footprints via the `astc-decode` crate.

use crate::error::CodecError;
use crate::surface::{decode_blocks, BlockLayout};
use astc_decode::{astc_decode_block, Footprint};
use texture_decoder_common::color_8888::Color8888;

/// Square footprints accepted by [`decode_astc`].
pub const SUPPORTED_BLOCK_SIZES: [u8; 6] = [4, 5, 6, 8, 10, 12];

/// Block layout for a square footprint, if it is supported.
#[inline]
pub fn astc_layout(block_size: u8) -> Option<BlockLayout> {
    SUPPORTED_BLOCK_SIZES
        .contains(&block_size)
        .then(|| BlockLayout::new(block_size as usize, block_size as usize, 16))
}

/// Decodes one ASTC block into `dst` with the given destination row stride.
///
/// # Panics
///
/// If `src` is shorter than 16 bytes or `dst` cannot hold the footprint at `stride`.
pub fn decode_astc_block(src: &[u8], footprint: Footprint, dst: &mut [u32], stride: usize) {
    let mut block = [0u8; 16];
    block.copy_from_slice(&src[..16]);
    astc_decode_block(&block, footprint, |x, y, [r, g, b, a]| {
        dst[y as usize * stride + x as usize] = Color8888::new(r, g, b, a).to_packed();
    });
}

/// Decodes an ASTC surface with `block_size x block_size` footprints into `image`.
pub fn decode_astc(
    data: &[u8],
    width: usize,
    height: usize,
    image: &mut [u32],
    block_size: u8,
) -> Result<(), CodecError> {
    let layout = astc_layout(block_size).ok_or(CodecError::UnsupportedBlockSize(block_size))?;
    let footprint = Footprint::new(block_size as u32, block_size as u32);
    decode_blocks(layout, data, width, height, image, |src, dst, stride| {
        decode_astc_block(src, footprint, dst, stride)
    })
}
