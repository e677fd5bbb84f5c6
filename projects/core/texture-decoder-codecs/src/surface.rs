//! Block grid arithmetic and the shared surface tiler.
//!
//! Block decoders write a single block into a `u32` slice with a given row stride.
//! The tiler walks the block grid of a surface, decodes interior blocks straight into
//! the destination image and routes edge blocks through a scratch buffer so pixels
//! outside of `width * height` are never touched.

use crate::error::CodecError;
use likely_stable::unlikely;

/// Shape of a single compressed block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockLayout {
    /// Block width in pixels.
    pub width: usize,
    /// Block height in pixels.
    pub height: usize,
    /// Compressed size of one block in bytes.
    pub bytes: usize,
}

impl BlockLayout {
    /// Layout shared by every 4x4 format with 8 byte blocks (BC1, BC4, ETC1, ...).
    pub const FOUR_BY_FOUR_8: Self = Self::new(4, 4, 8);
    /// Layout shared by every 4x4 format with 16 byte blocks (BC3, BC5, BC7, ...).
    pub const FOUR_BY_FOUR_16: Self = Self::new(4, 4, 16);

    pub const fn new(width: usize, height: usize, bytes: usize) -> Self {
        Self {
            width,
            height,
            bytes,
        }
    }

    /// Number of blocks along each axis for a surface of the given size.
    pub const fn blocks(&self, width: usize, height: usize) -> (usize, usize) {
        (width.div_ceil(self.width), height.div_ceil(self.height))
    }

    /// Compressed bytes required for a surface of the given size.
    ///
    /// Saturates at [`usize::MAX`] for dimensions that would overflow,
    /// so oversized requests fail validation instead of wrapping.
    pub const fn input_len(&self, width: usize, height: usize) -> usize {
        let (bx, by) = self.blocks(width, height);
        bx.saturating_mul(by).saturating_mul(self.bytes)
    }
}

/// Pixels required for a decoded surface of the given size.
#[inline]
pub const fn output_len(width: usize, height: usize) -> usize {
    width.saturating_mul(height)
}

/// Checks `data` and `image` against the sizes a surface decode needs.
pub fn validate(
    input_needed: usize,
    data: &[u8],
    width: usize,
    height: usize,
    image: &[u32],
) -> Result<(), CodecError> {
    if data.len() < input_needed {
        return Err(CodecError::InputTooSmall {
            needed: input_needed,
            actual: data.len(),
        });
    }

    let output_needed = output_len(width, height);
    if image.len() < output_needed {
        return Err(CodecError::OutputTooSmall {
            needed: output_needed,
            actual: image.len(),
        });
    }

    Ok(())
}

/// Decodes every block of a surface laid out as a regular grid of `layout` blocks.
///
/// `decode_block` receives exactly `layout.bytes` of input, the destination slice and the
/// row stride of that destination in pixels.
pub(crate) fn decode_blocks<F>(
    layout: BlockLayout,
    data: &[u8],
    width: usize,
    height: usize,
    image: &mut [u32],
    mut decode_block: F,
) -> Result<(), CodecError>
where
    F: FnMut(&[u8], &mut [u32], usize),
{
    validate(layout.input_len(width, height), data, width, height, image)?;

    let (blocks_x, blocks_y) = layout.blocks(width, height);
    let mut scratch = [0u32; 144]; // 12x12, largest footprint
    let scratch = &mut scratch[..layout.width * layout.height];
    let mut blocks = data.chunks_exact(layout.bytes);

    for by in 0..blocks_y {
        let y = by * layout.height;
        for bx in 0..blocks_x {
            let x = bx * layout.width;
            // Validated above; the grid never runs past the input.
            let Some(block) = blocks.next() else {
                return Ok(());
            };

            let clipped = x + layout.width > width || y + layout.height > height;
            if unlikely(clipped) {
                decode_block(block, scratch, layout.width);
                copy_clipped(scratch, layout, image, width, height, x, y);
            } else {
                let start = y * width + x;
                let end = start + (layout.height - 1) * width + layout.width;
                decode_block(block, &mut image[start..end], width);
            }
        }
    }

    Ok(())
}

/// Copies the visible part of a decoded block at `(x, y)` into `image`.
pub(crate) fn copy_clipped(
    block: &[u32],
    layout: BlockLayout,
    image: &mut [u32],
    width: usize,
    height: usize,
    x: usize,
    y: usize,
) {
    let visible_w = layout.width.min(width - x);
    let visible_h = layout.height.min(height - y);
    for row in 0..visible_h {
        let src = &block[row * layout.width..row * layout.width + visible_w];
        let dst_start = (y + row) * width + x;
        image[dst_start..dst_start + visible_w].copy_from_slice(src);
    }
}
