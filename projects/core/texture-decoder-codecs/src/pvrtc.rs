//! PVRTC (PowerVR, version 1) decoding for the 2bpp and 4bpp layouts.
//!
//! Each 8 byte word holds 32 bits of modulation data followed by two low resolution colours.
//! Words are stored in twiddled (Morton) order over a power of two grid of at least 2x2 words,
//! and the low resolution colours are bilinearly upscaled across neighbouring words.

use crate::error::CodecError;
use crate::surface::{output_len, validate};
use texture_decoder_common::color_8888::Color8888;

/// Modulation weights for the stored 2-bit values of the 2bpp layout.
const REPRESENTATIVE_VALUES: [i32; 4] = [0, 3, 5, 8];
/// Sentinel modulation marking a punch-through pixel (4bpp, mode 1).
const PUNCH_THROUGH: i32 = 14;

/// Pixels covered by one word along each axis.
#[inline]
pub const fn word_dimensions(is_2bpp: bool) -> (usize, usize) {
    if is_2bpp {
        (8, 4)
    } else {
        (4, 4)
    }
}

#[inline]
fn grid_size(blocks: usize) -> usize {
    blocks
        .max(2)
        .checked_next_power_of_two()
        .unwrap_or(usize::MAX)
}

/// Number of words along each axis for a surface of the given size.
#[inline]
pub fn word_counts(width: usize, height: usize, is_2bpp: bool) -> (usize, usize) {
    let (word_w, word_h) = word_dimensions(is_2bpp);
    (
        grid_size(width.div_ceil(word_w)),
        grid_size(height.div_ceil(word_h)),
    )
}

/// Compressed bytes required for a surface of the given size; 0 for an empty surface.
#[inline]
pub fn pvrtc_input_len(width: usize, height: usize, is_2bpp: bool) -> usize {
    if width == 0 || height == 0 {
        return 0;
    }
    let (words_x, words_y) = word_counts(width, height, is_2bpp);
    words_x.saturating_mul(words_y).saturating_mul(8)
}

/// Morton index of word `(x, y)`; y occupies the even bits, leftover bits of the
/// longer axis are appended on top.
#[inline]
fn twiddle(x: usize, y: usize, words_x: usize, words_y: usize) -> usize {
    let (min, rest) = if words_y < words_x {
        (words_y, x)
    } else {
        (words_x, y)
    };
    let mut twiddled = 0;
    let mut bit = 1;
    let mut shift = 0;
    while bit < min {
        if y & bit != 0 {
            twiddled |= 1 << (2 * shift);
        }
        if x & bit != 0 {
            twiddled |= 1 << (2 * shift + 1);
        }
        bit <<= 1;
        shift += 1;
    }
    twiddled | ((rest >> shift) << (2 * shift))
}

/// `[r, g, b, a]` with 5-bit colour and 4-bit alpha.
type LowColor = [i32; 4];

fn color_a(color: u32) -> LowColor {
    if color & 0x8000 != 0 {
        [
            ((color & 0x7C00) >> 10) as i32,
            ((color & 0x3E0) >> 5) as i32,
            ((color & 0x1E) | ((color & 0x1E) >> 4)) as i32,
            0xF,
        ]
    } else {
        [
            (((color & 0xF00) >> 7) | ((color & 0xF00) >> 11)) as i32,
            (((color & 0xF0) >> 3) | ((color & 0xF0) >> 7)) as i32,
            (((color & 0xE) << 1) | ((color & 0xE) >> 2)) as i32,
            ((color & 0x7000) >> 11) as i32,
        ]
    }
}

fn color_b(color: u32) -> LowColor {
    if color & 0x8000_0000 != 0 {
        [
            ((color & 0x7C00_0000) >> 26) as i32,
            ((color & 0x3E0_0000) >> 21) as i32,
            ((color & 0x1F_0000) >> 16) as i32,
            0xF,
        ]
    } else {
        [
            (((color & 0xF00_0000) >> 23) | ((color & 0xF00_0000) >> 27)) as i32,
            (((color & 0xF0_0000) >> 19) | ((color & 0xF0_0000) >> 23)) as i32,
            (((color & 0xF_0000) >> 15) | ((color & 0xF_0000) >> 19)) as i32,
            ((color & 0x7000_0000) >> 27) as i32,
        ]
    }
}

struct PvrtcSurface<'a> {
    data: &'a [u8],
    is_2bpp: bool,
    word_w: usize,
    words_x: usize,
    words_y: usize,
}

impl PvrtcSurface<'_> {
    #[inline]
    fn width(&self) -> usize {
        self.words_x * self.word_w
    }

    #[inline]
    fn height(&self) -> usize {
        self.words_y * 4
    }

    /// `(modulation, colour)` words of the block at `(x, y)`.
    #[inline]
    fn word(&self, x: usize, y: usize) -> (u32, u32) {
        let offset = twiddle(x, y, self.words_x, self.words_y) * 8;
        let bytes = &self.data[offset..offset + 8];
        (
            u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
        )
    }

    /// Modulation mode and stored value at pixel `(x, y)` of the padded surface.
    ///
    /// For checkerboard words, positions that store nothing return a meaningless value.
    fn stored_modulation(&self, x: usize, y: usize) -> (u32, i32) {
        let (local_x, local_y) = (x % self.word_w, y % 4);
        let (mut bits, color) = self.word(x / self.word_w, y / 4);
        let mut mode = color & 1;

        if !self.is_2bpp {
            let raw = (bits >> (2 * (local_y * 4 + local_x))) & 3;
            let value = if mode == 1 {
                [0, 4, PUNCH_THROUGH, 8][raw as usize]
            } else {
                [0, 3, 5, 8][raw as usize]
            };
            return (mode, value);
        }

        if mode == 0 {
            let bit = (bits >> (local_y * 8 + local_x)) & 1;
            return (0, if bit != 0 { 3 } else { 0 });
        }

        if bits & 1 != 0 {
            mode = if bits & (1 << 20) != 0 { 3 } else { 2 };
            if bits & (1 << 21) != 0 {
                bits |= 1 << 20;
            } else {
                bits &= !(1 << 20);
            }
        }
        if bits & 2 != 0 {
            bits |= 1;
        } else {
            bits &= !1;
        }

        let stored_index = (local_y * 8 + local_x) / 2;
        (mode, ((bits >> (2 * stored_index)) & 3) as i32)
    }

    /// Final modulation weight (0..=8, or [`PUNCH_THROUGH`]) at pixel `(x, y)`.
    fn modulation(&self, x: usize, y: usize) -> i32 {
        let (mode, value) = self.stored_modulation(x, y);
        if !self.is_2bpp {
            return value;
        }
        if mode == 0 || (x ^ y) & 1 == 0 {
            return REPRESENTATIVE_VALUES[value as usize];
        }

        let (width, height) = (self.width(), self.height());
        let sample = |sx: usize, sy: usize| {
            REPRESENTATIVE_VALUES[self.stored_modulation(sx % width, sy % height).1 as usize]
        };
        let left = || sample(x + width - 1, y);
        let right = || sample(x + 1, y);
        let up = || sample(x, y + height - 1);
        let down = || sample(x, y + 1);

        match mode {
            1 => (up() + down() + left() + right() + 2) / 4,
            2 => (left() + right() + 1) / 2,
            _ => (up() + down() + 1) / 2,
        }
    }

    /// Bilinearly upscaled colour A and B at pixel `(x, y)`, expanded to 8 bits.
    fn upscaled_colors(&self, x: usize, y: usize) -> ([i32; 4], [i32; 4]) {
        let (width, height) = (self.width(), self.height());
        let u = (x + width - self.word_w / 2) % width;
        let v = (y + height - 2) % height;
        let (x0, fx) = (u / self.word_w, (u % self.word_w) as i32);
        let (y0, fy) = (v / 4, (v % 4) as i32);
        let x1 = (x0 + 1) % self.words_x;
        let y1 = (y0 + 1) % self.words_y;

        let p = self.word(x0, y0).1;
        let q = self.word(x1, y0).1;
        let r = self.word(x0, y1).1;
        let s = self.word(x1, y1).1;
        let word_w = self.word_w as i32;

        let blend = |pick: fn(u32) -> LowColor| {
            let (cp, cq, cr, cs) = (pick(p), pick(q), pick(r), pick(s));
            let mut out = [0i32; 4];
            for c in 0..4 {
                let top = cp[c] * (word_w - fx) + cq[c] * fx;
                let bottom = cr[c] * (word_w - fx) + cs[c] * fx;
                let value = top * (4 - fy) + bottom * fy;
                out[c] = match (self.is_2bpp, c == 3) {
                    (false, false) => (value >> 6) + (value >> 1),
                    (false, true) => (value >> 4) + value,
                    (true, false) => (value >> 7) + (value >> 2),
                    (true, true) => (value >> 5) + (value >> 1),
                };
            }
            out
        };
        (blend(color_a), blend(color_b))
    }

    fn pixel(&self, x: usize, y: usize) -> Color8888 {
        let (a, b) = self.upscaled_colors(x, y);
        let mut modulation = self.modulation(x, y);
        let punch_through = modulation > 10;
        if punch_through {
            modulation -= 10;
        }

        let mix = |c: usize| ((a[c] * (8 - modulation) + b[c] * modulation) / 8) as u8;
        let alpha = if punch_through { 0 } else { mix(3) };
        Color8888::new(mix(0), mix(1), mix(2), alpha)
    }
}

/// Decodes a PVRTC surface of `width * height` pixels into `image`.
///
/// `data` must cover the padded word grid reported by [`pvrtc_input_len`].
pub fn decode_pvrtc(
    data: &[u8],
    width: usize,
    height: usize,
    image: &mut [u32],
    is_2bpp: bool,
) -> Result<(), CodecError> {
    validate(
        pvrtc_input_len(width, height, is_2bpp),
        data,
        width,
        height,
        image,
    )?;
    if output_len(width, height) == 0 {
        return Ok(());
    }

    let (words_x, words_y) = word_counts(width, height, is_2bpp);
    let surface = PvrtcSurface {
        data,
        is_2bpp,
        word_w: word_dimensions(is_2bpp).0,
        words_x,
        words_y,
    };

    for (y, row) in image.chunks_exact_mut(width).take(height).enumerate() {
        for (x, pixel) in row.iter_mut().enumerate() {
            *pixel = surface.pixel(x, y).to_packed();
        }
    }
    Ok(())
}

/// Decodes a 4bpp PVRTC surface.
pub fn decode_pvrtc_4bpp(
    data: &[u8],
    width: usize,
    height: usize,
    image: &mut [u32],
) -> Result<(), CodecError> {
    decode_pvrtc(data, width, height, image, false)
}

/// Decodes a 2bpp PVRTC surface.
pub fn decode_pvrtc_2bpp(
    data: &[u8],
    width: usize,
    height: usize,
    image: &mut [u32],
) -> Result<(), CodecError> {
    decode_pvrtc(data, width, height, image, true)
}
