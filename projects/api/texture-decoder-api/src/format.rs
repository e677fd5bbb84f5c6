//! Format identifiers, their parameters and the buffer size contract of each format.

use crate::error::DispatchError;
use derive_enum_all_values::AllValues;
use texture_decoder_codecs::BlockLayout;
use texture_decoder_codecs::astc::SUPPORTED_BLOCK_SIZES;
use texture_decoder_codecs::pvrtc::pvrtc_input_len;
use texture_decoder_codecs::surface::output_len;

/// The block codecs the bridge can dispatch to.
///
/// The discriminant doubles as the index into the dispatch table.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AllValues)]
pub enum FormatTag {
    /// BC1 (DXT1), 8 byte 4x4 blocks.
    Bc1 = 0,
    /// BC3 (DXT5), 16 byte 4x4 blocks.
    Bc3 = 1,
    /// BC4, single channel.
    Bc4 = 2,
    /// BC5, two channels.
    Bc5 = 3,
    /// BC6H, unsigned half float.
    Bc6 = 4,
    /// BC7.
    Bc7 = 5,
    /// PVRTC, 2bpp or 4bpp depending on [`FormatParams::Pvrtc`].
    Pvrtc = 6,
    /// ETC1.
    Etc1 = 7,
    /// ETC2 RGB.
    Etc2 = 8,
    /// ETC2 RGB with punch-through alpha.
    Etc2A1 = 9,
    /// ETC2 RGB with EAC alpha.
    Etc2A8 = 10,
    /// ATC RGB.
    AtcRgb4 = 11,
    /// ATC RGBA with explicit interpolated alpha.
    AtcRgba8 = 12,
    /// ASTC LDR, footprint given by [`FormatParams::Astc`].
    Astc = 13,
    /// EAC R11 unsigned.
    EacR = 14,
    /// EAC R11 signed.
    EacRSigned = 15,
    /// EAC RG11 unsigned.
    EacRg = 16,
    /// EAC RG11 signed.
    EacRgSigned = 17,
}

impl FormatTag {
    /// Number of formats, and therefore of dispatch table entries.
    pub const COUNT: usize = Self::all_values().len();

    /// Layout of the formats whose block shape does not depend on [`FormatParams`].
    pub const fn fixed_layout(self) -> Option<BlockLayout> {
        match self {
            Self::Bc1
            | Self::Bc4
            | Self::Etc1
            | Self::Etc2
            | Self::Etc2A1
            | Self::AtcRgb4
            | Self::EacR
            | Self::EacRSigned => Some(BlockLayout::FOUR_BY_FOUR_8),
            Self::Bc3
            | Self::Bc5
            | Self::Bc6
            | Self::Bc7
            | Self::Etc2A8
            | Self::AtcRgba8
            | Self::EacRg
            | Self::EacRgSigned => Some(BlockLayout::FOUR_BY_FOUR_16),
            Self::Pvrtc | Self::Astc => None,
        }
    }

    /// Checks that `params` is the one shape this format accepts.
    pub fn check_params(self, params: FormatParams) -> Result<(), DispatchError> {
        let matches = match self {
            Self::Pvrtc => matches!(params, FormatParams::Pvrtc { .. }),
            Self::Astc => matches!(params, FormatParams::Astc { .. }),
            _ => matches!(params, FormatParams::None),
        };

        if matches {
            Ok(())
        } else {
            Err(DispatchError::InvalidFormatParams(self))
        }
    }
}

/// Square ASTC footprint. Only the sizes in [`SUPPORTED_BLOCK_SIZES`] can be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AstcBlockSize(u8);

impl AstcBlockSize {
    /// Returns [`None`] for footprints other than 4, 5, 6, 8, 10 and 12.
    pub const fn new(size: u8) -> Option<Self> {
        let mut x = 0;
        while x < SUPPORTED_BLOCK_SIZES.len() {
            if SUPPORTED_BLOCK_SIZES[x] == size {
                return Some(Self(size));
            }
            x += 1;
        }
        None
    }

    /// Footprint edge length in pixels.
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Block layout of this footprint. ASTC blocks are always 16 bytes.
    pub const fn layout(self) -> BlockLayout {
        BlockLayout::new(self.0 as usize, self.0 as usize, 16)
    }
}

/// Extra parameters carried by a decode request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FormatParams {
    /// No parameters. Used by every format except PVRTC and ASTC.
    #[default]
    None,
    /// PVRTC bits per pixel.
    Pvrtc {
        /// `true` for 2bpp (8x4 words), `false` for 4bpp (4x4 words).
        is_2bpp: bool,
    },
    /// ASTC footprint.
    Astc {
        /// Square block size.
        block_size: AstcBlockSize,
    },
}

impl FormatParams {
    /// `true` when these are 2bpp PVRTC parameters.
    pub const fn is_2bpp(self) -> bool {
        matches!(self, Self::Pvrtc { is_2bpp: true })
    }

    /// The ASTC footprint, if these are ASTC parameters.
    pub const fn astc_block_size(self) -> Option<AstcBlockSize> {
        match self {
            Self::Astc { block_size } => Some(block_size),
            _ => None,
        }
    }
}

/// Describes the surface a request decodes: its format, parameters and pixel size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceDesc {
    /// Block codec to run.
    pub format: FormatTag,
    /// Parameters matching `format`.
    pub params: FormatParams,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl SurfaceDesc {
    /// A surface of a format that takes no parameters.
    pub const fn new(format: FormatTag, width: u32, height: u32) -> Self {
        Self {
            format,
            params: FormatParams::None,
            width,
            height,
        }
    }

    /// Replaces the format parameters.
    pub const fn with_params(mut self, params: FormatParams) -> Self {
        self.params = params;
        self
    }
}

/// Minimum compressed input length, in bytes, for a `width * height` surface of `format`.
///
/// This is the block aligned size: partial edge blocks count as whole blocks, and PVRTC
/// surfaces are padded to their power of two word grid.
pub fn required_input_len(
    format: FormatTag,
    params: FormatParams,
    width: usize,
    height: usize,
) -> Result<usize, DispatchError> {
    format.check_params(params)?;
    match (format.fixed_layout(), params) {
        (Some(layout), _) => Ok(layout.input_len(width, height)),
        (None, FormatParams::Pvrtc { is_2bpp }) => Ok(pvrtc_input_len(width, height, is_2bpp)),
        (None, FormatParams::Astc { block_size }) => Ok(block_size.layout().input_len(width, height)),
        (None, FormatParams::None) => Err(DispatchError::InvalidFormatParams(format)),
    }
}

/// Output length, in pixels, every decode writes for a `width * height` surface.
#[inline]
pub const fn required_output_len(width: usize, height: usize) -> usize {
    output_len(width, height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_prelude::*;

    #[test]
    fn discriminants_match_table_order() {
        for (index, tag) in FormatTag::all_values().iter().enumerate() {
            assert_eq!(*tag as usize, index);
        }
        assert_eq!(FormatTag::COUNT, 18);
    }

    #[rstest]
    #[case(FormatTag::Bc1, 8, 8, 32)]
    #[case(FormatTag::Bc3, 8, 8, 64)]
    #[case(FormatTag::Bc4, 5, 5, 32)]
    #[case(FormatTag::Bc7, 1, 1, 16)]
    #[case(FormatTag::Etc2A8, 12, 4, 48)]
    #[case(FormatTag::EacRgSigned, 4, 8, 32)]
    #[case(FormatTag::AtcRgb4, 0, 16, 0)]
    fn fixed_formats_round_up_to_blocks(
        #[case] format: FormatTag,
        #[case] width: usize,
        #[case] height: usize,
        #[case] expected: usize,
    ) {
        assert_eq!(
            required_input_len(format, FormatParams::None, width, height),
            Ok(expected)
        );
    }

    #[rstest]
    #[case(false, 8, 8, 32)]
    #[case(true, 16, 8, 32)]
    #[case(false, 1, 1, 32)]
    fn pvrtc_uses_padded_word_grid(
        #[case] is_2bpp: bool,
        #[case] width: usize,
        #[case] height: usize,
        #[case] expected: usize,
    ) {
        let params = FormatParams::Pvrtc { is_2bpp };
        assert_eq!(
            required_input_len(FormatTag::Pvrtc, params, width, height),
            Ok(expected)
        );
    }

    #[rstest]
    #[case(4, 16, 256)]
    #[case(5, 16, 256)]
    #[case(12, 13, 64)]
    fn astc_uses_footprint(#[case] size: u8, #[case] extent: usize, #[case] expected: usize) {
        let params = FormatParams::Astc {
            block_size: AstcBlockSize::new(size).unwrap(),
        };
        assert_eq!(
            required_input_len(FormatTag::Astc, params, extent, extent),
            Ok(expected)
        );
    }

    #[rstest]
    #[case(0)]
    #[case(3)]
    #[case(7)]
    #[case(16)]
    fn rejects_unsupported_astc_sizes(#[case] size: u8) {
        assert_eq!(AstcBlockSize::new(size), None);
    }

    #[rstest]
    #[case(FormatTag::Bc1, FormatParams::Pvrtc { is_2bpp: false })]
    #[case(FormatTag::Pvrtc, FormatParams::None)]
    #[case(FormatTag::Astc, FormatParams::None)]
    #[case(FormatTag::Astc, FormatParams::Pvrtc { is_2bpp: true })]
    fn mismatched_params_are_rejected(#[case] format: FormatTag, #[case] params: FormatParams) {
        assert_eq!(
            required_input_len(format, params, 4, 4),
            Err(DispatchError::InvalidFormatParams(format))
        );
    }

    #[test]
    fn every_format_has_a_size_contract() {
        for &format in FormatTag::all_values() {
            let params = match format {
                FormatTag::Pvrtc => FormatParams::Pvrtc { is_2bpp: false },
                FormatTag::Astc => FormatParams::Astc {
                    block_size: AstcBlockSize::new(4).unwrap(),
                },
                _ => FormatParams::None,
            };
            assert!(required_input_len(format, params, 4, 4).unwrap() > 0);
        }
    }

    #[test]
    fn output_len_saturates() {
        assert_eq!(required_output_len(8, 8), 64);
        assert_eq!(required_output_len(usize::MAX, 2), usize::MAX);
    }
}
