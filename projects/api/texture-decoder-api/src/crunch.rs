//! Crunch container support.
//!
//! Crunch and Unity crunch share the `crn` container but encode the block stream
//! differently, so the bitstream itself is unpacked by a [`CrunchUnpacker`] picked per
//! [`CrunchDialect`]. This module validates the container header, selects the unpacker and
//! owns the unpacked mip level ([`UnpackedBlob`]) until it has been decoded.

use crate::error::UnpackError;
use crate::format::FormatTag;
use alloc::boxed::Box;
use core::ffi::c_void;
use core::ptr::NonNull;
use derive_enum_all_values::AllValues;
use safe_allocator_api::RawAlloc;
use texture_decoder_common::allocate::allocate_align_64_copy;
use thiserror::Error;

/// Container signature, `"Hx"`.
pub const CRUNCH_SIGNATURE: u16 = 0x4878;

/// Size of a header describing a single mip level.
pub const MIN_HEADER_SIZE: usize = 74;

const HEADER_SIZE_OFFSET: usize = 2;
const DATA_SIZE_OFFSET: usize = 6;
const WIDTH_OFFSET: usize = 12;
const HEIGHT_OFFSET: usize = 14;
const LEVELS_OFFSET: usize = 16;
const FACES_OFFSET: usize = 17;
const FORMAT_OFFSET: usize = 18;
const LEVEL_OFFSETS_OFFSET: usize = 70;

/// The two bitstream dialects of the crunch container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AllValues)]
pub enum CrunchDialect {
    /// Upstream crunch.
    Standard,
    /// Unity's crunch fork, which adds the ETC family.
    UnityVariant,
}

impl CrunchDialect {
    /// Maps the `use_unity_crunch` flag of the C entry points.
    pub const fn from_unity_flag(use_unity_crunch: bool) -> Self {
        if use_unity_crunch {
            Self::UnityVariant
        } else {
            Self::Standard
        }
    }

    /// Highest `crn_format` value the dialect understands.
    const fn max_format(self) -> u8 {
        match self {
            // DXT1 ..= DXT5A
            Self::Standard => 9,
            // ETC1, ETC2, ETC2A, ETC1S, ETC2AS
            Self::UnityVariant => 14,
        }
    }
}

/// Block formats that can be decoded out of a crunch container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AllValues)]
pub enum CrunchedFormat {
    /// Decodes through [`FormatTag::Bc1`].
    Dxt1,
    /// Decodes through [`FormatTag::Bc3`].
    Dxt5,
    /// Decodes through [`FormatTag::Etc1`].
    Etc1,
    /// Decodes through [`FormatTag::Etc2A8`].
    Etc2A8,
}

impl CrunchedFormat {
    /// The block decoder the unpacked level is fed to.
    pub const fn target(self) -> FormatTag {
        match self {
            Self::Dxt1 => FormatTag::Bc1,
            Self::Dxt5 => FormatTag::Bc3,
            Self::Etc1 => FormatTag::Etc1,
            Self::Etc2A8 => FormatTag::Etc2A8,
        }
    }
}

/// Extracts raw block data for one mip level out of a crunch container.
pub trait CrunchUnpacker: Send + Sync {
    /// Unpacks mip level `level` of the container in `data`.
    ///
    /// Any buffer allocated before a failure must be freed before returning the error;
    /// dropping a partially filled [`UnpackedBlob`] does exactly that.
    fn unpack_level(&self, data: &[u8], level: u32) -> Result<UnpackedBlob, UnpackError>;
}

/// Deallocator for a level buffer allocated by foreign code.
pub type ForeignFreeFn = unsafe extern "C" fn(context: *mut c_void, data: *mut u8, size: u32);

/// An unpacked mip level, freed exactly once when dropped.
pub struct UnpackedBlob(BlobStorage);

enum BlobStorage {
    Aligned(RawAlloc),
    Foreign {
        ptr: NonNull<u8>,
        size: u32,
        context: *mut c_void,
        free: ForeignFreeFn,
    },
}

impl UnpackedBlob {
    /// Copies `bytes` into a fresh 64 byte aligned allocation.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, UnpackError> {
        Ok(Self::from_alloc(allocate_align_64_copy(bytes)?))
    }

    /// Takes ownership of an initialized allocation.
    pub fn from_alloc(alloc: RawAlloc) -> Self {
        Self(BlobStorage::Aligned(alloc))
    }

    /// Takes ownership of a buffer allocated by foreign code.
    ///
    /// # Safety
    ///
    /// `ptr` must be valid for reads of `size` initialized bytes until `free` is called, and
    /// `free(context, ptr, size)` must be the correct way to release it.
    pub unsafe fn from_foreign(
        ptr: NonNull<u8>,
        size: u32,
        context: *mut c_void,
        free: ForeignFreeFn,
    ) -> Self {
        Self(BlobStorage::Foreign {
            ptr,
            size,
            context,
            free,
        })
    }

    /// The unpacked bytes.
    pub fn as_slice(&self) -> &[u8] {
        match &self.0 {
            BlobStorage::Aligned(alloc) => alloc.as_slice(),
            // Safety: guaranteed by the contract of `from_foreign`.
            BlobStorage::Foreign { ptr, size, .. } => unsafe {
                core::slice::from_raw_parts(ptr.as_ptr(), *size as usize)
            },
        }
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// `true` if the level holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Drop for UnpackedBlob {
    fn drop(&mut self) {
        if let BlobStorage::Foreign {
            ptr,
            size,
            context,
            free,
        } = self.0
        {
            // Safety: ownership was handed over in `from_foreign` and this runs once.
            unsafe { free(context, ptr.as_ptr(), size) }
        }
    }
}

/// Reasons a crunch container header is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HeaderError {
    /// The stream cannot hold a header.
    #[error("Container too short: need at least 74 bytes, but only {0} bytes available.")]
    TooShort(usize),

    /// The stream does not start with `"Hx"`.
    #[error("Bad signature: {0:#06x}")]
    BadSignature(u16),

    /// The declared header size does not cover the level offset table.
    #[error("Header size {header_size} is too small: need {needed} bytes.")]
    HeaderTooSmall {
        /// Declared header size in bytes
        header_size: u16,
        /// Bytes needed for the level table
        needed: usize,
    },

    /// The declared data size is smaller than the header or larger than the stream.
    #[error("Declared data size {data_size} does not fit a stream of {actual} bytes.")]
    DataSizeOutOfRange {
        /// Declared data size in bytes
        data_size: u32,
        /// Actual stream length in bytes
        actual: usize,
    },

    /// Width or height is zero.
    #[error("Texture has zero width or height.")]
    EmptySurface,

    /// The container holds no mip levels.
    #[error("Container holds no mip levels.")]
    NoLevels,

    /// Only plain textures (1 face) and cube maps (6 faces) exist.
    #[error("Unsupported face count: {0}")]
    UnsupportedFaceCount(u8),

    /// The container format is unknown to the selected dialect.
    #[error("Format {format} is not supported by the {dialect:?} dialect.")]
    UnsupportedFormat {
        /// Raw `crn_format` value
        format: u8,
        /// Dialect used for validation
        dialect: CrunchDialect,
    },

    /// The container block size does not match the format it is decoded as.
    #[error("Format {format} cannot be decoded as {target:?}.")]
    FormatMismatch {
        /// Raw `crn_format` value
        format: u8,
        /// Block decoder the caller asked for
        target: FormatTag,
    },

    /// The first mip level starts outside of the data.
    #[error("Level offset {offset} lies outside of the {data_size} byte container.")]
    LevelOffsetOutOfRange {
        /// Level offset in bytes
        offset: u32,
        /// Declared data size in bytes
        data_size: u32,
    },
}

/// The fields of a crunch container header the bridge relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrunchHeader {
    /// Header size in bytes.
    pub header_size: u16,
    /// Size of the whole container in bytes.
    pub data_size: u32,
    /// Width of mip level 0 in pixels.
    pub width: u16,
    /// Height of mip level 0 in pixels.
    pub height: u16,
    /// Number of mip levels.
    pub levels: u8,
    /// Number of faces.
    pub faces: u8,
    /// Raw `crn_format` value.
    pub format: u8,
    /// Offset of mip level 0's compressed data.
    pub level0_offset: u32,
}

#[inline]
fn read_u16(data: &[u8], offset: usize) -> u16 {
    u16::from_be_bytes([data[offset], data[offset + 1]])
}

#[inline]
fn read_u32(data: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

impl CrunchHeader {
    /// Parses and validates the header at the start of `data`.
    pub fn parse(data: &[u8], dialect: CrunchDialect) -> Result<Self, HeaderError> {
        if data.len() < MIN_HEADER_SIZE {
            return Err(HeaderError::TooShort(data.len()));
        }

        let signature = read_u16(data, 0);
        if signature != CRUNCH_SIGNATURE {
            return Err(HeaderError::BadSignature(signature));
        }

        let levels = data[LEVELS_OFFSET];
        if levels == 0 {
            return Err(HeaderError::NoLevels);
        }

        let header_size = read_u16(data, HEADER_SIZE_OFFSET);
        let needed = LEVEL_OFFSETS_OFFSET + 4 * levels as usize;
        if (header_size as usize) < needed {
            return Err(HeaderError::HeaderTooSmall {
                header_size,
                needed,
            });
        }

        let data_size = read_u32(data, DATA_SIZE_OFFSET);
        if (data_size as usize) > data.len() || data_size < u32::from(header_size) {
            return Err(HeaderError::DataSizeOutOfRange {
                data_size,
                actual: data.len(),
            });
        }

        let width = read_u16(data, WIDTH_OFFSET);
        let height = read_u16(data, HEIGHT_OFFSET);
        if width == 0 || height == 0 {
            return Err(HeaderError::EmptySurface);
        }

        let faces = data[FACES_OFFSET];
        if faces != 1 && faces != 6 {
            return Err(HeaderError::UnsupportedFaceCount(faces));
        }

        let format = data[FORMAT_OFFSET];
        if format > dialect.max_format() {
            return Err(HeaderError::UnsupportedFormat { format, dialect });
        }

        let level0_offset = read_u32(data, LEVEL_OFFSETS_OFFSET);
        if level0_offset < u32::from(header_size) || level0_offset >= data_size {
            return Err(HeaderError::LevelOffsetOutOfRange {
                offset: level0_offset,
                data_size,
            });
        }

        Ok(Self {
            header_size,
            data_size,
            width,
            height,
            levels,
            faces,
            format,
            level0_offset,
        })
    }

    /// Bytes per 4x4 block of the container format.
    pub const fn block_bytes(&self) -> usize {
        match self.format {
            // DXT1, DXT5A, ETC1, ETC2, ETC1S
            0 | 9 | 10 | 11 | 13 => 8,
            _ => 16,
        }
    }

    /// Raw size of one face of mip level `level` once unpacked.
    pub fn level_len(&self, level: u32) -> usize {
        let width = (u32::from(self.width) >> level).max(1) as usize;
        let height = (u32::from(self.height) >> level).max(1) as usize;
        width.div_ceil(4) * height.div_ceil(4) * self.block_bytes()
    }
}

/// The unpackers registered for each dialect.
#[derive(Default)]
pub struct CrunchBackends {
    standard: Option<Box<dyn CrunchUnpacker>>,
    unity: Option<Box<dyn CrunchUnpacker>>,
}

impl CrunchBackends {
    /// No unpackers registered.
    pub const fn new() -> Self {
        Self {
            standard: None,
            unity: None,
        }
    }

    /// Registers `unpacker` for `dialect`, replacing any previous one.
    pub fn set(&mut self, dialect: CrunchDialect, unpacker: Box<dyn CrunchUnpacker>) {
        match dialect {
            CrunchDialect::Standard => self.standard = Some(unpacker),
            CrunchDialect::UnityVariant => self.unity = Some(unpacker),
        }
    }

    /// Returns `true` if an unpacker is registered for `dialect`.
    pub fn supports(&self, dialect: CrunchDialect) -> bool {
        self.select(dialect).is_ok()
    }

    /// The unpacker registered for `dialect`.
    pub fn select(&self, dialect: CrunchDialect) -> Result<&dyn CrunchUnpacker, UnpackError> {
        let unpacker = match dialect {
            CrunchDialect::Standard => self.standard.as_deref(),
            CrunchDialect::UnityVariant => self.unity.as_deref(),
        };
        unpacker.ok_or(UnpackError::MissingBackend(dialect))
    }

    /// Validates the container, then unpacks mip level 0 for decoding as `format`.
    ///
    /// On error nothing is left allocated.
    pub fn unpack_level_zero(
        &self,
        dialect: CrunchDialect,
        format: CrunchedFormat,
        data: &[u8],
    ) -> Result<UnpackedBlob, UnpackError> {
        let header = CrunchHeader::parse(data, dialect)?;
        let target = format.target();
        let target_bytes = target.fixed_layout().map_or(0, |layout| layout.bytes);
        if header.block_bytes() != target_bytes {
            return Err(HeaderError::FormatMismatch {
                format: header.format,
                target,
            }
            .into());
        }

        let blob = self.select(dialect)?.unpack_level(data, 0)?;
        let needed = header.level_len(0);
        if blob.len() < needed {
            return Err(UnpackError::LevelTooSmall {
                needed,
                actual: blob.len(),
            });
        }
        Ok(blob)
    }
}
