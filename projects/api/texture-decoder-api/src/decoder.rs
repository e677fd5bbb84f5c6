//! The decode bridge: pin, optionally unpack, dispatch, release.

use crate::crunch::{CrunchBackends, CrunchDialect, CrunchUnpacker, CrunchedFormat};
use crate::dispatch::{self, DecodeRequest};
use crate::error::DecodeError;
use crate::format::{FormatParams, SurfaceDesc};
use crate::pinning::{
    ErrorChannel, PIN_FAILURE_MESSAGE, PinnableBuffer, PinnedPair, ReadOnlyBuffer, SliceBuffer,
    WritableBuffer, acquire_pair,
};
use alloc::boxed::Box;
use tracing::{debug, warn};

/// Describes a crunched surface: the block format inside the container, the container
/// dialect and the pixel size of mip level 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrunchedDesc {
    /// Block format stored in the container.
    pub format: CrunchedFormat,
    /// Container dialect.
    pub dialect: CrunchDialect,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl CrunchedDesc {
    /// A crunched surface of the given format and dialect.
    pub const fn new(
        format: CrunchedFormat,
        dialect: CrunchDialect,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            format,
            dialect,
            width,
            height,
        }
    }
}

/// Decodes compressed surfaces out of caller owned buffers.
///
/// Holds nothing but the registered crunch unpackers, so a single instance can be shared
/// between threads.
#[derive(Default)]
pub struct TextureDecoder {
    backends: CrunchBackends,
}

impl TextureDecoder {
    /// A decoder without crunch unpackers. Plain formats decode normally; crunched ones fail
    /// with [`crate::UnpackError::MissingBackend`].
    pub const fn new() -> Self {
        Self {
            backends: CrunchBackends::new(),
        }
    }

    /// Starts configuring a decoder.
    pub fn builder() -> TextureDecoderBuilder {
        TextureDecoderBuilder::new()
    }

    /// The registered crunch unpackers.
    pub fn backends(&self) -> &CrunchBackends {
        &self.backends
    }

    /// Registers `unpacker` for `dialect`, replacing any previous one.
    pub fn set_unpacker(
        &mut self,
        dialect: CrunchDialect,
        unpacker: impl CrunchUnpacker + 'static,
    ) {
        self.backends.set(dialect, Box::new(unpacker));
    }

    /// Decodes the surface in `input` into `output`.
    ///
    /// On any error `output` is released with [`crate::ReleaseMode::Discard`] and left
    /// untouched. If either buffer cannot be pinned, `errors` is raised exactly once.
    pub fn decode<I, O, E>(
        &self,
        input: &mut I,
        output: &mut O,
        desc: SurfaceDesc,
        errors: &mut E,
    ) -> Result<(), DecodeError>
    where
        I: PinnableBuffer<Element = u8> + ?Sized,
        O: WritableBuffer<Element = u32> + ?Sized,
        E: ErrorChannel + ?Sized,
    {
        let mut pair = pin(input, output, errors)?;
        let (data, image) = pair.split();
        let result = dispatch::decode(DecodeRequest {
            input: data,
            width: desc.width,
            height: desc.height,
            output: image,
            format: desc.format,
            params: desc.params,
        });

        match result {
            Ok(()) => {
                pair.commit();
                debug!(
                    format = ?desc.format,
                    width = desc.width,
                    height = desc.height,
                    "decoded surface"
                );
                Ok(())
            }
            Err(error) => {
                drop(pair);
                debug!(
                    format = ?desc.format,
                    width = desc.width,
                    height = desc.height,
                    %error,
                    "rejected decode request"
                );
                Err(error.into())
            }
        }
    }

    /// Unpacks mip level 0 of the crunch container in `input` and decodes it into `output`.
    ///
    /// The unpacked level is freed before either buffer is released, on every path.
    pub fn decode_crunched<I, O, E>(
        &self,
        input: &mut I,
        output: &mut O,
        desc: CrunchedDesc,
        errors: &mut E,
    ) -> Result<(), DecodeError>
    where
        I: PinnableBuffer<Element = u8> + ?Sized,
        O: WritableBuffer<Element = u32> + ?Sized,
        E: ErrorChannel + ?Sized,
    {
        let mut pair = pin(input, output, errors)?;
        let (data, image) = pair.split();

        let blob = match self
            .backends
            .unpack_level_zero(desc.dialect, desc.format, data)
        {
            Ok(blob) => blob,
            Err(error) => {
                drop(pair);
                debug!(
                    format = ?desc.format,
                    dialect = ?desc.dialect,
                    %error,
                    "crunch unpack failed"
                );
                return Err(DecodeError::UnpackFailure(error));
            }
        };

        let result = dispatch::decode(DecodeRequest {
            input: blob.as_slice(),
            width: desc.width,
            height: desc.height,
            output: image,
            format: desc.format.target(),
            params: FormatParams::None,
        });
        drop(blob);

        match result {
            Ok(()) => {
                pair.commit();
                debug!(
                    format = ?desc.format,
                    dialect = ?desc.dialect,
                    width = desc.width,
                    height = desc.height,
                    "decoded crunched surface"
                );
                Ok(())
            }
            Err(error) => {
                drop(pair);
                debug!(
                    format = ?desc.format,
                    dialect = ?desc.dialect,
                    %error,
                    "rejected unpacked level"
                );
                Err(error.into())
            }
        }
    }

    /// [`TextureDecoder::decode`] over plain slices. Pinning a slice cannot fail.
    pub fn decode_slice(
        &self,
        input: &[u8],
        output: &mut [u32],
        desc: SurfaceDesc,
    ) -> Result<(), DecodeError> {
        self.decode(
            &mut ReadOnlyBuffer::new(input),
            &mut SliceBuffer::new(output),
            desc,
            &mut (),
        )
    }

    /// [`TextureDecoder::decode_crunched`] over plain slices.
    pub fn decode_crunched_slice(
        &self,
        input: &[u8],
        output: &mut [u32],
        desc: CrunchedDesc,
    ) -> Result<(), DecodeError> {
        self.decode_crunched(
            &mut ReadOnlyBuffer::new(input),
            &mut SliceBuffer::new(output),
            desc,
            &mut (),
        )
    }
}

/// Pins both buffers, raising the out-of-memory condition if either refuses.
fn pin<'i, 'o, I, O, E>(
    input: &'i mut I,
    output: &'o mut O,
    errors: &mut E,
) -> Result<PinnedPair<'i, 'o, I, O>, DecodeError>
where
    I: PinnableBuffer<Element = u8> + ?Sized,
    O: WritableBuffer<Element = u32> + ?Sized,
    E: ErrorChannel + ?Sized,
{
    acquire_pair(input, output).map_err(|failure| {
        errors.raise_out_of_memory(PIN_FAILURE_MESSAGE);
        warn!(%failure, "could not pin decode buffers");
        DecodeError::PinFailure
    })
}

/// Builder for [`TextureDecoder`].
#[derive(Default)]
pub struct TextureDecoderBuilder {
    backends: CrunchBackends,
}

impl TextureDecoderBuilder {
    /// Create a new builder without unpackers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the unpacker for [`CrunchDialect::Standard`] containers.
    pub fn standard_unpacker(mut self, unpacker: impl CrunchUnpacker + 'static) -> Self {
        self.backends.set(CrunchDialect::Standard, Box::new(unpacker));
        self
    }

    /// Sets the unpacker for [`CrunchDialect::UnityVariant`] containers.
    pub fn unity_unpacker(mut self, unpacker: impl CrunchUnpacker + 'static) -> Self {
        self.backends.set(CrunchDialect::UnityVariant, Box::new(unpacker));
        self
    }

    /// Build the decoder.
    pub fn build(self) -> TextureDecoder {
        TextureDecoder {
            backends: self.backends,
        }
    }
}
