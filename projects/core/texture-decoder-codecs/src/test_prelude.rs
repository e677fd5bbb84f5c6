//! Common test imports and utilities for codec tests

// External crates commonly used in tests
pub use rstest::rstest;

pub use texture_decoder_common::color_8888::Color8888;

pub use crate::error::CodecError;

/// Value no decoder ever produces for the test inputs; marks untouched pixels.
pub(crate) const SENTINEL: u32 = 0xDEAD_BEEF;

/// Packs a colour the same way the decoders do.
pub(crate) const fn rgba(r: u8, g: u8, b: u8, a: u8) -> u32 {
    Color8888::new(r, g, b, a).to_packed()
}

/// Decodes a single `width x height` surface and returns the pixels.
pub(crate) fn decode_surface(
    decode: impl Fn(&[u8], usize, usize, &mut [u32]) -> Result<(), CodecError>,
    data: &[u8],
    width: usize,
    height: usize,
) -> Vec<u32> {
    let mut image = vec![SENTINEL; width * height];
    decode(data, width, height, &mut image).unwrap();
    image
}

/// Asserts a surface decoder leaves the destination untouched on short input.
pub(crate) fn assert_rejects_short_input(
    decode: impl Fn(&[u8], usize, usize, &mut [u32]) -> Result<(), CodecError>,
    block_bytes: usize,
) {
    let data = vec![0u8; block_bytes - 1];
    let mut image = [SENTINEL; 16];
    assert_eq!(
        decode(&data, 4, 4, &mut image),
        Err(CodecError::InputTooSmall {
            needed: block_bytes,
            actual: block_bytes - 1
        })
    );
    assert!(image.iter().all(|&p| p == SENTINEL));
}
