#![no_main]

// Drives every format through dispatch with arbitrary dimensions and data.
// Any input must either decode or be rejected; panics are failures.

use libfuzzer_sys::{arbitrary, fuzz_target};
use texture_decoder_api::dispatch::{decode, DecodeRequest};
use texture_decoder_api::{AstcBlockSize, FormatParams, FormatTag};

#[derive(Clone, Debug, arbitrary::Arbitrary)]
pub struct Input {
    pub format: u8,
    pub width: u8,
    pub height: u8,
    pub param: u8,
    pub output_slack: i8,
    pub data: Vec<u8>,
}

fuzz_target!(|input: Input| {
    let formats = FormatTag::all_values();
    let format = formats[input.format as usize % formats.len()];
    let params = match format {
        FormatTag::Pvrtc => FormatParams::Pvrtc {
            is_2bpp: input.param & 1 != 0,
        },
        FormatTag::Astc => match AstcBlockSize::new(input.param) {
            Some(block_size) => FormatParams::Astc { block_size },
            None => FormatParams::None,
        },
        _ => FormatParams::None,
    };

    let width = input.width as u32;
    let height = input.height as u32;
    let pixels = (width * height) as usize;
    let output_len = pixels.saturating_add_signed(input.output_slack as isize);
    let mut output = vec![0u32; output_len];

    let result = decode(DecodeRequest {
        input: &input.data,
        width,
        height,
        output: &mut output,
        format,
        params,
    });

    if output_len < pixels {
        assert!(result.is_err());
    }
});
