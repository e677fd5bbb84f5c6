#![no_main]

// Compares our BC3 decoder against rgbcx-sys.
// BC3 pairs a BC1 style colour block with a BC4 style alpha block.

use libfuzzer_sys::{arbitrary, fuzz_target};
use rgbcx_sys::root::rgbcx;
use texture_decoder_codecs::bc3::decode_bc3_block;

#[derive(Clone, Debug, arbitrary::Arbitrary)]
pub struct Bc3Block {
    pub bytes: [u8; 16],
}

fuzz_target!(|block: Bc3Block| {
    // rgbcx switches to three colour mode when c0 <= c1; BC3 always uses four colours.
    let c0 = u16::from_le_bytes([block.bytes[8], block.bytes[9]]);
    let c1 = u16::from_le_bytes([block.bytes[10], block.bytes[11]]);
    if c0 <= c1 {
        return;
    }

    let mut ours = [0u32; 16];
    decode_bc3_block(&block.bytes, &mut ours, 4);

    let reference = rgbcx_decode_bc3(&block.bytes);
    assert_eq!(ours, reference, "Decoded blocks don't match");
});

fn rgbcx_decode_bc3(bc3_block: &[u8; 16]) -> [u32; 16] {
    let mut rgba_buffer = [0u8; 4 * 16];
    unsafe {
        rgbcx::unpack_bc3(
            bc3_block.as_ptr() as *const core::ffi::c_void,
            rgba_buffer.as_mut_ptr() as *mut core::ffi::c_void,
            rgbcx::bc1_approx_mode::cBC1Ideal,
        );
    }

    let mut pixels = [0u32; 16];
    for (pixel, rgba) in pixels.iter_mut().zip(rgba_buffer.chunks_exact(4)) {
        *pixel = u32::from_ne_bytes([rgba[0], rgba[1], rgba[2], rgba[3]]);
    }
    pixels
}
