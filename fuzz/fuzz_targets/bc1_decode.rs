#![no_main]

// Compares our BC1 decoder against rgbcx-sys using the Ideal method.
// Extra reading: https://fgiesen.wordpress.com/2021/10/04/gpu-bcn-decoding/

use libfuzzer_sys::{arbitrary, fuzz_target};
use rgbcx_sys::root::rgbcx;
use texture_decoder_codecs::bc1::decode_bc1_block;

#[derive(Clone, Debug, arbitrary::Arbitrary)]
pub struct Bc1Block {
    pub bytes: [u8; 8],
}

fuzz_target!(|block: Bc1Block| {
    let mut ours = [0u32; 16];
    decode_bc1_block(&block.bytes, &mut ours, 4);

    let reference = rgbcx_decode_bc1(&block.bytes);
    assert_eq!(ours, reference, "Decoded blocks don't match");
});

/// Decodes with rgbcx-sys and packs each RGBA pixel the same way our surfaces do.
fn rgbcx_decode_bc1(bc1_block: &[u8; 8]) -> [u32; 16] {
    let mut rgba_buffer = [0u8; 4 * 16];
    unsafe {
        rgbcx::unpack_bc1(
            bc1_block.as_ptr() as *const ::std::os::raw::c_void,
            rgba_buffer.as_mut_ptr() as *mut ::std::os::raw::c_void,
            true, // set_alpha
            rgbcx::bc1_approx_mode::cBC1Ideal,
        );
    }

    let mut pixels = [0u32; 16];
    for (pixel, rgba) in pixels.iter_mut().zip(rgba_buffer.chunks_exact(4)) {
        *pixel = u32::from_ne_bytes([rgba[0], rgba[1], rgba[2], rgba[3]]);
    }
    pixels
}
