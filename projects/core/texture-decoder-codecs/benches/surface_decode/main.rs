use core::slice;
use criterion::{criterion_group, criterion_main, Criterion};
use texture_decoder_codecs::{
    astc::decode_astc, bc1::decode_bc1, bc3::decode_bc3, bc7::decode_bc7, etc::decode_etc2_rgb,
    pvrtc::decode_pvrtc_4bpp, CodecError,
};
use texture_decoder_common::allocate::allocate_align_64;

#[cfg(all(
    any(target_os = "linux", target_os = "macos"),
    any(target_arch = "x86", target_arch = "x86_64", target_arch = "aarch64")
))]
use pprof::criterion::{Output, PProfProfiler};

const WIDTH: usize = 1024;
const HEIGHT: usize = 1024;

type SurfaceDecoder = fn(&[u8], usize, usize, &mut [u32]) -> Result<(), CodecError>;

fn decode_astc_4x4(
    data: &[u8],
    width: usize,
    height: usize,
    image: &mut [u32],
) -> Result<(), CodecError> {
    decode_astc(data, width, height, image, 4)
}

fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("Surface Decode");

    let decoders: [(&str, SurfaceDecoder, usize); 6] = [
        ("bc1", decode_bc1, 8),
        ("bc3", decode_bc3, 16),
        ("bc7", decode_bc7, 16),
        ("etc2_rgb", decode_etc2_rgb, 8),
        ("pvrtc_4bpp", decode_pvrtc_4bpp, 8),
        ("astc_4x4", decode_astc_4x4, 16),
    ];

    let pixels = WIDTH * HEIGHT;
    let mut output = allocate_align_64(pixels * 4).unwrap();

    for (name, decode, block_bytes) in decoders {
        let input_size = (pixels / 16) * block_bytes;
        let mut input = allocate_align_64(input_size).unwrap();

        // Simple pattern; real-world data would have more variety, but this is suitable for benchmarking
        for (i, byte) in input.as_mut_slice().iter_mut().enumerate() {
            *byte = (i % 255) as u8;
        }

        group.throughput(criterion::Throughput::Bytes(input_size as u64));
        group.bench_function(name, |b| {
            b.iter(|| {
                let image = unsafe {
                    slice::from_raw_parts_mut(output.as_mut_ptr() as *mut u32, pixels)
                };
                decode(input.as_slice(), WIDTH, HEIGHT, image).unwrap();
            })
        });
    }

    group.finish();
}

#[cfg(all(
    any(target_os = "linux", target_os = "macos"),
    any(target_arch = "x86", target_arch = "x86_64", target_arch = "aarch64")
))]
criterion_group! {
    name = benches;
    config = Criterion::default().with_profiler(PProfProfiler::new(100, Output::Flamegraph(None)));
    targets = criterion_benchmark
}

#[cfg(not(all(
    any(target_os = "linux", target_os = "macos"),
    any(target_arch = "x86", target_arch = "x86_64", target_arch = "aarch64")
)))]
criterion_group! {
    name = benches;
    config = Criterion::default();
    targets = criterion_benchmark
}

criterion_main!(benches);
