//! Test prelude for the decode bridge.
//!
//! Buffer bindings that count, log, fail or copy on pin, an error channel that records what
//! it was raised with, and mock crunch unpackers.

// External crates commonly used in tests
pub use rstest::rstest;

// Re-export super for convenience in test modules
pub use super::*;

pub use crate::crunch::{CrunchHeader, UnpackedBlob};
pub use crate::pinning::{PinFailure, PinnableBuffer, ReleaseMode, WritableBuffer};

use core::cell::{Cell, RefCell};
use core::ffi::{CStr, c_void};
use core::marker::PhantomData;
use core::ptr::NonNull;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use texture_decoder_common::color_8888::Color8888;

/// Value no decoder produces for the test inputs; marks untouched pixels.
pub(crate) const SENTINEL: u32 = 0xDEAD_BEEF;

pub(crate) const CRN_FORMAT_DXT1: u8 = 0;
pub(crate) const CRN_FORMAT_DXT5: u8 = 2;
pub(crate) const CRN_FORMAT_ETC1: u8 = 10;
pub(crate) const CRN_FORMAT_ETC2A: u8 = 12;

/// Byte mask separating the mock Unity bitstream from the mock standard one.
const UNITY_MASK: u8 = 0x5A;

/// Colour of every pixel of [`bc1_solid_blocks`].
pub(crate) const BC1_SOLID_RED: u32 = Color8888::new(255, 0, 0, 255).to_packed();

/// Colour of every pixel of [`astc_void_extent_blocks`].
pub(crate) const ASTC_VOID_EXTENT_COLOUR: u32 = Color8888::new(255, 0, 255, 255).to_packed();

/// `count` BC1 blocks that decode to opaque red.
pub(crate) fn bc1_solid_blocks(count: usize) -> Vec<u8> {
    [0x00, 0xF8, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00].repeat(count)
}

/// `count` ASTC void-extent blocks of an opaque magenta.
pub(crate) fn astc_void_extent_blocks(count: usize) -> Vec<u8> {
    let mut block = [0xFFu8; 16];
    block[0] = 0xFC;
    block[1] = 0xFD;
    block[8..16].copy_from_slice(&[0xFF, 0xFF, 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF]);
    block.repeat(count)
}

/// Deterministic block data covering an 8x8 surface of `format`.
pub(crate) fn sample_payload(format: FormatTag) -> Vec<u8> {
    let len = required_input_len(format, FormatParams::None, 8, 8).unwrap();
    (0..len).map(|x| (x * 53 + 7) as u8).collect()
}

/// A single level crunch container whose level data is `payload` stored as is.
pub(crate) fn crunch_container(format: u8, width: u16, height: u16, payload: &[u8]) -> Vec<u8> {
    let data_size = (74 + payload.len()) as u32;
    let mut container = vec![0u8; 74];
    container[0..2].copy_from_slice(b"Hx");
    container[2..4].copy_from_slice(&74u16.to_be_bytes());
    container[6..10].copy_from_slice(&data_size.to_be_bytes());
    container[12..14].copy_from_slice(&width.to_be_bytes());
    container[14..16].copy_from_slice(&height.to_be_bytes());
    container[16] = 1;
    container[17] = 1;
    container[18] = format;
    container[70..74].copy_from_slice(&74u32.to_be_bytes());
    container.extend_from_slice(payload);
    container
}

/// Same as [`crunch_container`], but the level data is masked the way [`PayloadUnpacker::unity`]
/// expects.
pub(crate) fn unity_crunch_container(format: u8, width: u16, height: u16, payload: &[u8]) -> Vec<u8> {
    let masked: Vec<u8> = payload.iter().map(|b| b ^ UNITY_MASK).collect();
    crunch_container(format, width, height, &masked)
}

/// Installs a fmt subscriber so decode events show up in failing test output.
pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Acquire and release tallies shared between [`CountingBuffer`]s.
#[derive(Default)]
pub(crate) struct PinCounters {
    acquires: Cell<usize>,
    releases: Cell<usize>,
    commits: Cell<usize>,
}

impl PinCounters {
    pub(crate) fn acquires(&self) -> usize {
        self.acquires.get()
    }

    pub(crate) fn releases(&self) -> usize {
        self.releases.get()
    }

    pub(crate) fn commits(&self) -> usize {
        self.commits.get()
    }
}

/// Counts successful acquires and every release of the wrapped binding.
pub(crate) struct CountingBuffer<'c, B> {
    inner: B,
    counters: &'c PinCounters,
}

impl<'c, B> CountingBuffer<'c, B> {
    pub(crate) fn new(inner: B, counters: &'c PinCounters) -> Self {
        Self { inner, counters }
    }
}

impl<B: PinnableBuffer> PinnableBuffer for CountingBuffer<'_, B> {
    type Element = B::Element;

    fn acquire(&mut self) -> Result<(NonNull<B::Element>, usize), PinFailure> {
        let pinned = self.inner.acquire()?;
        self.counters.acquires.set(self.counters.acquires.get() + 1);
        Ok(pinned)
    }

    unsafe fn release(&mut self, ptr: NonNull<B::Element>, mode: ReleaseMode) {
        self.counters.releases.set(self.counters.releases.get() + 1);
        if mode == ReleaseMode::Commit {
            self.counters.commits.set(self.counters.commits.get() + 1);
        }
        unsafe { self.inner.release(ptr, mode) }
    }
}

unsafe impl<B: WritableBuffer> WritableBuffer for CountingBuffer<'_, B> {}

/// Release order, as `(buffer name, mode)`.
#[derive(Default)]
pub(crate) struct ReleaseLog(RefCell<Vec<(&'static str, ReleaseMode)>>);

impl ReleaseLog {
    pub(crate) fn entries(&self) -> Vec<(&'static str, ReleaseMode)> {
        self.0.borrow().clone()
    }
}

/// Records every release of the wrapped binding under `name`.
pub(crate) struct LoggingBuffer<'l, B> {
    inner: B,
    name: &'static str,
    log: &'l ReleaseLog,
}

impl<'l, B> LoggingBuffer<'l, B> {
    pub(crate) fn new(inner: B, name: &'static str, log: &'l ReleaseLog) -> Self {
        Self { inner, name, log }
    }
}

impl<B: PinnableBuffer> PinnableBuffer for LoggingBuffer<'_, B> {
    type Element = B::Element;

    fn acquire(&mut self) -> Result<(NonNull<B::Element>, usize), PinFailure> {
        self.inner.acquire()
    }

    unsafe fn release(&mut self, ptr: NonNull<B::Element>, mode: ReleaseMode) {
        self.log.0.borrow_mut().push((self.name, mode));
        unsafe { self.inner.release(ptr, mode) }
    }
}

unsafe impl<B: WritableBuffer> WritableBuffer for LoggingBuffer<'_, B> {}

/// A buffer whose owner always refuses to pin it.
pub(crate) struct FailingBuffer<T>(PhantomData<T>);

impl<T> Default for FailingBuffer<T> {
    fn default() -> Self {
        Self(PhantomData)
    }
}

impl<T> PinnableBuffer for FailingBuffer<T> {
    type Element = T;

    fn acquire(&mut self) -> Result<(NonNull<T>, usize), PinFailure> {
        Err(PinFailure)
    }

    unsafe fn release(&mut self, _ptr: NonNull<T>, _mode: ReleaseMode) {
        panic!("released a buffer that was never pinned");
    }
}

unsafe impl<T> WritableBuffer for FailingBuffer<T> {}

/// Pins a private copy and writes it back only on [`ReleaseMode::Commit`], like a runtime
/// that cannot hand out its own memory.
pub(crate) struct CopyBackBuffer<'a, T: Copy> {
    target: &'a mut [T],
    copy: Vec<T>,
}

impl<'a, T: Copy> CopyBackBuffer<'a, T> {
    pub(crate) fn new(target: &'a mut [T]) -> Self {
        Self {
            target,
            copy: Vec::new(),
        }
    }
}

impl<T: Copy> PinnableBuffer for CopyBackBuffer<'_, T> {
    type Element = T;

    fn acquire(&mut self) -> Result<(NonNull<T>, usize), PinFailure> {
        self.copy = self.target.to_vec();
        Ok((NonNull::from(self.copy.as_mut_slice()).cast(), self.copy.len()))
    }

    unsafe fn release(&mut self, _ptr: NonNull<T>, mode: ReleaseMode) {
        let copy = core::mem::take(&mut self.copy);
        if mode == ReleaseMode::Commit {
            self.target.copy_from_slice(&copy);
        }
    }
}

unsafe impl<T: Copy> WritableBuffer for CopyBackBuffer<'_, T> {}

/// Error channel that keeps every message it was raised with.
#[derive(Default)]
pub(crate) struct RecordingChannel {
    pub(crate) messages: Vec<String>,
}

impl ErrorChannel for RecordingChannel {
    fn raise_out_of_memory(&mut self, message: &'static CStr) {
        self.messages.push(message.to_string_lossy().into_owned());
    }
}

/// Mock unpacker: the level data is stored after the header, masked per dialect.
pub(crate) struct PayloadUnpacker {
    dialect: CrunchDialect,
    mask: u8,
    calls: Option<Arc<AtomicUsize>>,
}

impl PayloadUnpacker {
    pub(crate) fn standard() -> Self {
        Self {
            dialect: CrunchDialect::Standard,
            mask: 0,
            calls: None,
        }
    }

    pub(crate) fn unity() -> Self {
        Self {
            dialect: CrunchDialect::UnityVariant,
            mask: UNITY_MASK,
            calls: None,
        }
    }

    pub(crate) fn counting(mut self, calls: Arc<AtomicUsize>) -> Self {
        self.calls = Some(calls);
        self
    }
}

impl CrunchUnpacker for PayloadUnpacker {
    fn unpack_level(&self, data: &[u8], level: u32) -> Result<UnpackedBlob, UnpackError> {
        if let Some(calls) = &self.calls {
            calls.fetch_add(1, Ordering::SeqCst);
        }
        if level != 0 {
            return Err(UnpackError::UnpackFailed { level });
        }

        let header = CrunchHeader::parse(data, self.dialect)?;
        let payload = &data[header.level0_offset as usize..header.data_size as usize];
        let level_data: Vec<u8> = payload.iter().map(|b| b ^ self.mask).collect();
        UnpackedBlob::from_slice(&level_data)
    }
}

/// Counts frees of buffers handed out by [`ForeignUnpacker`].
#[derive(Clone, Default)]
pub(crate) struct FreeCounter(Arc<AtomicUsize>);

impl FreeCounter {
    pub(crate) fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    pub(crate) fn context(&self) -> *mut c_void {
        Arc::as_ptr(&self.0) as *mut c_void
    }
}

/// Frees a boxed slice created by [`leak_level`] and bumps the [`FreeCounter`] in `context`.
pub(crate) unsafe extern "C" fn free_leaked_level(context: *mut c_void, data: *mut u8, size: u32) {
    unsafe {
        drop(Box::from_raw(core::ptr::slice_from_raw_parts_mut(
            data,
            size as usize,
        )));
        (*(context as *const AtomicUsize)).fetch_add(1, Ordering::SeqCst);
    }
}

/// Moves `bytes` to the heap the way a foreign unpacker would, returning pointer and size.
pub(crate) fn leak_level(bytes: Vec<u8>) -> (*mut u8, u32) {
    let size = bytes.len() as u32;
    (Box::into_raw(bytes.into_boxed_slice()) as *mut u8, size)
}

/// Mock unpacker handing out foreign buffers, optionally failing after allocating one.
pub(crate) struct ForeignUnpacker {
    frees: FreeCounter,
    level: Option<Vec<u8>>,
    succeed: bool,
}

impl ForeignUnpacker {
    pub(crate) fn new(frees: FreeCounter, level: Option<Vec<u8>>, succeed: bool) -> Self {
        Self {
            frees,
            level,
            succeed,
        }
    }
}

impl CrunchUnpacker for ForeignUnpacker {
    fn unpack_level(&self, _data: &[u8], level: u32) -> Result<UnpackedBlob, UnpackError> {
        let blob = self.level.clone().map(|bytes| {
            let (ptr, size) = leak_level(bytes);
            unsafe {
                UnpackedBlob::from_foreign(
                    NonNull::new(ptr).unwrap(),
                    size,
                    self.frees.context(),
                    free_leaked_level,
                )
            }
        });

        match (self.succeed, blob) {
            (true, Some(blob)) => Ok(blob),
            (true, None) => Err(UnpackError::EmptyLevel { level }),
            (false, _) => Err(UnpackError::UnpackFailed { level }),
        }
    }
}
