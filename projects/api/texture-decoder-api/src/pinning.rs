//! Scoped, pointer stable access to caller owned buffers.
//!
//! A decode call pins the compressed input and the decoded output as a pair
//! ([`acquire_pair`]), works on the raw memory, then releases both. Each buffer binding decides
//! what a release means: a binding backed by a runtime that copies on pin writes the copy back
//! on [`ReleaseMode::Commit`] and throws it away on [`ReleaseMode::Discard`].
//!
//! While a pair is held the holder must not allocate (beyond the unpack step), log, block, or
//! pin another pair.

use core::ffi::CStr;
use core::marker::PhantomData;
use core::mem::ManuallyDrop;
use core::ptr::NonNull;
use core::slice;
use thiserror::Error;

/// Message passed to [`ErrorChannel::raise_out_of_memory`] when a buffer cannot be pinned.
pub const PIN_FAILURE_MESSAGE: &CStr = c"Failed to get critical array access.";

/// How a pinned view is given back to its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseMode {
    /// The contents are meaningful. Bindings that pinned a copy write it back.
    Commit,
    /// Abort; any copy is dropped without write back.
    Discard,
}

/// The owner refused to hand out stable access to a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Failed to get critical array access.")]
pub struct PinFailure;

/// A caller owned buffer that can be temporarily pinned.
pub trait PinnableBuffer {
    /// Element type of the buffer.
    type Element;

    /// Pins the buffer, returning a stable pointer and the length in elements.
    fn acquire(&mut self) -> Result<(NonNull<Self::Element>, usize), PinFailure>;

    /// Unpins the buffer.
    ///
    /// # Safety
    ///
    /// `ptr` must be the pointer returned by the matching [`PinnableBuffer::acquire`], and each
    /// successful acquire must be released exactly once.
    unsafe fn release(&mut self, ptr: NonNull<Self::Element>, mode: ReleaseMode);
}

/// Marker for bindings whose pinned memory may be written to.
///
/// # Safety
///
/// The pointer returned by [`PinnableBuffer::acquire`] must be valid for writes of `len`
/// elements until it is released.
pub unsafe trait WritableBuffer: PinnableBuffer {}

/// Receives the out-of-memory condition raised on a pin failure.
pub trait ErrorChannel {
    /// Raises an out-of-memory condition on the caller's side.
    fn raise_out_of_memory(&mut self, message: &'static CStr);
}

/// Ignores all errors.
impl ErrorChannel for () {
    fn raise_out_of_memory(&mut self, _message: &'static CStr) {}
}

impl<E: ErrorChannel + ?Sized> ErrorChannel for &mut E {
    fn raise_out_of_memory(&mut self, message: &'static CStr) {
        (**self).raise_out_of_memory(message)
    }
}

/// Binding for a mutable Rust slice. Pinning cannot fail.
pub struct SliceBuffer<'a, T>(&'a mut [T]);

impl<'a, T> SliceBuffer<'a, T> {
    /// Wraps `slice`.
    pub fn new(slice: &'a mut [T]) -> Self {
        Self(slice)
    }
}

impl<T> PinnableBuffer for SliceBuffer<'_, T> {
    type Element = T;

    fn acquire(&mut self) -> Result<(NonNull<T>, usize), PinFailure> {
        Ok((NonNull::from(&mut *self.0).cast(), self.0.len()))
    }

    unsafe fn release(&mut self, _ptr: NonNull<T>, _mode: ReleaseMode) {}
}

// Safety: the pointer comes from a unique borrow of the slice.
unsafe impl<T> WritableBuffer for SliceBuffer<'_, T> {}

/// Binding for a shared Rust slice. Pinning cannot fail; the memory is never written.
pub struct ReadOnlyBuffer<'a, T>(&'a [T]);

impl<'a, T> ReadOnlyBuffer<'a, T> {
    /// Wraps `slice`.
    pub fn new(slice: &'a [T]) -> Self {
        Self(slice)
    }
}

impl<T> PinnableBuffer for ReadOnlyBuffer<'_, T> {
    type Element = T;

    fn acquire(&mut self) -> Result<(NonNull<T>, usize), PinFailure> {
        Ok((NonNull::from(self.0).cast(), self.0.len()))
    }

    unsafe fn release(&mut self, _ptr: NonNull<T>, _mode: ReleaseMode) {}
}

/// Binding for a read only buffer handed over as a raw pointer and length.
///
/// A null pointer is treated like a runtime that refuses critical access: pinning fails.
pub struct RawBuffer<'a, T> {
    ptr: *const T,
    len: usize,
    _marker: PhantomData<&'a [T]>,
}

impl<T> RawBuffer<'_, T> {
    /// # Safety
    ///
    /// If non-null, `ptr` must be valid for reads of `len` elements for the lifetime of the
    /// binding and must not be written to while pinned.
    pub unsafe fn new(ptr: *const T, len: usize) -> Self {
        Self {
            ptr,
            len,
            _marker: PhantomData,
        }
    }
}

impl<T> PinnableBuffer for RawBuffer<'_, T> {
    type Element = T;

    fn acquire(&mut self) -> Result<(NonNull<T>, usize), PinFailure> {
        let ptr = NonNull::new(self.ptr as *mut T).ok_or(PinFailure)?;
        Ok((ptr, self.len))
    }

    unsafe fn release(&mut self, _ptr: NonNull<T>, _mode: ReleaseMode) {}
}

/// Binding for a writable buffer handed over as a raw pointer and length.
///
/// A null pointer makes pinning fail.
pub struct RawBufferMut<'a, T> {
    ptr: *mut T,
    len: usize,
    _marker: PhantomData<&'a mut [T]>,
}

impl<T> RawBufferMut<'_, T> {
    /// # Safety
    ///
    /// If non-null, `ptr` must be valid for reads and writes of `len` elements for the
    /// lifetime of the binding and must not be accessed through any other path while pinned.
    pub unsafe fn new(ptr: *mut T, len: usize) -> Self {
        Self {
            ptr,
            len,
            _marker: PhantomData,
        }
    }
}

impl<T> PinnableBuffer for RawBufferMut<'_, T> {
    type Element = T;

    fn acquire(&mut self) -> Result<(NonNull<T>, usize), PinFailure> {
        let ptr = NonNull::new(self.ptr).ok_or(PinFailure)?;
        Ok((ptr, self.len))
    }

    unsafe fn release(&mut self, _ptr: NonNull<T>, _mode: ReleaseMode) {}
}

// Safety: guaranteed by the contract of `RawBufferMut::new`.
unsafe impl<T> WritableBuffer for RawBufferMut<'_, T> {}

/// Exclusive access to one pinned buffer.
///
/// Released exactly once: explicitly through [`PinnedView::release`], or with
/// [`ReleaseMode::Discard`] when dropped.
pub struct PinnedView<'a, B: PinnableBuffer + ?Sized> {
    buffer: &'a mut B,
    ptr: NonNull<B::Element>,
    len: usize,
}

impl<'a, B: PinnableBuffer + ?Sized> PinnedView<'a, B> {
    /// Pins `buffer`.
    pub fn acquire(buffer: &'a mut B) -> Result<Self, PinFailure> {
        let (ptr, len) = buffer.acquire()?;
        Ok(Self { buffer, ptr, len })
    }

    /// Length of the pinned buffer in elements.
    pub fn len(&self) -> usize {
        self.len
    }

    /// `true` if the pinned buffer holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The pinned memory.
    pub fn as_slice(&self) -> &[B::Element] {
        // Safety: the binding guarantees `ptr` is valid for `len` reads until released.
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    /// Unpins the buffer with the given mode.
    pub fn release(self, mode: ReleaseMode) {
        let mut this = ManuallyDrop::new(self);
        let ptr = this.ptr;
        // Safety: `ptr` came from `acquire`; `ManuallyDrop` stops `Drop` releasing it again.
        unsafe { this.buffer.release(ptr, mode) }
    }
}

impl<B: WritableBuffer + ?Sized> PinnedView<'_, B> {
    /// The pinned memory, writable.
    pub fn as_mut_slice(&mut self) -> &mut [B::Element] {
        // Safety: `WritableBuffer` guarantees `ptr` is valid for `len` writes until released.
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }
}

impl<B: PinnableBuffer + ?Sized> Drop for PinnedView<'_, B> {
    fn drop(&mut self) {
        // Safety: `ptr` came from `acquire` and has not been released.
        unsafe { self.buffer.release(self.ptr, ReleaseMode::Discard) }
    }
}

/// A pinned input and output buffer, released together.
///
/// Dropping an uncommitted pair discards both, output first.
pub struct PinnedPair<'i, 'o, I, O>
where
    I: PinnableBuffer + ?Sized,
    O: WritableBuffer + ?Sized,
{
    // Field order is release order.
    output: PinnedView<'o, O>,
    input: PinnedView<'i, I>,
}

/// Pins `input`, then `output`.
///
/// If the output cannot be pinned the input is released with [`ReleaseMode::Discard`] before
/// the failure is returned.
pub fn acquire_pair<'i, 'o, I, O>(
    input: &'i mut I,
    output: &'o mut O,
) -> Result<PinnedPair<'i, 'o, I, O>, PinFailure>
where
    I: PinnableBuffer + ?Sized,
    O: WritableBuffer + ?Sized,
{
    let input = PinnedView::acquire(input)?;
    let output = PinnedView::acquire(output)?;
    Ok(PinnedPair { output, input })
}

impl<I, O> PinnedPair<'_, '_, I, O>
where
    I: PinnableBuffer + ?Sized,
    O: WritableBuffer + ?Sized,
{
    /// Pinned input (read only) and output (writable) memory.
    pub fn split(&mut self) -> (&[I::Element], &mut [O::Element]) {
        (self.input.as_slice(), self.output.as_mut_slice())
    }

    /// Releases the output with [`ReleaseMode::Commit`], then the input with
    /// [`ReleaseMode::Discard`].
    pub fn commit(self) {
        let Self { output, input } = self;
        output.release(ReleaseMode::Commit);
        input.release(ReleaseMode::Discard);
    }
}
