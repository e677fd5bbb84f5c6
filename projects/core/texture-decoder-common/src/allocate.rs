//! Memory allocation utilities for the texture decoders.
//!
//! ## Useful APIs
//!
//! [`allocate_align_64`]: Allocates uninitialized memory aligned to 64-bytes.
//! [`allocate_align_64_copy`]: Allocates aligned memory holding a copy of a byte slice.
//!
//! Memory is automatically deallocated when the returned [`RawAlloc`] is dropped.

use core::alloc::LayoutError;
use safe_allocator_api::prelude::{AllocError, Layout};
use safe_allocator_api::RawAlloc;
use thiserror::Error;

/// Allocates data with an alignment of 64 bytes.
///
/// # Parameters
///
/// - `num_bytes`: The number of bytes to allocate
///
/// # Returns
///
/// A [`RawAlloc`] containing the allocated data
pub fn allocate_align_64(num_bytes: usize) -> Result<RawAlloc, AllocateError> {
    if num_bytes == 0 {
        return Err(AllocateError::ZeroSized);
    }

    let layout = Layout::from_size_align(num_bytes, 64)?;
    Ok(RawAlloc::new(layout)?)
}

/// Allocates data with an alignment of 64 bytes and fills it with a copy of `bytes`.
///
/// # Returns
///
/// A [`RawAlloc`] of exactly `bytes.len()` bytes
pub fn allocate_align_64_copy(bytes: &[u8]) -> Result<RawAlloc, AllocateError> {
    let mut alloc = allocate_align_64(bytes.len())?;
    alloc.as_mut_slice().copy_from_slice(bytes);
    Ok(alloc)
}

/// An error that happened in memory allocation within the library.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AllocateError {
    /// An error that occurred while creating a layout for allocation.
    #[error("Invalid layout provided. Likely due to `num_bytes` in `allocate_align_64` being larger than isize::MAX. {0}")]
    LayoutError(#[from] LayoutError),

    /// An error that occurred while allocating memory.
    #[error(transparent)]
    AllocationFailed(#[from] AllocError),

    /// A zero byte allocation was requested.
    #[error("Zero sized allocations are not supported")]
    ZeroSized,
}
