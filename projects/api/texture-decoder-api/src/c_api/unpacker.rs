//! C-compatible crunch unpacker interface.

use crate::crunch::{CrunchUnpacker, ForeignFreeFn, UnpackedBlob};
use crate::error::UnpackError;
use core::ffi::c_void;
use core::ptr::{self, NonNull};

/// Function pointer type for [`CrunchUnpacker::unpack_level`].
///
/// # Parameters
/// - `context`: User-provided context (can be null)
/// - `data`: Pointer to the crunch container
/// - `data_size`: Length of the container in bytes
/// - `level_index`: Mip level to unpack (always 0)
/// - `ret`: Output parameter for the unpacked level, allocated by the callee
/// - `ret_size`: Output parameter for the unpacked level's size in bytes
///
/// # Returns
/// `true` on success. On failure `*ret` may still hold a partially filled buffer; it is
/// released through [`TdecFreeLevelFn`].
pub type TdecUnpackLevelFn = unsafe extern "C" fn(
    context: *mut c_void,
    data: *const u8,
    data_size: u32,
    level_index: u32,
    ret: *mut *mut u8,
    ret_size: *mut u32,
) -> bool;

/// Function pointer type for releasing a buffer returned through [`TdecUnpackLevelFn`].
///
/// # Parameters
/// - `context`: The same context passed to [`TdecUnpackLevelFn`]
/// - `data`: The buffer to free
/// - `size`: The size reported for the buffer
pub type TdecFreeLevelFn = ForeignFreeFn;

/// C-compatible crunch unpacker that wraps function pointers.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct TdecCrunchUnpacker {
    /// User-provided context passed to all callbacks
    pub context: *mut c_void,
    /// Function to unpack a single mip level
    pub unpack_level: TdecUnpackLevelFn,
    /// Function to free a buffer produced by `unpack_level`
    pub free_level: TdecFreeLevelFn,
}

// Safety: TdecCrunchUnpacker is Send if the context pointer is Send
unsafe impl Send for TdecCrunchUnpacker {}

// Safety: TdecCrunchUnpacker is Sync if the context pointer is Sync
unsafe impl Sync for TdecCrunchUnpacker {}

impl CrunchUnpacker for TdecCrunchUnpacker {
    fn unpack_level(&self, data: &[u8], level: u32) -> Result<UnpackedBlob, UnpackError> {
        let data_size =
            u32::try_from(data.len()).map_err(|_| UnpackError::StreamTooLarge(data.len()))?;

        let mut ret: *mut u8 = ptr::null_mut();
        let mut ret_size = 0u32;
        let unpacked = unsafe {
            (self.unpack_level)(
                self.context,
                data.as_ptr(),
                data_size,
                level,
                &mut ret,
                &mut ret_size,
            )
        };

        // Take ownership first so a partial buffer is freed on the failure path too.
        let blob = NonNull::new(ret).map(|ptr| unsafe {
            UnpackedBlob::from_foreign(ptr, ret_size, self.context, self.free_level)
        });

        match (unpacked, blob) {
            (true, Some(blob)) => Ok(blob),
            (true, None) => Err(UnpackError::EmptyLevel { level }),
            (false, _) => Err(UnpackError::UnpackFailed { level }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_prelude::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Context shared with the mock callbacks.
    struct MockState {
        level: Vec<u8>,
        succeed: bool,
        calls: AtomicUsize,
        frees: FreeCounter,
    }

    unsafe extern "C" fn mock_unpack(
        context: *mut c_void,
        data: *const u8,
        data_size: u32,
        level_index: u32,
        ret: *mut *mut u8,
        ret_size: *mut u32,
    ) -> bool {
        let state = unsafe { &*(context as *const MockState) };
        state.calls.fetch_add(1, Ordering::SeqCst);
        assert!(!data.is_null());
        assert_eq!(level_index, 0);
        assert!(data_size > 0);

        let (ptr, size) = leak_level(state.level.clone());
        unsafe {
            *ret = ptr;
            *ret_size = size;
        }
        state.succeed
    }

    unsafe extern "C" fn mock_free(context: *mut c_void, data: *mut u8, size: u32) {
        let state = unsafe { &*(context as *const MockState) };
        unsafe { free_leaked_level(state.frees.context(), data, size) }
    }

    unsafe extern "C" fn null_unpack(
        _context: *mut c_void,
        _data: *const u8,
        _data_size: u32,
        _level_index: u32,
        _ret: *mut *mut u8,
        _ret_size: *mut u32,
    ) -> bool {
        true
    }

    fn unpacker(state: &MockState) -> TdecCrunchUnpacker {
        TdecCrunchUnpacker {
            context: state as *const MockState as *mut c_void,
            unpack_level: mock_unpack,
            free_level: mock_free,
        }
    }

    fn state(level: Vec<u8>, succeed: bool) -> MockState {
        MockState {
            level,
            succeed,
            calls: AtomicUsize::new(0),
            frees: FreeCounter::default(),
        }
    }

    #[test]
    fn successful_unpack_is_freed_on_drop() {
        let state = state(vec![4, 5, 6], true);
        let blob = unpacker(&state).unpack_level(&[1, 2], 0).unwrap();

        assert_eq!(blob.as_slice(), &[4, 5, 6]);
        assert_eq!(state.frees.count(), 0);
        drop(blob);
        assert_eq!(state.calls.load(Ordering::SeqCst), 1);
        assert_eq!(state.frees.count(), 1);
    }

    #[test]
    fn failed_unpack_frees_partial_buffer() {
        let state = state(vec![0; 16], false);
        let result = unpacker(&state).unpack_level(&[1, 2], 0);

        assert_eq!(result.err(), Some(UnpackError::UnpackFailed { level: 0 }));
        assert_eq!(state.frees.count(), 1);
    }

    #[test]
    fn success_without_buffer_is_rejected() {
        let state = state(Vec::new(), true);
        let unpacker = TdecCrunchUnpacker {
            unpack_level: null_unpack,
            ..unpacker(&state)
        };

        assert_eq!(
            unpacker.unpack_level(&[1], 0).err(),
            Some(UnpackError::EmptyLevel { level: 0 })
        );
        assert_eq!(state.frees.count(), 0);
    }
}
