//! C-compatible error channel.

use crate::pinning::ErrorChannel;
use core::ffi::{CStr, c_char, c_void};

/// Function pointer type for [`ErrorChannel::raise_out_of_memory`].
///
/// # Parameters
/// - `context`: User-provided context (can be null)
/// - `message`: Static, null-terminated message
pub type TdecRaiseOutOfMemoryFn = unsafe extern "C" fn(context: *mut c_void, message: *const c_char);

/// Where a runtime sitting on top of the C API receives pin failures, e.g. to throw
/// `OutOfMemoryError`.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct TdecErrorChannel {
    /// User-provided context passed to the callback
    pub context: *mut c_void,
    /// Callback raising the condition; null to ignore it
    pub raise_out_of_memory: Option<TdecRaiseOutOfMemoryFn>,
}

impl TdecErrorChannel {
    /// A channel that drops every condition.
    pub const fn ignore() -> Self {
        Self {
            context: core::ptr::null_mut(),
            raise_out_of_memory: None,
        }
    }
}

impl ErrorChannel for TdecErrorChannel {
    fn raise_out_of_memory(&mut self, message: &'static CStr) {
        if let Some(raise) = self.raise_out_of_memory {
            unsafe { raise(self.context, message.as_ptr()) }
        }
    }
}
