//! C API error handling.

use crate::error::DecodeError;
use core::ffi::c_char;

/// C-compatible error codes for decode operations.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TdecErrorCode {
    /// Operation succeeded
    Success = 0,
    /// A buffer could not be pinned (null pointer); the error channel was raised
    PinFailure = 1,
    /// The crunch container could not be unpacked
    UnpackFailure = 2,
    /// Format parameters are invalid (unsupported ASTC block size)
    InvalidFormatParams = 3,
    /// Input shorter than the block grid of the surface
    InputTooSmall = 4,
    /// Output holds fewer than width * height pixels
    OutputTooSmall = 5,
    /// Null pointer provided for TdecDecoder parameter
    NullDecoderPointer = 6,
}

/// C-compatible Result type for decode operations.
#[repr(C)]
pub struct TdecResult {
    /// Error code (0 = success, non-zero = error)
    pub error_code: TdecErrorCode,
}

impl TdecResult {
    /// Create a success result
    pub const fn success() -> Self {
        Self {
            error_code: TdecErrorCode::Success,
        }
    }

    /// Create an error result from an error code
    pub const fn from_error_code(error_code: TdecErrorCode) -> Self {
        Self { error_code }
    }

    /// Check if the result is successful
    pub fn is_success(&self) -> bool {
        matches!(self.error_code, TdecErrorCode::Success)
    }

    /// The `1` / `0` status returned by the decode entry points.
    pub fn status(&self) -> i32 {
        self.is_success() as i32
    }
}

impl<T> From<Result<T, DecodeError>> for TdecResult {
    fn from(result: Result<T, DecodeError>) -> Self {
        match result {
            Ok(_) => Self::success(),
            Err(e) => e.into(),
        }
    }
}

impl From<DecodeError> for TdecResult {
    fn from(error: DecodeError) -> Self {
        let error_code = match error {
            DecodeError::PinFailure => TdecErrorCode::PinFailure,
            DecodeError::UnpackFailure(_) => TdecErrorCode::UnpackFailure,
            DecodeError::InvalidFormatParams(_) => TdecErrorCode::InvalidFormatParams,
            DecodeError::InputTooSmall { .. } => TdecErrorCode::InputTooSmall,
            DecodeError::OutputTooSmall { .. } => TdecErrorCode::OutputTooSmall,
        };
        Self::from_error_code(error_code)
    }
}

/// Get a null-terminated string description of the error code.
///
/// The returned string is a static string literal that does not need to be freed.
///
/// # Safety
/// This function is safe to call with any error code value.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn tdec_error_message(error_code: TdecErrorCode) -> *const c_char {
    match error_code {
        TdecErrorCode::Success => c"Success".as_ptr() as *const c_char,
        TdecErrorCode::PinFailure => {
            c"Failed to get critical array access.".as_ptr() as *const c_char
        }
        TdecErrorCode::UnpackFailure => {
            c"Failed to unpack the crunch container".as_ptr() as *const c_char
        }
        TdecErrorCode::InvalidFormatParams => {
            c"Invalid format parameters".as_ptr() as *const c_char
        }
        TdecErrorCode::InputTooSmall => {
            c"Input too small for the requested surface".as_ptr() as *const c_char
        }
        TdecErrorCode::OutputTooSmall => {
            c"Output buffer too small for the requested surface".as_ptr() as *const c_char
        }
        TdecErrorCode::NullDecoderPointer => {
            c"Null pointer provided for TdecDecoder parameter".as_ptr() as *const c_char
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UnpackError;
    use crate::format::FormatTag;
    use crate::test_prelude::*;
    use core::ffi::CStr;

    #[rstest]
    #[case(DecodeError::PinFailure, TdecErrorCode::PinFailure)]
    #[case(
        DecodeError::UnpackFailure(UnpackError::UnpackFailed { level: 0 }),
        TdecErrorCode::UnpackFailure
    )]
    #[case(
        DecodeError::InvalidFormatParams(FormatTag::Astc),
        TdecErrorCode::InvalidFormatParams
    )]
    #[case(
        DecodeError::InputTooSmall { needed: 8, actual: 0 },
        TdecErrorCode::InputTooSmall
    )]
    #[case(
        DecodeError::OutputTooSmall { needed: 16, actual: 0 },
        TdecErrorCode::OutputTooSmall
    )]
    fn decode_errors_map_to_codes(#[case] error: DecodeError, #[case] expected: TdecErrorCode) {
        let result = TdecResult::from(Err::<(), _>(error));
        assert_eq!(result.error_code, expected);
        assert_eq!(result.status(), 0);
    }

    #[test]
    fn success_has_status_one() {
        let result = TdecResult::from(Ok::<(), DecodeError>(()));
        assert!(result.is_success());
        assert_eq!(result.status(), 1);
    }

    #[rstest]
    #[case(TdecErrorCode::Success, "Success")]
    #[case(TdecErrorCode::PinFailure, "Failed to get critical array access.")]
    #[case(
        TdecErrorCode::NullDecoderPointer,
        "Null pointer provided for TdecDecoder parameter"
    )]
    fn error_messages_are_static_c_strings(#[case] code: TdecErrorCode, #[case] expected: &str) {
        let message = unsafe { CStr::from_ptr(tdec_error_message(code)) };
        assert_eq!(message.to_str().unwrap(), expected);
    }
}
