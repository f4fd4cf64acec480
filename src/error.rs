//! Error handling for the adapter layer.
//!
//! Core adapters return [`InteropError`]. The C boundary translates every
//! `InteropError` into a C-compatible [`CspError`] so callers see a stable
//! error code instead of an opaque fault.

use crate::callback::CallbackId;
use std::ffi::CString;
use std::os::raw::c_char;

/// Result alias used throughout the safe core.
pub type Result<T> = std::result::Result<T, InteropError>;

/// Failures raised by the container, optional and callback adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InteropError {
    /// A required reference argument was absent.
    #[error("required argument `{0}` was absent")]
    NullInput(&'static str),

    /// An index or offset fell outside the valid bounds.
    #[error("`{param}` out of range: {value} (length {len})")]
    Range {
        param: &'static str,
        value: i64,
        len: usize,
    },

    /// Individually valid arguments whose combination is invalid.
    #[error("{0}")]
    Argument(String),

    /// Key lookup on an associative container found nothing.
    #[error("key not found: {0}")]
    KeyNotFound(String),

    /// Insert-only operation hit a key that is already present.
    #[error("an element with key {0} already exists")]
    DuplicateKey(String),

    /// A value was requested from an absent optional.
    #[error("optional has no value")]
    EmptyOptional,

    /// Invocation against an identity with no live registration.
    #[error("no callback registered for {0}")]
    UnknownCallback(CallbackId),
}

impl InteropError {
    pub(crate) fn range(param: &'static str, value: i64, len: usize) -> Self {
        Self::Range { param, value, len }
    }

    /// Range error for a `usize` index. Indexes past `i64::MAX` saturate.
    pub(crate) fn index_range(index: usize, len: usize) -> Self {
        Self::range("index", i64::try_from(index).unwrap_or(i64::MAX), len)
    }
}

/// Error codes for FFI functions.
///
/// These codes are stable and can be matched from C, C# or any other host.
/// Codes 1-99 map to [`InteropError`] variants.
/// Codes 100+ are boundary-specific errors.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CspErrorCode {
    /// No error
    Ok = 0,
    /// Required argument was NULL
    NullInput = 1,
    /// Index or offset out of bounds
    Range = 2,
    /// Invalid argument combination
    Argument = 3,
    /// Key not present
    KeyNotFound = 4,
    /// Key already present
    DuplicateKey = 5,
    /// Optional has no value
    EmptyOptional = 6,
    /// No callback registered for the identity
    UnknownCallback = 7,

    /// Invalid UTF-8 string
    InvalidUtf8 = 101,
    /// JSON parse or serialization error
    Json = 102,
    /// Invalid handle
    InvalidHandle = 103,
    /// Unknown error
    Unknown = 255,
}

/// Error structure returned via out-parameter.
///
/// # Memory Ownership
///
/// The `message` field is owned by the FFI layer when non-null.
/// Call `csp_error_free()` to release the message memory.
#[repr(C)]
#[derive(Debug)]
pub struct CspError {
    /// Error code
    pub code: CspErrorCode,
    /// Error message (NULL if code == Ok)
    pub message: *mut c_char,
}

impl CspError {
    /// Create a success result (no error).
    pub fn ok() -> Self {
        Self {
            code: CspErrorCode::Ok,
            message: std::ptr::null_mut(),
        }
    }

    fn with_message(code: CspErrorCode, msg: String) -> Self {
        Self {
            code,
            message: CString::new(msg)
                .map(CString::into_raw)
                .unwrap_or(std::ptr::null_mut()),
        }
    }

    /// Create a boundary error from a core adapter error.
    pub fn from_interop(e: InteropError) -> Self {
        Self::with_message(error_code_from_interop(&e), e.to_string())
    }

    /// Create a null pointer error.
    pub fn null_pointer(param: &str) -> Self {
        Self::with_message(
            CspErrorCode::NullInput,
            format!("null pointer passed for parameter: {param}"),
        )
    }

    /// Create an invalid UTF-8 error.
    pub fn invalid_utf8(context: &str) -> Self {
        Self::with_message(CspErrorCode::InvalidUtf8, format!("invalid UTF-8 in {context}"))
    }

    /// Create a JSON parse error.
    pub fn json_parse(e: serde_json::Error) -> Self {
        Self::with_message(CspErrorCode::Json, format!("JSON parse error: {e}"))
    }

    /// Create a JSON serialization error.
    pub fn json_serialize(e: serde_json::Error) -> Self {
        Self::with_message(CspErrorCode::Json, format!("JSON serialization error: {e}"))
    }

    /// Create an invalid handle error.
    pub fn invalid_handle() -> Self {
        Self::with_message(CspErrorCode::InvalidHandle, "invalid or null handle".to_string())
    }

    /// Create an error for a value that has no mapping on the managed side.
    pub fn unknown(msg: String) -> Self {
        Self::with_message(CspErrorCode::Unknown, msg)
    }
}

impl From<InteropError> for CspError {
    fn from(e: InteropError) -> Self {
        Self::from_interop(e)
    }
}

fn error_code_from_interop(e: &InteropError) -> CspErrorCode {
    use InteropError::*;

    match e {
        NullInput(_) => CspErrorCode::NullInput,
        Range { .. } => CspErrorCode::Range,
        Argument(_) => CspErrorCode::Argument,
        KeyNotFound(_) => CspErrorCode::KeyNotFound,
        DuplicateKey(_) => CspErrorCode::DuplicateKey,
        EmptyOptional => CspErrorCode::EmptyOptional,
        UnknownCallback(_) => CspErrorCode::UnknownCallback,
    }
}

/// Free error message memory.
///
/// Safe to call with NULL error or NULL message, and safe to call twice.
///
/// # Safety
///
/// The error pointer must be valid or NULL.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn csp_error_free(error: *mut CspError) {
    if error.is_null() {
        return;
    }
    unsafe {
        let err = &mut *error;
        if !err.message.is_null() {
            drop(CString::from_raw(err.message));
            err.message = std::ptr::null_mut();
        }
    }
}
