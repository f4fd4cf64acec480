//! Utility functions for FFI operations.

use crate::error::CspError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;

/// Convert a C string to a Rust String.
///
/// Returns an error if the pointer is null or contains invalid UTF-8.
///
/// # Safety
///
/// The caller must ensure `ptr` is either null or points to a valid
/// null-terminated C string.
pub unsafe fn cstr_to_string(ptr: *const c_char, param_name: &str) -> Result<String, CspError> {
    if ptr.is_null() {
        return Err(CspError::null_pointer(param_name));
    }

    let cstr = unsafe { CStr::from_ptr(ptr) };
    match cstr.to_str() {
        Ok(s) => Ok(s.to_string()),
        Err(_) => Err(CspError::invalid_utf8(param_name)),
    }
}

/// Convert an optional C string to an Option<String>.
///
/// Returns None if the pointer is null, Ok(Some(String)) if valid,
/// or an error if the string contains invalid UTF-8.
///
/// # Safety
///
/// The caller must ensure `ptr` is either null or points to a valid
/// null-terminated C string.
pub unsafe fn cstr_to_option_string(
    ptr: *const c_char,
    param_name: &str,
) -> Result<Option<String>, CspError> {
    if ptr.is_null() {
        return Ok(None);
    }

    let cstr = unsafe { CStr::from_ptr(ptr) };
    match cstr.to_str() {
        Ok(s) => Ok(Some(s.to_string())),
        Err(_) => Err(CspError::invalid_utf8(param_name)),
    }
}

/// Parse a JSON C string into `T`.
///
/// # Safety
///
/// Same requirements as [`cstr_to_string`].
pub unsafe fn cstr_to_json<T: DeserializeOwned>(ptr: *const c_char, param_name: &str) -> Result<T, CspError> {
    let json = unsafe { cstr_to_string(ptr, param_name) }?;
    serde_json::from_str(&json).map_err(CspError::json_parse)
}

/// Convert a Rust string to a C string, returning an owned pointer.
///
/// The caller is responsible for freeing the returned pointer with `csp_string_free`.
/// Returns null if the string contains internal null bytes.
pub fn string_to_cstr(s: String) -> *mut c_char {
    CString::new(s)
        .map(CString::into_raw)
        .unwrap_or(std::ptr::null_mut())
}

/// Like [`string_to_cstr`], but reports an interior NUL instead of
/// returning NULL.
pub fn try_string_to_cstr(s: String) -> Result<*mut c_char, CspError> {
    CString::new(s)
        .map(CString::into_raw)
        .map_err(|e| CspError::unknown(format!("string has an interior NUL at byte {}", e.nul_position())))
}

/// Serialize `value` to an owned JSON C string.
pub fn json_to_cstr<T: Serialize + ?Sized>(value: &T) -> Result<*mut c_char, CspError> {
    serde_json::to_string(value)
        .map(string_to_cstr)
        .map_err(CspError::json_serialize)
}

/// Set an error in the out-parameter and return a default value.
///
/// # Safety
///
/// The caller must ensure `error` is either null or a valid pointer.
pub unsafe fn set_error<T: Default>(error: *mut CspError, err: impl Into<CspError>) -> T {
    let err = err.into();
    log::debug!("boundary call rejected: {:?}", err.code);
    if let Some(e) = unsafe { error.as_mut() } {
        *e = err;
    }
    T::default()
}

/// Set an error in the out-parameter and return null.
///
/// # Safety
///
/// The caller must ensure `error` is either null or a valid pointer.
pub unsafe fn set_error_null<T>(error: *mut CspError, err: impl Into<CspError>) -> *mut T {
    let err = err.into();
    log::debug!("boundary call rejected: {:?}", err.code);
    if let Some(e) = unsafe { error.as_mut() } {
        *e = err;
    }
    std::ptr::null_mut()
}

/// Set success in the out-parameter error.
///
/// # Safety
///
/// The caller must ensure `error` is either null or a valid pointer.
pub unsafe fn set_ok(error: *mut CspError) {
    if let Some(e) = unsafe { error.as_mut() } {
        *e = CspError::ok();
    }
}

/// Report a status-style result: 1 on success, 0 on failure.
///
/// # Safety
///
/// The caller must ensure `error` is either null or a valid pointer.
pub unsafe fn report(error: *mut CspError, result: Result<(), CspError>) -> i32 {
    match result {
        Ok(()) => {
            unsafe { set_ok(error) };
            1
        }
        Err(e) => unsafe { set_error(error, e) },
    }
}

/// Free a string returned by this library.
///
/// Safe to call with NULL.
///
/// # Safety
///
/// `str` must be NULL or a pointer previously returned by this library.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn csp_string_free(str: *mut c_char) {
    if !str.is_null() {
        unsafe {
            drop(CString::from_raw(str));
        }
    }
}
