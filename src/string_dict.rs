//! `StringStringMap`: string-keyed map over the C ABI.
//!
//! Keys and values are null-terminated UTF-8. Every string returned by
//! this module is an owned copy and must be freed with `csp_string_free()`.

use crate::dict::StringDict;
use crate::error::{CspError, InteropError};
use crate::handle::Handle;
use crate::util::{cstr_to_string, json_to_cstr, report, set_error, set_error_null, set_ok, try_string_to_cstr};
use libc::size_t;
use std::os::raw::c_char;

/// Opaque handle to a string map.
pub type StringDictHandle = Handle<StringDict>;

unsafe fn dict_ref<'a>(handle: *const StringDictHandle) -> Result<&'a StringDict, CspError> {
    unsafe { StringDictHandle::from_ptr(handle) }
        .map(Handle::as_ref)
        .ok_or_else(CspError::invalid_handle)
}

unsafe fn dict_mut<'a>(handle: *mut StringDictHandle) -> Result<&'a mut StringDict, CspError> {
    unsafe { StringDictHandle::from_ptr_mut(handle) }
        .map(Handle::as_mut)
        .ok_or_else(CspError::invalid_handle)
}

/// Run a predicate-style query: 1 for true, 0 for false or failure.
unsafe fn flag(error: *mut CspError, result: Result<bool, CspError>) -> i32 {
    match result {
        Ok(found) => {
            unsafe { set_ok(error) };
            found as i32
        }
        Err(e) => unsafe { set_error(error, e) },
    }
}

/// Create an empty map.
///
/// # Ownership
///
/// Caller owns the returned handle. Must call `csp_string_dict_free()`.
///
/// # Safety
///
/// - `error` must be a valid pointer or NULL
#[unsafe(no_mangle)]
pub unsafe extern "C" fn csp_string_dict_new(error: *mut CspError) -> *mut StringDictHandle {
    unsafe { set_ok(error) };
    StringDictHandle::into_raw(StringDict::new())
}

/// Create an independent deep copy of `source`.
///
/// # Returns
///
/// Handle on success, NULL on failure (`NullInput` for a NULL source).
///
/// # Safety
///
/// - `source` must be a valid handle or NULL
/// - `error` must be a valid pointer or NULL
#[unsafe(no_mangle)]
pub unsafe extern "C" fn csp_string_dict_clone(
    source: *const StringDictHandle,
    error: *mut CspError,
) -> *mut StringDictHandle {
    let source = unsafe { StringDictHandle::from_ptr(source) }.map(Handle::as_ref);
    match StringDict::copy_of(source) {
        Ok(copy) => {
            unsafe { set_ok(error) };
            StringDictHandle::into_raw(copy)
        }
        Err(e) => unsafe { set_error_null(error, e) },
    }
}

/// Release the map stored in `*handle` and set `*handle` to NULL.
///
/// # Safety
///
/// - `handle` must be NULL or point to NULL or a live map handle
#[unsafe(no_mangle)]
pub unsafe extern "C" fn csp_string_dict_free(handle: *mut *mut StringDictHandle) {
    unsafe { StringDictHandle::release(handle) };
}

/// Number of entries.
///
/// # Safety
///
/// - `handle` must be a valid handle
/// - `error` must be a valid pointer or NULL
#[unsafe(no_mangle)]
pub unsafe extern "C" fn csp_string_dict_count(handle: *const StringDictHandle, error: *mut CspError) -> size_t {
    match unsafe { dict_ref(handle) } {
        Ok(dict) => {
            unsafe { set_ok(error) };
            dict.len()
        }
        Err(e) => unsafe { set_error(error, e) },
    }
}

/// Copy of the value stored under `key`.
///
/// # Returns
///
/// Owned string on success, NULL on failure (`KeyNotFound` if absent).
///
/// # Safety
///
/// - `handle` must be a valid handle
/// - `key` must be a valid null-terminated UTF-8 string
/// - `error` must be a valid pointer or NULL
#[unsafe(no_mangle)]
pub unsafe extern "C" fn csp_string_dict_get(
    handle: *const StringDictHandle,
    key: *const c_char,
    error: *mut CspError,
) -> *mut c_char {
    let result = (|| -> Result<*mut c_char, CspError> {
        let dict = unsafe { dict_ref(handle) }?;
        let key = unsafe { cstr_to_string(key, "key") }?;
        try_string_to_cstr(dict.get(&key)?)
    })();
    match result {
        Ok(value) => {
            unsafe { set_ok(error) };
            value
        }
        Err(e) => unsafe { set_error_null(error, e) },
    }
}

/// Insert or overwrite `key`.
///
/// # Safety
///
/// - `handle` must be a valid handle
/// - `key` and `value` must be valid null-terminated UTF-8 strings
/// - `error` must be a valid pointer or NULL
#[unsafe(no_mangle)]
pub unsafe extern "C" fn csp_string_dict_set(
    handle: *mut StringDictHandle,
    key: *const c_char,
    value: *const c_char,
    error: *mut CspError,
) -> i32 {
    let result = (|| -> Result<(), CspError> {
        let dict = unsafe { dict_mut(handle) }?;
        let key = unsafe { cstr_to_string(key, "key") }?;
        let value = unsafe { cstr_to_string(value, "value") }?;
        dict.set(key, value);
        Ok(())
    })();
    unsafe { report(error, result) }
}

/// Insert a new key. Fails with `DuplicateKey` and leaves the map
/// unchanged if `key` is already present.
///
/// # Safety
///
/// - `handle` must be a valid handle
/// - `key` and `value` must be valid null-terminated UTF-8 strings
/// - `error` must be a valid pointer or NULL
#[unsafe(no_mangle)]
pub unsafe extern "C" fn csp_string_dict_add(
    handle: *mut StringDictHandle,
    key: *const c_char,
    value: *const c_char,
    error: *mut CspError,
) -> i32 {
    let result = (|| -> Result<(), CspError> {
        let dict = unsafe { dict_mut(handle) }?;
        let key = unsafe { cstr_to_string(key, "key") }?;
        let value = unsafe { cstr_to_string(value, "value") }?;
        dict.add(key, value)?;
        Ok(())
    })();
    unsafe { report(error, result) }
}

/// Lookup that reports absence instead of failing.
///
/// On a hit, `*out_value` receives an owned copy of the value. On a miss,
/// `*out_value` is set to NULL.
///
/// # Returns
///
/// 1 if found, 0 if absent or on failure (check error->code).
///
/// # Safety
///
/// - `handle` must be a valid handle
/// - `key` must be a valid null-terminated UTF-8 string
/// - `out_value` must be a valid pointer
/// - `error` must be a valid pointer or NULL
#[unsafe(no_mangle)]
pub unsafe extern "C" fn csp_string_dict_try_get(
    handle: *const StringDictHandle,
    key: *const c_char,
    out_value: *mut *mut c_char,
    error: *mut CspError,
) -> i32 {
    let result = (|| -> Result<bool, CspError> {
        let dict = unsafe { dict_ref(handle) }?;
        let Some(out_value) = (unsafe { out_value.as_mut() }) else {
            return Err(CspError::null_pointer("out_value"));
        };
        let key = unsafe { cstr_to_string(key, "key") }?;
        match dict.try_get(&key) {
            Some(value) => {
                *out_value = try_string_to_cstr(value)?;
                Ok(true)
            }
            None => {
                *out_value = std::ptr::null_mut();
                Ok(false)
            }
        }
    })();
    unsafe { flag(error, result) }
}

/// 1 if `key` is present, 0 otherwise.
///
/// # Safety
///
/// - `handle` must be a valid handle
/// - `key` must be a valid null-terminated UTF-8 string
/// - `error` must be a valid pointer or NULL
#[unsafe(no_mangle)]
pub unsafe extern "C" fn csp_string_dict_contains_key(
    handle: *const StringDictHandle,
    key: *const c_char,
    error: *mut CspError,
) -> i32 {
    let result = (|| -> Result<bool, CspError> {
        let dict = unsafe { dict_ref(handle) }?;
        let key = unsafe { cstr_to_string(key, "key") }?;
        Ok(dict.contains_key(&key))
    })();
    unsafe { flag(error, result) }
}

/// 1 if `key` is present and maps to `value`, 0 otherwise.
///
/// # Safety
///
/// - `handle` must be a valid handle
/// - `key` and `value` must be valid null-terminated UTF-8 strings
/// - `error` must be a valid pointer or NULL
#[unsafe(no_mangle)]
pub unsafe extern "C" fn csp_string_dict_contains_pair(
    handle: *const StringDictHandle,
    key: *const c_char,
    value: *const c_char,
    error: *mut CspError,
) -> i32 {
    let result = (|| -> Result<bool, CspError> {
        let dict = unsafe { dict_ref(handle) }?;
        let key = unsafe { cstr_to_string(key, "key") }?;
        let value = unsafe { cstr_to_string(value, "value") }?;
        Ok(dict.contains_pair(&key, &value))
    })();
    unsafe { flag(error, result) }
}

/// Remove `key`.
///
/// # Returns
///
/// 1 if the key was present, 0 if absent or on failure (check error->code).
///
/// # Safety
///
/// - `handle` must be a valid handle
/// - `key` must be a valid null-terminated UTF-8 string
/// - `error` must be a valid pointer or NULL
#[unsafe(no_mangle)]
pub unsafe extern "C" fn csp_string_dict_remove(
    handle: *mut StringDictHandle,
    key: *const c_char,
    error: *mut CspError,
) -> i32 {
    let result = (|| -> Result<bool, CspError> {
        let dict = unsafe { dict_mut(handle) }?;
        let key = unsafe { cstr_to_string(key, "key") }?;
        Ok(dict.remove(&key))
    })();
    unsafe { flag(error, result) }
}

/// Remove `key` only if it maps to `value`.
///
/// # Returns
///
/// 1 if the pair was removed, 0 otherwise or on failure (check error->code).
///
/// # Safety
///
/// - `handle` must be a valid handle
/// - `key` and `value` must be valid null-terminated UTF-8 strings
/// - `error` must be a valid pointer or NULL
#[unsafe(no_mangle)]
pub unsafe extern "C" fn csp_string_dict_remove_pair(
    handle: *mut StringDictHandle,
    key: *const c_char,
    value: *const c_char,
    error: *mut CspError,
) -> i32 {
    let result = (|| -> Result<bool, CspError> {
        let dict = unsafe { dict_mut(handle) }?;
        let key = unsafe { cstr_to_string(key, "key") }?;
        let value = unsafe { cstr_to_string(value, "value") }?;
        Ok(dict.remove_pair(&key, &value))
    })();
    unsafe { flag(error, result) }
}

/// Remove every entry.
///
/// # Safety
///
/// - `handle` must be a valid handle
/// - `error` must be a valid pointer or NULL
#[unsafe(no_mangle)]
pub unsafe extern "C" fn csp_string_dict_clear(handle: *mut StringDictHandle, error: *mut CspError) -> i32 {
    let result = unsafe { dict_mut(handle) }.map(StringDict::clear);
    unsafe { report(error, result) }
}

/// Keys in ascending order as a JSON array of strings.
///
/// # Returns
///
/// JSON string on success, NULL on failure.
/// Caller must free with `csp_string_free()`.
///
/// # Safety
///
/// - `handle` must be a valid handle
/// - `error` must be a valid pointer or NULL
#[unsafe(no_mangle)]
pub unsafe extern "C" fn csp_string_dict_keys_json(
    handle: *const StringDictHandle,
    error: *mut CspError,
) -> *mut c_char {
    match unsafe { dict_ref(handle) }.and_then(|dict| json_to_cstr(&dict.keys())) {
        Ok(json) => {
            unsafe { set_ok(error) };
            json
        }
        Err(e) => unsafe { set_error_null(error, e) },
    }
}

/// Snapshot of the whole map as a JSON object.
///
/// # Returns
///
/// JSON string on success, NULL on failure.
/// Caller must free with `csp_string_free()`.
///
/// # Safety
///
/// - `handle` must be a valid handle
/// - `error` must be a valid pointer or NULL
#[unsafe(no_mangle)]
pub unsafe extern "C" fn csp_string_dict_to_json(
    handle: *const StringDictHandle,
    error: *mut CspError,
) -> *mut c_char {
    match unsafe { dict_ref(handle) }.and_then(json_to_cstr) {
        Ok(json) => {
            unsafe { set_ok(error) };
            json
        }
        Err(e) => unsafe { set_error_null(error, e) },
    }
}

/// Create a map from a JSON object of string values.
///
/// # Safety
///
/// - `map_json` must be a valid null-terminated UTF-8 string or NULL
/// - `error` must be a valid pointer or NULL
#[unsafe(no_mangle)]
pub unsafe extern "C" fn csp_string_dict_from_json(
    map_json: *const c_char,
    error: *mut CspError,
) -> *mut StringDictHandle {
    if map_json.is_null() {
        return unsafe { set_error_null(error, InteropError::NullInput("map_json")) };
    }
    match unsafe { crate::util::cstr_to_json::<StringDict>(map_json, "map_json") } {
        Ok(dict) => {
            unsafe { set_ok(error) };
            StringDictHandle::into_raw(dict)
        }
        Err(e) => unsafe { set_error_null(error, e) },
    }
}
