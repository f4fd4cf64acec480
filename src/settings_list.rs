//! `ApplicationSettingsValueList`: growable list of settings over the C ABI.
//!
//! Elements cross the boundary as JSON objects:
//!
//! ```json
//! {
//!   "application_name": "string",
//!   "context": "string",
//!   "allow_anonymous": false,
//!   "settings": {"key": "value"}
//! }
//! ```
//!
//! Every field may be omitted. The list has copy semantics: a string
//! returned by `csp_settings_list_get` is a snapshot, never a live view.

use crate::bounds;
use crate::error::{CspError, InteropError};
use crate::handle::Handle;
use crate::list::ValueList;
use crate::types::ApplicationSettings;
use crate::util::{cstr_to_json, json_to_cstr, report, set_error, set_error_null, set_ok};
use libc::size_t;
use std::os::raw::c_char;

/// Opaque handle to a settings list.
pub type SettingsListHandle = Handle<ValueList<ApplicationSettings>>;

unsafe fn list_ref<'a>(handle: *const SettingsListHandle) -> Result<&'a ValueList<ApplicationSettings>, CspError> {
    unsafe { SettingsListHandle::from_ptr(handle) }
        .map(Handle::as_ref)
        .ok_or_else(CspError::invalid_handle)
}

unsafe fn list_mut<'a>(handle: *mut SettingsListHandle) -> Result<&'a mut ValueList<ApplicationSettings>, CspError> {
    unsafe { SettingsListHandle::from_ptr_mut(handle) }
        .map(Handle::as_mut)
        .ok_or_else(CspError::invalid_handle)
}

unsafe fn element(item_json: *const c_char) -> Result<ApplicationSettings, CspError> {
    unsafe { cstr_to_json(item_json, "item_json") }
}

/// Create an empty, writable list.
///
/// # Ownership
///
/// Caller owns the returned handle. Must call `csp_settings_list_free()`.
///
/// # Safety
///
/// - `error` must be a valid pointer or NULL
#[unsafe(no_mangle)]
pub unsafe extern "C" fn csp_settings_list_new(error: *mut CspError) -> *mut SettingsListHandle {
    unsafe { set_ok(error) };
    SettingsListHandle::into_raw(ValueList::new())
}

/// Create a list from a JSON array of settings objects.
///
/// # Returns
///
/// Handle on success, NULL on failure (`NullInput` for a NULL source).
///
/// # Safety
///
/// - `items_json` must be a valid null-terminated UTF-8 string or NULL
/// - `error` must be a valid pointer or NULL
#[unsafe(no_mangle)]
pub unsafe extern "C" fn csp_settings_list_from_json(
    items_json: *const c_char,
    error: *mut CspError,
) -> *mut SettingsListHandle {
    if items_json.is_null() {
        return unsafe { set_error_null(error, InteropError::NullInput("items_json")) };
    }
    let items: Vec<ApplicationSettings> = match unsafe { cstr_to_json(items_json, "items_json") } {
        Ok(items) => items,
        Err(e) => return unsafe { set_error_null(error, e) },
    };

    match ValueList::from_source(Some(items.as_slice())) {
        Ok(list) => {
            unsafe { set_ok(error) };
            SettingsListHandle::into_raw(list)
        }
        Err(e) => unsafe { set_error_null(error, e) },
    }
}

/// Release the list stored in `*handle` and set `*handle` to NULL.
///
/// # Safety
///
/// - `handle` must be NULL or point to NULL or a live settings list handle
#[unsafe(no_mangle)]
pub unsafe extern "C" fn csp_settings_list_free(handle: *mut *mut SettingsListHandle) {
    unsafe { SettingsListHandle::release(handle) };
}

/// Number of elements.
///
/// # Safety
///
/// - `handle` must be a valid handle
/// - `error` must be a valid pointer or NULL
#[unsafe(no_mangle)]
pub unsafe extern "C" fn csp_settings_list_count(handle: *const SettingsListHandle, error: *mut CspError) -> size_t {
    match unsafe { list_ref(handle) } {
        Ok(list) => {
            unsafe { set_ok(error) };
            list.len()
        }
        Err(e) => unsafe { set_error(error, e) },
    }
}

/// 1 if the list is empty, 0 otherwise (check error->code on 0).
///
/// # Safety
///
/// - `handle` must be a valid handle
/// - `error` must be a valid pointer or NULL
#[unsafe(no_mangle)]
pub unsafe extern "C" fn csp_settings_list_is_empty(handle: *const SettingsListHandle, error: *mut CspError) -> i32 {
    match unsafe { list_ref(handle) } {
        Ok(list) => {
            unsafe { set_ok(error) };
            list.is_empty() as i32
        }
        Err(e) => unsafe { set_error(error, e) },
    }
}

/// Append a copy of the element described by `item_json`.
///
/// # Safety
///
/// - `handle` must be a valid handle
/// - `item_json` must be a valid null-terminated UTF-8 string
/// - `error` must be a valid pointer or NULL
#[unsafe(no_mangle)]
pub unsafe extern "C" fn csp_settings_list_push(
    handle: *mut SettingsListHandle,
    item_json: *const c_char,
    error: *mut CspError,
) -> i32 {
    let result = (|| -> Result<(), CspError> {
        let list = unsafe { list_mut(handle) }?;
        list.push(unsafe { element(item_json) }?);
        Ok(())
    })();
    unsafe { report(error, result) }
}

/// Insert before `index`; `index == count` appends.
///
/// # Safety
///
/// - `handle` must be a valid handle
/// - `item_json` must be a valid null-terminated UTF-8 string
/// - `error` must be a valid pointer or NULL
#[unsafe(no_mangle)]
pub unsafe extern "C" fn csp_settings_list_insert(
    handle: *mut SettingsListHandle,
    index: i64,
    item_json: *const c_char,
    error: *mut CspError,
) -> i32 {
    let result = (|| -> Result<(), CspError> {
        let list = unsafe { list_mut(handle) }?;
        let at = bounds::insert_index(list.len(), index)?;
        list.insert(at, unsafe { element(item_json) }?)?;
        Ok(())
    })();
    unsafe { report(error, result) }
}

/// Snapshot of the element at `index` as JSON.
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
pub unsafe extern "C" fn csp_settings_list_get(
    handle: *const SettingsListHandle,
    index: i64,
    error: *mut CspError,
) -> *mut c_char {
    let result = (|| -> Result<*mut c_char, CspError> {
        let list = unsafe { list_ref(handle) }?;
        let item = list.get(bounds::element_index(list.len(), index)?)?;
        json_to_cstr(&item)
    })();
    match result {
        Ok(json) => {
            unsafe { set_ok(error) };
            json
        }
        Err(e) => unsafe { set_error_null(error, e) },
    }
}

/// Replace the element at `index`.
///
/// # Safety
///
/// - `handle` must be a valid handle
/// - `item_json` must be a valid null-terminated UTF-8 string
/// - `error` must be a valid pointer or NULL
#[unsafe(no_mangle)]
pub unsafe extern "C" fn csp_settings_list_set(
    handle: *mut SettingsListHandle,
    index: i64,
    item_json: *const c_char,
    error: *mut CspError,
) -> i32 {
    let result = (|| -> Result<(), CspError> {
        let list = unsafe { list_mut(handle) }?;
        let at = bounds::element_index(list.len(), index)?;
        list.set(at, unsafe { element(item_json) }?)?;
        Ok(())
    })();
    unsafe { report(error, result) }
}

/// Remove the element at `index`.
///
/// # Safety
///
/// - `handle` must be a valid handle
/// - `error` must be a valid pointer or NULL
#[unsafe(no_mangle)]
pub unsafe extern "C" fn csp_settings_list_remove_at(
    handle: *mut SettingsListHandle,
    index: i64,
    error: *mut CspError,
) -> i32 {
    let result = (|| -> Result<(), CspError> {
        let list = unsafe { list_mut(handle) }?;
        let at = bounds::element_index(list.len(), index)?;
        list.remove_at(at)?;
        Ok(())
    })();
    unsafe { report(error, result) }
}

/// Remove every element.
///
/// # Safety
///
/// - `handle` must be a valid handle
/// - `error` must be a valid pointer or NULL
#[unsafe(no_mangle)]
pub unsafe extern "C" fn csp_settings_list_clear(handle: *mut SettingsListHandle, error: *mut CspError) -> i32 {
    let result = unsafe { list_mut(handle) }.map(ValueList::clear);
    unsafe { report(error, result) }
}

/// Copy `count` elements from `src_start` into `dest[dest_start..]` as
/// owned JSON strings.
///
/// Each string written must be freed with `csp_string_free()`. Slots
/// outside the copied window are left untouched.
///
/// # Safety
///
/// - `handle` must be a valid handle
/// - `dest` must point to `dest_len` writable pointers, or be NULL
/// - `error` must be a valid pointer or NULL
#[unsafe(no_mangle)]
pub unsafe extern "C" fn csp_settings_list_copy_to(
    handle: *const SettingsListHandle,
    src_start: i64,
    dest: *mut *mut c_char,
    dest_len: size_t,
    dest_start: i64,
    count: i64,
    error: *mut CspError,
) -> i32 {
    let result = (|| -> Result<(), CspError> {
        let list = unsafe { list_ref(handle) }?;
        if dest.is_null() {
            return Err(InteropError::NullInput("dest").into());
        }
        let window = bounds::copy_window(list.len(), src_start, dest_len, dest_start, count)?;

        // Serialize the whole window before writing so a failure leaves
        // `dest` untouched.
        let encoded = list
            .iter()
            .skip(window.src.start)
            .take(window.src.len())
            .map(|item| serde_json::to_string(&item).map_err(CspError::json_serialize))
            .collect::<Result<Vec<_>, _>>()?;

        let dest = unsafe { std::slice::from_raw_parts_mut(dest, dest_len) };
        for (slot, json) in dest[window.dest].iter_mut().zip(encoded) {
            *slot = crate::util::string_to_cstr(json);
        }
        Ok(())
    })();
    unsafe { report(error, result) }
}

/// Snapshot of the whole list as a JSON array.
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
pub unsafe extern "C" fn csp_settings_list_to_json(
    handle: *const SettingsListHandle,
    error: *mut CspError,
) -> *mut c_char {
    let list = match unsafe { list_ref(handle) } {
        Ok(list) => list,
        Err(e) => return unsafe { set_error_null(error, e) },
    };
    match json_to_cstr(list) {
        Ok(json) => {
            unsafe { set_ok(error) };
            json
        }
        Err(e) => unsafe { set_error_null(error, e) },
    }
}
