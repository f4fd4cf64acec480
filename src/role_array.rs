//! `SpaceUserRoleValueArray`: fixed-length role array over the C ABI.
//!
//! Roles cross the boundary as `int32_t` discriminants
//! (`Owner=0, Moderator=1, User=2, Invalid=3`).

use crate::array::ValueArray;
use crate::bounds;
use crate::error::{CspError, InteropError};
use crate::handle::Handle;
use crate::types::SpaceUserRole;
use crate::util::{report, set_error, set_error_null, set_ok};
use libc::size_t;

/// Opaque handle to a role array.
pub type RoleArrayHandle = Handle<ValueArray<SpaceUserRole>>;

fn role(raw: i32) -> Result<SpaceUserRole, CspError> {
    SpaceUserRole::try_from(raw).map_err(CspError::from)
}

unsafe fn array_ref<'a>(handle: *const RoleArrayHandle) -> Result<&'a ValueArray<SpaceUserRole>, CspError> {
    unsafe { RoleArrayHandle::from_ptr(handle) }
        .map(Handle::as_ref)
        .ok_or_else(CspError::invalid_handle)
}

unsafe fn array_mut<'a>(handle: *mut RoleArrayHandle) -> Result<&'a mut ValueArray<SpaceUserRole>, CspError> {
    unsafe { RoleArrayHandle::from_ptr_mut(handle) }
        .map(Handle::as_mut)
        .ok_or_else(CspError::invalid_handle)
}

/// Create an array of `count` roles, each `Owner`.
///
/// # Returns
///
/// Handle on success, NULL with `Argument` if `count` cannot be allocated.
///
/// # Ownership
///
/// Caller owns the returned handle. Must call `csp_role_array_free()`.
///
/// # Safety
///
/// - `error` must be a valid pointer or NULL
#[unsafe(no_mangle)]
pub unsafe extern "C" fn csp_role_array_new(count: size_t, error: *mut CspError) -> *mut RoleArrayHandle {
    match ValueArray::try_new(count) {
        Ok(array) => {
            unsafe { set_ok(error) };
            RoleArrayHandle::into_raw(array)
        }
        Err(e) => unsafe { set_error_null(error, e) },
    }
}

/// Create an array holding a copy of `items[0..len]`.
///
/// # Returns
///
/// Handle on success, NULL on failure. A NULL `items` fails with
/// `NullInput` even when `len` is 0.
///
/// # Safety
///
/// - `items` must point to at least `len` values, or be NULL
/// - `error` must be a valid pointer or NULL
#[unsafe(no_mangle)]
pub unsafe extern "C" fn csp_role_array_from_slice(
    items: *const i32,
    len: size_t,
    error: *mut CspError,
) -> *mut RoleArrayHandle {
    let source = if items.is_null() {
        None
    } else if len == 0 {
        Some(&[][..])
    } else {
        Some(unsafe { std::slice::from_raw_parts(items, len) })
    };

    let roles = match source.map(|raw| raw.iter().copied().map(role).collect::<Result<Vec<_>, _>>()) {
        Some(Ok(roles)) => roles,
        Some(Err(e)) => return unsafe { set_error_null(error, e) },
        None => return unsafe { set_error_null(error, InteropError::NullInput("items")) },
    };

    match ValueArray::from_source(Some(roles.as_slice())) {
        Ok(array) => {
            unsafe { set_ok(error) };
            RoleArrayHandle::into_raw(array)
        }
        Err(e) => unsafe { set_error_null(error, e) },
    }
}

/// Release the array stored in `*handle` and set `*handle` to NULL.
///
/// # Safety
///
/// - `handle` must be NULL or point to NULL or a live role array handle
#[unsafe(no_mangle)]
pub unsafe extern "C" fn csp_role_array_free(handle: *mut *mut RoleArrayHandle) {
    unsafe { RoleArrayHandle::release(handle) };
}

/// Number of elements.
///
/// # Safety
///
/// - `handle` must be a valid handle
/// - `error` must be a valid pointer or NULL
#[unsafe(no_mangle)]
pub unsafe extern "C" fn csp_role_array_count(handle: *const RoleArrayHandle, error: *mut CspError) -> size_t {
    match unsafe { array_ref(handle) } {
        Ok(array) => {
            unsafe { set_ok(error) };
            array.len()
        }
        Err(e) => unsafe { set_error(error, e) },
    }
}

/// Copy the element at `index` into `*out`.
///
/// # Returns
///
/// 1 on success, 0 on failure.
///
/// # Safety
///
/// - `handle` must be a valid handle
/// - `out` must be a valid pointer
/// - `error` must be a valid pointer or NULL
#[unsafe(no_mangle)]
pub unsafe extern "C" fn csp_role_array_get(
    handle: *const RoleArrayHandle,
    index: i64,
    out: *mut i32,
    error: *mut CspError,
) -> i32 {
    let result = (|| -> Result<(), CspError> {
        let array = unsafe { array_ref(handle) }?;
        if out.is_null() {
            return Err(CspError::null_pointer("out"));
        }
        let i = bounds::element_index(array.len(), index)?;
        let value = array.get(i)?;
        unsafe { *out = value.into() };
        Ok(())
    })();
    unsafe { report(error, result) }
}

/// Overwrite the element at `index`.
///
/// # Safety
///
/// - `handle` must be a valid handle
/// - `error` must be a valid pointer or NULL
#[unsafe(no_mangle)]
pub unsafe extern "C" fn csp_role_array_set(
    handle: *mut RoleArrayHandle,
    index: i64,
    value: i32,
    error: *mut CspError,
) -> i32 {
    let result = (|| -> Result<(), CspError> {
        let array = unsafe { array_mut(handle) }?;
        let value = role(value)?;
        let i = bounds::element_index(array.len(), index)?;
        array.set(i, value)?;
        Ok(())
    })();
    unsafe { report(error, result) }
}

/// Copy `count` elements from `src_start` into `dest[dest_start..]`.
///
/// Slots of `dest` outside the copied window are left untouched.
///
/// # Errors
///
/// - `NullInput` if `dest` is NULL
/// - `Range` if `src_start`, `dest_start` or `count` is negative
/// - `Argument` if the window overruns the source or `dest_len`
///
/// # Safety
///
/// - `handle` must be a valid handle
/// - `dest` must point to `dest_len` writable values, or be NULL
/// - `error` must be a valid pointer or NULL
#[unsafe(no_mangle)]
pub unsafe extern "C" fn csp_role_array_copy_to(
    handle: *const RoleArrayHandle,
    src_start: i64,
    dest: *mut i32,
    dest_len: size_t,
    dest_start: i64,
    count: i64,
    error: *mut CspError,
) -> i32 {
    let result = (|| -> Result<(), CspError> {
        let array = unsafe { array_ref(handle) }?;
        if dest.is_null() {
            return Err(InteropError::NullInput("dest").into());
        }
        let window = bounds::copy_window(array.len(), src_start, dest_len, dest_start, count)?;
        let dest = unsafe { std::slice::from_raw_parts_mut(dest, dest_len) };
        for (slot, value) in dest[window.dest].iter_mut().zip(&array.as_slice()[window.src]) {
            *slot = (*value).into();
        }
        Ok(())
    })();
    unsafe { report(error, result) }
}

/// Copy the whole array into `out[0..count]`.
///
/// # Returns
///
/// Number of elements written, 0 on failure.
///
/// # Safety
///
/// - `handle` must be a valid handle
/// - `out` must point to `out_len` writable values, or be NULL
/// - `error` must be a valid pointer or NULL
#[unsafe(no_mangle)]
pub unsafe extern "C" fn csp_role_array_to_buffer(
    handle: *const RoleArrayHandle,
    out: *mut i32,
    out_len: size_t,
    error: *mut CspError,
) -> size_t {
    let len = match unsafe { array_ref(handle) } {
        Ok(array) => array.len(),
        Err(e) => return unsafe { set_error(error, e) },
    };
    let written = unsafe { csp_role_array_copy_to(handle, 0, out, out_len, 0, len as i64, error) };
    if written == 1 { len } else { 0 }
}

/// Reverse the whole array in place.
///
/// # Safety
///
/// - `handle` must be a valid handle
/// - `error` must be a valid pointer or NULL
#[unsafe(no_mangle)]
pub unsafe extern "C" fn csp_role_array_reverse(handle: *mut RoleArrayHandle, error: *mut CspError) -> i32 {
    let result = unsafe { array_mut(handle) }.map(ValueArray::reverse);
    unsafe { report(error, result) }
}

/// Reverse `[start, start + count)` in place.
///
/// # Safety
///
/// - `handle` must be a valid handle
/// - `error` must be a valid pointer or NULL
#[unsafe(no_mangle)]
pub unsafe extern "C" fn csp_role_array_reverse_range(
    handle: *mut RoleArrayHandle,
    start: i64,
    count: i64,
    error: *mut CspError,
) -> i32 {
    let result = (|| -> Result<(), CspError> {
        let array = unsafe { array_mut(handle) }?;
        array.reverse_range(start, count)?;
        Ok(())
    })();
    unsafe { report(error, result) }
}

/// Overwrite every element with `value`.
///
/// # Safety
///
/// - `handle` must be a valid handle
/// - `error` must be a valid pointer or NULL
#[unsafe(no_mangle)]
pub unsafe extern "C" fn csp_role_array_fill(handle: *mut RoleArrayHandle, value: i32, error: *mut CspError) -> i32 {
    let result = (|| -> Result<(), CspError> {
        let array = unsafe { array_mut(handle) }?;
        array.fill(role(value)?);
        Ok(())
    })();
    unsafe { report(error, result) }
}
