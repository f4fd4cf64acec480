//! Feature flag arrays and the optional-array input path.
//!
//! Flags cross the boundary as an `int32_t` flag id plus an `int32_t`
//! enabled marker (0 = disabled, anything else = enabled). Operations that
//! accept an optional flag array treat a NULL handle as "no value".

use crate::array::ValueArray;
use crate::bounds;
use crate::error::CspError;
use crate::handle::Handle;
use crate::optional::OptionalSlot;
use crate::types::{EFeatureFlag, FeatureFlag};
use crate::util::{report, set_error, set_error_null, set_ok};
use libc::size_t;

/// Opaque handle to a feature flag array.
pub type FeatureFlagArrayHandle = Handle<ValueArray<FeatureFlag>>;

/// Number of enabled flags, or `None` if no array was supplied.
pub fn enabled_count(flags: &OptionalSlot<ValueArray<FeatureFlag>>) -> Option<usize> {
    flags
        .value_ref()
        .ok()
        .map(|array| array.iter().filter(|f| f.enabled).count())
}

unsafe fn array_ref<'a>(handle: *const FeatureFlagArrayHandle) -> Result<&'a ValueArray<FeatureFlag>, CspError> {
    unsafe { FeatureFlagArrayHandle::from_ptr(handle) }
        .map(Handle::as_ref)
        .ok_or_else(CspError::invalid_handle)
}

unsafe fn array_mut<'a>(handle: *mut FeatureFlagArrayHandle) -> Result<&'a mut ValueArray<FeatureFlag>, CspError> {
    unsafe { FeatureFlagArrayHandle::from_ptr_mut(handle) }
        .map(Handle::as_mut)
        .ok_or_else(CspError::invalid_handle)
}

/// Create an array of `count` disabled `Invalid` flags.
///
/// # Returns
///
/// Handle on success, NULL with `Argument` if `count` cannot be allocated.
///
/// # Ownership
///
/// Caller owns the returned handle. Must call `csp_feature_flag_array_free()`.
///
/// # Safety
///
/// - `error` must be a valid pointer or NULL
#[unsafe(no_mangle)]
pub unsafe extern "C" fn csp_feature_flag_array_new(count: size_t, error: *mut CspError) -> *mut FeatureFlagArrayHandle {
    match ValueArray::try_new(count) {
        Ok(array) => {
            unsafe { set_ok(error) };
            FeatureFlagArrayHandle::into_raw(array)
        }
        Err(e) => unsafe { set_error_null(error, e) },
    }
}

/// Release the array stored in `*handle` and set `*handle` to NULL.
///
/// # Safety
///
/// - `handle` must be NULL or point to NULL or a live flag array handle
#[unsafe(no_mangle)]
pub unsafe extern "C" fn csp_feature_flag_array_free(handle: *mut *mut FeatureFlagArrayHandle) {
    unsafe { FeatureFlagArrayHandle::release(handle) };
}

/// Number of elements.
///
/// # Safety
///
/// - `handle` must be a valid handle
/// - `error` must be a valid pointer or NULL
#[unsafe(no_mangle)]
pub unsafe extern "C" fn csp_feature_flag_array_count(
    handle: *const FeatureFlagArrayHandle,
    error: *mut CspError,
) -> size_t {
    match unsafe { array_ref(handle) } {
        Ok(array) => {
            unsafe { set_ok(error) };
            array.len()
        }
        Err(e) => unsafe { set_error(error, e) },
    }
}

/// Copy the flag at `index` into `*out_flag` and `*out_enabled`.
///
/// # Safety
///
/// - `handle` must be a valid handle
/// - `out_flag` and `out_enabled` must be valid pointers
/// - `error` must be a valid pointer or NULL
#[unsafe(no_mangle)]
pub unsafe extern "C" fn csp_feature_flag_array_get(
    handle: *const FeatureFlagArrayHandle,
    index: i64,
    out_flag: *mut i32,
    out_enabled: *mut i32,
    error: *mut CspError,
) -> i32 {
    let result = (|| -> Result<(), CspError> {
        let array = unsafe { array_ref(handle) }?;
        if out_flag.is_null() {
            return Err(CspError::null_pointer("out_flag"));
        }
        if out_enabled.is_null() {
            return Err(CspError::null_pointer("out_enabled"));
        }
        let flag = array.get(bounds::element_index(array.len(), index)?)?;
        unsafe {
            *out_flag = flag.flag.into();
            *out_enabled = flag.enabled as i32;
        }
        Ok(())
    })();
    unsafe { report(error, result) }
}

/// Overwrite the flag at `index`.
///
/// # Safety
///
/// - `handle` must be a valid handle
/// - `error` must be a valid pointer or NULL
#[unsafe(no_mangle)]
pub unsafe extern "C" fn csp_feature_flag_array_set(
    handle: *mut FeatureFlagArrayHandle,
    index: i64,
    flag: i32,
    enabled: i32,
    error: *mut CspError,
) -> i32 {
    let result = (|| -> Result<(), CspError> {
        let array = unsafe { array_mut(handle) }?;
        let flag = EFeatureFlag::try_from(flag)?;
        let i = bounds::element_index(array.len(), index)?;
        array.set(i, FeatureFlag::new(flag, enabled != 0))?;
        Ok(())
    })();
    unsafe { report(error, result) }
}

/// Count the enabled flags in an optional array.
///
/// # Returns
///
/// Number of enabled flags, or -1 if `flags` is NULL. A NULL array is
/// "no value", not an error: `error->code` is `Ok` in both cases.
///
/// # Safety
///
/// - `flags` must be a valid handle or NULL
/// - `error` must be a valid pointer or NULL
#[unsafe(no_mangle)]
pub unsafe extern "C" fn csp_feature_flags_count_enabled(
    flags: *const FeatureFlagArrayHandle,
    error: *mut CspError,
) -> i64 {
    let source = unsafe { FeatureFlagArrayHandle::from_ptr(flags) }.map(Handle::as_ref);
    let slot = OptionalSlot::from_ref(source);
    unsafe { set_ok(error) };
    enabled_count(&slot).map_or(-1, |n| n as i64)
}
