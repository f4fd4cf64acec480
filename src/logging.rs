//! `LogSystem` over the C ABI.
//!
//! A host installs a C function pointer plus an opaque `user_data` pointer.
//! The pointer is handed back untouched on every call. Levels cross the
//! boundary as `int32_t` (`NoLogging=0` .. `All=8`).

use crate::config::LogSystemOptions;
use crate::error::CspError;
use crate::handle::Handle;
use crate::log_system::LogSystem;
use crate::types::LogLevel;
use crate::util::{cstr_to_option_string, cstr_to_string, report, set_error, set_error_null, set_ok};
use std::ffi::CString;
use std::os::raw::{c_char, c_void};

/// Opaque handle to a log system.
pub type LogSystemHandle = Handle<LogSystem>;

/// Log callback invoked with the host's `user_data`, the level and a
/// message that is only valid for the duration of the call.
pub type CspLogCallback = Option<unsafe extern "C" fn(user_data: *mut c_void, level: i32, message: *const c_char)>;

/// Host context pointer carried inside the registered closure.
#[derive(Clone, Copy)]
struct UserData(*mut c_void);

// The host owns `user_data` and promises it may be passed back from any
// thread that calls `csp_log_system_log_msg`.
unsafe impl Send for UserData {}
unsafe impl Sync for UserData {}

unsafe fn system_ref<'a>(handle: *const LogSystemHandle) -> Result<&'a LogSystem, CspError> {
    unsafe { LogSystemHandle::from_ptr(handle) }
        .map(Handle::as_ref)
        .ok_or_else(CspError::invalid_handle)
}

unsafe fn system_mut<'a>(handle: *mut LogSystemHandle) -> Result<&'a mut LogSystem, CspError> {
    unsafe { LogSystemHandle::from_ptr_mut(handle) }
        .map(Handle::as_mut)
        .ok_or_else(CspError::invalid_handle)
}

fn level(raw: i32) -> Result<LogLevel, CspError> {
    LogLevel::try_from(raw).map_err(CspError::from)
}

/// Create a log system with default options.
///
/// # Ownership
///
/// Caller owns the returned handle. Must call `csp_log_system_free()`.
///
/// # Safety
///
/// - `error` must be a valid pointer or NULL
#[unsafe(no_mangle)]
pub unsafe extern "C" fn csp_log_system_new(error: *mut CspError) -> *mut LogSystemHandle {
    unsafe { set_ok(error) };
    LogSystemHandle::into_raw(LogSystem::new())
}

/// Create a log system from JSON options.
///
/// # Options JSON Format
///
/// ```json
/// {
///   "system_level": "Warning",
///   "forward_to_logger": true
/// }
/// ```
///
/// NULL `options_json` means all defaults.
///
/// # Safety
///
/// - `options_json` must be a valid null-terminated UTF-8 string or NULL
/// - `error` must be a valid pointer or NULL
#[unsafe(no_mangle)]
pub unsafe extern "C" fn csp_log_system_create_with_options(
    options_json: *const c_char,
    error: *mut CspError,
) -> *mut LogSystemHandle {
    let options = match unsafe { cstr_to_option_string(options_json, "options_json") } {
        Ok(Some(json)) => match LogSystemOptions::from_json(&json) {
            Ok(options) => options,
            Err(e) => return unsafe { set_error_null(error, CspError::json_parse(e)) },
        },
        Ok(None) => LogSystemOptions::default(),
        Err(e) => return unsafe { set_error_null(error, e) },
    };

    unsafe { set_ok(error) };
    LogSystemHandle::into_raw(LogSystem::with_options(&options))
}

/// Release the log system stored in `*handle` and set `*handle` to NULL.
///
/// The installed callback, if any, is unregistered and never called again.
///
/// # Safety
///
/// - `handle` must be NULL or point to NULL or a live log system handle
#[unsafe(no_mangle)]
pub unsafe extern "C" fn csp_log_system_free(handle: *mut *mut LogSystemHandle) {
    unsafe { LogSystemHandle::release(handle) };
}

/// Install `callback`, replacing any previous one. A NULL `callback`
/// clears the slot.
///
/// # Safety
///
/// - `handle` must be a valid handle
/// - `callback` must stay callable until replaced, cleared or the system is freed
/// - `error` must be a valid pointer or NULL
#[unsafe(no_mangle)]
pub unsafe extern "C" fn csp_log_system_set_callback(
    handle: *mut LogSystemHandle,
    callback: CspLogCallback,
    user_data: *mut c_void,
    error: *mut CspError,
) -> i32 {
    let result = (|| -> Result<(), CspError> {
        let system = unsafe { system_ref(handle) }?;
        let Some(callback) = callback else {
            system.clear_log_callback();
            return Ok(());
        };

        let user_data = UserData(user_data);
        let registration = system.set_log_callback(move |level: LogLevel, message: &str| {
            let Ok(message) = CString::new(message) else {
                log::warn!("log message with interior NUL dropped");
                return;
            };
            // Bind the whole wrapper so the closure does not capture the raw field.
            let user_data = user_data;
            unsafe { callback(user_data.0, level.into(), message.as_ptr()) };
        });
        log::debug!("log callback installed under {}", registration.id());
        Ok(())
    })();
    unsafe { report(error, result) }
}

/// Remove the installed callback.
///
/// # Returns
///
/// 1 if a callback was removed, 0 if none was installed or on failure
/// (check error->code).
///
/// # Safety
///
/// - `handle` must be a valid handle
/// - `error` must be a valid pointer or NULL
#[unsafe(no_mangle)]
pub unsafe extern "C" fn csp_log_system_clear_callback(handle: *mut LogSystemHandle, error: *mut CspError) -> i32 {
    match unsafe { system_ref(handle) } {
        Ok(system) => {
            unsafe { set_ok(error) };
            system.clear_log_callback() as i32
        }
        Err(e) => unsafe { set_error(error, e) },
    }
}

/// Emit `message` at `level`.
///
/// # Returns
///
/// 1 if the callback received the message, 0 if it was filtered, no
/// callback is installed, or on failure (check error->code).
///
/// # Safety
///
/// - `handle` must be a valid handle
/// - `message` must be a valid null-terminated UTF-8 string
/// - `error` must be a valid pointer or NULL
#[unsafe(no_mangle)]
pub unsafe extern "C" fn csp_log_system_log_msg(
    handle: *const LogSystemHandle,
    level_raw: i32,
    message: *const c_char,
    error: *mut CspError,
) -> i32 {
    let result = (|| -> Result<bool, CspError> {
        let system = unsafe { system_ref(handle) }?;
        let level = level(level_raw)?;
        let message = unsafe { cstr_to_string(message, "message") }?;
        Ok(system.log_msg(level, &message))
    })();
    match result {
        Ok(delivered) => {
            unsafe { set_ok(error) };
            delivered as i32
        }
        Err(e) => unsafe { set_error(error, e) },
    }
}

/// Set the most verbose level that still reaches the callback.
///
/// # Safety
///
/// - `handle` must be a valid handle
/// - `error` must be a valid pointer or NULL
#[unsafe(no_mangle)]
pub unsafe extern "C" fn csp_log_system_set_level(
    handle: *mut LogSystemHandle,
    level_raw: i32,
    error: *mut CspError,
) -> i32 {
    let result = (|| -> Result<(), CspError> {
        let system = unsafe { system_mut(handle) }?;
        system.set_system_level(level(level_raw)?);
        Ok(())
    })();
    unsafe { report(error, result) }
}

/// Current system level, or -1 on failure.
///
/// # Safety
///
/// - `handle` must be a valid handle
/// - `error` must be a valid pointer or NULL
#[unsafe(no_mangle)]
pub unsafe extern "C" fn csp_log_system_get_level(handle: *const LogSystemHandle, error: *mut CspError) -> i32 {
    match unsafe { system_ref(handle) } {
        Ok(system) => {
            unsafe { set_ok(error) };
            system.system_level().into()
        }
        Err(e) => {
            unsafe { set_error::<()>(error, e) };
            -1
        }
    }
}
