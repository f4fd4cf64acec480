//! C ABI container and callback adapters for Connected Spaces Platform.
//!
//! This crate provides the boundary layer that hosts (C, C#, Go and other
//! languages with C FFI support) use to exchange arrays, lists, maps,
//! optional values and log callbacks with the native platform.
//!
//! The safe core ([`array`], [`list`], [`dict`], [`optional`],
//! [`callback`], [`log_system`]) is ordinary Rust and can be used directly.
//! The `csp_*` functions wrap concrete instantiations behind opaque handles.
//!
//! # Thread Safety
//!
//! Container handles are NOT `Send` or `Sync`. All operations on a handle
//! must occur from the same thread that created it, or external
//! synchronization must be provided. The callback registry behind
//! `LogSystem` is internally locked and may be driven from any thread.
//!
//! # Memory Management
//!
//! - Handles are released with the matching `csp_*_free`, which takes the
//!   address of the handle variable and nulls it; releasing twice is a no-op
//! - Strings returned by functions must be freed with `csp_string_free`
//! - Error messages must be freed with `csp_error_free`

#![allow(clippy::missing_safety_doc)]

pub mod array;
mod bounds;
pub mod callback;
pub mod config;
pub mod dict;
pub mod error;
mod feature_flags;
mod handle;
pub mod list;
pub mod log_system;
mod logging;
pub mod optional;
mod role_array;
mod settings_list;
mod string_dict;
pub mod types;
mod util;

// Re-export all public FFI types and functions
pub use error::{CspError, CspErrorCode, InteropError, csp_error_free};
pub use feature_flags::{
    FeatureFlagArrayHandle, csp_feature_flag_array_count, csp_feature_flag_array_free, csp_feature_flag_array_get,
    csp_feature_flag_array_new, csp_feature_flag_array_set, csp_feature_flags_count_enabled, enabled_count,
};
pub use handle::Handle;
pub use logging::{
    CspLogCallback, LogSystemHandle, csp_log_system_clear_callback, csp_log_system_create_with_options,
    csp_log_system_free, csp_log_system_get_level, csp_log_system_log_msg, csp_log_system_new,
    csp_log_system_set_callback, csp_log_system_set_level,
};
pub use role_array::{
    RoleArrayHandle, csp_role_array_copy_to, csp_role_array_count, csp_role_array_fill, csp_role_array_free,
    csp_role_array_from_slice, csp_role_array_get, csp_role_array_new, csp_role_array_reverse,
    csp_role_array_reverse_range, csp_role_array_set, csp_role_array_to_buffer,
};
pub use settings_list::{
    SettingsListHandle, csp_settings_list_clear, csp_settings_list_copy_to, csp_settings_list_count,
    csp_settings_list_free, csp_settings_list_from_json, csp_settings_list_get, csp_settings_list_insert,
    csp_settings_list_is_empty, csp_settings_list_new, csp_settings_list_push, csp_settings_list_remove_at,
    csp_settings_list_set, csp_settings_list_to_json,
};
pub use string_dict::{
    StringDictHandle, csp_string_dict_add, csp_string_dict_clear, csp_string_dict_clone,
    csp_string_dict_contains_key, csp_string_dict_contains_pair, csp_string_dict_count, csp_string_dict_free,
    csp_string_dict_from_json, csp_string_dict_get, csp_string_dict_keys_json, csp_string_dict_new,
    csp_string_dict_remove, csp_string_dict_remove_pair, csp_string_dict_set, csp_string_dict_to_json,
    csp_string_dict_try_get,
};
pub use util::csp_string_free;

use std::os::raw::c_char;

/// Library version string.
///
/// # Returns
///
/// Static string containing the version (e.g., "0.1.0").
/// Do not free this string.
#[unsafe(no_mangle)]
pub extern "C" fn csp_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::{CStr, CString};
    use std::os::raw::c_void;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Take ownership of a returned string.
    fn take_string(ptr: *mut c_char) -> String {
        assert!(!ptr.is_null());
        let s = unsafe { CStr::from_ptr(ptr) }.to_str().unwrap().to_string();
        unsafe { csp_string_free(ptr) };
        s
    }

    #[test]
    fn test_version() {
        let version = csp_version();
        assert!(!version.is_null());
        let version_str = unsafe { CStr::from_ptr(version) };
        assert_eq!(version_str.to_str().unwrap(), env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_role_array_copy_to_window() {
        let mut error = CspError::ok();
        // Invalid, User, Owner, Moderator
        let source = [3, 2, 0, 1];
        let mut handle = unsafe { csp_role_array_from_slice(source.as_ptr(), source.len(), &mut error) };
        assert!(!handle.is_null());
        assert_eq!(unsafe { csp_role_array_count(handle, &mut error) }, 4);

        let mut dest = [-1i32; 10];
        let ok = unsafe { csp_role_array_copy_to(handle, 0, dest.as_mut_ptr(), dest.len(), 7, 2, &mut error) };
        assert_eq!(ok, 1);
        assert_eq!(error.code, CspErrorCode::Ok);
        assert_eq!(dest[7], 3);
        assert_eq!(dest[8], 2);
        for (i, v) in dest.iter().enumerate() {
            if i != 7 && i != 8 {
                assert_eq!(*v, -1, "slot {i} was touched");
            }
        }

        unsafe { csp_role_array_free(&mut handle) };
        assert!(handle.is_null());
    }

    #[test]
    fn test_role_array_copy_to_errors() {
        let mut error = CspError::ok();
        let mut handle = unsafe { csp_role_array_new(4, &mut error) };
        let mut dest = [0i32; 4];

        let ok = unsafe { csp_role_array_copy_to(handle, 0, std::ptr::null_mut(), 4, 0, 1, &mut error) };
        assert_eq!(ok, 0);
        assert_eq!(error.code, CspErrorCode::NullInput);
        unsafe { csp_error_free(&mut error) };

        let ok = unsafe { csp_role_array_copy_to(handle, -1, dest.as_mut_ptr(), 4, 0, 1, &mut error) };
        assert_eq!(ok, 0);
        assert_eq!(error.code, CspErrorCode::Range);
        unsafe { csp_error_free(&mut error) };

        let ok = unsafe { csp_role_array_copy_to(handle, 2, dest.as_mut_ptr(), 4, 0, 3, &mut error) };
        assert_eq!(ok, 0);
        assert_eq!(error.code, CspErrorCode::Argument);
        assert!(!error.message.is_null());
        unsafe { csp_error_free(&mut error) };
        assert!(error.message.is_null());

        unsafe { csp_role_array_free(&mut handle) };
    }

    #[test]
    fn test_role_array_reverse_range_and_fill() {
        let mut error = CspError::ok();
        let source = [0, 1, 2, 3];
        let mut handle = unsafe { csp_role_array_from_slice(source.as_ptr(), 4, &mut error) };

        assert_eq!(unsafe { csp_role_array_reverse_range(handle, 2, 2, &mut error) }, 1);
        let mut out = [0i32; 4];
        assert_eq!(unsafe { csp_role_array_to_buffer(handle, out.as_mut_ptr(), 4, &mut error) }, 4);
        assert_eq!(out, [0, 1, 3, 2]);

        assert_eq!(unsafe { csp_role_array_reverse(handle, &mut error) }, 1);
        assert_eq!(unsafe { csp_role_array_fill(handle, 2, &mut error) }, 1);
        let mut role = -1;
        assert_eq!(unsafe { csp_role_array_get(handle, 3, &mut role, &mut error) }, 1);
        assert_eq!(role, 2);

        assert_eq!(unsafe { csp_role_array_set(handle, 4, 1, &mut error) }, 0);
        assert_eq!(error.code, CspErrorCode::Range);
        unsafe { csp_error_free(&mut error) };

        assert_eq!(unsafe { csp_role_array_set(handle, 0, 42, &mut error) }, 0);
        assert_eq!(error.code, CspErrorCode::Argument);
        unsafe { csp_error_free(&mut error) };

        unsafe { csp_role_array_free(&mut handle) };
    }

    #[test]
    fn test_role_array_oversized_count() {
        let mut error = CspError::ok();
        let handle = unsafe { csp_role_array_new(usize::MAX, &mut error) };
        assert!(handle.is_null());
        assert_ne!(error.code, CspErrorCode::Ok);
        assert_eq!(error.code, CspErrorCode::Argument);
        unsafe { csp_error_free(&mut error) };
    }

    #[test]
    fn test_from_null_source() {
        let mut error = CspError::ok();
        let handle = unsafe { csp_role_array_from_slice(std::ptr::null(), 0, &mut error) };
        assert!(handle.is_null());
        assert_eq!(error.code, CspErrorCode::NullInput);
        unsafe { csp_error_free(&mut error) };

        let handle = unsafe { csp_settings_list_from_json(std::ptr::null(), &mut error) };
        assert!(handle.is_null());
        assert_eq!(error.code, CspErrorCode::NullInput);
        unsafe { csp_error_free(&mut error) };

        let handle = unsafe { csp_string_dict_clone(std::ptr::null(), &mut error) };
        assert!(handle.is_null());
        assert_eq!(error.code, CspErrorCode::NullInput);
        unsafe { csp_error_free(&mut error) };
    }

    #[test]
    fn test_double_free_is_noop() {
        let mut error = CspError::ok();
        let mut array = unsafe { csp_role_array_new(1, &mut error) };
        let mut list = unsafe { csp_settings_list_new(&mut error) };
        let mut dict = unsafe { csp_string_dict_new(&mut error) };
        let mut system = unsafe { csp_log_system_new(&mut error) };

        for _ in 0..2 {
            unsafe {
                csp_role_array_free(&mut array);
                csp_settings_list_free(&mut list);
                csp_string_dict_free(&mut dict);
                csp_log_system_free(&mut system);
            }
        }
        assert!(array.is_null() && list.is_null() && dict.is_null() && system.is_null());

        unsafe { csp_role_array_free(std::ptr::null_mut()) };
    }

    #[test]
    fn test_null_handle_is_reported() {
        let mut error = CspError::ok();
        let count = unsafe { csp_string_dict_count(std::ptr::null(), &mut error) };
        assert_eq!(count, 0);
        assert_eq!(error.code, CspErrorCode::InvalidHandle);
        unsafe { csp_error_free(&mut error) };
    }

    #[test]
    fn test_settings_list_json_elements() {
        let mut error = CspError::ok();
        let items = CString::new(
            r#"[{"application_name": "App1", "context": "Ctx1", "settings": {"key1": "v1"}},
                {"application_name": "App2", "allow_anonymous": true}]"#,
        )
        .unwrap();
        let mut handle = unsafe { csp_settings_list_from_json(items.as_ptr(), &mut error) };
        assert!(!handle.is_null(), "{:?}", error.code);
        assert_eq!(unsafe { csp_settings_list_count(handle, &mut error) }, 2);
        assert_eq!(unsafe { csp_settings_list_is_empty(handle, &mut error) }, 0);

        let first = take_string(unsafe { csp_settings_list_get(handle, 0, &mut error) });
        let first: types::ApplicationSettings = serde_json::from_str(&first).unwrap();
        assert_eq!(first.application_name, "App1");
        assert_eq!(first.settings.get(&"key1".to_string()).unwrap(), "v1");

        let inserted = CString::new(r#"{"application_name": "App0"}"#).unwrap();
        assert_eq!(unsafe { csp_settings_list_insert(handle, 0, inserted.as_ptr(), &mut error) }, 1);
        assert_eq!(unsafe { csp_settings_list_insert(handle, 9, inserted.as_ptr(), &mut error) }, 0);
        assert_eq!(error.code, CspErrorCode::Range);
        unsafe { csp_error_free(&mut error) };

        assert_eq!(unsafe { csp_settings_list_remove_at(handle, 2, &mut error) }, 1);
        let all = take_string(unsafe { csp_settings_list_to_json(handle, &mut error) });
        let all: Vec<types::ApplicationSettings> = serde_json::from_str(&all).unwrap();
        let names: Vec<_> = all.iter().map(|s| s.application_name.as_str()).collect();
        assert_eq!(names, ["App0", "App1"]);

        let bad = CString::new("{not json").unwrap();
        assert_eq!(unsafe { csp_settings_list_push(handle, bad.as_ptr(), &mut error) }, 0);
        assert_eq!(error.code, CspErrorCode::Json);
        unsafe { csp_error_free(&mut error) };

        assert_eq!(unsafe { csp_settings_list_clear(handle, &mut error) }, 1);
        assert_eq!(unsafe { csp_settings_list_is_empty(handle, &mut error) }, 1);
        unsafe { csp_settings_list_free(&mut handle) };
    }

    #[test]
    fn test_settings_list_copy_to_strings() {
        let mut error = CspError::ok();
        let mut handle = unsafe { csp_settings_list_new(&mut error) };
        for name in ["A", "B", "C"] {
            let item = CString::new(format!(r#"{{"application_name": "{name}"}}"#)).unwrap();
            assert_eq!(unsafe { csp_settings_list_push(handle, item.as_ptr(), &mut error) }, 1);
        }

        let mut dest = [std::ptr::null_mut::<c_char>(); 4];
        let ok = unsafe { csp_settings_list_copy_to(handle, 1, dest.as_mut_ptr(), 4, 2, 2, &mut error) };
        assert_eq!(ok, 1);
        assert!(dest[0].is_null() && dest[1].is_null());
        assert!(take_string(dest[2]).contains("\"B\""));
        assert!(take_string(dest[3]).contains("\"C\""));

        unsafe { csp_settings_list_free(&mut handle) };
    }

    #[test]
    fn test_string_dict_operations() {
        let mut error = CspError::ok();
        let mut handle = unsafe { csp_string_dict_new(&mut error) };
        let key = CString::new("key1").unwrap();
        let value = CString::new("value1").unwrap();
        let other = CString::new("other").unwrap();

        assert_eq!(unsafe { csp_string_dict_add(handle, key.as_ptr(), value.as_ptr(), &mut error) }, 1);
        assert_eq!(unsafe { csp_string_dict_add(handle, key.as_ptr(), other.as_ptr(), &mut error) }, 0);
        assert_eq!(error.code, CspErrorCode::DuplicateKey);
        unsafe { csp_error_free(&mut error) };
        assert_eq!(unsafe { csp_string_dict_count(handle, &mut error) }, 1);
        assert_eq!(take_string(unsafe { csp_string_dict_get(handle, key.as_ptr(), &mut error) }), "value1");

        let missing = unsafe { csp_string_dict_get(handle, other.as_ptr(), &mut error) };
        assert!(missing.is_null());
        assert_eq!(error.code, CspErrorCode::KeyNotFound);
        unsafe { csp_error_free(&mut error) };

        let mut out = std::ptr::null_mut();
        assert_eq!(unsafe { csp_string_dict_try_get(handle, other.as_ptr(), &mut out, &mut error) }, 0);
        assert!(out.is_null());
        assert_eq!(error.code, CspErrorCode::Ok);
        assert_eq!(unsafe { csp_string_dict_try_get(handle, key.as_ptr(), &mut out, &mut error) }, 1);
        assert_eq!(take_string(out), "value1");

        assert_eq!(unsafe { csp_string_dict_contains_key(handle, key.as_ptr(), &mut error) }, 1);
        assert_eq!(unsafe { csp_string_dict_contains_pair(handle, key.as_ptr(), other.as_ptr(), &mut error) }, 0);
        assert_eq!(unsafe { csp_string_dict_remove_pair(handle, key.as_ptr(), other.as_ptr(), &mut error) }, 0);
        assert_eq!(unsafe { csp_string_dict_count(handle, &mut error) }, 1);

        // Mutating the source after cloning leaves the copy alone.
        let mut copy = unsafe { csp_string_dict_clone(handle, &mut error) };
        assert_eq!(unsafe { csp_string_dict_set(handle, key.as_ptr(), other.as_ptr(), &mut error) }, 1);
        assert_eq!(take_string(unsafe { csp_string_dict_get(copy, key.as_ptr(), &mut error) }), "value1");

        assert_eq!(unsafe { csp_string_dict_remove_pair(handle, key.as_ptr(), other.as_ptr(), &mut error) }, 1);
        assert_eq!(unsafe { csp_string_dict_remove(handle, key.as_ptr(), &mut error) }, 0);

        let b = CString::new("b").unwrap();
        let a = CString::new("a").unwrap();
        unsafe {
            csp_string_dict_set(copy, b.as_ptr(), value.as_ptr(), &mut error);
            csp_string_dict_set(copy, a.as_ptr(), value.as_ptr(), &mut error);
        }
        assert_eq!(take_string(unsafe { csp_string_dict_keys_json(copy, &mut error) }), r#"["a","b","key1"]"#);
        let json = take_string(unsafe { csp_string_dict_to_json(copy, &mut error) });
        let json = CString::new(json).unwrap();
        let mut restored = unsafe { csp_string_dict_from_json(json.as_ptr(), &mut error) };
        assert_eq!(unsafe { csp_string_dict_count(restored, &mut error) }, 3);

        assert_eq!(unsafe { csp_string_dict_clear(copy, &mut error) }, 1);
        assert_eq!(unsafe { csp_string_dict_count(copy, &mut error) }, 0);

        unsafe {
            csp_string_dict_free(&mut handle);
            csp_string_dict_free(&mut copy);
            csp_string_dict_free(&mut restored);
        }
    }

    unsafe extern "C" fn count_calls(user_data: *mut c_void, level: i32, message: *const c_char) {
        let counter = unsafe { &*(user_data as *const AtomicUsize) };
        let message = unsafe { CStr::from_ptr(message) }.to_str().unwrap();
        assert!(!message.is_empty());
        assert!(level > 0);
        counter.fetch_add(1, Ordering::SeqCst);
    }

    #[test]
    fn test_log_callback_through_c_pointer() {
        let mut error = CspError::ok();
        let calls = AtomicUsize::new(0);
        let user_data = &calls as *const AtomicUsize as *mut c_void;

        let mut first = unsafe { csp_log_system_new(&mut error) };
        let mut second = unsafe { csp_log_system_new(&mut error) };
        assert_eq!(unsafe { csp_log_system_set_callback(first, Some(count_calls), user_data, &mut error) }, 1);

        let message = CString::new("The first wrapped function works!").unwrap();
        assert_eq!(unsafe { csp_log_system_log_msg(first, 5, message.as_ptr(), &mut error) }, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // The second system has its own slot.
        assert_eq!(unsafe { csp_log_system_log_msg(second, 5, message.as_ptr(), &mut error) }, 0);
        assert_eq!(error.code, CspErrorCode::Ok);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        assert_eq!(unsafe { csp_log_system_set_level(first, 2, &mut error) }, 1);
        assert_eq!(unsafe { csp_log_system_get_level(first, &mut error) }, 2);
        assert_eq!(unsafe { csp_log_system_log_msg(first, 5, message.as_ptr(), &mut error) }, 0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        assert_eq!(unsafe { csp_log_system_log_msg(first, 99, message.as_ptr(), &mut error) }, 0);
        assert_eq!(error.code, CspErrorCode::Argument);
        unsafe { csp_error_free(&mut error) };

        assert_eq!(unsafe { csp_log_system_clear_callback(first, &mut error) }, 1);
        assert_eq!(unsafe { csp_log_system_clear_callback(first, &mut error) }, 0);

        unsafe {
            csp_log_system_free(&mut first);
            csp_log_system_free(&mut second);
        }
    }

    #[test]
    fn test_log_system_options() {
        let mut error = CspError::ok();
        let options = CString::new(r#"{"system_level": "Warning"}"#).unwrap();
        let mut handle = unsafe { csp_log_system_create_with_options(options.as_ptr(), &mut error) };
        assert!(!handle.is_null());
        assert_eq!(unsafe { csp_log_system_get_level(handle, &mut error) }, 3);
        unsafe { csp_log_system_free(&mut handle) };

        let mut handle = unsafe { csp_log_system_create_with_options(std::ptr::null(), &mut error) };
        assert_eq!(unsafe { csp_log_system_get_level(handle, &mut error) }, 8);
        unsafe { csp_log_system_free(&mut handle) };

        let options = CString::new(r#"{"verbosity": 3}"#).unwrap();
        let handle = unsafe { csp_log_system_create_with_options(options.as_ptr(), &mut error) };
        assert!(handle.is_null());
        assert_eq!(error.code, CspErrorCode::Json);
        unsafe { csp_error_free(&mut error) };
    }

    #[test]
    fn test_optional_flags_null_is_no_value() {
        let mut error = CspError::ok();
        assert_eq!(unsafe { csp_feature_flags_count_enabled(std::ptr::null(), &mut error) }, -1);
        assert_eq!(error.code, CspErrorCode::Ok);

        let mut flags = unsafe { csp_feature_flag_array_new(3, &mut error) };
        assert_eq!(unsafe { csp_feature_flags_count_enabled(flags, &mut error) }, 0);
        unsafe { csp_feature_flag_array_set(flags, 0, 0, 1, &mut error) };
        assert_eq!(unsafe { csp_feature_flags_count_enabled(flags, &mut error) }, 1);
        unsafe { csp_feature_flag_array_free(&mut flags) };
    }
}
