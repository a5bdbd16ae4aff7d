//! Utility functions for FFI operations.

use crate::error::DniError;
use std::ffi::CStr;
use std::os::raw::c_char;

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
) -> Result<Option<String>, DniError> {
    if ptr.is_null() {
        return Ok(None);
    }

    let cstr = unsafe { CStr::from_ptr(ptr) };
    match cstr.to_str() {
        Ok(s) => Ok(Some(s.to_string())),
        Err(_) => Err(DniError::invalid_utf8(param_name)),
    }
}

/// Set an error in the out-parameter and return a default value.
///
/// # Safety
///
/// The caller must ensure `error` is either null or a valid pointer.
pub unsafe fn set_error<T: Default>(error: *mut DniError, err: DniError) -> T {
    log::debug!(
        "returning error {:?}: {}",
        err.code,
        err.message_str().unwrap_or("")
    );
    if let Some(e) = unsafe { error.as_mut() } {
        *e = err;
    }
    T::default()
}

/// Set success in the out-parameter error.
///
/// # Safety
///
/// The caller must ensure `error` is either null or a valid pointer.
pub unsafe fn set_ok(error: *mut DniError) {
    if let Some(e) = unsafe { error.as_mut() } {
        *e = DniError::ok();
    }
}
