//! Error handling for the FFI layer.
//!
//! The four core shim functions surface no errors; only the library binding
//! functions report through a `DniError` out-parameter. Internally the
//! binding code returns `LoadError`, which is converted at the boundary.

use std::ffi::CString;
use std::os::raw::c_char;
use std::path::PathBuf;

/// Error codes for FFI functions.
///
/// These codes are stable and can be matched in C code.
/// Codes 1-99 describe library binding failures.
/// Codes 100+ describe invalid arguments passed across the FFI.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DniErrorCode {
    /// No error
    Ok = 0,
    /// No candidate shared library could be opened
    LibraryNotFound = 1,
    /// The library was opened but an entry point was missing
    SymbolNotFound = 2,
    /// A WebGPU library is already bound to this process
    AlreadyBound = 3,
    /// Runtime loading is not available on this platform
    Unsupported = 4,
    /// Null pointer passed
    NullPointer = 100,
    /// Invalid UTF-8 string
    InvalidUtf8 = 101,
    /// JSON parse error
    JsonParse = 102,
    /// Library path cannot be passed to the loader
    InvalidPath = 103,
    /// Unknown error
    Unknown = 255,
}

/// Failures while binding the WebGPU library.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("could not open WebGPU library: {}", format_attempts(.attempts))]
    LibraryNotFound { attempts: Vec<(PathBuf, String)> },

    #[error("symbol `{symbol}` not found in {}: {reason}", .library.display())]
    SymbolNotFound {
        library: PathBuf,
        symbol: &'static str,
        reason: String,
    },

    #[error("a WebGPU library is already bound")]
    AlreadyBound,

    #[error("runtime loading of the WebGPU library is not supported on this platform")]
    Unsupported,

    #[error("library path {} contains an interior NUL byte", .0.display())]
    InvalidPath(PathBuf),
}

fn format_attempts(attempts: &[(PathBuf, String)]) -> String {
    if attempts.is_empty() {
        return "no candidates".to_string();
    }
    attempts
        .iter()
        .map(|(path, reason)| format!("{} ({reason})", path.display()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Error structure returned via out-parameter.
///
/// # Memory Ownership
///
/// The `message` field is owned by the FFI layer when non-null.
/// Call `dniErrorFree()` to release the message memory.
#[repr(C)]
pub struct DniError {
    /// Error code
    pub code: DniErrorCode,
    /// Error message (NULL if code == Ok)
    pub message: *mut c_char,
}

impl DniError {
    /// Create a success result (no error).
    pub fn ok() -> Self {
        Self {
            code: DniErrorCode::Ok,
            message: std::ptr::null_mut(),
        }
    }

    fn with_message(code: DniErrorCode, msg: impl Into<Vec<u8>>) -> Self {
        Self {
            code,
            message: CString::new(msg)
                .map(CString::into_raw)
                .unwrap_or(std::ptr::null_mut()),
        }
    }

    /// Create a null pointer error.
    pub fn null_pointer(param: &str) -> Self {
        Self::with_message(
            DniErrorCode::NullPointer,
            format!("null pointer passed for parameter: {param}"),
        )
    }

    /// Create an invalid UTF-8 error.
    pub fn invalid_utf8(context: &str) -> Self {
        Self::with_message(
            DniErrorCode::InvalidUtf8,
            format!("invalid UTF-8 in {context}"),
        )
    }

    /// Create a JSON parse error.
    pub fn json_parse(e: serde_json::Error) -> Self {
        Self::with_message(DniErrorCode::JsonParse, format!("JSON parse error: {e}"))
    }

    /// Message text, if any. Used by tests and logging.
    pub fn message_str(&self) -> Option<&str> {
        if self.message.is_null() {
            return None;
        }
        unsafe { std::ffi::CStr::from_ptr(self.message) }.to_str().ok()
    }
}

impl From<LoadError> for DniError {
    fn from(e: LoadError) -> Self {
        let code = match &e {
            LoadError::LibraryNotFound { .. } => DniErrorCode::LibraryNotFound,
            LoadError::SymbolNotFound { .. } => DniErrorCode::SymbolNotFound,
            LoadError::AlreadyBound => DniErrorCode::AlreadyBound,
            LoadError::Unsupported => DniErrorCode::Unsupported,
            LoadError::InvalidPath(_) => DniErrorCode::InvalidPath,
        };
        Self::with_message(code, e.to_string())
    }
}

/// Free error message memory.
///
/// Safe to call with NULL error or NULL message.
///
/// # Safety
///
/// The error pointer must be valid or NULL.
#[unsafe(export_name = "dniErrorFree")]
pub unsafe extern "C" fn dni_error_free(error: *mut DniError) {
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
