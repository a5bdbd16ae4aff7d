//! C ABI shim between a Dawn-native instance handle and WebGPU.
//!
//! This crate exposes the WebGPU library's instance object to C callers
//! under an opaque `DawnNativeInstance` handle, and forwards proc-address
//! resolution. It adds no behavior of its own: every call is a single
//! re-tagging step or a direct forward to `wgpuCreateInstance` /
//! `wgpuGetProcAddress`.
//!
//! # Core Functions
//!
//! - `dniCreate`: create an instance (NULL descriptor) and return its handle
//! - `dniDestroy`: release a handle; currently a no-op
//! - `dniGetWgpuInstance`: the handle as a `WGPUInstance`
//! - `dnGetProcs`: resolve `createInstance` through `wgpuGetProcAddress`
//!
//! None of these report errors. A NULL from the WebGPU library is passed
//! through unchanged, and NULL handles are only caught by debug assertions.
//!
//! # Binding the WebGPU Library
//!
//! With the `link` feature the entry points are linked directly. Otherwise
//! the library is opened on first use from `DNI_WEBGPU_LIBRARY` or the
//! platform default names. Hosts can choose explicitly, before first use,
//! with `dniLoadLibrary` or `dniInstallProcs`.
//!
//! # Thread Safety
//!
//! Handles are NOT `Send` or `Sync` on the Rust side. Concurrent use from C
//! is as safe as the WebGPU library makes it. The library binding itself is
//! set once and is then read-only.
//!
//! # Memory Management
//!
//! - Instances belong to the WebGPU library; this crate frees nothing
//! - Error messages must be freed with `dniErrorFree`
//! - The string from `dniVersion` is static and must not be freed

#![allow(clippy::missing_safety_doc)]

mod config;
mod error;
mod handle;
mod instance;
mod library;
mod logging;
mod procs;
mod util;
mod webgpu;

// Re-export all public FFI types and functions
pub use config::{LIBRARY_ENV, LoaderOptions};
pub use error::{DniError, DniErrorCode, LoadError, dni_error_free};
pub use handle::{DawnNativeInstance, DawnNativeInstanceImpl, OpaqueHandle};
pub use instance::{
    create, destroy, dni_create, dni_destroy, dni_get_wgpu_instance, underlying_instance,
};
pub use library::{
    WebGpuLibrary, dni_install_procs, dni_is_library_bound, dni_load_library, install, is_bound,
    library,
};
pub use logging::{LOG_ENV, dni_init_logging};
pub use procs::{CREATE_INSTANCE_PROC, dn_get_procs, proc_table};
pub use webgpu::{
    WGPU_STRLEN, WGPUInstance, WGPUInstanceDescriptor, WGPUInstanceImpl, WGPUProc,
    WGPUProcCreateInstance, WGPUProcGetProcAddress, WGPUStringView,
};

use std::os::raw::c_char;

/// Library version string.
///
/// # Returns
///
/// Static string containing the version (e.g., "0.1.0").
/// Do not free this string.
#[unsafe(export_name = "dniVersion")]
pub extern "C" fn dni_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
