//! Mirrors of the `webgpu.h` declarations this crate passes through.
//!
//! Only the types needed to call `wgpuCreateInstance` and
//! `wgpuGetProcAddress` are declared. Object types are opaque: their layout
//! belongs to the WebGPU implementation and is never inspected here.

use std::marker::{PhantomData, PhantomPinned};
use std::os::raw::c_char;

/// Opaque instance object owned by the WebGPU implementation.
#[repr(C)]
pub struct WGPUInstanceImpl {
    _data: [u8; 0],
    _marker: PhantomData<(*mut u8, PhantomPinned)>,
}

/// `WGPUInstance` from `webgpu.h`.
pub type WGPUInstance = *mut WGPUInstanceImpl;

/// Instance descriptor. This crate only ever passes NULL, so the struct is
/// kept opaque rather than mirrored field by field.
#[repr(C)]
pub struct WGPUInstanceDescriptor {
    _data: [u8; 0],
    _marker: PhantomData<(*mut u8, PhantomPinned)>,
}

/// Sentinel length meaning "NUL-terminated".
pub const WGPU_STRLEN: usize = usize::MAX;

/// Length-delimited string as taken by `wgpuGetProcAddress`.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct WGPUStringView {
    pub data: *const c_char,
    pub length: usize,
}

impl WGPUStringView {
    /// Borrow a Rust string without a terminator. The view is only valid
    /// while `s` is.
    pub fn new(s: &str) -> Self {
        Self {
            data: s.as_ptr().cast(),
            length: s.len(),
        }
    }

    /// Read the view back as bytes.
    ///
    /// # Safety
    ///
    /// `data` must point to `length` readable bytes, or to a NUL-terminated
    /// string when `length == WGPU_STRLEN`.
    pub unsafe fn as_bytes<'a>(&self) -> &'a [u8] {
        if self.data.is_null() {
            return &[];
        }
        if self.length == WGPU_STRLEN {
            return unsafe { std::ffi::CStr::from_ptr(self.data) }.to_bytes();
        }
        unsafe { std::slice::from_raw_parts(self.data.cast::<u8>(), self.length) }
    }
}

/// Generic proc pointer; NULL when resolution fails.
pub type WGPUProc = Option<unsafe extern "C" fn()>;

/// Signature of `wgpuCreateInstance`.
pub type WGPUProcCreateInstance =
    unsafe extern "C" fn(descriptor: *const WGPUInstanceDescriptor) -> WGPUInstance;

/// Signature of `wgpuGetProcAddress`.
pub type WGPUProcGetProcAddress = unsafe extern "C" fn(proc_name: WGPUStringView) -> WGPUProc;
