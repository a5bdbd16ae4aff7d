//! Instance lifecycle (create, destroy, underlying instance).
//!
//! These are pure re-tagging steps around the WebGPU library's own instance
//! object. No state is kept here and nothing is allocated or freed.

use crate::handle::DawnNativeInstance;
use crate::library::{self, WebGpuLibrary};
use crate::webgpu::WGPUInstance;

/// Create an instance through `library` and tag it as a handle.
///
/// The descriptor is always NULL. A NULL result from the library is
/// returned as a null handle without further checks.
pub fn create(library: &WebGpuLibrary) -> DawnNativeInstance {
    let instance = unsafe { library.create_instance(std::ptr::null()) };
    let handle = DawnNativeInstance::from_instance(instance);
    log::trace!("create -> {handle:?}");
    handle
}

/// Release a handle obtained from [`create`].
///
/// Currently releases nothing: the instance stays owned by the WebGPU
/// library. Whether this should call `wgpuInstanceRelease` is undecided.
///
/// # Panics
///
/// With debug assertions on, if `handle` is null.
pub fn destroy(handle: DawnNativeInstance) {
    debug_assert!(!handle.is_null(), "dniDestroy called with a null handle");
    log::trace!("destroy {handle:?} (no-op)");
}

/// The handle as the WebGPU library's own instance pointer. No ownership
/// moves.
///
/// # Panics
///
/// With debug assertions on, if `handle` is null.
pub fn underlying_instance(handle: DawnNativeInstance) -> WGPUInstance {
    debug_assert!(
        !handle.is_null(),
        "dniGetWgpuInstance called with a null handle"
    );
    handle.into_instance()
}

/// Create a WebGPU instance.
///
/// # Returns
///
/// Handle to a new instance, or NULL if the WebGPU library returned NULL or
/// no WebGPU library could be bound.
///
/// # Ownership
///
/// The instance belongs to the WebGPU library. See `dniDestroy`.
#[unsafe(export_name = "dniCreate")]
pub extern "C" fn dni_create() -> DawnNativeInstance {
    match library::library() {
        Some(library) => create(library),
        None => {
            log::warn!("dniCreate: no WebGPU library bound, returning NULL");
            DawnNativeInstance::null()
        }
    }
}

/// Release a handle returned by `dniCreate`.
///
/// This is currently a no-op; the underlying instance is not released.
///
/// # Safety
///
/// `handle` must be non-null. Debug builds abort on NULL; release builds do
/// not check.
#[unsafe(export_name = "dniDestroy")]
pub extern "C" fn dni_destroy(handle: DawnNativeInstance) {
    destroy(handle)
}

/// Get the `WGPUInstance` behind a handle.
///
/// The returned pointer is borrowed; pass it to WebGPU functions only.
///
/// # Safety
///
/// `handle` must be non-null. Debug builds abort on NULL; release builds do
/// not check.
#[unsafe(export_name = "dniGetWgpuInstance")]
pub extern "C" fn dni_get_wgpu_instance(handle: DawnNativeInstance) -> WGPUInstance {
    underlying_instance(handle)
}
