//! Proc-address resolution.

use crate::library::{self, WebGpuLibrary};
use crate::webgpu::{WGPUProc, WGPUStringView};

/// Entry point resolved by `dnGetProcs`. Passed length-delimited, without a
/// terminator.
pub const CREATE_INSTANCE_PROC: &str = "createInstance";

/// Resolve [`CREATE_INSTANCE_PROC`] through `library`. A NULL result is
/// returned as-is.
pub fn proc_table(library: &WebGpuLibrary) -> WGPUProc {
    let proc = unsafe { library.get_proc_address(WGPUStringView::new(CREATE_INSTANCE_PROC)) };
    if proc.is_none() {
        log::warn!("wgpuGetProcAddress({CREATE_INSTANCE_PROC}) returned NULL");
    }
    proc
}

/// Get the WebGPU proc table entry for instance creation.
///
/// # Returns
///
/// The function pointer the WebGPU library resolves for `createInstance`,
/// or NULL if it resolves nothing or no WebGPU library could be bound. The
/// result is not checked; validate it before calling.
#[unsafe(export_name = "dnGetProcs")]
pub extern "C" fn dn_get_procs() -> WGPUProc {
    match library::library() {
        Some(library) => proc_table(library),
        None => {
            log::warn!("dnGetProcs: no WebGPU library bound, returning NULL");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::fake;

    #[test]
    fn test_name_is_fourteen_bytes() {
        assert_eq!(CREATE_INSTANCE_PROC.len(), 14);
    }

    #[test]
    fn test_resolves_create_instance() {
        let library = fake::library();
        let proc = proc_table(&library);
        assert!(proc.is_some());
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let library = fake::library();
        let first = proc_table(&library).map(|f| f as usize);
        let second = proc_table(&library).map(|f| f as usize);
        assert_eq!(first, second);
    }

    #[test]
    fn test_null_resolution_propagates() {
        let library =
            WebGpuLibrary::from_procs(fake::create_instance, fake::get_proc_address_fails);
        assert!(proc_table(&library).is_none());
    }

    #[test]
    fn test_exported_resolves_through_binding() {
        fake::bind();
        let first = dn_get_procs().map(|f| f as usize);
        let second = dn_get_procs().map(|f| f as usize);
        assert!(first.is_some());
        assert_eq!(first, second);
    }

    #[test]
    fn test_resolved_proc_creates_instance() {
        let library = fake::library();
        let proc = proc_table(&library).unwrap();
        // SAFETY: the fake resolver returns its wgpuCreateInstance for this name.
        let create: crate::webgpu::WGPUProcCreateInstance = unsafe { std::mem::transmute(proc) };
        let instance = unsafe { create(std::ptr::null()) };
        assert_eq!(instance, fake::instance());
    }
}
