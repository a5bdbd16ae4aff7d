//! Binding to the external WebGPU library.
//!
//! The shim forwards to exactly two entry points, `wgpuCreateInstance` and
//! `wgpuGetProcAddress`. They reach this crate in one of three ways:
//!
//! - linked at build time (`link` feature),
//! - opened at runtime with `dlopen` (default),
//! - handed over by the host through `dniInstallProcs`.
//!
//! The resolved binding is stored once per process and never replaced.

use crate::config::LoaderOptions;
use crate::error::{DniError, LoadError};
use crate::util::{cstr_to_option_string, set_error, set_ok};
use crate::webgpu::{
    WGPUInstance, WGPUInstanceDescriptor, WGPUProc, WGPUProcCreateInstance,
    WGPUProcGetProcAddress, WGPUStringView,
};
use std::fmt;
use std::os::raw::c_char;
use std::sync::OnceLock;

const CREATE_INSTANCE_SYMBOL: &str = "wgpuCreateInstance";
const GET_PROC_ADDRESS_SYMBOL: &str = "wgpuGetProcAddress";

static LIBRARY: OnceLock<WebGpuLibrary> = OnceLock::new();

#[cfg(feature = "link")]
unsafe extern "C" {
    fn wgpuCreateInstance(descriptor: *const WGPUInstanceDescriptor) -> WGPUInstance;
    fn wgpuGetProcAddress(proc_name: WGPUStringView) -> WGPUProc;
}

/// Where a binding's entry points came from.
enum Origin {
    Injected,
    #[cfg(feature = "link")]
    Linked,
    #[cfg(unix)]
    Loaded(dl::SharedObject),
}

/// The two WebGPU entry points this crate forwards to.
pub struct WebGpuLibrary {
    create_instance: WGPUProcCreateInstance,
    get_proc_address: WGPUProcGetProcAddress,
    // Keeps a dlopen'ed library mapped while the pointers above are in use.
    origin: Origin,
}

impl WebGpuLibrary {
    /// Wrap entry points supplied by the host.
    pub fn from_procs(
        create_instance: WGPUProcCreateInstance,
        get_proc_address: WGPUProcGetProcAddress,
    ) -> Self {
        Self {
            create_instance,
            get_proc_address,
            origin: Origin::Injected,
        }
    }

    /// Entry points linked into this binary.
    #[cfg(feature = "link")]
    pub fn linked() -> Self {
        Self {
            create_instance: wgpuCreateInstance,
            get_proc_address: wgpuGetProcAddress,
            origin: Origin::Linked,
        }
    }

    /// Open a WebGPU shared library and resolve both entry points.
    ///
    /// Candidates from `options` are tried in order; the first one that
    /// opens is used. A library that opens but lacks a symbol is an error,
    /// not a reason to try the next candidate.
    #[cfg(unix)]
    pub fn load(options: &LoaderOptions) -> Result<Self, LoadError> {
        let mut attempts = Vec::new();

        for path in options.candidates() {
            let object = match dl::SharedObject::open(&path) {
                Ok(object) => object,
                Err(dl::OpenError::Loader(reason)) => {
                    log::debug!("dlopen {} failed: {reason}", path.display());
                    attempts.push((path, reason));
                    continue;
                }
                Err(dl::OpenError::InteriorNul) => return Err(LoadError::InvalidPath(path)),
            };

            let create = object.symbol(CREATE_INSTANCE_SYMBOL)?;
            let get_proc = object.symbol(GET_PROC_ADDRESS_SYMBOL)?;
            log::debug!("resolved WebGPU entry points from {}", path.display());

            // SAFETY: both symbols are declared in webgpu.h with exactly
            // these signatures.
            let (create_instance, get_proc_address) = unsafe {
                (
                    std::mem::transmute::<*mut std::ffi::c_void, WGPUProcCreateInstance>(create),
                    std::mem::transmute::<*mut std::ffi::c_void, WGPUProcGetProcAddress>(
                        get_proc,
                    ),
                )
            };

            return Ok(Self {
                create_instance,
                get_proc_address,
                origin: Origin::Loaded(object),
            });
        }

        Err(LoadError::LibraryNotFound { attempts })
    }

    #[cfg(not(unix))]
    pub fn load(_options: &LoaderOptions) -> Result<Self, LoadError> {
        Err(LoadError::Unsupported)
    }

    /// Call `wgpuCreateInstance`.
    ///
    /// # Safety
    ///
    /// `descriptor` must be NULL or a valid `WGPUInstanceDescriptor`.
    pub unsafe fn create_instance(
        &self,
        descriptor: *const WGPUInstanceDescriptor,
    ) -> WGPUInstance {
        unsafe { (self.create_instance)(descriptor) }
    }

    /// Call `wgpuGetProcAddress`.
    ///
    /// # Safety
    ///
    /// `proc_name` must describe readable memory for the duration of the call.
    pub unsafe fn get_proc_address(&self, proc_name: WGPUStringView) -> WGPUProc {
        unsafe { (self.get_proc_address)(proc_name) }
    }

    fn describe(&self) -> String {
        match &self.origin {
            Origin::Injected => "host-provided procs".to_string(),
            #[cfg(feature = "link")]
            Origin::Linked => "linked library".to_string(),
            #[cfg(unix)]
            Origin::Loaded(object) => object.path().display().to_string(),
        }
    }
}

impl fmt::Debug for WebGpuLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebGpuLibrary")
            .field("origin", &self.describe())
            .finish_non_exhaustive()
    }
}

/// The process binding, resolving it on first use.
///
/// Returns `None` when nothing is bound and the default binding cannot be
/// resolved. A failed resolution is retried on the next call.
pub fn library() -> Option<&'static WebGpuLibrary> {
    if let Some(library) = LIBRARY.get() {
        return Some(library);
    }

    match default_library() {
        Ok(library) => Some(bind(library)),
        Err(e) => {
            log::warn!("no WebGPU library available: {e}");
            None
        }
    }
}

/// Whether a binding is set, without attempting to resolve one.
pub fn is_bound() -> bool {
    LIBRARY.get().is_some()
}

/// Bind `library` for the rest of the process.
pub fn install(library: WebGpuLibrary) -> Result<(), LoadError> {
    install_into(&LIBRARY, library)
}

fn install_into(slot: &OnceLock<WebGpuLibrary>, library: WebGpuLibrary) -> Result<(), LoadError> {
    let description = library.describe();
    slot.set(library).map_err(|_| LoadError::AlreadyBound)?;
    log::info!("bound WebGPU library: {description}");
    Ok(())
}

fn bind(library: WebGpuLibrary) -> &'static WebGpuLibrary {
    let mut fresh = false;
    let bound = LIBRARY.get_or_init(|| {
        fresh = true;
        library
    });
    if fresh {
        log::info!("bound WebGPU library: {}", bound.describe());
    }
    bound
}

#[cfg(feature = "link")]
fn default_library() -> Result<WebGpuLibrary, LoadError> {
    Ok(WebGpuLibrary::linked())
}

#[cfg(not(feature = "link"))]
fn default_library() -> Result<WebGpuLibrary, LoadError> {
    WebGpuLibrary::load(&LoaderOptions::from_env())
}

/// Open a WebGPU shared library and bind it to this process.
///
/// # Parameters
///
/// - `options_json`: JSON string with loader options (NULL for defaults)
/// - `error`: Out-parameter for error information
///
/// # Returns
///
/// 1 on success, 0 on failure.
///
/// # Options JSON Schema
///
/// ```json
/// { "path": "/opt/dawn/lib/libwebgpu_dawn.so" }
/// ```
///
/// Without `path`, `DNI_WEBGPU_LIBRARY` is consulted, then the platform
/// default library names.
///
/// # Safety
///
/// - `options_json` must be a valid null-terminated UTF-8 string or NULL
/// - `error` must be a valid pointer or NULL
#[unsafe(export_name = "dniLoadLibrary")]
pub unsafe extern "C" fn dni_load_library(
    options_json: *const c_char,
    error: *mut DniError,
) -> i32 {
    unsafe { load_library_into(&LIBRARY, options_json, error) }
}

/// `dniLoadLibrary` against an explicit binding slot.
unsafe fn load_library_into(
    slot: &OnceLock<WebGpuLibrary>,
    options_json: *const c_char,
    error: *mut DniError,
) -> i32 {
    let json = match unsafe { cstr_to_option_string(options_json, "options_json") } {
        Ok(json) => json,
        Err(e) => return unsafe { set_error(error, e) },
    };

    let options = match LoaderOptions::from_json(json.as_deref()) {
        Ok(options) => options,
        Err(e) => return unsafe { set_error(error, DniError::json_parse(e)) },
    };

    if slot.get().is_some() {
        return unsafe { set_error(error, LoadError::AlreadyBound.into()) };
    }

    match WebGpuLibrary::load(&options).and_then(|library| install_into(slot, library)) {
        Ok(()) => {
            unsafe { set_ok(error) };
            1
        }
        Err(e) => unsafe { set_error(error, e.into()) },
    }
}

/// Bind host-provided WebGPU entry points.
///
/// # Parameters
///
/// - `create_instance`: the host's `wgpuCreateInstance`
/// - `get_proc_address`: the host's `wgpuGetProcAddress`
/// - `error`: Out-parameter for error information
///
/// # Returns
///
/// 1 on success, 0 on failure.
///
/// # Safety
///
/// - both function pointers must stay callable for the life of the process
/// - `error` must be a valid pointer or NULL
#[unsafe(export_name = "dniInstallProcs")]
pub unsafe extern "C" fn dni_install_procs(
    create_instance: Option<WGPUProcCreateInstance>,
    get_proc_address: Option<WGPUProcGetProcAddress>,
    error: *mut DniError,
) -> i32 {
    let Some(create_instance) = create_instance else {
        return unsafe { set_error(error, DniError::null_pointer("create_instance")) };
    };
    let Some(get_proc_address) = get_proc_address else {
        return unsafe { set_error(error, DniError::null_pointer("get_proc_address")) };
    };

    match install(WebGpuLibrary::from_procs(create_instance, get_proc_address)) {
        Ok(()) => {
            unsafe { set_ok(error) };
            1
        }
        Err(e) => unsafe { set_error(error, e.into()) },
    }
}

/// Whether a WebGPU library is bound (1) or not (0).
///
/// Never triggers loading.
#[unsafe(export_name = "dniIsLibraryBound")]
pub extern "C" fn dni_is_library_bound() -> i32 {
    is_bound() as i32
}

#[cfg(unix)]
mod dl {
    use crate::error::LoadError;
    use std::ffi::{CStr, CString, c_void};
    use std::os::unix::ffi::OsStrExt;
    use std::path::{Path, PathBuf};
    use std::ptr::NonNull;

    pub enum OpenError {
        Loader(String),
        InteriorNul,
    }

    /// A `dlopen` handle, closed on drop.
    pub struct SharedObject {
        handle: NonNull<c_void>,
        path: PathBuf,
    }

    // dlopen handles are process-global and valid from any thread.
    unsafe impl Send for SharedObject {}
    unsafe impl Sync for SharedObject {}

    impl SharedObject {
        pub fn open(path: &Path) -> Result<Self, OpenError> {
            let c_path =
                CString::new(path.as_os_str().as_bytes()).map_err(|_| OpenError::InteriorNul)?;

            let raw = unsafe { libc::dlopen(c_path.as_ptr(), libc::RTLD_NOW | libc::RTLD_LOCAL) };
            match NonNull::new(raw) {
                Some(handle) => Ok(Self {
                    handle,
                    path: path.to_path_buf(),
                }),
                None => Err(OpenError::Loader(last_error())),
            }
        }

        pub fn symbol(&self, name: &'static str) -> Result<*mut c_void, LoadError> {
            let not_found = |reason: String| LoadError::SymbolNotFound {
                library: self.path.clone(),
                symbol: name,
                reason,
            };
            let c_name = CString::new(name).map_err(|_| not_found("invalid name".to_string()))?;

            // Clear any stale message so a NULL result can be told apart
            // from a symbol whose value is NULL.
            unsafe { libc::dlerror() };
            let ptr = unsafe { libc::dlsym(self.handle.as_ptr(), c_name.as_ptr()) };
            if ptr.is_null() {
                return Err(not_found(last_error()));
            }
            Ok(ptr)
        }

        pub fn path(&self) -> &Path {
            &self.path
        }
    }

    impl Drop for SharedObject {
        fn drop(&mut self) {
            unsafe { libc::dlclose(self.handle.as_ptr()) };
        }
    }

    fn last_error() -> String {
        let msg = unsafe { libc::dlerror() };
        if msg.is_null() {
            return "unknown loader error".to_string();
        }
        unsafe { CStr::from_ptr(msg) }.to_string_lossy().into_owned()
    }
}

/// Stand-ins for the WebGPU library used across this crate's tests.
#[cfg(test)]
pub(crate) mod fake {
    use super::*;

    static INSTANCE_STORAGE: u8 = 0;

    /// The pointer every fake `wgpuCreateInstance` call returns.
    pub fn instance() -> WGPUInstance {
        (&raw const INSTANCE_STORAGE).cast_mut().cast()
    }

    pub unsafe extern "C" fn create_instance(
        descriptor: *const WGPUInstanceDescriptor,
    ) -> WGPUInstance {
        assert!(descriptor.is_null());
        instance()
    }

    pub unsafe extern "C" fn create_instance_fails(
        _descriptor: *const WGPUInstanceDescriptor,
    ) -> WGPUInstance {
        std::ptr::null_mut()
    }

    /// Resolves only the exact 14-byte name `createInstance`.
    pub unsafe extern "C" fn get_proc_address(proc_name: WGPUStringView) -> WGPUProc {
        if proc_name.length != 14 || unsafe { proc_name.as_bytes() } != b"createInstance" {
            return None;
        }
        // SAFETY: WGPUProc is the type-erased form of every entry point.
        Some(unsafe {
            std::mem::transmute::<WGPUProcCreateInstance, unsafe extern "C" fn()>(create_instance)
        })
    }

    pub unsafe extern "C" fn get_proc_address_fails(_proc_name: WGPUStringView) -> WGPUProc {
        None
    }

    pub fn library() -> WebGpuLibrary {
        WebGpuLibrary::from_procs(create_instance, get_proc_address)
    }

    /// Bind the fake library process-wide. Every test that touches the
    /// global binding goes through here, so the binding is always the fake.
    pub fn bind() -> &'static WebGpuLibrary {
        super::bind(library())
    }
}
