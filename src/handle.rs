//! Opaque handle wrapper for WebGPU instances.

use crate::webgpu::{WGPUInstance, WGPUInstanceImpl};
use std::fmt;
use std::marker::PhantomData;
use std::os::raw::c_void;

/// Tag type behind `DawnNativeInstance`. Uninhabited: there is never a value
/// of this type to point at, only an address tagged with it.
pub enum DawnNativeInstanceImpl {}

/// A raw address tagged with the type it may be re-cast to.
///
/// The wrapper is `#[repr(transparent)]` over a pointer, so it crosses the C
/// ABI exactly like `Tag*`. It never dereferences the address and does not
/// implement `Deref`; the only way back to a usable pointer is an explicit
/// conversion to the external library's type.
///
/// # Thread Safety
///
/// `OpaqueHandle` is NOT `Send` or `Sync`. Whether the pointee may be shared
/// across threads is decided by the library that owns it.
#[repr(transparent)]
pub struct OpaqueHandle<Tag> {
    addr: *mut c_void,
    _tag: PhantomData<*const Tag>,
}

/// Handle returned to C as `DawnNativeInstance`.
pub type DawnNativeInstance = OpaqueHandle<DawnNativeInstanceImpl>;

impl<Tag> OpaqueHandle<Tag> {
    /// The null handle.
    pub const fn null() -> Self {
        Self {
            addr: std::ptr::null_mut(),
            _tag: PhantomData,
        }
    }

    pub fn is_null(&self) -> bool {
        self.addr.is_null()
    }

    /// The raw address, for comparison and logging only.
    pub fn addr(&self) -> usize {
        self.addr as usize
    }

    /// Re-tag the same address under another handle type.
    pub fn retag<U>(self) -> OpaqueHandle<U> {
        OpaqueHandle {
            addr: self.addr,
            _tag: PhantomData,
        }
    }
}

impl DawnNativeInstance {
    /// Tag an instance pointer produced by the WebGPU library.
    pub fn from_instance(instance: WGPUInstance) -> Self {
        Self {
            addr: instance.cast(),
            _tag: PhantomData,
        }
    }

    /// Hand the address back as the library's own instance type.
    pub fn into_instance(self) -> WGPUInstance {
        self.addr.cast::<WGPUInstanceImpl>()
    }
}

impl<Tag> Clone for OpaqueHandle<Tag> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<Tag> Copy for OpaqueHandle<Tag> {}

impl<Tag> PartialEq for OpaqueHandle<Tag> {
    fn eq(&self, other: &Self) -> bool {
        self.addr == other.addr
    }
}

impl<Tag> Eq for OpaqueHandle<Tag> {}

impl<Tag> fmt::Debug for OpaqueHandle<Tag> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OpaqueHandle({:p})", self.addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointer_sized() {
        assert_eq!(
            std::mem::size_of::<DawnNativeInstance>(),
            std::mem::size_of::<*mut c_void>()
        );
        assert_eq!(
            std::mem::align_of::<DawnNativeInstance>(),
            std::mem::align_of::<*mut c_void>()
        );
    }

    #[test]
    fn test_null() {
        let handle = DawnNativeInstance::null();
        assert!(handle.is_null());
        assert_eq!(handle.addr(), 0);
        assert!(handle.into_instance().is_null());
    }

    #[test]
    fn test_instance_round_trip_keeps_address() {
        let mut backing = 0u64;
        let instance: WGPUInstance = (&raw mut backing).cast();

        let handle = DawnNativeInstance::from_instance(instance);
        assert!(!handle.is_null());
        assert_eq!(handle.addr(), instance as usize);
        assert_eq!(handle.into_instance(), instance);
    }

    #[test]
    fn test_retag_keeps_address() {
        struct OtherTag;
        let mut backing = 0u8;
        let handle = DawnNativeInstance::from_instance((&raw mut backing).cast());
        let other: OpaqueHandle<OtherTag> = handle.retag();
        assert_eq!(other.addr(), handle.addr());
        assert_eq!(other.retag::<DawnNativeInstanceImpl>(), handle);
    }
}
