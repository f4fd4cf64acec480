//! Opaque handle wrapper for adapter instances.

/// Opaque handle to an adapter instance.
///
/// This struct owns the underlying adapter and is exposed to C as an opaque
/// pointer. Each `csp_*_free` function takes the address of the caller's
/// handle variable and nulls it after release, so releasing twice is a no-op.
///
/// # Thread Safety
///
/// Handles are NOT thread-safe. All operations on a handle must occur
/// from the same thread that created it, or external synchronization must be used.
pub struct Handle<T> {
    inner: T,
}

impl<T> Handle<T> {
    /// Move `inner` onto the heap and hand ownership to the caller.
    pub fn into_raw(inner: T) -> *mut Self {
        log::trace!("handle created: {}", std::any::type_name::<T>());
        Box::into_raw(Box::new(Self { inner }))
    }

    /// Get a reference to the wrapped adapter.
    pub fn as_ref(&self) -> &T {
        &self.inner
    }

    /// Get a mutable reference to the wrapped adapter.
    pub fn as_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Convert a raw pointer to a shared reference.
    ///
    /// # Safety
    ///
    /// The pointer must be NULL or a live handle of this type.
    pub unsafe fn from_ptr<'a>(ptr: *const Self) -> Option<&'a Self> {
        unsafe { ptr.as_ref() }
    }

    /// Convert a raw pointer to a mutable reference.
    ///
    /// # Safety
    ///
    /// The pointer must be NULL or a live handle of this type.
    pub unsafe fn from_ptr_mut<'a>(ptr: *mut Self) -> Option<&'a mut Self> {
        unsafe { ptr.as_mut() }
    }

    /// Drop the handle stored in `*slot` and null the slot.
    ///
    /// NULL `slot` and NULL `*slot` are both no-ops.
    ///
    /// # Safety
    ///
    /// `slot` must be NULL or point to a variable holding NULL or a live
    /// handle of this type.
    pub unsafe fn release(slot: *mut *mut Self) {
        let Some(slot) = (unsafe { slot.as_mut() }) else {
            return;
        };
        let ptr = std::mem::replace(slot, std::ptr::null_mut());
        if ptr.is_null() {
            return;
        }
        log::trace!("handle released: {}", std::any::type_name::<T>());
        unsafe {
            drop(Box::from_raw(ptr));
        }
    }
}
