//! Non-owning handles with identity comparison.
//!
//! [`WeakHandle`] wraps a [`std::sync::Weak`] and is what the table stores for
//! weakly registered observers and for every sender filter. A handle never keeps
//! its referent alive: once the last [`Arc`] elsewhere is dropped, [`resolve()`]
//! returns `None` and keeps returning `None` from then on.
//!
//! Identity is the address of the referent's data. The handle keeps the backing
//! allocation reserved (not the value), so an address it compares against can
//! never be reused by another live object while the handle exists.
//!
//! [`resolve()`]: WeakHandle::resolve

use std::{
    fmt,
    ptr,
    sync::{Arc, Weak},
};

/// A weak reference to `T` that resolves to the referent while some other owner
/// keeps it alive.
pub struct WeakHandle<T: ?Sized> {
    inner: Weak<T>,
}

impl<T: ?Sized> WeakHandle<T> {
    /// Creates a handle to the value owned by `target`.
    #[inline]
    pub fn new(target: &Arc<T>) -> Self {
        Self {
            inner: Arc::downgrade(target),
        }
    }

    /// Wraps an existing weak pointer.
    ///
    /// This is the way to get a handle to a trait object: coerce the `Weak<T>` to
    /// `Weak<dyn Trait>` first, then wrap it.
    #[inline]
    pub fn from_weak(inner: Weak<T>) -> Self {
        Self { inner }
    }

    /// Returns the referent if some other owner still holds it.
    #[inline]
    pub fn resolve(&self) -> Option<Arc<T>> {
        self.inner.upgrade()
    }

    /// Returns `true` once the referent has been dropped. Never flips back.
    #[inline]
    pub fn is_dead(&self) -> bool {
        self.inner.strong_count() == 0
    }

    /// Returns `true` if both handles refer to the same allocation.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        ptr::addr_eq(self.inner.as_ptr(), other.inner.as_ptr())
    }

    /// Returns `true` if this handle refers to `target` by address.
    #[inline]
    pub fn points_to(&self, target: &T) -> bool {
        ptr::addr_eq(self.inner.as_ptr(), target as *const T)
    }
}

impl<T: ?Sized> Clone for WeakHandle<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: ?Sized> fmt::Debug for WeakHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakHandle")
            .field("addr", &(self.inner.as_ptr() as *const ()))
            .field("dead", &self.is_dead())
            .finish()
    }
}
