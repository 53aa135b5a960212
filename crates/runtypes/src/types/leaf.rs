// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Leaf type descriptor wrapping a single opaque value.
//!
//! Buffers are packed without padding, so a leaf location is not
//! necessarily aligned for its value. Every access goes through
//! `read_unaligned`/`write_unaligned`; no reference to buffer bytes is ever
//! formed as `&T`.

use crate::types::{IdentityToken, Kind, LeafValue, TypeDescriptor, TypeRef};
use std::fmt;
use std::mem::{self, ManuallyDrop};
use std::ptr;
use std::sync::Arc;

/// Descriptor for one value of type `T`.
///
/// The baseline is the value every new location starts with.
#[derive(Clone)]
pub struct LeafType<T: LeafValue> {
    identity: IdentityToken,
    baseline: T,
}

impl<T: LeafValue> LeafType<T> {
    /// Create a leaf whose locations start as clones of `baseline`.
    pub fn new(baseline: T) -> Self {
        Self {
            identity: IdentityToken::of::<T>(),
            baseline,
        }
    }

    /// Value copied into every freshly initialized location.
    pub fn baseline(&self) -> &T {
        &self.baseline
    }

    /// Publish this descriptor as a shared, immutable [`TypeRef`].
    pub fn into_ref(self) -> TypeRef {
        Arc::new(self)
    }
}

impl<T: LeafValue + Default> Default for LeafType<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: LeafValue> From<T> for LeafType<T> {
    fn from(baseline: T) -> Self {
        Self::new(baseline)
    }
}

impl<T: LeafValue> fmt::Debug for LeafType<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LeafType")
            .field("identity", &self.identity)
            .field("memory_size", &mem::size_of::<T>())
            .finish()
    }
}

// SAFETY: `identity` is always `IdentityToken::of::<T>()` and every
// location this descriptor initializes holds exactly one `T` spanning
// `size_of::<T>()` bytes. `LeafValue` requires `T: Send + Sync`.
unsafe impl<T: LeafValue> TypeDescriptor for LeafType<T> {
    fn kind(&self) -> Kind {
        Kind::Leaf
    }

    fn name(&self) -> &str {
        self.identity.key()
    }

    fn memory_size(&self) -> usize {
        mem::size_of::<T>()
    }

    fn identity(&self) -> Option<&IdentityToken> {
        Some(&self.identity)
    }

    unsafe fn initialize_at(&self, location: *mut u8) {
        // SAFETY: caller guarantees `location` is writable for
        // `size_of::<T>()` bytes and holds no live value.
        unsafe { ptr::write_unaligned(location.cast::<T>(), self.baseline.clone()) };
    }

    unsafe fn finalize_at(&self, location: *mut u8) {
        // SAFETY: caller guarantees `location` holds a live `T`; after the
        // read it is logically uninitialized and the value is dropped here.
        drop(unsafe { ptr::read_unaligned(location.cast::<T>()) });
    }

    unsafe fn duplicate_at(&self, dest: *mut u8, src: *const u8) {
        // SAFETY: caller guarantees `src` holds a live `T` and `dest` is
        // writable and disjoint. The bitwise copy is never dropped.
        unsafe {
            let source = ManuallyDrop::new(ptr::read_unaligned(src.cast::<T>()));
            ptr::write_unaligned(dest.cast::<T>(), T::clone(&source));
        }
    }

    fn clone_descriptor(&self) -> Box<dyn TypeDescriptor> {
        Box::new(self.clone())
    }
}

// ============================================================================
// Typed access helpers (used by data views after an identity check)
// ============================================================================

/// Clone the `T` stored at `location`.
///
/// # Safety
/// `location` must hold a live `T`.
pub(crate) unsafe fn read_clone<T: LeafValue>(location: *const u8) -> T {
    // SAFETY: forwarded from caller; the bitwise copy is never dropped.
    let value = ManuallyDrop::new(unsafe { ptr::read_unaligned(location.cast::<T>()) });
    T::clone(&value)
}

/// Run `f` on a shared view of the `T` stored at `location`.
///
/// # Safety
/// `location` must hold a live `T`.
pub(crate) unsafe fn inspect_at<T: LeafValue, R>(location: *const u8, f: impl FnOnce(&T) -> R) -> R {
    // SAFETY: forwarded from caller; the bitwise copy is never dropped.
    let value = ManuallyDrop::new(unsafe { ptr::read_unaligned(location.cast::<T>()) });
    f(&value)
}

/// Replace the `T` stored at `location` with `value`, dropping the old one.
///
/// The new value is written before the old one is dropped, so a panicking
/// `Drop` never leaves the location holding a dropped value.
///
/// # Safety
/// `location` must hold a live `T` and be writable.
pub(crate) unsafe fn replace_at<T: LeafValue>(location: *mut u8, value: T) {
    // SAFETY: forwarded from caller; ownership of the old value moves out
    // before the new value moves in.
    let previous = unsafe {
        let previous = ptr::read_unaligned(location.cast::<T>());
        ptr::write_unaligned(location.cast::<T>(), value);
        previous
    };
    drop(previous);
}

/// Run `f` on a mutable view of the `T` stored at `location`.
///
/// The value is always written back, including when `f` unwinds.
///
/// # Safety
/// `location` must hold a live `T` and be writable.
pub(crate) unsafe fn update_at<T: LeafValue, R>(location: *mut u8, f: impl FnOnce(&mut T) -> R) -> R {
    struct WriteBack<T> {
        location: *mut u8,
        value: ManuallyDrop<T>,
    }

    impl<T> Drop for WriteBack<T> {
        fn drop(&mut self) {
            // SAFETY: `value` is taken exactly once, here, and the location
            // was vacated when the guard was built.
            unsafe {
                ptr::write_unaligned(
                    self.location.cast::<T>(),
                    ManuallyDrop::take(&mut self.value),
                );
            }
        }
    }

    let mut guard = WriteBack {
        location,
        // SAFETY: forwarded from caller; the guard owns the value until drop.
        value: ManuallyDrop::new(unsafe { ptr::read_unaligned(location.cast::<T>()) }),
    };
    f(&mut guard.value)
}
