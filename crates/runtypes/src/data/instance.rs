// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Owning data buffer.
//!
//! `Instance` is the only type that allocates or frees buffer memory. It
//! initializes the whole region on construction, deep-copies it on
//! `clone()` and finalizes it on drop.

use crate::data::{ReadableView, WritableView};
use crate::error::AccessError;
use crate::types::{LeafValue, TypeRef};
use std::fmt;
use std::mem::MaybeUninit;
use std::sync::Arc;

/// A buffer holding one live value of its descriptor.
///
/// # Example
///
/// ```rust
/// use runtypes::data::Instance;
/// use runtypes::types::Struct;
///
/// let mut point = Struct::new("point");
/// point.add_member("x", 0i32).unwrap();
/// point.add_member("y", 0i32).unwrap();
///
/// let mut data = Instance::new(point.into_ref());
/// data.set("x", 5i32).unwrap();
/// assert_eq!(data.get::<i32>("x").unwrap(), 5);
///
/// let copy = data.clone();
/// data.set("x", 9i32).unwrap();
/// assert_eq!(copy.get::<i32>("x").unwrap(), 5);
/// ```
pub struct Instance {
    descriptor: TypeRef,
    memory: Box<[MaybeUninit<u8>]>,
}

// SAFETY: the buffer only holds values placed by its descriptor, and the
// `TypeDescriptor` contract requires every placed value to be
// `Send + Sync`; descriptors themselves are `Send + Sync`.
unsafe impl Send for Instance {}
// SAFETY: see above; shared access only reads.
unsafe impl Sync for Instance {}

impl Instance {
    /// Allocate exactly `memory_size()` bytes and initialize them.
    pub fn new(descriptor: TypeRef) -> Self {
        let mut memory = Self::allocate(descriptor.memory_size());
        // SAFETY: fresh region of exactly `memory_size()` bytes.
        unsafe { descriptor.initialize_at(memory.as_mut_ptr().cast()) };
        log::trace!(
            "[Instance::new] '{}' constructed ({} bytes)",
            descriptor.name(),
            memory.len()
        );
        Self { descriptor, memory }
    }

    fn allocate(size: usize) -> Box<[MaybeUninit<u8>]> {
        vec![MaybeUninit::uninit(); size].into_boxed_slice()
    }

    pub fn descriptor(&self) -> &TypeRef {
        &self.descriptor
    }

    /// Buffer length; always the descriptor's `memory_size()`.
    pub fn memory_size(&self) -> usize {
        self.memory.len()
    }

    /// Read-only view of the whole value.
    pub fn view(&self) -> ReadableView<'_> {
        // SAFETY: the buffer holds a live value of `descriptor` and the view
        // borrows `self`.
        unsafe { ReadableView::from_raw(self.descriptor.as_ref(), self.memory.as_ptr().cast()) }
    }

    /// Read/write view of the whole value.
    pub fn view_mut(&mut self) -> WritableView<'_> {
        // SAFETY: the buffer holds a live value of `descriptor` and the view
        // borrows `self` exclusively.
        unsafe {
            WritableView::from_raw(self.descriptor.as_ref(), self.memory.as_mut_ptr().cast())
        }
    }

    /// Read-only view of a top-level member.
    pub fn index(&self, name: &str) -> Result<ReadableView<'_>, AccessError> {
        self.view().index(name)
    }

    /// Read/write view of a top-level member.
    pub fn index_mut(&mut self, name: &str) -> Result<WritableView<'_>, AccessError> {
        self.view_mut().index(name)
    }

    /// Clone the leaf at a dotted path.
    pub fn get<T: LeafValue>(&self, path: &str) -> Result<T, AccessError> {
        self.view().path(path)?.get()
    }

    /// Replace the leaf at a dotted path.
    pub fn set<T: LeafValue>(&mut self, path: &str, value: T) -> Result<(), AccessError> {
        self.view_mut().path(path)?.set(value)
    }

    /// Raw start of the buffer, for interop.
    pub fn as_ptr(&self) -> *const u8 {
        self.memory.as_ptr().cast()
    }

    /// Raw mutable start of the buffer, for interop.
    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.memory.as_mut_ptr().cast()
    }
}

/// Construct an instance of a published descriptor.
pub fn construct(descriptor: &TypeRef) -> Instance {
    Instance::new(Arc::clone(descriptor))
}

impl Clone for Instance {
    /// Deep copy: every leaf is duplicated with its own `Clone`.
    fn clone(&self) -> Self {
        let mut memory = Self::allocate(self.memory.len());
        // SAFETY: source holds a live value, destination is a fresh region
        // of the same size.
        unsafe {
            self.descriptor
                .duplicate_at(memory.as_mut_ptr().cast(), self.memory.as_ptr().cast());
        }
        log::trace!(
            "[Instance::clone] '{}' duplicated ({} bytes)",
            self.descriptor.name(),
            memory.len()
        );
        Self {
            descriptor: Arc::clone(&self.descriptor),
            memory,
        }
    }
}

impl Drop for Instance {
    fn drop(&mut self) {
        log::trace!("[Instance::drop] '{}' finalized", self.descriptor.name());
        // SAFETY: the buffer holds a live value, finalized exactly once.
        unsafe { self.descriptor.finalize_at(self.memory.as_mut_ptr().cast()) };
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("type", &self.descriptor.name())
            .field("kind", &self.descriptor.kind())
            .field("memory_size", &self.memory.len())
            .finish()
    }
}
