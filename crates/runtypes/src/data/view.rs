// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Non-owning read and read/write windows into a data buffer.

use crate::config::PATH_SEPARATOR;
use crate::error::AccessError;
use crate::types::{
    inspect_at, read_clone, replace_at, resolve_member, update_at, IdentityToken, Kind,
    LeafValue, Member, TypeDescriptor,
};
use std::fmt;
use std::marker::PhantomData;
use std::mem;

/// Check that `descriptor` is a leaf holding a `T`.
///
/// The `TypeId` carried by the token is the deciding check; the shape key is
/// what errors and logs report. The size comparison is a secondary guard.
fn check_identity<T: LeafValue>(descriptor: &dyn TypeDescriptor) -> Result<(), AccessError> {
    let found = descriptor.identity().ok_or_else(|| AccessError::NotALeaf {
        type_name: descriptor.name().to_owned(),
    })?;
    let expected = IdentityToken::of::<T>();
    if !found.is::<T>() || descriptor.memory_size() != mem::size_of::<T>() {
        log::debug!(
            "[view] identity mismatch: expected {}, found {}",
            expected,
            found
        );
        return Err(AccessError::IdentityMismatch {
            expected: expected.key().to_owned(),
            found: found.key().to_owned(),
        });
    }
    Ok(())
}

/// Read-only window over one value of a buffer.
///
/// Views borrow the buffer they were created from and cannot outlive it.
#[derive(Clone, Copy)]
pub struct ReadableView<'a> {
    descriptor: &'a dyn TypeDescriptor,
    location: *const u8,
    offset: usize,
    _bytes: PhantomData<&'a [u8]>,
}

// SAFETY: a view is a shared borrow of bytes whose values the
// `TypeDescriptor` contract requires to be `Send + Sync`.
unsafe impl Send for ReadableView<'_> {}
// SAFETY: see above.
unsafe impl Sync for ReadableView<'_> {}

impl<'a> ReadableView<'a> {
    /// View an externally owned location.
    ///
    /// # Safety
    /// `location` must hold a live value constructed by `descriptor`, and
    /// must stay valid and unmodified for `'a`.
    pub unsafe fn from_raw(descriptor: &'a dyn TypeDescriptor, location: *const u8) -> Self {
        Self {
            descriptor,
            location,
            offset: 0,
            _bytes: PhantomData,
        }
    }

    pub fn descriptor(&self) -> &'a dyn TypeDescriptor {
        self.descriptor
    }

    pub fn kind(&self) -> Kind {
        self.descriptor.kind()
    }

    /// Absolute byte offset from the start of the root buffer.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Raw location of the viewed bytes, for interop.
    pub fn as_ptr(&self) -> *const u8 {
        self.location
    }

    fn child(&self, member: &'a Member) -> Self {
        Self {
            descriptor: member.descriptor(),
            // SAFETY: member ranges lie inside the parent's range.
            location: unsafe { self.location.add(member.offset()) },
            offset: self.offset + member.offset(),
            _bytes: PhantomData,
        }
    }

    /// View of a named member. Fails on leaves and unknown names.
    pub fn index(&self, name: &str) -> Result<ReadableView<'a>, AccessError> {
        let member = resolve_member(self.descriptor, name)?;
        Ok(self.child(member))
    }

    /// View at a dotted path. The empty path is this view.
    pub fn path(&self, path: &str) -> Result<ReadableView<'a>, AccessError> {
        if path.is_empty() {
            return Ok(*self);
        }
        path.split(PATH_SEPARATOR)
            .try_fold(*self, |view, name| view.index(name))
    }

    /// Clone the leaf value out of the buffer.
    pub fn get<T: LeafValue>(&self) -> Result<T, AccessError> {
        check_identity::<T>(self.descriptor)?;
        // SAFETY: identity matched, so the location holds a live `T`.
        Ok(unsafe { read_clone::<T>(self.location) })
    }

    /// Borrow the leaf value in place without cloning it.
    pub fn inspect<T: LeafValue, R>(&self, f: impl FnOnce(&T) -> R) -> Result<R, AccessError> {
        check_identity::<T>(self.descriptor)?;
        // SAFETY: identity matched, so the location holds a live `T`.
        Ok(unsafe { inspect_at(self.location, f) })
    }

    /// Member views in layout order. Empty for leaves.
    pub fn fields(&self) -> impl Iterator<Item = (&'a str, ReadableView<'a>)> + 'a {
        let view = *self;
        let members = match view.descriptor.as_struct() {
            Some(composite) => composite.members(),
            None => <&[Member]>::default().iter(),
        };
        members.map(move |member| (member.name(), view.child(member)))
    }
}

impl fmt::Debug for ReadableView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadableView")
            .field("type", &self.descriptor.name())
            .field("kind", &self.kind())
            .field("offset", &self.offset)
            .field("memory_size", &self.descriptor.memory_size())
            .finish()
    }
}

/// Read/write window over one value of a buffer.
///
/// Writes always run the previous value's destruction semantics; bytes are
/// never overwritten raw.
pub struct WritableView<'a> {
    descriptor: &'a dyn TypeDescriptor,
    location: *mut u8,
    offset: usize,
    _bytes: PhantomData<&'a mut [u8]>,
}

// SAFETY: an exclusive borrow of bytes holding `Send` values.
unsafe impl Send for WritableView<'_> {}

impl<'a> WritableView<'a> {
    /// Mutable view of an externally owned location.
    ///
    /// # Safety
    /// `location` must hold a live value constructed by `descriptor`, and
    /// must stay valid and exclusively accessible through this view for `'a`.
    pub unsafe fn from_raw(descriptor: &'a dyn TypeDescriptor, location: *mut u8) -> Self {
        Self {
            descriptor,
            location,
            offset: 0,
            _bytes: PhantomData,
        }
    }

    pub fn descriptor(&self) -> &'a dyn TypeDescriptor {
        self.descriptor
    }

    pub fn kind(&self) -> Kind {
        self.descriptor.kind()
    }

    /// Absolute byte offset from the start of the root buffer.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn as_ptr(&self) -> *const u8 {
        self.location
    }

    /// Raw mutable location of the viewed bytes, for interop.
    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.location
    }

    /// Read-only view of the same bytes.
    pub fn as_readable(&self) -> ReadableView<'_> {
        ReadableView {
            descriptor: self.descriptor,
            location: self.location,
            offset: self.offset,
            _bytes: PhantomData,
        }
    }

    fn into_child(self, member: &'a Member) -> Self {
        Self {
            descriptor: member.descriptor(),
            // SAFETY: member ranges lie inside the parent's range.
            location: unsafe { self.location.add(member.offset()) },
            offset: self.offset + member.offset(),
            _bytes: PhantomData,
        }
    }

    /// Narrow this view to a named member.
    pub fn index(self, name: &str) -> Result<WritableView<'a>, AccessError> {
        let member = resolve_member(self.descriptor, name)?;
        Ok(self.into_child(member))
    }

    /// Reborrow a named member, keeping this view usable afterwards.
    pub fn field(&mut self, name: &str) -> Result<WritableView<'_>, AccessError> {
        self.reborrow().index(name)
    }

    /// Narrow this view to a dotted path. The empty path is this view.
    pub fn path(self, path: &str) -> Result<WritableView<'a>, AccessError> {
        if path.is_empty() {
            return Ok(self);
        }
        path.split(PATH_SEPARATOR)
            .try_fold(self, |view, name| view.index(name))
    }

    fn reborrow(&mut self) -> WritableView<'_> {
        WritableView {
            descriptor: self.descriptor,
            location: self.location,
            offset: self.offset,
            _bytes: PhantomData,
        }
    }

    pub fn get<T: LeafValue>(&self) -> Result<T, AccessError> {
        self.as_readable().get()
    }

    /// Replace the leaf value. The previous value is dropped.
    pub fn set<T: LeafValue>(&mut self, value: T) -> Result<(), AccessError> {
        check_identity::<T>(self.descriptor)?;
        // SAFETY: identity matched and the view is exclusive.
        unsafe { replace_at(self.location, value) };
        Ok(())
    }

    /// Mutate the leaf value in place.
    pub fn update<T: LeafValue, R>(&mut self, f: impl FnOnce(&mut T) -> R) -> Result<R, AccessError> {
        check_identity::<T>(self.descriptor)?;
        // SAFETY: identity matched and the view is exclusive.
        Ok(unsafe { update_at(self.location, f) })
    }
}

impl fmt::Debug for WritableView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WritableView")
            .field("type", &self.descriptor.name())
            .field("kind", &self.kind())
            .field("offset", &self.offset)
            .field("memory_size", &self.descriptor.memory_size())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{LeafType, Struct};
    use std::mem::MaybeUninit;

    /// Build a scratch region initialized by `descriptor`.
    fn region(descriptor: &dyn TypeDescriptor) -> Vec<MaybeUninit<u8>> {
        let mut bytes = vec![MaybeUninit::uninit(); descriptor.memory_size()];
        unsafe { descriptor.initialize_at(bytes.as_mut_ptr().cast()) };
        bytes
    }

    #[test]
    fn test_raw_views_over_external_memory() {
        let mut s = Struct::new("pair");
        s.add_member("id", 3u32).expect("add id");
        s.add_member("tag", String::from("a")).expect("add tag");
        let mut bytes = region(&s);

        {
            let mut view = unsafe { WritableView::from_raw(&s, bytes.as_mut_ptr().cast()) };
            view.field("tag").and_then(|mut tag| tag.set(String::from("b"))).expect("set tag");
            view.field("id").and_then(|mut id| id.set(9u32)).expect("set id");
        }

        let view = unsafe { ReadableView::from_raw(&s, bytes.as_ptr().cast()) };
        assert_eq!(view.index("id").and_then(|v| v.get::<u32>()), Ok(9));
        assert_eq!(
            view.index("tag").and_then(|v| v.get::<String>()),
            Ok(String::from("b"))
        );
        assert_eq!(view.index("tag").map(|v| v.offset()), Ok(4));

        unsafe { s.finalize_at(bytes.as_mut_ptr().cast()) };
    }

    #[test]
    fn test_leaf_view_rejects_index() {
        let leaf = LeafType::new(1i32);
        let bytes = region(&leaf);
        let view = unsafe { ReadableView::from_raw(&leaf, bytes.as_ptr().cast()) };
        assert_eq!(
            view.index("x").unwrap_err(),
            AccessError::NoMembers {
                type_name: "i32".into()
            }
        );
        assert_eq!(view.fields().count(), 0);
        assert_eq!(view.path("").map(|v| v.offset()), Ok(0));
    }
}
