// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime type descriptors.
//!
//! Provides the [`TypeDescriptor`] contract, [`LeafType`] for single opaque
//! values and [`Struct`] for packed, named compositions of other
//! descriptors.

mod composite;
mod identity;
mod leaf;

pub use composite::{Member, Ownership, Struct};
pub use identity::{IdentityToken, LeafValue};
pub use leaf::LeafType;

pub(crate) use composite::resolve_member;
pub(crate) use leaf::{inspect_at, read_clone, replace_at, update_at};

use std::fmt;
use std::sync::Arc;

/// Descriptor variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// Single opaque value without named sub-fields.
    Leaf,
    /// Ordered set of named, offset-positioned members.
    Composite,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leaf => f.write_str("leaf"),
            Self::Composite => f.write_str("composite"),
        }
    }
}

/// Shared handle to a published, immutable descriptor.
pub type TypeRef = Arc<dyn TypeDescriptor>;

/// Layout and lifecycle contract shared by every descriptor.
///
/// The lifecycle operations work on raw byte locations of exactly
/// [`memory_size`](Self::memory_size) bytes, with no alignment requirement.
///
/// # Safety
///
/// Implementors must keep `identity()` honest: a descriptor that reports
/// `Some(token)` must only ever place values of the shape named by `token`,
/// spanning `memory_size()` bytes, at the locations it initializes. A token
/// built with [`IdentityToken::of::<T>`](IdentityToken::of) additionally
/// promises that the value is exactly a `T`. Typed access trusts this to
/// reinterpret bytes.
///
/// Every value placed at a location (by `initialize_at` or `duplicate_at`,
/// at any depth) must be `Send + Sync`. Instances and views are shared and
/// moved across threads on that basis, so a descriptor placing an `Rc` or a
/// `Cell` is unsound.
pub unsafe trait TypeDescriptor: fmt::Debug + Send + Sync {
    fn kind(&self) -> Kind;

    /// Display name.
    fn name(&self) -> &str;

    /// Exact number of bytes one value occupies. No padding.
    fn memory_size(&self) -> usize;

    /// Identity token for leaf descriptors, `None` for composites.
    fn identity(&self) -> Option<&IdentityToken> {
        None
    }

    /// Member table for composite descriptors, `None` for leaves.
    fn as_struct(&self) -> Option<&Struct> {
        None
    }

    /// Construct the baseline value in place.
    ///
    /// # Safety
    /// `location` must be writable for `memory_size()` bytes and must not
    /// hold a live value (it would leak).
    unsafe fn initialize_at(&self, location: *mut u8);

    /// Run destruction semantics in place. The location is uninitialized
    /// afterwards.
    ///
    /// # Safety
    /// `location` must hold a value previously constructed by this
    /// descriptor (via `initialize_at` or `duplicate_at`).
    unsafe fn finalize_at(&self, location: *mut u8);

    /// Construct a deep copy of `src` at `dest`.
    ///
    /// # Safety
    /// `src` must hold a live value constructed by this descriptor; `dest`
    /// must be writable for `memory_size()` bytes, hold no live value, and
    /// not overlap `src`.
    unsafe fn duplicate_at(&self, dest: *mut u8, src: *const u8);

    /// Independently owned copy of this descriptor.
    fn clone_descriptor(&self) -> Box<dyn TypeDescriptor>;
}
