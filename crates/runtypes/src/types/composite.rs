// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Composite (struct) descriptors.
//!
//! Members are laid out back to back in insertion order: member `i` starts
//! at the sum of the sizes of members `0..i` and the struct size is the sum
//! of all member sizes. There is no alignment padding.

use crate::config::{ANONYMOUS_STRUCT_NAME, MAX_MEMORY_SIZE, PATH_SEPARATOR};
use crate::error::{AccessError, DefinitionError};
use crate::types::{Kind, LeafType, LeafValue, TypeDescriptor, TypeRef};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Who is responsible for a member's descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    /// Exclusively owned by the struct; deep-cloned when the struct is cloned.
    Owned,
    /// Shared with the caller; the handle is shared when the struct is cloned.
    Referenced,
}

enum MemberType {
    Owned(Box<dyn TypeDescriptor>),
    Referenced(TypeRef),
}

impl MemberType {
    fn get(&self) -> &dyn TypeDescriptor {
        match self {
            Self::Owned(descriptor) => descriptor.as_ref(),
            Self::Referenced(descriptor) => descriptor.as_ref(),
        }
    }
}

impl Clone for MemberType {
    fn clone(&self) -> Self {
        match self {
            Self::Owned(descriptor) => Self::Owned(descriptor.clone_descriptor()),
            Self::Referenced(descriptor) => Self::Referenced(Arc::clone(descriptor)),
        }
    }
}

/// A named, positioned field of a [`Struct`].
#[derive(Clone)]
pub struct Member {
    name: String,
    offset: usize,
    descriptor: MemberType,
}

impl Member {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Byte offset from the start of the enclosing struct.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn descriptor(&self) -> &dyn TypeDescriptor {
        self.descriptor.get()
    }

    pub fn ownership(&self) -> Ownership {
        match self.descriptor {
            MemberType::Owned(_) => Ownership::Owned,
            MemberType::Referenced(_) => Ownership::Referenced,
        }
    }

    pub fn memory_size(&self) -> usize {
        self.descriptor().memory_size()
    }
}

impl fmt::Debug for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Member")
            .field("name", &self.name)
            .field("offset", &self.offset)
            .field("ownership", &self.ownership())
            .field("type", &self.descriptor().name())
            .field("memory_size", &self.memory_size())
            .finish()
    }
}

/// Composite descriptor: an ordered, unique-keyed set of members.
///
/// Members can only be appended. Once published with
/// [`into_ref`](Self::into_ref) the layout is frozen.
///
/// # Example
///
/// ```rust
/// use runtypes::types::{Struct, TypeDescriptor};
///
/// let mut point = Struct::new("point");
/// point.add_member("x", 0i32).unwrap();
/// point.add_member("y", 0i32).unwrap();
///
/// assert_eq!(point.memory_size(), 8);
/// assert_eq!(point.member("y").map(|m| m.offset()), Some(4));
/// ```
#[derive(Debug, Clone)]
pub struct Struct {
    name: String,
    memory_size: usize,
    members: Vec<Member>,
    index: HashMap<String, usize>,
}

impl Struct {
    /// Create an empty struct.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            memory_size: 0,
            members: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Embed a value: wraps it in a new leaf owned by this struct.
    pub fn add_member<T: LeafValue>(
        &mut self,
        name: impl Into<String>,
        value: T,
    ) -> Result<&Member, DefinitionError> {
        let leaf: Box<dyn TypeDescriptor> = Box::new(LeafType::new(value));
        self.insert(name.into(), MemberType::Owned(leaf))
    }

    /// Embed a copy of an existing descriptor, owned by this struct.
    pub fn embed_member(
        &mut self,
        name: impl Into<String>,
        descriptor: &dyn TypeDescriptor,
    ) -> Result<&Member, DefinitionError> {
        self.insert(name.into(), MemberType::Owned(descriptor.clone_descriptor()))
    }

    /// Link a published descriptor by reference. The handle is shared, not
    /// copied.
    pub fn link_member(
        &mut self,
        name: impl Into<String>,
        descriptor: &TypeRef,
    ) -> Result<&Member, DefinitionError> {
        self.insert(name.into(), MemberType::Referenced(Arc::clone(descriptor)))
    }

    fn insert(&mut self, name: String, descriptor: MemberType) -> Result<&Member, DefinitionError> {
        if let Err(err) = self.check_field_name(&name) {
            log::debug!("[Struct::add_member] rejected: {}", err);
            return Err(err);
        }

        let position = self.members.len();
        let offset = self.memory_size;
        let size = descriptor.get().memory_size();
        let Some(total) = offset
            .checked_add(size)
            .filter(|&total| total <= MAX_MEMORY_SIZE)
        else {
            let err = DefinitionError::SizeOverflow {
                type_name: self.name.clone(),
                field: name,
            };
            log::debug!("[Struct::add_member] rejected: {}", err);
            return Err(err);
        };
        log::debug!(
            "[Struct::add_member] {}.{}: '{}' at offset {} ({} bytes)",
            self.name,
            name,
            descriptor.get().name(),
            offset,
            size
        );

        self.index.insert(name.clone(), position);
        self.members.push(Member {
            name,
            offset,
            descriptor,
        });
        self.memory_size = total;
        Ok(&self.members[position])
    }

    fn check_field_name(&self, name: &str) -> Result<(), DefinitionError> {
        let invalid = |reason| DefinitionError::InvalidFieldName {
            type_name: self.name.clone(),
            field: name.to_owned(),
            reason,
        };
        if name.is_empty() {
            return Err(invalid("field name is empty"));
        }
        if name.contains(PATH_SEPARATOR) {
            return Err(invalid("field name contains the path separator"));
        }
        if self.index.contains_key(name) {
            return Err(DefinitionError::DuplicateField {
                type_name: self.name.clone(),
                field: name.to_owned(),
            });
        }
        Ok(())
    }

    /// Look up a member, `None` if absent.
    pub fn member(&self, name: &str) -> Option<&Member> {
        self.index.get(name).map(|&position| &self.members[position])
    }

    /// Look up a member, failing with [`AccessError::NoSuchField`].
    pub fn try_member(&self, name: &str) -> Result<&Member, AccessError> {
        self.member(name).ok_or_else(|| AccessError::NoSuchField {
            type_name: self.name.clone(),
            field: name.to_owned(),
        })
    }

    /// Descriptor of a member.
    pub fn field_type(&self, name: &str) -> Option<&dyn TypeDescriptor> {
        self.member(name).map(Member::descriptor)
    }

    /// Members in insertion (layout) order.
    pub fn members(&self) -> std::slice::Iter<'_, Member> {
        self.members.iter()
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Absolute offset of a dotted field path (`"inner.vec"`).
    ///
    /// The result is the sum of the member offsets along the path.
    pub fn offset_of(&self, path: &str) -> Result<usize, AccessError> {
        let mut descriptor: &dyn TypeDescriptor = self;
        let mut offset = 0;
        for name in path.split(PATH_SEPARATOR) {
            let member = resolve_member(descriptor, name)?;
            offset += member.offset();
            descriptor = member.descriptor();
        }
        Ok(offset)
    }

    /// Publish this struct as a shared, immutable [`TypeRef`].
    pub fn into_ref(self) -> TypeRef {
        Arc::new(self)
    }
}

impl Default for Struct {
    fn default() -> Self {
        Self::new(ANONYMOUS_STRUCT_NAME)
    }
}

/// Resolve `name` on a descriptor that must be a struct.
pub(crate) fn resolve_member<'a>(
    descriptor: &'a dyn TypeDescriptor,
    name: &str,
) -> Result<&'a Member, AccessError> {
    descriptor
        .as_struct()
        .ok_or_else(|| AccessError::NoMembers {
            type_name: descriptor.name().to_owned(),
        })?
        .try_member(name)
}

// SAFETY: composites carry no identity; each member range lies within
// `memory_size` (offsets are cumulative sizes) and is handled by the
// member's own descriptor.
unsafe impl TypeDescriptor for Struct {
    fn kind(&self) -> Kind {
        Kind::Composite
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn memory_size(&self) -> usize {
        self.memory_size
    }

    fn as_struct(&self) -> Option<&Struct> {
        Some(self)
    }

    unsafe fn initialize_at(&self, location: *mut u8) {
        for member in &self.members {
            // SAFETY: member range is inside the caller's region.
            unsafe { member.descriptor().initialize_at(location.add(member.offset)) };
        }
    }

    unsafe fn finalize_at(&self, location: *mut u8) {
        for member in &self.members {
            // SAFETY: member range is inside the caller's region.
            unsafe { member.descriptor().finalize_at(location.add(member.offset)) };
        }
    }

    unsafe fn duplicate_at(&self, dest: *mut u8, src: *const u8) {
        for member in &self.members {
            // SAFETY: member ranges are inside both caller regions.
            unsafe {
                member
                    .descriptor()
                    .duplicate_at(dest.add(member.offset), src.add(member.offset));
            }
        }
    }

    fn clone_descriptor(&self) -> Box<dyn TypeDescriptor> {
        Box::new(self.clone())
    }
}
