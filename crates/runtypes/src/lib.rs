// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # runtypes - Runtime type descriptors and typed byte buffers
//!
//! Assemble struct-like layouts at runtime from leaf values and nested
//! structs, then allocate, read, write, copy and destroy instances of those
//! layouts through a type-checked byte-level interface.
//!
//! ## Quick Start
//!
//! ```rust
//! use runtypes::{construct, Result, Struct};
//! use std::collections::BTreeMap;
//!
//! fn main() -> Result<()> {
//!     // Type API
//!     let mut inner = Struct::new("inner");
//!     inner.add_member("int", 5i32)?;
//!     inner.add_member("vec", vec![4i32, 5, 3])?;
//!     inner.add_member("map", BTreeMap::from([(String::from("a"), 3i32)]))?;
//!     let inner = inner.into_ref();
//!
//!     let mut outer = Struct::new("outer");
//!     outer.add_member("float", 3.2f32)?;
//!     outer.link_member("inner", &inner)?;
//!     let outer = outer.into_ref();
//!
//!     // Data API
//!     let mut data = construct(&outer);
//!     data.set("inner.vec", vec![2i32, 4, 6, 123, 10])?;
//!
//!     assert_eq!(data.get::<f32>("float")?, 3.2);
//!     assert_eq!(data.get::<Vec<i32>>("inner.vec")?[3], 123);
//!     assert!(data.get::<String>("inner.int").is_err());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +---------------------------------------------------------------------+
//! |                            Data Layer                               |
//! |   Instance (owns bytes) -> ReadableView / WritableView (borrows)    |
//! +---------------------------------------------------------------------+
//! |                            Type Layer                               |
//! |   TypeDescriptor | LeafType<T> | Struct + Member | IdentityToken    |
//! +---------------------------------------------------------------------+
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`TypeDescriptor`] | Layout and lifecycle contract (initialize, finalize, duplicate) |
//! | [`LeafType`] | Descriptor wrapping one value, with identity token and baseline |
//! | [`Struct`] | Packed composite of named members (owned or referenced) |
//! | [`Instance`] | Owning buffer for one value of a descriptor |
//! | [`ReadableView`] / [`WritableView`] | Non-owning, type-checked windows |
//!
//! ## Layout
//!
//! Structs are packed: member offsets are cumulative member sizes in
//! insertion order, with no alignment padding. Values are read and written
//! with unaligned accesses.

pub mod config;
pub mod data;
pub mod error;
pub mod types;

pub use data::{construct, Instance, ReadableView, WritableView};
pub use error::{AccessError, DefinitionError, Error, Result};
pub use types::{
    IdentityToken, Kind, LeafType, LeafValue, Member, Ownership, Struct, TypeDescriptor, TypeRef,
};
