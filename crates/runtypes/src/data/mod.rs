// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Data buffers described by runtime types.
//!
//! - [`Instance`] owns a buffer and drives its lifecycle.
//! - [`ReadableView`] / [`WritableView`] are non-owning windows produced by
//!   navigating an instance (or external memory) by field name.

mod instance;
mod view;

pub use instance::{construct, Instance};
pub use view::{ReadableView, WritableView};
