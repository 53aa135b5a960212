// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types for type definition and data access.

use thiserror::Error;

/// Errors raised while assembling a descriptor.
///
/// A failed insertion leaves the struct exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    #[error("Duplicate field '{field}' in struct '{type_name}'")]
    DuplicateField { type_name: String, field: String },

    #[error("Invalid field name '{field}' in struct '{type_name}': {reason}")]
    InvalidFieldName {
        type_name: String,
        field: String,
        reason: &'static str,
    },

    /// The packed size would exceed `isize::MAX` bytes.
    #[error("Struct '{type_name}' would exceed the maximum size with field '{field}'")]
    SizeOverflow { type_name: String, field: String },
}

/// Errors raised while navigating or reading/writing a data buffer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    /// Indexing was attempted on a leaf type.
    #[error("Type '{type_name}' has no members")]
    NoMembers { type_name: String },

    #[error("No such field '{field}' in struct '{type_name}'")]
    NoSuchField { type_name: String, field: String },

    /// Typed access was attempted on a composite type.
    #[error("Type '{type_name}' is not a leaf value")]
    NotALeaf { type_name: String },

    #[error("Identity mismatch: expected '{expected}', found '{found}'")]
    IdentityMismatch { expected: String, found: String },
}

/// Any error surfaced by this crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("Definition error: {0}")]
    Definition(#[from] DefinitionError),

    #[error("Access error: {0}")]
    Access(#[from] AccessError),
}

/// Result alias defaulting to the crate-wide [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;
