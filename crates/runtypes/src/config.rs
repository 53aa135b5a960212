// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtypes Global Configuration - Single Source of Truth
//!
//! Compile-time constants shared by the descriptor and data layers.
//! **NEVER hardcode these elsewhere!**
//!
//! # Exemple
//!
//! ```rust
//! use runtypes::config::PATH_SEPARATOR;
//!
//! let path = ["inner", "vec"].join(&PATH_SEPARATOR.to_string());
//! assert_eq!(path, "inner.vec");
//! ```

// =======================================================================
// Field paths
// =======================================================================

/// Separator between field names in a dotted path (`"inner.vec"`).
///
/// Field names containing this character are rejected at definition time,
/// so every path resolves to exactly one member chain.
pub const PATH_SEPARATOR: char = '.';

/// Display name given to structs created through `Struct::default()`.
pub const ANONYMOUS_STRUCT_NAME: &str = "<anonymous>";

// =======================================================================
// Layout limits
// =======================================================================

/// Largest packed size a struct may reach, the allocation limit for one
/// buffer. Insertions past it fail with `DefinitionError::SizeOverflow`.
pub const MAX_MEMORY_SIZE: usize = isize::MAX.unsigned_abs();

// =======================================================================
// Identity tokens (FNV-1a, 64-bit)
// =======================================================================

/// FNV-1a 64-bit offset basis used to hash leaf shape keys.
pub const FNV1A_OFFSET_BASIS_64: u64 = 0xcbf29ce484222325;

/// FNV-1a 64-bit prime used to hash leaf shape keys.
pub const FNV1A_PRIME_64: u64 = 0x100000001b3;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_separator_is_not_alphanumeric() {
        assert!(!PATH_SEPARATOR.is_alphanumeric());
        assert!(!ANONYMOUS_STRUCT_NAME.contains(PATH_SEPARATOR));
    }

    #[test]
    fn test_size_limit_fits_allocations() {
        assert_eq!(MAX_MEMORY_SIZE, isize::MAX as usize);
        assert!(MAX_MEMORY_SIZE.checked_add(1).is_some());
    }
}
