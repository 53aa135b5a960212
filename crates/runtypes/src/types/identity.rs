// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Identity tokens for leaf values.
//!
//! Every leaf shape has a stable key (`"i32"`, `"sequence<string>"`, ...).
//! The token pairs that key with its FNV-1a hash; tokens compare by hash
//! first and then by key. Tokens built from a Rust type also carry its
//! `TypeId`, and typed access requires that to match as well, so equal keys
//! alone never let one type's bytes be read as another.

use crate::config::{FNV1A_OFFSET_BASIS_64, FNV1A_PRIME_64};
use std::any::TypeId;
use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Identity of a leaf shape, compared by shape key.
#[derive(Debug, Clone, Eq)]
pub struct IdentityToken {
    hash: u64,
    key: Cow<'static, str>,
    type_id: Option<TypeId>,
}

impl IdentityToken {
    /// Build the token for an explicit shape key.
    ///
    /// Such a token names a shape but no Rust type, so typed access through
    /// it always fails.
    pub fn from_key(key: impl Into<Cow<'static, str>>) -> Self {
        let key = key.into();
        Self {
            hash: fnv1a_64(&key),
            key,
            type_id: None,
        }
    }

    /// Token of a [`LeafValue`] type.
    pub fn of<T: LeafValue>() -> Self {
        Self {
            type_id: Some(TypeId::of::<T>()),
            ..Self::from_key(T::shape_key())
        }
    }

    /// `true` when this token was built for exactly `T`.
    pub fn is<T: LeafValue>(&self) -> bool {
        self.type_id == Some(TypeId::of::<T>())
    }

    /// FNV-1a hash of the shape key.
    pub fn value(&self) -> u64 {
        self.hash
    }

    /// The shape key.
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl PartialEq for IdentityToken {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash && self.key == other.key
    }
}

impl Hash for IdentityToken {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.hash.hash(state);
    }
}

impl fmt::Display for IdentityToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{:016x}", self.key, self.hash)
    }
}

fn fnv1a_64(s: &str) -> u64 {
    let mut hash = FNV1A_OFFSET_BASIS_64;
    for &byte in s.as_bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(FNV1A_PRIME_64);
    }
    hash
}

/// A value that can be stored in a leaf.
///
/// `Clone` is the duplication capability: a type that cannot be duplicated
/// cannot be wrapped, and the error shows up when the struct is defined.
/// `Send + Sync` lets published descriptors and instances cross threads.
///
/// # Safety
///
/// `shape_key` must be deterministic and must differ from the key of every
/// other `LeafValue` type in the program. Typed access also compares
/// `TypeId` before reinterpreting buffer bytes as `Self`, but the key is
/// what descriptors built from [`IdentityToken::from_key`] are matched on. Prefer [`impl_leaf_value!`](crate::impl_leaf_value),
/// which keys a type by its module-qualified path and call site.
pub unsafe trait LeafValue: Clone + Send + Sync + 'static {
    /// Stable key describing this shape.
    fn shape_key() -> Cow<'static, str>;
}

/// Implement [`LeafValue`] for user-defined types.
///
/// The shape key is the module-qualified type path followed by the
/// invocation's file, line and column, so two same-named types declared in
/// different functions of one module still get distinct keys.
///
/// ```rust
/// #[derive(Clone)]
/// struct Reading {
///     celsius: f32,
/// }
/// runtypes::impl_leaf_value!(Reading);
///
/// use runtypes::types::LeafValue;
/// assert!(Reading::shape_key().contains("::Reading@"));
/// ```
#[macro_export]
macro_rules! impl_leaf_value {
    ($($ty:ty),+ $(,)?) => {
        $(
            // SAFETY: the key names the type and the invocation site, and
            // typed access also compares `TypeId`.
            unsafe impl $crate::types::LeafValue for $ty {
                fn shape_key() -> ::std::borrow::Cow<'static, str> {
                    ::std::borrow::Cow::Borrowed(concat!(
                        module_path!(),
                        "::",
                        stringify!($ty),
                        "@",
                        file!(),
                        ":",
                        line!(),
                        ":",
                        column!()
                    ))
                }
            }
        )+
    };
}

macro_rules! primitive_leaf {
    ($($ty:ty => $key:expr),+ $(,)?) => {
        $(
            // SAFETY: primitive keys are distinct literals without brackets.
            unsafe impl LeafValue for $ty {
                fn shape_key() -> Cow<'static, str> {
                    Cow::Borrowed($key)
                }
            }
        )+
    };
}

primitive_leaf!(
    () => "unit",
    bool => "bool",
    char => "char",
    i8 => "i8",
    i16 => "i16",
    i32 => "i32",
    i64 => "i64",
    i128 => "i128",
    isize => "isize",
    u8 => "u8",
    u16 => "u16",
    u32 => "u32",
    u64 => "u64",
    u128 => "u128",
    usize => "usize",
    f32 => "f32",
    f64 => "f64",
    String => "string",
);

// Generic shapes wrap their parameter keys in brackets. Parameter keys are
// themselves balanced, so each composed key parses back to one shape.

// SAFETY: "sequence<..>" prefix is only produced here.
unsafe impl<T: LeafValue> LeafValue for Vec<T> {
    fn shape_key() -> Cow<'static, str> {
        Cow::Owned(format!("sequence<{}>", T::shape_key()))
    }
}

// SAFETY: "deque<..>" prefix is only produced here.
unsafe impl<T: LeafValue> LeafValue for VecDeque<T> {
    fn shape_key() -> Cow<'static, str> {
        Cow::Owned(format!("deque<{}>", T::shape_key()))
    }
}

// SAFETY: "map<..>" prefix is only produced here.
unsafe impl<K: LeafValue + Ord, V: LeafValue> LeafValue for BTreeMap<K, V> {
    fn shape_key() -> Cow<'static, str> {
        Cow::Owned(format!("map<{},{}>", K::shape_key(), V::shape_key()))
    }
}

// SAFETY: "set<..>" prefix is only produced here.
unsafe impl<T: LeafValue + Ord> LeafValue for BTreeSet<T> {
    fn shape_key() -> Cow<'static, str> {
        Cow::Owned(format!("set<{}>", T::shape_key()))
    }
}

// SAFETY: "hash_map<..>" prefix is only produced here. The default hasher
// is part of the type, so other hashers are not covered.
unsafe impl<K: LeafValue + Eq + Hash, V: LeafValue> LeafValue for HashMap<K, V> {
    fn shape_key() -> Cow<'static, str> {
        Cow::Owned(format!("hash_map<{},{}>", K::shape_key(), V::shape_key()))
    }
}

// SAFETY: "optional<..>" prefix is only produced here.
unsafe impl<T: LeafValue> LeafValue for Option<T> {
    fn shape_key() -> Cow<'static, str> {
        Cow::Owned(format!("optional<{}>", T::shape_key()))
    }
}

// SAFETY: "box<..>" prefix is only produced here.
unsafe impl<T: LeafValue> LeafValue for Box<T> {
    fn shape_key() -> Cow<'static, str> {
        Cow::Owned(format!("box<{}>", T::shape_key()))
    }
}

// SAFETY: "array<..>" prefix is only produced here and carries the length.
unsafe impl<T: LeafValue, const N: usize> LeafValue for [T; N] {
    fn shape_key() -> Cow<'static, str> {
        Cow::Owned(format!("array<{},{}>", T::shape_key(), N))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone)]
    struct Sample;
    crate::impl_leaf_value!(Sample);

    #[test]
    fn test_token_is_stable_per_shape() {
        assert_eq!(IdentityToken::of::<i32>(), IdentityToken::of::<i32>());
        assert_eq!(
            IdentityToken::of::<Vec<String>>(),
            IdentityToken::from_key("sequence<string>")
        );
    }

    #[test]
    fn test_distinct_shapes_differ() {
        assert_ne!(IdentityToken::of::<i32>(), IdentityToken::of::<u32>());
        assert_ne!(IdentityToken::of::<i32>(), IdentityToken::of::<String>());
        assert_ne!(
            IdentityToken::of::<[u8; 4]>(),
            IdentityToken::of::<[u8; 8]>()
        );
        assert_ne!(
            IdentityToken::of::<BTreeMap<String, i32>>(),
            IdentityToken::of::<HashMap<String, i32>>()
        );
    }

    #[test]
    fn test_nested_keys() {
        assert_eq!(
            BTreeMap::<String, Vec<u8>>::shape_key(),
            "map<string,sequence<u8>>"
        );
        assert_eq!(<[Option<bool>; 3]>::shape_key(), "array<optional<bool>,3>");
    }

    #[test]
    fn test_user_key_is_module_qualified() {
        let key = Sample::shape_key();
        assert!(key.starts_with(module_path!()));
        assert!(key.contains("::Sample@"));
        assert!(key.contains(file!()));
    }

    #[test]
    fn test_same_named_local_types_differ() {
        fn outer_key() -> (Cow<'static, str>, IdentityToken) {
            #[derive(Clone)]
            #[allow(dead_code)]
            struct Local(u64);
            crate::impl_leaf_value!(Local);
            (Local::shape_key(), IdentityToken::of::<Local>())
        }

        #[derive(Clone)]
        #[allow(dead_code)]
        struct Local(f64);
        crate::impl_leaf_value!(Local);

        let (key, token) = outer_key();
        assert_ne!(key, Local::shape_key());
        assert_ne!(token, IdentityToken::of::<Local>());
        assert!(!token.is::<Local>());
    }

    #[test]
    fn test_type_check_beyond_key() {
        let typed = IdentityToken::of::<Vec<String>>();
        let named = IdentityToken::from_key("sequence<string>");
        // Same shape key, but only the typed token names a Rust type.
        assert_eq!(typed, named);
        assert!(typed.is::<Vec<String>>());
        assert!(!typed.is::<Vec<u8>>());
        assert!(!named.is::<Vec<String>>());
    }

    #[test]
    fn test_fnv1a_reference_value() {
        // FNV-1a 64 of the empty string is the offset basis.
        assert_eq!(IdentityToken::from_key("").value(), FNV1A_OFFSET_BASIS_64);
        assert_eq!(IdentityToken::from_key("a").value(), 0xaf63dc4c8601ec8c);
    }

    #[test]
    fn test_display() {
        let token = IdentityToken::from_key("");
        assert_eq!(token.to_string(), "#cbf29ce484222325");
    }
}
