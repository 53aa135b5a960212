// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::uninlined_format_args)] // Test code readability over pedantic
#![allow(clippy::cast_possible_truncation)] // Test parameters

//! Layout properties: packed offsets, duplicate rejection, nested paths.

use runtypes::{DefinitionError, Member, Struct, TypeDescriptor};
use std::collections::BTreeMap;
use std::mem::size_of;

/// Append a random leaf member, returning its size.
fn add_random_leaf(s: &mut Struct, rng: &mut fastrand::Rng, name: &str) -> usize {
    let added = match rng.u8(0..8) {
        0 => s.add_member(name, rng.bool()).map(Member::memory_size),
        1 => s.add_member(name, rng.i16(..)).map(Member::memory_size),
        2 => s.add_member(name, rng.u32(..)).map(Member::memory_size),
        3 => s.add_member(name, rng.f64()).map(Member::memory_size),
        4 => s.add_member(name, String::from("x")).map(Member::memory_size),
        5 => s.add_member(name, vec![rng.u8(..); 3]).map(Member::memory_size),
        6 => s
            .add_member(name, BTreeMap::<String, i64>::new())
            .map(Member::memory_size),
        _ => s.add_member(name, [rng.u8(..); 5]).map(Member::memory_size),
    };
    added.expect("unique generated name")
}

#[test]
fn test_random_layouts_are_packed() {
    let mut rng = fastrand::Rng::with_seed(0x5eed);

    for round in 0..64 {
        let mut s = Struct::new(format!("random_{}", round));
        let count = rng.usize(0..24);
        let mut sizes = Vec::with_capacity(count);
        for i in 0..count {
            sizes.push(add_random_leaf(&mut s, &mut rng, &format!("f{}", i)));
        }

        assert_eq!(s.member_count(), count);
        assert_eq!(s.memory_size(), sizes.iter().sum::<usize>());

        let mut expected_offset = 0;
        for (member, size) in s.members().zip(&sizes) {
            assert_eq!(member.offset(), expected_offset, "member {}", member.name());
            assert_eq!(member.memory_size(), *size);
            expected_offset += size;
        }
        assert_eq!(expected_offset, s.memory_size());
    }
}

#[test]
fn test_duplicate_insert_keeps_prior_layout() {
    let mut s = Struct::new("record");
    s.add_member("id", 1u64).expect("add id");
    s.add_member("name", String::new()).expect("add name");
    s.add_member("tags", Vec::<String>::new()).expect("add tags");

    let before: Vec<(String, usize)> = s
        .members()
        .map(|m| (m.name().to_owned(), m.offset()))
        .collect();
    let size_before = s.memory_size();

    let err = s.add_member("name", 0u8).unwrap_err();
    assert!(matches!(err, DefinitionError::DuplicateField { ref field, .. } if field == "name"));

    let nested = Struct::new("nested");
    assert!(s.embed_member("tags", &nested).is_err());
    assert!(s.link_member("id", &nested.into_ref()).is_err());

    let after: Vec<(String, usize)> = s
        .members()
        .map(|m| (m.name().to_owned(), m.offset()))
        .collect();
    assert_eq!(before, after);
    assert_eq!(s.memory_size(), size_before);

    // Still appendable after a rejected insert.
    let flag = s.add_member("flag", true).map(Member::offset);
    assert_eq!(flag, Ok(size_before));
}

#[test]
fn test_nested_offsets_sum_along_path() {
    let mut bottom = Struct::new("bottom");
    bottom.add_member("a", 0u16).expect("add a");
    bottom.add_member("n", 0i32).expect("add n");

    let mut middle = Struct::new("middle");
    middle.add_member("s", String::new()).expect("add s");
    middle.embed_member("b", &bottom).expect("embed b");

    let mut top = Struct::new("top");
    top.add_member("flag", false).expect("add flag");
    top.add_member("v", Vec::<u8>::new()).expect("add v");
    top.embed_member("m", &middle).expect("embed m");

    let offset = |s: &Struct, name: &str| s.member(name).map(Member::offset).expect("member");
    let expected = offset(&top, "m") + offset(&middle, "b") + offset(&bottom, "n");

    assert_eq!(top.offset_of("m.b.n"), Ok(expected));
    assert_eq!(expected, 1 + size_of::<Vec<u8>>() + size_of::<String>() + 2);
    assert_eq!(
        top.memory_size(),
        1 + size_of::<Vec<u8>>() + size_of::<String>() + 2 + 4
    );
}

#[test]
fn test_nested_struct_sizes_compose() {
    let mut point = Struct::new("point");
    point.add_member("x", 0f32).expect("add x");
    point.add_member("y", 0f32).expect("add y");
    let point = point.into_ref();

    let mut segment = Struct::new("segment");
    segment.link_member("from", &point).expect("link from");
    segment.link_member("to", &point).expect("link to");

    assert_eq!(segment.memory_size(), 2 * point.memory_size());
    assert_eq!(segment.offset_of("to.y"), Ok(8 + 4));
    assert_eq!(segment.field_type("from").map(|t| t.name()), Some("point"));
}
