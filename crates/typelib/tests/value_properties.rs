// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Value semantics against the reference layouts of `tests/data/`.

mod common;

use common::{make_registry, random_pattern};
use typelib::{copy, RichValue, Value};

fn set_a(value: &Value, a: i64, b: i32, c: i8, d: i16) {
    value.field("a").and_then(|f| f.set(a)).expect("a");
    value.field("b").and_then(|f| f.set(b)).expect("b");
    value.field("c").and_then(|f| f.set(c)).expect("c");
    value.field("d").and_then(|f| f.set(d)).expect("d");
}

#[test]
fn test_byte_array_round_trip() {
    let registry = make_registry();
    for name in registry.names() {
        let desc = registry.get(&name).expect("registered");
        let v = Value::new(&desc);
        let bytes = v.to_byte_array().expect("bytes");
        assert_eq!(bytes.len(), desc.size(), "{}", name);
        let wrapped = Value::wrap(&desc, bytes).expect("wrap");
        assert!(wrapped.memory_eql(&v).expect("compare"), "{}", name);
    }
}

#[test]
fn test_equality_ignores_padding() {
    let registry = make_registry();
    let a_t = registry.get("/A").expect("A");

    let pattern = random_pattern(a_t.size());
    let mut reversed: Vec<u8> = pattern.iter().rev().copied().collect();
    // Byte 13 is the padding between c and d.
    reversed[13] = pattern[13].wrapping_add(1);

    let a1 = Value::wrap(&a_t, pattern).expect("wrap");
    let a2 = Value::wrap(&a_t, reversed).expect("wrap");
    set_a(&a1, 10, 20, 30, 40);
    set_a(&a2, 10, 20, 30, 40);

    assert!(a1.structural_eq(&a2).expect("comparable"));
    assert!(!a1.memory_eql(&a2).expect("bytes"));
    assert!(!a1.eql(&a2));

    a2.field("d").and_then(|d| d.set(50i16)).expect("d");
    assert!(!a1.structural_eq(&a2).expect("comparable"));

    let int_value = Value::new(&registry.get("/int").expect("int"));
    let err = a1.structural_eq(&int_value).expect_err("different types");
    assert!(err.is_invalid_argument());
}

#[test]
fn test_cast_identity_and_cross_registry() {
    let r0 = make_registry();
    let r1 = make_registry();
    let t0 = r0.get("/StdCollections").expect("t0");
    let t1 = r1.get("/StdCollections").expect("t1");

    let v0 = Value::new(&t0);
    v0.field("iv").and_then(|f| f.set(7u32)).expect("iv");

    let same = v0.cast(&t0).expect("own type");
    assert!(same.is_same());
    assert!(same.eql(&v0));

    let v1 = v0.cast(&t1).expect("equivalent type").into_value();
    assert!(std::sync::Arc::ptr_eq(v1.descriptor(), &t1));
    assert_eq!(v1.zone_address(), v0.zone_address());
    assert!(v1.structural_eq(&v0).expect("comparable"));

    let wrong = r1.get("/A").expect("A");
    assert!(v0.cast(&wrong).expect_err("not equivalent").is_invalid_argument());
}

#[test]
fn test_copy_establishes_memory_equality() {
    let r0 = make_registry();
    let r1 = make_registry();
    let v0 = Value::new(&r0.get("/B").expect("B"));
    let v1 = Value::new(&r1.get("/B").expect("B"));
    v0.zero().expect("zero");
    v1.zero().expect("zero");

    set_a(&v0.field("a").expect("a"), 20, 60, 4, 30);
    v0.field("x").and_then(|x| x.set(230i32)).expect("x");
    let values = v0.field("values").expect("values");
    values.resize(2).expect("resize");
    values.element(1).and_then(|e| e.set(99i32)).expect("element");
    assert!(!v1.memory_eql(&v0).expect("bytes"));

    copy(&v1, &v0).expect("copy");
    assert!(v1.memory_eql(&v0).expect("bytes"));
    assert!(v1.structural_eq(&v0).expect("comparable"));

    v0.field("x").and_then(|x| x.set(1i32)).expect("x");
    values.element(1).and_then(|e| e.set(1i32)).expect("element");
    assert_eq!(v1.path(".x").and_then(|x| x.get::<i32>()).expect("x"), 230);
    assert_eq!(
        v1.path(".values[1]").and_then(|e| e.get::<i32>()).expect("element"),
        99
    );

    let a = Value::new(&r0.get("/A").expect("A"));
    assert!(copy(&a, &v0).expect_err("different types").is_invalid_argument());
}

#[test]
fn test_dup_is_independent() {
    let registry = make_registry();
    let a = Value::new(&registry.get("/A").expect("A"));
    a.field("a").and_then(|f| f.set(20i64)).expect("a");

    let b = a.dup().expect("dup");
    assert!(b.is_a(a.descriptor()));
    assert_eq!(b.field("a").and_then(|f| f.get::<i64>()).expect("a"), 20);
    assert_ne!(b.zone_address(), a.zone_address());

    b.field("a").and_then(|f| f.set(10i64)).expect("a");
    assert_eq!(a.field("a").and_then(|f| f.get::<i64>()).expect("a"), 20);
    a.field("a").and_then(|f| f.set(30i64)).expect("a");
    assert_eq!(b.field("a").and_then(|f| f.get::<i64>()).expect("a"), 10);
}

#[test]
fn test_natural_layout_bytes() {
    let registry = make_registry();
    let a = Value::new(&registry.get("ADef").expect("ADef"));
    a.zero().expect("zero");
    set_a(&a, 10, 20, 30, 40);

    let bytes = a.to_byte_array().expect("bytes");
    let mut a_bytes = [0u8; 8];
    a_bytes.copy_from_slice(&bytes[0..8]);
    let mut b_bytes = [0u8; 4];
    b_bytes.copy_from_slice(&bytes[8..12]);
    let mut d_bytes = [0u8; 2];
    d_bytes.copy_from_slice(&bytes[14..16]);
    assert_eq!(
        (
            u64::from_ne_bytes(a_bytes),
            i32::from_ne_bytes(b_bytes),
            bytes[12] as i8,
            i16::from_ne_bytes(d_bytes)
        ),
        (10, 20, 30, 40)
    );
}

#[test]
fn test_wrap_size_check() {
    let registry = make_registry();
    let short_t = registry.build("/short").expect("short");
    let v = Value::wrap(&short_t, 5i16.to_ne_bytes().to_vec()).expect("wrap");
    assert_eq!(v.to_byte_array().expect("bytes").len(), 2);
    assert_eq!(v.get::<i16>().expect("get"), 5);
    assert!(Value::wrap(&short_t, Vec::new())
        .expect_err("empty")
        .is_invalid_argument());

    let null = unsafe { Value::wrap_raw(&short_t, std::ptr::null_mut(), 2) };
    assert!(null.expect_err("null").is_invalid_argument());
}

#[test]
fn test_wrap_raw_aliases_caller_memory() {
    let registry = make_registry();
    let a_t = registry.get("/A").expect("A");
    let mut buffer = vec![0u8; a_t.size()];
    {
        let v = unsafe { Value::wrap_raw(&a_t, buffer.as_mut_ptr(), buffer.len()) }
            .expect("wrap_raw");
        assert!(v.zone().is_borrowed());
        v.field("b").and_then(|b| b.set(0x0102_0304i32)).expect("b");
    }
    assert_eq!(&buffer[8..12], &0x0102_0304i32.to_ne_bytes());
}

#[test]
fn test_null_pointer() {
    let registry = make_registry();
    let pointer_t = registry.build("/int*").expect("pointer");
    let p = Value::new(&pointer_t);
    p.zero().expect("zero");
    assert!(p.is_null().expect("pointer"));
    assert!(p.deref().expect_err("null").is_invalid_argument());
    assert_eq!(p.read_rich().expect("rich"), RichValue::Null);

    let int_value = Value::new(&registry.get("/int").expect("int"));
    assert!(int_value.is_null().expect_err("not a pointer").is_invalid_argument());
}

#[test]
fn test_to_ptr_round_trip() {
    let registry = make_registry();
    let value = Value::new(&registry.get("/int").expect("int"));
    let ptr = value.to_ptr().expect("to_ptr");
    assert_eq!(ptr.type_name(), "/int*");
    assert!(ptr.deref().expect("deref").eql(&value));

    let a = Value::new(&registry.get("/A").expect("A"));
    let d = a.field("d").expect("d");
    let d_ptr = d.to_ptr().expect("to_ptr");
    let target = d_ptr.deref().expect("deref");
    assert!(target.eql(&d));
    target.set(12i16).expect("write through pointer");
    assert_eq!(d.get::<i16>().expect("d"), 12);

    let stored = Value::new(&registry.build("/A*").expect("A*"));
    stored.set_pointer(&a).expect("set_pointer");
    assert!(stored.deref().expect("deref").eql(&a));
    assert!(stored.set_pointer(&d).is_err());
}

#[test]
fn test_release_invalidates_every_view() {
    let registry = make_registry();
    let a = Value::new(&registry.get("/A").expect("A"));
    let b = a.field("b").expect("b");
    let alias = a.alias();
    let ptr = b.to_ptr().expect("to_ptr");

    a.release();
    assert!(!alias.is_live());
    assert!(b.get::<i32>().expect_err("released").is_stale());
    assert!(alias.to_byte_array().expect_err("released").is_stale());
    assert!(a.field("c").expect_err("released").is_stale());
    assert!(ptr.deref().expect_err("pointee released").is_stale());
    assert!(a.dup().expect_err("released").is_stale());
}

#[test]
fn test_fixed_strings() {
    let registry = make_registry();
    let buffer_t = registry.build("/char[256]").expect("char[256]");
    let buffer = Value::new(&buffer_t);
    buffer
        .write_rich(&RichValue::from("first test"))
        .expect("fits");
    assert_eq!(buffer.read_rich().expect("rich"), RichValue::from("first test"));
    assert_eq!(buffer.read_string().expect("string"), "first test");

    let overlong = "a".repeat(512);
    assert!(buffer
        .write_rich(&RichValue::from(overlong.as_str()))
        .expect_err("too long")
        .is_invalid_argument());
    // 256 bytes leave no room for the NUL.
    assert!(buffer.write_string(&"a".repeat(256)).is_err());
    assert!(buffer.write_string(&"a".repeat(255)).is_ok());

    let short = Value::new(&registry.build("/char[20]").expect("char[20]"));
    for i in 0..19 {
        short
            .element(i)
            .and_then(|c| c.set(b'a' as i8 + i as i8))
            .expect("char");
    }
    assert_eq!(short.read_string().expect("string"), "abcdefghijklmnopqrs");
}

#[test]
fn test_is_a() {
    let registry = make_registry();
    let a = Value::new(&registry.get("/A").expect("A"));
    assert!(a.has_type_name("/A"));
    assert!(a.has_type_name("A"));
    assert!(a.is_a(&registry.get("/A").expect("A")));
    assert!(a.is_a(&registry.get("/ADef").expect("ADef")));
    assert!(a.is_a(&registry.get("/long long").expect("long long")));
    assert!(!a.is_a(&registry.get("/int").expect("int")));
}

#[test]
fn test_display_test_flatten() {
    let registry = make_registry();
    let display = Value::new(&registry.get("/DisplayTest").expect("DisplayTest"));
    display.zero().expect("zero");
    for i in 0..4 {
        display
            .path(&format!(".fields[{}]", i))
            .and_then(|f| f.set(i as i32))
            .expect("fields");
    }
    display.path(".f").and_then(|f| f.set(1.1f32)).expect("f");
    display.path(".d").and_then(|f| f.set(2.2f64)).expect("d");
    set_a(&display.field("a").expect("a"), 10, 20, b'b' as i8, 42);

    let flat = display.flatten().expect("flatten");
    let paths: Vec<&str> = flat.iter().map(|(p, _)| p.as_str()).collect();
    assert_eq!(
        paths,
        display.descriptor().leaf_paths().iter().map(String::as_str).collect::<Vec<_>>()
    );
    let values: Vec<RichValue> = flat.into_iter().map(|(_, v)| v).collect();
    assert_eq!(values[3], RichValue::I32(3));
    assert_eq!(values[5], RichValue::F64(2.2));
    assert_eq!(values[6], RichValue::I64(10));
    assert_eq!(values[8], RichValue::I8(98));
    assert_eq!(values[10], RichValue::Enum(0, "OUTPUT".into()));

    display
        .field("mode")
        .and_then(|m| m.set_enum("BOTH"))
        .expect("mode");
    assert_eq!(
        display.field("mode").and_then(|m| m.enum_value()).expect("mode"),
        4
    );
}

#[test]
fn test_std_string_field() {
    let registry = make_registry();
    let collections = Value::new(&registry.get("/StdCollections").expect("StdCollections"));
    let label = collections.field("label").expect("label");
    label.write_string("sensor-12").expect("write");
    assert_eq!(label.read_string().expect("read"), "sensor-12");
    assert_eq!(label.len().expect("len"), 9);

    let copy_of = collections.dup().expect("dup");
    label.write_string("x").expect("write");
    assert_eq!(
        copy_of.field("label").and_then(|l| l.read_string()).expect("read"),
        "sensor-12"
    );
}
