// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Converted views of container fields and their explicit write-back.

mod common;

use common::make_registry;
use std::sync::Arc;
use typelib::{ConversionRegistry, Registry, RichValue, Value};

/// `/NS1/Test` <-> its `a` field as a plain integer.
fn register_ns1_test(registry: &Registry) {
    let test_t = registry.get("/NS1/Test").expect("NS1/Test");
    registry.conversions().register(
        &test_t,
        |v| Ok(RichValue::I64(i64::from(v.field("a")?.get::<i32>()?))),
        |rich, desc| {
            let v = Value::new(desc);
            let a = rich
                .as_i128()
                .and_then(|n| i32::try_from(n).ok())
                .unwrap_or_default();
            v.field("a")?.set(a)?;
            Ok(v)
        },
    );
}

#[test]
fn test_conversion_applies_through_containers() {
    let registry = make_registry();
    register_ns1_test(&registry);
    let conversions = registry.conversions();

    for name in [
        "/NS1/Test",
        "/std/vector</NS1/Test>",
        "/std/vector</std/vector</NS1/Test>>",
        "/Collections",
    ] {
        let desc = registry.get(name).expect("registered");
        assert!(conversions.needs_conversion(&desc), "{}", name);
    }
    assert!(!conversions.needs_conversion(&registry.get("/A").expect("A")));

    // Equivalent descriptors of another registry share the converter.
    let other = make_registry();
    assert!(conversions
        .lookup(&other.get("/NS1/Test").expect("NS1/Test"))
        .is_some());
}

#[test]
fn test_container_view_is_cached_and_written_back_on_demand() {
    let registry = make_registry();
    register_ns1_test(&registry);
    let conversions = registry.conversions();

    let containers = Value::new(&registry.get("/Collections").expect("Collections"));
    let first = containers
        .read_field("v_v_struct", conversions)
        .expect("read")
        .as_converted()
        .expect("converted")
        .clone();
    assert_eq!(first.get(), RichValue::Sequence(Vec::new()));

    let second = containers
        .read_field("v_v_struct", conversions)
        .expect("read");
    let second = second.as_converted().expect("converted");
    assert!(second.same_view(&first));

    first.with_mut(|rich| {
        rich.as_sequence_mut()
            .expect("sequence")
            .push(RichValue::from(vec![10i64]))
    });
    assert_eq!(second.get(), RichValue::from(vec![RichValue::from(vec![10i64])]));

    let raw = containers.field("v_v_struct").expect("raw");
    assert_eq!(raw.read_rich().expect("rich"), RichValue::Sequence(Vec::new()));

    containers
        .apply_changes_from_converted_types(conversions)
        .expect("apply");
    assert!(!first.is_dirty());
    assert_eq!(raw.len().expect("outer"), 1);
    assert_eq!(
        raw.read_rich().expect("rich"),
        RichValue::Sequence(vec![RichValue::Sequence(vec![RichValue::Struct(vec![(
            "a".into(),
            RichValue::I32(10)
        )])])])
    );
    assert_eq!(
        raw.path("[0][0].a").and_then(|a| a.get::<i32>()).expect("a"),
        10
    );
}

#[test]
fn test_unconverted_fields_are_raw_views() {
    let registry = make_registry();
    register_ns1_test(&registry);
    let containers = Value::new(&registry.get("/Collections").expect("Collections"));
    let name = containers
        .read_field("name", registry.conversions())
        .expect("read");
    let name = name.as_raw().expect("raw");
    name.write_string("probe").expect("write");
    assert_eq!(
        containers
            .field("name")
            .and_then(|n| n.read_string())
            .expect("read"),
        "probe"
    );
}

#[test]
fn test_shared_conversion_registry() {
    let shared = Arc::new(ConversionRegistry::new());
    let r0 = Registry::with_standard_types().with_conversions(Arc::clone(&shared));
    let r1 = Registry::with_standard_types().with_conversions(Arc::clone(&shared));
    let int0 = r0.get("/int").expect("int");
    shared.register(
        &int0,
        |v| Ok(RichValue::String(v.get::<i32>()?.to_string())),
        |rich, desc| {
            let v = Value::new(desc);
            v.set(rich.as_str().and_then(|s| s.parse::<i32>().ok()).unwrap_or(0))?;
            Ok(v)
        },
    );

    let v = Value::new(&r1.get("/int").expect("int"));
    v.set(5i32).expect("set");
    assert_eq!(
        r1.conversions().to_rich(&v).expect("to_rich"),
        RichValue::from("5")
    );
    let back = r0
        .conversions()
        .from_rich(&RichValue::from("12"), &int0)
        .expect("from_rich");
    assert_eq!(back.get::<i32>().expect("get"), 12);
}
