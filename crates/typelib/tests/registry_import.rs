// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Registry import, derived types and cross-registry equivalence.

mod common;

use common::{data_path, make_registry, make_tlb_registry};
use std::sync::Arc;
use typelib::{Error, ParseError, Registry, RegistryConfig, TypeKind};

#[test]
fn test_import_without_hint_needs_an_extension() {
    let registry = Registry::with_standard_types();
    let err = registry
        .import(data_path("types_noext"), None)
        .expect_err("no extension, no hint");
    assert!(matches!(err, Error::Parse(ParseError::AmbiguousFormat { .. })));
    assert!(!registry.contains("/A"));

    let types = registry
        .import(data_path("types_noext"), Some("yaml"))
        .expect("hinted import");
    let names: Vec<&str> = types.iter().map(|t| t.name()).collect();
    assert_eq!(names[0], "/A");
    assert!(registry.contains("/DisplayTest"));
}

#[test]
fn test_reference_layout_of_a() {
    let registry = make_registry();
    let a = registry.get("/A").expect("A");
    let offsets: Vec<usize> = a
        .fields()
        .expect("compound")
        .iter()
        .map(|f| f.offset)
        .collect();
    assert_eq!(offsets, vec![0, 8, 12, 14]);
    assert_eq!(a.size(), 16);
    assert_eq!(a.alignment(), 8);
    assert!(Arc::ptr_eq(&a, &registry.get("/ADef").expect("typedef")));
}

#[test]
fn test_two_registries_are_equivalent_not_identical() {
    let r0 = make_registry();
    let r1 = make_registry();
    for name in ["/A", "/B", "/StdCollections", "/Collections", "/DisplayTest"] {
        let t0 = r0.get(name).expect("r0");
        let t1 = r1.get(name).expect("r1");
        assert!(!Arc::ptr_eq(&t0, &t1), "{} must be distinct instances", name);
        assert!(t0.is_equivalent(&t1), "{} must be equivalent", name);
        assert_eq!(t0.equivalence_hash(), t1.equivalence_hash());
    }
    assert!(!r0
        .get("/A")
        .expect("A")
        .is_equivalent(&r1.get("/B").expect("B")));
}

#[test]
fn test_yaml_and_tlb_describe_the_same_layouts() {
    let yaml = make_registry();
    let tlb = make_tlb_registry();
    for name in yaml.names() {
        let from_yaml = yaml.get(&name).expect("yaml");
        let from_tlb = tlb.get(&name).expect("tlb has the same names");
        assert!(
            from_yaml.is_equivalent(&from_tlb),
            "{} differs between formats",
            name
        );
    }
}

#[test]
fn test_build_memoizes_in_the_registry() {
    let registry = make_registry();
    let built = registry.build("/A*[2]").expect("build");
    assert!(Arc::ptr_eq(&built, &registry.get("/A*[2]").expect("get")));
    assert!(Arc::ptr_eq(
        &registry.build("/A*").expect("pointer"),
        &registry.get("/A*").expect("memoized pointer")
    ));
    match built.kind() {
        TypeKind::Array(array) => {
            assert_eq!(array.length, 2);
            assert!(array.element.is_pointer());
        }
        other => panic!("expected an array, got {:?}", other),
    }

    let text = registry.build("/char[20]").expect("fixed string");
    assert!(matches!(text.kind(), TypeKind::FixedString(_)));

    let nested = registry
        .get("/std/vector</std/vector</NS1/Test>>")
        .expect("vectors synthesized during import are registered");
    assert!(nested.is_container());
}

#[test]
fn test_leaf_paths_of_display_test() {
    let registry = make_registry();
    let display = registry.get("/DisplayTest").expect("DisplayTest");
    assert_eq!(
        display.leaf_paths().join(" "),
        ".fields[0] .fields[1] .fields[2] .fields[3] .f .d .a.a .a.b .a.c .a.d .mode"
    );
}

#[test]
fn test_search_paths_and_reimport() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::copy(data_path("types.tlb"), dir.path().join("shared.tlb")).expect("copy fixture");

    let registry =
        Registry::with_config(RegistryConfig::new().with_standard_types().search_path(dir.path()));
    let first = registry.import("shared.tlb", None).expect("found via search path");
    let before = registry.len();

    // Importing the same layouts again keeps the first instances.
    let second = registry.import("shared.tlb", None).expect("reimport");
    assert_eq!(registry.len(), before);
    for (a, b) in first.iter().zip(&second) {
        assert!(Arc::ptr_eq(a, b));
    }
}

#[test]
fn test_conflicting_import_is_atomic() {
    let registry = make_registry();
    let before = registry.len();
    let err = registry
        .import_str(
            "types:\n  - kind: compound\n    name: /Fresh\n    fields:\n      - { name: x, type: /int }\n  - kind: opaque\n    name: /A\n    size: 16\n",
            "yaml",
        )
        .expect_err("conflict");
    assert!(matches!(err, Error::Parse(ParseError::Conflict { ref name }) if name == "/A"));
    assert_eq!(registry.len(), before);
    assert!(!registry.contains("/Fresh"));
}

#[test]
fn test_unresolved_and_malformed_sources() {
    let registry = make_registry();
    let err = registry
        .import_str(
            "<typelib><compound name=\"/C\"><field name=\"x\" type=\"/Nope\"/></compound></typelib>",
            "tlb",
        )
        .expect_err("unresolved");
    assert!(matches!(err, Error::Parse(ParseError::UnresolvedType { ref name }) if name == "/Nope"));

    let err = registry
        .import_str(
            "<typelib><compound name=\"/C\"><field name=\"x\" type=\"/int[0]\"/></compound></typelib>",
            "xml",
        )
        .expect_err("zero-length array");
    assert!(matches!(err, Error::Parse(ParseError::Syntax { .. })));

    let err = registry.import_str("types: [", "yaml").expect_err("bad yaml");
    assert!(matches!(err, Error::Parse(ParseError::Syntax { .. })));
}
