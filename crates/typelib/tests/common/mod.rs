// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Shared fixtures for the typelib integration tests.

#![allow(dead_code)]

use std::path::PathBuf;
use typelib::Registry;

/// Path of a file under `tests/data/`.
pub fn data_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

/// Fresh registry with the standard types and `tests/data/types.yaml`.
pub fn make_registry() -> Registry {
    let registry = Registry::with_standard_types();
    registry
        .import(data_path("types.yaml"), None)
        .expect("import types.yaml");
    registry
}

/// Fresh registry with the standard types and `tests/data/types.tlb`.
pub fn make_tlb_registry() -> Registry {
    let registry = Registry::with_standard_types();
    registry
        .import(data_path("types.tlb"), None)
        .expect("import types.tlb");
    registry
}

/// Byte buffer of `len` bytes filled with a random pattern.
pub fn random_pattern(len: usize) -> Vec<u8> {
    (0..len).map(|_| fastrand::u8(1..=u8::MAX)).collect()
}
