// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! C/C++ fundamental types of an LP64 target.

use crate::layout::{NumericKind, TypeDescriptor};
use std::sync::Arc;

const FUNDAMENTALS: &[(&str, NumericKind)] = &[
    ("/bool", NumericKind::Bool),
    ("/char", NumericKind::Char),
    ("/signed char", NumericKind::I8),
    ("/unsigned char", NumericKind::U8),
    ("/short", NumericKind::I16),
    ("/unsigned short", NumericKind::U16),
    ("/int", NumericKind::I32),
    ("/unsigned int", NumericKind::U32),
    ("/long", NumericKind::I64),
    ("/unsigned long", NumericKind::U64),
    ("/long long", NumericKind::I64),
    ("/unsigned long long", NumericKind::U64),
    ("/float", NumericKind::F32),
    ("/double", NumericKind::F64),
];

/// Fixed-width names and the fundamental type they designate.
const FIXED_WIDTH: &[(&str, &str)] = &[
    ("/int8_t", "/signed char"),
    ("/uint8_t", "/unsigned char"),
    ("/int16_t", "/short"),
    ("/uint16_t", "/unsigned short"),
    ("/int32_t", "/int"),
    ("/uint32_t", "/unsigned int"),
    ("/int64_t", "/long"),
    ("/uint64_t", "/unsigned long"),
];

/// Every standard `(name, descriptor)` pair. Fixed-width names share the
/// descriptor instance of their fundamental type.
pub(crate) fn standard_types() -> Vec<(String, Arc<TypeDescriptor>)> {
    let mut types: Vec<(String, Arc<TypeDescriptor>)> = FUNDAMENTALS
        .iter()
        .map(|(name, kind)| (name.to_string(), Arc::new(TypeDescriptor::numeric(*name, *kind))))
        .collect();

    for (alias, target) in FIXED_WIDTH {
        if let Some((_, desc)) = types.iter().find(|(name, _)| name == target) {
            let desc = Arc::clone(desc);
            types.push((alias.to_string(), desc));
        }
    }

    if let Some((_, char_t)) = types.iter().find(|(name, _)| name == "/char") {
        let string_t = Arc::new(TypeDescriptor::string_of(char_t));
        types.push((string_t.name().to_string(), string_t));
    }
    types
}
