// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Leaf enumeration for tabular dumps.
//!
//! Walks a descriptor depth-first in declared field order, expanding array
//! indices. Fixed strings, containers, pointers and enums are leaves. The
//! order is deterministic: it depends on the descriptor only.

use crate::layout::{TypeDescriptor, TypeKind};
use std::sync::Arc;

/// One leaf of a flattened descriptor.
#[derive(Debug, Clone)]
pub struct Leaf {
    /// Accessor path relative to the root (`.a.b`, `.fields[2]`).
    pub path: String,
    /// Byte offset relative to the root.
    pub offset: usize,
    pub descriptor: Arc<TypeDescriptor>,
}

impl TypeDescriptor {
    /// Every leaf with its path and offset.
    ///
    /// A descriptor that is itself a leaf yields one entry with an empty path.
    pub fn leaves(self: &Arc<Self>) -> Vec<Leaf> {
        let mut out = Vec::new();
        collect(self, String::new(), 0, &mut out);
        out
    }

    /// Accessor paths of every leaf, in enumeration order.
    pub fn leaf_paths(self: &Arc<Self>) -> Vec<String> {
        self.leaves().into_iter().map(|leaf| leaf.path).collect()
    }
}

fn collect(desc: &Arc<TypeDescriptor>, path: String, offset: usize, out: &mut Vec<Leaf>) {
    match desc.kind() {
        TypeKind::Compound(fields) => {
            for field in fields {
                collect(
                    &field.type_desc,
                    format!("{}.{}", path, field.name),
                    offset + field.offset,
                    out,
                );
            }
        }
        TypeKind::Array(array) => {
            let stride = array.element.size();
            for i in 0..array.length {
                collect(
                    &array.element,
                    format!("{}[{}]", path, i),
                    offset + i * stride,
                    out,
                );
            }
        }
        _ => out.push(Leaf {
            path,
            offset,
            descriptor: Arc::clone(desc),
        }),
    }
}
