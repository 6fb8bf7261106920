// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Structural equivalence of layout descriptors.
//!
//! Two descriptors are equivalent when they agree on name, size, alignment
//! and, recursively, on their kind-specific structure. Which registry built
//! them is irrelevant. Each descriptor memoizes an [`EquivalenceHash`] of a
//! canonical encoding so that repeated casts across registries reduce to a
//! 14-byte comparison before any deep walk.
//!
//! Descriptors only reference children through `Arc`, which cannot form a
//! cycle once built; the recursion below therefore always terminates.

use crate::layout::{TypeDescriptor, TypeKind};
use md5::{Digest, Md5};
use std::fmt;
use std::sync::Arc;

/// 14-byte truncated MD5 of a descriptor's canonical encoding.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct EquivalenceHash([u8; 14]);

impl EquivalenceHash {
    pub const fn from_bytes(bytes: [u8; 14]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 14] {
        &self.0
    }

    /// MD5 over `data`, truncated to 14 bytes.
    pub fn compute(data: &[u8]) -> Self {
        let mut hasher = Md5::new();
        hasher.update(data);
        let digest = hasher.finalize();

        let mut bytes = [0u8; 14];
        bytes.copy_from_slice(&digest[..14]);
        Self(bytes)
    }
}

impl fmt::Debug for EquivalenceHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EquivalenceHash({})", self)
    }
}

impl fmt::Display for EquivalenceHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl AsRef<[u8]> for EquivalenceHash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

// Kind tags of the canonical encoding.
const TAG_NUMERIC: u8 = 1;
const TAG_OPAQUE: u8 = 2;
const TAG_POINTER: u8 = 3;
const TAG_ARRAY: u8 = 4;
const TAG_FIXED_STRING: u8 = 5;
const TAG_COMPOUND: u8 = 6;
const TAG_ENUM: u8 = 7;
const TAG_CONTAINER: u8 = 8;

fn put_len(buf: &mut Vec<u8>, value: usize) {
    buf.extend_from_slice(&(value as u64).to_le_bytes());
}

fn put_str(buf: &mut Vec<u8>, value: &str) {
    put_len(buf, value.len());
    buf.extend_from_slice(value.as_bytes());
}

impl TypeDescriptor {
    /// Memoized equivalence hash of this descriptor.
    pub fn equivalence_hash(&self) -> EquivalenceHash {
        *self.cached_hash().get_or_init(|| self.compute_hash())
    }

    fn compute_hash(&self) -> EquivalenceHash {
        let mut buf = Vec::with_capacity(64);
        let tag = match self.kind() {
            TypeKind::Numeric(_) => TAG_NUMERIC,
            TypeKind::Opaque => TAG_OPAQUE,
            TypeKind::Pointer(_) => TAG_POINTER,
            TypeKind::Array(_) => TAG_ARRAY,
            TypeKind::FixedString(_) => TAG_FIXED_STRING,
            TypeKind::Compound(_) => TAG_COMPOUND,
            TypeKind::Enum(_) => TAG_ENUM,
            TypeKind::Container(_) => TAG_CONTAINER,
        };
        buf.push(tag);
        put_str(&mut buf, self.name());
        put_len(&mut buf, self.size());
        put_len(&mut buf, self.alignment());

        match self.kind() {
            TypeKind::Numeric(kind) => buf.push(kind.code()),
            TypeKind::Opaque => {}
            TypeKind::Pointer(target) => {
                buf.extend_from_slice(target.equivalence_hash().as_bytes());
            }
            TypeKind::Array(array) | TypeKind::FixedString(array) => {
                put_len(&mut buf, array.length);
                buf.extend_from_slice(array.element.equivalence_hash().as_bytes());
            }
            TypeKind::Compound(fields) => {
                put_len(&mut buf, fields.len());
                for field in fields {
                    put_str(&mut buf, &field.name);
                    put_len(&mut buf, field.offset);
                    buf.extend_from_slice(field.type_desc.equivalence_hash().as_bytes());
                }
            }
            TypeKind::Enum(values) => {
                put_len(&mut buf, values.values.len());
                for value in &values.values {
                    put_str(&mut buf, &value.name);
                    buf.extend_from_slice(&value.value.to_le_bytes());
                }
            }
            TypeKind::Container(container) => {
                buf.push(container.kind as u8);
                buf.extend_from_slice(container.element.equivalence_hash().as_bytes());
            }
        }

        EquivalenceHash::compute(&buf)
    }

    /// Structural equivalence: instance identity, then hash, then a deep
    /// comparison of the structure.
    pub fn is_equivalent(&self, other: &TypeDescriptor) -> bool {
        if std::ptr::eq(self, other) {
            return true;
        }
        if self.equivalence_hash() != other.equivalence_hash() {
            return false;
        }
        self.same_structure(other)
    }

    fn same_structure(&self, other: &TypeDescriptor) -> bool {
        if self.name() != other.name()
            || self.size() != other.size()
            || self.alignment() != other.alignment()
        {
            return false;
        }

        match (self.kind(), other.kind()) {
            (TypeKind::Numeric(a), TypeKind::Numeric(b)) => a == b,
            (TypeKind::Opaque, TypeKind::Opaque) => true,
            (TypeKind::Pointer(a), TypeKind::Pointer(b)) => equivalent(a, b),
            (TypeKind::Array(a), TypeKind::Array(b))
            | (TypeKind::FixedString(a), TypeKind::FixedString(b)) => {
                a.length == b.length && equivalent(&a.element, &b.element)
            }
            (TypeKind::Compound(a), TypeKind::Compound(b)) => {
                a.len() == b.len()
                    && a.iter().zip(b).all(|(fa, fb)| {
                        fa.name == fb.name
                            && fa.offset == fb.offset
                            && equivalent(&fa.type_desc, &fb.type_desc)
                    })
            }
            (TypeKind::Enum(a), TypeKind::Enum(b)) => a == b,
            (TypeKind::Container(a), TypeKind::Container(b)) => {
                a.kind == b.kind && equivalent(&a.element, &b.element)
            }
            _ => false,
        }
    }
}

fn equivalent(a: &Arc<TypeDescriptor>, b: &Arc<TypeDescriptor>) -> bool {
    Arc::ptr_eq(a, b) || a.is_equivalent(b)
}
